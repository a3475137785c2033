//! In-memory model of the host application's scene world.
//!
//! Everything the conversion pipelines read or write on the host side goes
//! through a [`HostDocument`] value passed in by the caller; no ambient
//! global state is consulted. Objects and duplication groups live in arenas
//! and are addressed by typed ids; meshes live in a keyed map because
//! temporary derived meshes are removed again at export session end.

use glam::{Mat4, Vec3};
use id_arena::{Arena, Id};
use thiserror::Error;

pub type ObjectId = Id<SceneObject>;
pub type GroupId = Id<DuplicationGroup>;

/// Handle to a mesh datablock in a [`HostDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

/// Host interaction modes. Export normalizes to `Object` before touching
/// the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Object,
    Edit,
    Pose,
}

/// Camera payload carried by a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    Perspective,
    Orthographic,
}

/// One node of the host's scene-object hierarchy.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    /// Local-to-parent transform in the host's coordinate convention.
    pub matrix_local: Mat4,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    /// Host-side reference count; zero means the object is orphaned.
    pub users: u32,
    pub selected: bool,
    /// Opaque per-object layer-visibility predicate supplied by the host.
    pub layer_visible: bool,
    /// Group this object instances, if any.
    pub duplication_group: Option<GroupId>,
    /// Deforming armature attached as a modifier, if any.
    pub armature_modifier: Option<ObjectId>,
    pub mesh: Option<MeshId>,
    pub camera: Option<CameraKind>,
    /// Names of animations applied to this object on import.
    pub animations: Vec<String>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrix_local: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
            users: 1,
            selected: false,
            layer_visible: true,
            duplication_group: None,
            armature_modifier: None,
            mesh: None,
            camera: None,
            animations: Vec::new(),
        }
    }
}

/// A shared set of member objects instanced at an offset.
#[derive(Debug, Clone)]
pub struct DuplicationGroup {
    pub name: String,
    pub members: Vec<ObjectId>,
    /// Offset applied to every instanced member, in host coordinates.
    pub offset: Vec3,
    pub layer_visible: bool,
}

impl DuplicationGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            offset: Vec3::ZERO,
            layer_visible: true,
        }
    }
}

/// Named per-vertex weight set driving skin deformation.
#[derive(Debug, Clone, Default)]
pub struct VertexGroup {
    pub name: String,
    /// (vertex index, weight) pairs.
    pub weights: Vec<(u32, f32)>,
}

/// A mesh datablock. `temporary` marks derived copies created for geometry
/// extraction during an export session.
#[derive(Debug, Clone)]
pub struct HostMesh {
    pub name: String,
    pub vertex_groups: Vec<VertexGroup>,
    pub temporary: bool,
}

impl HostMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertex_groups: Vec::new(),
            temporary: false,
        }
    }

    /// Finds or creates the vertex group with the given name.
    pub fn vertex_group_mut(&mut self, name: &str) -> &mut VertexGroup {
        if let Some(position) = self.vertex_groups.iter().position(|g| g.name == name) {
            return &mut self.vertex_groups[position];
        }
        self.vertex_groups.push(VertexGroup {
            name: name.to_string(),
            weights: Vec::new(),
        });
        self.vertex_groups.last_mut().expect("group was just pushed")
    }
}

/// A scene container: named, with a member list and a 3D cursor.
#[derive(Debug, Clone)]
pub struct HostScene {
    pub name: String,
    pub objects: Vec<ObjectId>,
    pub cursor: Vec3,
}

impl HostScene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            cursor: Vec3::ZERO,
        }
    }
}

/// Errors from host-level operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("object '{0}' is not linked to the target scene")]
    NotInScene(String),
}

/// The host application's world as seen by the conversion pipelines.
#[derive(Debug)]
pub struct HostDocument {
    pub objects: Arena<SceneObject>,
    pub groups: Arena<DuplicationGroup>,
    meshes: std::collections::BTreeMap<MeshId, HostMesh>,
    next_mesh: u32,
    pub scenes: Vec<HostScene>,
    pub current_scene: usize,
    pub current_frame: i32,
    pub active_object: Option<ObjectId>,
    pub mode: InteractionMode,
}

impl Default for HostDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDocument {
    /// Creates a host world with one empty scene, mirroring a freshly
    /// started host session.
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            groups: Arena::new(),
            meshes: std::collections::BTreeMap::new(),
            next_mesh: 0,
            scenes: vec![HostScene::new("Scene")],
            current_scene: 0,
            current_frame: 1,
            active_object: None,
            mode: InteractionMode::Object,
        }
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn object(&self, id: ObjectId) -> &SceneObject {
        &self.objects[id]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut SceneObject {
        &mut self.objects[id]
    }

    pub fn add_group(&mut self, group: DuplicationGroup) -> GroupId {
        self.groups.alloc(group)
    }

    pub fn group(&self, id: GroupId) -> &DuplicationGroup {
        &self.groups[id]
    }

    pub fn add_mesh(&mut self, mesh: HostMesh) -> MeshId {
        let id = MeshId(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(id, mesh);
        id
    }

    pub fn mesh(&self, id: MeshId) -> Option<&HostMesh> {
        self.meshes.get(&id)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut HostMesh> {
        self.meshes.get_mut(&id)
    }

    /// Removes a mesh datablock, returning it if it existed.
    pub fn remove_mesh(&mut self, id: MeshId) -> Option<HostMesh> {
        self.meshes.remove(&id)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Creates a derived copy of a mesh for geometry extraction. The copy
    /// is marked temporary and must be removed at session end.
    pub fn create_temporary_mesh(&mut self, source: MeshId) -> Option<MeshId> {
        let mut derived = self.meshes.get(&source)?.clone();
        derived.name = format!("{}.export", derived.name);
        derived.temporary = true;
        Some(self.add_mesh(derived))
    }

    pub fn create_scene(&mut self, name: impl Into<String>) -> usize {
        self.scenes.push(HostScene::new(name));
        self.scenes.len() - 1
    }

    pub fn scene_index_by_name(&self, name: &str) -> Option<usize> {
        self.scenes.iter().position(|scene| scene.name == name)
    }

    /// Links an object into a scene's member list.
    pub fn link_to_scene(&mut self, scene: usize, id: ObjectId) {
        let members = &mut self.scenes[scene].objects;
        if !members.contains(&id) {
            members.push(id);
        }
    }

    /// Parents `child` under `parent`, detaching it from any previous
    /// parent first.
    pub fn set_parent(&mut self, child: ObjectId, parent: ObjectId) {
        if let Some(previous) = self.objects[child].parent {
            self.objects[previous].children.retain(|&c| c != child);
        }
        self.objects[child].parent = Some(parent);
        if !self.objects[parent].children.contains(&child) {
            self.objects[parent].children.push(child);
        }
    }

    /// Objects in a scene that have no parent, in link order.
    pub fn scene_roots(&self, scene: usize) -> Vec<ObjectId> {
        self.scenes[scene]
            .objects
            .iter()
            .copied()
            .filter(|&id| self.objects[id].parent.is_none())
            .collect()
    }

    pub fn set_current_frame(&mut self, frame: i32) {
        self.current_frame = frame;
    }

    pub fn clear_selection(&mut self) {
        for (_, object) in self.objects.iter_mut() {
            object.selected = false;
        }
        self.active_object = None;
    }

    /// Selects an object and makes it active. Fails if the object is not
    /// linked to the given scene.
    pub fn activate(&mut self, scene: usize, id: ObjectId) -> Result<(), HostError> {
        if !self.scenes[scene].objects.contains(&id) {
            return Err(HostError::NotInScene(self.objects[id].name.clone()));
        }
        self.objects[id].selected = true;
        self.active_object = Some(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_host_has_one_scene() {
        let host = HostDocument::new();
        assert_eq!(host.scenes.len(), 1);
        assert_eq!(host.scenes[0].name, "Scene");
        assert_eq!(host.mode, InteractionMode::Object);
    }

    #[test]
    fn set_parent_detaches_from_previous_parent() {
        let mut host = HostDocument::new();
        let a = host.add_object(SceneObject::new("a"));
        let b = host.add_object(SceneObject::new("b"));
        let child = host.add_object(SceneObject::new("child"));

        host.set_parent(child, a);
        host.set_parent(child, b);

        assert!(host.object(a).children.is_empty());
        assert_eq!(host.object(b).children, vec![child]);
        assert_eq!(host.object(child).parent, Some(b));
    }

    #[test]
    fn temporary_mesh_is_a_marked_copy() {
        let mut host = HostDocument::new();
        let source = host.add_mesh(HostMesh::new("Cube"));
        let derived = host.create_temporary_mesh(source).unwrap();

        let mesh = host.mesh(derived).unwrap();
        assert_eq!(mesh.name, "Cube.export");
        assert!(mesh.temporary);
        assert_eq!(host.mesh_count(), 2);

        host.remove_mesh(derived);
        assert_eq!(host.mesh_count(), 1);
    }

    #[test]
    fn activate_requires_scene_membership() {
        let mut host = HostDocument::new();
        let unlinked = host.add_object(SceneObject::new("loose"));
        assert!(host.activate(0, unlinked).is_err());

        host.link_to_scene(0, unlinked);
        host.activate(0, unlinked).unwrap();
        assert!(host.object(unlinked).selected);
        assert_eq!(host.active_object, Some(unlinked));
    }

    #[test]
    fn scene_roots_skip_parented_objects() {
        let mut host = HostDocument::new();
        let root = host.add_object(SceneObject::new("root"));
        let child = host.add_object(SceneObject::new("child"));
        host.link_to_scene(0, root);
        host.link_to_scene(0, child);
        host.set_parent(child, root);

        assert_eq!(host.scene_roots(0), vec![root]);
    }
}
