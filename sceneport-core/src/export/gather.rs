//! Recursive conversion of host objects into interchange graph nodes.

use crate::cache::ConversionCache;
use crate::config::{ConfigFingerprint, ExportConfig};
use crate::document::{self, GraphNode};
use crate::host::{CameraKind, HostDocument, MeshId, ObjectId, SceneObject};
use crate::transform::{decompose_transform, TransformRole};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Fixed prefix for duplication-group instancing nodes, so synthesized
/// names cannot collide with ordinary object names.
pub const DUPLICATION_PREFIX: &str = "Duplication_Offset_";

/// A skin gathered from an armature object. Joints are node names until
/// assembly assigns indices, keeping graph nodes free of host identifiers.
#[derive(Debug, Clone)]
pub struct PendingSkin {
    pub name: String,
    pub joint_names: Vec<String>,
    pub skeleton_name: String,
}

/// Session-scoped interning of converted auxiliary entities.
///
/// Mesh and camera payload conversion lives outside this core; the
/// registries here only hand out stable document indices for each distinct
/// source entity.
#[derive(Debug, Default)]
pub struct EntityConverters {
    meshes: Vec<document::Mesh>,
    mesh_index: HashMap<MeshId, usize>,
    cameras: Vec<document::Camera>,
    camera_index: HashMap<ObjectId, usize>,
    skins: Vec<PendingSkin>,
    skin_index: HashMap<ObjectId, usize>,
    derived: HashMap<MeshId, MeshId>,
}

/// Converted entities handed to the assembler once gathering is done.
#[derive(Debug, Default)]
pub struct ConvertedEntities {
    pub meshes: Vec<document::Mesh>,
    pub cameras: Vec<document::Camera>,
    pub skins: Vec<PendingSkin>,
}

impl EntityConverters {
    /// Records the temporary derived mesh standing in for a source mesh.
    pub fn register_derived(&mut self, source: MeshId, derived: MeshId) {
        self.derived.insert(source, derived);
    }

    fn convert_mesh(&mut self, host: &HostDocument, mesh: MeshId) -> Option<usize> {
        if let Some(&index) = self.mesh_index.get(&mesh) {
            return Some(index);
        }
        // Geometry is read from the derived copy; the document entry keeps
        // the source name.
        let derived = self.derived.get(&mesh).copied().unwrap_or(mesh);
        host.mesh(derived)?;
        let name = host.mesh(mesh)?.name.clone();

        let index = self.meshes.len();
        self.meshes.push(document::Mesh {
            name: Some(name),
            ..document::Mesh::default()
        });
        self.mesh_index.insert(mesh, index);
        Some(index)
    }

    fn convert_camera(&mut self, object: ObjectId, name: &str, kind: CameraKind) -> usize {
        if let Some(&index) = self.camera_index.get(&object) {
            return index;
        }
        let index = self.cameras.len();
        self.cameras.push(document::Camera {
            name: Some(name.to_string()),
            kind: match kind {
                CameraKind::Perspective => "perspective".to_string(),
                CameraKind::Orthographic => "orthographic".to_string(),
            },
            ..document::Camera::default()
        });
        self.camera_index.insert(object, index);
        index
    }

    fn convert_skin(&mut self, host: &HostDocument, armature: ObjectId) -> usize {
        if let Some(&index) = self.skin_index.get(&armature) {
            return index;
        }
        let root = host.object(armature);
        let mut joint_names = Vec::new();
        let mut pending = root.children.clone();
        while let Some(joint) = pending.pop() {
            let object = host.object(joint);
            joint_names.push(object.name.clone());
            pending.extend(object.children.iter().copied());
        }

        let index = self.skins.len();
        self.skins.push(PendingSkin {
            name: root.name.clone(),
            joint_names,
            skeleton_name: root.name.clone(),
        });
        self.skin_index.insert(armature, index);
        index
    }

    pub fn finish(self) -> ConvertedEntities {
        ConvertedEntities {
            meshes: self.meshes,
            cameras: self.cameras,
            skins: self.skins,
        }
    }
}

/// Visibility policy applied before any conversion work. An object failing
/// any clause is excluded entirely.
pub(crate) fn object_passes_filters(
    host: &HostDocument,
    config: &ExportConfig,
    object: &SceneObject,
) -> bool {
    if object.users == 0 {
        return false;
    }
    if config.selected_only && !object.selected {
        return false;
    }
    if !config.include_all_layers && !object.layer_visible {
        return false;
    }
    if let Some(group) = object.duplication_group {
        if !host.group(group).layer_visible {
            return false;
        }
    }
    true
}

/// Builds the interchange node graph for an export session.
pub struct NodeGraphBuilder<'a> {
    host: &'a HostDocument,
    config: &'a ExportConfig,
    fingerprint: ConfigFingerprint,
    converters: &'a mut EntityConverters,
    /// Objects on the active traversal path, for cycle refusal.
    path: Vec<ObjectId>,
}

impl<'a> NodeGraphBuilder<'a> {
    pub fn new(
        host: &'a HostDocument,
        config: &'a ExportConfig,
        converters: &'a mut EntityConverters,
    ) -> Self {
        Self {
            host,
            config,
            fingerprint: config.fingerprint(),
            converters,
            path: Vec::new(),
        }
    }

    /// Converts one host object and its subtree into a graph node.
    /// Filtered objects yield `None`.
    pub fn gather_node(
        &mut self,
        cache: &mut ConversionCache,
        object: ObjectId,
    ) -> Option<GraphNode> {
        if self.path.contains(&object) {
            // Path-dependent refusal; deliberately not memoized.
            warn!(
                object = %self.host.object(object).name,
                "refusing to re-enter object already on the traversal path"
            );
            return None;
        }
        let fingerprint = self.fingerprint;
        cache.get_or_compute(object, fingerprint, |cache| self.convert(cache, object))
    }

    fn convert(&mut self, cache: &mut ConversionCache, id: ObjectId) -> Option<GraphNode> {
        let host = self.host;
        let object = host.object(id);
        if !object_passes_filters(host, self.config, object) {
            debug!(object = %object.name, "object excluded by export filters");
            return None;
        }

        let group = object.duplication_group.map(|gid| host.group(gid));

        self.path.push(id);
        let mut children = Vec::new();
        for &child in &object.children {
            if let Some(node) = self.gather_node(cache, child) {
                children.push(node);
            }
        }
        // Members of an instanced group become children of the instancing
        // node, as if parented to it.
        if let Some(group) = group {
            for &member in &group.members {
                if let Some(node) = self.gather_node(cache, member) {
                    children.push(node);
                }
            }
        }
        self.path.pop();

        let role = match group {
            Some(group) => TransformRole::DuplicationOffset(group.offset),
            None => TransformRole::Node,
        };
        let trs = decompose_transform(object.matrix_local, role);

        let name = match group {
            Some(group) => format!("{DUPLICATION_PREFIX}{}", group.name),
            None => object.name.clone(),
        };

        let mesh = object
            .mesh
            .and_then(|mesh| self.converters.convert_mesh(host, mesh));
        let camera = object
            .camera
            .map(|kind| self.converters.convert_camera(id, &object.name, kind));
        // The target schema keeps skin and mesh on the same node; the host
        // attaches the deforming armature as a sibling modifier instead,
        // so the skin comes from the armature object.
        let skin = object
            .armature_modifier
            .map(|armature| self.converters.convert_skin(host, armature));

        Some(GraphNode {
            camera,
            children,
            extensions: BTreeMap::new(),
            extras: None,
            matrix: None,
            mesh,
            name,
            rotation: trs.rotation,
            scale: trs.scale,
            skin,
            translation: trs.translation,
            weights: Vec::new(),
        })
    }
}
