//! Scene reconstruction from a parsed document.
//!
//! Import runs in strictly ordered passes: node instantiation, skin
//! wiring, animation application, then one axis-correction wrapper for
//! the whole session.

use crate::config::ImportConfig;
use crate::document::{self, Document};
use crate::host::{CameraKind, HostDocument, HostMesh, ObjectId, SceneObject};
use crate::import::{animation, skin, ImportError};
use crate::transform::AXIS_CORRECTION;
use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default name for the axis-correction root object.
pub const DEFAULT_ROOT_NAME: &str = "GLTF_model";

/// Result of a completed import
#[derive(Debug, Clone)]
pub struct ImportSummary {
    /// Index of the host scene the content was imported into
    pub host_scene: usize,
    /// The axis-correction root object parenting all imported roots
    pub correction_root: ObjectId,
    /// Number of document nodes instantiated (excluding the correction root)
    pub objects_created: usize,
}

/// Reads a document from a JSON file and imports its default scene.
pub fn import_path(
    host: &mut HostDocument,
    path: &Path,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    let bytes = std::fs::read(path)?;
    let document = Document::from_json_bytes(&bytes)?;
    let scene_index = document.scene.unwrap_or(0);
    import_scene(host, &document, scene_index, config)
}

/// Imports one document scene into the host world.
pub fn import_scene(
    host: &mut HostDocument,
    document: &Document,
    scene_index: usize,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    let scene = document
        .scenes
        .get(scene_index)
        .ok_or(ImportError::InvalidSceneIndex {
            index: scene_index,
            count: document.scenes.len(),
        })?;
    info!(
        scene = scene_index,
        roots = scene.nodes.len(),
        "starting scene import"
    );

    let target_scene = resolve_target_scene(host, scene.name.as_deref(), config);
    host.clear_selection();

    let mut importer = SceneImporter {
        host: &mut *host,
        document,
        target_scene,
        node_objects: HashMap::new(),
    };

    // Node instantiation: one host object per document node, parents
    // created before their children.
    let mut roots = Vec::new();
    for &node_index in &scene.nodes {
        let root = importer.create_node(node_index, None)?;
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    let node_objects = importer.node_objects;

    // Skin wiring: each pass completes across the whole document before
    // the next starts, so vertex-group identity is stable before weights
    // or modifiers reference it.
    for skin_index in 0..document.skins.len() {
        skin::create_vertex_groups(host, document, &node_objects, skin_index)?;
    }
    for skin_index in 0..document.skins.len() {
        skin::assign_vertex_weights(host, document, &node_objects, skin_index)?;
    }
    for skin_index in 0..document.skins.len() {
        skin::attach_armature_modifiers(host, document, &node_objects, skin_index)?;
    }

    // Animations come after all skin wiring, so animated skin targets
    // already exist.
    for animation_index in 0..document.animations.len() {
        for &node_index in &scene.nodes {
            animation::apply_animation(host, document, &node_objects, animation_index, node_index);
        }
    }

    let objects_created = node_objects.len();
    let correction_root = create_correction_root(host, target_scene, config, &roots);

    // Cosmetic: hand the fresh content to the user for immediate
    // transformation. Failure here is logged and intentionally discarded.
    host.clear_selection();
    if let Err(error) = host.activate(target_scene, correction_root) {
        warn!(%error, "could not select imported root");
    }

    info!(
        objects = objects_created,
        scene = target_scene,
        "scene import finished"
    );
    Ok(ImportSummary {
        host_scene: target_scene,
        correction_root,
        objects_created,
    })
}

/// Resolves the host scene to import into: reuse an existing scene of the
/// same name, otherwise create one when the document scene is named and
/// the caller did not ask for the current scene.
fn resolve_target_scene(
    host: &mut HostDocument,
    scene_name: Option<&str>,
    config: &ImportConfig,
) -> usize {
    let name = scene_name.unwrap_or("");
    match host.scene_index_by_name(name) {
        Some(existing) => existing,
        None if !name.is_empty() && !config.use_current_scene => host.create_scene(name),
        None => host.current_scene,
    }
}

/// Creates the single axis-correction root, re-parents all top-level
/// imports under it, and places it at the scene's 3D cursor.
fn create_correction_root(
    host: &mut HostDocument,
    target_scene: usize,
    config: &ImportConfig,
    roots: &[ObjectId],
) -> ObjectId {
    let name = config
        .root_name
        .clone()
        .unwrap_or_else(|| DEFAULT_ROOT_NAME.to_string());
    let cursor = host.scenes[target_scene].cursor;

    let mut object = SceneObject::new(name);
    object.matrix_local = Mat4::from_rotation_translation(AXIS_CORRECTION, cursor);
    let root = host.add_object(object);
    host.link_to_scene(target_scene, root);
    for &imported in roots {
        host.set_parent(imported, root);
    }
    root
}

struct SceneImporter<'a> {
    host: &'a mut HostDocument,
    document: &'a Document,
    target_scene: usize,
    /// Host object created for each document node index.
    node_objects: HashMap<usize, ObjectId>,
}

impl SceneImporter<'_> {
    fn create_node(
        &mut self,
        node_index: usize,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, ImportError> {
        if let Some(&existing) = self.node_objects.get(&node_index) {
            return Ok(existing);
        }
        let document = self.document;
        let node = document
            .nodes
            .get(node_index)
            .ok_or(ImportError::InvalidNodeIndex(node_index))?;
        let name = node
            .name
            .clone()
            .unwrap_or_else(|| format!("Node_{node_index}"));
        debug!(node = node_index, name = %name, "creating host object");

        let mesh = match node.mesh {
            Some(mesh_index) => {
                let mesh = document
                    .meshes
                    .get(mesh_index)
                    .ok_or(ImportError::InvalidMeshIndex(mesh_index))?;
                let mesh_name = mesh
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Mesh_{mesh_index}"));
                Some(self.host.add_mesh(HostMesh::new(mesh_name)))
            }
            None => None,
        };
        let camera = match node.camera {
            Some(camera_index) => {
                let camera = document
                    .cameras
                    .get(camera_index)
                    .ok_or(ImportError::InvalidCameraIndex(camera_index))?;
                Some(match camera.kind.as_str() {
                    "orthographic" => CameraKind::Orthographic,
                    _ => CameraKind::Perspective,
                })
            }
            None => None,
        };

        let mut object = SceneObject::new(name);
        object.matrix_local = node_local_matrix(node);
        object.mesh = mesh;
        object.camera = camera;
        object.parent = parent;
        let id = self.host.add_object(object);
        self.host.link_to_scene(self.target_scene, id);
        if let Some(parent) = parent {
            self.host.object_mut(parent).children.push(id);
        }
        self.node_objects.insert(node_index, id);

        for &child_index in &node.children {
            self.create_node(child_index, Some(id))?;
        }
        Ok(id)
    }
}

/// Local transform of a document node. Node transforms are applied in the
/// interchange convention as-is; the single correction root reconciles the
/// up-axis difference for the whole import.
fn node_local_matrix(node: &document::Node) -> Mat4 {
    if let Some(matrix) = node.matrix {
        return Mat4::from_cols_array(&matrix);
    }
    let translation = node.translation.map(Vec3::from).unwrap_or(Vec3::ZERO);
    let rotation = node.rotation.map(Quat::from_array).unwrap_or(Quat::IDENTITY);
    let scale = node.scale.map(Vec3::from).unwrap_or(Vec3::ONE);
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}
