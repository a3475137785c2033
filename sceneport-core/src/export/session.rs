//! Export session orchestration.
//!
//! A session captures host state, normalizes it, runs gathering and
//! assembly, serializes the result, and then releases temporary resources
//! and restores the captured state. Release and restoration run on every
//! non-panic exit path, including assembly or serialization failure.

use crate::cache::ConversionCache;
use crate::config::ExportConfig;
use crate::export::assemble::{assemble_document, to_canonical_value};
use crate::export::gather::{object_passes_filters, EntityConverters, NodeGraphBuilder};
use crate::host::{HostDocument, InteractionMode, MeshId};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors that can occur during an export session
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("scene index {index} is out of range ({count} scenes)")]
    InvalidSceneIndex { index: usize, count: usize },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a completed export session
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Serialized document, canonicalized pretty JSON
    pub bytes: Vec<u8>,
    /// Number of nodes written to the document
    pub node_count: usize,
    /// Number of meshes written to the document
    pub mesh_count: usize,
    /// Number of skins written to the document
    pub skin_count: usize,
}

/// Registry of derived resources created for this session only.
#[derive(Debug, Default)]
struct TemporaryResources {
    meshes: Vec<MeshId>,
}

impl TemporaryResources {
    fn register(&mut self, mesh: MeshId) {
        self.meshes.push(mesh);
    }

    fn release(self, host: &mut HostDocument) {
        let count = self.meshes.len();
        for mesh in self.meshes {
            host.remove_mesh(mesh);
        }
        if count > 0 {
            debug!(count, "released temporary meshes");
        }
    }
}

/// Exports one host scene to canonical document bytes.
pub fn export_scene(
    host: &mut HostDocument,
    scene_index: usize,
    config: &ExportConfig,
) -> Result<ExportOutcome, ExportError> {
    let session_id = Uuid::new_v4();
    info!(%session_id, scene = scene_index, "starting export session");

    if scene_index >= host.scenes.len() {
        return Err(ExportError::InvalidSceneIndex {
            index: scene_index,
            count: host.scenes.len(),
        });
    }

    let captured_frame = host.current_frame;
    if host.mode != InteractionMode::Object {
        host.mode = InteractionMode::Object;
    }
    if !config.current_frame_only {
        host.set_current_frame(0);
    }

    let mut temporaries = TemporaryResources::default();
    let result = run_export(host, scene_index, config, &mut temporaries);

    // Release and restore unconditionally, whatever the body returned.
    temporaries.release(host);
    host.set_current_frame(captured_frame);

    match &result {
        Ok(outcome) => info!(
            %session_id,
            nodes = outcome.node_count,
            bytes = outcome.bytes.len(),
            "export session finished"
        ),
        Err(error) => warn!(%session_id, %error, "export session failed"),
    }
    result
}

/// Exports one host scene and writes the bytes to `path`.
pub fn export_scene_to_path(
    host: &mut HostDocument,
    scene_index: usize,
    config: &ExportConfig,
    path: &Path,
) -> Result<ExportOutcome, ExportError> {
    let outcome = export_scene(host, scene_index, config)?;
    std::fs::write(path, &outcome.bytes)?;
    info!(path = %path.display(), bytes = outcome.bytes.len(), "document written");
    Ok(outcome)
}

fn run_export(
    host: &mut HostDocument,
    scene_index: usize,
    config: &ExportConfig,
    temporaries: &mut TemporaryResources,
) -> Result<ExportOutcome, ExportError> {
    let mut converters = EntityConverters::default();

    // Concrete visibility decisions drive which meshes get a derived copy
    // for geometry extraction.
    let exportable_meshes: Vec<MeshId> = host.scenes[scene_index]
        .objects
        .iter()
        .filter_map(|&id| {
            let object = host.object(id);
            object
                .mesh
                .filter(|_| object_passes_filters(host, config, object))
        })
        .collect();
    for mesh in exportable_meshes {
        if let Some(derived) = host.create_temporary_mesh(mesh) {
            temporaries.register(derived);
            converters.register_derived(mesh, derived);
        }
    }

    let roots = host.scene_roots(scene_index);
    let mut cache = ConversionCache::new();
    let mut builder = NodeGraphBuilder::new(host, config, &mut converters);
    let mut gathered = Vec::new();
    for root in roots {
        if let Some(node) = builder.gather_node(&mut cache, root) {
            gathered.push(node);
        }
    }
    debug!(
        computed = cache.computed_count(),
        cached = cache.len(),
        roots = gathered.len(),
        "node gathering complete"
    );

    let scene_name = host.scenes[scene_index].name.clone();
    let document = assemble_document(&scene_name, gathered, converters.finish(), &config.generator);
    let value = to_canonical_value(&document)?;
    let bytes = serde_json::to_vec_pretty(&value)?;

    Ok(ExportOutcome {
        bytes,
        node_count: document.nodes.len(),
        mesh_count: document.meshes.len(),
        skin_count: document.skins.len(),
    })
}
