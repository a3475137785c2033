//! # sceneport-core
//!
//! Bidirectional bridge between a host 3D application's live scene-object
//! hierarchy and a flat, index-addressed interchange document graph.
//!
//! This crate provides the conversion core, including:
//! - A host scene model with objects, duplication groups and meshes
//! - Recursive node gathering with visibility filters and memoization
//! - Transform decomposition across two coordinate conventions
//! - Document assembly with a canonical serialized form
//! - Scene import with ordered skin-wiring and animation passes
//!
//! ## Architecture
//!
//! Export flows host → [`export::NodeGraphBuilder`] (using
//! [`ConversionCache`] and [`transform::decompose_transform`]) →
//! [`export::assemble_document`] → canonical bytes. Import consumes a
//! parsed [`Document`] and rebuilds a host hierarchy in strictly ordered
//! passes. The two directions share only the document schema.
//!
//! Sessions are single-threaded and synchronous: one caller drives one
//! session to completion, and session-scoped state (cache, temporary
//! resources) is owned exclusively for its lifetime.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sceneport_core::{
//!     config::{ExportConfig, ImportConfig},
//!     export::export_scene,
//!     host::{HostDocument, SceneObject},
//!     import::import_path,
//! };
//! use std::path::Path;
//!
//! let mut host = HostDocument::new();
//! let cube = host.add_object(SceneObject::new("Cube"));
//! host.link_to_scene(0, cube);
//!
//! // Host scene → canonical document bytes.
//! let outcome = export_scene(&mut host, 0, &ExportConfig::default())?;
//! println!("exported {} nodes", outcome.node_count);
//!
//! // Document file → host scene.
//! let mut target = HostDocument::new();
//! import_path(&mut target, Path::new("model.gltf"), &ImportConfig::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod config;
pub mod document;
pub mod export;
pub mod host;
pub mod import;
pub mod transform;

#[cfg(test)]
mod test_integration;

// Re-export commonly used types
pub use cache::ConversionCache;
pub use config::{ConfigFingerprint, ExportConfig, ImportConfig};
pub use document::{canonicalize, Document, GraphNode};
pub use export::{
    export_scene, export_scene_to_path, ExportError, ExportOutcome, NodeGraphBuilder,
};
pub use host::{
    DuplicationGroup, HostDocument, HostMesh, HostScene, InteractionMode, SceneObject,
};
pub use import::{import_path, import_scene, ImportError, ImportSummary};
pub use transform::{decompose_transform, TransformRole, Trs};

use anyhow::Result;
use tracing::info;

/// Version information for the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with structured logging
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sceneport_core=info")
        .with_target(false)
        .try_init();

    info!("Initializing sceneport-core v{}", VERSION);

    Ok(())
}
