//! Export pipeline: host hierarchy → interchange document.

pub mod assemble;
pub mod gather;
pub mod session;

pub use assemble::{assemble_document, to_canonical_value};
pub use gather::{
    ConvertedEntities, EntityConverters, NodeGraphBuilder, PendingSkin, DUPLICATION_PREFIX,
};
pub use session::{export_scene, export_scene_to_path, ExportError, ExportOutcome};
