//! Import pipeline: interchange document → host hierarchy.

pub mod animation;
pub mod scene;
pub mod skin;

use thiserror::Error;

/// Errors that can occur during scene import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("scene index {index} is out of range ({count} scenes)")]
    InvalidSceneIndex { index: usize, count: usize },

    #[error("node index {0} is out of range")]
    InvalidNodeIndex(usize),

    #[error("mesh index {0} is out of range")]
    InvalidMeshIndex(usize),

    #[error("camera index {0} is out of range")]
    InvalidCameraIndex(usize),

    #[error("skin {0} is bound to a node with no mesh")]
    SkinTargetWithoutMesh(usize),

    #[error("skin {0} has no instantiated target node")]
    MissingSkinTarget(usize),

    #[error("skin {skin} influence references joint slot {slot} out of range")]
    InvalidJointSlot { skin: usize, slot: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub use scene::{import_path, import_scene, ImportSummary, DEFAULT_ROOT_NAME};
