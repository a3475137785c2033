use serde::{Deserialize, Serialize};

/// Export configuration options
///
/// Every recognized option is an explicit field with a documented effect;
/// there is no open-ended option map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export only objects that are currently selected in the host scene
    pub selected_only: bool,
    /// Export objects regardless of their layer visibility
    pub include_all_layers: bool,
    /// Export at the host's current animation frame instead of rewinding
    /// to frame 0 for the duration of the session
    pub current_frame_only: bool,
    /// Generator string written into the document's asset block
    pub generator: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            selected_only: false,
            include_all_layers: true,
            current_frame_only: false,
            generator: format!("sceneport-core v{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ExportConfig {
    /// Identity of this configuration for conversion-cache keying.
    ///
    /// Two configurations with equal fingerprints produce identical
    /// conversion results for the same object within a session.
    pub fn fingerprint(&self) -> ConfigFingerprint {
        let encoded = serde_json::to_vec(self).expect("config serializes to JSON");
        ConfigFingerprint(*blake3::hash(&encoded).as_bytes())
    }
}

/// Import configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Import into the current host scene rather than creating a new one
    /// named after the document scene
    pub use_current_scene: bool,
    /// Name for the synthetic axis-correction root object
    pub root_name: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            use_current_scene: true,
            root_name: None,
        }
    }
}

/// Content hash of an export configuration, used as part of the
/// conversion-cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint([u8; 32]);
