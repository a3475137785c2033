use crate::ui::{info, success};
use anyhow::{Context, Result};
use clap::Args;
use sceneport_core::config::ImportConfig;
use sceneport_core::host::HostDocument;
use sceneport_core::import::import_path;
use std::path::PathBuf;

/// Import an interchange document into a fresh host scene
#[derive(Args)]
pub struct ImportCommand {
    /// Document to import (JSON text)
    pub file: PathBuf,

    /// Import into the current host scene instead of creating one named
    /// after the document scene
    #[arg(long)]
    pub use_current_scene: bool,

    /// Name for the axis-correction root object
    #[arg(long)]
    pub root_name: Option<String>,
}

impl ImportCommand {
    pub fn execute(&self) -> Result<()> {
        info(&format!("Importing {}", self.file.display()));

        let config = ImportConfig {
            use_current_scene: self.use_current_scene,
            root_name: self.root_name.clone(),
        };

        let mut host = HostDocument::new();
        let summary = import_path(&mut host, &self.file, &config)
            .with_context(|| format!("Failed to import {}", self.file.display()))?;

        success(&format!(
            "Imported {} objects into scene '{}' under '{}'",
            summary.objects_created,
            host.scenes[summary.host_scene].name,
            host.object(summary.correction_root).name,
        ));
        Ok(())
    }
}
