use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod ui;

use commands::{import::ImportCommand, roundtrip::RoundtripCommand};

/// sceneport CLI - convert between host scenes and interchange documents
#[derive(Parser)]
#[command(
    name = "sceneport",
    version = env!("CARGO_PKG_VERSION"),
    about = "Bidirectional bridge between host 3D scene hierarchies and interchange documents",
    long_about = None,
    arg_required_else_help = true
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an interchange document into a fresh host scene
    Import(ImportCommand),

    /// Import a document and export it straight back out
    Roundtrip(RoundtripCommand),

    /// Show version and library information
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize colored output
    colored::control::set_override(!cli.no_color);

    // Initialize logging
    init_logging(cli.verbose)?;

    // Any error propagating out of a command exits the process with
    // status 1.
    match &cli.command {
        Commands::Import(cmd) => cmd.execute(),
        Commands::Roundtrip(cmd) => cmd.execute(),
        Commands::Info => show_info(),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("sceneport_core={level},sceneport_cli={level}"))
        .with_target(false)
        .init();

    Ok(())
}

fn show_info() -> Result<()> {
    ui::info(&format!("sceneport-core v{}", sceneport_core::VERSION));
    ui::info(&format!("sceneport-cli v{}", env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_accepts_a_path_after_double_dash() {
        let cli = Cli::try_parse_from(["sceneport", "import", "--", "model.gltf"]).unwrap();
        match cli.command {
            Commands::Import(cmd) => {
                assert_eq!(cmd.file.to_str(), Some("model.gltf"));
            }
            _ => panic!("expected import command"),
        }
    }
}
