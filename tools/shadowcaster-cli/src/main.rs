//! Shadowcaster CLI: validate uploads, shuffle catalogs, compose portraits.
//!
//! Usage:
//!   shadowcaster validate <FILE>         Check an upload is a near-square image
//!   shadowcaster shuffle <CATALOG>       Print base portraits in presentation order
//!   shadowcaster compose --base <FILE>   Composite a portrait and export it as PNG
//!   shadowcaster config                  Print the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shadowcaster_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "shadowcaster",
    about = "Portrait compositing with decorative shadow overlays",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that an image is acceptable as a custom base
    Validate {
        /// Path to the candidate image
        file: PathBuf,
    },

    /// Print the base portraits of a catalog in presentation order
    Shuffle {
        /// Path to the catalog JSON file
        catalog: PathBuf,

        /// Seed for a reproducible order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Composite a base portrait with an optional overlay and export it
    Compose {
        /// Base image file
        #[arg(long)]
        base: PathBuf,

        /// Overlay image file
        #[arg(long, conflicts_with = "overlay_id")]
        overlay: Option<PathBuf>,

        /// Overlay id looked up in --catalog
        #[arg(long, requires = "catalog")]
        overlay_id: Option<String>,

        /// Catalog JSON file for --overlay-id
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file name (defaults to the configured one)
        #[arg(long)]
        name: Option<String>,

        /// Canvas side length in pixels
        #[arg(long)]
        size: Option<u32>,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    shadowcaster_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Validate { file } => commands::validate::run(&config, file).await,
        Commands::Shuffle { catalog, seed } => commands::shuffle::run(catalog, seed),
        Commands::Compose {
            base,
            overlay,
            overlay_id,
            catalog,
            output,
            name,
            size,
        } => {
            commands::compose::run(
                &config,
                commands::compose::ComposeArgs {
                    base,
                    overlay,
                    overlay_id,
                    catalog,
                    output,
                    name,
                    size,
                },
            )
            .await
        }
        Commands::Config => commands::config::run(&config),
    }
}
