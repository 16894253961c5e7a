//! hostapi-gen
//!
//! Offline generator for the host API bridge: discovers the capability
//! catalog, builds the schema, and writes the artifact tree (schema JSON,
//! TypeScript definitions, Angular services, npm package, Rust glue).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bridge_codegen::{GeneratorConfig, SchemaBuilder, discover, write_artifacts};
use bridge_hostapi::{active_candidates, catalog};

/// Host API artifact generator
#[derive(Parser, Debug)]
#[command(name = "hostapi-gen")]
#[command(about = "Generate host API bridge artifacts", long_about = None)]
struct Args {
    /// Directory the artifact tree is written into
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Name of the distributable npm package
    #[arg(long, default_value = "@hostbridge/api")]
    package_name: String,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting hostapi-gen v{}", env!("CARGO_PKG_VERSION"));

    let (objects, warnings) = discover(&active_candidates());
    for warning in &warnings {
        warn!("{}", warning);
    }
    info!("Discovered {} capabilities", objects.len());

    let schema = SchemaBuilder::new(catalog::VERSION)
        .with_event_types(catalog::EVENT_TYPES.iter().copied())
        .with_objects(objects)
        .build();

    let config = GeneratorConfig {
        output_dir: args.output_dir,
        package_name: args.package_name,
    };
    let written = write_artifacts(&schema, &config).context("failed to write artifacts")?;
    info!(
        "Wrote {} artifacts to {}",
        written.len(),
        config.output_dir.display()
    );
    Ok(())
}
