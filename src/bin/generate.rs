//! Schema Generation CLI
//!
//! Generates the schema document of one entity from a descriptor catalog,
//! or checks that a stored document is still in sync.
//!
//! Usage:
//!   schema-generate --catalog types.json --entity user
//!   schema-generate --catalog types.json --entity user --output schemas/user.json
//!   schema-generate --catalog types.json --entity user --check schemas/user.json

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use entity_schemas::{
    render, Checksum, DescriptorCatalog, GeneratorConfig, OutputFormat, SchemaGenerator,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-generate")]
#[command(about = "Generate entity schema documents from type descriptors")]
struct Cli {
    /// Path to the descriptor catalog (JSON array of type descriptors)
    #[arg(short, long)]
    catalog: PathBuf,

    /// Entity name or type identity to generate
    #[arg(short, long)]
    entity: String,

    /// Config file (defaults to entity-schemas.toml lookup)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compare against a stored document instead of writing
    #[arg(long, conflicts_with = "output")]
    check: Option<PathBuf>,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns `false` when a checked document is out of sync
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = GeneratorConfig::load_from(cli.config.as_deref()).context("loading config")?;

    let catalog = DescriptorCatalog::load(&cli.catalog)
        .with_context(|| format!("loading catalog {:?}", cli.catalog))?;
    let root = catalog
        .find_entity(&cli.entity)
        .cloned()
        .ok_or_else(|| anyhow!("entity '{}' not found in catalog", cli.entity))?;

    let generator = SchemaGenerator::with_config(&catalog, &config);
    let schema = generator
        .generate_from(&root)
        .with_context(|| format!("generating schema for '{}'", root.entity_name))?;

    if let Some(stored_path) = cli.check {
        let content = fs::read_to_string(&stored_path)
            .with_context(|| format!("reading {:?}", stored_path))?;
        let stored: serde_json::Value = serde_json::from_str(&content)?;

        let current = Checksum::of_schema(&schema);
        if current.verify_json(&stored) {
            eprintln!("✅ {} is in sync ({})", schema.name, current);
            return Ok(true);
        }
        eprintln!("⚠️  {} is out of date - regenerate {:?}", schema.name, stored_path);
        return Ok(false);
    }

    let format = if cli.compact {
        OutputFormat::Compact
    } else {
        config.output.format
    };
    let rendered = render::to_string(&schema, format)?;

    match cli.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, rendered + "\n")?;
            eprintln!("✅ Wrote {} v{} to {:?}", schema.name, schema.version, path);
        }
        None => println!("{}", rendered),
    }

    Ok(true)
}
