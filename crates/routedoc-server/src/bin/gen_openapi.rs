//! Writes the pet store API document to a JSON file.
//!
//! Run with: cargo run --bin gen-openapi -p routedoc-server [legacy|modern]
//!
//! The file lands in the workspace root as `swagger.json` (legacy, the
//! default) or `openapi.json` (modern).

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use routedoc_core::{Dialect, Settings};
use routedoc_server::petstore;
use routedoc_server::state::PetStore;

fn main() -> anyhow::Result<()> {
    let mut settings = Settings::default();
    settings.docs.dialect = match std::env::args().nth(1).as_deref() {
        None | Some("legacy") => Dialect::Legacy,
        Some("modern") => Dialect::Modern,
        Some(other) => anyhow::bail!("unknown dialect '{other}', expected legacy or modern"),
    };

    println!("Generating API document ({:?})...\n", settings.docs.dialect);

    let registry = petstore::registry(&PetStore::default(), &settings)?;
    let document = registry.generate_document();
    let json = document.to_pretty_json()?;

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .context("Could not find workspace root")?;

    let output_path = workspace_root.join(registry.base_document().docs_filename());
    fs::write(&output_path, &json)
        .with_context(|| format!("Failed to write to {}", output_path.display()))?;

    println!("Written to: {}", output_path.display());
    if let Some(paths) = document.as_value().get("paths").and_then(|p| p.as_object()) {
        println!("Paths: {}", paths.len());
    }

    println!("\nAPI document generated successfully!");
    Ok(())
}
