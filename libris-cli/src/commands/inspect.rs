//! Inspect command implementation

use super::BookSummary;
use anyhow::{Context, Result};
use libris_core::{BookFile, Ingestor, PluginRegistry};
use std::path::Path;
use std::sync::Arc;

/// Display the metadata read from a book file
pub fn inspect(input: &str, json: bool, model: bool) -> Result<()> {
    let input_path = Path::new(input);
    if !input_path.is_file() {
        anyhow::bail!("No such file: {}", input);
    }

    let ingestor =
        Ingestor::new(Arc::new(PluginRegistry::with_builtin_plugins())).with_model(model);
    let ingested = ingestor
        .ingest(&BookFile::physical(input_path))
        .with_context(|| format!("Failed to read {}", input))?;

    let summary = BookSummary::new(&ingested);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }

    Ok(())
}
