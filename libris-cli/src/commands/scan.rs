//! Scan command implementation

use super::{load_filter, BookSummary};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use libris_core::{Filter, Ingestor, PluginRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Read every supported book in a directory and list the accepted ones
pub fn scan(dir: &str, filter_path: Option<&str>, jobs: usize, json: bool) -> Result<()> {
    let filter = match filter_path {
        Some(path) => load_filter(path)?,
        None => Filter::Empty,
    };
    tracing::debug!("Scanning {} with filter {}", dir, filter);

    let ingestor = Ingestor::new(Arc::new(PluginRegistry::with_builtin_plugins()));
    let files = ingestor
        .discover(Path::new(dir))
        .with_context(|| format!("Failed to read directory: {}", dir))?;

    if files.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No supported files found in {}", dir);
        }
        return Ok(());
    }

    // Configure thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .ok(); // Ignore if already configured

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(format!("Reading {} files", files.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let results = ingestor.ingest_all(&files);
    spinner.finish_and_clear();

    let mut accepted = Vec::new();
    let mut failures = 0usize;
    for (file, result) in &results {
        match result {
            Ok(ingested) if filter.accepts(&ingested.book) => {
                accepted.push(BookSummary::new(ingested))
            }
            Ok(_) => tracing::debug!("{} rejected by filter", file),
            Err(e) => {
                failures += 1;
                eprintln!("Failed: {}: {}", file, e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&accepted)?);
    } else {
        for summary in &accepted {
            if summary.authors.is_empty() {
                println!("{} [{}]", summary.title, summary.file);
            } else {
                println!(
                    "{} by {} [{}]",
                    summary.title,
                    summary.authors.join(", "),
                    summary.file
                );
            }
        }
        println!(
            "{} of {} books matched, {} failed",
            accepted.len(),
            results.len(),
            failures
        );
    }

    Ok(())
}
