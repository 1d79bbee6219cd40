//! Filter command implementation

use super::load_filter;
use anyhow::{Context, Result};
use libris_core::{title_sort, Book, Filter};
use std::fs;

/// Print the titles of the library books a filter accepts, in title order
pub fn filter(library: &str, filter_path: &str, bookmarked_only: bool) -> Result<()> {
    let json = fs::read_to_string(library)
        .with_context(|| format!("Failed to read library file: {}", library))?;
    let books: Vec<Book> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid library file: {}", library))?;

    let mut filter = load_filter(filter_path)?;
    if bookmarked_only {
        filter = Filter::and(filter, Filter::HasBookmark);
    }
    tracing::debug!("Evaluating {} over {} books", filter, books.len());

    let mut selected = filter.select(&books);
    selected.sort_by(|a, b| title_sort::compare(&a.title, &b.title));
    for book in selected {
        println!("{}", book.title);
    }

    Ok(())
}
