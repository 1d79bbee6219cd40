//! CLI command implementations

mod check_filter;
mod filter;
mod formats;
mod inspect;
mod scan;

pub use check_filter::check_filter;
pub use filter::filter;
pub use formats::formats;
pub use inspect::inspect;
pub use scan::scan;

use anyhow::{Context, Result};
use libris_core::filter::xml::from_xml;
use libris_core::{Filter, Ingested};
use serde::Serialize;
use std::fs;

/// Book summary output
#[derive(Serialize)]
struct BookSummary {
    title: String,
    authors: Vec<String>,
    tags: Vec<String>,
    series: Option<String>,
    series_index: Option<String>,
    language: String,
    encoding: String,
    publication_date: Option<String>,
    uids: Vec<String>,
    file: String,
    file_type: String,
    has_cover: bool,
    annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chapters: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paragraphs: Option<usize>,
}

impl BookSummary {
    fn new(ingested: &Ingested) -> Self {
        let book = &ingested.book;
        Self {
            title: book.title.clone(),
            authors: book.authors.iter().map(|a| a.display_name.clone()).collect(),
            tags: book.tags.iter().map(|t| t.to_string()).collect(),
            series: book.series_info.as_ref().map(|s| s.series.title.clone()),
            series_index: book.series_info.as_ref().and_then(|s| s.index.clone()),
            language: book.language.clone(),
            encoding: book.encoding.clone(),
            publication_date: book.publication_date.map(|d| d.to_string()),
            uids: book
                .uids
                .iter()
                .map(|u| format!("{}:{}", u.kind, u.value))
                .collect(),
            file: ingested.source.to_string(),
            file_type: ingested.file_type.clone(),
            has_cover: ingested.cover.is_some(),
            annotation: ingested.annotation.clone(),
            chapters: ingested.model.as_ref().map(|m| m.chapters.len()),
            paragraphs: ingested.model.as_ref().map(|m| m.paragraph_count()),
        }
    }

    fn print(&self) {
        println!("Title:       {}", self.title);
        if !self.authors.is_empty() {
            println!("Authors:     {}", self.authors.join(", "));
        }
        if !self.tags.is_empty() {
            println!("Tags:        {}", self.tags.join(", "));
        }
        if let Some(series) = &self.series {
            match &self.series_index {
                Some(index) => println!("Series:      {} #{}", series, index),
                None => println!("Series:      {}", series),
            }
        }
        if !self.language.is_empty() {
            println!("Language:    {}", self.language);
        }
        println!("Encoding:    {}", self.encoding);
        if let Some(date) = &self.publication_date {
            println!("Published:   {}", date);
        }
        for uid in &self.uids {
            println!("Uid:         {}", uid);
        }
        println!("File:        {} ({})", self.file, self.file_type);
        println!("Cover:       {}", if self.has_cover { "yes" } else { "no" });
        if let Some(annotation) = &self.annotation {
            println!("Annotation:  {}", annotation);
        }
        if let (Some(chapters), Some(paragraphs)) = (self.chapters, self.paragraphs) {
            println!("Chapters:    {}", chapters);
            println!("Paragraphs:  {}", paragraphs);
        }
    }
}

/// Read and parse a filter file
fn load_filter(path: &str) -> Result<Filter> {
    let xml =
        fs::read_to_string(path).with_context(|| format!("Failed to read filter file: {}", path))?;
    from_xml(&xml).with_context(|| format!("Invalid filter in {}", path))
}
