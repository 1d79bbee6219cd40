//! The library's book record

use super::{Author, SeriesInfo, Tag, Uid};
use crate::fs::BookFile;
use crate::title_sort;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Encoding value meaning "let the reader detect it"
pub const AUTO_ENCODING: &str = "auto";

/// A book in the library
///
/// Format readers fill in the descriptive fields; the library owns labels
/// and the bookmark flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Unique identifier for this record
    pub id: Uuid,

    /// File the book is read from
    #[serde(default)]
    pub file: BookFile,

    pub title: String,

    /// Authors in the order the book lists them
    #[serde(default)]
    pub authors: Vec<Author>,

    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Free-text labels set by the user ("favorite", "to-read")
    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub series_info: Option<SeriesInfo>,

    #[serde(default)]
    pub has_bookmark: bool,

    /// Language code (ISO 639-1), empty when unknown
    #[serde(default)]
    pub language: String,

    /// Text encoding name, or "auto"
    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default)]
    pub publication_date: Option<NaiveDate>,

    #[serde(default)]
    pub uids: Vec<Uid>,
}

fn default_encoding() -> String {
    AUTO_ENCODING.to_string()
}

impl Book {
    /// Create an empty record for the given file
    pub fn new(file: BookFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            file,
            title: String::new(),
            authors: Vec::new(),
            tags: Vec::new(),
            labels: Vec::new(),
            series_info: None,
            has_bookmark: false,
            language: String::new(),
            encoding: default_encoding(),
            publication_date: None,
            uids: Vec::new(),
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add an author
    pub fn with_author(mut self, author: Author) -> Self {
        self.add_author(author);
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.add_tag(tag);
        self
    }

    /// Add a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.add_label(label);
        self
    }

    /// Set series information
    pub fn with_series(mut self, info: SeriesInfo) -> Self {
        self.series_info = Some(info);
        self
    }

    /// Set the bookmark flag
    pub fn with_bookmark(mut self, has_bookmark: bool) -> Self {
        self.has_bookmark = has_bookmark;
        self
    }

    /// Add an author unless already present
    pub fn add_author(&mut self, author: Author) {
        if !self.authors.contains(&author) {
            self.authors.push(author);
        }
    }

    /// Add a tag unless already present
    pub fn add_tag(&mut self, tag: Tag) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Add a label unless already present
    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    /// Add a uid unless already present
    pub fn add_uid(&mut self, uid: Uid) {
        if !self.uids.contains(&uid) {
            self.uids.push(uid);
        }
    }

    /// Get the primary author (first listed)
    pub fn primary_author(&self) -> Option<&Author> {
        self.authors.first()
    }

    /// Title reduced for sorting
    pub fn sort_key(&self) -> String {
        title_sort::trim(&self.title)
    }

    /// The letter this book is grouped under in alphabetical listings
    pub fn first_title_letter(&self) -> String {
        title_sort::first_letter(&self.title)
    }

    /// Free-text match against title, authors, tags and labels
    ///
    /// `pattern` is expected to be lower-cased already.
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(pattern);

        hit(&self.title)
            || self.authors.iter().any(|a| hit(&a.display_name))
            || self.tags.iter().any(|t| hit(&t.name))
            || self.labels.iter().any(|l| hit(l))
    }
}
