//! Error types for Libris Core

use thiserror::Error;

/// Result type alias using LibrisError
pub type Result<T> = std::result::Result<T, LibrisError>;

/// Top-level error type for all Libris operations
#[derive(Debug, Error)]
pub enum LibrisError {
    #[error("Book reading error: {0}")]
    Reading(#[from] BookReadingError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterXmlError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by format readers when a book file cannot be parsed
#[derive(Debug, Error)]
pub enum BookReadingError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid archive {path}: {reason}")]
    Archive { path: String, reason: String },

    #[error("Malformed {format} file: {reason}")]
    Malformed { format: String, reason: String },

    #[error("Missing <{element}> in {format} file")]
    MissingElement { format: String, element: String },

    #[error("Unsupported encoding: {0}")]
    Encoding(String),
}

impl BookReadingError {
    /// Shorthand for a structural failure in the given format
    pub fn malformed(format: impl Into<String>, reason: impl ToString) -> Self {
        BookReadingError::Malformed {
            format: format.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a required element that is absent
    pub fn missing(format: impl Into<String>, element: impl Into<String>) -> Self {
        BookReadingError::MissingElement {
            format: format.into(),
            element: element.into(),
        }
    }
}

/// Errors that occur while reading or writing the persisted form of a filter
#[derive(Debug, Error)]
pub enum FilterXmlError {
    #[error("Invalid filter XML: {0}")]
    Xml(String),

    #[error("Unknown filter element: <{0}>")]
    UnknownElement(String),

    #[error("Unknown filter type: {0}")]
    UnknownType(String),

    #[error("Filter of type '{kind}' is missing attribute '{attribute}'")]
    MissingAttribute { kind: String, attribute: String },

    #[error("<{tag}> expects exactly two child filters, found {found}")]
    ChildCount { tag: String, found: usize },

    #[error("Filter document is empty")]
    Empty,
}

impl From<quick_xml::Error> for FilterXmlError {
    fn from(e: quick_xml::Error) -> Self {
        FilterXmlError::Xml(e.to_string())
    }
}

impl From<std::io::Error> for FilterXmlError {
    fn from(e: std::io::Error) -> Self {
        FilterXmlError::Xml(e.to_string())
    }
}

/// Errors that abort the ingestion of a single book
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No readable book inside {0}")]
    NoReadableEntry(String),

    #[error(transparent)]
    Reading(#[from] BookReadingError),
}
