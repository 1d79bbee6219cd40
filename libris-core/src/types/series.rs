//! Series membership

use serde::{Deserialize, Serialize};

/// A named series of books
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Series {
    pub title: String,
}

impl Series {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Series information for books that are part of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub series: Series,

    /// Position in series as written in the book ("3", "2.5")
    pub index: Option<String>,
}

impl SeriesInfo {
    pub fn new(title: impl Into<String>, index: Option<String>) -> Self {
        Self {
            series: Series::new(title),
            index,
        }
    }

    /// Numeric position, when the index parses as a number
    pub fn position(&self) -> Option<f32> {
        self.index.as_deref().and_then(|i| i.trim().parse().ok())
    }
}
