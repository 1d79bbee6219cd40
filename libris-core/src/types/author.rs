//! Book author

use serde::{Deserialize, Serialize};

/// A book author as shown to the user and as sorted in listings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    /// Name shown to the user ("Leo Tolstoy")
    pub display_name: String,

    /// Key used for ordering ("tolstoy leo")
    pub sort_key: String,
}

impl Author {
    pub fn new(display_name: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            sort_key: sort_key.into(),
        }
    }

    /// The sentinel author that stands for "no author at all"
    pub fn null() -> Self {
        Self::new("", "")
    }

    /// Whether this is the sentinel author
    pub fn is_null(&self) -> bool {
        self.display_name.is_empty() && self.sort_key.is_empty()
    }

    /// Build an author from name parts, skipping empty ones
    ///
    /// The display name is "first middle last"; the sort key is
    /// "last first", lower-cased.
    pub fn from_parts(first: &str, middle: &str, last: &str) -> Self {
        let display_name = [first, middle, last]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let sort_key = [last, first]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::new(display_name, sort_key)
    }
}
