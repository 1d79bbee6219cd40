//! Cover images

use serde::{Deserialize, Serialize};

/// An image extracted from a book, typically its cover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// MIME type (e.g., "image/jpeg")
    pub mime_type: String,

    pub data: Vec<u8>,
}

impl Image {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
