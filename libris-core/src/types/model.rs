//! Document model filled by format readers

use super::Book;
use serde::{Deserialize, Serialize};

/// A chapter of running text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: Option<String>,
    pub paragraphs: Vec<String>,
}

impl Chapter {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            paragraphs: Vec::new(),
        }
    }

    /// Append a paragraph, ignoring blank ones
    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        let text = text.into();
        let text = text.trim();
        if !text.is_empty() {
            self.paragraphs.push(text.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// The readable content of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookModel {
    /// The book this content belongs to
    pub book: Book,

    pub chapters: Vec<Chapter>,
}

impl BookModel {
    pub fn new(book: Book) -> Self {
        Self {
            book,
            chapters: Vec::new(),
        }
    }

    /// Add a chapter, dropping it when it has no text
    pub fn add_chapter(&mut self, chapter: Chapter) {
        if !chapter.is_empty() {
            self.chapters.push(chapter);
        }
    }

    pub fn paragraph_count(&self) -> usize {
        self.chapters.iter().map(|c| c.paragraphs.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::BookFile;

    #[test]
    fn test_blank_content_is_dropped() {
        let mut model = BookModel::new(Book::new(BookFile::physical("a.txt")));

        let mut chapter = Chapter::new(Some("One".to_string()));
        chapter.add_paragraph("  first  ");
        chapter.add_paragraph("   ");
        model.add_chapter(chapter);
        model.add_chapter(Chapter::new(None));

        assert_eq!(model.chapters.len(), 1);
        assert_eq!(model.chapters[0].paragraphs, vec!["first"]);
        assert_eq!(model.paragraph_count(), 1);
    }
}
