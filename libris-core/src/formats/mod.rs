//! Format plugins: readers that turn book files into library records
//!
//! Each supported file type has one [`FormatPlugin`], held by a
//! [`PluginRegistry`] and looked up by [`FormatPlugin::supported_file_type`].
//! Zipped books (`book.fb2.zip`) are served by a [`ZipDecoratorPlugin`] that
//! finds the book inside the archive and hands it to the plain reader.

mod encoding;
mod epub;
mod fb2;
mod registry;
mod text;
mod txt;
mod zip_decorator;

pub use self::encoding::EncodingCollection;
pub use self::epub::EpubPlugin;
pub use self::fb2::Fb2Plugin;
pub use self::registry::PluginRegistry;
pub use self::txt::TxtPlugin;
pub use self::zip_decorator::{ZipDecoratorPlugin, ZIP_SUFFIX};

use crate::error::BookReadingError;
use crate::fs::BookFile;
use crate::types::{Book, BookModel, Image, AUTO_ENCODING};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a plugin's decoding logic runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginType {
    Any,
    /// Decoding runs inside this process
    InProcess,
    Native,
    External,
    None,
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginType::Any => "any",
            PluginType::InProcess => "in-process",
            PluginType::Native => "native",
            PluginType::External => "external",
            PluginType::None => "none",
        };
        f.write_str(name)
    }
}

/// A reader for one book file type
///
/// Plugins are long-lived and shared between threads; every read call must
/// be independent of any other.
pub trait FormatPlugin: Send + Sync {
    /// File type this plugin reads ("fb2", "epub", "fb2.zip")
    fn supported_file_type(&self) -> &str;

    /// The file that actually holds the book
    ///
    /// `Ok(None)` means the book cannot be located, which callers treat as
    /// "not readable" rather than as a failure.
    fn real_book_file(&self, file: &BookFile) -> Result<Option<BookFile>, BookReadingError> {
        Ok(Some(file.clone()))
    }

    /// Fill in the book's language and text encoding
    fn detect_language_and_encoding(&self, book: &mut Book) -> Result<(), BookReadingError> {
        book.encoding = AUTO_ENCODING.to_string();
        Ok(())
    }

    /// Encodings the user may pick for books of this type
    fn supported_encodings(&self) -> EncodingCollection {
        EncodingCollection::Auto
    }

    /// Fill in title, authors, tags, series and language
    fn read_meta_info(&self, book: &mut Book) -> Result<(), BookReadingError>;

    /// Fill in the book's readable content
    fn read_model(&self, model: &mut BookModel) -> Result<(), BookReadingError>;

    /// Fill in the book's unique identifiers
    fn read_uids(&self, book: &mut Book) -> Result<(), BookReadingError>;

    /// Cover image, if the file has one
    fn read_cover(&self, file: &BookFile) -> Option<Image>;

    /// Short description, if the file has one
    fn read_annotation(&self, file: &BookFile) -> Option<String>;

    fn plugin_type(&self) -> PluginType;
}

/// Guess an image MIME type from its leading bytes
pub(crate) fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF8") {
        Some("image/gif")
    } else {
        None
    }
}

/// Parse a publication date given as "YYYY-MM-DD" or a bare "YYYY"
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    // EPUB dates are often full timestamps
    if let Some(day) = value.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            return Some(date);
        }
    }
    match value.get(..4).map(str::parse::<i32>) {
        Some(Ok(year)) if value.len() == 4 => NaiveDate::from_ymd_opt(year, 1, 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl FormatPlugin for Minimal {
        fn supported_file_type(&self) -> &str {
            "min"
        }
        fn read_meta_info(&self, _book: &mut Book) -> Result<(), BookReadingError> {
            Ok(())
        }
        fn read_model(&self, _model: &mut BookModel) -> Result<(), BookReadingError> {
            Ok(())
        }
        fn read_uids(&self, _book: &mut Book) -> Result<(), BookReadingError> {
            Ok(())
        }
        fn read_cover(&self, _file: &BookFile) -> Option<Image> {
            None
        }
        fn read_annotation(&self, _file: &BookFile) -> Option<String> {
            None
        }
        fn plugin_type(&self) -> PluginType {
            PluginType::Any
        }
    }

    #[test]
    fn test_defaults() {
        let plugin = Minimal;
        let file = BookFile::physical("book.min");
        assert_eq!(plugin.real_book_file(&file).unwrap(), Some(file.clone()));

        let mut book = Book::new(file);
        book.encoding = "koi8-r".to_string();
        plugin.detect_language_and_encoding(&mut book).unwrap();
        assert_eq!(book.encoding, "auto");

        assert_eq!(plugin.supported_encodings(), EncodingCollection::Auto);
    }

    #[test]
    fn test_sniff_image_mime() {
        assert_eq!(sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_image_mime(b"\x89PNG\r\n"), Some("image/png"));
        assert_eq!(sniff_image_mime(b"hello"), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("1965-08-01"), NaiveDate::from_ymd_opt(1965, 8, 1));
        assert_eq!(
            parse_date("2011-02-03T10:00:00Z"),
            NaiveDate::from_ymd_opt(2011, 2, 3)
        );
        assert_eq!(parse_date("1965"), NaiveDate::from_ymd_opt(1965, 1, 1));
        assert_eq!(parse_date("summer"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_plugin_type_display() {
        assert_eq!(PluginType::InProcess.to_string(), "in-process");
    }
}
