//! Reading books stored inside zip archives

use super::{EncodingCollection, FormatPlugin, PluginType};
use crate::error::BookReadingError;
use crate::fs::BookFile;
use crate::types::{Book, BookModel, Image};
use std::sync::Arc;

/// Suffix appended to a plugin's file type for its zipped form
pub const ZIP_SUFFIX: &str = ".zip";

/// Serves `<type>.zip` files by locating the `<type>` member of the archive
/// and delegating everything else to the plugin for `<type>`
pub struct ZipDecoratorPlugin {
    file_type: String,
    inner: Arc<dyn FormatPlugin>,
}

impl ZipDecoratorPlugin {
    pub fn new(inner: Arc<dyn FormatPlugin>) -> Self {
        Self {
            file_type: format!("{}{}", inner.supported_file_type(), ZIP_SUFFIX),
            inner,
        }
    }

    /// The plugin that reads the unpacked book
    pub fn inner(&self) -> &Arc<dyn FormatPlugin> {
        &self.inner
    }

    /// Find the single archive member the wrapped plugin can read
    fn extract_file(&self, file: &BookFile) -> Option<BookFile> {
        let name = file.short_name().to_lowercase();
        if !name.ends_with(&self.file_type) || !file.is_archive() {
            // Dispatch should never route such a file here
            tracing::warn!(
                "{} is not a {} archive, reading it as is",
                file,
                self.file_type
            );
            return Some(file.clone());
        }

        let children = file.children()?;
        let wanted = self.inner.supported_file_type();

        let mut candidate = None;
        for child in children {
            if child.extension() != wanted {
                continue;
            }
            if candidate.is_some() {
                tracing::debug!("{} holds more than one .{} file", file, wanted);
                return None;
            }
            candidate = Some(child);
        }

        if candidate.is_none() {
            tracing::debug!("{} holds no .{} file", file, wanted);
        }
        candidate
    }
}

impl FormatPlugin for ZipDecoratorPlugin {
    fn supported_file_type(&self) -> &str {
        &self.file_type
    }

    fn real_book_file(&self, file: &BookFile) -> Result<Option<BookFile>, BookReadingError> {
        Ok(self.extract_file(file))
    }

    fn detect_language_and_encoding(&self, book: &mut Book) -> Result<(), BookReadingError> {
        self.inner.detect_language_and_encoding(book)
    }

    fn supported_encodings(&self) -> EncodingCollection {
        self.inner.supported_encodings()
    }

    fn read_meta_info(&self, book: &mut Book) -> Result<(), BookReadingError> {
        self.inner.read_meta_info(book)
    }

    fn read_model(&self, model: &mut BookModel) -> Result<(), BookReadingError> {
        self.inner.read_model(model)
    }

    fn read_uids(&self, book: &mut Book) -> Result<(), BookReadingError> {
        self.inner.read_uids(book)
    }

    fn read_cover(&self, file: &BookFile) -> Option<Image> {
        self.inner.read_cover(file)
    }

    fn read_annotation(&self, file: &BookFile) -> Option<String> {
        self.inner.read_annotation(file)
    }

    fn plugin_type(&self) -> PluginType {
        self.inner.plugin_type()
    }
}
