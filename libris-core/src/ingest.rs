//! Turning book files into library records
//!
//! [`Ingestor`] is the one place where a file meets its plugin: it resolves
//! the real book behind the file (unpacking zipped books), then runs the
//! plugin's readers against that real file.

use crate::error::IngestError;
use crate::formats::{PluginRegistry, PluginType};
use crate::fs::BookFile;
use crate::types::{Book, BookModel, Image};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Everything read from one book file
#[derive(Debug, Clone)]
pub struct Ingested {
    /// The file that was ingested, possibly an archive
    pub source: BookFile,

    /// The record; `book.file` is the real book file
    pub book: Book,

    /// Text content, when requested
    pub model: Option<BookModel>,

    pub cover: Option<Image>,
    pub annotation: Option<String>,

    /// Dispatch type of the plugin that read the file ("fb2.zip")
    pub file_type: String,
    pub plugin_type: PluginType,
}

/// Reads book files through a plugin registry
#[derive(Clone)]
pub struct Ingestor {
    registry: Arc<PluginRegistry>,
    with_model: bool,
}

impl Ingestor {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            with_model: false,
        }
    }

    /// Also read the text content of every book
    pub fn with_model(mut self, with_model: bool) -> Self {
        self.with_model = with_model;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Read one book file
    pub fn ingest(&self, file: &BookFile) -> Result<Ingested, IngestError> {
        let plugin = self
            .registry
            .plugin_for_file(file)
            .ok_or_else(|| IngestError::UnsupportedFormat(file.to_string()))?;

        let real = plugin
            .real_book_file(file)?
            .ok_or_else(|| IngestError::NoReadableEntry(file.to_string()))?;
        tracing::debug!(
            "Reading {} as {} via {}",
            file,
            real,
            plugin.supported_file_type()
        );

        let mut book = Book::new(real.clone());
        plugin.read_meta_info(&mut book)?;
        plugin.detect_language_and_encoding(&mut book)?;
        plugin.read_uids(&mut book)?;

        let model = if self.with_model {
            let mut model = BookModel::new(book.clone());
            plugin.read_model(&mut model)?;
            Some(model)
        } else {
            None
        };

        Ok(Ingested {
            source: file.clone(),
            cover: plugin.read_cover(&real),
            annotation: plugin.read_annotation(&real),
            file_type: plugin.supported_file_type().to_string(),
            plugin_type: plugin.plugin_type(),
            book,
            model,
        })
    }

    /// Read many files in parallel; results keep the input order
    pub fn ingest_all(&self, files: &[BookFile]) -> Vec<(BookFile, Result<Ingested, IngestError>)> {
        files
            .par_iter()
            .map(|file| {
                let result = self.ingest(file);
                if let Err(e) = &result {
                    tracing::error!("Failed to ingest {}: {}", file, e);
                }
                (file.clone(), result)
            })
            .collect()
    }

    /// Files directly inside `dir` that some plugin can read, sorted by path
    pub fn discover(&self, dir: &Path) -> std::io::Result<Vec<BookFile>> {
        let mut files: Vec<BookFile> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .map(BookFile::physical)
            .filter(|f| self.registry.plugin_for_file(f).is_some())
            .collect();
        files.sort_by(|a, b| a.physical_path().cmp(b.physical_path()));
        Ok(files)
    }
}
