//! Libris Core Library
//!
//! Book selection and content ingestion for a personal e-book library.
//! [`Filter`] trees select books from the library and persist as XML;
//! format plugins read book files (including zipped ones) into [`Book`]
//! records through the [`Ingestor`].

pub mod error;
pub mod filter;
pub mod formats;
pub mod fs;
pub mod ingest;
pub mod title_sort;
pub mod types;

pub use error::{BookReadingError, FilterXmlError, IngestError, LibrisError, Result};
pub use filter::{Filter, Tagable};
pub use formats::{FormatPlugin, PluginRegistry, PluginType, ZipDecoratorPlugin};
pub use fs::BookFile;
pub use ingest::{Ingested, Ingestor};
pub use types::{Author, Book, BookModel, Chapter, Image, Series, SeriesInfo, Tag, Uid};
