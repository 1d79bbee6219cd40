//! File abstraction used by format readers
//!
//! A [`BookFile`] is either a file on disk or an entry inside a zip archive on
//! disk. Readers never touch paths directly; they ask the file for its name,
//! extension and bytes, which lets the same reader work on plain and archived
//! books alike.

use crate::error::BookReadingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Extensions recognized as archives that can be listed
const ARCHIVE_EXTENSIONS: &[&str] = &["zip"];

/// Largest archive member [`BookFile::read_bytes`] will inflate
pub const MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

/// A book file, possibly nested inside an archive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookFile {
    /// A regular file on disk
    Physical { path: PathBuf },

    /// A member of a zip archive on disk
    ArchiveEntry { archive: PathBuf, name: String },
}

impl BookFile {
    /// Create a handle for a file on disk
    pub fn physical(path: impl Into<PathBuf>) -> Self {
        BookFile::Physical { path: path.into() }
    }

    /// Create a handle for a member of a zip archive
    pub fn archive_entry(archive: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        BookFile::ArchiveEntry {
            archive: archive.into(),
            name: name.into(),
        }
    }

    /// Name of the file without any directory part
    pub fn short_name(&self) -> String {
        match self {
            BookFile::Physical { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            BookFile::ArchiveEntry { name, .. } => name
                .rsplit('/')
                .next()
                .unwrap_or(name.as_str())
                .to_string(),
        }
    }

    /// Lower-cased text after the last dot of the short name, or empty
    pub fn extension(&self) -> String {
        let name = self.short_name();
        match name.rfind('.') {
            Some(pos) if pos + 1 < name.len() => name[pos + 1..].to_lowercase(),
            _ => String::new(),
        }
    }

    /// Whether this file is an archive whose members can be listed
    pub fn is_archive(&self) -> bool {
        match self {
            BookFile::Physical { .. } => ARCHIVE_EXTENSIONS.contains(&self.extension().as_str()),
            // Nested archives are not opened
            BookFile::ArchiveEntry { .. } => false,
        }
    }

    /// Path of the file on disk that holds this file's bytes
    pub fn physical_path(&self) -> &Path {
        match self {
            BookFile::Physical { path } => path,
            BookFile::ArchiveEntry { archive, .. } => archive,
        }
    }

    /// Direct members of this archive, in archive order
    ///
    /// Returns `None` when this file is not an archive or cannot be opened.
    /// Directory entries are skipped.
    pub fn children(&self) -> Option<Vec<BookFile>> {
        let BookFile::Physical { path } = self else {
            return None;
        };
        if !self.is_archive() {
            return None;
        }

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!("Cannot open archive {}: {}", path.display(), e);
                return None;
            }
        };
        let mut archive = match zip::ZipArchive::new(BufReader::new(file)) {
            Ok(archive) => archive,
            Err(e) => {
                tracing::debug!("Cannot list archive {}: {}", path.display(), e);
                return None;
            }
        };

        let mut children = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i).ok()?;
            if entry.is_dir() {
                continue;
            }
            children.push(BookFile::archive_entry(path.clone(), entry.name()));
        }
        Some(children)
    }

    /// Read the whole content of the file
    ///
    /// Archive members larger than [`MAX_ENTRY_SIZE`] are refused.
    pub fn read_bytes(&self) -> Result<Vec<u8>, BookReadingError> {
        self.read_bytes_limited(MAX_ENTRY_SIZE)
    }

    /// Read the whole content, refusing archive members over `limit` bytes
    ///
    /// The size an archive declares is checked before reading and the
    /// inflated stream is cut at `limit`, so a lying header cannot make the
    /// read grow past it.
    pub fn read_bytes_limited(&self, limit: u64) -> Result<Vec<u8>, BookReadingError> {
        match self {
            BookFile::Physical { path } => std::fs::read(path).map_err(|e| BookReadingError::Io {
                path: path.display().to_string(),
                source: e,
            }),
            BookFile::ArchiveEntry { archive, name } => {
                let file = File::open(archive).map_err(|e| BookReadingError::Io {
                    path: archive.display().to_string(),
                    source: e,
                })?;
                let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
                    BookReadingError::Archive {
                        path: archive.display().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                let mut entry = zip.by_name(name).map_err(|e| BookReadingError::Archive {
                    path: self.to_string(),
                    reason: e.to_string(),
                })?;

                if entry.size() > limit {
                    return Err(BookReadingError::Archive {
                        path: self.to_string(),
                        reason: format!(
                            "entry declares {} bytes, limit is {}",
                            entry.size(),
                            limit
                        ),
                    });
                }

                let mut data = Vec::new();
                entry
                    .by_ref()
                    .take(limit.saturating_add(1))
                    .read_to_end(&mut data)
                    .map_err(|e| BookReadingError::Io {
                        path: self.to_string(),
                        source: e,
                    })?;
                if data.len() as u64 > limit {
                    return Err(BookReadingError::Archive {
                        path: self.to_string(),
                        reason: format!("entry inflates past {} bytes", limit),
                    });
                }
                Ok(data)
            }
        }
    }
}

impl Default for BookFile {
    fn default() -> Self {
        BookFile::Physical {
            path: PathBuf::new(),
        }
    }
}

impl fmt::Display for BookFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookFile::Physical { path } => write!(f, "{}", path.display()),
            BookFile::ArchiveEntry { archive, name } => {
                write!(f, "{}:{}", archive.display(), name)
            }
        }
    }
}
