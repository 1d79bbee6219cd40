//! Plain text reader

use super::text::{decode, detect_encoding, truncate_chars};
use super::{EncodingCollection, FormatPlugin, PluginType};
use crate::error::BookReadingError;
use crate::fs::BookFile;
use crate::types::{Book, BookModel, Chapter, Image, Uid, AUTO_ENCODING};
use encoding_rs::Encoding;

/// Longest annotation taken from the start of the text, in characters
const ANNOTATION_LENGTH: usize = 300;

/// Reader for `.txt` files
///
/// Plain text carries no metadata, so the title is the file name and the
/// whole text is a single chapter of blank-line separated paragraphs.
pub struct TxtPlugin {
    encodings: Vec<&'static Encoding>,
}

impl TxtPlugin {
    pub fn new() -> Self {
        Self {
            encodings: vec![
                encoding_rs::UTF_8,
                encoding_rs::UTF_16LE,
                encoding_rs::UTF_16BE,
                encoding_rs::WINDOWS_1252,
                encoding_rs::WINDOWS_1251,
                encoding_rs::KOI8_R,
            ],
        }
    }

    /// Restrict the encodings offered for text files
    pub fn with_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Encoding to decode the book with: the user's choice when it is one
    /// of ours, else detection
    fn encoding_for(&self, book: &Book, data: &[u8]) -> &'static Encoding {
        if book.encoding != AUTO_ENCODING {
            if let Some(encoding) = self.supported_encodings().resolve(&book.encoding) {
                return encoding;
            }
        }
        detect_encoding(data, None)
    }

    fn read_text(&self, book: &Book) -> Result<String, BookReadingError> {
        let data = book.file.read_bytes()?;
        Ok(decode(&data, self.encoding_for(book, &data)))
    }
}

impl Default for TxtPlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// Split text into paragraphs at blank lines, joining wrapped lines
fn paragraphs(text: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                result.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        result.push(current.join(" "));
    }
    result
}

fn title_from_file(file: &BookFile) -> String {
    let name = file.short_name();
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

impl FormatPlugin for TxtPlugin {
    fn supported_file_type(&self) -> &str {
        "txt"
    }

    fn detect_language_and_encoding(&self, book: &mut Book) -> Result<(), BookReadingError> {
        let data = book.file.read_bytes()?;
        let encoding = detect_encoding(&data, None);
        if !self.encodings.contains(&encoding) {
            return Err(BookReadingError::Encoding(format!(
                "{} is not offered for text files",
                encoding.name()
            )));
        }
        book.encoding = encoding.name().to_lowercase();
        Ok(())
    }

    fn supported_encodings(&self) -> EncodingCollection {
        EncodingCollection::Fixed(self.encodings.clone())
    }

    fn read_meta_info(&self, book: &mut Book) -> Result<(), BookReadingError> {
        // Fails early on unreadable files
        book.file.read_bytes()?;
        book.title = title_from_file(&book.file);
        Ok(())
    }

    fn read_model(&self, model: &mut BookModel) -> Result<(), BookReadingError> {
        let text = self.read_text(&model.book)?;
        let mut chapter = Chapter::new(None);
        for paragraph in paragraphs(&text) {
            chapter.add_paragraph(paragraph);
        }
        model.add_chapter(chapter);
        Ok(())
    }

    fn read_uids(&self, book: &mut Book) -> Result<(), BookReadingError> {
        let data = book.file.read_bytes()?;
        book.add_uid(Uid::sha256(&data));
        Ok(())
    }

    fn read_cover(&self, _file: &BookFile) -> Option<Image> {
        None
    }

    fn read_annotation(&self, file: &BookFile) -> Option<String> {
        let data = file.read_bytes().ok()?;
        let text = decode(&data, detect_encoding(&data, None));
        let first = paragraphs(&text).into_iter().next()?;
        Some(truncate_chars(&first, ANNOTATION_LENGTH))
    }

    fn plugin_type(&self) -> PluginType {
        PluginType::InProcess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SHA256_UID;

    fn write(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> BookFile {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        BookFile::physical(path)
    }

    #[test]
    fn test_paragraphs() {
        let text = "First line\nwrapped here.\n\n\n  Second.  \r\n\r\nThird";
        assert_eq!(
            paragraphs(text),
            vec!["First line wrapped here.", "Second.", "Third"]
        );
        assert!(paragraphs("\n \n").is_empty());
    }

    #[test]
    fn test_title_from_file() {
        assert_eq!(title_from_file(&BookFile::physical("/b/My Book.txt")), "My Book");
        assert_eq!(title_from_file(&BookFile::physical("/b/a.b.txt")), "a.b");
        assert_eq!(title_from_file(&BookFile::physical("/b/README")), "README");
    }

    #[test]
    fn test_read_book() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "notes.txt", b"Hello there.\n\nSecond paragraph.\n");
        let plugin = TxtPlugin::new();

        let mut book = Book::new(file.clone());
        plugin.read_meta_info(&mut book).unwrap();
        plugin.detect_language_and_encoding(&mut book).unwrap();
        plugin.read_uids(&mut book).unwrap();
        assert_eq!(book.title, "notes");
        assert_eq!(book.encoding, "utf-8");
        assert_eq!(book.uids.len(), 1);
        assert_eq!(book.uids[0].kind, SHA256_UID);

        let mut model = BookModel::new(book);
        plugin.read_model(&mut model).unwrap();
        assert_eq!(model.chapters.len(), 1);
        assert_eq!(model.paragraph_count(), 2);

        assert_eq!(plugin.read_annotation(&file).as_deref(), Some("Hello there."));
        assert!(plugin.read_cover(&file).is_none());
    }

    #[test]
    fn test_user_encoding_is_used_for_model() {
        let dir = tempfile::tempdir().unwrap();
        let (bytes, _, _) = encoding_rs::KOI8_R.encode("Привет, мир");
        let file = write(&dir, "ru.txt", &bytes);

        let mut book = Book::new(file);
        book.encoding = "koi8-r".to_string();
        let mut model = BookModel::new(book);
        TxtPlugin::new().read_model(&mut model).unwrap();
        assert_eq!(model.chapters[0].paragraphs, vec!["Привет, мир"]);
    }

    #[test]
    fn test_long_annotation_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "long.txt", "word ".repeat(200).as_bytes());
        let annotation = TxtPlugin::new().read_annotation(&file).unwrap();
        assert!(annotation.ends_with('…'));
        assert!(annotation.chars().count() <= ANNOTATION_LENGTH + 1);
    }

    #[test]
    fn test_restricted_encodings() {
        let plugin = TxtPlugin::new().with_encodings(vec![encoding_rs::WINDOWS_1251]);
        assert_eq!(plugin.supported_encodings().names(), vec!["windows-1251"]);

        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "plain.txt", b"ascii only");
        let mut book = Book::new(file);
        assert!(matches!(
            plugin.detect_language_and_encoding(&mut book),
            Err(BookReadingError::Encoding(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let mut book = Book::new(BookFile::physical("/nowhere/missing.txt"));
        assert!(TxtPlugin::new().read_meta_info(&mut book).is_err());
        assert!(TxtPlugin::new().read_annotation(&book.file).is_none());
    }
}
