//! FictionBook 2 reader
//!
//! FB2 is a single XML document: `description/title-info` holds the
//! bibliographic data, `body/section` the text, and `binary` elements the
//! base64-encoded images referenced by the cover page.

use super::text::{decode, detect_encoding, xml_declared_encoding};
use super::{parse_date, sniff_image_mime, FormatPlugin, PluginType};
use crate::error::BookReadingError;
use crate::fs::BookFile;
use crate::types::{Author, Book, BookModel, Chapter, Image, SeriesInfo, Tag, Uid};
use base64::Engine;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

const FORMAT: &str = "FB2";

/// Uid kind of the FB2 document id
pub const FB2_ID_UID: &str = "fb2-id";

/// Reader for FictionBook 2 files
pub struct Fb2Plugin;

impl Fb2Plugin {
    pub fn new() -> Self {
        Self
    }

    fn load(
        &self,
        file: &BookFile,
        scope: Scope,
    ) -> Result<(Vec<u8>, Fb2Document), BookReadingError> {
        let data = file.read_bytes()?;
        let document = parse(&data, scope)?;
        Ok((data, document))
    }
}

impl Default for Fb2Plugin {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatPlugin for Fb2Plugin {
    fn supported_file_type(&self) -> &str {
        "fb2"
    }

    fn detect_language_and_encoding(&self, book: &mut Book) -> Result<(), BookReadingError> {
        let (data, document) = self.load(&book.file, Scope::Description)?;
        book.encoding = xml_declared_encoding(&data)
            .map(|label| label.trim().to_lowercase())
            .unwrap_or_else(|| "utf-8".to_string());
        if book.language.is_empty() {
            book.language = document.language.unwrap_or_default();
        }
        Ok(())
    }

    fn read_meta_info(&self, book: &mut Book) -> Result<(), BookReadingError> {
        let (_, document) = self.load(&book.file, Scope::Description)?;
        if !document.has_description {
            return Err(BookReadingError::missing(FORMAT, "description"));
        }

        book.title = match document.title {
            Some(title) if !title.is_empty() => title,
            _ => file_stem(&book.file),
        };
        for author in document.authors {
            book.add_author(author);
        }
        for genre in document.genres {
            book.add_tag(Tag::new(genre));
        }
        book.series_info = document.series;
        if let Some(language) = document.language {
            book.language = language;
        }
        book.publication_date = document.date.as_deref().and_then(parse_date);
        Ok(())
    }

    fn read_model(&self, model: &mut BookModel) -> Result<(), BookReadingError> {
        let (_, document) = self.load(&model.book.file, Scope::Chapters)?;
        for chapter in document.chapters {
            model.add_chapter(chapter);
        }
        Ok(())
    }

    fn read_uids(&self, book: &mut Book) -> Result<(), BookReadingError> {
        let (data, document) = self.load(&book.file, Scope::Description)?;
        if let Some(id) = document.document_id.filter(|id| !id.is_empty()) {
            book.add_uid(Uid::new(FB2_ID_UID, id));
        }
        book.add_uid(Uid::sha256(&data));
        Ok(())
    }

    fn read_cover(&self, file: &BookFile) -> Option<Image> {
        let (_, mut document) = self.load(file, Scope::Cover).ok()?;
        let id = document.cover_href.take()?;
        let binary = document.binaries.remove(&id)?;

        let cleaned: String = binary
            .data
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let data = base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .ok()?;

        let mime_type = binary
            .content_type
            .or_else(|| sniff_image_mime(&data).map(str::to_string))?;
        Some(Image::new(mime_type, data))
    }

    fn read_annotation(&self, file: &BookFile) -> Option<String> {
        let (_, document) = self.load(file, Scope::Description).ok()?;
        if document.annotation.is_empty() {
            None
        } else {
            Some(document.annotation.join("\n"))
        }
    }

    fn plugin_type(&self) -> PluginType {
        PluginType::InProcess
    }
}

fn file_stem(file: &BookFile) -> String {
    let name = file.short_name();
    match name.find('.') {
        Some(pos) if pos > 0 => name[..pos].to_string(),
        _ => name,
    }
}

/// An embedded binary, still base64-encoded
struct Binary {
    content_type: Option<String>,
    data: String,
}

/// Everything the reader extracts from one FB2 document
#[derive(Default)]
struct Fb2Document {
    has_description: bool,
    title: Option<String>,
    authors: Vec<Author>,
    genres: Vec<String>,
    series: Option<SeriesInfo>,
    language: Option<String>,
    date: Option<String>,
    annotation: Vec<String>,
    document_id: Option<String>,
    cover_href: Option<String>,
    binaries: HashMap<String, Binary>,
    chapters: Vec<Chapter>,
}

/// How much of a document a read needs
///
/// The description is always parsed. Body text and embedded binaries are
/// the bulk of a file and are only collected when asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Scope {
    #[default]
    Description,
    Chapters,
    Cover,
}

/// Elements whose full text content is collected
const CAPTURED: &[&str] = &[
    "book-title",
    "first-name",
    "middle-name",
    "last-name",
    "nickname",
    "genre",
    "lang",
    "date",
    "id",
    "p",
    "v",
    "subtitle",
    "binary",
];

#[derive(Default)]
struct Parser {
    scope: Scope,
    document: Fb2Document,
    path: Vec<String>,
    text: String,
    author: [String; 4],
    chapter: Option<Chapter>,
    chapter_depth: usize,
    skip_body: bool,
    binary: Option<(String, Option<String>)>,
}

fn parse(data: &[u8], scope: Scope) -> Result<Fb2Document, BookReadingError> {
    let hint = xml_declared_encoding(data);
    let text = decode(data, detect_encoding(data, hint.as_deref()));

    let mut reader = Reader::from_str(&text);
    let mut parser = Parser {
        scope,
        ..Parser::default()
    };
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| BookReadingError::malformed(FORMAT, e))?;
        match event {
            Event::Start(e) => {
                let name = local_name(&e);
                if !seen_root {
                    if name != "FictionBook" {
                        return Err(BookReadingError::malformed(
                            FORMAT,
                            format!("root element is <{}>, expected <FictionBook>", name),
                        ));
                    }
                    seen_root = true;
                }
                parser.start(name, &e)?;
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                if !seen_root {
                    return Err(BookReadingError::malformed(FORMAT, "document has no content"));
                }
                parser.path.push(name.clone());
                parser.attributes(&name, &e)?;
                parser.path.pop();
            }
            Event::End(_) => parser.end(),
            Event::Text(t) => {
                if parser.skipping_text() {
                    continue;
                }
                let t = t
                    .unescape()
                    .map_err(|e| BookReadingError::malformed(FORMAT, e))?;
                parser.text.push_str(&t);
            }
            Event::CData(c) if !parser.skipping_text() => {
                parser
                    .text
                    .push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(BookReadingError::missing(FORMAT, "FictionBook"));
    }
    if !parser.path.is_empty() {
        return Err(BookReadingError::malformed(FORMAT, "unexpected end of file"));
    }
    Ok(parser.document)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, wanted: &str) -> Result<Option<String>, BookReadingError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| BookReadingError::malformed(FORMAT, e))?;
        if attr.key.local_name().as_ref() == wanted.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| BookReadingError::malformed(FORMAT, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Collapse runs of whitespace into single spaces
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Parser {
    fn parent_is(&self, name: &str) -> bool {
        self.path.len() >= 2 && self.path[self.path.len() - 2] == name
    }

    fn within(&self, name: &str) -> bool {
        self.path.iter().any(|p| p == name)
    }

    /// Text of bodies and binaries the scope leaves out is never buffered
    fn skipping_text(&self) -> bool {
        match self.scope {
            Scope::Description => self.within("body") || self.within("binary"),
            Scope::Chapters => self.within("binary"),
            Scope::Cover => self.within("body"),
        }
    }

    fn in_chapter_title(&self) -> bool {
        self.chapter.is_some()
            && self.path.get(self.chapter_depth).map(String::as_str) == Some("title")
    }

    fn start(&mut self, name: String, e: &BytesStart<'_>) -> Result<(), BookReadingError> {
        if CAPTURED.contains(&name.as_str()) {
            self.text.clear();
        }
        self.path.push(name.clone());

        match name.as_str() {
            "description" => self.document.has_description = true,
            "author" if self.parent_is("title-info") => self.author = Default::default(),
            "body" => self.skip_body = attribute(e, "name")?.is_some(),
            "section"
                if self.parent_is("body") && !self.skip_body && self.scope == Scope::Chapters =>
            {
                self.chapter = Some(Chapter::new(None));
                self.chapter_depth = self.path.len();
            }
            _ => self.attributes(&name, e)?,
        }
        Ok(())
    }

    fn attributes(&mut self, name: &str, e: &BytesStart<'_>) -> Result<(), BookReadingError> {
        match name {
            "sequence" if self.within("title-info") && self.document.series.is_none() => {
                if let Some(title) = attribute(e, "name")?.filter(|n| !n.trim().is_empty()) {
                    let index = attribute(e, "number")?.filter(|n| !n.trim().is_empty());
                    self.document.series = Some(SeriesInfo::new(title.trim(), index));
                }
            }
            "image" if self.within("coverpage") && self.document.cover_href.is_none() => {
                self.document.cover_href = attribute(e, "href")?
                    .map(|href| href.trim_start_matches('#').to_string());
            }
            "date" if self.parent_is("title-info") => {
                if let Some(value) = attribute(e, "value")? {
                    self.document.date = Some(value);
                }
            }
            "binary" if self.scope == Scope::Cover => {
                if let Some(id) = attribute(e, "id")? {
                    self.binary = Some((id, attribute(e, "content-type")?));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self) {
        let Some(name) = self.path.last().cloned() else {
            return;
        };

        match name.as_str() {
            "book-title" if self.parent_is("title-info") => {
                self.document.title = Some(normalize(&self.text));
            }
            "first-name" | "middle-name" | "last-name" | "nickname"
                if self.parent_is("author") && self.within("title-info") =>
            {
                let slot = match name.as_str() {
                    "first-name" => 0,
                    "middle-name" => 1,
                    "last-name" => 2,
                    _ => 3,
                };
                self.author[slot] = normalize(&self.text);
            }
            "author" if self.parent_is("title-info") => {
                let [first, middle, last, nickname] = std::mem::take(&mut self.author);
                let author = if first.is_empty() && last.is_empty() {
                    Author::from_parts("", "", &nickname)
                } else {
                    Author::from_parts(&first, &middle, &last)
                };
                if !author.display_name.is_empty() {
                    self.document.authors.push(author);
                }
            }
            "genre" if self.parent_is("title-info") => {
                let genre = normalize(&self.text);
                if !genre.is_empty() {
                    self.document.genres.push(genre);
                }
            }
            "lang" if self.parent_is("title-info") => {
                self.document.language = Some(normalize(&self.text));
            }
            "date" if self.parent_is("title-info") && self.document.date.is_none() => {
                self.document.date = Some(normalize(&self.text));
            }
            "id" if self.parent_is("document-info") => {
                self.document.document_id = Some(normalize(&self.text));
            }
            "p" | "v" | "subtitle" => {
                let paragraph = normalize(&self.text);
                if self.within("annotation") && self.within("title-info") {
                    if !paragraph.is_empty() {
                        self.document.annotation.push(paragraph);
                    }
                } else if self.in_chapter_title() {
                    if let Some(chapter) = self.chapter.as_mut() {
                        chapter.title = Some(match chapter.title.take() {
                            Some(title) => format!("{} {}", title, paragraph),
                            None => paragraph,
                        });
                    }
                } else if let Some(chapter) = self.chapter.as_mut() {
                    chapter.add_paragraph(paragraph);
                }
            }
            "section" if self.path.len() == self.chapter_depth => {
                if let Some(chapter) = self.chapter.take() {
                    self.document.chapters.push(chapter);
                }
            }
            "body" => self.skip_body = false,
            "binary" => {
                if let Some((id, content_type)) = self.binary.take() {
                    let data = std::mem::take(&mut self.text);
                    self.document
                        .binaries
                        .insert(id, Binary { content_type, data });
                }
            }
            _ => {}
        }

        self.path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<FictionBook xmlns="http://www.gribuser.ru/xml/fictionbook/2.0" xmlns:l="http://www.w3.org/1999/xlink">
  <description>
    <title-info>
      <genre>sf_space</genre>
      <genre>adventure</genre>
      <author><first-name>Frank</first-name><middle-name>Patrick</middle-name><last-name>Herbert</last-name></author>
      <author><nickname>Anon</nickname></author>
      <book-title>Dune</book-title>
      <annotation><p>A desert <emphasis>planet</emphasis>.</p><p>Spice.</p></annotation>
      <date value="1965-08-01">1965</date>
      <coverpage><image l:href="#cover.png"/></coverpage>
      <lang>en</lang>
      <sequence name="Dune Chronicles" number="1"/>
    </title-info>
    <document-info><id>dune-0001</id></document-info>
  </description>
  <body>
    <section>
      <title><p>Book One</p><p>Dune</p></title>
      <p>A beginning is the time.</p>
      <section><title><p>Nested</p></title><p>Inner text.</p></section>
    </section>
    <section><p>Second &amp; last.</p></section>
  </body>
  <body name="notes"><section><p>A footnote.</p></section></body>
  <binary id="cover.png" content-type="image/png">iVBORw0KGgo=</binary>
</FictionBook>"##;

    #[test]
    fn test_parse_metadata() {
        let doc = parse(SAMPLE.as_bytes(), Scope::Description).unwrap();
        assert!(doc.has_description);
        assert_eq!(doc.title.as_deref(), Some("Dune"));
        assert_eq!(doc.authors.len(), 2);
        assert_eq!(doc.authors[0].display_name, "Frank Patrick Herbert");
        assert_eq!(doc.authors[0].sort_key, "herbert frank");
        assert_eq!(doc.authors[1].display_name, "Anon");
        assert_eq!(doc.genres, vec!["sf_space", "adventure"]);
        assert_eq!(doc.language.as_deref(), Some("en"));
        assert_eq!(doc.date.as_deref(), Some("1965-08-01"));
        assert_eq!(doc.document_id.as_deref(), Some("dune-0001"));
        assert_eq!(doc.annotation, vec!["A desert planet.", "Spice."]);

        let series = doc.series.unwrap();
        assert_eq!(series.series.title, "Dune Chronicles");
        assert_eq!(series.index.as_deref(), Some("1"));
    }

    #[test]
    fn test_parse_body() {
        let doc = parse(SAMPLE.as_bytes(), Scope::Chapters).unwrap();
        assert_eq!(doc.chapters.len(), 2);
        assert_eq!(doc.chapters[0].title.as_deref(), Some("Book One Dune"));
        assert_eq!(
            doc.chapters[0].paragraphs,
            vec!["A beginning is the time.", "Nested", "Inner text."]
        );
        assert_eq!(doc.chapters[1].paragraphs, vec!["Second & last."]);
    }

    #[test]
    fn test_parse_cover_binary() {
        let doc = parse(SAMPLE.as_bytes(), Scope::Cover).unwrap();
        assert_eq!(doc.cover_href.as_deref(), Some("cover.png"));
        let binary = doc.binaries.get("cover.png").unwrap();
        assert_eq!(binary.content_type.as_deref(), Some("image/png"));
        assert_eq!(binary.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_scope_limits_collection() {
        let doc = parse(SAMPLE.as_bytes(), Scope::Description).unwrap();
        assert!(doc.chapters.is_empty());
        assert!(doc.binaries.is_empty());
        assert_eq!(doc.title.as_deref(), Some("Dune"));
        assert_eq!(doc.cover_href.as_deref(), Some("cover.png"));

        let doc = parse(SAMPLE.as_bytes(), Scope::Chapters).unwrap();
        assert!(doc.binaries.is_empty());
        assert_eq!(doc.chapters.len(), 2);

        let doc = parse(SAMPLE.as_bytes(), Scope::Cover).unwrap();
        assert!(doc.chapters.is_empty());
        assert_eq!(doc.binaries.len(), 1);
    }

    #[test]
    fn test_windows_1251_document() {
        let xml = "<?xml version=\"1.0\" encoding=\"windows-1251\"?>\
            <FictionBook><description><title-info><book-title>Война и мир</book-title>\
            </title-info></description></FictionBook>";
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(xml);
        let doc = parse(&bytes, Scope::Description).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Война и мир"));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse(b"<html><body/></html>", Scope::Description).is_err());
        assert!(parse(b"", Scope::Description).is_err());
        assert!(parse(b"<FictionBook><description>", Scope::Description).is_err());
        assert!(parse(b"<FictionBook><description></body></FictionBook>", Scope::Description).is_err());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(&BookFile::physical("/a/dune.fb2")), "dune");
        assert_eq!(file_stem(&BookFile::physical("/a/.fb2")), ".fb2");
    }
}
