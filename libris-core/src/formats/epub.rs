//! EPUB reader

use super::{parse_date, FormatPlugin, PluginType};
use crate::error::BookReadingError;
use crate::fs::BookFile;
use crate::types::{Author, Book, BookModel, Chapter, Image, SeriesInfo, Tag, Uid};
use ::epub::doc::EpubDoc;
use scraper::{Html, Node};
use std::io::Cursor;

const FORMAT: &str = "EPUB";

/// Uid kind of the package identifier
pub const EPUB_ID_UID: &str = "epub-id";

/// Elements whose text forms one paragraph
const BLOCKS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "pre", "blockquote", "dt", "dd",
];

/// Elements never rendered as text
const SKIPPED: &[&str] = &["head", "script", "style", "title"];

type Doc = EpubDoc<Cursor<Vec<u8>>>;

/// Reader for EPUB 2 and 3 files
pub struct EpubPlugin;

impl EpubPlugin {
    pub fn new() -> Self {
        Self
    }

    fn open(&self, file: &BookFile) -> Result<(Vec<u8>, Doc), BookReadingError> {
        let data = file.read_bytes()?;
        let doc = EpubDoc::from_reader(Cursor::new(data.clone()))
            .map_err(|e| BookReadingError::malformed(FORMAT, e))?;
        Ok((data, doc))
    }
}

impl Default for EpubPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn meta(doc: &Doc, key: &str) -> Option<String> {
    doc.mdata(key)
        .map(|item| item.value.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn meta_all(doc: &Doc, key: &str) -> Vec<String> {
    doc.metadata
        .iter()
        .filter(|item| item.property == key)
        .map(|item| item.value.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl FormatPlugin for EpubPlugin {
    fn supported_file_type(&self) -> &str {
        "epub"
    }

    fn detect_language_and_encoding(&self, book: &mut Book) -> Result<(), BookReadingError> {
        let (_, doc) = self.open(&book.file)?;
        // OCF containers are always UTF-8
        book.encoding = "utf-8".to_string();
        if book.language.is_empty() {
            book.language = meta(&doc, "language").unwrap_or_default();
        }
        Ok(())
    }

    fn read_meta_info(&self, book: &mut Book) -> Result<(), BookReadingError> {
        let (_, doc) = self.open(&book.file)?;

        book.title = meta(&doc, "title")
            .ok_or_else(|| BookReadingError::missing(FORMAT, "dc:title"))?;
        for creator in meta_all(&doc, "creator") {
            book.add_author(author_from_name(&creator));
        }
        for subject in meta_all(&doc, "subject") {
            book.add_tag(Tag::new(subject));
        }
        if let Some(language) = meta(&doc, "language") {
            book.language = language;
        }
        book.series_info = series_info(
            meta(&doc, "calibre:series"),
            meta(&doc, "calibre:series_index"),
        );
        book.publication_date = meta(&doc, "date").as_deref().and_then(parse_date);
        Ok(())
    }

    fn read_model(&self, model: &mut BookModel) -> Result<(), BookReadingError> {
        let (_, mut doc) = self.open(&model.book.file)?;

        let spine: Vec<String> = doc.spine.iter().map(|item| item.idref.clone()).collect();
        for idref in spine {
            let Some((content, _mime)) = doc.get_resource_str(&idref) else {
                tracing::debug!("Spine item {} missing from {}", idref, model.book.file);
                continue;
            };
            model.add_chapter(chapter_from_html(&content));
        }
        Ok(())
    }

    fn read_uids(&self, book: &mut Book) -> Result<(), BookReadingError> {
        let (data, doc) = self.open(&book.file)?;
        for identifier in meta_all(&doc, "identifier") {
            book.add_uid(Uid::new(EPUB_ID_UID, identifier));
        }
        book.add_uid(Uid::sha256(&data));
        Ok(())
    }

    fn read_cover(&self, file: &BookFile) -> Option<Image> {
        let (_, mut doc) = self.open(file).ok()?;
        let (data, mime_type) = doc.get_cover()?;
        if data.is_empty() {
            return None;
        }
        Some(Image::new(mime_type, data))
    }

    fn read_annotation(&self, file: &BookFile) -> Option<String> {
        let (_, doc) = self.open(file).ok()?;
        let description = meta(&doc, "description")?;
        let text = html_text(&description);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn plugin_type(&self) -> PluginType {
        PluginType::InProcess
    }
}

/// Author from a `dc:creator` value, "First Last" or "Last, First"
fn author_from_name(name: &str) -> Author {
    if let Some((last, first)) = name.split_once(',') {
        return Author::from_parts(first, "", last);
    }
    match name.trim().rsplit_once(char::is_whitespace) {
        Some((first, last)) => Author::from_parts(first, "", last),
        None => Author::from_parts("", "", name),
    }
}

fn series_info(title: Option<String>, index: Option<String>) -> Option<SeriesInfo> {
    title.map(|title| SeriesInfo::new(title, index))
}

/// Collapse runs of whitespace into single spaces
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain text of an HTML fragment
fn html_text(html: &str) -> String {
    node_text(Html::parse_fragment(html).tree.root())
}

/// Text of a node; inline markup joins, block boundaries separate words
fn node_text(node: ego_tree::NodeRef<Node>) -> String {
    let mut text = String::new();
    push_text(node, &mut text);
    normalize(&text)
}

fn push_text(node: ego_tree::NodeRef<Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(element) => {
                let name = element.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                let breaks = BLOCKS.contains(&name) || name == "br" || name == "div";
                if breaks {
                    out.push(' ');
                }
                push_text(child, out);
                if breaks {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// One spine document as a chapter: the first heading becomes the title
fn chapter_from_html(html: &str) -> Chapter {
    let document = Html::parse_document(html);
    let mut chapter = Chapter::new(None);
    collect_blocks(document.tree.root(), &mut chapter);
    chapter
}

fn collect_blocks(node: ego_tree::NodeRef<Node>, chapter: &mut Chapter) {
    for child in node.children() {
        let Some(element) = child.value().as_element() else {
            continue;
        };
        let name = element.name();
        if SKIPPED.contains(&name) {
            continue;
        }
        if !BLOCKS.contains(&name) {
            collect_blocks(child, chapter);
            continue;
        }

        let text = node_text(child);
        let is_heading = name.len() == 2 && name.starts_with('h');
        if is_heading && chapter.title.is_none() && chapter.is_empty() && !text.is_empty() {
            chapter.title = Some(text);
        } else {
            chapter.add_paragraph(text);
        }
    }
}
