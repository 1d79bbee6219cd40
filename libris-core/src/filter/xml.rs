//! Persisted XML form of filter trees
//!
//! Leaves are written as `<filter type="..." .../>` with their attributes in
//! emission order; `And`/`Or` are written as `<and>`/`<or>` elements wrapping
//! their two children.

use super::{Filter, Tagable, AND_TAG, FILTER_TAG, OR_TAG};
use crate::error::FilterXmlError;
use crate::types::{Author, Series, Tag};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Write};

/// Render a filter tree as XML
pub fn to_xml(filter: &Filter) -> Result<String, FilterXmlError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_filter(&mut writer, filter)?;
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| FilterXmlError::Xml(e.to_string()))
}

/// Write a filter tree to any writer
pub fn write_to<W: Write>(filter: &Filter, out: W) -> Result<(), FilterXmlError> {
    let mut writer = Writer::new(out);
    write_filter(&mut writer, filter)
}

fn write_filter<W: Write>(writer: &mut Writer<W>, filter: &Filter) -> Result<(), FilterXmlError> {
    let mut elem = BytesStart::new(filter.tag());

    if filter.is_single_tag() {
        for (key, value) in filter.attributes().unwrap_or_default() {
            elem.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Empty(elem))?;
        return Ok(());
    }

    writer.write_event(Event::Start(elem))?;
    for child in [filter.first(), filter.second()].into_iter().flatten() {
        write_filter(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(filter.tag())))?;
    Ok(())
}

/// Open element while parsing
enum Frame {
    Leaf(Filter),
    Container { tag: String, children: Vec<Filter> },
}

/// Parse a filter tree from XML
pub fn from_xml(xml: &str) -> Result<Filter, FilterXmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut roots: Vec<Filter> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = element_name(&e);
                if name == FILTER_TAG {
                    stack.push(Frame::Leaf(leaf_from_element(&e)?));
                } else if name == AND_TAG || name == OR_TAG {
                    stack.push(Frame::Container {
                        tag: name,
                        children: Vec::new(),
                    });
                } else {
                    return Err(FilterXmlError::UnknownElement(name));
                }
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                let filter = if name == FILTER_TAG {
                    leaf_from_element(&e)?
                } else if name == AND_TAG || name == OR_TAG {
                    return Err(FilterXmlError::ChildCount { tag: name, found: 0 });
                } else {
                    return Err(FilterXmlError::UnknownElement(name));
                };
                attach(filter, &mut stack, &mut roots)?;
            }
            Event::End(_) => {
                let filter = match stack.pop() {
                    Some(Frame::Leaf(filter)) => filter,
                    Some(Frame::Container { tag, children }) => combine(tag, children)?,
                    None => return Err(FilterXmlError::Xml("unexpected closing tag".into())),
                };
                attach(filter, &mut stack, &mut roots)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| FilterXmlError::Xml(e.to_string()))?;
                if !text.trim().is_empty() {
                    return Err(FilterXmlError::Xml(format!("unexpected text '{}'", text)));
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry no filter state
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(FilterXmlError::Xml("unclosed element".into()));
    }
    match roots.len() {
        0 => Err(FilterXmlError::Empty),
        1 => Ok(roots.remove(0)),
        n => Err(FilterXmlError::Xml(format!("{} root filters, expected one", n))),
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Hand a finished filter to the enclosing container, or to the roots
fn attach(
    filter: Filter,
    stack: &mut [Frame],
    roots: &mut Vec<Filter>,
) -> Result<(), FilterXmlError> {
    match stack.last_mut() {
        Some(Frame::Container { children, .. }) => {
            children.push(filter);
            Ok(())
        }
        Some(Frame::Leaf(_)) => Err(FilterXmlError::Xml(
            "<filter> elements cannot contain other filters".into(),
        )),
        None => {
            roots.push(filter);
            Ok(())
        }
    }
}

fn combine(tag: String, children: Vec<Filter>) -> Result<Filter, FilterXmlError> {
    let found = children.len();
    let [first, second]: [Filter; 2] = children
        .try_into()
        .map_err(|_| FilterXmlError::ChildCount {
            tag: tag.clone(),
            found,
        })?;

    if tag == AND_TAG {
        Ok(Filter::and(first, second))
    } else {
        Ok(Filter::or(first, second))
    }
}

fn leaf_from_element(e: &BytesStart<'_>) -> Result<Filter, FilterXmlError> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| FilterXmlError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| FilterXmlError::Xml(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    leaf_from_attributes(&attributes)
}

/// Rebuild a leaf filter from its attribute list
pub fn leaf_from_attributes(attributes: &[(String, String)]) -> Result<Filter, FilterXmlError> {
    let get = |key: &str| {
        attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let kind = get("type").ok_or_else(|| FilterXmlError::MissingAttribute {
        kind: FILTER_TAG.to_string(),
        attribute: "type".to_string(),
    })?;
    let require = |key: &str| {
        get(key).ok_or_else(|| FilterXmlError::MissingAttribute {
            kind: kind.to_string(),
            attribute: key.to_string(),
        })
    };

    let filter = match kind {
        "empty" => Filter::Empty,
        "author" => {
            let display_name = require("displayName")?;
            let sort_key = match get("sortKey") {
                Some(key) => key,
                None => require("sorkKey")?,
            };
            Filter::ByAuthor(Author::new(display_name, sort_key))
        }
        "tag" => {
            let names: Vec<&str> = (0..)
                .map_while(|i| get(&format!("name{}", i)))
                .collect();
            match Tag::from_path(names.as_slice()) {
                Some(tag) => Filter::ByTag(tag),
                None => {
                    return Err(FilterXmlError::MissingAttribute {
                        kind: kind.to_string(),
                        attribute: "name0".to_string(),
                    })
                }
            }
        }
        "label" => Filter::ByLabel(require("displayName")?.to_string()),
        "pattern" => Filter::by_pattern(require("pattern")?),
        "title-prefix" => Filter::by_title_prefix(require("prefix")?),
        "series" => Filter::BySeries(Series::new(require("title")?)),
        "has-bookmark" => Filter::HasBookmark,
        other => return Err(FilterXmlError::UnknownType(other.to_string())),
    };
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_xml() {
        let xml = to_xml(&Filter::HasBookmark).unwrap();
        assert_eq!(xml, r#"<filter type="has-bookmark"/>"#);
    }

    #[test]
    fn test_container_xml() {
        let filter = Filter::or(Filter::ByLabel("to-read".into()), Filter::Empty);
        let xml = to_xml(&filter).unwrap();
        assert_eq!(
            xml,
            r#"<or><filter type="label" displayName="to-read"/><filter type="empty"/></or>"#
        );
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let xml = to_xml(&Filter::ByLabel("a<b & \"c\"".into())).unwrap();
        assert!(!xml.contains("a<b"));
        assert_eq!(
            from_xml(&xml).unwrap(),
            Filter::ByLabel("a<b & \"c\"".into())
        );
    }

    #[test]
    fn test_parse_expanded_leaf_form() {
        let filter = from_xml(r#"<filter type="has-bookmark"></filter>"#).unwrap();
        assert_eq!(filter, Filter::HasBookmark);
    }

    #[test]
    fn test_parse_with_declaration_and_whitespace() {
        let xml = r#"<?xml version="1.0"?>
            <and>
                <filter type="series" title="Dune"/>
                <filter type="title-prefix" prefix="D"/>
            </and>"#;
        let filter = from_xml(xml).unwrap();
        assert_eq!(
            filter,
            Filter::and(
                Filter::BySeries(Series::new("Dune")),
                Filter::by_title_prefix("D")
            )
        );
    }

    #[test]
    fn test_sort_key_spellings() {
        let legacy = r#"<filter type="author" displayName="A B" sorkKey="b a"/>"#;
        let fixed = r#"<filter type="author" displayName="A B" sortKey="b a"/>"#;
        let expected = Filter::ByAuthor(Author::new("A B", "b a"));
        assert_eq!(from_xml(legacy).unwrap(), expected);
        assert_eq!(from_xml(fixed).unwrap(), expected);
    }

    #[test]
    fn test_pattern_is_lowercased_on_read() {
        let filter = from_xml(r#"<filter type="pattern" pattern="DUNE"/>"#).unwrap();
        assert_eq!(filter, Filter::ByPattern("dune".into()));
    }

    #[test]
    fn test_tag_chain_rebuilt() {
        let xml = r#"<filter type="tag" name0="Root" name1="Mid" name2="Leaf"/>"#;
        let Filter::ByTag(tag) = from_xml(xml).unwrap() else {
            panic!("Expected tag filter");
        };
        assert_eq!(tag.path(), vec!["Root", "Mid", "Leaf"]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            from_xml(r#"<filter type="bogus"/>"#),
            Err(FilterXmlError::UnknownType(t)) if t == "bogus"
        ));
        assert!(matches!(
            from_xml(r#"<filter/>"#),
            Err(FilterXmlError::MissingAttribute { .. })
        ));
        assert!(matches!(
            from_xml(r#"<filter type="label"/>"#),
            Err(FilterXmlError::MissingAttribute { attribute, .. }) if attribute == "displayName"
        ));
        assert!(matches!(
            from_xml(r#"<filter type="tag"/>"#),
            Err(FilterXmlError::MissingAttribute { attribute, .. }) if attribute == "name0"
        ));
        assert!(matches!(
            from_xml(r#"<and><filter type="empty"/></and>"#),
            Err(FilterXmlError::ChildCount { found: 1, .. })
        ));
        assert!(matches!(
            from_xml(r#"<or/>"#),
            Err(FilterXmlError::ChildCount { found: 0, .. })
        ));
        assert!(matches!(
            from_xml(r#"<not><filter type="empty"/></not>"#),
            Err(FilterXmlError::UnknownElement(e)) if e == "not"
        ));
        assert!(matches!(from_xml(""), Err(FilterXmlError::Empty)));
        assert!(from_xml(r#"<filter type="empty"/><filter type="empty"/>"#).is_err());
        assert!(from_xml(r#"<and><filter type="empty"/>"#).is_err());
    }
}
