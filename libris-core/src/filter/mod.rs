//! Boolean selection criteria over books
//!
//! A [`Filter`] is an immutable expression tree: leaves test one property of a
//! book, `And`/`Or` combine two sub-filters. Trees are persisted through the
//! [`Tagable`] contract (see [`xml`]).

mod tagable;
pub mod xml;

pub use tagable::{Attributes, Tagable};

use crate::types::{Author, Book, Series, Tag};
use std::fmt;
use std::sync::Arc;
use tagable::attrs;

/// Tag name of leaf filters
pub const FILTER_TAG: &str = "filter";
/// Tag name of conjunctions
pub const AND_TAG: &str = "and";
/// Tag name of disjunctions
pub const OR_TAG: &str = "or";

/// A predicate over books
///
/// `ByPattern` holds lower-cased text and `ByTitlePrefix` never holds a
/// missing value; build them with [`Filter::by_pattern`] and
/// [`Filter::by_title_prefix`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    /// Matches every book
    #[default]
    Empty,

    /// Books by this author; the null author matches books without authors
    ByAuthor(Author),

    /// Books with this tag; the null tag matches books without tags
    ByTag(Tag),

    /// Books carrying this label
    ByLabel(String),

    /// Books whose free-text matcher accepts this pattern
    ByPattern(String),

    /// Books grouped under this title letter
    ByTitlePrefix(String),

    /// Books in this series
    BySeries(Series),

    /// Books with at least one bookmark
    HasBookmark,

    And(Arc<Filter>, Arc<Filter>),

    Or(Arc<Filter>, Arc<Filter>),
}

impl Filter {
    /// Pattern filter; the pattern is lower-cased, a missing one becomes empty
    pub fn by_pattern<'a>(pattern: impl Into<Option<&'a str>>) -> Self {
        Filter::ByPattern(pattern.into().map(str::to_lowercase).unwrap_or_default())
    }

    /// Title prefix filter; a missing prefix becomes empty
    pub fn by_title_prefix<'a>(prefix: impl Into<Option<&'a str>>) -> Self {
        Filter::ByTitlePrefix(prefix.into().unwrap_or_default().to_string())
    }

    /// Books with no authors
    pub fn without_author() -> Self {
        Filter::ByAuthor(Author::null())
    }

    /// Books with no tags
    pub fn without_tag() -> Self {
        Filter::ByTag(Tag::null())
    }

    /// Both filters must match
    pub fn and(first: impl Into<Arc<Filter>>, second: impl Into<Arc<Filter>>) -> Self {
        Filter::And(first.into(), second.into())
    }

    /// Either filter must match
    pub fn or(first: impl Into<Arc<Filter>>, second: impl Into<Arc<Filter>>) -> Self {
        Filter::Or(first.into(), second.into())
    }

    /// Evaluate against a book that may be absent
    pub fn matches(&self, book: Option<&Book>) -> bool {
        match self {
            Filter::Empty => true,
            Filter::ByAuthor(author) => book.is_some_and(|b| {
                if author.is_null() {
                    b.authors.is_empty()
                } else {
                    b.authors.contains(author)
                }
            }),
            Filter::ByTag(tag) => book.is_some_and(|b| {
                if tag.is_null() {
                    b.tags.is_empty()
                } else {
                    b.tags.contains(tag)
                }
            }),
            Filter::ByLabel(label) => book.is_some_and(|b| b.labels.contains(label)),
            Filter::ByPattern(pattern) => {
                !pattern.is_empty() && book.is_some_and(|b| b.matches_pattern(pattern))
            }
            Filter::ByTitlePrefix(prefix) => {
                book.is_some_and(|b| *prefix == b.first_title_letter())
            }
            Filter::BySeries(series) => book
                .and_then(|b| b.series_info.as_ref())
                .is_some_and(|info| info.series == *series),
            Filter::HasBookmark => book.is_some_and(|b| b.has_bookmark),
            Filter::And(first, second) => first.matches(book) && second.matches(book),
            Filter::Or(first, second) => first.matches(book) || second.matches(book),
        }
    }

    /// Evaluate against a book
    pub fn accepts(&self, book: &Book) -> bool {
        self.matches(Some(book))
    }

    /// Keep the books this filter accepts
    pub fn select<'a, I>(&self, books: I) -> Vec<&'a Book>
    where
        I: IntoIterator<Item = &'a Book>,
    {
        books.into_iter().filter(|b| self.accepts(b)).collect()
    }

    /// Whether this node combines two sub-filters
    pub fn has_children(&self) -> bool {
        matches!(self, Filter::And(..) | Filter::Or(..))
    }

    pub fn first(&self) -> Option<&Filter> {
        match self {
            Filter::And(first, _) | Filter::Or(first, _) => Some(first.as_ref()),
            _ => None,
        }
    }

    pub fn second(&self) -> Option<&Filter> {
        match self {
            Filter::And(_, second) | Filter::Or(_, second) => Some(second.as_ref()),
            _ => None,
        }
    }

    /// Value of the `type` attribute for leaves
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Filter::Empty => Some("empty"),
            Filter::ByAuthor(_) => Some("author"),
            Filter::ByTag(_) => Some("tag"),
            Filter::ByLabel(_) => Some("label"),
            Filter::ByPattern(_) => Some("pattern"),
            Filter::ByTitlePrefix(_) => Some("title-prefix"),
            Filter::BySeries(_) => Some("series"),
            Filter::HasBookmark => Some("has-bookmark"),
            Filter::And(..) | Filter::Or(..) => None,
        }
    }
}

impl Tagable for Filter {
    fn is_single_tag(&self) -> bool {
        !self.has_children()
    }

    fn tag(&self) -> &'static str {
        match self {
            Filter::And(..) => AND_TAG,
            Filter::Or(..) => OR_TAG,
            _ => FILTER_TAG,
        }
    }

    fn attributes(&self) -> Option<Attributes> {
        let kind = self.kind()?;
        let list = match self {
            Filter::Empty | Filter::HasBookmark => attrs([("type", kind)]),
            // "sorkKey" is the persisted spelling; readers accept both
            Filter::ByAuthor(author) => attrs([
                ("type", kind),
                ("displayName", author.display_name.as_str()),
                ("sorkKey", author.sort_key.as_str()),
            ]),
            Filter::ByTag(tag) => {
                let mut list = attrs([("type", kind)]);
                for (i, name) in tag.path().into_iter().enumerate() {
                    list.push((format!("name{}", i), name.to_string()));
                }
                list
            }
            Filter::ByLabel(label) => attrs([("type", kind), ("displayName", label.as_str())]),
            Filter::ByPattern(pattern) => attrs([("type", kind), ("pattern", pattern.as_str())]),
            Filter::ByTitlePrefix(prefix) => attrs([("type", kind), ("prefix", prefix.as_str())]),
            Filter::BySeries(series) => attrs([("type", kind), ("title", series.title.as_str())]),
            Filter::And(..) | Filter::Or(..) => return None,
        };
        Some(list)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Empty => write!(f, "*"),
            Filter::ByAuthor(author) if author.is_null() => write!(f, "author:none"),
            Filter::ByAuthor(author) => write!(f, "author:{:?}", author.display_name),
            Filter::ByTag(tag) if tag.is_null() => write!(f, "tag:none"),
            Filter::ByTag(tag) => write!(f, "tag:{:?}", tag.to_string()),
            Filter::ByLabel(label) => write!(f, "label:{:?}", label),
            Filter::ByPattern(pattern) => write!(f, "pattern:{:?}", pattern),
            Filter::ByTitlePrefix(prefix) => write!(f, "title-prefix:{:?}", prefix),
            Filter::BySeries(series) => write!(f, "series:{:?}", series.title),
            Filter::HasBookmark => write!(f, "has-bookmark"),
            Filter::And(first, second) => write!(f, "({} and {})", first, second),
            Filter::Or(first, second) => write!(f, "({} or {})", first, second),
        }
    }
}
