//! Hierarchical book tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A tag, optionally nested under a parent tag ("Fiction > Science Fiction")
///
/// Equality compares the whole chain, so two tags with the same name under
/// different parents are different tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub parent: Option<Arc<Tag>>,
}

impl Tag {
    /// Create a top-level tag
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Create a tag nested under `parent`
    pub fn child_of(parent: Arc<Tag>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
        }
    }

    /// Build a chain from root-to-leaf names, returning the leaf
    ///
    /// Returns `None` for an empty path.
    pub fn from_path<S: AsRef<str>>(names: &[S]) -> Option<Tag> {
        let mut current: Option<Tag> = None;
        for name in names {
            current = Some(match current {
                None => Tag::new(name.as_ref()),
                Some(parent) => Tag::child_of(Arc::new(parent), name.as_ref()),
            });
        }
        current
    }

    /// The sentinel tag that stands for "no tag at all"
    pub fn null() -> Self {
        Self::new("")
    }

    pub fn is_null(&self) -> bool {
        self.name.is_empty() && self.parent.is_none()
    }

    /// Names from the root of the chain down to this tag
    pub fn path(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = Some(self);
        while let Some(tag) = current {
            names.push(tag.name.as_str());
            current = tag.parent.as_deref();
        }
        names.reverse();
        names
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_root_to_leaf() {
        let tag = Tag::from_path(&["Root", "Mid", "Leaf"]).unwrap();
        assert_eq!(tag.name, "Leaf");
        assert_eq!(tag.path(), vec!["Root", "Mid", "Leaf"]);
        assert_eq!(tag.to_string(), "Root/Mid/Leaf");
    }

    #[test]
    fn test_equality_includes_parents() {
        let a = Tag::from_path(&["Fiction", "Classics"]).unwrap();
        let b = Tag::from_path(&["Poetry", "Classics"]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, Tag::from_path(&["Fiction", "Classics"]).unwrap());
    }

    #[test]
    fn test_empty_path() {
        assert!(Tag::from_path::<&str>(&[]).is_none());
        assert!(Tag::null().is_null());
    }
}
