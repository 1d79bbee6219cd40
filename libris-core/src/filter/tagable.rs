//! Serialization contract for nodes persisted as tags

/// Flat, ordered key/value attribute list of a tag
pub type Attributes = Vec<(String, String)>;

/// A value that can be written as a named tag with attributes
///
/// Single tags carry all their state in [`attributes`](Tagable::attributes).
/// Container tags report no attributes; their state lives in the tags they
/// wrap.
pub trait Tagable {
    /// Whether this node is written as one self-contained tag
    fn is_single_tag(&self) -> bool;

    /// Tag name
    fn tag(&self) -> &'static str;

    /// Attributes in emission order, `None` for containers
    fn attributes(&self) -> Option<Attributes>;
}

/// Build an attribute list from string pairs
pub(crate) fn attrs<const N: usize>(pairs: [(&str, &str); N]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
