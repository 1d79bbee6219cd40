//! Text encodings a plugin accepts

use encoding_rs::Encoding;

/// The set of text encodings offered for a file type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingCollection {
    /// Any encoding; the reader detects it
    Auto,

    /// Only these encodings
    Fixed(Vec<&'static Encoding>),
}

impl EncodingCollection {
    /// Canonical names of the encodings, `["auto"]` for [`Auto`](Self::Auto)
    pub fn names(&self) -> Vec<&'static str> {
        match self {
            EncodingCollection::Auto => vec![crate::types::AUTO_ENCODING],
            EncodingCollection::Fixed(encodings) => encodings.iter().map(|e| e.name()).collect(),
        }
    }

    /// Resolve a label ("utf8", "cp1251", ...) to an encoding in this set
    pub fn resolve(&self, label: &str) -> Option<&'static Encoding> {
        let encoding = Encoding::for_label(label.trim().as_bytes())?;
        match self {
            EncodingCollection::Auto => Some(encoding),
            EncodingCollection::Fixed(encodings) => encodings.contains(&encoding).then_some(encoding),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.resolve(label).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_accepts_any_known_label() {
        let auto = EncodingCollection::Auto;
        assert!(auto.contains("koi8-r"));
        assert!(!auto.contains("not-an-encoding"));
        assert_eq!(auto.names(), vec!["auto"]);
    }

    #[test]
    fn test_fixed_set() {
        let fixed = EncodingCollection::Fixed(vec![encoding_rs::UTF_8, encoding_rs::WINDOWS_1251]);
        assert_eq!(fixed.resolve("cp1251"), Some(encoding_rs::WINDOWS_1251));
        assert!(fixed.contains("UTF8"));
        assert!(!fixed.contains("koi8-r"));
        assert_eq!(fixed.names(), vec!["UTF-8", "windows-1251"]);
    }
}
