//! Unique identifiers extracted from book files

use serde::{Deserialize, Serialize};

/// Identifier kind for content hashes
pub const SHA256_UID: &str = "SHA256";

/// A unique identifier of a book, qualified by its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uid {
    /// Identifier kind ("SHA256", "ISBN", "fb2-id")
    pub kind: String,

    pub value: String,
}

impl Uid {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// SHA-256 digest of the given bytes
    pub fn sha256(data: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        Self::new(SHA256_UID, hex::encode(Sha256::digest(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let uid = Uid::sha256(b"hello");
        assert_eq!(uid.kind, "SHA256");
        assert_eq!(
            uid.value,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
