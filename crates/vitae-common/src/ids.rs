//! Typed document identifiers.
//!
//! Credential records are addressed by 12-byte document ids rendered as 24
//! lower-case hex characters: a 4-byte big-endian creation timestamp followed
//! by 8 random bytes. Parsing is case-insensitive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of raw bytes in a document id.
pub const DOCUMENT_ID_LEN: usize = 12;

/// Returned when a string is not a well-formed document id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid document id: {0:?}")]
pub struct InvalidIdError(pub String);

/// Unique identifier for a credential ("titulo") record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TituloId([u8; DOCUMENT_ID_LEN]);

impl TituloId {
    /// Generate a new id stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let tail: [u8; 8] = rand::random();

        let mut bytes = [0u8; DOCUMENT_ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&tail);
        Self(bytes)
    }

    /// Creation timestamp encoded in the first four bytes (unix seconds).
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Check whether `s` is a well-formed id without allocating one.
    pub fn is_valid(s: &str) -> bool {
        s.len() == DOCUMENT_ID_LEN * 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl Default for TituloId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TituloId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid(s) {
            return Err(InvalidIdError(s.to_string()));
        }

        let mut bytes = [0u8; DOCUMENT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidIdError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for TituloId {
    type Error = InvalidIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TituloId> for String {
    fn from(id: TituloId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for TituloId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let a = TituloId::new();
        let b = TituloId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_id_carries_timestamp() {
        let before = chrono::Utc::now().timestamp() as u32;
        let id = TituloId::new();
        let after = chrono::Utc::now().timestamp() as u32;
        assert!(id.timestamp() >= before && id.timestamp() <= after);
    }

    #[test]
    fn test_display_parse() {
        let id = TituloId::new();
        let s = id.to_string();
        assert_eq!(s.len(), 24);
        assert_eq!(s.parse::<TituloId>().unwrap(), id);
    }

    #[test]
    fn test_parse_uppercase_normalizes() {
        let id: TituloId = "65A1F0C2E4B0A1B2C3D4E5F6".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "not-an-id",
            "65a1f0c2e4b0a1b2c3d4e5f",
            "65a1f0c2e4b0a1b2c3d4e5f6a",
            "65a1f0c2e4b0a1b2c3d4e5fz",
            "../../etc/passwd",
            "65a1f0c2-4b0a-1b2c-3d4e-5f6",
        ] {
            assert!(bad.parse::<TituloId>().is_err(), "accepted {bad:?}");
            assert!(!TituloId::is_valid(bad));
        }
    }

    #[test]
    fn test_serde_as_string() {
        let id: TituloId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65a1f0c2e4b0a1b2c3d4e5f6\"");

        let back: TituloId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<TituloId>("\"nope\"").is_err());
    }
}
