//! Pagination cursors
//!
//! Listings page backwards through documents by `_id`. The cursor a client
//! sends back is the hex form of the last ObjectId it saw: 12 bytes written as
//! exactly 24 hexadecimal characters.
//!
//! Malformed cursors do not raise errors. [`to_object_id_cursor`] treats them
//! as "no cursor", which restarts the listing from the newest document.
//! Callers that need to tell the two cases apart use [`CursorParam`].
//!
//! # Example
//!
//! ```rust
//! use moderation::cursor::{to_object_id_cursor, CursorParam};
//!
//! let id = to_object_id_cursor(Some("64b7f0c2a1b2c3d4e5f60718")).unwrap();
//! assert_eq!(id.to_string(), "64b7f0c2a1b2c3d4e5f60718");
//!
//! assert!(to_object_id_cursor(Some("not-a-valid-id")).is_none());
//! assert!(CursorParam::parse(Some("not-a-valid-id")).is_invalid());
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of bytes in an ObjectId
pub const OBJECT_ID_LEN: usize = 12;

/// Errors that can occur while parsing a cursor
#[derive(Debug, Error, PartialEq)]
pub enum CursorError {
    /// Cursor string is empty
    #[error("Cursor is empty")]
    Empty,

    /// Cursor has the wrong number of characters
    #[error("Invalid cursor length: expected 24 hex characters, got {0}")]
    InvalidLength(usize),

    /// Cursor contains non-hex characters
    #[error("Invalid cursor: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Result type for cursor operations
pub type Result<T> = std::result::Result<T, CursorError>;

/// A MongoDB ObjectId
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Create an ObjectId from raw bytes
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Lowercase hex representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Creation time embedded in the first four bytes (seconds since the epoch)
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(seconds), 0)
            .single()
            .unwrap_or_default()
    }
}

impl FromStr for ObjectId {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(CursorError::Empty);
        }
        if s.len() != OBJECT_ID_LEN * 2 {
            return Err(CursorError::InvalidLength(s.len()));
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Extended JSON: {"$oid": "<hex>"}
impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Extended {
            #[serde(rename = "$oid")]
            oid: String,
        }
        Extended { oid: self.to_hex() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Extended {
                #[serde(rename = "$oid")]
                oid: String,
            },
        }

        let hex = match Repr::deserialize(deserializer)? {
            Repr::Hex(hex) => hex,
            Repr::Extended { oid } => oid,
        };
        hex.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of reading a cursor query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorParam {
    /// No cursor was supplied
    Absent,
    /// A well-formed cursor
    Valid(ObjectId),
    /// A cursor was supplied but is not an ObjectId
    Invalid(String),
}

impl CursorParam {
    /// Classify a raw cursor parameter. An empty string counts as absent.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => CursorParam::Absent,
            Some(raw) => match raw.parse::<ObjectId>() {
                Ok(id) => CursorParam::Valid(id),
                Err(e) => {
                    tracing::debug!("Ignoring malformed cursor {:?}: {}", raw, e);
                    CursorParam::Invalid(raw.to_string())
                }
            },
        }
    }

    /// The cursor if it was valid
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            CursorParam::Valid(id) => Some(*id),
            _ => None,
        }
    }

    /// Check if a malformed cursor was supplied
    pub fn is_invalid(&self) -> bool {
        matches!(self, CursorParam::Invalid(_))
    }
}

/// Validate a raw cursor, returning `None` for missing or malformed input
pub fn to_object_id_cursor(raw: Option<&str>) -> Option<ObjectId> {
    CursorParam::parse(raw).object_id()
}

/// Validate a cursor held in an arbitrary JSON value. Anything but a string
/// is treated as no cursor.
pub fn to_object_id_cursor_value(raw: &Value) -> Option<ObjectId> {
    to_object_id_cursor(raw.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID: &str = "64b7f0c2a1b2c3d4e5f60718";

    #[test]
    fn test_valid_cursor() {
        let id = to_object_id_cursor(Some(VALID)).unwrap();
        assert_eq!(id.to_string(), VALID);
        assert_eq!(id, VALID.parse::<ObjectId>().unwrap());
    }

    #[test]
    fn test_uppercase_cursor_normalized() {
        let id = to_object_id_cursor(Some("64B7F0C2A1B2C3D4E5F60718")).unwrap();
        assert_eq!(id.to_string(), VALID);
    }

    #[test]
    fn test_invalid_cursors() {
        assert!(to_object_id_cursor(Some("not-a-valid-id")).is_none());
        assert!(to_object_id_cursor(Some("")).is_none());
        assert!(to_object_id_cursor(None).is_none());
        assert!(to_object_id_cursor(Some("64b7f0c2a1b2c3d4e5f6071")).is_none());
        assert!(to_object_id_cursor(Some("64b7f0c2a1b2c3d4e5f6071z")).is_none());
        assert!(to_object_id_cursor(Some("64b7f0c2a1b2c3d4e5f607180")).is_none());
    }

    #[test]
    fn test_from_str_errors() {
        assert_eq!("".parse::<ObjectId>(), Err(CursorError::Empty));
        assert_eq!("abc".parse::<ObjectId>(), Err(CursorError::InvalidLength(3)));
        assert!(matches!(
            "zzzzzzzzzzzzzzzzzzzzzzzz".parse::<ObjectId>(),
            Err(CursorError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_cursor_param() {
        assert_eq!(CursorParam::parse(None), CursorParam::Absent);
        assert_eq!(CursorParam::parse(Some("")), CursorParam::Absent);
        assert!(matches!(CursorParam::parse(Some(VALID)), CursorParam::Valid(_)));

        let invalid = CursorParam::parse(Some("bogus"));
        assert!(invalid.is_invalid());
        assert_eq!(invalid.object_id(), None);
        assert_eq!(invalid, CursorParam::Invalid("bogus".to_string()));
    }

    #[test]
    fn test_cursor_from_json_value() {
        assert!(to_object_id_cursor_value(&json!(VALID)).is_some());
        assert!(to_object_id_cursor_value(&json!(12345)).is_none());
        assert!(to_object_id_cursor_value(&json!(null)).is_none());
        assert!(to_object_id_cursor_value(&json!({ "$oid": VALID })).is_none());
    }

    #[test]
    fn test_timestamp() {
        // 0x64b7f0c2 = 1689776322
        let id: ObjectId = VALID.parse().unwrap();
        assert_eq!(id.timestamp().timestamp(), 1_689_776_322);
    }

    #[test]
    fn test_ordering_follows_bytes() {
        let older: ObjectId = "64b7f0c2a1b2c3d4e5f60718".parse().unwrap();
        let newer: ObjectId = "64b7f0c3a1b2c3d4e5f60718".parse().unwrap();
        assert!(older < newer);
    }

    #[test]
    fn test_serialization() {
        let id: ObjectId = VALID.parse().unwrap();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, json!({ "$oid": VALID }));

        let from_extended: ObjectId = serde_json::from_value(json).unwrap();
        assert_eq!(from_extended, id);

        let from_hex: ObjectId = serde_json::from_value(json!(VALID)).unwrap();
        assert_eq!(from_hex, id);

        assert!(serde_json::from_value::<ObjectId>(json!("nope")).is_err());
    }

    #[test]
    fn test_cursor_error_display() {
        assert!(format!("{}", CursorError::InvalidLength(7)).contains("7"));
    }
}
