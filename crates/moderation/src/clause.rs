//! Moderation filter clauses
//!
//! This module turns a set of requested moderation statuses into a filter over
//! the `moderationStatus` field, in the shape the MongoDB query layer expects:
//!
//! - `{"moderationStatus": "pending"}`
//! - `{"moderationStatus": {"$in": ["flagged", "approved"]}}`
//! - `{"$or": [{"moderationStatus": "pending"}, {"moderationStatus": {"$exists": false}}]}`
//!
//! Videos uploaded before moderation existed have no `moderationStatus` at
//! all and count as pending, so any request that includes `pending` must also
//! match documents where the field is missing.
//!
//! # Example
//!
//! ```rust
//! use moderation::clause::{build_video_moderation_clause, ModerationClause};
//! use serde_json::json;
//!
//! let clause = build_video_moderation_clause(&["flagged", "pending"]);
//! assert_eq!(
//!     clause,
//!     ModerationClause::OrMissing { others: vec!["flagged".to_string()] }
//! );
//! assert!(clause.matches(&json!({"title": "Yasuo montage"})));
//! assert!(!clause.matches(&json!({"moderationStatus": "rejected"})));
//! ```

use crate::status::{dedup_statuses, DEFAULT_STATUS, PENDING_STATUS, STATUS_FIELD};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// A filter over the moderation status field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationClause {
    /// Status equals a single value
    Equals(String),
    /// Status is one of the listed values
    In(Vec<String>),
    /// Status is pending, missing entirely, or one of `others`
    OrMissing {
        /// Requested statuses other than pending (may be empty)
        others: Vec<String>,
    },
}

impl ModerationClause {
    /// Whether documents without a status field can match
    pub fn matches_missing(&self) -> bool {
        matches!(self, ModerationClause::OrMissing { .. })
    }

    /// Statuses matched explicitly by value
    pub fn statuses(&self) -> Vec<&str> {
        match self {
            ModerationClause::Equals(status) => vec![status.as_str()],
            ModerationClause::In(statuses) => statuses.iter().map(String::as_str).collect(),
            ModerationClause::OrMissing { others } => others
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(PENDING_STATUS))
                .collect(),
        }
    }

    /// Render the clause as a MongoDB filter document
    pub fn to_filter(&self) -> Value {
        Value::Object(self.to_filter_map())
    }

    /// Render the clause as the top-level fields of a filter document, so it
    /// can be merged with other conditions
    pub fn to_filter_map(&self) -> Map<String, Value> {
        let mut filter = Map::new();
        match self {
            ModerationClause::Equals(status) => {
                filter.insert(STATUS_FIELD.to_string(), json!(status));
            }
            ModerationClause::In(statuses) => {
                filter.insert(STATUS_FIELD.to_string(), json!({ "$in": statuses }));
            }
            ModerationClause::OrMissing { others } => {
                let mut branches = Vec::with_capacity(3);
                if !others.is_empty() {
                    branches.push(json!({ STATUS_FIELD: { "$in": others } }));
                }
                branches.push(json!({ STATUS_FIELD: PENDING_STATUS }));
                branches.push(json!({ STATUS_FIELD: { "$exists": false } }));
                filter.insert("$or".to_string(), Value::Array(branches));
            }
        }
        filter
    }

    /// Evaluate the clause against a document
    ///
    /// A field set to `null` counts as present, as it does for `$exists`.
    /// Only string statuses can equal a requested status.
    pub fn matches(&self, document: &Value) -> bool {
        let field = document.get(STATUS_FIELD);
        let status = field.and_then(Value::as_str);
        match self {
            ModerationClause::Equals(expected) => status == Some(expected.as_str()),
            ModerationClause::In(statuses) => {
                status.is_some_and(|s| statuses.iter().any(|expected| expected == s))
            }
            ModerationClause::OrMissing { others } => match field {
                None => true,
                Some(_) => status.is_some_and(|s| {
                    s == PENDING_STATUS || others.iter().any(|expected| expected == s)
                }),
            },
        }
    }
}

impl Serialize for ModerationClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_filter_map().serialize(serializer)
    }
}

/// Build the clause for a video moderation listing
///
/// | pending requested | other statuses | clause |
/// |---|---|---|
/// | yes | some | `OrMissing { others }` |
/// | yes | none | `OrMissing { others: [] }` |
/// | no | none | `Equals("pending")` |
/// | no | some | `In(others)` |
pub fn build_video_moderation_clause<S: AsRef<str>>(statuses: &[S]) -> ModerationClause {
    let unique = dedup_statuses(statuses);
    let includes_pending = unique.iter().any(|s| s == PENDING_STATUS);
    let others: Vec<String> = unique.into_iter().filter(|s| s != PENDING_STATUS).collect();

    match (includes_pending, others.is_empty()) {
        (true, _) => ModerationClause::OrMissing { others },
        (false, true) => {
            tracing::debug!("Empty video status set, defaulting to {:?}", PENDING_STATUS);
            ModerationClause::Equals(PENDING_STATUS.to_string())
        }
        (false, false) => ModerationClause::In(others),
    }
}

/// Build the clause for a generic moderation listing
///
/// Generic records always carry a status, so there is no missing-field case.
/// An empty input falls back to `needsReview`.
pub fn build_moderation_clause<S: AsRef<str>>(statuses: &[S]) -> ModerationClause {
    let unique = dedup_statuses(statuses);
    if unique.is_empty() {
        tracing::debug!("Empty status set, defaulting to {:?}", DEFAULT_STATUS);
        return ModerationClause::In(vec![DEFAULT_STATUS.to_string()]);
    }
    ModerationClause::In(unique)
}
