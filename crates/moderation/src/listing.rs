//! Moderation listings
//!
//! This module assembles the raw query-string parameters of a moderation
//! listing request into a store query, and pages through results newest
//! first using ObjectId cursors.
//!
//! # Example
//!
//! ```rust
//! use moderation::config::ModerationQueryConfig;
//! use moderation::listing::{ListingParams, ModerationListingQuery};
//! use serde_json::json;
//!
//! let params = ListingParams {
//!     limit: Some("5".to_string()),
//!     statuses: Some("Pending".to_string()),
//!     ..Default::default()
//! };
//! let query = ModerationListingQuery::video(&params, &ModerationQueryConfig::default());
//!
//! assert_eq!(query.limit, 5);
//! assert_eq!(query.fetch_limit(), 6);
//! assert_eq!(
//!     query.filter(),
//!     json!({ "$or": [
//!         { "moderationStatus": "pending" },
//!         { "moderationStatus": { "$exists": false } }
//!     ]})
//! );
//! ```

use crate::clause::{build_moderation_clause, build_video_moderation_clause, ModerationClause};
use crate::config::{ConfigError, ModerationQueryConfig};
use crate::cursor::{CursorParam, ObjectId};
use crate::limit::parse_limit_with;
use crate::status::{parse_statuses, parse_video_moderation_statuses};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by a [`ModerationStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the query
    #[error("Query failed: {0}")]
    Query(String),
}

/// Errors that can occur while listing
#[derive(Debug, Error)]
pub enum ListingError {
    /// The cursor was malformed and the listing rejects such cursors
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// A returned document has no usable `_id` to continue from
    #[error("Document at position {0} has no valid _id")]
    MissingId(usize),

    /// The store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The listing configuration is inconsistent
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for listing operations
pub type Result<T> = std::result::Result<T, ListingError>;

/// Raw query parameters of a listing request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingParams {
    /// Requested page size
    #[serde(default)]
    pub limit: Option<String>,
    /// Comma-separated statuses (single-parameter form)
    #[serde(default)]
    pub status: Option<String>,
    /// Comma-separated statuses; wins over `status` when both are set
    #[serde(default)]
    pub statuses: Option<String>,
    /// Hex ObjectId of the last document on the previous page
    #[serde(default)]
    pub cursor: Option<String>,
}

impl ListingParams {
    /// The status parameter to use
    pub fn status_param(&self) -> Option<&str> {
        self.statuses
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.status.as_deref())
    }
}

/// Which kind of record is being listed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// Submitted videos, where a missing status means pending
    Video,
    /// Other moderated records, where statuses are case-sensitive
    Generic,
}

/// A fully parsed listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationListingQuery {
    /// Kind of record listed
    pub kind: ListingKind,
    /// Page size, always in `[1, max_limit]`
    pub limit: u32,
    /// Requested statuses, never empty
    pub statuses: Vec<String>,
    /// Status filter
    pub clause: ModerationClause,
    /// Pagination cursor
    pub cursor: CursorParam,
}

impl ModerationListingQuery {
    /// Parse a video listing request
    pub fn video(params: &ListingParams, config: &ModerationQueryConfig) -> Self {
        let statuses = parse_video_moderation_statuses(params.status_param());
        let clause = build_video_moderation_clause(&statuses);
        Self::assemble(ListingKind::Video, params, config, statuses, clause)
    }

    /// Parse a generic listing request
    pub fn generic(params: &ListingParams, config: &ModerationQueryConfig) -> Self {
        let statuses = parse_statuses(params.status_param());
        let clause = build_moderation_clause(&statuses);
        Self::assemble(ListingKind::Generic, params, config, statuses, clause)
    }

    fn assemble(
        kind: ListingKind,
        params: &ListingParams,
        config: &ModerationQueryConfig,
        statuses: Vec<String>,
        clause: ModerationClause,
    ) -> Self {
        Self {
            kind,
            limit: parse_limit_with(params.limit.as_deref(), config),
            statuses,
            clause,
            cursor: CursorParam::parse(params.cursor.as_deref()),
        }
    }

    /// Filter document: the status clause, plus `_id < cursor` when paging
    pub fn filter(&self) -> Value {
        let mut filter = self.clause.to_filter_map();
        if let Some(id) = self.cursor.object_id() {
            filter.insert("_id".to_string(), json!({ "$lt": id }));
        }
        Value::Object(filter)
    }

    /// Sort document: newest first
    pub fn sort(&self) -> Value {
        json!({ "_id": -1 })
    }

    /// Number of documents returned per page. Never zero, even for a query
    /// assembled by hand.
    pub fn page_size(&self) -> u32 {
        self.limit.max(1)
    }

    /// Number of documents to fetch; one extra reveals whether a next page exists
    pub fn fetch_limit(&self) -> u32 {
        self.page_size().saturating_add(1)
    }

    /// Build the request handed to the store
    pub fn find_request(&self) -> FindRequest {
        FindRequest {
            filter: self.filter(),
            sort: self.sort(),
            limit: self.fetch_limit(),
        }
    }
}

/// A query against the moderated collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindRequest {
    /// MongoDB filter document
    pub filter: Value,
    /// MongoDB sort document
    pub sort: Value,
    /// Maximum number of documents to return
    pub limit: u32,
}

/// Persistence layer consulted by a listing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationStore: Send + Sync {
    /// Return documents matching the request, in the requested order
    async fn find(&self, request: FindRequest) -> std::result::Result<Vec<Value>, StoreError>;
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Documents on this page
    pub items: Vec<Value>,
    /// Cursor for the next page, if there is one
    #[serde(serialize_with = "serialize_cursor")]
    pub next_cursor: Option<ObjectId>,
    /// Whether more documents follow
    pub has_more: bool,
}

// Clients receive cursors as plain hex strings.
fn serialize_cursor<S: Serializer>(
    cursor: &Option<ObjectId>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match cursor {
        Some(id) => serializer.serialize_some(&id.to_hex()),
        None => serializer.serialize_none(),
    }
}

/// Lists moderated records page by page
pub struct ModerationListing<S: ?Sized> {
    store: Arc<S>,
    config: ModerationQueryConfig,
}

impl<S: ModerationStore + ?Sized> ModerationListing<S> {
    /// Create a listing over `store`, validating the configuration
    pub fn new(store: Arc<S>, config: ModerationQueryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &ModerationQueryConfig {
        &self.config
    }

    /// List submitted videos
    pub async fn list_videos(&self, params: &ListingParams) -> Result<Page> {
        let query = ModerationListingQuery::video(params, &self.config);
        self.list(&query).await
    }

    /// List generic moderated records
    pub async fn list_items(&self, params: &ListingParams) -> Result<Page> {
        let query = ModerationListingQuery::generic(params, &self.config);
        self.list(&query).await
    }

    /// Run an already parsed query
    pub async fn list(&self, query: &ModerationListingQuery) -> Result<Page> {
        match &query.cursor {
            CursorParam::Invalid(raw) if self.config.reject_invalid_cursor => {
                tracing::warn!("Rejecting malformed cursor {:?}", raw);
                return Err(ListingError::InvalidCursor(raw.clone()));
            }
            _ => {}
        }

        let request = query.find_request();
        tracing::debug!(
            "Listing {:?} records: filter={} limit={}",
            query.kind,
            request.filter,
            query.limit
        );

        let mut items = self.store.find(request).await.map_err(|e| {
            tracing::warn!("Moderation store query failed: {}", e);
            ListingError::from(e)
        })?;

        let page_size = query.page_size() as usize;
        let has_more = items.len() > page_size;
        items.truncate(page_size);

        let next_cursor = match items.last() {
            Some(last) if has_more => {
                let index = items.len() - 1;
                Some(document_id(last).ok_or(ListingError::MissingId(index))?)
            }
            _ => None,
        };

        Ok(Page { items, next_cursor, has_more })
    }
}

/// Read a document's `_id`, in hex or extended JSON form
fn document_id(document: &Value) -> Option<ObjectId> {
    let id = document.get("_id")?;
    serde_json::from_value(id.clone()).ok()
}
