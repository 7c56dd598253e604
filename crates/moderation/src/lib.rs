//! Moderation listing queries for Champion Clips
//!
//! This crate turns the raw query parameters of a moderation listing into a
//! page-size limit, a status set, a MongoDB filter over `moderationStatus`,
//! and an ObjectId pagination cursor.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clause;
pub mod config;
pub mod cursor;
pub mod limit;
pub mod listing;
pub mod status;

pub use clause::{build_moderation_clause, build_video_moderation_clause, ModerationClause};
pub use config::{ConfigError, ModerationQueryConfig};
pub use cursor::{to_object_id_cursor, CursorError, CursorParam, ObjectId};
pub use limit::parse_limit;
pub use listing::{
    FindRequest, ListingError, ListingKind, ListingParams, ModerationListing,
    ModerationListingQuery, ModerationStore, Page, StoreError,
};
pub use status::{parse_statuses, parse_video_moderation_statuses};
