//! Moderation status list parsing
//!
//! Statuses arrive as a comma-separated query parameter. Generic listings keep
//! the labels exactly as sent; video listings lower-case them.

/// Field that carries the moderation status on stored documents
pub const STATUS_FIELD: &str = "moderationStatus";

/// Status used for generic listings when none is requested
pub const DEFAULT_STATUS: &str = "needsReview";

/// Status used for video listings when none is requested. Videos stored
/// before the status field existed are treated as having this status.
pub const PENDING_STATUS: &str = "pending";

/// Parse a generic comma-separated status list
///
/// Tokens are trimmed and empty tokens dropped; case is preserved. An empty
/// result yields `["needsReview"]`.
///
/// # Example
///
/// ```rust
/// use moderation::status::parse_statuses;
///
/// assert_eq!(parse_statuses(Some("a, b,,c")), vec!["a", "b", "c"]);
/// assert_eq!(parse_statuses(None), vec!["needsReview"]);
/// ```
pub fn parse_statuses(raw: Option<&str>) -> Vec<String> {
    let statuses: Vec<String> = split_tokens(raw).map(str::to_string).collect();
    or_default(statuses, DEFAULT_STATUS)
}

/// Parse a video status list: like [`parse_statuses`] but lower-cased, and an
/// empty result yields `["pending"]`.
pub fn parse_video_moderation_statuses(raw: Option<&str>) -> Vec<String> {
    let statuses: Vec<String> = split_tokens(raw).map(str::to_lowercase).collect();
    or_default(statuses, PENDING_STATUS)
}

/// Remove repeated statuses, keeping the first occurrence of each
pub fn dedup_statuses<S: AsRef<str>>(statuses: &[S]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(statuses.len());
    for status in statuses {
        let status = status.as_ref();
        if !unique.iter().any(|s| s == status) {
            unique.push(status.to_string());
        }
    }
    unique
}

fn split_tokens(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn or_default(statuses: Vec<String>, default: &str) -> Vec<String> {
    if statuses.is_empty() {
        tracing::debug!("No statuses requested, falling back to {:?}", default);
        vec![default.to_string()]
    } else {
        statuses
    }
}
