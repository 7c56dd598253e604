//! Page-size limit parsing
//!
//! Limits arrive as raw query-string values. Anything that is not a positive
//! number falls back to the default page size, and large values are clamped.

use crate::config::ModerationQueryConfig;
use serde_json::Value;

/// Page size used when no usable limit is supplied
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page size a client may request
pub const MAX_LIMIT: u32 = 100;

/// Parse a raw limit with the built-in defaults
///
/// Never fails: missing, non-numeric, zero and negative inputs all yield
/// [`DEFAULT_LIMIT`], and anything larger than [`MAX_LIMIT`] is clamped.
///
/// # Example
///
/// ```rust
/// use moderation::limit::parse_limit;
///
/// assert_eq!(parse_limit(Some("25")), 25);
/// assert_eq!(parse_limit(Some("abc")), 10);
/// assert_eq!(parse_limit(Some("500")), 100);
/// assert_eq!(parse_limit(None), 10);
/// ```
pub fn parse_limit(raw: Option<&str>) -> u32 {
    clamp_limit(raw.and_then(parse_number), DEFAULT_LIMIT, MAX_LIMIT)
}

/// Parse a raw limit using the bounds from `config`
pub fn parse_limit_with(raw: Option<&str>, config: &ModerationQueryConfig) -> u32 {
    clamp_limit(raw.and_then(parse_number), config.default_limit, config.max_limit)
}

/// Parse a limit from an arbitrary JSON value
///
/// Numbers and numeric strings are honoured; every other type (booleans,
/// arrays, objects, null) yields the default.
pub fn parse_limit_value(raw: &Value) -> u32 {
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    };
    clamp_limit(number, DEFAULT_LIMIT, MAX_LIMIT)
}

/// Numeric conversion of a query-string token. Surrounding whitespace is
/// ignored and the empty string is not a number. Unsigned `0x`, `0o` and `0b`
/// literals are read in their radix.
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(number) = parse_radix_literal(trimmed) {
        return number;
    }
    trimmed.parse::<f64>().ok()
}

/// `Some(..)` when the token carries a radix prefix, holding the value if the
/// digits are valid for that radix.
fn parse_radix_literal(token: &str) -> Option<Option<f64>> {
    let prefix = token.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };

    let digits = &token[2..];
    if digits.is_empty() {
        return Some(None);
    }
    Some(digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    }))
}

fn clamp_limit(number: Option<f64>, default: u32, max: u32) -> u32 {
    // An unvalidated config must still yield a limit in [1, max].
    let max = max.max(1);
    let default = default.clamp(1, max);

    let Some(value) = number.filter(|v| !v.is_nan()) else {
        tracing::debug!("Limit missing or not a number, using default {}", default);
        return default;
    };

    // Fractions truncate; anything that truncates below 1 is treated like 0.
    let value = value.trunc();
    if value < 1.0 {
        tracing::debug!("Limit {} is not positive, using default {}", value, default);
        return default;
    }

    if value >= max as f64 {
        max
    } else {
        value as u32
    }
}
