//! Regex-based HTML introspection.
//!
//! These are pure string-in/option-out matchers, deliberately not a real HTML
//! parser: they recognize only the documented tag shapes, the same ones a
//! browser emits for charset declarations and meta-refresh redirects. Keeping
//! them here makes the patterns testable without any fetching.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+charset=["']?([\w-]+)["']?"#).expect("valid regex")
});

#[allow(clippy::expect_used)]
static META_CONTENT_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+http-equiv=["']Content-Type["']\s+content=["'].*charset=([\w-]+)["']"#)
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static META_REFRESH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+http-equiv=["']refresh["']\s+content=["']\d+;\s*URL=([^"']+)["']"#)
        .expect("valid regex")
});

/// Searches an HTML prefix for a charset declaration.
///
/// Checks `<meta charset="...">` first, then
/// `<meta http-equiv="Content-Type" content="...charset=...">`, both
/// case-insensitively. Returns the first charset token found.
#[must_use]
pub fn sniff_meta_charset(prefix: &str) -> Option<String> {
    if let Some(captures) = META_CHARSET.captures(prefix) {
        return Some(captures[1].to_string());
    }
    META_CONTENT_TYPE
        .captures(prefix)
        .map(|captures| captures[1].to_string())
}

/// Searches decoded HTML for a meta-refresh redirect target.
///
/// Matches `<meta http-equiv="refresh" content="N;URL=target">` and returns
/// the target as written, which may be relative. The delay is ignored.
#[must_use]
pub fn find_meta_refresh(html: &str) -> Option<String> {
    META_REFRESH
        .captures(html)
        .map(|captures| captures[1].to_string())
}
