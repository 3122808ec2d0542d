//! Redaction of credentials and URLs in error text
//!
//! Best effort only: a token or URL ends at the first whitespace, quote,
//! comma, semicolon, colon or closing parenthesis.

use regex::Regex;
use std::sync::LazyLock;

/// Replacement for bearer token values
pub const TOKEN_REDACTED: &str = "[REDACTED]";
/// Replacement for URLs
pub const URL_REDACTED: &str = "[URL REDACTED]";

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(bearer\s+)[^\s",;:)]+"#).unwrap());
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s",;:)]+"#).unwrap());

/// Strip bearer tokens and URLs from a message before it reaches the user
pub fn sanitize_error_message(message: &str) -> String {
    let without_tokens = BEARER_RE.replace_all(message, format!("${{1}}{TOKEN_REDACTED}"));
    URL_RE
        .replace_all(&without_tokens, URL_REDACTED)
        .into_owned()
}
