//! Cleaning of untrusted free-text and URL fields before they are stored.
//!
//! None of these functions fail. Every input, however malformed, maps to a
//! defined output, and blank input is handed back untouched.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::case_insensitive_string_ext::CaseInsensitiveStringExt;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| compile(r"(?i)<script[^>]*>.*?</script>"));
static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| compile(r"<[^>]*>"));
// ASCII controls other than \t (0x09), \n (0x0A) and \r (0x0D)
static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| compile(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]"));
static SQL_LIKE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)'.*(--|;|/\*|\*/|xp_|sp_|exec|execute|select|insert|update|delete|drop|create|alter|union)",
    )
});

const BLOCKED_URL_SCHEMES: [&str; 2] = ["javascript:", "data:"];

fn compile(pattern: &str) -> Regex {
    // patterns are literals above; a failure here is a programming error
    Regex::new(pattern).expect("sanitizer pattern must compile")
}

fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

// Trims space and ASCII controls only; U+00A0 and other Unicode spaces are content
fn trim_edges(input: &str) -> &str {
    input.trim_matches(|c: char| c <= ' ')
}

/// Strips script blocks, every remaining markup tag and non-printable control
/// characters (keeping `\r`, `\n` and `\t`), then trims spaces and ASCII
/// controls from both ends.
///
/// Blank input is returned as-is. The transformation is idempotent.
pub fn sanitize_text(input: &str) -> String {
    if is_blank(input) {
        return input.to_string();
    }

    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");
    let without_tags = MARKUP_TAG.replace_all(&without_scripts, "");
    let without_controls = CONTROL_CHARS.replace_all(&without_tags, "");

    trim_edges(&without_controls).to_string()
}

/// Trims a URL and empties it when it uses the `javascript:` or `data:` scheme.
///
/// Nothing else about the URL is checked.
pub fn sanitize_url(input: &str) -> String {
    if is_blank(input) {
        return input.to_string();
    }

    let url = trim_edges(input);

    if BLOCKED_URL_SCHEMES
        .iter()
        .any(|scheme| url.starts_with_ignore_ascii_case(scheme))
    {
        return String::new();
    }

    url.to_string()
}

/// Heuristic: a single quote followed by an SQL keyword or comment marker.
///
/// Advisory only. Persistence must use bound parameters regardless.
pub fn contains_sql_like_pattern(input: &str) -> bool {
    SQL_LIKE.is_match(input)
}

/// Sanitization on request fields, including optional ones.
///
/// `None` passes through untouched, and is never flagged by the SQL detector.
pub trait SanitizeExt {
    type Output;

    fn sanitized_text(&self) -> Self::Output;

    fn sanitized_url(&self) -> Self::Output;

    fn has_sql_like_pattern(&self) -> bool;
}

impl SanitizeExt for str {
    type Output = String;

    fn sanitized_text(&self) -> String {
        sanitize_text(self)
    }

    fn sanitized_url(&self) -> String {
        sanitize_url(self)
    }

    fn has_sql_like_pattern(&self) -> bool {
        contains_sql_like_pattern(self)
    }
}

impl SanitizeExt for String {
    type Output = String;

    fn sanitized_text(&self) -> String {
        sanitize_text(self)
    }

    fn sanitized_url(&self) -> String {
        sanitize_url(self)
    }

    fn has_sql_like_pattern(&self) -> bool {
        contains_sql_like_pattern(self)
    }
}

impl SanitizeExt for Option<String> {
    type Output = Option<String>;

    fn sanitized_text(&self) -> Option<String> {
        self.as_deref().map(sanitize_text)
    }

    fn sanitized_url(&self) -> Option<String> {
        self.as_deref().map(sanitize_url)
    }

    fn has_sql_like_pattern(&self) -> bool {
        self.as_deref().is_some_and(contains_sql_like_pattern)
    }
}

impl<'a> SanitizeExt for Option<&'a str> {
    type Output = Option<String>;

    fn sanitized_text(&self) -> Option<String> {
        self.map(sanitize_text)
    }

    fn sanitized_url(&self) -> Option<String> {
        self.map(sanitize_url)
    }

    fn has_sql_like_pattern(&self) -> bool {
        self.is_some_and(contains_sql_like_pattern)
    }
}
