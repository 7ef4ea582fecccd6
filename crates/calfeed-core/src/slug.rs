//! URL- and filename-friendly slugs.

use std::sync::LazyLock;

use regex::Regex;

/// Default maximum slug length, in characters.
pub const DEFAULT_SLUG_LENGTH: usize = 50;

/// Characters that are neither word characters, whitespace nor dashes.
static STRIP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("Invalid slug strip regex"));

/// Runs of whitespace and dashes.
static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("Invalid slug separator regex"));

/// Converts text to a lowercase, dash-separated slug.
///
/// The result is at most `max_length` characters and never starts or ends
/// with a dash. Empty input gives an empty slug.
///
/// # Example
///
/// ```
/// use calfeed_core::slug::make_slug;
///
/// assert_eq!(make_slug("Hello, World!", 50), "hello-world");
/// ```
#[must_use]
pub fn make_slug(text: &str, max_length: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let stripped = STRIP_REGEX.replace_all(&lowered, "");
    let dashed = SEPARATOR_REGEX.replace_all(&stripped, "-");
    let slug = dashed.trim_matches('-');

    if slug.chars().count() > max_length {
        let truncated: String = slug.chars().take(max_length).collect();
        truncated.trim_end_matches('-').to_string()
    } else {
        slug.to_string()
    }
}
