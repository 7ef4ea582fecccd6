//! Text escaping for iCalendar TEXT values (RFC 5545 §3.3.11).

/// Escapes text for use as an iCalendar TEXT value.
///
/// Backslash is escaped first so the escapes introduced for `;`, `,` and
/// newlines are never escaped a second time. Carriage returns are dropped.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ';' => result.push_str("\\;"),
            ',' => result.push_str("\\,"),
            '\n' => result.push_str("\\n"),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Reverses [`escape_text`].
///
/// Unknown escapes keep the escaped character; a lone trailing backslash is
/// kept as-is.
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

/// Strips line breaks from a value that is emitted without escaping.
///
/// A raw CR or LF inside a content line would start a new property, so
/// verbatim values (URL, STATUS, CATEGORIES) pass through this instead.
#[must_use]
pub fn strip_line_breaks(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}
