//! Content line folding for iCalendar (RFC 5545 §3.1).

/// Maximum physical line length in octets, not counting the CRLF.
pub const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line to comply with the 75-octet limit.
///
/// The line is cut at the 75th octet and the remainder is prefixed with a
/// single space, repeating until every piece fits; pieces are joined with
/// CRLF and no trailing CRLF is added. A cut never lands inside a UTF-8
/// sequence and never separates a backslash from the character it escapes.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS) * 3);
    let mut rest = line.to_string();

    while rest.len() > MAX_LINE_OCTETS {
        let cut = safe_cut(&rest, MAX_LINE_OCTETS);
        result.push_str(&rest[..cut]);
        result.push_str("\r\n");
        rest = format!(" {}", &rest[cut..]);
    }

    result.push_str(&rest);
    result
}

/// Joins folded lines back together by removing every CRLF + space.
#[must_use]
pub fn unfold_lines(folded: &str) -> String {
    folded.replace("\r\n ", "")
}

/// Finds the cut point for `s`, at most `limit` octets in.
///
/// Moves left past UTF-8 continuation bytes and past a dangling escape
/// introducer, re-checking both conditions after every move. A cut must
/// keep at least two octets so a continuation line (leading space) always
/// makes progress; if nothing safe remains the plain char boundary is used.
fn safe_cut(s: &str, limit: usize) -> usize {
    let bytes = s.as_bytes();
    let mut cut = limit;

    loop {
        while cut > 0 && !s.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut > 0 && splits_escape(bytes, cut) {
            cut -= 1;
            continue;
        }
        break;
    }

    if cut >= 2 {
        return cut;
    }

    let mut fallback = limit;
    while !s.is_char_boundary(fallback) {
        fallback -= 1;
    }
    fallback
}

/// Returns `true` if cutting before `cut` would strand an escape introducer.
///
/// The run of backslashes ending at `cut - 1` pairs up from its start; an
/// odd run means the last backslash escapes the octet at `cut`.
fn splits_escape(bytes: &[u8], cut: usize) -> bool {
    let run = bytes[..cut]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    run % 2 == 1
}
