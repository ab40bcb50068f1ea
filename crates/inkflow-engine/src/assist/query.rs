//! Shared text matching for suggestion detection.

/// Maximal trailing run of letter/digit characters in `text` before the
/// char offset `caret`. Unicode letter classes apply, so CJK ideographs
/// count; a non-matching character directly before the caret yields an
/// empty query.
pub(crate) fn trailing_query(text: &str, caret: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let caret = caret.min(chars.len());
    let start = chars[..caret]
        .iter()
        .rposition(|c| !c.is_alphanumeric())
        .map(|i| i + 1)
        .unwrap_or(0);
    chars[start..caret].iter().collect()
}

/// Whether `name` starts with `query`: ASCII characters compare
/// case-insensitively, everything else exactly.
pub(crate) fn has_name_prefix(name: &str, query: &str) -> bool {
    let mut name_chars = name.chars();
    query.chars().all(|q| {
        name_chars
            .next()
            .is_some_and(|n| chars_match(n, q))
    })
}

fn chars_match(a: char, b: char) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}
