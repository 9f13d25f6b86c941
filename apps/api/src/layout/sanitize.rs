//! Text cleanup applied to every string before it becomes a paragraph.

/// Values the upstream parser emits for "no value".
const NULL_LIKE: &[&str] = &["null", "n/a", "-", "undefined"];

/// Collapses dashes to `-` and whitespace runs to a single space, then trims.
pub fn sanitize(text: &str) -> String {
    let dashed: String = text
        .chars()
        .map(|c| match c {
            '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => '-',
            other => other,
        })
        .collect();
    dashed.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_null_like(text: &str) -> bool {
    NULL_LIKE.iter().any(|n| text.eq_ignore_ascii_case(n))
}

/// Sanitizes `text`, returning `None` when nothing printable is left.
pub fn clean(text: &str) -> Option<String> {
    let cleaned = sanitize(text);
    if cleaned.is_empty() || is_null_like(&cleaned) {
        None
    } else {
        Some(cleaned)
    }
}

/// [`clean`] for optional fields.
pub fn clean_opt(text: Option<&str>) -> Option<String> {
    text.and_then(clean)
}
