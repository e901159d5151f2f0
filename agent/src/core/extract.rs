//! Best-effort recovery of a JSON array from raw model text.

/// Slice `text` to the substring spanning the first `[` through the last `]`.
///
/// Model replies often wrap the array in prose ("Here is the plan: ...").
/// Returns `None` when no bracketed span exists.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Drop control characters that commonly leak into model output.
///
/// Keeps newline, carriage return, and tab; removes everything else below
/// U+0020.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| c >= ' ' || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
