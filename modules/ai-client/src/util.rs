/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Locate a JSON array inside free-form response text.
///
/// Models often wrap the payload in prose ("Here are the items: [...]").
/// Returns the slice from the first `[` to the last `]`, or `None` if no
/// array-shaped span exists.
pub fn extract_json_array(response: &str) -> Option<&str> {
    let cleaned = strip_code_blocks(response);
    let start = cleaned.find('[')?;
    let end = cleaned.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&cleaned[start..=end])
}
