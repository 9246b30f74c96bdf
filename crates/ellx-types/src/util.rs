use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on component tag length.
pub const MAX_TAG_LEN: usize = 64;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("valid tag regex"));

/// Check whether a string is usable as a component tag.
pub fn is_valid_tag(s: &str) -> bool {
    !s.is_empty() && s.len() <= MAX_TAG_LEN && TAG_PATTERN.is_match(s)
}

/// Truncate a string for log and error messages, respecting char boundaries.
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &s[..end])
}
