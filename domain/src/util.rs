//! Shared utility functions.

/// Shorten a string to at most `max_chars` characters for log lines,
/// appending an ellipsis when anything was cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().nth(max_chars).is_some() {
        out.push('…');
    }
    out
}
