//! String utilities for form input and log output

/// Maximum preview length for response bodies in logs
pub const MAX_PREVIEW_LEN: usize = 100;

/// Creates a safe UTF-8 preview of a string, respecting character boundaries.
///
/// Used when logging server bodies, which may carry patient names in any script.
pub fn safe_preview(text: &str, max_chars: usize) -> String {
    let preview: String = text.chars().take(max_chars).collect();
    if text.chars().nth(max_chars).is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Trimmed copy of `input`, or `None` if nothing is left.
pub fn non_empty_trimmed(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
