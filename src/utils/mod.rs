// Utility functions

use uuid::Uuid;

// =============================================================================
// String Helpers
// =============================================================================

/// Truncate to at most `max_chars` characters, appending "..." when cut.
///
/// Counts characters rather than bytes so multi-byte text never splits mid-codepoint.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Leading characters of a string, without an ellipsis
pub fn first_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Replace every occurrence of a secret in a string that is about to be logged
pub fn redact_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "KEY_HIDDEN")
}

// =============================================================================
// ID Generation
// =============================================================================

/// Generate a unique ID (UUID v4)
#[inline]
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
