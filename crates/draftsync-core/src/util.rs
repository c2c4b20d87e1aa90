//! Shared utility functions used across multiple modules.

/// Current Unix timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Count whitespace-separated words in a block of text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}
