//! Bounded text fields.
//!
//! Several fields are rendered into fixed-width slots by the UI, so their
//! truncation points are part of the display contract. Widths are in bytes
//! and truncation never splits a UTF-8 character.

/// Maximum byte length of an error message.
pub const MESSAGE_WIDTH: usize = 127;

/// Maximum byte length of an aggregation key.
pub const KEY_WIDTH: usize = 63;

/// Maximum byte length of a catalog label.
pub const LABEL_WIDTH: usize = 63;

/// Maximum byte length of a catalog tag.
pub const TAG_WIDTH: usize = 63;

/// Maximum byte length of a stored catalog timestamp.
pub const TIMESTAMP_WIDTH: usize = 31;

/// Number of characters of a timestamp shown in a catalog label.
pub const DISPLAY_TIMESTAMP_WIDTH: usize = 16;

/// Truncate `s` to at most `max_bytes` bytes on a character boundary.
pub fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Truncate `s` to at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate_bytes("rat", KEY_WIDTH), "rat");
        assert_eq!(truncate_chars("rat", 16), "rat");
    }

    #[test]
    fn truncate_bytes_respects_char_boundaries() {
        // "é" is two bytes; cutting at 2 would split it
        assert_eq!(truncate_bytes("aé", 2), "a");
        assert_eq!(truncate_bytes("aé", 3), "aé");
        assert_eq!(truncate_bytes(&"x".repeat(200), MESSAGE_WIDTH).len(), 127);
    }

    #[test]
    fn truncate_chars_counts_characters() {
        assert_eq!(
            truncate_chars("2024-05-01 12:34:56", DISPLAY_TIMESTAMP_WIDTH),
            "2024-05-01 12:34"
        );
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
