//! Bounded content previews for storage and display

/// Default maximum preview length, in characters
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Marker appended to a truncated preview
pub const ELLIPSIS: &str = "...";

/// Derive a bounded preview from extracted text.
///
/// Returns the text unchanged when it fits within `max_chars`,
/// otherwise the first `max_chars` characters followed by [`ELLIPSIS`].
/// Counts characters rather than bytes so truncation never splits a
/// multi-byte sequence. Total function: no failure mode.
pub fn content_preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        None => text.to_string(),
        Some((byte_offset, _)) => format!("{}{}", &text[..byte_offset], ELLIPSIS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(content_preview("hello", 500), "hello");
    }

    #[test]
    fn text_at_the_bound_is_unchanged() {
        let text = "x".repeat(500);
        assert_eq!(content_preview(&text, 500), text);
    }

    #[test]
    fn long_text_is_truncated_with_marker() {
        let text = "x".repeat(501);
        let preview = content_preview(&text, 500);
        assert_eq!(preview.len(), 503);
        assert_eq!(preview, format!("{}{}", "x".repeat(500), ELLIPSIS));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        let preview = content_preview(&text, 4);
        assert_eq!(preview, format!("{}{}", "é".repeat(4), ELLIPSIS));
    }

    #[test]
    fn empty_text_stays_empty() {
        assert_eq!(content_preview("", 500), "");
    }
}
