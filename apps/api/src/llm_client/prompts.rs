// Shared prompt helpers. Task prompts live in provider/prompts.rs.

/// Caps untrusted document text embedded in a prompt.
pub const MAX_PROMPT_DOCUMENT_CHARS: usize = 12_000;

/// Truncates on a char boundary to at most `max` chars.
pub fn clip(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_respects_char_boundaries() {
        assert_eq!(clip("héllo", 2), "hé");
        assert_eq!(clip("abc", 10), "abc");
        assert_eq!(clip("", 3), "");
    }
}
