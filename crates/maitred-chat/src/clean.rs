//! Whitespace and punctuation normalization for chat text.
//!
//! [`clean_text`] is the full treatment for outbound prompt text;
//! [`normalize_whitespace`] is the lighter form for inbound user
//! messages, where punctuation respacing would damage tokens the field
//! extractors capture.

use regex::Regex;
use std::sync::LazyLock;

static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.!?])").unwrap());
static MULTI_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static ANY_WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize whitespace and punctuation spacing.
///
/// Collapses runs of spaces, removes whitespace immediately before
/// sentence punctuation, guarantees exactly one space after sentence
/// punctuation when followed by a non-space character, and trims the ends.
/// Idempotent: cleaning already-clean text is a no-op.
pub fn clean_text(text: &str) -> String {
    let collapsed = MULTI_SPACE.replace_all(text, " ");
    let no_space_before = SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1");
    let spaced_after = space_after_punctuation(&no_space_before);
    let recollapsed = MULTI_WHITESPACE.replace_all(&spaced_after, " ");
    recollapsed.trim().to_string()
}

/// Whitespace-only normalization: collapse runs of whitespace to one
/// space and trim. Used on inbound user text, where punctuation
/// respacing would corrupt tokens the field extractors need intact
/// (email domains, decimals).
pub fn normalize_whitespace(text: &str) -> String {
    ANY_WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Insert a single space after `, . ! ?` when the next character is not
/// whitespace. Done with a char walk because adjacent punctuation marks
/// overlap and a capture-group replacement would skip every other one.
fn space_after_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if matches!(c, ',' | '.' | '!' | '?') {
            if let Some(&next) = chars.peek() {
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Basic normalization ----

    #[test]
    fn test_collapses_multiple_spaces() {
        assert_eq!(clean_text("hello    world"), "hello world");
    }

    #[test]
    fn test_removes_space_before_punctuation() {
        assert_eq!(clean_text("hello , world"), "hello, world");
        assert_eq!(clean_text("done !"), "done!");
        assert_eq!(clean_text("really ?"), "really?");
    }

    #[test]
    fn test_adds_space_after_punctuation() {
        assert_eq!(clean_text("hello,world"), "hello, world");
        assert_eq!(clean_text("First.Second"), "First. Second");
    }

    #[test]
    fn test_trims_ends() {
        assert_eq!(clean_text("  hello  "), "hello");
    }

    #[test]
    fn test_combined_mess() {
        assert_eq!(
            clean_text("  Hello ,  world !How are you ?  "),
            "Hello, world! How are you?"
        );
    }

    // ---- Idempotence ----

    #[test]
    fn test_idempotent_on_clean_text() {
        let inputs = [
            "Hello, world! How are you?",
            "Wonderful! What date would you like?",
            "one two three",
            "",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_idempotent_on_adjacent_punctuation() {
        let once = clean_text("wait!?what");
        assert_eq!(clean_text(&once), once);
    }

    // ---- Edge cases ----

    #[test]
    fn test_empty_string() {
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(clean_text("   \t "), "");
    }

    #[test]
    fn test_single_newline_preserved() {
        assert_eq!(clean_text("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_double_newline_collapsed() {
        assert_eq!(clean_text("line one\n\nline two"), "line one line two");
    }

    #[test]
    fn test_unicode_passthrough() {
        assert_eq!(clean_text("réunion à  18h"), "réunion à 18h");
    }

    #[test]
    fn test_time_colon_untouched() {
        assert_eq!(clean_text("6:30 pm"), "6:30 pm");
    }

    // ---- normalize_whitespace ----

    #[test]
    fn test_normalize_whitespace_collapses_and_trims() {
        assert_eq!(normalize_whitespace("  hello   world \n"), "hello world");
    }

    #[test]
    fn test_normalize_whitespace_preserves_emails() {
        assert_eq!(
            normalize_whitespace("it's guest@example.com thanks"),
            "it's guest@example.com thanks"
        );
    }

    #[test]
    fn test_normalize_whitespace_idempotent() {
        let once = normalize_whitespace("a   b\t c");
        assert_eq!(normalize_whitespace(&once), once);
    }
}
