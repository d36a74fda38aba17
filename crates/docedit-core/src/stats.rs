//! Document statistics.
//!
//! Latin letters and CJK ideographs count as word characters. Every other character (digits,
//! punctuation, whitespace) counts towards the punctuation total. Tab tokens are not characters
//! and count towards neither.

use crate::document::Document;
use regex::Regex;
use std::sync::OnceLock;

/// Counts shown in a status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    /// Word characters.
    pub words: usize,
    /// Non-word characters.
    pub punctuation: usize,
    /// Non-empty lines, at least 1.
    pub lines: usize,
}

fn word_char_regex() -> &'static Regex {
    static WORD_CHAR: OnceLock<Regex> = OnceLock::new();
    WORD_CHAR.get_or_init(|| {
        Regex::new(r"[\x{4e00}-\x{9fa5}a-zA-Z]").expect("word-char pattern is valid")
    })
}

/// Statistics of a plain text (lines separated by `\n`).
pub fn text_stats(text: &str) -> DocumentStats {
    let words = word_char_regex().find_iter(text).count();
    let punctuation = text.chars().count() - words;
    let lines = text.split('\n').filter(|l| !l.trim().is_empty()).count();
    DocumentStats {
        words,
        punctuation,
        lines: lines.max(1),
    }
}

/// Statistics of a document's text blocks.
pub fn document_stats(doc: &Document) -> DocumentStats {
    text_stats(&doc.plain_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_text() {
        let stats = text_stats("Hi, 你好!\n\n  \n42");
        assert_eq!(stats.words, 4);
        // ", " + "!" + 3 newlines + 2 spaces + "42"
        assert_eq!(stats.punctuation, 10);
        assert_eq!(stats.lines, 2);
    }

    #[test]
    fn test_empty_text_has_one_line() {
        assert_eq!(
            text_stats(""),
            DocumentStats {
                words: 0,
                punctuation: 0,
                lines: 1
            }
        );
    }
}
