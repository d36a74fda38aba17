//! Inline content: text runs, marks and atomic tab tokens.
//!
//! Inline content is stored as a list of [`Inline`] runs. Offsets into that list count one unit
//! per character and one unit per tab token. The helpers in this module keep content in its
//! canonical form (no empty runs, no two adjacent text runs with identical marks), which makes the
//! structural serialization of equal content identical.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Formatting mark attached to a text run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    /// Bold text.
    Bold,
    /// Italic text.
    Italic,
    /// Underlined text.
    Underline,
    /// Struck-through text.
    Strike,
    /// Inline code.
    Code,
    /// Text color.
    TextStyle {
        /// CSS color value.
        color: String,
    },
    /// Background highlight.
    Highlight {
        /// CSS color value.
        color: String,
    },
    /// Gradient-filled text.
    GradientText {
        /// CSS gradient value.
        gradient: String,
    },
    /// Hyperlink.
    Link {
        /// Link target.
        href: String,
    },
}

/// Mark kind without its attributes. A mark set holds at most one mark per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkKind {
    /// [`Mark::Bold`]
    Bold,
    /// [`Mark::Italic`]
    Italic,
    /// [`Mark::Underline`]
    Underline,
    /// [`Mark::Strike`]
    Strike,
    /// [`Mark::Code`]
    Code,
    /// [`Mark::TextStyle`]
    TextStyle,
    /// [`Mark::Highlight`]
    Highlight,
    /// [`Mark::GradientText`]
    GradientText,
    /// [`Mark::Link`]
    Link,
}

impl Mark {
    /// Kind of this mark.
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Underline => MarkKind::Underline,
            Mark::Strike => MarkKind::Strike,
            Mark::Code => MarkKind::Code,
            Mark::TextStyle { .. } => MarkKind::TextStyle,
            Mark::Highlight { .. } => MarkKind::Highlight,
            Mark::GradientText { .. } => MarkKind::GradientText,
            Mark::Link { .. } => MarkKind::Link,
        }
    }
}

/// Attributes of an atomic tab token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TabAttrs {
    /// Display width in character-equivalents.
    pub width: u8,
}

impl Default for TabAttrs {
    fn default() -> Self {
        Self {
            width: docedit_config::DEFAULT_TAB_WIDTH,
        }
    }
}

/// One inline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    /// A run of text sharing one mark set.
    Text {
        /// The text.
        text: String,
        /// Sorted mark set.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
    /// An atomic tab token.
    Tab {
        /// Token attributes.
        #[serde(default)]
        attrs: TabAttrs,
    },
}

impl Inline {
    /// Plain text run.
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Text run with marks.
    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        let mut marks = marks;
        canonicalize_marks(&mut marks);
        Inline::Text {
            text: text.into(),
            marks,
        }
    }

    /// Tab token of the given display width (at least 1).
    pub fn tab(width: u8) -> Self {
        Inline::Tab {
            attrs: TabAttrs {
                width: width.max(1),
            },
        }
    }

    /// Number of units this run occupies.
    pub fn len(&self) -> usize {
        match self {
            Inline::Text { text, .. } => text.chars().count(),
            Inline::Tab { .. } => 1,
        }
    }

    /// Returns `true` for an empty text run.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for a tab token.
    pub fn is_tab(&self) -> bool {
        matches!(self, Inline::Tab { .. })
    }
}

/// A single addressable unit of inline content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit<'a> {
    /// One character together with the marks of its run.
    Char {
        /// The character.
        ch: char,
        /// Marks of the enclosing run.
        marks: &'a [Mark],
    },
    /// An atomic tab token.
    Tab {
        /// Token display width.
        width: u8,
    },
}

impl Unit<'_> {
    /// Returns `true` for a tab token.
    pub fn is_tab(&self) -> bool {
        matches!(self, Unit::Tab { .. })
    }

    /// Returns `true` for a whitespace character.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Unit::Char { ch, .. } if ch.is_whitespace())
    }
}

/// Sort by kind and keep the last mark of each kind.
pub fn canonicalize_marks(marks: &mut Vec<Mark>) {
    let mut out: Vec<Mark> = Vec::with_capacity(marks.len());
    for mark in marks.drain(..) {
        if let Some(existing) = out.iter_mut().find(|m| m.kind() == mark.kind()) {
            *existing = mark;
        } else {
            out.push(mark);
        }
    }
    out.sort_by_key(Mark::kind);
    *marks = out;
}

/// Total number of units.
pub fn content_len(content: &[Inline]) -> usize {
    content.iter().map(Inline::len).sum()
}

/// Unit at `index` (0-based), if any.
pub fn unit_at(content: &[Inline], index: usize) -> Option<Unit<'_>> {
    let mut start = 0usize;
    for run in content {
        let len = run.len();
        if index < start + len {
            return Some(match run {
                Inline::Text { text, marks } => Unit::Char {
                    ch: text.chars().nth(index - start)?,
                    marks: marks.as_slice(),
                },
                Inline::Tab { attrs } => Unit::Tab { width: attrs.width },
            });
        }
        start += len;
    }
    None
}

/// Iterate over every unit in order.
pub fn units(content: &[Inline]) -> impl Iterator<Item = Unit<'_>> {
    content.iter().flat_map(|run| match run {
        Inline::Text { text, marks } => RunUnits::Text(text.chars(), marks.as_slice()),
        Inline::Tab { attrs } => RunUnits::Tab(Some(attrs.width)),
    })
}

enum RunUnits<'a> {
    Text(std::str::Chars<'a>, &'a [Mark]),
    Tab(Option<u8>),
}

impl<'a> Iterator for RunUnits<'a> {
    type Item = Unit<'a>;

    fn next(&mut self) -> Option<Unit<'a>> {
        match self {
            RunUnits::Text(chars, marks) => {
                let marks = *marks;
                chars.next().map(|ch| Unit::Char { ch, marks })
            }
            RunUnits::Tab(width) => width.take().map(|width| Unit::Tab { width }),
        }
    }
}

/// Make sure a run boundary exists at `offset` and return the index of the first run starting
/// at or after it. `offset` must not exceed [`content_len`].
pub fn split_at(content: &mut Vec<Inline>, offset: usize) -> usize {
    let mut start = 0usize;
    for index in 0..content.len() {
        if start == offset {
            return index;
        }
        let len = content[index].len();
        if offset < start + len {
            let Inline::Text { text, marks } = &mut content[index] else {
                // Tokens are one unit long, so a boundary always exists around them.
                return index + 1;
            };
            let byte = char_to_byte(text, offset - start);
            let tail = text.split_off(byte);
            let marks = marks.clone();
            content.insert(
                index + 1,
                Inline::Text {
                    text: tail,
                    marks,
                },
            );
            return index + 1;
        }
        start += len;
    }
    content.len()
}

/// Insert `items` at `offset`.
pub fn insert(content: &mut Vec<Inline>, offset: usize, items: Vec<Inline>) {
    let index = split_at(content, offset);
    content.splice(index..index, items);
    normalize(content);
}

/// Remove the units in `from..to` and return them.
pub fn remove(content: &mut Vec<Inline>, from: usize, to: usize) -> Vec<Inline> {
    if from >= to {
        return Vec::new();
    }
    let start = split_at(content, from);
    let end = split_at(content, to);
    let removed: Vec<Inline> = content.drain(start..end).collect();
    normalize(content);
    removed
}

/// Copy of the units in `from..to`.
pub fn slice(content: &[Inline], from: usize, to: usize) -> Vec<Inline> {
    let mut copy = content.to_vec();
    let mut out = remove(&mut copy, from, to);
    normalize(&mut out);
    out
}

/// Apply `f` to the mark set of every text run inside `from..to`.
pub fn map_marks(
    content: &mut Vec<Inline>,
    from: usize,
    to: usize,
    mut f: impl FnMut(&mut Vec<Mark>),
) {
    if from >= to {
        return;
    }
    let start = split_at(content, from);
    let end = split_at(content, to);
    for run in &mut content[start..end] {
        if let Inline::Text { marks, .. } = run {
            f(marks);
            canonicalize_marks(marks);
        }
    }
    normalize(content);
}

/// Returns `true` if every character in `from..to` carries a mark of `kind`. Tokens are ignored;
/// a range without characters is never covered.
pub fn marks_cover(content: &[Inline], from: usize, to: usize, kind: MarkKind) -> bool {
    let mut saw_char = false;
    for unit in units(content).skip(from).take(to.saturating_sub(from)) {
        if let Unit::Char { marks, .. } = unit {
            saw_char = true;
            if !marks.iter().any(|m| m.kind() == kind) {
                return false;
            }
        }
    }
    saw_char
}

/// Canonicalize every mark set, merge adjacent text runs with equal marks and drop empty runs.
pub fn normalize(content: &mut Vec<Inline>) {
    let mut out: Vec<Inline> = Vec::with_capacity(content.len());
    for mut run in content.drain(..) {
        if run.is_empty() {
            continue;
        }
        if let Inline::Text { marks, .. } = &mut run {
            canonicalize_marks(marks);
        }
        if let (
            Some(Inline::Text {
                text: prev,
                marks: prev_marks,
            }),
            Inline::Text { text, marks },
        ) = (out.last_mut(), &run)
            && *prev_marks == *marks
        {
            prev.push_str(text);
            continue;
        }
        out.push(run);
    }
    *content = out;
}

/// Text of the block with tokens left out.
pub fn plain_text(content: &[Inline]) -> String {
    text_between(content, 0, usize::MAX)
}

/// Text between two offsets, tokens left out.
pub fn text_between(content: &[Inline], from: usize, to: usize) -> String {
    units(content)
        .skip(from)
        .take(to.saturating_sub(from))
        .filter_map(|unit| match unit {
            Unit::Char { ch, .. } => Some(ch),
            Unit::Tab { .. } => None,
        })
        .collect()
}

/// One character per unit; tokens become `'\t'`, which always forms its own grapheme cluster.
fn flatten(content: &[Inline]) -> String {
    units(content)
        .map(|unit| match unit {
            Unit::Char { ch, .. } => ch,
            Unit::Tab { .. } => '\t',
        })
        .collect()
}

/// Unit offsets of every grapheme boundary, including 0 and the content length.
fn grapheme_boundaries(content: &[Inline]) -> Vec<usize> {
    let flat = flatten(content);
    let mut bounds = vec![0usize];
    let mut offset = 0usize;
    for grapheme in flat.graphemes(true) {
        offset += grapheme.chars().count();
        bounds.push(offset);
    }
    bounds
}

/// Offset of the grapheme boundary before `offset` (0 at the start).
pub fn prev_grapheme(content: &[Inline], offset: usize) -> usize {
    grapheme_boundaries(content)
        .into_iter()
        .rev()
        .find(|&b| b < offset)
        .unwrap_or(0)
}

/// Offset of the grapheme boundary after `offset` (the length at the end).
pub fn next_grapheme(content: &[Inline], offset: usize) -> usize {
    let len = content_len(content);
    grapheme_boundaries(content)
        .into_iter()
        .find(|&b| b > offset)
        .unwrap_or(len)
}

/// Range of the word (per UAX #29) touching `offset`, or an empty range at `offset` when the
/// offset sits between non-word segments.
pub fn word_range_at(content: &[Inline], offset: usize) -> (usize, usize) {
    let flat = flatten(content);
    let mut start = 0usize;
    for segment in flat.split_word_bounds() {
        let len = segment.chars().count();
        let end = start + len;
        let is_word = segment.chars().any(char::is_alphanumeric);
        if is_word && start <= offset && offset <= end {
            return (start, end);
        }
        start = end;
    }
    (offset, offset)
}

fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Inline> {
        vec![
            Inline::text("ab"),
            Inline::tab(8),
            Inline::marked("cd", vec![Mark::Bold]),
        ]
    }

    #[test]
    fn test_len_and_units() {
        let content = sample();
        assert_eq!(content_len(&content), 5);
        assert!(unit_at(&content, 2).is_some_and(|u| u.is_tab()));
        assert!(matches!(unit_at(&content, 3), Some(Unit::Char { ch: 'c', .. })));
        assert_eq!(unit_at(&content, 5), None);
    }

    #[test]
    fn test_remove_then_insert_restores_canonical_form() {
        let mut content = vec![Inline::text("HelloWorld")];
        insert(&mut content, 5, vec![Inline::tab(8)]);
        assert_eq!(content.len(), 3);
        let removed = remove(&mut content, 5, 6);
        assert_eq!(removed, vec![Inline::tab(8)]);
        assert_eq!(content, vec![Inline::text("HelloWorld")]);
    }

    #[test]
    fn test_map_marks_splits_runs() {
        let mut content = vec![Inline::text("Hello")];
        map_marks(&mut content, 1, 3, |marks| marks.push(Mark::Italic));
        assert_eq!(
            content,
            vec![
                Inline::text("H"),
                Inline::marked("el", vec![Mark::Italic]),
                Inline::text("lo"),
            ]
        );
        assert!(marks_cover(&content, 1, 3, MarkKind::Italic));
        assert!(!marks_cover(&content, 0, 3, MarkKind::Italic));
    }

    #[test]
    fn test_canonical_marks_keep_one_per_kind() {
        let mut marks = vec![
            Mark::TextStyle {
                color: "red".into(),
            },
            Mark::Bold,
            Mark::TextStyle {
                color: "blue".into(),
            },
        ];
        canonicalize_marks(&mut marks);
        assert_eq!(
            marks,
            vec![
                Mark::Bold,
                Mark::TextStyle {
                    color: "blue".into()
                }
            ]
        );
    }

    #[test]
    fn test_grapheme_steps_treat_token_as_one_cluster() {
        let content = vec![Inline::text("e\u{301}"), Inline::tab(8), Inline::text("x")];
        assert_eq!(next_grapheme(&content, 0), 2);
        assert_eq!(next_grapheme(&content, 2), 3);
        assert_eq!(prev_grapheme(&content, 3), 2);
        assert_eq!(prev_grapheme(&content, 2), 0);
    }

    #[test]
    fn test_word_range() {
        let content = vec![Inline::text("hello brave world")];
        assert_eq!(word_range_at(&content, 8), (6, 11));
        assert_eq!(word_range_at(&content, 0), (0, 5));
    }

    #[test]
    fn test_normalize_canonicalizes_raw_mark_sets() {
        let mut content = vec![
            Inline::Text {
                text: "a".into(),
                marks: vec![Mark::Italic, Mark::Bold, Mark::Italic],
            },
            Inline::marked("b", vec![Mark::Bold, Mark::Italic]),
        ];
        normalize(&mut content);
        assert_eq!(
            content,
            vec![Inline::marked("ab", vec![Mark::Bold, Mark::Italic])]
        );
    }
}
