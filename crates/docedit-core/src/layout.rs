//! Display-width measurement of inline content.
//!
//! Widths are counted in cells. Characters follow UAX #11; an atomic tab token occupies exactly
//! its `width` attribute, independent of where it sits on the line (it is not a tab stop).

use crate::inline::{self, Inline, Unit};
use unicode_width::UnicodeWidthChar;

/// Calculate visual width of a character (based on UAX #11)
///
/// Return value:
/// - 1: Narrow character (ASCII, etc.)
/// - 2: Wide character (CJK, fullwidth, etc.)
/// - 0: Zero-width character (combining characters, etc.)
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Width of one content unit.
pub fn unit_width(unit: &Unit<'_>) -> usize {
    match unit {
        Unit::Char { ch, .. } => char_width(*ch),
        Unit::Tab { width } => usize::from(*width).max(1),
    }
}

/// Total width of a block's content.
pub fn content_width(content: &[Inline]) -> usize {
    inline::units(content).map(|u| unit_width(&u)).sum()
}

/// Cell column at which the unit at `offset` starts.
pub fn column_of(content: &[Inline], offset: usize) -> usize {
    inline::units(content)
        .take(offset)
        .map(|u| unit_width(&u))
        .sum()
}

/// Result of mapping a cell column back to content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Nearest caret offset.
    pub offset: usize,
    /// Offset of the tab token under the column, if the column lands on one.
    pub token: Option<usize>,
}

/// Map a cell column to the nearest caret offset.
///
/// A column inside a unit snaps to whichever edge of the unit is closer; a token is never entered.
/// Columns past the end map to the end of the content.
pub fn hit_test(content: &[Inline], column: usize) -> Hit {
    let mut x = 0usize;
    for (offset, unit) in inline::units(content).enumerate() {
        let width = unit_width(&unit);
        if column < x + width {
            let snapped = if (column - x) * 2 < width {
                offset
            } else {
                offset + 1
            };
            return Hit {
                offset: snapped,
                token: unit.is_tab().then_some(offset),
            };
        }
        x += width;
    }
    Hit {
        offset: inline::content_len(content),
        token: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('你'), 2);
        assert_eq!(char_width('\u{301}'), 0);
    }

    #[test]
    fn test_token_has_fixed_width() {
        let content = vec![Inline::text("ab"), Inline::tab(8), Inline::text("你")];
        assert_eq!(content_width(&content), 12);
        assert_eq!(column_of(&content, 2), 2);
        assert_eq!(column_of(&content, 3), 10);
    }

    #[test]
    fn test_hit_test_snaps_around_tokens() {
        let content = vec![Inline::text("ab"), Inline::tab(8), Inline::text("c")];
        assert_eq!(hit_test(&content, 3), Hit { offset: 2, token: Some(2) });
        assert_eq!(hit_test(&content, 7), Hit { offset: 3, token: Some(2) });
        assert_eq!(hit_test(&content, 10), Hit { offset: 3, token: None });
        assert_eq!(hit_test(&content, 40), Hit { offset: 4, token: None });
        assert_eq!(hit_test(&content, 0), Hit { offset: 0, token: None });
    }
}
