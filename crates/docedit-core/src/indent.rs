//! Indent State Machine
//!
//! Every indentable block carries an [`IndentState`]: an integer level in `0..=9` plus a
//! `text_indent_only` flag. The two together encode two independent display components:
//!
//! | state                  | first-line indent | block indent        |
//! |------------------------|-------------------|---------------------|
//! | `(0, _)`               | none              | none                |
//! | `(1, _)`               | 1 unit            | none                |
//! | `(L >= 2, false)`      | 1 unit            | `L - 1` units       |
//! | `(L >= 2, true)`       | none              | `L - 1` units       |
//!
//! # Transitions
//!
//! ```text
//! increase: (0,f) -> (1,f) -> (2,f) -> (3,f) ... -> (9,f) -> (9,f)
//!           (L,t) -> (L,f)                       (restore first line before growing)
//! decrease: (L,f) -> (L,t)                       (L >= 2, drop first line only)
//!           (L,t) -> (L-1,t), but (2,t) -> (0,f)  (never re-enter level 1)
//!           (1,f) -> (0,f) -> (0,f)
//! ```
//!
//! The commands at the bottom of this module apply a transition to the block containing the
//! cursor through a [`DocumentModel`] transaction.

use crate::model::DocumentModel;
use crate::resolve::CursorContext;
use crate::transaction::{Step, Transaction};
use docedit_config::{IndentConfig, MAX_INDENT_LEVEL};
use serde::{Deserialize, Serialize};

/// Width of one indent unit in em, as used by [`IndentMetrics`].
pub const INDENT_UNIT_EM: f32 = 2.0;

/// Indent attributes of a block.
///
/// Fields are private so that the level stays within `0..=9` and the flag is never set below
/// level 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "IndentAttrs", into = "IndentAttrs")]
pub struct IndentState {
    level: u8,
    text_indent_only: bool,
}

/// Serialized form of [`IndentState`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct IndentAttrs {
    indent: u8,
    text_indent_only: bool,
}

impl From<IndentAttrs> for IndentState {
    fn from(attrs: IndentAttrs) -> Self {
        IndentState::new(attrs.indent, attrs.text_indent_only)
    }
}

impl From<IndentState> for IndentAttrs {
    fn from(state: IndentState) -> Self {
        IndentAttrs {
            indent: state.level,
            text_indent_only: state.text_indent_only,
        }
    }
}

impl IndentState {
    /// No indentation.
    pub const NONE: IndentState = IndentState {
        level: 0,
        text_indent_only: false,
    };

    /// Create a state, clamping the level and dropping the flag below level 2.
    pub fn new(level: u8, text_indent_only: bool) -> Self {
        let level = level.min(MAX_INDENT_LEVEL);
        Self {
            level,
            text_indent_only: text_indent_only && level >= 2,
        }
    }

    /// Indent level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// `true` when the first-line component has been removed (block indent only).
    pub fn text_indent_only(&self) -> bool {
        self.text_indent_only
    }

    /// State after one "increase" step, bounded by `max_level`.
    pub fn increased(self, max_level: u8) -> Self {
        let max_level = max_level.min(MAX_INDENT_LEVEL);
        if self.text_indent_only {
            // Restore the missing first-line component at the same level.
            return Self::new(self.level, false);
        }
        Self::new(self.level.saturating_add(1).min(max_level.max(self.level)), false)
    }

    /// State after one "decrease" step, bounded by `min_level`.
    pub fn decreased(self, min_level: u8) -> Self {
        let next = match (self.level, self.text_indent_only) {
            (0, _) => Self::NONE,
            (1, _) => Self::NONE,
            (level, false) => Self::new(level, true),
            // Level 1 is first-line only; collapsing a block-only state into it would count
            // the same unit twice.
            (2, true) => Self::NONE,
            (level, true) => Self::new(level - 1, true),
        };
        if next.level < min_level {
            Self::new(min_level, false)
        } else {
            next
        }
    }

    /// Display components of this state.
    pub fn metrics(&self) -> IndentMetrics {
        match (self.level, self.text_indent_only) {
            (0, _) => IndentMetrics::default(),
            (1, _) => IndentMetrics {
                first_line_em: INDENT_UNIT_EM,
                block_em: 0.0,
            },
            (level, only) => IndentMetrics {
                first_line_em: if only { 0.0 } else { INDENT_UNIT_EM },
                block_em: f32::from(level - 1) * INDENT_UNIT_EM,
            },
        }
    }

    /// Recover a state from its display components (the inverse of [`IndentState::metrics`]).
    ///
    /// A first-line component below one unit is ignored. Results are clamped to `0..=9`.
    pub fn from_metrics(first_line_em: f32, block_em: f32) -> Self {
        let has_first_line = first_line_em.is_finite() && first_line_em >= INDENT_UNIT_EM;
        let block_units = if block_em.is_finite() && block_em > 0.0 {
            (block_em / INDENT_UNIT_EM).round().clamp(0.0, f32::from(MAX_INDENT_LEVEL)) as u8
        } else {
            0
        };

        match (has_first_line, block_units) {
            (true, 0) => Self::new(1, false),
            (true, units) => Self::new(1 + units, false),
            (false, 0) => Self::NONE,
            (false, units) => Self::new(units + 1, true),
        }
    }
}

/// Indent display components, in em.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndentMetrics {
    /// Indentation of the first line only.
    pub first_line_em: f32,
    /// Indentation of the whole block.
    pub block_em: f32,
}

/// Get/set access to indent attributes.
///
/// Implemented by block nodes; only the indentable variants return `Some` / accept writes.
pub trait Indentable {
    /// Current indent state, `None` when the node carries no indentation.
    fn indent(&self) -> Option<IndentState>;

    /// Replace the indent state. Returns `false` (and changes nothing) when the node carries no
    /// indentation.
    fn set_indent(&mut self, state: IndentState) -> bool;
}

/// Indent command direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentChange {
    /// One step deeper.
    Increase,
    /// One step shallower.
    Decrease,
    /// Jump to a level (clamped).
    Set(i32),
}

/// Apply `change` to the block containing the cursor.
///
/// Returns `false` without touching the document only when the cursor is not inside an
/// indentable block. Boundary no-ops (decrease at 0, increase at the top level) return `true`.
pub fn apply_indent<M: DocumentModel + ?Sized>(
    model: &mut M,
    config: &IndentConfig,
    change: IndentChange,
) -> bool {
    let Some(cx) = CursorContext::capture(model, config) else {
        log::trace!("indent {:?}: selection does not resolve", change);
        return false;
    };
    apply_indent_in(model, config, &cx, change)
}

/// Same as [`apply_indent`], reusing an already captured cursor context.
pub(crate) fn apply_indent_in<M: DocumentModel + ?Sized>(
    model: &mut M,
    config: &IndentConfig,
    cx: &CursorContext,
    change: IndentChange,
) -> bool {
    let Some((path, current)) = cx.indentable.clone() else {
        log::trace!("indent {:?}: {} is not indentable", change, cx.pos.path);
        return false;
    };

    let next = match change {
        IndentChange::Increase => current.increased(config.max_level),
        IndentChange::Decrease => current.decreased(config.min_level),
        IndentChange::Set(level) => {
            IndentState::new(config.clamp(level), current.text_indent_only())
        }
    };

    if next == current {
        log::trace!("indent {:?}: {:?} unchanged", change, current);
        return true;
    }

    log::debug!(
        "indent {:?} at {}: ({}, {}) -> ({}, {})",
        change,
        path,
        current.level(),
        current.text_indent_only(),
        next.level(),
        next.text_indent_only()
    );

    let tr = Transaction::new().step(Step::SetIndent { path, indent: next });
    match model.apply(tr) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("indent transaction rejected: {err}");
            false
        }
    }
}

/// Increase the indent of the block containing the cursor.
pub fn increase_indent<M: DocumentModel + ?Sized>(model: &mut M, config: &IndentConfig) -> bool {
    apply_indent(model, config, IndentChange::Increase)
}

/// Decrease the indent of the block containing the cursor.
pub fn decrease_indent<M: DocumentModel + ?Sized>(model: &mut M, config: &IndentConfig) -> bool {
    apply_indent(model, config, IndentChange::Decrease)
}

/// Set the indent level of the block containing the cursor (clamped).
pub fn set_indent<M: DocumentModel + ?Sized>(
    model: &mut M,
    config: &IndentConfig,
    level: i32,
) -> bool {
    apply_indent(model, config, IndentChange::Set(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(level: u8, only: bool) -> IndentState {
        IndentState::new(level, only)
    }

    #[test]
    fn test_increase_transitions() {
        assert_eq!(s(0, false).increased(9), s(1, false));
        assert_eq!(s(1, false).increased(9), s(2, false));
        assert_eq!(s(4, false).increased(9), s(5, false));
        assert_eq!(s(9, false).increased(9), s(9, false));
        assert_eq!(s(4, true).increased(9), s(4, false));
        assert_eq!(s(9, true).increased(9), s(9, false));
    }

    #[test]
    fn test_decrease_transitions() {
        assert_eq!(s(5, false).decreased(0), s(5, true));
        assert_eq!(s(5, true).decreased(0), s(4, true));
        assert_eq!(s(3, true).decreased(0), s(2, true));
        assert_eq!(s(2, true).decreased(0), s(0, false));
        assert_eq!(s(2, false).decreased(0), s(2, true));
        assert_eq!(s(1, false).decreased(0), s(0, false));
        assert_eq!(s(0, false).decreased(0), s(0, false));
    }

    #[test]
    fn test_flag_is_dropped_below_level_two() {
        assert!(!IndentState::new(1, true).text_indent_only());
        assert!(!IndentState::new(0, true).text_indent_only());
        assert_eq!(IndentState::new(42, false).level(), 9);
    }

    #[test]
    fn test_increase_respects_configured_max() {
        assert_eq!(s(3, false).increased(3), s(3, false));
        assert_eq!(s(2, false).increased(3), s(3, false));
    }

    #[test]
    fn test_metrics() {
        assert_eq!(s(0, false).metrics(), IndentMetrics::default());
        assert_eq!(s(1, false).metrics().first_line_em, 2.0);
        let m = s(3, false).metrics();
        assert_eq!((m.first_line_em, m.block_em), (2.0, 4.0));
        let m = s(3, true).metrics();
        assert_eq!((m.first_line_em, m.block_em), (0.0, 4.0));
    }

    #[test]
    fn test_metrics_round_trip_for_every_state() {
        for level in 0..=9u8 {
            for only in [false, true] {
                let state = s(level, only);
                let m = state.metrics();
                assert_eq!(IndentState::from_metrics(m.first_line_em, m.block_em), state);
            }
        }
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(s(3, true)).unwrap();
        assert_eq!(json, serde_json::json!({ "indent": 3, "textIndentOnly": true }));
        let back: IndentState =
            serde_json::from_value(serde_json::json!({ "indent": 1, "textIndentOnly": true }))
                .unwrap();
        assert_eq!(back, s(1, false));
    }
}
