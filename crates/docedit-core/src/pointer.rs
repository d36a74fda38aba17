//! Pointer events and the pointer-state record.

use crate::position::{BlockPath, DocPos};
use docedit_config::PointerConfig;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) button.
    Primary,
    /// Middle button.
    Middle,
    /// Secondary (right) button.
    Secondary,
}

/// Where a pointer event landed: a text block and a cell column inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HitPoint {
    /// Text block under the pointer.
    pub path: BlockPath,
    /// Cell column from the start of the block's content.
    pub column: usize,
}

impl HitPoint {
    /// Create a hit point.
    pub fn new(path: impl Into<BlockPath>, column: usize) -> Self {
        Self {
            path: path.into(),
            column,
        }
    }
}

/// A pointer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    /// Button involved.
    pub button: MouseButton,
    /// Hit point, `None` when the pointer is outside any text block.
    pub hit: Option<HitPoint>,
    /// Timestamp in milliseconds.
    pub time_ms: u64,
    /// Shift held (extends the selection on press).
    pub shift: bool,
}

impl PointerEvent {
    /// Primary-button event at `hit`.
    pub fn primary(hit: HitPoint, time_ms: u64) -> Self {
        Self {
            button: MouseButton::Primary,
            hit: Some(hit),
            time_ms,
            shift: false,
        }
    }
}

/// Pointer tracking between events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerState {
    last_click_time: Option<u64>,
    last_click_pos: Option<DocPos>,
    dragging: bool,
    drag_anchor: Option<DocPos>,
    double_click: bool,
}

impl PointerState {
    /// Fresh state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a primary-button drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Position where the current drag started.
    pub fn drag_anchor(&self) -> Option<&DocPos> {
        self.drag_anchor.as_ref()
    }

    /// Whether the last press completed a double click.
    pub fn is_double_click(&self) -> bool {
        self.double_click
    }

    /// Time of the last recorded single press.
    pub fn last_click_time(&self) -> Option<u64> {
        self.last_click_time
    }

    /// Record a primary press at `pos`. Returns `true` if it completes a double click.
    ///
    /// A press counts as the second half of a double click when it follows the previous single
    /// press within the configured delay, in the same block, within the configured distance. A
    /// detected double click does not become the reference for the next one.
    pub fn press(&mut self, pos: Option<DocPos>, time_ms: u64, config: &PointerConfig) -> bool {
        self.dragging = true;
        self.drag_anchor = pos.clone();

        let is_double = match (self.last_click_time, &self.last_click_pos, &pos) {
            (Some(last_time), Some(last_pos), Some(pos)) => {
                time_ms.saturating_sub(last_time) < config.double_click_ms
                    && last_pos.path == pos.path
                    && last_pos.offset.abs_diff(pos.offset) < config.double_click_distance
            }
            _ => false,
        };

        if !is_double {
            self.last_click_time = Some(time_ms);
            self.last_click_pos = pos;
        }
        self.double_click = is_double;
        is_double
    }

    /// End a drag.
    pub fn release(&mut self) {
        self.dragging = false;
        self.drag_anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(offset: usize) -> Option<DocPos> {
        Some(DocPos::new(vec![0], offset))
    }

    #[test]
    fn test_double_click_timing_and_distance() {
        let config = PointerConfig::default();
        let mut state = PointerState::new();
        assert!(!state.press(pos(3), 1_000, &config));
        assert!(state.press(pos(5), 1_200, &config));
        // Too late after the reference press.
        assert!(!state.press(pos(5), 1_400, &config));
        // Too far away.
        assert!(!state.press(pos(20), 1_450, &config));
    }

    #[test]
    fn test_release_resets_drag() {
        let mut state = PointerState::new();
        state.press(pos(1), 0, &PointerConfig::default());
        assert!(state.is_dragging());
        assert_eq!(state.drag_anchor(), pos(1).as_ref());
        state.release();
        assert!(!state.is_dragging());
        assert_eq!(state.drag_anchor(), None);
    }
}
