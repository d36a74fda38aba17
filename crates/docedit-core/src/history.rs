//! Snapshot-based undo/redo history.
//!
//! Each recorded transaction stores the document and selection before and after it. Entries
//! carry a group id; consecutive coalescing transactions (typing) share a group and are undone
//! together.

use crate::document::Document;
use crate::position::Selection;

/// Document plus selection at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Document.
    pub doc: Document,
    /// Selection.
    pub selection: Selection,
}

#[derive(Debug, Clone)]
struct UndoEntry {
    before: Snapshot,
    after: Snapshot,
    group_id: usize,
}

/// Linear undo/redo stacks with grouping.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    max_undo: usize,
    next_group_id: usize,
    open_group_id: Option<usize>,
}

impl UndoHistory {
    /// Empty history keeping at most `max_undo` entries.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            next_group_id: 0,
            open_group_id: None,
        }
    }

    /// Returns `true` if there is something to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there is something to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo entries.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo entries.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Stop coalescing into the current group.
    pub fn end_group(&mut self) {
        self.open_group_id = None;
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_group_id = None;
    }

    /// Record a change. `coalesce` lets it join the open group.
    pub fn record(&mut self, before: Snapshot, after: Snapshot, coalesce: bool) {
        self.redo_stack.clear();

        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.remove(0);
        }

        let group_id = match self.open_group_id {
            Some(open) if coalesce => open,
            _ => {
                let id = self.next_group_id;
                self.next_group_id = self.next_group_id.wrapping_add(1);
                id
            }
        };
        self.open_group_id = coalesce.then_some(group_id);

        self.undo_stack.push(UndoEntry {
            before,
            after,
            group_id,
        });
    }

    /// Pop the newest group and return the state before it.
    pub fn undo(&mut self) -> Option<Snapshot> {
        self.end_group();
        let group = pop_group(&mut self.undo_stack)?;
        // `group` is newest first; the oldest entry holds the state before the whole group.
        let before = group.last().map(|entry| entry.before.clone());
        self.redo_stack.extend(group);
        before
    }

    /// Pop the newest undone group and return the state after it.
    pub fn redo(&mut self) -> Option<Snapshot> {
        self.end_group();
        let group = pop_group(&mut self.redo_stack)?;
        // `group` is oldest first here, because undo pushed newest first.
        let after = group.last().map(|entry| entry.after.clone());
        self.undo_stack.extend(group);
        after
    }
}

fn pop_group(stack: &mut Vec<UndoEntry>) -> Option<Vec<UndoEntry>> {
    let last_group_id = stack.last().map(|e| e.group_id)?;
    let mut entries = Vec::new();
    while stack.last().is_some_and(|e| e.group_id == last_group_id) {
        if let Some(entry) = stack.pop() {
            entries.push(entry);
        }
    }
    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::DocPos;

    fn snap(text: &str) -> Snapshot {
        let doc = Document::from_text(text);
        let selection = Selection::caret(DocPos::new(vec![0], 0));
        Snapshot { doc, selection }
    }

    #[test]
    fn test_coalesced_entries_undo_together() {
        let mut history = UndoHistory::new(10);
        history.record(snap(""), snap("a"), true);
        history.record(snap("a"), snap("ab"), true);
        history.end_group();
        history.record(snap("ab"), snap("ab!"), false);

        assert_eq!(history.undo().unwrap().doc.plain_text(), "ab");
        assert_eq!(history.undo().unwrap().doc.plain_text(), "");
        assert!(history.undo().is_none());

        assert_eq!(history.redo().unwrap().doc.plain_text(), "ab");
        assert_eq!(history.redo().unwrap().doc.plain_text(), "ab!");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut history = UndoHistory::new(10);
        history.record(snap(""), snap("a"), false);
        history.undo();
        assert!(history.can_redo());
        history.record(snap(""), snap("b"), false);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_limit_drops_oldest() {
        let mut history = UndoHistory::new(2);
        history.record(snap(""), snap("a"), false);
        history.record(snap("a"), snap("b"), false);
        history.record(snap("b"), snap("c"), false);
        assert_eq!(history.undo_depth(), 2);
        history.undo();
        assert_eq!(history.undo().unwrap().doc.plain_text(), "a");
    }
}
