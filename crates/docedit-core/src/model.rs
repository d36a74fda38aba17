//! The document model seen by the engine.
//!
//! Everything in this crate that edits a document goes through the [`DocumentModel`] trait:
//! read the tree and the selection, apply a [`Transaction`], serialize the structure, and run
//! the default undo/redo. [`EditorState`] is the in-memory implementation used by
//! [`crate::Editor`] and the tests.

use crate::document::{Document, DocumentError};
use crate::history::{Snapshot, UndoHistory};
use crate::position::{DocPos, Selection};
use crate::resolve::ResolvedPos;
use crate::transaction::Transaction;
use docedit_config::HistoryConfig;

/// Collaborator interface consumed by the indent engine, the router and the undo guard.
pub trait DocumentModel {
    /// Current document.
    fn document(&self) -> &Document;

    /// Current selection.
    fn selection(&self) -> &Selection;

    /// Apply a transaction atomically.
    fn apply(&mut self, tr: Transaction) -> Result<(), DocumentError>;

    /// Default undo. Returns `false` when there was nothing to undo.
    fn undo(&mut self) -> bool;

    /// Default redo. Returns `false` when there was nothing to redo.
    fn redo(&mut self) -> bool;

    /// Replace the selection without touching the document or the history.
    fn set_selection(&mut self, selection: Selection) -> Result<(), DocumentError> {
        self.apply(Transaction::select(selection))
    }

    /// Resolve a position against the current document.
    fn resolve(&self, pos: &DocPos) -> Result<ResolvedPos<'_>, DocumentError> {
        ResolvedPos::resolve(self.document(), pos)
    }

    /// Structural serialization of the current document.
    fn serialize_structure(&self) -> Result<String, DocumentError> {
        self.document().to_json()
    }
}

/// In-memory document model with snapshot history.
#[derive(Debug, Clone)]
pub struct EditorState {
    doc: Document,
    selection: Selection,
    history: UndoHistory,
}

impl EditorState {
    /// State holding `doc` with the caret at its start.
    pub fn new(doc: Document, history: &HistoryConfig) -> Self {
        let selection = Selection::caret(doc.start());
        Self {
            doc,
            selection,
            history: UndoHistory::new(history.depth),
        }
    }

    /// Replace the whole document, resetting selection and history.
    pub fn load(&mut self, doc: Document) {
        self.selection = Selection::caret(doc.start());
        self.doc = doc;
        self.history.clear();
    }

    /// Undo history.
    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    /// Close the open coalescing group.
    pub fn end_history_group(&mut self) {
        self.history.end_group();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            doc: self.doc.clone(),
            selection: self.selection.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.doc = snapshot.doc;
        self.selection = snapshot.selection;
    }
}

/// Clamp a selection end into `doc`: unknown blocks map to the document start, offsets are cut
/// to the block length.
fn clamp_pos(doc: &Document, pos: &DocPos) -> DocPos {
    match doc.node(&pos.path) {
        Some(node) if node.is_text_block() => pos.with_offset(pos.offset.min(node.content_len())),
        _ => doc.start(),
    }
}

impl DocumentModel for EditorState {
    fn document(&self) -> &Document {
        &self.doc
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn apply(&mut self, tr: Transaction) -> Result<(), DocumentError> {
        let next = tr.apply_to(&self.doc)?;
        let selection = match tr.selection() {
            Some(selection) => selection.clone(),
            None => Selection::new(
                clamp_pos(&next, &self.selection.anchor),
                clamp_pos(&next, &self.selection.head),
            ),
        };

        if tr.is_empty() {
            // Selection-only change ends typing coalescing.
            self.history.end_group();
            self.selection = selection;
            return Ok(());
        }

        if tr.adds_to_history() && next != self.doc {
            let before = self.snapshot();
            let after = Snapshot {
                doc: next.clone(),
                selection: selection.clone(),
            };
            self.history.record(before, after, tr.coalesces());
        }

        self.doc = next;
        self.selection = selection;
        Ok(())
    }

    fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }
}
