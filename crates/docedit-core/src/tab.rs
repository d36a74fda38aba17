//! Atomic tab token operations.
//!
//! A token occupies one offset. Every operation here moves over, selects or deletes it as a
//! whole.

use crate::inline::{self, Inline};
use crate::model::DocumentModel;
use crate::position::{BlockPath, DocPos, Selection};
use crate::transaction::{Step, Transaction};
use docedit_config::TabConfig;

/// Insert one token at the caret, replacing a non-empty selection.
///
/// Fails closed (returns `false`, no mutation) when the caret is not in a block that accepts
/// tokens.
pub fn insert_tab<M: DocumentModel + ?Sized>(model: &mut M, config: &TabConfig) -> bool {
    let selection = model.selection().clone();
    let from = selection.from().clone();
    let allowed = model
        .document()
        .text_block(&from.path)
        .is_ok_and(|node| node.allows_tabs());
    if !allowed {
        log::trace!("insert_tab: tokens not allowed at {}", from);
        return false;
    }

    let mut tr = Transaction::new();
    if !selection.is_collapsed() {
        tr.push(Step::DeleteRange {
            from: from.clone(),
            to: selection.to().clone(),
        });
    }
    tr.push(Step::Insert {
        pos: from.clone(),
        content: vec![Inline::tab(config.width)],
    });
    let tr = tr.with_selection(Selection::caret(from.with_offset(from.offset + 1)));

    match model.apply(tr) {
        Ok(()) => {
            log::debug!("inserted tab token at {}", from);
            true
        }
        Err(err) => {
            log::warn!("insert_tab rejected: {err}");
            false
        }
    }
}

/// Range `(start, end)` of the token at `offset`, if there is one.
pub fn token_range(content: &[Inline], offset: usize) -> Option<(usize, usize)> {
    inline::unit_at(content, offset)
        .filter(|unit| unit.is_tab())
        .map(|_| (offset, offset + 1))
}

/// Returns `true` if the unit at `offset` in the block at `path` is a token.
pub fn is_token_at<M: DocumentModel + ?Sized>(
    model: &M,
    path: &BlockPath,
    offset: usize,
) -> bool {
    model
        .document()
        .inline_at(path)
        .is_ok_and(|content| token_range(content, offset).is_some())
}

/// Delete the token starting at `offset` in the block at `path` and leave the caret where it
/// was. Returns `false` (no mutation) when there is no token there.
pub fn delete_token<M: DocumentModel + ?Sized>(
    model: &mut M,
    path: &BlockPath,
    offset: usize,
) -> bool {
    if !is_token_at(model, path, offset) {
        return false;
    }
    let tr = Transaction::new()
        .step(Step::Delete {
            path: path.clone(),
            from: offset,
            to: offset + 1,
        })
        .with_selection(Selection::caret(DocPos::new(path.clone(), offset)));
    match model.apply(tr) {
        Ok(()) => {
            log::debug!("deleted tab token at {}@{}", path, offset);
            true
        }
        Err(err) => {
            log::warn!("token deletion rejected: {err}");
            false
        }
    }
}

/// Move the caret to `pos` without touching the document.
pub(crate) fn move_caret<M: DocumentModel + ?Sized>(model: &mut M, pos: DocPos) -> bool {
    match model.set_selection(Selection::caret(pos)) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("caret move rejected: {err}");
            false
        }
    }
}
