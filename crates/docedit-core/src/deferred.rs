//! Deferred caret correction after ArrowLeft crosses into the previous block.
//!
//! When the caret leaves a block to the left, the default movement can leave it one position
//! short of the previous block's end. The router records a [`ScheduledCorrection`] and the host
//! runs it on its next frame. Any event routed in between cancels it, and running it re-checks
//! the selection before touching anything.

use crate::model::DocumentModel;
use crate::position::{BlockPath, DocPos};

/// A pending caret correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCorrection {
    /// Block the caret is expected to land in.
    pub path: BlockPath,
    /// Offset the caret should end up at (the block's end).
    pub target: usize,
}

/// Outcome of running a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionOutcome {
    /// The caret was one short and has been moved to the target.
    Applied,
    /// The caret already sat on the target.
    AlreadyCorrect,
    /// The selection no longer matches what was scheduled.
    Stale,
}

impl ScheduledCorrection {
    /// Correction towards the end of the block at `path`.
    pub fn new(path: BlockPath, target: usize) -> Self {
        Self { path, target }
    }

    /// Validate the current selection and move the caret onto the target if it is one short.
    pub fn run<M: DocumentModel + ?Sized>(&self, model: &mut M) -> CorrectionOutcome {
        let selection = model.selection();
        if !selection.is_collapsed() || selection.head.path != self.path {
            return CorrectionOutcome::Stale;
        }
        if model.document().block_len(&self.path) != self.target {
            return CorrectionOutcome::Stale;
        }

        let offset = selection.head.offset;
        if offset == self.target {
            CorrectionOutcome::AlreadyCorrect
        } else if offset + 1 == self.target {
            if crate::tab::move_caret(model, DocPos::new(self.path.clone(), self.target)) {
                CorrectionOutcome::Applied
            } else {
                CorrectionOutcome::Stale
            }
        } else {
            CorrectionOutcome::Stale
        }
    }
}
