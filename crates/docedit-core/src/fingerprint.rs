//! Content fingerprint undo guard.
//!
//! Loading content into an editor usually goes through the model's normal transaction path and
//! therefore lands in the undo history. Undoing right after a load would erase the loaded
//! document. [`UndoGuard`] remembers a fingerprint of the document as loaded and swallows undo
//! while the document is still structurally identical to it.

use crate::model::DocumentModel;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of a document's structural serialization, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of a structural serialization.
    pub fn of_structure(structure: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(structure.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Fingerprint of the model's current document. `None` if serialization failed.
    pub fn of_model<M: DocumentModel + ?Sized>(model: &M) -> Option<Self> {
        match model.serialize_structure() {
            Ok(structure) => Some(Self::of_structure(&structure)),
            Err(err) => {
                log::warn!("cannot fingerprint document: {err}");
                None
            }
        }
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Undo interception around the model's default undo.
#[derive(Debug, Clone, Default)]
pub struct UndoGuard {
    initial: Option<Fingerprint>,
}

impl UndoGuard {
    /// Guard without a baseline; undo passes straight through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current document as the freshly loaded baseline.
    pub fn set_initial_content<M: DocumentModel + ?Sized>(&mut self, model: &M) {
        self.initial = Fingerprint::of_model(model);
        log::debug!(
            "undo baseline set: {}",
            self.initial.as_ref().map_or("<none>", Fingerprint::as_str)
        );
    }

    /// Forget the baseline.
    pub fn clear(&mut self) {
        self.initial = None;
    }

    /// Stored baseline.
    pub fn initial(&self) -> Option<&Fingerprint> {
        self.initial.as_ref()
    }

    /// Returns `true` if the model's document is identical to the baseline.
    pub fn is_at_baseline<M: DocumentModel + ?Sized>(&self, model: &M) -> bool {
        match (&self.initial, Fingerprint::of_model(model)) {
            (Some(initial), Some(current)) => *initial == current,
            _ => false,
        }
    }

    /// Undo unless the document is identical to the loaded baseline.
    ///
    /// At the baseline this returns `true` and leaves the document alone. Otherwise (or without
    /// a baseline) it returns whatever the model's undo returns.
    pub fn safe_undo<M: DocumentModel + ?Sized>(&self, model: &mut M) -> bool {
        if self.is_at_baseline(model) {
            log::debug!("undo swallowed: document matches loaded content");
            return true;
        }
        let undone = model.undo();
        log::trace!("undo delegated: {}", undone);
        undone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = Fingerprint::of_structure("");
        assert_eq!(
            fp.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_equal_length_structures_differ() {
        assert_ne!(
            Fingerprint::of_structure(r#"{"text":"ab"}"#),
            Fingerprint::of_structure(r#"{"text":"ba"}"#)
        );
    }
}
