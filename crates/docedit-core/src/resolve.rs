//! Position resolution.
//!
//! Handlers resolve the caret once per event. [`ResolvedPos`] borrows the document and records
//! the ancestry of the addressed text block; [`CursorContext`] condenses it into an owned record
//! that stays usable while the handler mutates the model.

use crate::document::{Document, DocumentError, Node};
use crate::indent::{IndentState, Indentable};
use crate::inline::{self, Inline, Unit};
use crate::model::DocumentModel;
use crate::position::{BlockPath, DocPos};
use docedit_config::IndentConfig;

/// A position resolved against a document.
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    /// The position.
    pub pos: DocPos,
    /// `(depth, node)` for every node from the top level down to the text block (inclusive).
    pub ancestors: Vec<(usize, &'a Node)>,
}

impl<'a> ResolvedPos<'a> {
    /// Resolve `pos`. Fails when the path does not address a text block or the offset is out of
    /// range.
    pub fn resolve(doc: &'a Document, pos: &DocPos) -> Result<Self, DocumentError> {
        doc.check_pos(pos)?;
        let mut ancestors = Vec::with_capacity(pos.path.depth());
        for depth in 1..=pos.path.depth() {
            let node = doc
                .node(&pos.path.prefix(depth))
                .ok_or_else(|| DocumentError::InvalidPath(pos.path.clone()))?;
            ancestors.push((depth, node));
        }
        Ok(Self {
            pos: pos.clone(),
            ancestors,
        })
    }

    /// The text block itself.
    pub fn block(&self) -> Option<&'a Node> {
        self.ancestors.last().map(|(_, node)| *node)
    }

    /// Inline content of the text block.
    pub fn content(&self) -> &'a [Inline] {
        self.block()
            .and_then(Node::inline)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unit immediately before the position.
    pub fn unit_before(&self) -> Option<Unit<'a>> {
        let offset = self.pos.offset.checked_sub(1)?;
        inline::unit_at(self.content(), offset)
    }

    /// Unit immediately after the position.
    pub fn unit_after(&self) -> Option<Unit<'a>> {
        inline::unit_at(self.content(), self.pos.offset)
    }

    /// Returns `true` if only whitespace characters and tab tokens precede the position.
    pub fn at_block_start(&self) -> bool {
        inline::units(self.content())
            .take(self.pos.offset)
            .all(|unit| unit.is_tab() || unit.is_whitespace())
    }

    /// Path of the innermost list item around the block.
    pub fn list_item(&self) -> Option<BlockPath> {
        self.ancestors
            .iter()
            .rev()
            .find(|(_, node)| matches!(node, Node::ListItem { .. }))
            .map(|(depth, _)| self.pos.path.prefix(*depth))
    }
}

/// Owned summary of the caret surroundings, captured once per event.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorContext {
    /// Start of the selection.
    pub pos: DocPos,
    /// Whether the selection is a caret.
    pub collapsed: bool,
    /// Length of the text block.
    pub block_len: usize,
    /// Only whitespace and tokens precede the caret.
    pub at_block_start: bool,
    /// The unit before the caret is a tab token.
    pub token_before: bool,
    /// The unit after the caret is a tab token.
    pub token_after: bool,
    /// Innermost list item around the block.
    pub list_item: Option<BlockPath>,
    /// Path and state of the block when it is indentable.
    pub indentable: Option<(BlockPath, IndentState)>,
    /// Whether tab tokens may be inserted here.
    pub allows_tabs: bool,
    /// Previous text block in reading order.
    pub prev_block: Option<BlockPath>,
}

impl CursorContext {
    /// Capture the context of the selection's start. `None` when the selection does not resolve.
    pub fn capture<M: DocumentModel + ?Sized>(model: &M, config: &IndentConfig) -> Option<Self> {
        let selection = model.selection();
        let doc = model.document();
        let pos = selection.from().clone();
        let resolved = ResolvedPos::resolve(doc, &pos).ok()?;
        let block = resolved.block()?;

        let indentable = if block.is_indentable(config) {
            block.indent().map(|state| (pos.path.clone(), state))
        } else {
            None
        };

        Some(Self {
            collapsed: selection.is_collapsed(),
            block_len: block.content_len(),
            at_block_start: resolved.at_block_start(),
            token_before: resolved.unit_before().is_some_and(|u| u.is_tab()),
            token_after: resolved.unit_after().is_some_and(|u| u.is_tab()),
            list_item: resolved.list_item(),
            indentable,
            allows_tabs: block.allows_tabs(),
            prev_block: doc.prev_text_block(&pos.path),
            pos,
        })
    }

    /// Indent level of the block (0 when it is not indentable).
    pub fn indent_level(&self) -> u8 {
        self.indentable
            .as_ref()
            .map(|(_, state)| state.level())
            .unwrap_or(0)
    }

    /// Returns `true` inside list item content.
    pub fn in_list_item(&self) -> bool {
        self.list_item.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(vec![
            Node::paragraph(vec![
                Inline::text("  "),
                Inline::tab(8),
                Inline::text("x y"),
            ]),
            Node::bullet_list(vec![Node::list_item(vec![Node::text_paragraph("item")])]),
        ])
    }

    #[test]
    fn test_block_start_allows_whitespace_and_tokens() {
        let doc = doc();
        for offset in 0..=3 {
            let resolved = ResolvedPos::resolve(&doc, &DocPos::new(vec![0], offset)).unwrap();
            assert!(resolved.at_block_start(), "offset {offset}");
        }
        let resolved = ResolvedPos::resolve(&doc, &DocPos::new(vec![0], 4)).unwrap();
        assert!(!resolved.at_block_start());
    }

    #[test]
    fn test_adjacent_units() {
        let doc = doc();
        let resolved = ResolvedPos::resolve(&doc, &DocPos::new(vec![0], 3)).unwrap();
        assert!(resolved.unit_before().is_some_and(|u| u.is_tab()));
        assert!(!resolved.unit_after().is_some_and(|u| u.is_tab()));
    }

    #[test]
    fn test_list_item_ancestry() {
        let doc = doc();
        let resolved = ResolvedPos::resolve(&doc, &DocPos::new(vec![1, 0, 0], 2)).unwrap();
        assert_eq!(resolved.list_item(), Some(BlockPath::new(vec![1, 0])));
        assert_eq!(resolved.ancestors.len(), 3);
    }

    #[test]
    fn test_resolve_rejects_containers_and_bad_offsets() {
        let doc = doc();
        assert!(ResolvedPos::resolve(&doc, &DocPos::new(vec![1], 0)).is_err());
        assert!(ResolvedPos::resolve(&doc, &DocPos::new(vec![0], 7)).is_err());
    }
}
