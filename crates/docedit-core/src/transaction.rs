//! Position-addressed document transactions.
//!
//! A [`Transaction`] batches [`Step`]s together with an optional new selection. Steps are applied
//! in order to a copy of the document, and the copy replaces the original only when every step
//! succeeded, so a rejected transaction never leaves a half-edited document behind.

use crate::document::{Document, DocumentError, Node};
use crate::indent::{IndentState, Indentable};
use crate::inline::{self, Inline, Mark, MarkKind};
use crate::lists;
use crate::position::{BlockPath, DocPos, Selection};

/// Target kind of a text block conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Plain paragraph.
    Paragraph,
    /// Heading of the given level.
    Heading(u8),
    /// Collapsible heading of the given level.
    CollapsibleHeading(u8),
    /// Code block.
    CodeBlock,
}

/// One document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Insert inline content at a position.
    Insert {
        /// Insertion point.
        pos: DocPos,
        /// Content to insert.
        content: Vec<Inline>,
    },
    /// Delete `from..to` inside one text block.
    Delete {
        /// Text block.
        path: BlockPath,
        /// Start offset.
        from: usize,
        /// End offset (exclusive).
        to: usize,
    },
    /// Delete everything between two positions, joining their blocks when they differ.
    DeleteRange {
        /// Start (document order).
        from: DocPos,
        /// End (document order).
        to: DocPos,
    },
    /// Replace the indent state of a block.
    SetIndent {
        /// Indentable block.
        path: BlockPath,
        /// New state.
        indent: IndentState,
    },
    /// Add a mark to `from..to`, replacing any mark of the same kind.
    AddMark {
        /// Text block.
        path: BlockPath,
        /// Start offset.
        from: usize,
        /// End offset (exclusive).
        to: usize,
        /// Mark to add.
        mark: Mark,
    },
    /// Remove every mark of a kind from `from..to`.
    RemoveMark {
        /// Text block.
        path: BlockPath,
        /// Start offset.
        from: usize,
        /// End offset (exclusive).
        to: usize,
        /// Kind to remove.
        kind: MarkKind,
    },
    /// Split a text block in two at a position.
    SplitBlock {
        /// Split point.
        pos: DocPos,
    },
    /// Append a text block to the previous text block and remove it.
    JoinBackward {
        /// Block to merge away.
        path: BlockPath,
    },
    /// Convert a text block to another kind, keeping content and indent.
    SetBlockType {
        /// Text block.
        path: BlockPath,
        /// New kind.
        kind: TextKind,
    },
    /// Fold or unfold a collapsible heading.
    SetCollapsed {
        /// Collapsible heading.
        path: BlockPath,
        /// New state.
        collapsed: bool,
    },
    /// Nest a list item into its previous sibling.
    SinkListItem {
        /// List item.
        path: BlockPath,
    },
    /// Move a nested list item out to its parent list.
    LiftListItem {
        /// List item.
        path: BlockPath,
    },
}

impl Step {
    /// Apply this step to `doc` in place.
    pub fn apply(&self, doc: &mut Document) -> Result<(), DocumentError> {
        match self {
            Step::Insert { pos, content } => {
                doc.check_pos(pos)?;
                let node = doc.text_block(&pos.path)?;
                if !node.allows_tabs() && content.iter().any(Inline::is_tab) {
                    return Err(DocumentError::TokenNotAllowed(pos.path.clone()));
                }
                inline::insert(doc.inline_at_mut(&pos.path)?, pos.offset, content.clone());
            }
            Step::Delete { path, from, to } => {
                doc.check_pos(&DocPos::new(path.clone(), *to))?;
                inline::remove(doc.inline_at_mut(path)?, *from, *to);
            }
            Step::DeleteRange { from, to } => delete_range(doc, from, to)?,
            Step::SetIndent { path, indent } => {
                let node = doc
                    .node_mut(path)
                    .ok_or_else(|| DocumentError::InvalidPath(path.clone()))?;
                if !node.set_indent(*indent) {
                    return Err(DocumentError::NotIndentable(path.clone()));
                }
            }
            Step::AddMark {
                path,
                from,
                to,
                mark,
            } => {
                doc.check_pos(&DocPos::new(path.clone(), *to))?;
                if matches!(doc.node(path), Some(Node::CodeBlock { .. })) {
                    return Ok(());
                }
                inline::map_marks(doc.inline_at_mut(path)?, *from, *to, |marks| {
                    marks.push(mark.clone())
                });
            }
            Step::RemoveMark {
                path,
                from,
                to,
                kind,
            } => {
                doc.check_pos(&DocPos::new(path.clone(), *to))?;
                inline::map_marks(doc.inline_at_mut(path)?, *from, *to, |marks| {
                    marks.retain(|m| m.kind() != *kind)
                });
            }
            Step::SplitBlock { pos } => split_block(doc, pos)?,
            Step::JoinBackward { path } => join_backward(doc, path)?,
            Step::SetBlockType { path, kind } => set_block_type(doc, path, *kind)?,
            Step::SetCollapsed { path, collapsed } => match doc.node_mut(path) {
                Some(Node::CollapsibleHeading { collapsed: c, .. }) => *c = *collapsed,
                Some(_) => return Err(DocumentError::NotHeading(path.clone())),
                None => return Err(DocumentError::InvalidPath(path.clone())),
            },
            Step::SinkListItem { path } => {
                lists::sink_item(doc, path)?;
            }
            Step::LiftListItem { path } => {
                lists::lift_item(doc, path)?;
            }
        }
        Ok(())
    }
}

fn split_block(doc: &mut Document, pos: &DocPos) -> Result<(), DocumentError> {
    doc.check_pos(pos)?;
    let node = doc.text_block(&pos.path)?;
    let len = node.content_len();
    let mut new_block = node.split_off_type(pos.offset == len);
    let tail = inline::remove(doc.inline_at_mut(&pos.path)?, pos.offset, len);
    if let Some(content) = new_block.inline_mut() {
        *content = tail;
    }

    let index = pos.path.last().unwrap_or(0);
    let siblings = doc
        .siblings_mut(&pos.path)
        .ok_or_else(|| DocumentError::InvalidPath(pos.path.clone()))?;
    siblings.insert(index + 1, new_block);
    Ok(())
}

fn join_backward(doc: &mut Document, path: &BlockPath) -> Result<(), DocumentError> {
    let content = doc.inline_at(path)?.clone();
    let prev = doc
        .prev_text_block(path)
        .ok_or_else(|| DocumentError::CannotJoin(path.clone()))?;
    let target = doc.inline_at_mut(&prev)?;
    let end = inline::content_len(target);
    inline::insert(target, end, content);
    remove_block(doc, path)
}

fn delete_range(doc: &mut Document, from: &DocPos, to: &DocPos) -> Result<(), DocumentError> {
    doc.check_pos(from)?;
    doc.check_pos(to)?;
    if from.path == to.path {
        inline::remove(doc.inline_at_mut(&from.path)?, from.offset, to.offset);
        return Ok(());
    }
    if to.path < from.path {
        return Err(DocumentError::InvalidOffset {
            path: to.path.clone(),
            offset: to.offset,
            len: doc.block_len(&to.path),
        });
    }

    let to_len = doc.block_len(&to.path);
    let tail = inline::slice(doc.inline_at(&to.path)?, to.offset, to_len);
    let head = doc.inline_at_mut(&from.path)?;
    let head_len = inline::content_len(head);
    inline::remove(head, from.offset, head_len);
    inline::insert(head, from.offset, tail);

    // Later blocks first, so earlier paths stay valid.
    let doomed: Vec<BlockPath> = doc
        .text_blocks()
        .into_iter()
        .filter(|p| *p > from.path && *p <= to.path)
        .rev()
        .collect();
    for path in doomed {
        remove_block(doc, &path)?;
    }
    Ok(())
}

/// Remove the node at `path`, then any container left empty by the removal.
fn remove_block(doc: &mut Document, path: &BlockPath) -> Result<(), DocumentError> {
    let index = path
        .last()
        .ok_or_else(|| DocumentError::InvalidPath(path.clone()))?;
    let siblings = doc
        .siblings_mut(path)
        .ok_or_else(|| DocumentError::InvalidPath(path.clone()))?;
    if index >= siblings.len() {
        return Err(DocumentError::InvalidPath(path.clone()));
    }
    siblings.remove(index);
    let now_empty = siblings.is_empty();

    if now_empty && let Some(parent) = path.parent() {
        return remove_block(doc, &parent);
    }
    Ok(())
}

fn set_block_type(
    doc: &mut Document,
    path: &BlockPath,
    kind: TextKind,
) -> Result<(), DocumentError> {
    let node = doc
        .node_mut(path)
        .ok_or_else(|| DocumentError::InvalidPath(path.clone()))?;
    let content = node
        .inline()
        .cloned()
        .ok_or_else(|| DocumentError::NotTextBlock(path.clone()))?;
    let indent = node.indent().unwrap_or(IndentState::NONE);
    let collapsed = matches!(node, Node::CollapsibleHeading { collapsed: true, .. });

    *node = match kind {
        TextKind::Paragraph => Node::paragraph(content).with_indent(indent),
        TextKind::Heading(level) => Node::heading(level, content).with_indent(indent),
        TextKind::CollapsibleHeading(level) => Node::CollapsibleHeading {
            level: level.clamp(1, 6),
            collapsed,
            indent,
            content,
        },
        TextKind::CodeBlock => Node::CodeBlock {
            language: None,
            content,
        },
    };
    Ok(())
}

/// A batch of steps plus the selection to install afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    steps: Vec<Step>,
    selection: Option<Selection>,
    add_to_history: bool,
    coalesce: bool,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// Empty transaction that will be recorded in history.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            selection: None,
            add_to_history: true,
            coalesce: false,
        }
    }

    /// Selection-only transaction, never recorded in history.
    pub fn select(selection: Selection) -> Self {
        Self::new().with_selection(selection).without_history()
    }

    /// Append a step (builder style).
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a step.
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Selection to install after the steps.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Do not record this transaction in the undo history.
    pub fn without_history(mut self) -> Self {
        self.add_to_history = false;
        self
    }

    /// Allow merging with the previous history entry (typing).
    pub fn coalescing(mut self) -> Self {
        self.coalesce = true;
        self
    }

    /// Steps in application order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Selection to install, if any.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Whether the transaction is recorded in history.
    pub fn adds_to_history(&self) -> bool {
        self.add_to_history
    }

    /// Whether the transaction may merge with the previous history entry.
    pub fn coalesces(&self) -> bool {
        self.coalesce
    }

    /// Returns `true` if the transaction carries no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step to a copy of `doc` and return the normalized result.
    ///
    /// The selection, when present, is validated against the result.
    pub fn apply_to(&self, doc: &Document) -> Result<Document, DocumentError> {
        let mut next = doc.clone();
        for step in &self.steps {
            step.apply(&mut next)?;
        }
        if !self.steps.is_empty() {
            next.normalize();
        }
        if let Some(selection) = &self.selection {
            next.check_pos(&selection.anchor)?;
            next.check_pos(&selection.head)?;
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Document {
        Document::new(lines.iter().map(|l| Node::text_paragraph(l)).collect())
    }

    #[test]
    fn test_failed_step_leaves_document_untouched() {
        let original = doc(&["Hello"]);
        let tr = Transaction::new()
            .step(Step::Insert {
                pos: DocPos::new(vec![0], 5),
                content: vec![Inline::text("!")],
            })
            .step(Step::Delete {
                path: BlockPath::root(0),
                from: 0,
                to: 99,
            });
        assert!(tr.apply_to(&original).is_err());
        assert_eq!(original.plain_text(), "Hello");
    }

    #[test]
    fn test_split_block_resets_indent() {
        let original = Document::new(vec![
            Node::text_paragraph("HelloWorld").with_indent(IndentState::new(3, false)),
        ]);
        let next = Transaction::new()
            .step(Step::SplitBlock {
                pos: DocPos::new(vec![0], 5),
            })
            .apply_to(&original)
            .unwrap();
        assert_eq!(next.plain_text(), "Hello\nWorld");
        assert_eq!(next.content[0].indent(), Some(IndentState::new(3, false)));
        assert_eq!(next.content[1].indent(), Some(IndentState::NONE));
    }

    #[test]
    fn test_delete_range_across_nested_blocks() {
        let original = Document::new(vec![
            Node::text_paragraph("alpha"),
            Node::bullet_list(vec![Node::list_item(vec![Node::text_paragraph("beta")])]),
            Node::text_paragraph("gamma"),
        ]);
        let next = Transaction::new()
            .step(Step::DeleteRange {
                from: DocPos::new(vec![0], 2),
                to: DocPos::new(vec![2], 3),
            })
            .apply_to(&original)
            .unwrap();
        assert_eq!(next.plain_text(), "alma");
        assert_eq!(next.content.len(), 1);
    }

    #[test]
    fn test_tokens_rejected_in_code_blocks() {
        let original = Document::new(vec![Node::code_block("fn")]);
        let err = Transaction::new()
            .step(Step::Insert {
                pos: DocPos::new(vec![0], 0),
                content: vec![Inline::tab(8)],
            })
            .apply_to(&original)
            .unwrap_err();
        assert!(matches!(err, DocumentError::TokenNotAllowed(_)));
    }

    #[test]
    fn test_block_type_keeps_indent() {
        let original = Document::new(vec![
            Node::text_paragraph("Title").with_indent(IndentState::new(2, true)),
        ]);
        let next = Transaction::new()
            .step(Step::SetBlockType {
                path: BlockPath::root(0),
                kind: TextKind::Heading(2),
            })
            .apply_to(&original)
            .unwrap();
        assert_eq!(next.content[0].heading_level(), Some(2));
        assert_eq!(next.content[0].indent(), Some(IndentState::new(2, true)));
    }
}
