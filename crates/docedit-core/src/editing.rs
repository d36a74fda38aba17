//! Default editing behavior for events the router declines.
//!
//! Typing, block split and join, grapheme-wise deletion and caret movement, formatting marks,
//! heading conversion and list nesting. Every function reads the model, builds one transaction
//! and returns whether it changed anything.

use crate::document::{Document, Node};
use crate::inline::{self, Inline, Mark, MarkKind, Unit};
use crate::layout;
use crate::lists;
use crate::model::DocumentModel;
use crate::position::{BlockPath, DocPos, Selection};
use crate::transaction::{Step, TextKind, Transaction};

/// Horizontal or vertical movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the document start.
    Backward,
    /// Towards the document end.
    Forward,
}

fn commit<M: DocumentModel + ?Sized>(model: &mut M, tr: Transaction, what: &str) -> bool {
    match model.apply(tr) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("{what} rejected: {err}");
            false
        }
    }
}

fn select<M: DocumentModel + ?Sized>(model: &mut M, selection: Selection) -> bool {
    commit(model, Transaction::select(selection), "selection change")
}

fn content_of<'a>(doc: &'a Document, path: &BlockPath) -> &'a [Inline] {
    doc.inline_at(path).map(Vec::as_slice).unwrap_or(&[])
}

/// Marks a character typed at `pos` inherits: those of the character before it, else those of
/// the character after it.
pub fn marks_at(doc: &Document, pos: &DocPos) -> Vec<Mark> {
    let content = content_of(doc, &pos.path);
    let before = pos
        .offset
        .checked_sub(1)
        .and_then(|o| inline::unit_at(content, o));
    match before.or_else(|| inline::unit_at(content, pos.offset)) {
        Some(Unit::Char { marks, .. }) => marks.to_vec(),
        _ => Vec::new(),
    }
}

/// Replace the selection with `text`. Newlines split blocks. `marks` overrides the inherited
/// marks. Single-line typing is coalesced into one undo step.
pub fn insert_text<M: DocumentModel + ?Sized>(
    model: &mut M,
    text: &str,
    marks: Option<Vec<Mark>>,
) -> bool {
    if text.is_empty() {
        return false;
    }
    let selection = model.selection().clone();
    let from = selection.from().clone();
    let doc = model.document();
    let is_code = matches!(doc.node(&from.path), Some(Node::CodeBlock { .. }));
    let marks = if is_code {
        Vec::new()
    } else {
        marks.unwrap_or_else(|| marks_at(doc, &from))
    };

    let mut tr = Transaction::new();
    if !selection.is_collapsed() {
        tr.push(Step::DeleteRange {
            from: from.clone(),
            to: selection.to().clone(),
        });
    }

    let mut pos = from;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            tr.push(Step::SplitBlock { pos: pos.clone() });
            let next = pos.path.with_last(pos.path.last().unwrap_or(0) + 1);
            pos = DocPos::new(next, 0);
        }
        if !line.is_empty() {
            tr.push(Step::Insert {
                pos: pos.clone(),
                content: vec![Inline::marked(line, marks.clone())],
            });
            pos.offset += line.chars().count();
        }
    }

    let mut tr = tr.with_selection(Selection::caret(pos));
    if !text.contains('\n') {
        tr = tr.coalescing();
    }
    commit(model, tr, "text insertion")
}

/// Split the block at the caret (deleting a selection first).
pub fn split_block<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    let selection = model.selection().clone();
    let from = selection.from().clone();
    let mut tr = Transaction::new();
    if !selection.is_collapsed() {
        tr.push(Step::DeleteRange {
            from: from.clone(),
            to: selection.to().clone(),
        });
    }
    tr.push(Step::SplitBlock { pos: from.clone() });
    let next = from.path.with_last(from.path.last().unwrap_or(0) + 1);
    commit(
        model,
        tr.with_selection(Selection::caret(DocPos::new(next, 0))),
        "block split",
    )
}

/// Delete the selection. Returns `false` for a caret.
pub fn delete_selection<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    let selection = model.selection().clone();
    if selection.is_collapsed() {
        return false;
    }
    let from = selection.from().clone();
    let tr = Transaction::new()
        .step(Step::DeleteRange {
            from: from.clone(),
            to: selection.to().clone(),
        })
        .with_selection(Selection::caret(from));
    commit(model, tr, "range deletion")
}

/// Backspace: delete the selection, the grapheme before the caret, or join with the previous
/// block at a block start.
pub fn delete_backward<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    if delete_selection(model) {
        return true;
    }
    let head = model.selection().head.clone();
    let doc = model.document();

    let tr = if head.offset > 0 {
        let start = inline::prev_grapheme(content_of(doc, &head.path), head.offset);
        Transaction::new()
            .step(Step::Delete {
                path: head.path.clone(),
                from: start,
                to: head.offset,
            })
            .with_selection(Selection::caret(head.with_offset(start)))
    } else {
        let Some(prev) = doc.prev_text_block(&head.path) else {
            return false;
        };
        let end = doc.block_len(&prev);
        Transaction::new()
            .step(Step::JoinBackward {
                path: head.path.clone(),
            })
            .with_selection(Selection::caret(DocPos::new(prev, end)))
    };
    commit(model, tr, "backward deletion")
}

/// Delete: delete the selection, the grapheme after the caret, or pull the next block in at a
/// block end.
pub fn delete_forward<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    if delete_selection(model) {
        return true;
    }
    let head = model.selection().head.clone();
    let doc = model.document();
    let len = doc.block_len(&head.path);

    let tr = if head.offset < len {
        let end = inline::next_grapheme(content_of(doc, &head.path), head.offset);
        Transaction::new().step(Step::Delete {
            path: head.path.clone(),
            from: head.offset,
            to: end,
        })
    } else {
        let Some(next) = doc.next_text_block(&head.path) else {
            return false;
        };
        Transaction::new().step(Step::JoinBackward { path: next })
    };
    commit(model, tr.with_selection(Selection::caret(head)), "forward deletion")
}

fn with_head(selection: &Selection, head: DocPos, extend: bool) -> Selection {
    if extend {
        Selection::new(selection.anchor.clone(), head)
    } else {
        Selection::caret(head)
    }
}

/// Move the caret one grapheme, crossing block boundaries. `extend` keeps the anchor.
pub fn move_horizontal<M: DocumentModel + ?Sized>(
    model: &mut M,
    direction: Direction,
    extend: bool,
) -> bool {
    let selection = model.selection().clone();
    if !extend && !selection.is_collapsed() {
        let edge = match direction {
            Direction::Backward => selection.from().clone(),
            Direction::Forward => selection.to().clone(),
        };
        return select(model, Selection::caret(edge));
    }

    let doc = model.document();
    let head = &selection.head;
    let content = content_of(doc, &head.path);
    let target = match direction {
        Direction::Backward if head.offset > 0 => {
            head.with_offset(inline::prev_grapheme(content, head.offset))
        }
        Direction::Backward => match doc.prev_text_block(&head.path) {
            Some(prev) => {
                let end = doc.block_len(&prev);
                DocPos::new(prev, end)
            }
            None => return false,
        },
        Direction::Forward if head.offset < inline::content_len(content) => {
            head.with_offset(inline::next_grapheme(content, head.offset))
        }
        Direction::Forward => match doc.next_text_block(&head.path) {
            Some(next) => DocPos::new(next, 0),
            None => return false,
        },
    };
    select(model, with_head(&selection, target, extend))
}

/// Move the caret to the previous/next block, keeping its display column.
pub fn move_vertical<M: DocumentModel + ?Sized>(
    model: &mut M,
    direction: Direction,
    extend: bool,
) -> bool {
    let selection = model.selection().clone();
    let doc = model.document();
    let head = &selection.head;
    let column = layout::column_of(content_of(doc, &head.path), head.offset);
    let block = match direction {
        Direction::Backward => doc.prev_text_block(&head.path),
        Direction::Forward => doc.next_text_block(&head.path),
    };
    let target = match (block, direction) {
        (Some(path), _) => {
            let offset = layout::hit_test(content_of(doc, &path), column).offset;
            DocPos::new(path, offset)
        }
        (None, Direction::Backward) => head.with_offset(0),
        (None, Direction::Forward) => head.with_offset(doc.block_len(&head.path)),
    };
    select(model, with_head(&selection, target, extend))
}

/// Move the caret to the start or end of its block.
pub fn move_to_block_edge<M: DocumentModel + ?Sized>(
    model: &mut M,
    direction: Direction,
    extend: bool,
) -> bool {
    let selection = model.selection().clone();
    let head = &selection.head;
    let offset = match direction {
        Direction::Backward => 0,
        Direction::Forward => model.document().block_len(&head.path),
    };
    let target = head.with_offset(offset);
    select(model, with_head(&selection, target, extend))
}

/// Select the whole document.
pub fn select_all<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    let doc = model.document();
    let selection = Selection::new(doc.start(), doc.end());
    select(model, selection)
}

/// Select the word touching `pos`. Returns `false` when there is none.
pub fn select_word_at<M: DocumentModel + ?Sized>(model: &mut M, pos: &DocPos) -> bool {
    let (start, end) = inline::word_range_at(content_of(model.document(), &pos.path), pos.offset);
    if start == end {
        return false;
    }
    select(
        model,
        Selection::new(pos.with_offset(start), pos.with_offset(end)),
    )
}

/// Per-block `(path, from, to)` pieces of a selection, in reading order.
pub fn text_segments(doc: &Document, selection: &Selection) -> Vec<(BlockPath, usize, usize)> {
    let (from, to) = (selection.from(), selection.to());
    doc.text_blocks()
        .into_iter()
        .filter(|p| *p >= from.path && *p <= to.path)
        .map(|path| {
            let start = if path == from.path { from.offset } else { 0 };
            let end = if path == to.path {
                to.offset
            } else {
                doc.block_len(&path)
            };
            (path, start, end)
        })
        .collect()
}

fn mark_steps<M: DocumentModel + ?Sized>(
    model: &mut M,
    what: &str,
    step: impl Fn(BlockPath, usize, usize) -> Step,
) -> bool {
    let selection = model.selection().clone();
    if selection.is_collapsed() {
        return false;
    }
    let mut tr = Transaction::new().with_selection(selection.clone());
    for (path, from, to) in text_segments(model.document(), &selection) {
        if from < to {
            tr.push(step(path, from, to));
        }
    }
    commit(model, tr, what)
}

/// Returns `true` if every character of the selection carries a mark of `kind`.
pub fn selection_has_mark(doc: &Document, selection: &Selection, kind: MarkKind) -> bool {
    let mut saw_text = false;
    for (path, from, to) in text_segments(doc, selection) {
        let content = content_of(doc, &path);
        if inline::text_between(content, from, to).is_empty() {
            continue;
        }
        saw_text = true;
        if !inline::marks_cover(content, from, to, kind) {
            return false;
        }
    }
    saw_text
}

/// Add `mark` over the selection.
pub fn set_mark<M: DocumentModel + ?Sized>(model: &mut M, mark: &Mark) -> bool {
    mark_steps(model, "set mark", |path, from, to| Step::AddMark {
        path,
        from,
        to,
        mark: mark.clone(),
    })
}

/// Remove marks of `kind` from the selection.
pub fn unset_mark<M: DocumentModel + ?Sized>(model: &mut M, kind: MarkKind) -> bool {
    mark_steps(model, "unset mark", |path, from, to| Step::RemoveMark {
        path,
        from,
        to,
        kind,
    })
}

/// Remove `mark` when the whole selection already carries it, add it otherwise.
pub fn toggle_mark<M: DocumentModel + ?Sized>(model: &mut M, mark: &Mark) -> bool {
    if selection_has_mark(model.document(), model.selection(), mark.kind()) {
        unset_mark(model, mark.kind())
    } else {
        set_mark(model, mark)
    }
}

fn selected_blocks<M: DocumentModel + ?Sized>(model: &M) -> Vec<BlockPath> {
    text_segments(model.document(), model.selection())
        .into_iter()
        .map(|(path, _, _)| path)
        .collect()
}

fn convert_blocks<M: DocumentModel + ?Sized>(
    model: &mut M,
    what: &str,
    kind_for: impl Fn(&Node) -> TextKind,
) -> bool {
    let mut tr = Transaction::new();
    for path in selected_blocks(model) {
        if let Some(node) = model.document().node(&path) {
            tr.push(Step::SetBlockType {
                kind: kind_for(node),
                path,
            });
        }
    }
    if tr.is_empty() {
        return false;
    }
    commit(model, tr, what)
}

/// Turn the selected blocks into headings of `level`, keeping collapsible headings collapsible.
pub fn set_heading<M: DocumentModel + ?Sized>(model: &mut M, level: u8) -> bool {
    let level = level.clamp(1, 6);
    convert_blocks(model, "set heading", |node| match node {
        Node::CollapsibleHeading { .. } => TextKind::CollapsibleHeading(level),
        _ => TextKind::Heading(level),
    })
}

/// Turn the selected blocks into paragraphs.
pub fn set_paragraph<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    convert_blocks(model, "set paragraph", |_| TextKind::Paragraph)
}

/// Headings of `level` become paragraphs; anything else becomes a heading of `level`.
pub fn toggle_heading<M: DocumentModel + ?Sized>(model: &mut M, level: u8) -> bool {
    let level = level.clamp(1, 6);
    let all_match = {
        let doc = model.document();
        let blocks = selected_blocks(model);
        !blocks.is_empty()
            && blocks
                .iter()
                .all(|p| doc.node(p).and_then(Node::heading_level) == Some(level))
    };
    if all_match {
        set_paragraph(model)
    } else {
        set_heading(model, level)
    }
}

/// Fold or unfold the collapsible heading at the caret.
pub fn toggle_collapsed<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    let path = model.selection().from().path.clone();
    let Some(Node::CollapsibleHeading { collapsed, .. }) = model.document().node(&path) else {
        return false;
    };
    let tr = Transaction::new().step(Step::SetCollapsed {
        collapsed: !*collapsed,
        path,
    });
    commit(model, tr, "toggle collapsed")
}

fn rebase(pos: &DocPos, old_item: &BlockPath, new_item: &BlockPath) -> DocPos {
    let mut indices = new_item.indices().to_vec();
    indices.extend_from_slice(&pos.path.indices()[old_item.depth()..]);
    DocPos::new(indices, pos.offset)
}

fn move_list_item<M: DocumentModel + ?Sized>(model: &mut M, sink: bool) -> bool {
    let selection = model.selection().clone();
    let doc = model.document();
    let Some(item) = lists::enclosing_item(doc, &selection.from().path) else {
        return false;
    };

    // Dry run to learn where the item ends up.
    let mut preview = doc.clone();
    let moved = if sink {
        lists::sink_item(&mut preview, &item)
    } else {
        lists::lift_item(&mut preview, &item)
    };
    let new_item = match moved {
        Ok(path) => path,
        Err(err) => {
            log::trace!("list item move declined: {err}");
            return false;
        }
    };

    let inside = |pos: &DocPos| item.contains(&pos.path);
    let new_selection = if inside(&selection.anchor) && inside(&selection.head) {
        Selection::new(
            rebase(&selection.anchor, &item, &new_item),
            rebase(&selection.head, &item, &new_item),
        )
    } else {
        Selection::caret(rebase(selection.from(), &item, &new_item))
    };

    let step = if sink {
        Step::SinkListItem { path: item }
    } else {
        Step::LiftListItem { path: item }
    };
    commit(
        model,
        Transaction::new().step(step).with_selection(new_selection),
        "list item move",
    )
}

/// Nest the list item at the caret into its previous sibling.
pub fn sink_list_item<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    move_list_item(model, true)
}

/// Move the nested list item at the caret out one level.
pub fn lift_list_item<M: DocumentModel + ?Sized>(model: &mut M) -> bool {
    move_list_item(model, false)
}
