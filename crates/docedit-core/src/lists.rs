//! List item nesting (sink) and un-nesting (lift).

use crate::document::{Document, DocumentError, Node};
use crate::position::BlockPath;

/// Path of the innermost list item containing `path` (which may be the item itself).
pub fn enclosing_item(doc: &Document, path: &BlockPath) -> Option<BlockPath> {
    (1..=path.depth())
        .rev()
        .map(|depth| path.prefix(depth))
        .find(|prefix| matches!(doc.node(prefix), Some(Node::ListItem { .. })))
}

/// Nest the item at `item` into a list at the end of its previous sibling.
///
/// Returns the item's new path. The first item of a list cannot be nested.
pub fn sink_item(doc: &mut Document, item: &BlockPath) -> Result<BlockPath, DocumentError> {
    let index = item_index(doc, item)?;
    if index == 0 {
        return Err(DocumentError::NotListItem(item.clone()));
    }
    let list_path = item
        .parent()
        .ok_or_else(|| DocumentError::NotListItem(item.clone()))?;
    let list = doc
        .node_mut(&list_path)
        .ok_or_else(|| DocumentError::InvalidPath(list_path.clone()))?;
    let nested_kind = match list {
        Node::OrderedList { .. } => Node::ordered_list(Vec::new()),
        _ => Node::bullet_list(Vec::new()),
    };
    let Some(items) = list.children_mut() else {
        return Err(DocumentError::NotListItem(item.clone()));
    };

    let moved = items.remove(index);
    let prev_path = item.with_last(index - 1);
    let Some(prev_children) = items.get_mut(index - 1).and_then(Node::children_mut) else {
        return Err(DocumentError::NotListItem(prev_path));
    };

    // Reuse a trailing sub-list of the same kind.
    let reuse = prev_children
        .last()
        .is_some_and(|last| last.type_name() == nested_kind.type_name());
    if !reuse {
        prev_children.push(nested_kind);
    }
    let sub_index = prev_children.len() - 1;
    let Some(sub_items) = prev_children[sub_index].children_mut() else {
        return Err(DocumentError::NotListItem(prev_path));
    };
    sub_items.push(moved);
    let new_index = sub_items.len() - 1;

    log::debug!("sink list item {} -> {}", item, prev_path.child(sub_index).child(new_index));
    Ok(prev_path.child(sub_index).child(new_index))
}

/// Move the item at `item` out of its nested list, right after the item that contains it.
///
/// Returns the item's new path. Items of a top-level list cannot be lifted.
pub fn lift_item(doc: &mut Document, item: &BlockPath) -> Result<BlockPath, DocumentError> {
    let index = item_index(doc, item)?;
    let list_path = item
        .parent()
        .ok_or_else(|| DocumentError::NotListItem(item.clone()))?;
    let outer_item = list_path
        .parent()
        .filter(|p| matches!(doc.node(p), Some(Node::ListItem { .. })))
        .ok_or_else(|| DocumentError::NotListItem(item.clone()))?;
    let outer_index = outer_item
        .last()
        .ok_or_else(|| DocumentError::NotListItem(item.clone()))?;

    let list = doc
        .node_mut(&list_path)
        .and_then(Node::children_mut)
        .ok_or_else(|| DocumentError::InvalidPath(list_path.clone()))?;
    let moved = list.remove(index);
    let list_now_empty = list.is_empty();

    if list_now_empty {
        let holder = doc
            .node_mut(&outer_item)
            .and_then(Node::children_mut)
            .ok_or_else(|| DocumentError::InvalidPath(outer_item.clone()))?;
        if let Some(pos) = list_path.last()
            && pos < holder.len()
        {
            holder.remove(pos);
        }
    }

    let outer_list = doc
        .siblings_mut(&outer_item)
        .ok_or_else(|| DocumentError::InvalidPath(outer_item.clone()))?;
    outer_list.insert(outer_index + 1, moved);

    let new_path = outer_item.with_last(outer_index + 1);
    log::debug!("lift list item {} -> {}", item, new_path);
    Ok(new_path)
}

fn item_index(doc: &Document, item: &BlockPath) -> Result<usize, DocumentError> {
    match doc.node(item) {
        Some(Node::ListItem { .. }) => item
            .last()
            .ok_or_else(|| DocumentError::NotListItem(item.clone())),
        Some(_) => Err(DocumentError::NotListItem(item.clone())),
        None => Err(DocumentError::InvalidPath(item.clone())),
    }
}
