//! Document positions and selections.
//!
//! A position addresses a *text block* through a [`BlockPath`] (child indices from the document
//! root down to the block) plus an offset into the block's flattened inline content. Every
//! character counts as one unit and every atomic tab token counts as one unit, so a token can
//! never be entered by an offset.

use std::fmt;

/// Child indices from the document root down to a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockPath(Vec<usize>);

impl BlockPath {
    /// Create a path from raw indices.
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Path of a top-level block.
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Raw indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of steps (the depth of the addressed node, top-level blocks have depth 1).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path of the parent node, `None` for top-level blocks.
    pub fn parent(&self) -> Option<BlockPath> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Index of the addressed node within its parent.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> BlockPath {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the sibling at `index` (same parent).
    pub fn with_last(&self, index: usize) -> BlockPath {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last = index;
        }
        Self(indices)
    }

    /// Prefix of length `depth`.
    pub fn prefix(&self, depth: usize) -> BlockPath {
        Self(self.0[..depth.min(self.0.len())].to_vec())
    }

    /// Returns `true` if `self` is `other` or one of its ancestors.
    pub fn contains(&self, other: &BlockPath) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for BlockPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

/// A caret position inside a text block.
///
/// Positions order in document order: text blocks are leaves of the tree, so comparing their
/// paths lexicographically visits them in reading order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocPos {
    /// Path of the text block.
    pub path: BlockPath,
    /// Offset into the block's flattened content (characters and tokens count 1).
    pub offset: usize,
}

impl DocPos {
    /// Create a new position.
    pub fn new(path: impl Into<BlockPath>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    /// Same block, different offset.
    pub fn with_offset(&self, offset: usize) -> Self {
        Self {
            path: self.path.clone(),
            offset,
        }
    }
}

impl fmt::Display for DocPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.offset)
    }
}

/// Selection range (anchor stays put, head moves).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Fixed end.
    pub anchor: DocPos,
    /// Moving end (the caret).
    pub head: DocPos,
}

impl Selection {
    /// Create a range selection.
    pub fn new(anchor: DocPos, head: DocPos) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (a caret).
    pub fn caret(pos: DocPos) -> Self {
        Self {
            anchor: pos.clone(),
            head: pos,
        }
    }

    /// Returns `true` if anchor and head coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Start of the range in document order.
    pub fn from(&self) -> &DocPos {
        if self.anchor <= self.head {
            &self.anchor
        } else {
            &self.head
        }
    }

    /// End of the range in document order.
    pub fn to(&self) -> &DocPos {
        if self.anchor <= self.head {
            &self.head
        } else {
            &self.anchor
        }
    }

    /// Returns `true` if both ends lie in the same block.
    pub fn is_single_block(&self) -> bool {
        self.anchor.path == self.head.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_order_in_reading_order() {
        let a = DocPos::new(vec![0], 5);
        let b = DocPos::new(vec![1, 0, 0], 0);
        let c = DocPos::new(vec![1, 0, 1], 0);
        let d = DocPos::new(vec![2], 0);
        assert!(a < b && b < c && c < d);
    }

    #[test]
    fn test_selection_from_to() {
        let sel = Selection::new(DocPos::new(vec![1], 2), DocPos::new(vec![0], 7));
        assert_eq!(sel.from(), &DocPos::new(vec![0], 7));
        assert_eq!(sel.to(), &DocPos::new(vec![1], 2));
        assert!(!sel.is_collapsed());
        assert!(!sel.is_single_block());
    }

    #[test]
    fn test_path_helpers() {
        let path = BlockPath::new(vec![2, 1, 0]);
        assert_eq!(path.parent(), Some(BlockPath::new(vec![2, 1])));
        assert_eq!(path.with_last(3), BlockPath::new(vec![2, 1, 3]));
        assert!(BlockPath::new(vec![2]).contains(&path));
        assert_eq!(path.to_string(), "/2/1/0");
        assert_eq!(BlockPath::root(0).parent(), None);
    }
}
