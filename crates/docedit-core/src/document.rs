//! Block tree of a structured document.
//!
//! A [`Document`] is a list of block [`Node`]s. Text blocks (paragraphs, headings, code blocks)
//! hold [`Inline`] content; container blocks (blockquotes, lists, list items) hold further
//! blocks. Text blocks are always leaves, so walking the tree depth-first visits them in reading
//! order.

use crate::indent::{IndentState, Indentable};
use crate::inline::{self, Inline};
use crate::position::{BlockPath, DocPos};
use docedit_config::{BlockType, IndentConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or mutating a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// No node exists at the path.
    #[error("no node at {0}")]
    InvalidPath(BlockPath),
    /// Offset past the end of the block.
    #[error("offset {offset} out of range at {path} (length {len})")]
    InvalidOffset {
        /// Block path.
        path: BlockPath,
        /// Requested offset.
        offset: usize,
        /// Block length.
        len: usize,
    },
    /// The node holds blocks rather than inline content.
    #[error("{0} is not a text block")]
    NotTextBlock(BlockPath),
    /// Tab tokens cannot be placed in this block (code blocks).
    #[error("tab tokens are not allowed in {0}")]
    TokenNotAllowed(BlockPath),
    /// The node carries no indent attributes.
    #[error("{0} is not indentable")]
    NotIndentable(BlockPath),
    /// The node is not a heading.
    #[error("{0} is not a heading")]
    NotHeading(BlockPath),
    /// The node is not inside a list item.
    #[error("{0} is not inside a list item")]
    NotListItem(BlockPath),
    /// Two blocks cannot be joined.
    #[error("cannot join {0} with the previous block")]
    CannotJoin(BlockPath),
    /// JSON (de)serialization failure.
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_heading_level() -> u8 {
    1
}

fn default_list_start() -> u32 {
    1
}

/// A block node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// Plain paragraph.
    Paragraph {
        /// Indent attributes.
        #[serde(flatten)]
        indent: IndentState,
        /// Inline content.
        #[serde(default)]
        content: Vec<Inline>,
    },
    /// Heading, levels 1-6.
    Heading {
        /// Heading level.
        #[serde(default = "default_heading_level")]
        level: u8,
        /// Indent attributes.
        #[serde(flatten)]
        indent: IndentState,
        /// Inline content.
        #[serde(default)]
        content: Vec<Inline>,
    },
    /// Heading whose following section can be folded away.
    CollapsibleHeading {
        /// Heading level.
        #[serde(default = "default_heading_level")]
        level: u8,
        /// Whether the section is folded.
        #[serde(default)]
        collapsed: bool,
        /// Indent attributes.
        #[serde(flatten)]
        indent: IndentState,
        /// Inline content.
        #[serde(default)]
        content: Vec<Inline>,
    },
    /// Code block. Holds plain text runs only.
    CodeBlock {
        /// Language hint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        /// Inline content (text runs only).
        #[serde(default)]
        content: Vec<Inline>,
    },
    /// Quotation.
    Blockquote {
        /// Child blocks.
        #[serde(default)]
        content: Vec<Node>,
    },
    /// Unordered list.
    BulletList {
        /// List items.
        #[serde(default)]
        content: Vec<Node>,
    },
    /// Ordered list.
    OrderedList {
        /// Number of the first item.
        #[serde(default = "default_list_start")]
        start: u32,
        /// List items.
        #[serde(default)]
        content: Vec<Node>,
    },
    /// One list item.
    ListItem {
        /// Child blocks.
        #[serde(default)]
        content: Vec<Node>,
    },
}

impl Node {
    /// Paragraph with the given content.
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Node::Paragraph {
            indent: IndentState::NONE,
            content,
        }
    }

    /// Paragraph holding plain text.
    pub fn text_paragraph(text: &str) -> Self {
        Self::paragraph(text_content(text))
    }

    /// Heading with the given level (clamped to 1-6).
    pub fn heading(level: u8, content: Vec<Inline>) -> Self {
        Node::Heading {
            level: level.clamp(1, 6),
            indent: IndentState::NONE,
            content,
        }
    }

    /// Expanded collapsible heading.
    pub fn collapsible_heading(level: u8, content: Vec<Inline>) -> Self {
        Node::CollapsibleHeading {
            level: level.clamp(1, 6),
            collapsed: false,
            indent: IndentState::NONE,
            content,
        }
    }

    /// Code block holding plain text.
    pub fn code_block(text: &str) -> Self {
        Node::CodeBlock {
            language: None,
            content: text_content(text),
        }
    }

    /// Blockquote.
    pub fn blockquote(content: Vec<Node>) -> Self {
        Node::Blockquote { content }
    }

    /// Bullet list.
    pub fn bullet_list(items: Vec<Node>) -> Self {
        Node::BulletList { content: items }
    }

    /// Ordered list starting at 1.
    pub fn ordered_list(items: Vec<Node>) -> Self {
        Node::OrderedList {
            start: 1,
            content: items,
        }
    }

    /// List item.
    pub fn list_item(content: Vec<Node>) -> Self {
        Node::ListItem { content }
    }

    /// Same node with the given indent state. Nodes without indent attributes are returned
    /// unchanged.
    pub fn with_indent(mut self, state: IndentState) -> Self {
        self.set_indent(state);
        self
    }

    /// Type name as it appears in the structural serialization.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::CollapsibleHeading { .. } => "collapsibleHeading",
            Node::CodeBlock { .. } => "codeBlock",
            Node::Blockquote { .. } => "blockquote",
            Node::BulletList { .. } => "bulletList",
            Node::OrderedList { .. } => "orderedList",
            Node::ListItem { .. } => "listItem",
        }
    }

    /// Allow-list key of this node, `None` for nodes that never carry indentation.
    pub fn block_type(&self) -> Option<BlockType> {
        match self {
            Node::Paragraph { .. } => Some(BlockType::Paragraph),
            Node::Heading { .. } => Some(BlockType::Heading),
            Node::CollapsibleHeading { .. } => Some(BlockType::CollapsibleHeading),
            _ => None,
        }
    }

    /// Returns `true` if the node carries indent attributes and its type is on the allow-list.
    pub fn is_indentable(&self, config: &IndentConfig) -> bool {
        self.indent().is_some() && self.block_type().is_some_and(|ty| config.allows(ty))
    }

    /// Returns `true` for nodes with inline content.
    pub fn is_text_block(&self) -> bool {
        self.inline().is_some()
    }

    /// Returns `true` for list containers.
    pub fn is_list(&self) -> bool {
        matches!(self, Node::BulletList { .. } | Node::OrderedList { .. })
    }

    /// Returns `true` for headings of either kind.
    pub fn is_heading(&self) -> bool {
        matches!(self, Node::Heading { .. } | Node::CollapsibleHeading { .. })
    }

    /// Returns `true` if atomic tab tokens may appear in this node's content.
    pub fn allows_tabs(&self) -> bool {
        self.is_text_block() && !matches!(self, Node::CodeBlock { .. })
    }

    /// Heading level, `None` for non-headings.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Node::Heading { level, .. } | Node::CollapsibleHeading { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// Inline content of a text block.
    pub fn inline(&self) -> Option<&Vec<Inline>> {
        match self {
            Node::Paragraph { content, .. }
            | Node::Heading { content, .. }
            | Node::CollapsibleHeading { content, .. }
            | Node::CodeBlock { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Mutable inline content of a text block.
    pub fn inline_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Node::Paragraph { content, .. }
            | Node::Heading { content, .. }
            | Node::CollapsibleHeading { content, .. }
            | Node::CodeBlock { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Child blocks of a container.
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Blockquote { content }
            | Node::BulletList { content }
            | Node::OrderedList { content, .. }
            | Node::ListItem { content } => Some(content),
            _ => None,
        }
    }

    /// Mutable child blocks of a container.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Blockquote { content }
            | Node::BulletList { content }
            | Node::OrderedList { content, .. }
            | Node::ListItem { content } => Some(content),
            _ => None,
        }
    }

    /// Number of content units of a text block (0 for containers).
    pub fn content_len(&self) -> usize {
        self.inline().map(|c| inline::content_len(c)).unwrap_or(0)
    }

    /// Empty text block that continues this one after a split.
    ///
    /// The new block never inherits indentation. Splitting a heading at its end continues with a
    /// paragraph.
    pub fn split_off_type(&self, at_end: bool) -> Node {
        match self {
            Node::Heading { level, .. } if !at_end => Node::heading(*level, Vec::new()),
            Node::CollapsibleHeading { level, .. } if !at_end => {
                Node::collapsible_heading(*level, Vec::new())
            }
            Node::CodeBlock { language, .. } => Node::CodeBlock {
                language: language.clone(),
                content: Vec::new(),
            },
            _ => Node::paragraph(Vec::new()),
        }
    }

    fn normalize(&mut self) {
        match self {
            Node::Heading { level, content, .. }
            | Node::CollapsibleHeading { level, content, .. } => {
                *level = (*level).clamp(1, 6);
                inline::normalize(content);
            }
            Node::Paragraph { content, .. } => inline::normalize(content),
            Node::CodeBlock { content, .. } => {
                // Code keeps tab characters as text.
                for run in content.iter_mut() {
                    if run.is_tab() {
                        *run = Inline::text("\t");
                    } else if let Inline::Text { marks, .. } = run {
                        marks.clear();
                    }
                }
                inline::normalize(content);
            }
            Node::BulletList { content } | Node::OrderedList { content, .. } => {
                let mut items = Vec::with_capacity(content.len());
                for child in content.drain(..) {
                    match child {
                        item @ Node::ListItem { .. } => items.push(item),
                        other => items.push(Node::list_item(vec![other])),
                    }
                }
                *content = items;
                if content.is_empty() {
                    content.push(Node::list_item(Vec::new()));
                }
                content.iter_mut().for_each(Node::normalize);
            }
            Node::Blockquote { content } | Node::ListItem { content } => {
                lift_stray_items(content);
                if content.is_empty() {
                    content.push(Node::paragraph(Vec::new()));
                }
                content.iter_mut().for_each(Node::normalize);
            }
        }
    }
}

impl Indentable for Node {
    fn indent(&self) -> Option<IndentState> {
        match self {
            Node::Paragraph { indent, .. }
            | Node::Heading { indent, .. }
            | Node::CollapsibleHeading { indent, .. } => Some(*indent),
            _ => None,
        }
    }

    fn set_indent(&mut self, state: IndentState) -> bool {
        match self {
            Node::Paragraph { indent, .. }
            | Node::Heading { indent, .. }
            | Node::CollapsibleHeading { indent, .. } => {
                *indent = state;
                true
            }
            _ => false,
        }
    }
}

/// Replace list items found outside a list with their children.
fn lift_stray_items(content: &mut Vec<Node>) {
    while content.iter().any(|node| matches!(node, Node::ListItem { .. })) {
        let mut out = Vec::with_capacity(content.len());
        for node in content.drain(..) {
            match node {
                Node::ListItem { content: children } => out.extend(children),
                other => out.push(other),
            }
        }
        *content = out;
    }
}

fn text_content(text: &str) -> Vec<Inline> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Inline::text(text)]
    }
}

/// A structured document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level blocks.
    #[serde(default)]
    pub content: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Document {
    /// Create a normalized document. An empty block list becomes one empty paragraph.
    pub fn new(content: Vec<Node>) -> Self {
        let mut doc = Self { content };
        doc.normalize();
        doc
    }

    /// Document made of one plain paragraph per line of `text`.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split('\n').map(Node::text_paragraph).collect())
    }

    /// Parse and normalize a document from its JSON structure.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let mut doc: Document = serde_json::from_str(json)?;
        doc.normalize();
        Ok(doc)
    }

    /// Structural serialization (node types, attributes, marks and text) as compact JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Bring the tree into canonical form: merged text runs, list items inside lists, no empty
    /// containers, no tokens in code.
    pub fn normalize(&mut self) {
        lift_stray_items(&mut self.content);
        if self.content.is_empty() {
            self.content.push(Node::paragraph(Vec::new()));
        }
        self.content.iter_mut().for_each(Node::normalize);
    }

    /// Node at `path`.
    pub fn node(&self, path: &BlockPath) -> Option<&Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.content.get(*first)?;
        for &index in rest {
            node = node.children()?.get(index)?;
        }
        Some(node)
    }

    /// Mutable node at `path`.
    pub fn node_mut(&mut self, path: &BlockPath) -> Option<&mut Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.content.get_mut(*first)?;
        for &index in rest {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Sibling list that contains the node at `path` (the top-level list for top-level nodes).
    pub fn siblings_mut(&mut self, path: &BlockPath) -> Option<&mut Vec<Node>> {
        match path.parent() {
            None => Some(&mut self.content),
            Some(parent) => self.node_mut(&parent)?.children_mut(),
        }
    }

    /// Text block at `path`.
    pub fn text_block(&self, path: &BlockPath) -> Result<&Node, DocumentError> {
        let node = self
            .node(path)
            .ok_or_else(|| DocumentError::InvalidPath(path.clone()))?;
        if node.is_text_block() {
            Ok(node)
        } else {
            Err(DocumentError::NotTextBlock(path.clone()))
        }
    }

    /// Inline content of the text block at `path`.
    pub fn inline_at(&self, path: &BlockPath) -> Result<&Vec<Inline>, DocumentError> {
        self.text_block(path)?
            .inline()
            .ok_or_else(|| DocumentError::NotTextBlock(path.clone()))
    }

    /// Mutable inline content of the text block at `path`.
    pub fn inline_at_mut(&mut self, path: &BlockPath) -> Result<&mut Vec<Inline>, DocumentError> {
        self.node_mut(path)
            .ok_or_else(|| DocumentError::InvalidPath(path.clone()))?
            .inline_mut()
            .ok_or_else(|| DocumentError::NotTextBlock(path.clone()))
    }

    /// Check that `pos` addresses a text block and lies within it.
    pub fn check_pos(&self, pos: &DocPos) -> Result<(), DocumentError> {
        let len = inline::content_len(self.inline_at(&pos.path)?);
        if pos.offset > len {
            return Err(DocumentError::InvalidOffset {
                path: pos.path.clone(),
                offset: pos.offset,
                len,
            });
        }
        Ok(())
    }

    /// Paths of every text block in reading order.
    pub fn text_blocks(&self) -> Vec<BlockPath> {
        fn walk(nodes: &[Node], prefix: &BlockPath, out: &mut Vec<BlockPath>) {
            for (index, node) in nodes.iter().enumerate() {
                let path = prefix.child(index);
                if node.is_text_block() {
                    out.push(path);
                } else if let Some(children) = node.children() {
                    walk(children, &path, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.content, &BlockPath::default(), &mut out);
        out
    }

    /// First text block.
    pub fn first_text_block(&self) -> Option<BlockPath> {
        self.text_blocks().into_iter().next()
    }

    /// Last text block.
    pub fn last_text_block(&self) -> Option<BlockPath> {
        self.text_blocks().into_iter().last()
    }

    /// Text block before `path` in reading order.
    pub fn prev_text_block(&self, path: &BlockPath) -> Option<BlockPath> {
        self.text_blocks().into_iter().rev().find(|p| p < path)
    }

    /// Text block after `path` in reading order.
    pub fn next_text_block(&self, path: &BlockPath) -> Option<BlockPath> {
        self.text_blocks().into_iter().find(|p| p > path)
    }

    /// Caret position at the very start of the document.
    pub fn start(&self) -> DocPos {
        DocPos::new(self.first_text_block().unwrap_or_default(), 0)
    }

    /// Caret position at the very end of the document.
    pub fn end(&self) -> DocPos {
        match self.last_text_block() {
            Some(path) => {
                let len = self.node(&path).map(Node::content_len).unwrap_or(0);
                DocPos::new(path, len)
            }
            None => DocPos::new(BlockPath::default(), 0),
        }
    }

    /// Content length of the text block at `path` (0 when it does not exist).
    pub fn block_len(&self, path: &BlockPath) -> usize {
        self.node(path).map(Node::content_len).unwrap_or(0)
    }

    /// Text of every text block joined by newlines, tokens left out.
    pub fn plain_text(&self) -> String {
        self.text_blocks()
            .iter()
            .filter_map(|path| self.node(path)?.inline())
            .map(|content| inline::plain_text(content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> Document {
        Document::new(vec![
            Node::text_paragraph("intro"),
            Node::bullet_list(vec![
                Node::list_item(vec![Node::text_paragraph("one")]),
                Node::list_item(vec![
                    Node::text_paragraph("two"),
                    Node::bullet_list(vec![Node::list_item(vec![Node::text_paragraph("deep")])]),
                ]),
            ]),
            Node::code_block("let x = 1;"),
        ])
    }

    #[test]
    fn test_text_blocks_in_reading_order() {
        let doc = nested();
        let paths: Vec<String> = doc.text_blocks().iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["/0", "/1/0/0", "/1/1/0", "/1/1/1/0/0", "/2"]);
        assert_eq!(doc.plain_text(), "intro\none\ntwo\ndeep\nlet x = 1;");
    }

    #[test]
    fn test_prev_next_text_block() {
        let doc = nested();
        let two = BlockPath::new(vec![1, 1, 0]);
        assert_eq!(doc.prev_text_block(&two), Some(BlockPath::new(vec![1, 0, 0])));
        assert_eq!(doc.next_text_block(&two), Some(BlockPath::new(vec![1, 1, 1, 0, 0])));
        assert_eq!(doc.prev_text_block(&BlockPath::root(0)), None);
    }

    #[test]
    fn test_json_shape_and_flattened_indent() {
        let doc = Document::new(vec![
            Node::text_paragraph("Hi").with_indent(IndentState::new(3, true)),
        ]);
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": [{
                    "type": "paragraph",
                    "indent": 3,
                    "textIndentOnly": true,
                    "content": [{ "type": "text", "text": "Hi" }]
                }]
            })
        );
    }

    #[test]
    fn test_from_json_normalizes() {
        let doc = Document::from_json(
            r#"{ "content": [
                { "type": "paragraph", "indent": 14, "textIndentOnly": true,
                  "content": [ { "type": "text", "text": "a" }, { "type": "text", "text": "b" } ] },
                { "type": "codeBlock", "content": [ { "type": "tab" } ] },
                { "type": "bulletList", "content": [] }
            ] }"#,
        )
        .unwrap();

        let first = &doc.content[0];
        assert_eq!(first.indent(), Some(IndentState::new(9, true)));
        assert_eq!(first.inline().unwrap(), &vec![Inline::text("ab")]);
        assert_eq!(doc.content[1].inline().unwrap(), &vec![Inline::text("\t")]);
        assert_eq!(doc.text_blocks().len(), 3);
    }

    #[test]
    fn test_indentable_respects_allow_list() {
        let mut config = IndentConfig::default();
        let heading = Node::heading(2, Vec::new());
        assert!(heading.is_indentable(&config));
        config.types = vec![BlockType::Paragraph];
        assert!(!heading.is_indentable(&config));
        assert!(!Node::code_block("").is_indentable(&IndentConfig::default()));
    }

    #[test]
    fn test_empty_document_gets_a_paragraph() {
        let doc = Document::default();
        assert_eq!(doc.text_blocks(), vec![BlockPath::root(0)]);
        assert_eq!(doc.start(), doc.end());
    }

    #[test]
    fn test_stray_list_items_keep_their_content() {
        let doc = Document::from_json(
            r#"{ "content": [
                { "type": "listItem", "content": [
                    { "type": "paragraph", "content": [ { "type": "text", "text": "top" } ] }
                ] },
                { "type": "blockquote", "content": [
                    { "type": "listItem", "content": [
                        { "type": "listItem", "content": [
                            { "type": "paragraph",
                              "content": [ { "type": "text", "text": "quoted" } ] }
                        ] }
                    ] }
                ] }
            ] }"#,
        )
        .unwrap();

        assert_eq!(doc.plain_text(), "top\nquoted");
        assert_eq!(doc.content[0], Node::text_paragraph("top"));
        assert_eq!(
            doc.content[1],
            Node::blockquote(vec![Node::text_paragraph("quoted")])
        );
    }
}
