#![warn(missing_docs)]
//! Docedit Core - Headless Structured-Document Editing Engine
//!
//! # Overview
//!
//! `docedit-core` is the editing engine behind a rich-text document editor. It owns no view: the
//! host renders blocks and inline runs however it likes and feeds raw key, pointer and
//! `beforeinput` events back in. The engine decides what each event means for block indentation,
//! tab tokens and undo.
//!
//! # Core Features
//!
//! - **Indent State Machine**: per-block `(level, first-line-only)` pair with exact increase and
//!   decrease transitions, levels 0–9
//! - **Atomic Tab Token**: a fixed-width inline unit that moves, selects and deletes as one
//! - **Key Router**: intercepts Tab, Shift-Tab, Backspace, arrows and `Mod-z` before the default
//!   editing behavior, declining everything it does not own
//! - **Undo Boundary Guard**: a structural SHA-256 fingerprint that stops undo at the loaded
//!   content
//! - **Default Editing**: typing, split/join, grapheme movement, marks, headings, list nesting
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Editor facade & Commands                   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Key Router (keys, pointer, deferred)       │  ← Event Interception
//! ├─────────────────────────────────────────────┤
//! │  Indent / Tab Token / Undo Guard            │  ← Editing Semantics
//! ├─────────────────────────────────────────────┤
//! │  DocumentModel (transactions, history)      │  ← State
//! ├─────────────────────────────────────────────┤
//! │  Document tree & inline content             │  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use docedit_core::{Document, Editor, Indentable, Key, KeyEvent};
//!
//! let mut editor = Editor::with_document(Document::from_text("World"), Default::default());
//!
//! // Tab at the block start indents; Tab inside text inserts a token.
//! editor.handle_key(&KeyEvent::plain(Key::Tab));
//! editor.handle_key(&KeyEvent::plain(Key::ArrowRight));
//! editor.handle_key(&KeyEvent::plain(Key::Tab));
//!
//! let indent = editor.document().content[0].indent().unwrap_or_default();
//! assert_eq!(indent.level(), 1);
//! assert_eq!(editor.document().block_len(&vec![0].into()), 6);
//! ```
//!
//! # Module Description
//!
//! - [`document`] - Block tree, structural JSON form
//! - [`inline`] - Text runs, marks and tab tokens
//! - [`transaction`] - Atomic, position-addressed edits
//! - [`model`] - The [`DocumentModel`] trait and its in-memory implementation
//! - [`indent`] - Indent state machine
//! - [`tab`] - Tab token operations
//! - [`router`] - Key and pointer interception
//! - [`fingerprint`] - Structural fingerprint and undo guard
//! - [`commands`] - Command enums and the [`Editor`] facade

pub mod commands;
pub mod deferred;
pub mod document;
pub mod editing;
pub mod fingerprint;
pub mod history;
pub mod indent;
pub mod inline;
pub mod keys;
pub mod layout;
pub mod lists;
pub mod model;
pub mod pointer;
pub mod position;
pub mod resolve;
pub mod router;
pub mod stats;
pub mod tab;
pub mod transaction;

pub use commands::{
    Command, CursorCommand, EditCommand, Editor, FormatCommand, HistoryCommand,
};
pub use deferred::{CorrectionOutcome, ScheduledCorrection};
pub use document::{Document, DocumentError, Node};
pub use fingerprint::{Fingerprint, UndoGuard};
pub use history::{Snapshot, UndoHistory};
pub use indent::{
    IndentChange, IndentMetrics, IndentState, Indentable, decrease_indent, increase_indent,
    set_indent,
};
pub use inline::{Inline, Mark, MarkKind, TabAttrs, Unit};
pub use keys::{InputEvent, InputType, Key, KeyEvent, KeyParseError, Modifiers};
pub use model::{DocumentModel, EditorState};
pub use pointer::{HitPoint, MouseButton, PointerEvent, PointerState};
pub use position::{BlockPath, DocPos, Selection};
pub use resolve::{CursorContext, ResolvedPos};
pub use router::{EditorContext, KeyRouter};
pub use stats::DocumentStats;
pub use tab::insert_tab;
pub use transaction::{Step, TextKind, Transaction};

pub use docedit_config::EditorConfig;
