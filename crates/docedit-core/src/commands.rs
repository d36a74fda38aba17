//! Command interface and the editor facade.
//!
//! [`Editor`] owns an [`EditorState`], a [`KeyRouter`] and an [`UndoGuard`]. Raw events go to the
//! router first; whatever it declines is handled by the default editing behavior in
//! [`crate::editing`]. Hosts that drive the editor programmatically use [`Editor::execute`] with a
//! [`Command`].

use crate::document::{Document, DocumentError};
use crate::editing::{self, Direction};
use crate::fingerprint::{Fingerprint, UndoGuard};
use crate::indent;
use crate::inline::{self, Mark, MarkKind};
use crate::keys::{InputEvent, InputType, Key, KeyEvent, Modifiers};
use crate::model::{DocumentModel, EditorState};
use crate::pointer::{MouseButton, PointerEvent};
use crate::position::Selection;
use crate::router::{EditorContext, KeyRouter};
use crate::stats::{self, DocumentStats};
use crate::tab;
use docedit_config::EditorConfig;

/// Text and structure editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Replace the selection with text (newlines split blocks)
    InsertText(String),
    /// Insert an atomic tab token at the caret
    InsertTab,
    /// Split the block at the caret
    SplitBlock,
    /// Delete backward (grapheme, selection or block join)
    DeleteBackward,
    /// Delete forward (grapheme, selection or block join)
    DeleteForward,
    /// Indent state machine: increase
    IncreaseIndent,
    /// Indent state machine: decrease
    DecreaseIndent,
    /// Set the indent level directly (clamped)
    SetIndent(i32),
    /// Nest the list item at the caret
    SinkListItem,
    /// Move the nested list item at the caret out one level
    LiftListItem,
}

/// Caret and selection commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// One grapheme left
    MoveLeft {
        /// Keep the anchor.
        extend: bool,
    },
    /// One grapheme right
    MoveRight {
        /// Keep the anchor.
        extend: bool,
    },
    /// Previous text block, same display column
    MoveUp {
        /// Keep the anchor.
        extend: bool,
    },
    /// Next text block, same display column
    MoveDown {
        /// Keep the anchor.
        extend: bool,
    },
    /// Start of the current block
    LineStart {
        /// Keep the anchor.
        extend: bool,
    },
    /// End of the current block
    LineEnd {
        /// Keep the anchor.
        extend: bool,
    },
    /// Replace the selection
    SetSelection(Selection),
    /// Select the whole document
    SelectAll,
}

/// Formatting commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    /// Toggle a mark over the selection (stored marks for a caret)
    ToggleMark(Mark),
    /// Add a mark over the selection
    SetMark(Mark),
    /// Remove marks of a kind from the selection
    UnsetMark(MarkKind),
    /// Turn the selected blocks into headings
    SetHeading(u8),
    /// Heading of this level ↔ paragraph
    ToggleHeading(u8),
    /// Turn the selected blocks into paragraphs
    SetParagraph,
    /// Fold or unfold the collapsible heading at the caret
    ToggleCollapsed,
}

/// History commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommand {
    /// Guarded undo (never crosses the loaded-content boundary)
    Undo,
    /// Default redo
    Redo,
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text editing commands
    Edit(EditCommand),
    /// Cursor command
    Cursor(CursorCommand),
    /// Formatting command
    Format(FormatCommand),
    /// History command
    History(HistoryCommand),
}

/// Editor facade
///
/// # Example
///
/// ```rust
/// use docedit_core::{Document, Editor, Key, KeyEvent};
///
/// let mut editor = Editor::with_document(Document::from_text("Hello"), Default::default());
///
/// // Tab at the block start indents the paragraph.
/// assert!(editor.handle_key(&KeyEvent::plain(Key::Tab)));
/// assert_eq!(editor.document().plain_text(), "Hello");
///
/// // Undo never goes behind the loaded content.
/// assert!(editor.safe_undo());
/// assert!(editor.safe_undo());
/// assert_eq!(editor.document().plain_text(), "Hello");
/// ```
#[derive(Debug, Clone)]
pub struct Editor {
    state: EditorState,
    router: KeyRouter,
    guard: UndoGuard,
    stored_marks: Option<Vec<Mark>>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Editor holding one empty paragraph.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(Document::default(), config)
    }

    /// Editor holding `doc`, with the undo boundary captured at `doc`.
    pub fn with_document(doc: Document, config: EditorConfig) -> Self {
        let router = KeyRouter::new(config);
        let state = EditorState::new(doc, &router.config().history);
        let mut guard = UndoGuard::new();
        guard.set_initial_content(&state);
        Self {
            state,
            router,
            guard,
            stored_marks: None,
        }
    }

    /// Editor loaded from the structural JSON form.
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, DocumentError> {
        Ok(Self::with_document(Document::from_json(json)?, config))
    }

    /// Replace the document, reset history and capture the new undo boundary.
    pub fn load(&mut self, doc: Document) {
        self.state.load(doc);
        self.router.cancel_pending();
        self.stored_marks = None;
        self.guard.set_initial_content(&self.state);
        log::debug!("document loaded");
    }

    /// Capture the current document as the undo boundary.
    pub fn set_initial_content(&mut self) {
        self.guard.set_initial_content(&self.state);
    }

    /// Model state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Current document.
    pub fn document(&self) -> &Document {
        self.state.document()
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        self.state.selection()
    }

    /// Key router.
    pub fn router(&self) -> &KeyRouter {
        &self.router
    }

    /// Undo guard.
    pub fn guard(&self) -> &UndoGuard {
        &self.guard
    }

    /// Active configuration.
    pub fn config(&self) -> &EditorConfig {
        self.router.config()
    }

    /// Marks the next typed text will carry, when set explicitly at a caret.
    pub fn stored_marks(&self) -> Option<&[Mark]> {
        self.stored_marks.as_deref()
    }

    /// Structural fingerprint of the current document.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        Fingerprint::of_model(&self.state)
    }

    /// Word, punctuation and line counts.
    pub fn stats(&self) -> DocumentStats {
        stats::document_stats(self.state.document())
    }

    /// Undo unless the document is back at the loaded content.
    pub fn safe_undo(&mut self) -> bool {
        self.execute(Command::History(HistoryCommand::Undo))
    }

    /// Default redo.
    pub fn redo(&mut self) -> bool {
        self.execute(Command::History(HistoryCommand::Redo))
    }

    /// Execute a command. Returns `true` if it took effect.
    ///
    /// A pending caret correction is dropped first, like for any routed event.
    pub fn execute(&mut self, command: Command) -> bool {
        self.router.cancel_pending();
        self.run(command)
    }

    fn run(&mut self, command: Command) -> bool {
        // Undo grouping: any non-edit command ends the current coalescing group.
        if !matches!(command, Command::Edit(_)) {
            self.state.end_history_group();
        }
        if !matches!(
            command,
            Command::Edit(EditCommand::InsertText(_)) | Command::Format(_)
        ) {
            self.stored_marks = None;
        }

        let done = match command {
            Command::Edit(cmd) => self.execute_edit(cmd),
            Command::Cursor(cmd) => self.execute_cursor(cmd),
            Command::Format(cmd) => self.execute_format(cmd),
            Command::History(cmd) => self.execute_history(cmd),
        };
        log::trace!("command done={}", done);
        done
    }

    fn execute_edit(&mut self, command: EditCommand) -> bool {
        let state = &mut self.state;
        let config = self.router.config();
        match command {
            EditCommand::InsertText(text) => {
                let marks = self.stored_marks.take();
                editing::insert_text(state, &text, marks)
            }
            EditCommand::InsertTab => tab::insert_tab(state, &config.tab),
            EditCommand::SplitBlock => editing::split_block(state),
            EditCommand::DeleteBackward => editing::delete_backward(state),
            EditCommand::DeleteForward => editing::delete_forward(state),
            EditCommand::IncreaseIndent => indent::increase_indent(state, &config.indent),
            EditCommand::DecreaseIndent => indent::decrease_indent(state, &config.indent),
            EditCommand::SetIndent(level) => indent::set_indent(state, &config.indent, level),
            EditCommand::SinkListItem => editing::sink_list_item(state),
            EditCommand::LiftListItem => editing::lift_list_item(state),
        }
    }

    fn execute_cursor(&mut self, command: CursorCommand) -> bool {
        let state = &mut self.state;
        match command {
            CursorCommand::MoveLeft { extend } => {
                editing::move_horizontal(state, Direction::Backward, extend)
            }
            CursorCommand::MoveRight { extend } => {
                editing::move_horizontal(state, Direction::Forward, extend)
            }
            CursorCommand::MoveUp { extend } => {
                editing::move_vertical(state, Direction::Backward, extend)
            }
            CursorCommand::MoveDown { extend } => {
                editing::move_vertical(state, Direction::Forward, extend)
            }
            CursorCommand::LineStart { extend } => {
                editing::move_to_block_edge(state, Direction::Backward, extend)
            }
            CursorCommand::LineEnd { extend } => {
                editing::move_to_block_edge(state, Direction::Forward, extend)
            }
            CursorCommand::SetSelection(selection) => match state.set_selection(selection) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("selection rejected: {err}");
                    false
                }
            },
            CursorCommand::SelectAll => editing::select_all(state),
        }
    }

    fn execute_format(&mut self, command: FormatCommand) -> bool {
        let state = &mut self.state;
        let collapsed = state.selection().is_collapsed();
        match command {
            FormatCommand::ToggleMark(mark) if collapsed => {
                let mut marks = self.stored_marks.take().unwrap_or_else(|| {
                    editing::marks_at(state.document(), &state.selection().head)
                });
                match marks.iter().position(|m| m.kind() == mark.kind()) {
                    Some(index) => {
                        marks.remove(index);
                    }
                    None => {
                        marks.push(mark);
                        inline::canonicalize_marks(&mut marks);
                    }
                }
                self.stored_marks = Some(marks);
                true
            }
            FormatCommand::ToggleMark(mark) => editing::toggle_mark(state, &mark),
            FormatCommand::SetMark(mark) => editing::set_mark(state, &mark),
            FormatCommand::UnsetMark(kind) => editing::unset_mark(state, kind),
            FormatCommand::SetHeading(level) => editing::set_heading(state, level),
            FormatCommand::ToggleHeading(level) => editing::toggle_heading(state, level),
            FormatCommand::SetParagraph => editing::set_paragraph(state),
            FormatCommand::ToggleCollapsed => editing::toggle_collapsed(state),
        }
    }

    fn execute_history(&mut self, command: HistoryCommand) -> bool {
        match command {
            HistoryCommand::Undo => self.guard.safe_undo(&mut self.state),
            HistoryCommand::Redo => self.state.redo(),
        }
    }

    /// Handle a keydown: the router first, then the default key bindings.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let cx = EditorContext::new(&mut self.state, &self.guard);
        if self.router.handle_keydown(cx, event) {
            self.stored_marks = None;
            return true;
        }
        self.default_key(event)
    }

    fn default_key(&mut self, event: &KeyEvent) -> bool {
        let mods = event.modifiers;
        let extend = mods.has_shift();
        let command: Command = match event.key {
            Key::Char(ch) if mods.has_mod() => return self.shortcut(ch, mods),
            Key::Char(ch) if !mods.has_alt() => EditCommand::InsertText(ch.to_string()).into(),
            Key::Enter if mods.is_empty() => EditCommand::SplitBlock.into(),
            Key::Backspace => EditCommand::DeleteBackward.into(),
            Key::Delete => EditCommand::DeleteForward.into(),
            Key::Tab if mods.is_empty() => EditCommand::SinkListItem.into(),
            Key::Tab if mods == Modifiers::shift() => EditCommand::LiftListItem.into(),
            Key::ArrowLeft => Command::Cursor(CursorCommand::MoveLeft { extend }),
            Key::ArrowRight => Command::Cursor(CursorCommand::MoveRight { extend }),
            Key::ArrowUp => Command::Cursor(CursorCommand::MoveUp { extend }),
            Key::ArrowDown => Command::Cursor(CursorCommand::MoveDown { extend }),
            Key::Home => Command::Cursor(CursorCommand::LineStart { extend }),
            Key::End => Command::Cursor(CursorCommand::LineEnd { extend }),
            _ => return false,
        };
        self.run(command)
    }

    fn shortcut(&mut self, ch: char, mods: Modifiers) -> bool {
        let ch = ch.to_ascii_lowercase();
        let command: Command = match (ch, mods.has_shift(), mods.has_alt()) {
            ('z', true, false) | ('y', false, false) => Command::History(HistoryCommand::Redo),
            ('a', false, false) => Command::Cursor(CursorCommand::SelectAll),
            ('b', false, false) => FormatCommand::ToggleMark(Mark::Bold).into(),
            ('i', false, false) => FormatCommand::ToggleMark(Mark::Italic).into(),
            ('u', false, false) => FormatCommand::ToggleMark(Mark::Underline).into(),
            ('s', true, false) => FormatCommand::ToggleMark(Mark::Strike).into(),
            ('e', false, false) => FormatCommand::ToggleMark(Mark::Code).into(),
            ('0', false, true) => FormatCommand::SetParagraph.into(),
            (digit @ '1'..='6', false, true) => {
                FormatCommand::ToggleHeading(digit as u8 - b'0').into()
            }
            _ => return false,
        };
        self.run(command)
    }

    /// Handle a mousedown: caret placement, shift-extension, and word or token selection when
    /// the press completes a double click.
    pub fn mouse_down(&mut self, event: &PointerEvent) -> bool {
        self.stored_marks = None;
        if self.router.mouse_down(&mut self.state, event) {
            return true;
        }
        if event.button != MouseButton::Primary {
            return false;
        }
        let Some(pos) = self.router.resolve_pointer(&self.state, event) else {
            return false;
        };
        self.state.end_history_group();
        if self.router.pointer().is_double_click() {
            return self.double_click(event);
        }

        let selection = if event.shift {
            Selection::new(self.state.selection().anchor.clone(), pos)
        } else {
            Selection::caret(pos)
        };
        self.run(Command::Cursor(CursorCommand::SetSelection(selection)))
    }

    /// Handle a mousemove: extend the selection from the drag anchor.
    pub fn mouse_move(&mut self, event: &PointerEvent) -> bool {
        if self.router.mouse_move(&mut self.state, event) {
            return true;
        }
        let pointer = self.router.pointer();
        if !pointer.is_dragging() {
            return false;
        }
        let (Some(anchor), Some(head)) = (
            pointer.drag_anchor().cloned(),
            self.router.resolve_pointer(&self.state, event),
        ) else {
            return false;
        };
        let selection = Selection::new(anchor, head);
        if *self.state.selection() == selection {
            return false;
        }
        self.run(Command::Cursor(CursorCommand::SetSelection(selection)))
    }

    /// Handle a mouseup: end the drag.
    pub fn mouse_up(&mut self, event: &PointerEvent) -> bool {
        self.router.mouse_up(&mut self.state, event)
    }

    /// Handle a double click: the token next to the pointer, else the word under it.
    pub fn double_click(&mut self, event: &PointerEvent) -> bool {
        if self.router.double_click(&mut self.state, event) {
            return true;
        }
        match self.router.resolve_pointer(&self.state, event) {
            Some(pos) => editing::select_word_at(&mut self.state, &pos),
            None => false,
        }
    }

    /// Handle a `beforeinput` event: the router first, then the default input behavior.
    pub fn before_input(&mut self, event: &InputEvent) -> bool {
        if self.router.before_input(&mut self.state, event) {
            return true;
        }
        let command = match (&event.input_type, &event.data) {
            (InputType::InsertText, Some(text)) => EditCommand::InsertText(text.clone()),
            (InputType::InsertParagraph, _) => EditCommand::SplitBlock,
            (InputType::DeleteContentBackward, _) => EditCommand::DeleteBackward,
            (InputType::DeleteContentForward, _) => EditCommand::DeleteForward,
            _ => return false,
        };
        self.run(command.into())
    }

    /// Run the pending caret correction, if any. Hosts call this once per frame.
    pub fn flush_deferred(&mut self) -> bool {
        self.router.run_deferred(&mut self.state)
    }
}

impl From<EditCommand> for Command {
    fn from(command: EditCommand) -> Self {
        Command::Edit(command)
    }
}

impl From<FormatCommand> for Command {
    fn from(command: FormatCommand) -> Self {
        Command::Format(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::Inline;
    use crate::position::DocPos;

    #[test]
    fn test_typing_is_one_undo_step() {
        let mut editor = Editor::with_document(Document::from_text("ab"), EditorConfig::default());
        editor.execute(Command::Cursor(CursorCommand::LineEnd { extend: false }));
        for ch in "cde".chars() {
            assert!(editor.handle_key(&KeyEvent::plain(Key::Char(ch))));
        }
        assert_eq!(editor.document().plain_text(), "abcde");
        assert!(editor.safe_undo());
        assert_eq!(editor.document().plain_text(), "ab");
    }

    #[test]
    fn test_stored_marks_apply_to_typing() {
        let mut editor = Editor::default();
        assert!(editor.execute(FormatCommand::ToggleMark(Mark::Bold).into()));
        assert_eq!(editor.stored_marks(), Some(&[Mark::Bold][..]));
        editor.execute(EditCommand::InsertText("hi".into()).into());
        assert_eq!(
            editor.document().inline_at(&vec![0].into()).ok(),
            Some(&vec![Inline::marked("hi", vec![Mark::Bold])])
        );
        assert_eq!(editor.stored_marks(), None);
    }

    #[test]
    fn test_shortcut_toggles_heading() {
        let mut editor = Editor::with_document(Document::from_text("T"), EditorConfig::default());
        let key = KeyEvent::new(Key::Char('2'), Modifiers::ctrl().with(Modifiers::ALT));
        assert!(editor.handle_key(&key));
        assert_eq!(editor.document().content[0].heading_level(), Some(2));
        assert!(editor.handle_key(&key));
        assert_eq!(editor.document().content[0].heading_level(), None);
    }

    #[test]
    fn test_enter_splits_and_moves_caret() {
        let mut editor = Editor::with_document(Document::from_text("ab"), EditorConfig::default());
        editor.execute(Command::Cursor(CursorCommand::MoveRight { extend: false }));
        assert!(editor.handle_key(&KeyEvent::plain(Key::Enter)));
        assert_eq!(editor.document().plain_text(), "a\nb");
        assert_eq!(editor.selection(), &Selection::caret(DocPos::new(vec![1], 0)));
    }
}
