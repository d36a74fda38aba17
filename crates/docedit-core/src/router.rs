//! Key Router
//!
//! Per-event decision function that runs before the default editing behavior. Each handler
//! inspects the caret context once and either performs an indent transition, an atomic-token
//! operation or a guarded undo (returning `true`, event consumed), or declines (returning
//! `false`) so the event falls through to default handling.
//!
//! | event                 | condition                                   | action                |
//! |-----------------------|---------------------------------------------|-----------------------|
//! | `Mod-z`               | always                                      | guarded undo          |
//! | `Tab`                 | inside a list item                          | decline               |
//! | `Tab`                 | not at block start                          | insert token          |
//! | `Tab`                 | at block start                              | increase indent       |
//! | `Shift-Tab`           | inside a list item                          | decline               |
//! | `Shift-Tab`           | otherwise                                   | decrease indent       |
//! | `Backspace`           | token before caret                          | delete token          |
//! | `Backspace`           | at block start, level > 0                   | decrease indent       |
//! | `ArrowLeft/Right`     | token in the movement direction             | skip token            |
//! | `ArrowLeft`           | offset 0 with a previous block              | schedule correction   |
//! | double click          | on or next to a token                       | select token          |
//! | `beforeinput` delete  | token in the deletion direction             | delete token          |

use crate::deferred::{CorrectionOutcome, ScheduledCorrection};
use crate::fingerprint::UndoGuard;
use crate::indent::{IndentChange, apply_indent_in};
use crate::keys::{InputEvent, InputType, Key, KeyEvent, Modifiers};
use crate::layout;
use crate::model::DocumentModel;
use crate::pointer::{MouseButton, PointerEvent, PointerState};
use crate::position::{DocPos, Selection};
use crate::resolve::CursorContext;
use crate::tab;
use docedit_config::EditorConfig;

/// Everything a keydown handler needs besides the event.
pub struct EditorContext<'a, M: DocumentModel + ?Sized> {
    /// Document model.
    pub model: &'a mut M,
    /// Undo guard wrapping the model's undo.
    pub guard: &'a UndoGuard,
}

impl<'a, M: DocumentModel + ?Sized> EditorContext<'a, M> {
    /// Bundle a model and its guard.
    pub fn new(model: &'a mut M, guard: &'a UndoGuard) -> Self {
        Self { model, guard }
    }
}

/// Keyboard and pointer interception in front of the default editing behavior.
#[derive(Debug, Clone)]
pub struct KeyRouter {
    config: EditorConfig,
    pointer: PointerState,
    pending: Option<ScheduledCorrection>,
}

impl Default for KeyRouter {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl KeyRouter {
    /// Router using `config`.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config: config.normalized(),
            pointer: PointerState::new(),
            pending: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Pointer state.
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Pending caret correction, if any.
    pub fn pending(&self) -> Option<&ScheduledCorrection> {
        self.pending.as_ref()
    }

    /// Drop the pending caret correction.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::trace!("deferred correction for {} cancelled", pending.path);
        }
    }

    /// Run the pending caret correction. Returns `true` if the caret moved.
    pub fn run_deferred<M: DocumentModel + ?Sized>(&mut self, model: &mut M) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let outcome = pending.run(model);
        log::trace!("deferred correction at {}: {:?}", pending.path, outcome);
        outcome == CorrectionOutcome::Applied
    }

    /// Handle a keydown event.
    pub fn handle_keydown<M: DocumentModel + ?Sized>(
        &mut self,
        cx: EditorContext<'_, M>,
        event: &KeyEvent,
    ) -> bool {
        self.cancel_pending();
        let EditorContext { model, guard } = cx;

        if event.is_mod_char('z') {
            let undone = guard.safe_undo(model);
            log::trace!("Mod-z routed to guarded undo ({})", undone);
            return true;
        }

        let mods = event.modifiers;
        let consumed = match event.key {
            Key::Tab if mods.is_empty() => self.route_tab(model),
            Key::Tab if mods == Modifiers::shift() => self.route_shift_tab(model),
            Key::Backspace if !mods.has_mod() && !mods.has_alt() => self.route_backspace(model),
            Key::ArrowLeft if mods.is_empty() => self.route_arrow_left(model),
            Key::ArrowRight if mods.is_empty() => self.route_arrow_right(model),
            _ => false,
        };
        log::trace!("keydown {:?}: consumed={}", event, consumed);
        consumed
    }

    fn capture<M: DocumentModel + ?Sized>(&self, model: &M) -> Option<CursorContext> {
        CursorContext::capture(model, &self.config.indent)
    }

    fn route_tab<M: DocumentModel + ?Sized>(&mut self, model: &mut M) -> bool {
        let Some(cx) = self.capture(model) else {
            return false;
        };
        if cx.in_list_item() {
            return false;
        }
        if !cx.at_block_start {
            return tab::insert_tab(model, &self.config.tab);
        }
        apply_indent_in(model, &self.config.indent, &cx, IndentChange::Increase)
    }

    fn route_shift_tab<M: DocumentModel + ?Sized>(&mut self, model: &mut M) -> bool {
        let Some(cx) = self.capture(model) else {
            return false;
        };
        if cx.in_list_item() {
            return false;
        }
        apply_indent_in(model, &self.config.indent, &cx, IndentChange::Decrease)
    }

    fn route_backspace<M: DocumentModel + ?Sized>(&mut self, model: &mut M) -> bool {
        let Some(cx) = self.capture(model) else {
            return false;
        };
        if !cx.collapsed {
            return false;
        }
        if cx.token_before {
            return tab::delete_token(model, &cx.pos.path, cx.pos.offset - 1);
        }
        if cx.at_block_start && cx.indent_level() > 0 {
            return apply_indent_in(model, &self.config.indent, &cx, IndentChange::Decrease);
        }
        false
    }

    fn route_arrow_left<M: DocumentModel + ?Sized>(&mut self, model: &mut M) -> bool {
        let Some(cx) = self.capture(model) else {
            return false;
        };
        if !cx.collapsed {
            return false;
        }
        if cx.token_before {
            return tab::move_caret(model, cx.pos.with_offset(cx.pos.offset - 1));
        }
        if cx.pos.offset == 0
            && let Some(prev) = cx.prev_block
        {
            let target = model.document().block_len(&prev);
            log::trace!("scheduling caret correction to {}@{}", prev, target);
            self.pending = Some(ScheduledCorrection::new(prev, target));
        }
        false
    }

    fn route_arrow_right<M: DocumentModel + ?Sized>(&mut self, model: &mut M) -> bool {
        let Some(cx) = self.capture(model) else {
            return false;
        };
        if cx.collapsed && cx.token_after {
            return tab::move_caret(model, cx.pos.with_offset(cx.pos.offset + 1));
        }
        false
    }

    /// Resolve a pointer event to a caret position (the nearest edge of the unit under it).
    pub fn resolve_pointer<M: DocumentModel + ?Sized>(
        &self,
        model: &M,
        event: &PointerEvent,
    ) -> Option<DocPos> {
        let hit = event.hit.as_ref()?;
        let content = model.document().inline_at(&hit.path).ok()?;
        let offset = layout::hit_test(content, hit.column).offset;
        Some(DocPos::new(hit.path.clone(), offset))
    }

    /// Handle a mousedown. Never consumes; records click timing and starts drag tracking.
    pub fn mouse_down<M: DocumentModel + ?Sized>(
        &mut self,
        model: &mut M,
        event: &PointerEvent,
    ) -> bool {
        self.cancel_pending();
        if event.button != MouseButton::Primary {
            return false;
        }
        let pos = self.resolve_pointer(model, event);
        let double = self.pointer.press(pos, event.time_ms, &self.config.pointer);
        if double {
            log::trace!("double click detected at {:?}", event.hit);
        }
        false
    }

    /// Handle a mousemove. Drag selection is unrestricted, so this never consumes.
    pub fn mouse_move<M: DocumentModel + ?Sized>(
        &mut self,
        _model: &mut M,
        _event: &PointerEvent,
    ) -> bool {
        self.cancel_pending();
        false
    }

    /// Handle a mouseup: ends any drag. Never consumes.
    pub fn mouse_up<M: DocumentModel + ?Sized>(
        &mut self,
        _model: &mut M,
        _event: &PointerEvent,
    ) -> bool {
        self.cancel_pending();
        self.pointer.release();
        false
    }

    /// Handle a double click: select exactly the token under or next to the pointer.
    pub fn double_click<M: DocumentModel + ?Sized>(
        &mut self,
        model: &mut M,
        event: &PointerEvent,
    ) -> bool {
        self.cancel_pending();
        let Some(hit) = event.hit.as_ref() else {
            return false;
        };
        let Ok(content) = model.document().inline_at(&hit.path) else {
            return false;
        };

        // The token under the pointer, else the one before the caret, else the one after it.
        let at = layout::hit_test(content, hit.column);
        let is_token = |offset: usize| tab::token_range(content, offset).is_some();
        let start = at
            .token
            .or_else(|| at.offset.checked_sub(1).filter(|&o| is_token(o)))
            .or_else(|| Some(at.offset).filter(|&o| is_token(o)));
        let Some(start) = start else {
            return false;
        };

        let selection = Selection::new(
            DocPos::new(hit.path.clone(), start),
            DocPos::new(hit.path.clone(), start + 1),
        );
        match model.set_selection(selection) {
            Ok(()) => {
                log::debug!("double click selected tab token at {}@{}", hit.path, start);
                true
            }
            Err(err) => {
                log::warn!("token selection rejected: {err}");
                false
            }
        }
    }

    /// Handle a `beforeinput` event: content deletion next to a token removes the whole token.
    pub fn before_input<M: DocumentModel + ?Sized>(
        &mut self,
        model: &mut M,
        event: &InputEvent,
    ) -> bool {
        self.cancel_pending();
        let Some(cx) = self.capture(model) else {
            return false;
        };
        if !cx.collapsed {
            return false;
        }
        match event.input_type {
            InputType::DeleteContentBackward if cx.token_before => {
                tab::delete_token(model, &cx.pos.path, cx.pos.offset - 1)
            }
            InputType::DeleteContentForward if cx.token_after => {
                tab::delete_token(model, &cx.pos.path, cx.pos.offset)
            }
            _ => false,
        }
    }
}
