use docedit_config::HistoryConfig;
use docedit_core::{
    BlockPath, DocPos, Document, DocumentModel, EditorContext, EditorState, IndentState,
    Indentable, Inline, Key, KeyEvent, KeyRouter, Modifiers, Node, Selection, UndoGuard,
};
use pretty_assertions::assert_eq;

struct Fixture {
    state: EditorState,
    guard: UndoGuard,
    router: KeyRouter,
}

impl Fixture {
    fn new(nodes: Vec<Node>) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let state = EditorState::new(Document::new(nodes), &HistoryConfig::default());
        let mut guard = UndoGuard::new();
        guard.set_initial_content(&state);
        Self {
            state,
            guard,
            router: KeyRouter::default(),
        }
    }

    fn key(&mut self, event: KeyEvent) -> bool {
        let cx = EditorContext::new(&mut self.state, &self.guard);
        self.router.handle_keydown(cx, &event)
    }

    fn caret(&mut self, path: Vec<usize>, offset: usize) {
        self.state
            .set_selection(Selection::caret(DocPos::new(path, offset)))
            .unwrap();
    }

    fn indent(&self, index: usize) -> IndentState {
        self.state.document().content[index]
            .indent()
            .unwrap_or_default()
    }
}

fn key(chord: &str) -> KeyEvent {
    chord.parse().unwrap()
}

#[test]
fn test_unrelated_keys_are_declined() {
    let mut fx = Fixture::new(vec![Node::text_paragraph("abc")]);
    for chord in ["a", "Enter", "Delete", "ArrowUp", "Mod-b", "Alt-Tab", "Mod-Tab"] {
        assert!(!fx.key(key(chord)), "{chord} should fall through");
    }
    assert_eq!(fx.state.document().plain_text(), "abc");
}

#[test]
fn test_tab_mid_text_inserts_token_and_keeps_indent() {
    let mut fx = Fixture::new(vec![Node::text_paragraph("abc")]);
    fx.caret(vec![0], 2);
    assert!(fx.key(key("Tab")));
    assert_eq!(fx.state.document().block_len(&vec![0].into()), 4);
    assert_eq!(fx.indent(0), IndentState::NONE);
}

#[test]
fn test_tab_after_leading_token_indents() {
    let mut fx = Fixture::new(vec![Node::paragraph(vec![Inline::tab(8), Inline::text("x")])]);
    fx.caret(vec![0], 1);
    assert!(fx.key(key("Tab")));
    assert_eq!(fx.indent(0).level(), 1);
    assert_eq!(fx.state.document().block_len(&vec![0].into()), 2);
}

#[test]
fn test_backspace_at_block_start_decreases_indent() {
    let mut fx = Fixture::new(vec![
        Node::text_paragraph("x").with_indent(IndentState::new(3, false)),
    ]);
    assert!(fx.key(key("Backspace")));
    assert_eq!(fx.indent(0), IndentState::new(3, true));
    assert!(fx.key(key("Backspace")));
    assert_eq!(fx.indent(0), IndentState::new(2, true));
}

#[test]
fn test_backspace_at_level_zero_falls_through() {
    let mut fx = Fixture::new(vec![Node::text_paragraph("a"), Node::text_paragraph("b")]);
    fx.caret(vec![1], 0);
    assert!(!fx.key(key("Backspace")));
    assert_eq!(fx.state.document().plain_text(), "a\nb");
}

#[test]
fn test_backspace_with_selection_falls_through() {
    let mut fx = Fixture::new(vec![Node::paragraph(vec![Inline::text("a"), Inline::tab(8)])]);
    fx.state
        .set_selection(Selection::new(
            DocPos::new(vec![0], 0),
            DocPos::new(vec![0], 2),
        ))
        .unwrap();
    assert!(!fx.key(key("Backspace")));
}

#[test]
fn test_list_items_decline_tab_and_shift_tab() {
    let list = Node::bullet_list(vec![
        Node::list_item(vec![Node::text_paragraph("one")]),
        Node::list_item(vec![Node::text_paragraph("two")]),
    ]);
    let mut fx = Fixture::new(vec![list]);
    fx.caret(vec![0, 1, 0], 0);
    let before = fx.state.document().clone();

    assert!(!fx.key(key("Tab")));
    assert!(!fx.key(key("Shift-Tab")));
    assert_eq!(fx.state.document(), &before);
}

#[test]
fn test_mod_z_is_always_consumed() {
    let mut fx = Fixture::new(vec![Node::text_paragraph("Hello")]);

    // Nothing to undo and at the baseline: still consumed.
    assert!(fx.key(key("Mod-z")));
    assert!(fx.key(KeyEvent::new(Key::Char('z'), Modifiers::from_bits(Modifiers::META))));

    assert!(fx.key(key("Tab")));
    assert_eq!(fx.indent(0).level(), 1);
    assert!(fx.key(key("Mod-z")));
    assert_eq!(fx.indent(0).level(), 0);
}

#[test]
fn test_mod_shift_z_is_not_routed() {
    let mut fx = Fixture::new(vec![Node::text_paragraph("x")]);
    assert!(!fx.key(key("Mod-Shift-z")));
}

#[test]
fn test_arrow_left_at_block_start_schedules_correction() {
    let mut fx = Fixture::new(vec![Node::text_paragraph("abc"), Node::text_paragraph("d")]);
    fx.caret(vec![1], 0);
    assert!(!fx.key(key("ArrowLeft")));
    let pending = fx.router.pending().cloned().unwrap();
    assert_eq!(pending.path, BlockPath::from(vec![0]));
    assert_eq!(pending.target, 3);

    // The next routed event cancels it.
    assert!(!fx.key(key("a")));
    assert!(fx.router.pending().is_none());
}

#[test]
fn test_arrow_left_in_first_block_schedules_nothing() {
    let mut fx = Fixture::new(vec![Node::text_paragraph("abc")]);
    assert!(!fx.key(key("ArrowLeft")));
    assert!(fx.router.pending().is_none());
}
