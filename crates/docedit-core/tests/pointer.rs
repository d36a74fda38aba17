use docedit_core::{
    DocPos, Document, Editor, EditorConfig, HitPoint, Inline, MouseButton, Node, PointerEvent,
    Selection,
};
use pretty_assertions::assert_eq;

fn editor_with(nodes: Vec<Node>) -> Editor {
    Editor::with_document(Document::new(nodes), EditorConfig::default())
}

fn click(editor: &mut Editor, column: usize, time_ms: u64) -> bool {
    editor.mouse_down(&PointerEvent::primary(HitPoint::new(vec![0], column), time_ms))
}

fn range(from: usize, to: usize) -> Selection {
    Selection::new(DocPos::new(vec![0], from), DocPos::new(vec![0], to))
}

#[test]
fn test_click_places_caret_at_nearest_edge() {
    let mut editor = editor_with(vec![Node::paragraph(vec![
        Inline::text("ab"),
        Inline::tab(8),
        Inline::text("cd"),
    ])]);

    // Columns 2..10 belong to the token; the first half snaps before it.
    assert!(click(&mut editor, 5, 0));
    assert_eq!(editor.selection(), &range(2, 2));
    assert!(click(&mut editor, 7, 1_000));
    assert_eq!(editor.selection(), &range(3, 3));
    assert!(click(&mut editor, 40, 2_000));
    assert_eq!(editor.selection(), &range(5, 5));
}

#[test]
fn test_double_click_on_token_selects_it() {
    let mut editor = editor_with(vec![Node::paragraph(vec![
        Inline::text("ab"),
        Inline::tab(8),
        Inline::text("cd"),
    ])]);
    click(&mut editor, 4, 0);
    assert!(click(&mut editor, 4, 120));
    assert!(editor.router().pointer().is_double_click());
    assert_eq!(editor.selection(), &range(2, 3));
}

#[test]
fn test_double_click_prefers_token_before_then_after() {
    let mut editor = editor_with(vec![Node::paragraph(vec![Inline::tab(8), Inline::text("x")])]);
    // Column 8 is the left half of "x": caret offset 1, right after the token.
    assert!(editor.double_click(&PointerEvent::primary(HitPoint::new(vec![0], 8), 0)));
    assert_eq!(editor.selection(), &range(0, 1));

    // Wide character: column 1 snaps after it, right before the token.
    let mut editor = editor_with(vec![Node::paragraph(vec![Inline::text("你"), Inline::tab(8)])]);
    assert!(editor.double_click(&PointerEvent::primary(HitPoint::new(vec![0], 1), 0)));
    assert_eq!(editor.selection(), &range(1, 2));
}

#[test]
fn test_double_click_on_text_selects_word() {
    let mut editor = editor_with(vec![Node::text_paragraph("hello world")]);
    click(&mut editor, 8, 0);
    assert!(click(&mut editor, 8, 200));
    assert_eq!(editor.selection(), &range(6, 11));
}

#[test]
fn test_slow_second_click_is_a_single_click() {
    let mut editor = editor_with(vec![Node::text_paragraph("hello world")]);
    click(&mut editor, 8, 0);
    assert!(click(&mut editor, 8, 900));
    assert!(!editor.router().pointer().is_double_click());
    assert_eq!(editor.selection(), &range(8, 8));
}

#[test]
fn test_drag_extends_from_anchor_until_release() {
    let mut editor = editor_with(vec![Node::text_paragraph("hello world")]);
    click(&mut editor, 0, 0);
    assert!(editor.router().pointer().is_dragging());

    let hit = |column| PointerEvent::primary(HitPoint::new(vec![0], column), 50);
    assert!(editor.mouse_move(&hit(5)));
    assert_eq!(editor.selection(), &range(0, 5));

    assert!(!editor.mouse_up(&hit(5)));
    assert!(!editor.router().pointer().is_dragging());
    assert!(!editor.mouse_move(&hit(9)));
    assert_eq!(editor.selection(), &range(0, 5));
}

#[test]
fn test_shift_click_extends_selection() {
    let mut editor = editor_with(vec![Node::text_paragraph("hello world")]);
    let mut event = PointerEvent::primary(HitPoint::new(vec![0], 3), 5_000);
    event.shift = true;
    assert!(editor.mouse_down(&event));
    assert_eq!(editor.selection(), &range(0, 3));
}

#[test]
fn test_secondary_button_and_misses_are_ignored() {
    let mut editor = editor_with(vec![Node::text_paragraph("hello")]);
    let mut event = PointerEvent::primary(HitPoint::new(vec![0], 3), 0);
    event.button = MouseButton::Secondary;
    assert!(!editor.mouse_down(&event));

    let miss = PointerEvent {
        hit: None,
        ..PointerEvent::primary(HitPoint::new(vec![0], 0), 10)
    };
    assert!(!editor.mouse_down(&miss));
    assert_eq!(editor.selection(), &range(0, 0));
}
