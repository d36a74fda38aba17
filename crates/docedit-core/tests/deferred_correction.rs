use docedit_config::HistoryConfig;
use docedit_core::{
    BlockPath, CorrectionOutcome, DocPos, Document, DocumentModel, Editor, EditorConfig,
    EditorContext, EditorState, HitPoint, Key, KeyEvent, KeyRouter, Node, PointerEvent,
    ScheduledCorrection, Selection, UndoGuard,
};

fn two_blocks() -> EditorState {
    EditorState::new(
        Document::new(vec![Node::text_paragraph("abc"), Node::text_paragraph("d")]),
        &HistoryConfig::default(),
    )
}

fn caret(state: &mut EditorState, path: Vec<usize>, offset: usize) {
    state
        .set_selection(Selection::caret(DocPos::new(path, offset)))
        .unwrap();
}

fn arrow_left(router: &mut KeyRouter, state: &mut EditorState, guard: &UndoGuard) -> bool {
    router.handle_keydown(
        EditorContext::new(state, guard),
        &KeyEvent::plain(Key::ArrowLeft),
    )
}

#[test]
fn test_correction_moves_caret_that_landed_one_short() {
    let mut state = two_blocks();
    let guard = UndoGuard::new();
    let mut router = KeyRouter::default();
    caret(&mut state, vec![1], 0);

    assert!(!arrow_left(&mut router, &mut state, &guard));
    // The host's default movement stops one short of the end.
    caret(&mut state, vec![0], 2);

    assert!(router.run_deferred(&mut state));
    assert_eq!(state.selection(), &Selection::caret(DocPos::new(vec![0], 3)));
    assert!(router.pending().is_none());
}

#[test]
fn test_stale_correction_is_not_applied() {
    let mut state = two_blocks();
    let guard = UndoGuard::new();
    let mut router = KeyRouter::default();
    caret(&mut state, vec![1], 0);
    assert!(!arrow_left(&mut router, &mut state, &guard));

    // The caret went somewhere else entirely.
    caret(&mut state, vec![0], 1);
    assert!(!router.run_deferred(&mut state));
    assert_eq!(state.selection(), &Selection::caret(DocPos::new(vec![0], 1)));
}

#[test]
fn test_any_later_event_cancels_the_correction() {
    let mut state = two_blocks();
    let guard = UndoGuard::new();
    let mut router = KeyRouter::default();
    caret(&mut state, vec![1], 0);
    assert!(!arrow_left(&mut router, &mut state, &guard));
    caret(&mut state, vec![0], 2);

    router.mouse_move(&mut state, &PointerEvent::primary(HitPoint::new(vec![0], 0), 0));
    assert!(router.pending().is_none());
    assert!(!router.run_deferred(&mut state));
    assert_eq!(state.selection().head.offset, 2);
}

#[test]
fn test_run_rechecks_block_length() {
    let mut state = two_blocks();
    caret(&mut state, vec![0], 2);

    // Recorded against a different block length.
    let correction = ScheduledCorrection::new(BlockPath::from(vec![0]), 4);
    assert_eq!(correction.run(&mut state), CorrectionOutcome::Stale);

    let correction = ScheduledCorrection::new(BlockPath::from(vec![0]), 3);
    assert_eq!(correction.run(&mut state), CorrectionOutcome::Applied);
    assert_eq!(correction.run(&mut state), CorrectionOutcome::AlreadyCorrect);
}

#[test]
fn test_editor_arrow_left_lands_on_previous_block_end() {
    let doc = Document::new(vec![Node::text_paragraph("abc"), Node::text_paragraph("d")]);
    let mut editor = Editor::with_document(doc, EditorConfig::default());
    editor.execute(docedit_core::Command::Cursor(
        docedit_core::CursorCommand::MoveDown { extend: false },
    ));
    assert_eq!(editor.selection(), &Selection::caret(DocPos::new(vec![1], 0)));

    assert!(editor.handle_key(&KeyEvent::plain(Key::ArrowLeft)));
    assert_eq!(editor.selection(), &Selection::caret(DocPos::new(vec![0], 3)));
    assert!(editor.router().pending().is_some());

    // Default movement already got it right.
    assert!(!editor.flush_deferred());
    assert_eq!(editor.selection(), &Selection::caret(DocPos::new(vec![0], 3)));
}
