use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use docedit_core::{
    Command, CursorCommand, DocPos, Document, Editor, EditorConfig, Fingerprint, Key, KeyEvent,
    Selection,
};

fn large_doc(block_count: usize) -> Document {
    let mut out = String::with_capacity(block_count * 64);
    for i in 0..block_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (docedit benchmark block)\n"
        ));
    }
    // Remove the final '\n' to avoid creating an extra trailing empty block.
    out.pop();
    Document::from_text(&out)
}

fn editor_at_middle(doc: &Document) -> Editor {
    let mut editor = Editor::with_document(doc.clone(), EditorConfig::default());
    let middle = doc.content.len() / 2;
    editor.execute(Command::Cursor(CursorCommand::SetSelection(Selection::caret(
        DocPos::new(vec![middle], 10),
    ))));
    editor
}

fn bench_tab_backspace(c: &mut Criterion) {
    let doc = large_doc(5_000);
    c.bench_function("key_routing/100_tab_backspace", |b| {
        b.iter_batched(
            || editor_at_middle(&doc),
            |mut editor| {
                for _ in 0..100 {
                    editor.handle_key(&KeyEvent::plain(Key::Tab));
                    editor.handle_key(&KeyEvent::plain(Key::Backspace));
                }
                black_box(editor.selection().head.offset);
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_indent_cycle(c: &mut Criterion) {
    let doc = large_doc(5_000);
    let tab = KeyEvent::plain(Key::Tab);
    let shift_tab = KeyEvent::shifted(Key::Tab);
    c.bench_function("key_routing/indent_cycle", |b| {
        b.iter_batched(
            || {
                let mut editor = editor_at_middle(&doc);
                editor.execute(Command::Cursor(CursorCommand::LineStart { extend: false }));
                editor
            },
            |mut editor| {
                for _ in 0..9 {
                    editor.handle_key(&tab);
                }
                for _ in 0..18 {
                    editor.handle_key(&shift_tab);
                }
                black_box(editor.document().content.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let doc = large_doc(5_000);
    c.bench_function("fingerprint/5k_blocks", |b| {
        b.iter(|| {
            let json = doc.to_json().unwrap_or_default();
            black_box(Fingerprint::of_structure(black_box(&json)));
        })
    });
}

criterion_group!(
    benches,
    bench_tab_backspace,
    bench_indent_cycle,
    bench_fingerprint
);
criterion_main!(benches);
