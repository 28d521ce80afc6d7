// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use peniko::kurbo::Point;

use crate::{
    AutoCorrect, AutoCorrectDoc, CursorMove, EngineConfig, EngineServices, ErrorKind, ParaAttr,
    ParaAttribs, ViewId, WritingDirection,
};

use super::utils::TestEnv;

fn caret(env: &mut TestEnv, view: ViewId, at: (usize, usize)) {
    let selection = env.sel(at, at);
    env.engine.set_selection(view, selection).unwrap();
}

fn selection_of(env: &TestEnv, view: ViewId) -> ((usize, usize), (usize, usize)) {
    let selection = env.engine.view(view).unwrap().selection();
    (env.at(selection.anchor()), env.at(selection.focus()))
}

/// Replaces a fixed word with another when the next character is typed.
struct Replace {
    from: &'static str,
    to: &'static str,
    trigger: char,
}

impl AutoCorrect for Replace {
    fn char_inserted(&mut self, doc: &mut AutoCorrectDoc<'_>, offset: usize, ch: char) {
        if ch != self.trigger {
            return;
        }
        let before = &doc.text()[..offset];
        let target: Option<Range<usize>> = if self.trigger == ' ' {
            let end = offset - ch.len_utf8();
            before[..end]
                .ends_with(self.from)
                .then(|| end - self.from.len()..end)
        } else {
            before
                .ends_with(self.from)
                .then(|| offset - self.from.len()..offset)
        };
        if let Some(range) = target {
            assert!(doc.replace(range, self.to));
        }
    }
}

fn with_autocorrect(hook: Replace) -> TestEnv {
    let services = EngineServices {
        autocorrect: Some(Box::new(hook)),
        ..EngineServices::default()
    };
    TestEnv::with_services(EngineConfig::default(), services)
}

#[test]
fn other_views_follow_edits() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello world");
    let a = env.engine.create_view();
    let b = env.engine.create_view();
    caret(&mut env, a, (0, 5));
    let selection = env.sel((0, 6), (0, 11));
    env.engine.set_selection(b, selection).unwrap();

    let end = env.engine.view_insert_text(a, ", big").unwrap();
    assert_eq!(env.texts(), ["Hello, big world"]);
    assert_eq!(env.at(end), (0, 10));
    assert_eq!(selection_of(&env, a), ((0, 10), (0, 10)));
    assert_eq!(selection_of(&env, b), ((0, 11), (0, 16)));
    assert_eq!(env.engine.view_selected_text(b).unwrap(), "world");
    env.assert_invariants();
}

#[test]
fn views_inside_deleted_text_move_to_its_start() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello\nWorld");
    let a = env.engine.create_view();
    let b = env.engine.create_view();
    caret(&mut env, b, (1, 2));
    let selection = env.sel((0, 3), (1, 4));
    env.engine.set_selection(a, selection).unwrap();

    env.engine.view_insert_text(a, "").unwrap();
    assert_eq!(env.texts(), ["Held"]);
    assert_eq!(selection_of(&env, a), ((0, 3), (0, 3)));
    assert_eq!(selection_of(&env, b), ((0, 3), (0, 3)));
    env.assert_invariants();
}

#[test]
fn views_in_removed_paragraph_move_to_neighbour() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb\nc");
    let view = env.engine.create_view();
    caret(&mut env, view, (1, 1));
    env.engine.remove_paragraph(1);
    assert_eq!(selection_of(&env, view), ((1, 0), (1, 0)));
    assert_eq!(env.texts(), ["a", "c"]);

    caret(&mut env, view, (1, 1));
    env.engine.remove_paragraph(1);
    assert_eq!(selection_of(&env, view), ((0, 0), (0, 0)));
    env.assert_invariants();
}

#[test]
fn views_survive_split_and_undo() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abcdef");
    let a = env.engine.create_view();
    let b = env.engine.create_view();
    caret(&mut env, a, (0, 2));
    caret(&mut env, b, (0, 4));
    env.engine.view_insert_paragraph(a).unwrap();
    assert_eq!(env.texts(), ["ab", "cdef"]);
    assert_eq!(selection_of(&env, a), ((1, 0), (1, 0)));
    assert_eq!(selection_of(&env, b), ((1, 2), (1, 2)));

    env.engine.view_undo(a).unwrap();
    assert_eq!(env.texts(), ["abcdef"]);
    assert_eq!(selection_of(&env, a), ((0, 2), (0, 2)));
    assert_eq!(selection_of(&env, b), ((0, 4), (0, 4)));
    env.assert_invariants();
}

#[test]
fn overwrite_replaces_next_cell() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abc");
    let view = env.engine.create_view();
    env.engine.set_insert_mode(view, false).unwrap();
    assert!(!env.engine.view(view).unwrap().insert_mode());

    env.engine.view_insert_text(view, "x").unwrap();
    env.engine.view_insert_text(view, "y").unwrap();
    assert_eq!(env.texts(), ["xyc"]);

    let rect = env.engine.view_cursor_rect(view).unwrap();
    assert_eq!((rect.x0, rect.x1, rect.y0, rect.y1), (10.0, 15.0, 0.0, 10.0));

    caret(&mut env, view, (0, 3));
    env.engine.view_insert_text(view, "z").unwrap();
    assert_eq!(env.texts(), ["xycz"]);
}

#[test]
fn overwrite_does_not_eat_the_paragraph_break() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "ab\ncd");
    let view = env.engine.create_view();
    env.engine.set_insert_mode(view, false).unwrap();
    caret(&mut env, view, (0, 2));
    env.engine.view_insert_text(view, "x").unwrap();
    assert_eq!(env.texts(), ["abx", "cd"]);
}

#[test]
fn extend_and_collapse() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abcdef");
    let view = env.engine.create_view();
    caret(&mut env, view, (0, 2));
    env.engine
        .view_move_cursor(view, CursorMove::Forward, true)
        .unwrap();
    env.engine
        .view_move_cursor(view, CursorMove::Right, true)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 2), (0, 4)));
    assert_eq!(env.engine.view_selected_text(view).unwrap(), "cd");

    env.engine
        .view_move_cursor(view, CursorMove::Left, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 2), (0, 2)));

    env.engine
        .view_move_cursor(view, CursorMove::WordRight, true)
        .unwrap();
    env.engine
        .view_move_cursor(view, CursorMove::Forward, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 6), (0, 6)));
}

#[test]
fn vertical_moves_remember_x() {
    let mut env = TestEnv::with_text(EngineConfig::with_width(40.0), "Hello world foo");
    let view = env.engine.create_view();
    caret(&mut env, view, (0, 2));
    env.engine
        .view_move_cursor(view, CursorMove::Down, false)
        .unwrap();
    assert_eq!(env.engine.view(view).unwrap().travel_x(), Some(10.0));
    env.engine
        .view_move_cursor(view, CursorMove::Down, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 14), (0, 14)));
    env.engine
        .view_move_cursor(view, CursorMove::Up, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 8), (0, 8)));
    assert_eq!(env.engine.view(view).unwrap().travel_x(), Some(10.0));

    env.engine
        .view_move_cursor(view, CursorMove::Forward, false)
        .unwrap();
    assert_eq!(env.engine.view(view).unwrap().travel_x(), None);
}

#[test]
fn line_end_caret_stays_on_wrapped_line() {
    let mut env = TestEnv::with_text(EngineConfig::with_width(40.0), "Hello world foo");
    let view = env.engine.create_view();
    caret(&mut env, view, (0, 2));
    env.engine
        .view_move_cursor(view, CursorMove::LineEnd, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 6), (0, 6)));
    let rect = env.engine.view_cursor_rect(view).unwrap();
    assert_eq!((rect.x0, rect.y0), (25.0, 0.0));

    env.engine
        .view_move_cursor(view, CursorMove::LineStart, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 0), (0, 0)));
}

#[test]
fn document_and_paragraph_moves() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "one two\nthree");
    let view = env.engine.create_view();
    caret(&mut env, view, (0, 5));
    let moves = [
        (CursorMove::ParagraphEnd, (0, 7)),
        (CursorMove::ParagraphStart, (0, 0)),
        (CursorMove::DocumentEnd, (1, 5)),
        (CursorMove::WordLeft, (1, 0)),
        (CursorMove::Backward, (0, 7)),
        (CursorMove::DocumentStart, (0, 0)),
    ];
    for (movement, expected) in moves {
        env.engine.view_move_cursor(view, movement, false).unwrap();
        assert_eq!(selection_of(&env, view), (expected, expected), "{movement:?}");
    }
}

#[test]
fn page_down_uses_visible_height() {
    let text = (0..10).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
    let mut env = TestEnv::with_text(EngineConfig::default(), &text);
    let view = env.engine.create_view();
    env.engine.set_visible_height(view, 40.0).unwrap();
    env.engine
        .view_move_cursor(view, CursorMove::PageDown, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((4, 0), (4, 0)));
    env.engine
        .view_move_cursor(view, CursorMove::PageUp, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 0), (0, 0)));
}

#[test]
fn visual_moves_in_rtl_paragraph() {
    let mut env = TestEnv::with_text(EngineConfig::with_width(100.0), "שלום");
    env.engine.set_para_attribs(
        0,
        ParaAttribs::new().with(ParaAttr::WritingDirection(WritingDirection::RightToLeft)),
    );
    let view = env.engine.create_view();
    let before = env.engine.view_cursor_rect(view).unwrap();

    env.engine
        .view_move_cursor(view, CursorMove::Right, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 0), (0, 0)));

    env.engine
        .view_move_cursor(view, CursorMove::Left, false)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 2), (0, 2)));
    assert_eq!(env.engine.view(view).unwrap().bidi_level(), Some(1));
    let after = env.engine.view_cursor_rect(view).unwrap();
    assert!(after.x0 < before.x0);

    env.engine
        .view_move_cursor(view, CursorMove::Forward, false)
        .unwrap();
    let further = env.engine.view_cursor_rect(view).unwrap();
    assert_eq!(selection_of(&env, view), ((0, 4), (0, 4)));
    assert!(further.x0 < after.x0);
}

#[test]
fn click_and_shift_click() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello\nWorld");
    let view = env.engine.create_view();
    env.engine
        .set_cursor_at_point(view, Point::new(12.0, 5.0), false)
        .unwrap();
    env.engine
        .set_cursor_at_point(view, Point::new(7.0, 15.0), true)
        .unwrap();
    assert_eq!(selection_of(&env, view), ((0, 2), (1, 1)));
    assert_eq!(env.engine.view_selected_text(view).unwrap(), "llo\nW");
}

#[test]
fn word_sentence_and_all_selection() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hi there. Bye now.\nnext");
    let view = env.engine.create_view();
    caret(&mut env, view, (0, 5));
    env.engine.view_select_word(view).unwrap();
    assert_eq!(env.engine.view_selected_text(view).unwrap(), "there");

    caret(&mut env, view, (0, 12));
    env.engine.view_select_sentence(view).unwrap();
    assert_eq!(env.engine.view_selected_text(view).unwrap(), "Bye now.");

    env.engine.select_all(view).unwrap();
    assert_eq!(
        env.engine.view_selected_text(view).unwrap(),
        "Hi there. Bye now.\nnext"
    );
}

#[test]
fn removed_views_are_rejected() {
    let mut env = TestEnv::new();
    let view = env.engine.create_view();
    assert!(env.engine.remove_view(view));
    assert!(!env.engine.remove_view(view));
    let err = env.engine.view_insert_text(view, "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidView);
    let err = env
        .engine
        .view_move_cursor(view, CursorMove::Forward, false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidView);
    assert!(env.engine.view(view).is_none());
}

#[test]
fn generation_changes_on_selection_change() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abc");
    let view = env.engine.create_view();
    let before = env.engine.generation();
    env.engine
        .view_move_cursor(view, CursorMove::Forward, false)
        .unwrap();
    let moved = env.engine.generation();
    assert_ne!(before, moved);
    env.engine.view_insert_text(view, "x").unwrap();
    assert_ne!(moved, env.engine.generation());
}

#[test]
fn autocorrect_runs_after_typed_character() {
    let mut env = with_autocorrect(Replace {
        from: "teh",
        to: "the",
        trigger: ' ',
    });
    let view = env.engine.create_view();
    for ch in ["t", "e", "h", " "] {
        env.engine.view_insert_text(view, ch).unwrap();
    }
    assert_eq!(env.texts(), ["the "]);
    assert_eq!(selection_of(&env, view), ((0, 4), (0, 4)));

    // The correction is undone with the character that triggered it.
    env.engine.view_undo(view).unwrap();
    assert_eq!(env.texts(), ["teh"]);
    env.engine.view_undo(view).unwrap();
    assert_eq!(env.texts(), [""]);
}

#[test]
fn autocorrect_keeps_caret_after_shorter_replacement() {
    let mut env = with_autocorrect(Replace {
        from: "(c)",
        to: "\u{a9}",
        trigger: ')',
    });
    let view = env.engine.create_view();
    for ch in ["(", "c", ")"] {
        env.engine.view_insert_text(view, ch).unwrap();
    }
    assert_eq!(env.texts(), ["\u{a9}"]);
    assert_eq!(selection_of(&env, view), ((0, 2), (0, 2)));
}

#[test]
fn pasted_text_skips_autocorrect() {
    let mut env = with_autocorrect(Replace {
        from: "teh",
        to: "the",
        trigger: ' ',
    });
    let view = env.engine.create_view();
    env.engine.view_insert_text(view, "teh ").unwrap();
    assert_eq!(env.texts(), ["teh "]);
}
