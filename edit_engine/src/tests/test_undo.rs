// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    Alignment, CharAttr, DeleteMode, EngineConfig, ErrorKind, Feature, FontWeight, JoinMode,
    Notification, ParaAttr, ParaAttribs, StyleId,
};

use super::utils::TestEnv;

fn attr_ranges(env: &TestEnv, para: usize) -> Vec<core::ops::Range<usize>> {
    env.engine
        .doc()
        .node(para)
        .unwrap()
        .char_attribs()
        .iter()
        .map(|a| a.range())
        .collect()
}

#[test]
fn undo_and_redo_insertion() {
    let mut env = TestEnv::new();
    env.engine.insert_text(env.pam(0, 0), "Hello\nWorld");
    assert!(env.engine.can_undo());
    assert!(!env.engine.can_redo());

    let caret = env.engine.undo().unwrap();
    assert_eq!(env.texts(), [""]);
    assert_eq!(env.at(caret), (0, 0));
    assert!(env.engine.can_redo());

    let caret = env.engine.redo().unwrap();
    assert_eq!(env.texts(), ["Hello", "World"]);
    assert_eq!(env.at(caret), (1, 5));
    assert!(!env.engine.can_redo());
    env.assert_invariants();
}

#[test]
fn empty_history_reports_errors() {
    let mut env = TestEnv::new();
    assert_eq!(env.engine.try_undo().unwrap_err().kind(), ErrorKind::NothingToUndo);
    assert_eq!(env.engine.try_redo().unwrap_err().kind(), ErrorKind::NothingToUndo);
    assert!(env.engine.undo().is_none());
}

#[test]
fn typing_merges_into_one_step() {
    let mut env = TestEnv::new();
    let view = env.engine.create_view();
    for ch in ["a", "b", "c"] {
        env.engine.view_insert_text(view, ch).unwrap();
    }
    let caret = env.engine.view_undo(view).unwrap();
    assert_eq!(env.texts(), [""]);
    assert_eq!(env.at(caret), (0, 0));
    assert!(!env.engine.can_undo());
}

#[test]
fn typing_merge_respects_limit() {
    let config = EngineConfig {
        undo_merge_limit: 2,
        ..EngineConfig::default()
    };
    let mut env = TestEnv::with_config(config);
    let view = env.engine.create_view();
    for ch in ["a", "b", "c"] {
        env.engine.view_insert_text(view, ch).unwrap();
    }
    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["ab"]);
    env.engine.undo().unwrap();
    assert_eq!(env.texts(), [""]);
}

#[test]
fn paste_does_not_merge_with_typing() {
    let mut env = TestEnv::new();
    let view = env.engine.create_view();
    env.engine.view_insert_text(view, "a").unwrap();
    env.engine.view_insert_text(view, "bc").unwrap();
    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["a"]);
}

#[test]
fn new_edit_clears_redo() {
    let mut env = TestEnv::new();
    env.engine.insert_text(env.pam(0, 0), "one");
    env.engine.undo().unwrap();
    assert!(env.engine.can_redo());
    env.engine.insert_text(env.pam(0, 0), "two");
    assert!(!env.engine.can_redo());
    assert_eq!(env.texts(), ["two"]);
}

#[test]
fn undo_of_cross_paragraph_delete_restores_attributes() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello\nWorld");
    env.engine.set_char_attrib(
        env.sel((0, 1), (0, 4)),
        CharAttr::Weight(FontWeight::BOLD),
    );
    env.engine.delete_range(env.sel((0, 3), (1, 2)));
    assert_eq!(env.texts(), ["Helrld"]);
    assert_eq!(attr_ranges(&env, 0), [1..3]);
    env.take_notifications();

    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["Hello", "World"]);
    assert_eq!(attr_ranges(&env, 0), [1..4]);
    assert!(attr_ranges(&env, 1).is_empty());
    assert_eq!(
        env.take_notifications(),
        [Notification::ParagraphInserted(1), Notification::TextModified]
    );
    env.assert_invariants();

    env.engine.redo().unwrap();
    assert_eq!(env.texts(), ["Helrld"]);
    assert_eq!(attr_ranges(&env, 0), [1..3]);
}

#[test]
fn undo_of_split_restores_attributes() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abcdef");
    env.engine.set_char_attrib(
        env.sel((0, 1), (0, 5)),
        CharAttr::Weight(FontWeight::BOLD),
    );
    env.engine.split_paragraph(env.pam(0, 3));
    assert_eq!(attr_ranges(&env, 0), [1..3]);
    assert_eq!(attr_ranges(&env, 1), [0..2]);
    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["abcdef"]);
    assert_eq!(attr_ranges(&env, 0), [1..5]);
}

#[test]
fn undo_of_backward_join_restores_both_styles() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb");
    let quote = StyleId::new("quote");
    env.engine.set_style(1, Some(quote.clone()));
    env.engine.set_para_attribs(
        1,
        ParaAttribs::new().with(ParaAttr::Alignment(Alignment::Right)),
    );
    let view = env.engine.create_view();
    let caret = env.sel((1, 0), (1, 0));
    env.engine.set_selection(view, caret).unwrap();
    env.engine.view_delete(view, DeleteMode::BACKSPACE).unwrap();
    assert_eq!(env.engine.doc().node(0).unwrap().style(), Some(&quote));

    let caret = env.engine.view_undo(view).unwrap();
    assert_eq!(env.texts(), ["a", "b"]);
    assert_eq!(env.at(caret), (1, 0));
    let (left, right) = (
        env.engine.doc().node(0).unwrap(),
        env.engine.doc().node(1).unwrap(),
    );
    assert!(left.style().is_none());
    assert!(left.para_attribs().is_empty());
    assert_eq!(right.style(), Some(&quote));
    assert!(!right.para_attribs().is_empty());

    env.engine.view_redo(view).unwrap();
    assert_eq!(env.texts(), ["ab"]);
    assert_eq!(env.engine.doc().node(0).unwrap().style(), Some(&quote));
}

#[test]
fn undo_of_forward_join() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "ab\ncd");
    env.engine.join_paragraphs(0, JoinMode::Forward);
    assert_eq!(env.texts(), ["abcd"]);
    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["ab", "cd"]);
}

#[test]
fn undo_of_paragraph_operations() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb\nc\nd");
    env.engine.move_paragraphs(0..2, 4);
    assert_eq!(env.texts(), ["c", "d", "a", "b"]);
    env.engine.insert_paragraph(1, "new");
    env.engine.remove_paragraph(0);
    assert_eq!(env.texts(), ["new", "d", "a", "b"]);

    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["c", "new", "d", "a", "b"]);
    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["c", "d", "a", "b"]);
    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["a", "b", "c", "d"]);

    env.engine.redo().unwrap();
    assert_eq!(env.texts(), ["c", "d", "a", "b"]);
}

#[test]
fn undo_of_attribute_changes() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abc");
    env.engine.set_char_attrib(env.sel((0, 0), (0, 2)), CharAttr::Italic(true));
    env.engine.set_para_attribs(
        0,
        ParaAttribs::new().with(ParaAttr::Alignment(Alignment::Middle)),
    );
    env.engine.undo().unwrap();
    assert!(env.engine.doc().node(0).unwrap().para_attribs().is_empty());
    assert_eq!(attr_ranges(&env, 0), [0..2]);
    env.engine.undo().unwrap();
    assert!(attr_ranges(&env, 0).is_empty());
}

#[test]
fn undo_of_feature_insertion() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "ab");
    env.engine.insert_feature(env.pam(0, 1), Feature::Tab);
    assert_eq!(env.texts(), ["a\tb"]);
    env.engine.undo().unwrap();
    assert_eq!(env.texts(), ["ab"]);
    assert_eq!(env.engine.doc().node(0).unwrap().char_attribs().features().count(), 0);
    env.engine.redo().unwrap();
    assert_eq!(env.engine.doc().node(0).unwrap().char_attribs().features().count(), 1);
}

#[test]
fn history_is_bounded() {
    let config = EngineConfig {
        max_undo_groups: 2,
        ..EngineConfig::default()
    };
    let mut env = TestEnv::with_config(config);
    for text in ["a", "b", "c"] {
        let end = env.engine.doc().end_pam();
        env.engine.insert_text(end, text);
    }
    assert!(env.engine.undo().is_some());
    assert!(env.engine.undo().is_some());
    assert!(env.engine.undo().is_none());
    assert_eq!(env.texts(), ["a"]);
}

#[test]
fn disabled_history_records_nothing() {
    let config = EngineConfig {
        undo_enabled: false,
        ..EngineConfig::default()
    };
    let mut env = TestEnv::with_config(config);
    env.engine.insert_text(env.pam(0, 0), "abc");
    assert!(!env.engine.can_undo());
}

#[test]
fn undo_moves_other_views_along() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abc");
    let view = env.engine.create_view();
    let end = env.sel((0, 3), (0, 3));
    env.engine.set_selection(view, end).unwrap();
    env.engine.insert_text(env.pam(0, 0), "xy");
    assert_eq!(
        env.at(env.engine.view(view).unwrap().selection().focus()),
        (0, 5)
    );
    env.engine.undo().unwrap();
    assert_eq!(
        env.at(env.engine.view(view).unwrap().selection().focus()),
        (0, 3)
    );
}
