// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    Alignment, CharAttr, CharAttrKind, DeleteDirection, DeleteGranularity, DeleteMode,
    EngineConfig, ErrorKind, Feature, FontWeight, JoinMode, Notification, ParaAttr, ParaAttrKind,
    ParaAttribs, StyleId,
};

use super::utils::TestEnv;

fn word(direction: DeleteDirection) -> DeleteMode {
    DeleteMode {
        direction,
        granularity: DeleteGranularity::Word,
    }
}

#[test]
fn delete_across_paragraphs() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello\nWorld");
    let start = env.engine.delete_range(env.sel((0, 3), (1, 2)));
    assert_eq!(env.texts(), ["Helrld"]);
    assert_eq!(env.at(start), (0, 3));
    assert_eq!(
        env.take_notifications(),
        [Notification::ParagraphDeleted(1), Notification::TextModified]
    );
    env.assert_invariants();
}

#[test]
fn delete_with_reversed_selection() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "ab\ncd\nef\ngh");
    env.engine.delete_range(env.sel((2, 1), (0, 1)));
    assert_eq!(env.texts(), ["af", "gh"]);
    env.assert_invariants();
}

#[test]
fn caret_delete_changes_nothing() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abc");
    let caret = env.engine.delete_range(env.sel((0, 1), (0, 1)));
    assert_eq!(env.at(caret), (0, 1));
    assert_eq!(env.texts(), ["abc"]);
    assert!(!env.engine.can_undo());
    assert!(env.take_notifications().is_empty());
}

#[test]
fn stale_positions_are_rejected() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb");
    let stale = env.pam(1, 0);
    env.engine.remove_paragraph(1);
    let err = env.engine.try_insert_text(stale, "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StaleNode);
    let err = env
        .engine
        .try_delete_range(crate::EditSelection::new(env.pam(0, 0), stale))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StaleNode);
    assert_eq!(env.texts(), ["a"]);
}

#[test]
fn split_and_join_round_trip() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello world");
    env.engine
        .set_char_attrib(env.sel((0, 3), (0, 8)), CharAttr::Italic(true));
    let next = env.engine.split_paragraph(env.pam(0, 5));
    assert_eq!(env.at(next), (1, 0));
    assert_eq!(env.texts(), ["Hello", " world"]);
    env.assert_invariants();

    let junction = env.engine.join_paragraphs(0, JoinMode::Forward).unwrap();
    assert_eq!(env.at(junction), (0, 5));
    assert_eq!(env.texts(), ["Hello world"]);
    let node = env.engine.doc().node(0).unwrap();
    let italic: Vec<_> = node.char_attribs().iter().map(|a| a.range()).collect();
    assert_eq!(italic, [3..8]);
    assert!(env.engine.join_paragraphs(0, JoinMode::Forward).is_none());
}

#[test]
fn split_at_paragraph_limit_is_refused() {
    let config = EngineConfig {
        max_paragraphs: 2,
        ..EngineConfig::default()
    };
    let mut env = TestEnv::with_text(config, "a\nb");
    let pam = env.pam(1, 1);
    let same = env.engine.split_paragraph(pam);
    assert_eq!(env.at(same), (1, 1));
    assert_eq!(env.texts(), ["a", "b"]);

    let inserted = env.engine.insert_text(env.pam(0, 1), "x\ny");
    assert!(inserted.truncated);
    assert_eq!(env.texts(), ["ax", "b"]);
    assert!(env.engine.insert_paragraph(0, "z").is_none());
}

#[test]
fn overlong_text_is_cut_at_neutral_break() {
    let config = EngineConfig {
        max_paragraph_len: 10,
        ..EngineConfig::default()
    };
    let mut env = TestEnv::with_config(config);
    let inserted = env.engine.insert_text(env.pam(0, 0), "hello wonderful\nworld");
    assert!(inserted.truncated);
    assert_eq!(env.texts(), ["hello ", "world"]);
    assert_eq!(env.at(inserted.end), (1, 5));

    let err = env
        .engine
        .try_insert_text(env.pam(1, 5), " and more")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!(err.limit(), Some(10));
    assert_eq!(env.texts(), ["hello ", "world and "]);
}

#[test]
fn feature_refused_in_full_paragraph() {
    let config = EngineConfig {
        max_paragraph_len: 3,
        ..EngineConfig::default()
    };
    let mut env = TestEnv::with_text(config, "abc");
    let end = env.pam(0, 3);
    let same = env.engine.insert_feature(end, Feature::Tab);
    assert_eq!(env.at(same), (0, 3));
    assert_eq!(env.texts(), ["abc"]);
    assert!(!env.engine.can_undo());
}

#[test]
fn remove_chars_counts_characters() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "h\u{e9}llo");
    let removed = env.engine.remove_chars(env.pam(0, 0), 2);
    assert_eq!(removed, "h\u{e9}");
    assert_eq!(env.texts(), ["llo"]);
    let rest = env.engine.remove_chars(env.pam(0, 1), 10);
    assert_eq!(rest, "lo");
    assert_eq!(env.texts(), ["l"]);
}

#[test]
fn character_attributes_set_and_removed() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "one\ntwo");
    env.engine.set_char_attrib(
        env.sel((0, 1), (1, 2)),
        CharAttr::Weight(FontWeight::BOLD),
    );
    let ranges = |env: &TestEnv, para: usize| -> Vec<_> {
        env.engine
            .doc()
            .node(para)
            .unwrap()
            .char_attribs()
            .iter()
            .map(|a| a.range())
            .collect()
    };
    assert_eq!(ranges(&env, 0), [1..3]);
    assert_eq!(ranges(&env, 1), [0..2]);

    env.engine
        .remove_char_attribs(env.sel((0, 0), (1, 1)), CharAttrKind::Weight);
    assert!(ranges(&env, 0).is_empty());
    assert_eq!(ranges(&env, 1), [1..2]);
    env.assert_invariants();
}

#[test]
fn paragraph_attributes_notify() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb");
    let attribs = ParaAttribs::new().with(ParaAttr::Alignment(Alignment::Middle));
    env.engine.set_para_attribs(1, attribs.clone());
    assert_eq!(
        env.take_notifications(),
        [
            Notification::ParagraphAttributesChanged(1),
            Notification::TextModified
        ]
    );
    // Setting the same value again is not a change.
    env.engine.set_para_attribs(1, attribs);
    assert!(env.take_notifications().is_empty());
}

#[test]
fn backspace_at_paragraph_start_adopts_right_style() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb");
    let quote = StyleId::new("quote");
    env.engine.set_para_attribs(
        1,
        ParaAttribs::new().with(ParaAttr::Alignment(Alignment::Right)),
    );
    env.engine.set_style(1, Some(quote.clone()));
    let view = env.engine.create_view();
    env.engine.set_selection(view, env.sel((1, 0), (1, 0))).unwrap();
    env.take_notifications();

    let caret = env.engine.view_delete(view, DeleteMode::BACKSPACE).unwrap();
    assert_eq!(env.texts(), ["ab"]);
    assert_eq!(env.at(caret), (0, 1));
    let node = env.engine.doc().node(0).unwrap();
    assert_eq!(node.style(), Some(&quote));
    assert_eq!(
        node.para_attribs().get(ParaAttrKind::Alignment),
        Some(&ParaAttr::Alignment(Alignment::Right))
    );
    assert_eq!(
        env.take_notifications(),
        [
            Notification::ParagraphDeleted(1),
            Notification::ParagraphAttributesChanged(0),
            Notification::TextModified
        ]
    );
}

#[test]
fn backward_join_policy_can_keep_left_style() {
    let config = EngineConfig {
        backward_join_adopts_style: false,
        ..EngineConfig::default()
    };
    let mut env = TestEnv::with_text(config, "a\nb");
    env.engine.set_style(1, Some(StyleId::new("quote")));
    env.engine.join_paragraphs(0, JoinMode::Backward);
    assert_eq!(env.texts(), ["ab"]);
    assert!(env.engine.doc().node(0).unwrap().style().is_none());
}

#[test]
fn delete_at_paragraph_end_keeps_left_style() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb");
    env.engine.set_style(1, Some(StyleId::new("quote")));
    let view = env.engine.create_view();
    env.engine.set_selection(view, env.sel((0, 1), (0, 1))).unwrap();
    let caret = env.engine.view_delete(view, DeleteMode::DELETE).unwrap();
    assert_eq!(env.texts(), ["ab"]);
    assert_eq!(env.at(caret), (0, 1));
    assert!(env.engine.doc().node(0).unwrap().style().is_none());
}

#[test]
fn hidden_neighbour_is_not_joined() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nhidden\nc");
    env.engine.set_paragraph_visible(1, false);
    let view = env.engine.create_view();

    env.engine.set_selection(view, env.sel((2, 0), (2, 0))).unwrap();
    let caret = env.engine.view_delete(view, DeleteMode::BACKSPACE).unwrap();
    assert_eq!(env.texts(), ["a", "hidden", "c"]);
    assert_eq!(env.at(caret), (2, 0));

    env.engine.set_selection(view, env.sel((0, 1), (0, 1))).unwrap();
    let caret = env.engine.view_delete(view, DeleteMode::DELETE).unwrap();
    assert_eq!(env.texts(), ["a", "hidden", "c"]);
    assert_eq!(env.at(caret), (0, 1));
    env.assert_invariants();
}

#[test]
fn backspace_at_document_start_does_nothing() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abc");
    let view = env.engine.create_view();
    let caret = env.engine.view_delete(view, DeleteMode::BACKSPACE).unwrap();
    assert_eq!(env.at(caret), (0, 0));
    assert_eq!(env.texts(), ["abc"]);
    assert!(!env.engine.can_undo());
}

#[test]
fn backspace_removes_one_character_delete_one_cell() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "e\u{301}x");
    let view = env.engine.create_view();
    env.engine.set_selection(view, env.sel((0, 3), (0, 3))).unwrap();
    env.engine.view_delete(view, DeleteMode::BACKSPACE).unwrap();
    assert_eq!(env.texts(), ["ex"]);

    let mut env = TestEnv::with_text(EngineConfig::default(), "e\u{301}x");
    let view = env.engine.create_view();
    env.engine.view_delete(view, DeleteMode::DELETE).unwrap();
    assert_eq!(env.texts(), ["x"]);
}

#[test]
fn word_delete_at_boundary_takes_previous_word() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "one two three");
    let view = env.engine.create_view();
    env.engine.set_selection(view, env.sel((0, 4), (0, 4))).unwrap();
    let caret = env
        .engine
        .view_delete(view, word(DeleteDirection::Backward))
        .unwrap();
    assert_eq!(env.texts(), ["two three"]);
    assert_eq!(env.at(caret), (0, 0));
}

#[test]
fn word_delete_inside_word_takes_its_rest() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "one two three");
    let view = env.engine.create_view();
    env.engine.set_selection(view, env.sel((0, 5), (0, 5))).unwrap();
    env.engine
        .view_delete(view, word(DeleteDirection::Forward))
        .unwrap();
    assert_eq!(env.texts(), ["one t three"]);

    env.engine.set_selection(view, env.sel((0, 9), (0, 9))).unwrap();
    env.engine
        .view_delete(view, word(DeleteDirection::Backward))
        .unwrap();
    assert_eq!(env.texts(), ["one t ee"]);
}

#[test]
fn paragraph_delete_stops_at_paragraph_edge() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "one two\nthree");
    let view = env.engine.create_view();
    env.engine.set_selection(view, env.sel((0, 4), (0, 4))).unwrap();
    let mode = DeleteMode {
        direction: DeleteDirection::Forward,
        granularity: DeleteGranularity::Paragraph,
    };
    env.engine.view_delete(view, mode).unwrap();
    assert_eq!(env.texts(), ["one ", "three"]);
}

#[test]
fn selection_delete_in_view() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello\nWorld");
    let view = env.engine.create_view();
    env.engine.set_selection(view, env.sel((1, 2), (0, 3))).unwrap();
    let caret = env.engine.view_delete(view, DeleteMode::DELETE).unwrap();
    assert_eq!(env.texts(), ["Helrld"]);
    assert_eq!(env.at(caret), (0, 3));
    let selection = env.engine.view(view).unwrap().selection();
    assert!(selection.is_caret());
    assert_eq!(env.at(selection.focus()), (0, 3));
}
