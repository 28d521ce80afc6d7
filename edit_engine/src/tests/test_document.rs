// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::field::FieldKind;
use crate::{
    CharAttr, EditEngine, EditSelection, EngineConfig, EngineServices, Feature, Notification,
    ParagraphSeparator,
};

use super::utils::{TestEnv, VariableResolver};

#[test]
fn insert_and_query() {
    let mut env = TestEnv::new();
    let start = env.pam(0, 0);
    let inserted = env.engine.insert_text(start, "Hello\nWorld");
    assert!(!inserted.truncated);
    assert_eq!(env.texts(), ["Hello", "World"]);
    assert_eq!(env.at(inserted.end), (1, 5));

    let doc = env.engine.doc();
    let all = EditSelection::new(doc.start_pam(), doc.end_pam());
    assert_eq!(env.engine.get_selected(all), "Hello\nWorld");
    assert_eq!(
        env.take_notifications(),
        [Notification::ParagraphInserted(1), Notification::TextModified]
    );
    env.assert_invariants();
}

#[test]
fn selected_text_uses_configured_separator() {
    let config = EngineConfig {
        separator: ParagraphSeparator::CrLf,
        ..EngineConfig::default()
    };
    let env = TestEnv::with_text(config, "one\rtwo\r\nthree");
    assert_eq!(env.texts(), ["one", "two", "three"]);
    let selection = env.sel((0, 1), (2, 2));
    assert_eq!(env.engine.get_selected(selection), "ne\r\ntwo\r\nth");
}

#[test]
fn features_render_in_text() {
    let mut env = TestEnv::new();
    let end = env.engine.insert_text(env.pam(0, 0), "a\tb\u{2028}c").end;
    let end = env
        .engine
        .insert_feature(end, Feature::Field(FieldKind::Variable("name".into())));
    let node = env.engine.doc().node(0).unwrap();
    assert_eq!(node.text(), "a\tb\u{2028}c\u{FFFC}");
    assert_eq!(env.at(end), (0, node.len()));
    assert_eq!(node.char_attribs().features().count(), 3);
    assert_eq!(env.engine.text(), "a\tb\ncname");
    env.assert_invariants();
}

#[test]
fn stray_placeholders_are_dropped() {
    let mut env = TestEnv::new();
    env.engine.insert_text(env.pam(0, 0), "x\u{FFFC}y");
    assert_eq!(env.texts(), ["xy"]);
}

#[test]
fn attributes_stay_inside_paragraphs() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello world");
    env.engine
        .set_char_attrib(env.sel((0, 2), (0, 9)), CharAttr::Italic(true));
    env.engine.insert_text(env.pam(0, 4), "XYZ");
    env.engine.delete_range(env.sel((0, 1), (0, 6)));
    env.engine.split_paragraph(env.pam(0, 3));
    env.engine.delete_range(env.sel((0, 2), (1, 4)));
    env.engine.insert_text(env.pam(0, 0), "a\nb\nc");
    env.engine.remove_chars(env.pam(2, 0), 3);
    env.assert_invariants();
}

#[test]
fn attribute_expands_with_inserted_text() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "abcdef");
    env.engine
        .set_char_attrib(env.sel((0, 1), (0, 4)), CharAttr::Weight(crate::FontWeight::BOLD));
    env.engine.insert_text(env.pam(0, 2), "xx");
    let node = env.engine.doc().node(0).unwrap();
    let bold: Vec<_> = node.char_attribs().iter().map(|a| a.range()).collect();
    assert_eq!(bold, [1..6]);
}

#[test]
fn paragraph_operations_notify() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb\nc");
    env.engine.insert_paragraph(1, "new");
    assert_eq!(env.texts(), ["a", "new", "b", "c"]);
    assert_eq!(
        env.take_notifications(),
        [Notification::ParagraphInserted(1), Notification::TextModified]
    );

    assert!(env.engine.move_paragraphs(0..2, 4));
    assert_eq!(env.texts(), ["b", "c", "a", "new"]);
    assert_eq!(
        env.take_notifications(),
        [
            Notification::ParagraphsMoved {
                range: 0..2,
                dest: 4
            },
            Notification::TextModified
        ]
    );

    assert!(env.engine.remove_paragraph(0));
    assert_eq!(env.texts(), ["c", "a", "new"]);
    assert_eq!(
        env.take_notifications(),
        [Notification::ParagraphDeleted(0), Notification::TextModified]
    );
    env.assert_invariants();
}

#[test]
fn last_paragraph_survives_removal() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "only");
    assert!(!env.engine.remove_paragraph(0));
    assert_eq!(env.texts(), ["only"]);
}

#[test]
fn clear_leaves_one_empty_paragraph() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "a\nb");
    let view = env.engine.create_view();
    env.engine.select_all(view).unwrap();
    env.engine.clear();
    assert_eq!(env.texts(), [""]);
    assert!(!env.engine.can_undo());
    let selection = env.engine.view(view).unwrap().selection();
    assert!(selection.is_caret());
    assert_eq!(env.at(selection.focus()), (0, 0));
}

#[test]
fn set_text_is_not_undoable() {
    let mut env = TestEnv::new();
    env.engine.set_text("fresh\ntext");
    assert_eq!(env.texts(), ["fresh", "text"]);
    assert!(!env.engine.can_undo());
}

#[test]
fn update_fields_reports_changes() {
    let resolver = VariableResolver::default();
    *resolver.value.borrow_mut() = "1".into();
    let services = EngineServices {
        fields: Box::new(resolver.clone()),
        ..EngineServices::default()
    };
    let mut env = TestEnv::with_services(EngineConfig::default(), services);
    let field = Feature::Field(FieldKind::Variable("page".into()));
    let end = env.engine.insert_text(env.pam(0, 0), "p. ").end;
    env.engine.insert_feature(end, field);
    assert_eq!(env.engine.text(), "p. 1");
    env.engine.format_all();
    assert!(!env.engine.script_runs(0).is_empty());
    env.take_notifications();

    assert_eq!(env.engine.update_fields(), 0);
    assert!(env.take_notifications().is_empty());
    assert!(!env.engine.has_pending_format());
    assert!(!env.engine.doc().node(0).unwrap().scripts.is_empty());

    *resolver.value.borrow_mut() = "12".into();
    assert_eq!(env.engine.update_fields(), 1);
    assert_eq!(env.engine.text(), "p. 12");
    assert_eq!(env.take_notifications(), [Notification::TextModified]);
}

#[test]
fn wrong_ranges_follow_edits() {
    let mut env = TestEnv::with_text(EngineConfig::default(), "Hello wrold");
    env.engine.wrong_list_mut(0).unwrap().mark_wrong(6..11);
    env.engine.insert_text(env.pam(0, 0), "Oh ");
    let ranges = env.engine.doc().node(0).unwrap().wrong_list().unwrap().ranges().to_vec();
    assert_eq!(ranges, [9..14]);

    env.engine.split_paragraph(env.pam(0, 9));
    let right = env.engine.doc().node(1).unwrap().wrong_list().unwrap();
    assert_eq!(right.ranges(), [0..5]);
}

#[test]
fn styles_detach_before_removal() {
    let mut engine = EditEngine::new(EngineConfig::default());
    engine.insert_text(engine.doc().start_pam(), "a\nb");
    let heading = crate::StyleId::new("heading");
    engine.set_style(0, Some(heading.clone()));
    engine.set_style(1, Some(heading.clone()));
    assert_eq!(engine.detach_style(&heading), 2);
    assert!(engine.doc().paragraphs().all(|n| n.style().is_none()));
}
