// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::{collections::VecDeque, string::String, vec::Vec};
use core::ops::Range;

use crate::attributes::{CharAttr, CharAttribs, ParaAttribs};
use crate::document::ContentNode;
use crate::style::StyleId;

/// The user level operation an undo step belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UndoKind {
    /// Single characters typed one after another. Consecutive typing merges
    /// into one step.
    Typing,
    /// Text insertion.
    Insert,
    /// Deletion.
    Delete,
    /// Paragraph split.
    Split,
    /// Paragraph join.
    Join,
    /// Feature insertion.
    Feature,
    /// Character or paragraph attribute change.
    Attributes,
    /// Paragraph insertion, removal or move.
    Paragraphs,
    /// IME composition.
    Composition,
    /// Replacement of the whole text.
    SetText,
}

/// One reversible primitive edit. Paragraphs are addressed by index, which is
/// stable while steps are replayed in order.
#[derive(Clone, Debug)]
pub(crate) enum EditUndo {
    InsertChars {
        para: usize,
        offset: usize,
        text: String,
    },
    RemoveChars {
        para: usize,
        offset: usize,
        text: String,
        /// Attributes before the removal when it truncated any.
        attribs: Option<CharAttribs>,
    },
    InsertFeature {
        para: usize,
        offset: usize,
        attr: CharAttr,
    },
    SplitPara {
        para: usize,
        offset: usize,
        attribs: CharAttribs,
    },
    Connect {
        left: usize,
        offset: usize,
        left_attribs: CharAttribs,
        right_attribs: CharAttribs,
        left_para: ParaAttribs,
        left_style: Option<StyleId>,
        right_para: ParaAttribs,
        right_style: Option<StyleId>,
        adopted: bool,
    },
    InsertNode {
        index: usize,
        node: ContentNode,
    },
    RemoveNode {
        index: usize,
        node: ContentNode,
    },
    MoveParagraphs {
        range: Range<usize>,
        dest: usize,
    },
    SetCharAttribs {
        para: usize,
        before: CharAttribs,
        after: CharAttribs,
    },
    SetParaAttribs {
        para: usize,
        before: (ParaAttribs, Option<StyleId>),
        after: (ParaAttribs, Option<StyleId>),
    },
}

impl EditUndo {
    /// Where the caret goes after undoing this step.
    pub(crate) fn undo_position(&self) -> (usize, usize) {
        match self {
            Self::InsertChars { para, offset, .. }
            | Self::InsertFeature { para, offset, .. }
            | Self::SplitPara { para, offset, .. } => (*para, *offset),
            Self::RemoveChars {
                para, offset, text, ..
            } => (*para, offset + text.len()),
            Self::Connect { left, .. } => (left + 1, 0),
            Self::InsertNode { index, .. } => (index.saturating_sub(1), 0),
            Self::RemoveNode { index, .. } => (*index, 0),
            Self::MoveParagraphs { range, .. } => (range.start, 0),
            Self::SetCharAttribs { para, .. } | Self::SetParaAttribs { para, .. } => (*para, 0),
        }
    }

    /// Where the caret goes after redoing this step.
    pub(crate) fn redo_position(&self) -> (usize, usize) {
        match self {
            Self::InsertChars {
                para, offset, text, ..
            } => (*para, offset + text.len()),
            Self::InsertFeature {
                para, offset, attr, ..
            } => (*para, offset + attr.feature_char().map_or(0, char::len_utf8)),
            Self::RemoveChars { para, offset, .. } => (*para, *offset),
            Self::SplitPara { para, .. } => (para + 1, 0),
            Self::Connect { left, offset, .. } => (*left, *offset),
            Self::InsertNode { index, .. } => (*index, 0),
            Self::RemoveNode { index, .. } => (index.saturating_sub(1), 0),
            Self::MoveParagraphs { range, dest } => {
                if *dest > range.end {
                    (dest - range.len(), 0)
                } else {
                    (*dest, 0)
                }
            }
            Self::SetCharAttribs { para, .. } | Self::SetParaAttribs { para, .. } => (*para, 0),
        }
    }
}

/// A group of primitive edits undone and redone together.
#[derive(Clone, Debug)]
pub(crate) struct UndoGroup {
    pub(crate) kind: UndoKind,
    pub(crate) actions: Vec<EditUndo>,
}

impl UndoGroup {
    fn new(kind: UndoKind) -> Self {
        Self {
            kind,
            actions: Vec::new(),
        }
    }

    /// Appends the typed text of `next` when both groups are a single run of
    /// typing and `next` continues where this one ends.
    fn try_merge(&mut self, next: &Self, limit: usize) -> bool {
        if self.kind != UndoKind::Typing || next.kind != UndoKind::Typing {
            return false;
        }
        let [EditUndo::InsertChars { para, offset, text }] = self.actions.as_mut_slice() else {
            return false;
        };
        let [EditUndo::InsertChars {
            para: next_para,
            offset: next_offset,
            text: next_text,
        }] = next.actions.as_slice()
        else {
            return false;
        };
        if *para != *next_para
            || *offset + text.len() != *next_offset
            || text.chars().count() + next_text.chars().count() > limit
        {
            return false;
        }
        text.push_str(next_text);
        true
    }
}

/// Undo and redo stacks with grouping.
#[derive(Clone, Debug)]
pub(crate) struct UndoManager {
    undo: VecDeque<UndoGroup>,
    redo: Vec<UndoGroup>,
    open: Option<UndoGroup>,
    depth: usize,
    replaying: bool,
    enabled: bool,
    max_groups: usize,
    merge_limit: usize,
}

impl UndoManager {
    pub(crate) fn new(enabled: bool, max_groups: usize, merge_limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            open: None,
            depth: 0,
            replaying: false,
            enabled,
            max_groups,
            merge_limit,
        }
    }

    /// Opens a group. Nested groups fold into the outermost one.
    pub(crate) fn begin(&mut self, kind: UndoKind) {
        if self.depth == 0 {
            self.open = Some(UndoGroup::new(kind));
        }
        self.depth += 1;
    }

    /// Closes a group, committing it when it is the outermost one.
    pub(crate) fn end(&mut self) {
        debug_assert!(self.depth > 0, "unbalanced undo group");
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            if let Some(group) = self.open.take() {
                self.push(group);
            }
        }
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.enabled && !self.replaying
    }

    pub(crate) fn set_replaying(&mut self, replaying: bool) {
        self.replaying = replaying;
    }

    pub(crate) fn record(&mut self, action: EditUndo) {
        if !self.is_recording() {
            return;
        }
        match &mut self.open {
            Some(group) => group.actions.push(action),
            None => {
                let mut group = UndoGroup::new(UndoKind::Insert);
                group.actions.push(action);
                self.push(group);
            }
        }
    }

    fn push(&mut self, group: UndoGroup) {
        if group.actions.is_empty() {
            return;
        }
        self.redo.clear();
        if let Some(last) = self.undo.back_mut() {
            if last.try_merge(&group, self.merge_limit) {
                return;
            }
        }
        self.undo.push_back(group);
        while self.undo.len() > self.max_groups.max(1) {
            self.undo.pop_front();
        }
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub(crate) fn pop_undo(&mut self) -> Option<UndoGroup> {
        self.undo.pop_back()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<UndoGroup> {
        self.redo.pop()
    }

    /// Stores a group that was just undone.
    pub(crate) fn push_redo(&mut self, group: UndoGroup) {
        self.redo.push(group);
    }

    /// Stores a group that was just redone, keeping the redo stack.
    pub(crate) fn push_undone(&mut self, group: UndoGroup) {
        self.undo.push_back(group);
    }

    /// Drops all history, including an open group.
    pub(crate) fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.open = None;
        self.depth = 0;
        self.replaying = false;
    }

    pub(crate) fn is_group_open(&self) -> bool {
        self.depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::{EditUndo, UndoKind, UndoManager};

    fn typed(offset: usize, text: &str) -> EditUndo {
        EditUndo::InsertChars {
            para: 0,
            offset,
            text: text.into(),
        }
    }

    fn type_group(manager: &mut UndoManager, offset: usize, text: &str) {
        manager.begin(UndoKind::Typing);
        manager.record(typed(offset, text));
        manager.end();
    }

    #[test]
    fn consecutive_typing_merges_up_to_limit() {
        let mut manager = UndoManager::new(true, 10, 3);
        type_group(&mut manager, 0, "a");
        type_group(&mut manager, 1, "b");
        type_group(&mut manager, 2, "c");
        type_group(&mut manager, 3, "d");
        let last = manager.pop_undo().unwrap();
        assert!(matches!(&last.actions[..], [EditUndo::InsertChars { text, .. }] if text == "d"));
        let first = manager.pop_undo().unwrap();
        assert!(matches!(&first.actions[..], [EditUndo::InsertChars { text, .. }] if text == "abc"));
        assert!(!manager.can_undo());
    }

    #[test]
    fn typing_elsewhere_does_not_merge() {
        let mut manager = UndoManager::new(true, 10, 10);
        type_group(&mut manager, 0, "a");
        type_group(&mut manager, 5, "b");
        manager.pop_undo().unwrap();
        assert!(manager.can_undo());
    }

    #[test]
    fn nested_groups_fold_and_new_group_clears_redo() {
        let mut manager = UndoManager::new(true, 10, 10);
        manager.begin(UndoKind::Insert);
        manager.record(typed(0, "x"));
        manager.begin(UndoKind::Delete);
        manager.record(typed(1, "y"));
        manager.end();
        assert!(!manager.can_undo());
        manager.end();
        let group = manager.pop_undo().unwrap();
        assert_eq!(group.kind, UndoKind::Insert);
        assert_eq!(group.actions.len(), 2);
        manager.push_redo(group);
        assert!(manager.can_redo());
        type_group(&mut manager, 0, "z");
        assert!(!manager.can_redo());
    }

    #[test]
    fn limit_drops_oldest_and_replay_is_not_recorded() {
        let mut manager = UndoManager::new(true, 2, 1);
        for i in 0..3 {
            manager.begin(UndoKind::Insert);
            manager.record(typed(i, "a"));
            manager.end();
        }
        manager.set_replaying(true);
        manager.record(typed(9, "b"));
        manager.set_replaying(false);
        let mut count = 0;
        while manager.pop_undo().is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn disabled_manager_records_nothing() {
        let mut manager = UndoManager::new(false, 10, 10);
        type_group(&mut manager, 0, "a");
        assert!(!manager.can_undo());
    }
}
