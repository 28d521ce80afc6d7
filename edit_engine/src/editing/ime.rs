// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input method composition.
//!
//! The composed text lives in the document like any other text. One
//! composition is active at a time; all its edits form a single undo step.

use alloc::{string::String, vec::Vec};
use core::ops::Range;

use crate::document::{EditDoc, EditPaM, EditSelection, NodeId};
use crate::error::Error;
use crate::layout::ParaPortion;

use super::engine::EditEngine;
use super::sync::{remap, Gravity, RemapEvent};
use super::undo::UndoKind;
use super::view::ViewId;

/// Display attributes an input method assigns to composed characters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImeAttr {
    /// Thin underline.
    pub underline: bool,
    /// Thick underline, usually the clause being converted.
    pub bold_underline: bool,
    /// Highlighted background.
    pub highlight: bool,
}

/// State of the active composition.
#[derive(Clone, Debug)]
pub(crate) struct ImeComposition {
    pub(crate) view: ViewId,
    /// Start of the composed text.
    anchor: EditPaM,
    /// End of the composed text. Text other views insert at either edge
    /// stays outside the composition.
    end: EditPaM,
    /// Text replaced by the composition in overwrite mode.
    saved: String,
    attrs: Vec<ImeAttr>,
    cursor: usize,
    insert_mode: bool,
}

impl ImeComposition {
    /// Start and end of the composed text.
    #[cfg(test)]
    pub(crate) fn ends(&self) -> [EditPaM; 2] {
        [self.anchor, self.end]
    }

    /// Paragraph and byte range of the composed text.
    fn span(&self, doc: &EditDoc) -> Option<(usize, Range<usize>)> {
        let (para, start) = doc.resolve(self.anchor)?;
        let (end_para, end) = doc.resolve(self.end)?;
        (end_para == para).then(|| (para, start..end.max(start)))
    }

    /// Follows a structural change. Returns `false` when the composed run
    /// no longer lies in one live paragraph.
    pub(crate) fn remap(
        &mut self,
        event: RemapEvent,
        doc: &EditDoc,
        portions: &[ParaPortion],
    ) -> bool {
        let lost = |node: NodeId| {
            matches!(event, RemapEvent::NodeRemoved { node: removed, .. } if removed == node)
        };
        if lost(self.anchor.node()) || lost(self.end.node()) {
            return false;
        }
        remap(&mut self.anchor, event, Gravity::After, doc, portions);
        remap(&mut self.end, event, Gravity::Before, doc, portions);
        if self.anchor.node() != self.end.node() {
            return false;
        }
        if self.end.index() < self.anchor.index() {
            self.end = self.anchor;
        }
        true
    }
}

impl EditEngine {
    /// Starts a composition at the selection of view `view`, deleting the
    /// selected text.
    pub fn ime_start(&mut self, view: ViewId) -> Result<(), Error> {
        if self.ime.is_some() {
            return Err(Error::composition_active());
        }
        let state = self.views.get(view).ok_or_else(Error::invalid_view)?;
        let (selection, insert_mode) = (state.selection, state.insert_mode());
        self.undo.begin(UndoKind::Composition);
        self.begin_op(UndoKind::Composition);
        let (start, end) = self.doc.ordered(selection);
        let (para, offset) = self.imp_delete_range(start, end);
        let anchor = self.doc.pam(para, offset);
        self.ime = Some(ImeComposition {
            view,
            anchor,
            end: anchor,
            saved: String::new(),
            attrs: Vec::new(),
            cursor: 0,
            insert_mode,
        });
        self.set_view_caret(view, anchor);
        self.end_op();
        log::debug!("composition started in view {view:?}");
        Ok(())
    }

    /// Replaces the composed text.
    ///
    /// `attrs` holds one entry per character of `text`; `cursor` is a byte
    /// offset into `text` where the caret is shown. Paragraph separators
    /// are dropped. In overwrite mode the composition covers as many
    /// characters after the anchor as it holds.
    pub fn ime_update(&mut self, text: &str, attrs: &[ImeAttr], cursor: usize) -> Result<(), Error> {
        let Some(ime) = self.ime.as_ref() else {
            return Err(Error::no_composition());
        };
        let (view, insert_mode) = (ime.view, ime.insert_mode);
        let saved = ime.saved.clone();
        let (para, composed) = self.composed_span(ime);
        let text: String = text
            .chars()
            .filter(|c| !matches!(c, '\r' | '\n' | '\u{2028}' | '\u{2029}' | '\u{FFFC}'))
            .collect();

        self.begin_op(UndoKind::Composition);
        let offset = composed.start;
        self.imp_remove_chars(para, offset, composed.end);
        self.imp_insert_text(para, offset, &saved);
        let saved = if insert_mode {
            String::new()
        } else {
            let node_text = self.doc.node(para).map_or("", |n| n.text());
            let end = node_text[offset..]
                .char_indices()
                .nth(text.chars().count())
                .map_or(node_text.len(), |(i, _)| offset + i);
            self.imp_remove_chars(para, offset, end)
        };
        let available = self
            .config
            .max_paragraph_len
            .saturating_sub(self.doc.node(para).map_or(0, |n| n.len()));
        let mut fit = text.len().min(available);
        while !text.is_char_boundary(fit) {
            fit -= 1;
        }
        if fit < text.len() {
            log::warn!("paragraph length limit reached, composition truncated");
        }
        let text = &text[..fit];
        self.imp_insert_text(para, offset, text);
        let mut cursor = cursor.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        let (anchor, end) = (
            self.doc.pam(para, offset),
            self.doc.pam(para, offset + text.len()),
        );
        if let Some(ime) = &mut self.ime {
            ime.anchor = anchor;
            ime.end = end;
            ime.saved = saved;
            ime.attrs = attrs.iter().copied().take(text.chars().count()).collect();
            ime.cursor = cursor;
        }
        let caret = self.doc.pam(para, offset + cursor);
        self.set_view_caret(view, caret);
        self.end_op();
        Ok(())
    }

    /// Ends the composition. With `commit` the composed text stays;
    /// otherwise it is removed and any overwritten text comes back.
    /// Returns the caret position.
    pub fn ime_end(&mut self, commit: bool) -> Result<EditPaM, Error> {
        let ime = self.ime.take().ok_or_else(Error::no_composition)?;
        let (para, composed) = self.composed_span(&ime);
        self.begin_op(UndoKind::Composition);
        let end = if commit {
            composed.end
        } else {
            self.imp_remove_chars(para, composed.start, composed.end);
            self.imp_insert_text(para, composed.start, &ime.saved);
            composed.start
        };
        let caret = self.doc.pam(para, end);
        self.set_view_caret(ime.view, caret);
        self.end_op();
        self.undo.end();
        log::debug!(
            "composition {} in view {:?}",
            if commit { "committed" } else { "cancelled" },
            ime.view
        );
        Ok(caret)
    }

    fn composed_span(&self, ime: &ImeComposition) -> (usize, Range<usize>) {
        ime.span(&self.doc).unwrap_or_else(|| {
            let (para, offset) = self.locate(ime.anchor);
            (para, offset..offset)
        })
    }

    /// Ends the composition without touching its text, after an edit from
    /// another view removed or split the paragraph holding it.
    pub(crate) fn drop_composition(&mut self) {
        if let Some(ime) = self.ime.take() {
            self.undo.end();
            log::debug!("composition in view {:?} ended by an edit", ime.view);
        }
    }

    /// Returns `true` while a composition is active.
    pub fn is_composing(&self) -> bool {
        self.ime.is_some()
    }

    /// Range of the composed text.
    pub fn composition_range(&self) -> Option<EditSelection> {
        let ime = self.ime.as_ref()?;
        let (para, composed) = ime.span(&self.doc)?;
        Some(EditSelection::new(
            self.doc.pam(para, composed.start),
            self.doc.pam(para, composed.end),
        ))
    }

    /// Display attributes of the composed characters.
    pub fn composition_attrs(&self) -> &[ImeAttr] {
        self.ime
            .as_ref()
            .map(|ime| ime.attrs.as_slice())
            .unwrap_or_default()
    }

    /// Caret offset within the composed text.
    pub fn composition_cursor(&self) -> Option<usize> {
        self.ime.as_ref().map(|ime| ime.cursor)
    }
}
