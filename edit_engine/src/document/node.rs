// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::{string::String, vec::Vec};
use core::ops::Range;

use crate::analysis::{DirectionRun, ScriptRun};
use crate::attributes::{CharAttr, CharAttribs, CharAttribute, ParaAttribs};
use crate::field::FieldKind;
use crate::style::StyleId;

use super::WrongList;

/// One paragraph: text, attributes, style and derived analysis caches.
#[derive(Clone, Debug, Default)]
pub struct ContentNode {
    text: String,
    attribs: CharAttribs,
    para_attribs: ParaAttribs,
    style: Option<StyleId>,
    wrong_list: Option<WrongList>,
    /// Script runs; empty when stale.
    pub(crate) scripts: Vec<ScriptRun>,
    /// Direction runs; empty when stale.
    pub(crate) directions: Vec<DirectionRun>,
}

impl ContentNode {
    /// Creates a paragraph holding `text`.
    ///
    /// `text` must not contain paragraph separators.
    pub fn new(text: &str) -> Self {
        debug_assert!(
            !text.contains(['\n', '\r']),
            "paragraph text cannot contain paragraph separators"
        );
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets the named style.
    #[must_use]
    pub fn with_style(mut self, style: Option<StyleId>) -> Self {
        self.style = style;
        self
    }

    /// Sets the paragraph attributes.
    #[must_use]
    pub fn with_para_attribs(mut self, attribs: ParaAttribs) -> Self {
        self.para_attribs = attribs;
        self
    }

    /// The paragraph text, including feature placeholders.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the paragraph has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Character attributes.
    pub fn char_attribs(&self) -> &CharAttribs {
        &self.attribs
    }

    /// Directly applied paragraph attributes.
    pub fn para_attribs(&self) -> &ParaAttribs {
        &self.para_attribs
    }

    /// The named style, if any.
    pub fn style(&self) -> Option<&StyleId> {
        self.style.as_ref()
    }

    /// Spell check state, if a checker has attached one.
    pub fn wrong_list(&self) -> Option<&WrongList> {
        self.wrong_list.as_ref()
    }

    /// The feature at `offset`, if the character there is a placeholder.
    pub fn feature_at(&self, offset: usize) -> Option<&CharAttribute> {
        self.attribs.feature_at(offset)
    }

    /// Offset of the character before `offset`, or 0.
    pub fn prev_char_boundary(&self, offset: usize) -> usize {
        self.text[..offset.min(self.len())]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    /// Offset after the character at `offset`, or the paragraph length.
    pub fn next_char_boundary(&self, offset: usize) -> usize {
        self.text[offset.min(self.len())..]
            .chars()
            .next()
            .map_or(self.len(), |c| offset + c.len_utf8())
    }

    /// Clamps `offset` to the text and rounds it down to a char boundary.
    pub fn clamp_offset(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Appends the text of `range` to `out`, with manual line breaks as
    /// `'\n'` and fields as their current value.
    pub(crate) fn render_into(&self, range: Range<usize>, out: &mut String) {
        for (i, c) in self.text[range.clone()].char_indices() {
            let offset = range.start + i;
            match self.attribs.feature_at(offset).map(|f| f.value()) {
                Some(CharAttr::LineBreak) => out.push('\n'),
                Some(CharAttr::Field(field)) => out.push_str(field.value()),
                _ => out.push(c),
            }
        }
    }

    pub(crate) fn invalidate_analysis(&mut self) {
        self.scripts.clear();
        self.directions.clear();
    }

    pub(crate) fn insert_text(&mut self, offset: usize, text: &str) {
        self.text.insert_str(offset, text);
        self.attribs.expand(offset, text.len());
        if let Some(list) = &mut self.wrong_list {
            list.text_inserted(offset, text.len());
        }
        self.invalidate_analysis();
    }

    pub(crate) fn insert_feature(&mut self, offset: usize, attr: CharAttr) -> usize {
        let Some(ch) = attr.feature_char() else {
            return 0;
        };
        let len = ch.len_utf8();
        self.text.insert(offset, ch);
        self.attribs.expand(offset, len);
        self.attribs.push_feature(offset, len, attr);
        if let Some(list) = &mut self.wrong_list {
            list.text_inserted(offset, len);
        }
        self.invalidate_analysis();
        len
    }

    pub(crate) fn remove_text(&mut self, start: usize, end: usize) -> String {
        let removed: String = self.text.drain(start..end).collect();
        self.attribs.collapse(start, end);
        if let Some(list) = &mut self.wrong_list {
            list.text_removed(start, end);
        }
        self.invalidate_analysis();
        removed
    }

    /// Moves the text after `offset` into a new paragraph that shares this
    /// paragraph's style and paragraph attributes.
    pub(crate) fn split_off(&mut self, offset: usize, keep_ending: bool) -> Self {
        let text = self.text.split_off(offset);
        let attribs = self.attribs.split_off(offset, keep_ending);
        let wrong_list = self.wrong_list.as_mut().map(|list| list.split_off(offset));
        self.invalidate_analysis();
        Self {
            text,
            attribs,
            para_attribs: self.para_attribs.clone(),
            style: self.style.clone(),
            wrong_list,
            scripts: Vec::new(),
            directions: Vec::new(),
        }
    }

    /// Appends `other`, merging attributes at the junction.
    pub(crate) fn append(&mut self, other: Self) {
        let offset = self.len();
        self.text.push_str(&other.text);
        self.attribs.append(other.attribs, offset);
        match (&mut self.wrong_list, other.wrong_list) {
            (Some(list), Some(other)) => list.append(other, offset),
            (None, Some(other)) => {
                let mut list = WrongList::new();
                list.mark_invalid(0..offset);
                list.append(other, offset);
                self.wrong_list = Some(list);
            }
            (Some(list), None) => list.mark_invalid(offset..self.text.len()),
            (None, None) => {}
        }
        self.invalidate_analysis();
    }

    pub(crate) fn attribs_mut(&mut self) -> &mut CharAttribs {
        self.invalidate_analysis();
        &mut self.attribs
    }

    /// Re-expands the field placeholders with `expand`, called with each
    /// field and its offset. Returns the number of values that changed.
    pub(crate) fn refresh_fields(
        &mut self,
        mut expand: impl FnMut(&FieldKind, usize) -> String,
    ) -> usize {
        let mut changed = 0;
        for (offset, field) in self.attribs.fields_mut() {
            let value = expand(field.kind(), offset);
            if value != field.value() {
                field.set_value(value);
                changed += 1;
            }
        }
        if changed > 0 {
            self.invalidate_analysis();
        }
        changed
    }

    pub(crate) fn set_char_attribs(&mut self, attribs: CharAttribs) {
        self.attribs = attribs;
        self.invalidate_analysis();
    }

    pub(crate) fn set_para_attribs(&mut self, attribs: ParaAttribs) {
        self.para_attribs = attribs;
        self.invalidate_analysis();
    }

    pub(crate) fn set_style(&mut self, style: Option<StyleId>) {
        self.style = style;
        self.invalidate_analysis();
    }

    pub(crate) fn wrong_list_mut(&mut self) -> &mut WrongList {
        self.wrong_list.get_or_insert_with(WrongList::new)
    }
}
