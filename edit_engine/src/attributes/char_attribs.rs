// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::{sync::Arc, vec::Vec};
use core::ops::Range;

use peniko::Color;
use smallvec::SmallVec;

use crate::analysis::ScriptType;
use crate::field::FieldPlaceholder;
use crate::measure::FontWeight;

/// Placeholder character stored in the text for a tab feature.
pub const TAB_CHAR: char = '\t';

/// Placeholder character stored in the text for a manual line break feature.
pub const LINE_BREAK_CHAR: char = '\u{2028}';

/// Placeholder character stored in the text for a field feature.
pub const FIELD_CHAR: char = '\u{FFFC}';

/// A character attribute value.
///
/// The last three variants are *features*: single placeholder characters in
/// the text whose meaning is carried by the attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum CharAttr {
    /// Font family name.
    FontFamily(Arc<str>),
    /// Font size in layout units.
    FontSize(f32),
    /// Font weight.
    Weight(FontWeight),
    /// Italic or upright.
    Italic(bool),
    /// Underline decoration.
    Underline(bool),
    /// Text color.
    Color(Color),
    /// Forces the script type of the covered text.
    ScriptHint(ScriptType),
    /// Tab feature.
    Tab,
    /// Manual line break feature.
    LineBreak,
    /// Field feature with its resolved value.
    Field(FieldPlaceholder),
}

impl CharAttr {
    /// Returns the kind of this attribute.
    pub fn kind(&self) -> CharAttrKind {
        match self {
            Self::FontFamily(_) => CharAttrKind::FontFamily,
            Self::FontSize(_) => CharAttrKind::FontSize,
            Self::Weight(_) => CharAttrKind::Weight,
            Self::Italic(_) => CharAttrKind::Italic,
            Self::Underline(_) => CharAttrKind::Underline,
            Self::Color(_) => CharAttrKind::Color,
            Self::ScriptHint(_) => CharAttrKind::ScriptHint,
            Self::Tab => CharAttrKind::Tab,
            Self::LineBreak => CharAttrKind::LineBreak,
            Self::Field(_) => CharAttrKind::Field,
        }
    }

    /// Returns `true` for tab, line break and field attributes.
    pub fn is_feature(&self) -> bool {
        self.kind().is_feature()
    }

    /// The placeholder character a feature occupies in the text.
    pub fn feature_char(&self) -> Option<char> {
        match self {
            Self::Tab => Some(TAB_CHAR),
            Self::LineBreak => Some(LINE_BREAK_CHAR),
            Self::Field(_) => Some(FIELD_CHAR),
            _ => None,
        }
    }
}

/// The kind of a [`CharAttr`], without its value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CharAttrKind {
    /// See [`CharAttr::FontFamily`].
    FontFamily,
    /// See [`CharAttr::FontSize`].
    FontSize,
    /// See [`CharAttr::Weight`].
    Weight,
    /// See [`CharAttr::Italic`].
    Italic,
    /// See [`CharAttr::Underline`].
    Underline,
    /// See [`CharAttr::Color`].
    Color,
    /// See [`CharAttr::ScriptHint`].
    ScriptHint,
    /// See [`CharAttr::Tab`].
    Tab,
    /// See [`CharAttr::LineBreak`].
    LineBreak,
    /// See [`CharAttr::Field`].
    Field,
}

impl CharAttrKind {
    /// Returns `true` for the feature kinds.
    pub fn is_feature(self) -> bool {
        matches!(self, Self::Tab | Self::LineBreak | Self::Field)
    }
}

/// An attribute applied to a byte range of a paragraph.
///
/// Empty attributes (`start == end`) are allowed and mark formatting that
/// typed text at that position picks up.
#[derive(Clone, Debug, PartialEq)]
pub struct CharAttribute {
    start: usize,
    end: usize,
    value: CharAttr,
}

impl CharAttribute {
    /// Creates a new attribute covering `range`.
    pub fn new(range: Range<usize>, value: CharAttr) -> Self {
        debug_assert!(range.start <= range.end, "attribute range is inverted");
        Self {
            start: range.start,
            end: range.end,
            value,
        }
    }

    /// Byte range covered by the attribute.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Start of the covered range.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End of the covered range.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The attribute value.
    pub fn value(&self) -> &CharAttr {
        &self.value
    }

    /// Returns `true` if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` for tab, line break and field attributes.
    pub fn is_feature(&self) -> bool {
        self.value.is_feature()
    }

    /// Returns `true` if the character starting at `offset` is covered.
    pub fn covers(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    fn shift(&mut self, delta: usize) {
        self.start += delta;
        self.end += delta;
    }
}

/// The attribute list of one paragraph, sorted by start offset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharAttribs {
    attrs: Vec<CharAttribute>,
}

impl CharAttribs {
    /// Creates an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes, including empty ones.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Returns `true` if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterates the attributes in start order.
    pub fn iter(&self) -> impl Iterator<Item = &CharAttribute> + '_ {
        self.attrs.iter()
    }

    /// Iterates the feature attributes.
    pub fn features(&self) -> impl Iterator<Item = &CharAttribute> + '_ {
        self.attrs.iter().filter(|a| a.is_feature())
    }

    /// The effective value of `kind` for the character at `offset`.
    ///
    /// When several attributes of the same kind cover the character, the one
    /// added last wins.
    pub fn value_at(&self, kind: CharAttrKind, offset: usize) -> Option<&CharAttr> {
        self.attrs
            .iter()
            .rev()
            .find(|a| a.value.kind() == kind && a.covers(offset))
            .map(|a| &a.value)
    }

    /// The feature occupying the character at `offset`, if any.
    pub fn feature_at(&self, offset: usize) -> Option<&CharAttribute> {
        self.attrs
            .iter()
            .find(|a| a.is_feature() && a.start == offset)
    }

    /// Offsets where any attribute starts or ends, sorted and deduplicated.
    pub(crate) fn change_points(&self) -> Vec<usize> {
        let mut points: Vec<usize> = self
            .attrs
            .iter()
            .filter(|a| !a.is_empty())
            .flat_map(|a| [a.start, a.end])
            .collect();
        points.sort_unstable();
        points.dedup();
        points
    }

    /// Returns `true` if removing `start..end` would truncate or drop any
    /// attribute.
    pub(crate) fn touches(&self, start: usize, end: usize) -> bool {
        self.attrs
            .iter()
            .any(|a| (a.start < end && a.end > start) || (start..=end).contains(&a.start))
    }

    /// Field placeholders with their offsets.
    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = (usize, &mut FieldPlaceholder)> + '_ {
        self.attrs.iter_mut().filter_map(|a| match &mut a.value {
            CharAttr::Field(field) => Some((a.start, field)),
            _ => None,
        })
    }

    pub(crate) fn push_feature(&mut self, offset: usize, len: usize, value: CharAttr) {
        debug_assert!(value.is_feature(), "only features occupy a placeholder");
        self.attrs
            .push(CharAttribute::new(offset..offset + len, value));
        self.sort();
    }

    /// Applies `value` to `range`, replacing any coverage of the same kind.
    ///
    /// Equal attributes that end up adjacent are merged. An empty range sets
    /// the formatting picked up by text typed at that position.
    pub(crate) fn set(&mut self, range: Range<usize>, value: CharAttr) {
        debug_assert!(!value.is_feature(), "features are inserted with their text");
        let kind = value.kind();
        if range.is_empty() {
            self.attrs
                .retain(|a| !(a.value.kind() == kind && a.is_empty() && a.start == range.start));
            self.attrs.push(CharAttribute::new(range, value));
            self.sort();
            return;
        }
        self.remove_kind(range.clone(), kind);
        let (mut start, mut end) = (range.start, range.end);
        self.attrs.retain(|a| {
            if a.value != value || a.is_empty() {
                return true;
            }
            if a.end == start {
                start = a.start;
                false
            } else if a.start == end {
                end = a.end;
                false
            } else {
                true
            }
        });
        self.attrs.push(CharAttribute::new(start..end, value));
        self.sort();
    }

    /// Removes coverage of `kind` from `range`, splitting attributes that
    /// straddle it. Features are never removed this way.
    pub(crate) fn remove_kind(&mut self, range: Range<usize>, kind: CharAttrKind) {
        if kind.is_feature() {
            return;
        }
        let (s, e) = (range.start, range.end);
        let mut tail = Vec::new();
        self.attrs.retain_mut(|a| {
            if a.value.kind() != kind {
                return true;
            }
            if a.is_empty() {
                return a.start < s || a.start > e;
            }
            if a.end <= s || a.start >= e {
                return true;
            }
            if a.start < s && a.end > e {
                tail.push(CharAttribute::new(e..a.end, a.value.clone()));
                a.end = s;
                true
            } else if a.start < s {
                a.end = s;
                true
            } else if a.end > e {
                a.start = e;
                true
            } else {
                false
            }
        });
        self.attrs.extend(tail);
        self.sort();
    }

    /// Adjusts the list for `len` bytes inserted at `offset`.
    ///
    /// An attribute that ends at the insertion point grows to cover the new
    /// text, unless an empty attribute of the same kind sits there. An
    /// attribute that starts at the insertion point moves, except at offset 0
    /// where it grows. Empty attributes at the insertion point grow.
    pub(crate) fn expand(&mut self, offset: usize, len: usize) {
        let blocked: SmallVec<[CharAttrKind; 4]> = self
            .attrs
            .iter()
            .filter(|a| !a.is_feature() && a.is_empty() && a.start == offset)
            .map(|a| a.value.kind())
            .collect();
        for a in &mut self.attrs {
            let kind = a.value.kind();
            if kind.is_feature() {
                if a.start >= offset {
                    a.shift(len);
                }
                continue;
            }
            if a.start > offset {
                a.shift(len);
            } else if a.start == offset {
                if a.is_empty() || (offset == 0 && !blocked.contains(&kind)) {
                    a.end += len;
                } else {
                    a.shift(len);
                }
            } else if a.end > offset || (a.end == offset && !blocked.contains(&kind)) {
                a.end += len;
            }
        }
    }

    /// Adjusts the list for the bytes `start..end` being removed.
    ///
    /// Attributes inside the range are dropped, straddling ones shrink and
    /// later ones move back. Attributes that become empty are pruned.
    pub(crate) fn collapse(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let len = end - start;
        self.attrs.retain_mut(|a| {
            if a.is_feature() {
                if a.start >= end {
                    a.start -= len;
                    a.end -= len;
                    return true;
                }
                return a.start < start;
            }
            if a.end <= start {
                return true;
            }
            if a.start >= end {
                a.start -= len;
                a.end -= len;
                return true;
            }
            let new_start = a.start.min(start);
            let new_end = if a.end >= end { a.end - len } else { start };
            a.start = new_start;
            a.end = new_end;
            new_start != new_end
        });
    }

    /// Splits the list at `offset`, returning the attributes of the right
    /// part rebased to zero.
    ///
    /// With `keep_ending`, attributes that end exactly at the split point are
    /// copied to the right part as empty attributes at offset 0.
    pub(crate) fn split_off(&mut self, offset: usize, keep_ending: bool) -> Self {
        let mut right = Vec::new();
        self.attrs.retain_mut(|a| {
            if a.is_feature() {
                if a.start >= offset {
                    right.push(CharAttribute::new(
                        a.start - offset..a.end - offset,
                        a.value.clone(),
                    ));
                    return false;
                }
                return true;
            }
            if a.start > offset || (a.start == offset && !a.is_empty()) {
                right.push(CharAttribute::new(
                    a.start - offset..a.end - offset,
                    a.value.clone(),
                ));
                return false;
            }
            if a.end > offset {
                right.push(CharAttribute::new(0..a.end - offset, a.value.clone()));
                a.end = offset;
            } else if keep_ending && a.end == offset {
                right.push(CharAttribute::new(0..0, a.value.clone()));
            }
            true
        });
        let mut right = Self { attrs: right };
        right.sort();
        right
    }

    /// Appends the attributes of a paragraph joined at `offset`.
    ///
    /// Equal attributes meeting at the junction are merged into one.
    pub(crate) fn append(&mut self, other: Self, offset: usize) {
        for mut b in other.attrs {
            b.shift(offset);
            if !b.is_feature() && b.start == offset {
                if let Some(a) = self
                    .attrs
                    .iter_mut()
                    .find(|a| !a.is_feature() && a.end == offset && a.value == b.value)
                {
                    a.end = a.end.max(b.end);
                    continue;
                }
            }
            self.attrs.push(b);
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.attrs.sort_by(|a, b| a.start.cmp(&b.start));
    }

    /// Checks that every attribute lies within `0..=len`.
    #[cfg(test)]
    pub(crate) fn is_valid_for(&self, len: usize) -> bool {
        self.attrs
            .iter()
            .all(|a| a.start <= a.end && a.end <= len)
    }
}
