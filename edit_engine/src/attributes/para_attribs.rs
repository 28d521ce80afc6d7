// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

/// Alignment of a line within the available width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Align to the start of the line. Left for LTR paragraphs, right for RTL
    /// paragraphs.
    #[default]
    Start,
    /// Align to the end of the line. Right for LTR paragraphs, left for RTL
    /// paragraphs.
    End,
    /// Align to the left edge, regardless of direction.
    Left,
    /// Center the line.
    Middle,
    /// Align to the right edge, regardless of direction.
    Right,
    /// Stretch spaces so soft-wrapped lines fill the width. The last line of
    /// a paragraph and lines ending in a manual break are aligned to the
    /// start.
    Justified,
}

/// Base writing direction of a paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WritingDirection {
    /// Inherit the direction from the engine configuration.
    #[default]
    Environment,
    /// Left to right.
    LeftToRight,
    /// Right to left.
    RightToLeft,
}

/// Line spacing rule.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LineSpacing {
    /// Scales each line height by the given percentage.
    Proportional(u16),
    /// Adds a fixed amount below every line.
    Extra(f32),
    /// Forces every line to the given height.
    Fixed(f32),
}

impl Default for LineSpacing {
    fn default() -> Self {
        Self::Proportional(100)
    }
}

/// Paragraph indents.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Indent {
    /// Indent from the left edge.
    pub left: f32,
    /// Indent from the right edge.
    pub right: f32,
    /// Extra indent of the first line, added at the start side.
    pub first_line: f32,
}

/// A paragraph attribute value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParaAttr {
    /// Line alignment.
    Alignment(Alignment),
    /// Space above the paragraph.
    UpperSpace(f32),
    /// Space below the paragraph.
    LowerSpace(f32),
    /// Line spacing rule.
    LineSpacing(LineSpacing),
    /// Base writing direction.
    WritingDirection(WritingDirection),
    /// Indents.
    Indent(Indent),
    /// Tab stop distance.
    TabWidth(f32),
}

impl ParaAttr {
    /// Returns the kind of this attribute.
    pub fn kind(&self) -> ParaAttrKind {
        match self {
            Self::Alignment(_) => ParaAttrKind::Alignment,
            Self::UpperSpace(_) => ParaAttrKind::UpperSpace,
            Self::LowerSpace(_) => ParaAttrKind::LowerSpace,
            Self::LineSpacing(_) => ParaAttrKind::LineSpacing,
            Self::WritingDirection(_) => ParaAttrKind::WritingDirection,
            Self::Indent(_) => ParaAttrKind::Indent,
            Self::TabWidth(_) => ParaAttrKind::TabWidth,
        }
    }
}

/// The kind of a [`ParaAttr`], without its value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParaAttrKind {
    /// See [`ParaAttr::Alignment`].
    Alignment,
    /// See [`ParaAttr::UpperSpace`].
    UpperSpace,
    /// See [`ParaAttr::LowerSpace`].
    LowerSpace,
    /// See [`ParaAttr::LineSpacing`].
    LineSpacing,
    /// See [`ParaAttr::WritingDirection`].
    WritingDirection,
    /// See [`ParaAttr::Indent`].
    Indent,
    /// See [`ParaAttr::TabWidth`].
    TabWidth,
}

impl ParaAttrKind {
    /// The hard-coded fallback used when neither the paragraph, its style nor
    /// the pool defines a value. `None` for the tab width, which falls back to
    /// the engine configuration.
    pub fn fallback(self) -> Option<ParaAttr> {
        Some(match self {
            Self::Alignment => ParaAttr::Alignment(Alignment::Start),
            Self::UpperSpace => ParaAttr::UpperSpace(0.0),
            Self::LowerSpace => ParaAttr::LowerSpace(0.0),
            Self::LineSpacing => ParaAttr::LineSpacing(LineSpacing::default()),
            Self::WritingDirection => ParaAttr::WritingDirection(WritingDirection::Environment),
            Self::Indent => ParaAttr::Indent(Indent::default()),
            Self::TabWidth => return None,
        })
    }
}

/// Directly applied paragraph attributes. At most one value per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParaAttribs {
    items: SmallVec<[ParaAttr; 4]>,
}

impl ParaAttribs {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `attr`, replacing any value of the same kind.
    pub fn set(&mut self, attr: ParaAttr) {
        let kind = attr.kind();
        if let Some(slot) = self.items.iter_mut().find(|a| a.kind() == kind) {
            *slot = attr;
        } else {
            self.items.push(attr);
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, attr: ParaAttr) -> Self {
        self.set(attr);
        self
    }

    /// Returns the value of `kind`, if set.
    pub fn get(&self, kind: ParaAttrKind) -> Option<&ParaAttr> {
        self.items.iter().find(|a| a.kind() == kind)
    }

    /// Removes the value of `kind`.
    pub fn remove(&mut self, kind: ParaAttrKind) -> Option<ParaAttr> {
        let pos = self.items.iter().position(|a| a.kind() == kind)?;
        Some(self.items.remove(pos))
    }

    /// Iterates the values that are set.
    pub fn iter(&self) -> impl Iterator<Item = &ParaAttr> + '_ {
        self.items.iter()
    }

    /// Returns `true` if no value is set.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Paragraph attributes with every value resolved through the style pool.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolvedParaAttribs {
    /// Line alignment.
    pub alignment: Alignment,
    /// Space above the paragraph.
    pub upper_space: f32,
    /// Space below the paragraph.
    pub lower_space: f32,
    /// Line spacing rule.
    pub line_spacing: LineSpacing,
    /// Base writing direction. Never [`WritingDirection::Environment`].
    pub direction: WritingDirection,
    /// Indents.
    pub indent: Indent,
    /// Tab stop distance.
    pub tab_width: f32,
}

impl ResolvedParaAttribs {
    /// Returns `true` for right-to-left paragraphs.
    pub fn is_rtl(&self) -> bool {
        self.direction == WritingDirection::RightToLeft
    }
}
