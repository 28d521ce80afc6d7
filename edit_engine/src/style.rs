// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named paragraph styles and attribute resolution.
//!
//! Effective attribute values are resolved in three steps: the value set
//! directly on the paragraph, then the paragraph's named style, then the pool
//! default. Style inheritance and storage belong to the host; [`StyleSheet`]
//! is a small registry that covers the common case.

use alloc::{sync::Arc, vec::Vec};

use hashbrown::HashMap;

use crate::attributes::{
    Alignment, CharAttr, CharAttrKind, Indent, LineSpacing, ParaAttr, ParaAttrKind, ParaAttribs,
    ResolvedParaAttribs, WritingDirection,
};
use crate::config::EngineConfig;

/// Parent chains longer than this are treated as cyclic.
const MAX_STYLE_DEPTH: usize = 32;

/// Identifier of a named style.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleId(Arc<str>);

impl StyleId {
    /// Creates an identifier from a style name.
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }

    /// The style name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StyleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A named paragraph style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParaStyle {
    /// Style to inherit unset values from.
    pub parent: Option<StyleId>,
    /// Paragraph attribute values.
    pub para: ParaAttribs,
    /// Character attribute defaults for text in paragraphs of this style.
    pub chars: Vec<CharAttr>,
}

/// Source of named style and default attribute values.
pub trait StylePool {
    /// The value of `kind` defined by `style`, if any.
    fn style_para_attr(&self, style: &StyleId, kind: ParaAttrKind) -> Option<ParaAttr>;

    /// The character default of `kind` defined by `style`, if any.
    fn style_char_attr(&self, style: &StyleId, kind: CharAttrKind) -> Option<CharAttr>;

    /// The pool default for `kind`.
    fn default_para_attr(&self, kind: ParaAttrKind) -> Option<ParaAttr> {
        kind.fallback()
    }

    /// Resolves `kind` for a paragraph: direct value, then style, then
    /// pool default.
    fn effective_para_attr(
        &self,
        direct: &ParaAttribs,
        style: Option<&StyleId>,
        kind: ParaAttrKind,
    ) -> Option<ParaAttr> {
        direct
            .get(kind)
            .copied()
            .or_else(|| style.and_then(|s| self.style_para_attr(s, kind)))
            .or_else(|| self.default_para_attr(kind))
    }
}

/// Resolves every paragraph attribute kind for one paragraph.
pub(crate) fn resolve_para(
    pool: &dyn StylePool,
    direct: &ParaAttribs,
    style: Option<&StyleId>,
    config: &EngineConfig,
) -> ResolvedParaAttribs {
    let mut resolved = ResolvedParaAttribs {
        alignment: Alignment::default(),
        upper_space: 0.0,
        lower_space: 0.0,
        line_spacing: LineSpacing::default(),
        direction: WritingDirection::LeftToRight,
        indent: Indent::default(),
        tab_width: config.default_tab_width,
    };
    let kinds = [
        ParaAttrKind::Alignment,
        ParaAttrKind::UpperSpace,
        ParaAttrKind::LowerSpace,
        ParaAttrKind::LineSpacing,
        ParaAttrKind::WritingDirection,
        ParaAttrKind::Indent,
        ParaAttrKind::TabWidth,
    ];
    for kind in kinds {
        match pool.effective_para_attr(direct, style, kind) {
            Some(ParaAttr::Alignment(a)) => resolved.alignment = a,
            Some(ParaAttr::UpperSpace(s)) => resolved.upper_space = s.max(0.0),
            Some(ParaAttr::LowerSpace(s)) => resolved.lower_space = s.max(0.0),
            Some(ParaAttr::LineSpacing(s)) => resolved.line_spacing = s,
            Some(ParaAttr::WritingDirection(d)) => resolved.direction = d,
            Some(ParaAttr::Indent(i)) => resolved.indent = i,
            Some(ParaAttr::TabWidth(w)) if w > 0.0 => resolved.tab_width = w,
            _ => {}
        }
    }
    if resolved.direction == WritingDirection::Environment {
        resolved.direction = if config.default_rtl {
            WritingDirection::RightToLeft
        } else {
            WritingDirection::LeftToRight
        };
    }
    resolved
}

/// A simple style registry with parent inheritance.
#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    styles: HashMap<StyleId, ParaStyle>,
    defaults: ParaAttribs,
}

impl StyleSheet {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a style.
    pub fn insert(&mut self, id: StyleId, style: ParaStyle) -> Option<ParaStyle> {
        self.styles.insert(id, style)
    }

    /// Removes a style. Paragraphs referring to it fall back to the pool
    /// defaults once [`EditEngine::detach_style`](crate::EditEngine::detach_style)
    /// is called.
    pub fn remove(&mut self, id: &StyleId) -> Option<ParaStyle> {
        self.styles.remove(id)
    }

    /// Returns a style by id.
    pub fn get(&self, id: &StyleId) -> Option<&ParaStyle> {
        self.styles.get(id)
    }

    /// Sets a pool default.
    pub fn set_default(&mut self, attr: ParaAttr) {
        self.defaults.set(attr);
    }

    fn chain(&self, id: &StyleId) -> impl Iterator<Item = &ParaStyle> + '_ {
        let mut next = self.styles.get(id);
        let mut depth = 0;
        core::iter::from_fn(move || {
            let style = next?;
            depth += 1;
            next = if depth < MAX_STYLE_DEPTH {
                style.parent.as_ref().and_then(|p| self.styles.get(p))
            } else {
                None
            };
            Some(style)
        })
    }
}

impl StylePool for StyleSheet {
    fn style_para_attr(&self, style: &StyleId, kind: ParaAttrKind) -> Option<ParaAttr> {
        self.chain(style).find_map(|s| s.para.get(kind).copied())
    }

    fn style_char_attr(&self, style: &StyleId, kind: CharAttrKind) -> Option<CharAttr> {
        self.chain(style)
            .find_map(|s| s.chars.iter().find(|c| c.kind() == kind).cloned())
    }

    fn default_para_attr(&self, kind: ParaAttrKind) -> Option<ParaAttr> {
        self.defaults.get(kind).copied().or_else(|| kind.fallback())
    }
}
