// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Character and paragraph attributes.

mod char_attribs;
mod para_attribs;

pub use char_attribs::{
    CharAttr, CharAttrKind, CharAttribs, CharAttribute, FIELD_CHAR, LINE_BREAK_CHAR, TAB_CHAR,
};
pub use para_attribs::{
    Alignment, Indent, LineSpacing, ParaAttr, ParaAttrKind, ParaAttribs, ResolvedParaAttribs,
    WritingDirection,
};
