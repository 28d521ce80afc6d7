// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edit Engine is the editing core of a rich text component.
//!
//! It owns three cooperating pieces:
//!
//! - A paragraph based document model ([`EditDoc`]) with character and
//!   paragraph attributes, spell-check ranges and field placeholders.
//! - An incremental formatter that breaks paragraphs into lines and portions
//!   using an abstract measurement device ([`RefDevice`]), Unicode line
//!   breaking and BiDi analysis.
//! - A cursor and editing engine ([`EditEngine`]) with logical and visual
//!   (BiDi aware) movement, hit testing, undo, IME composition and any number
//!   of views observing one document.
//!
//! Rendering, persistence and style inheritance are left to the host; the
//! engine talks to them through the traits in [`measure`], [`analysis`],
//! [`style`] and [`field`].
//!
//! ## Example
//!
//! ```
//! use edit_engine::{EditEngine, EngineConfig};
//!
//! let mut engine = EditEngine::new(EngineConfig::default());
//! let start = engine.doc().start_pam();
//! engine.insert_text(start, "Hello\nWorld");
//! assert_eq!(engine.doc().len(), 2);
//! assert_eq!(engine.text(), "Hello\nWorld");
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): Enables `std` support in the dependencies
//!   and [`SystemClock`].
//! - `libm`: Floating point math for `no_std` builds.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("edit_engine requires either the `std` or `libm` feature to be enabled");

extern crate alloc;

pub use peniko;
pub use peniko::kurbo;

pub mod analysis;
pub mod attributes;
pub mod config;
pub mod cursor;
pub mod document;
pub mod editing;
pub mod field;
pub mod layout;
pub mod measure;
pub mod style;

mod error;

#[cfg(test)]
mod tests;

pub use analysis::{
    BreakService, DirectionRun, IcuBreakService, ScriptRun, ScriptType, TextDirection, WordSegment,
};
pub use attributes::{
    Alignment, CharAttr, CharAttrKind, CharAttribs, CharAttribute, Indent, LineSpacing, ParaAttr,
    ParaAttrKind, ParaAttribs, WritingDirection,
};
pub use config::{EngineConfig, PaperConfig, ParagraphSeparator};
pub use cursor::{CursorFlags, CursorGranularity, Navigator};
pub use document::{ContentNode, EditDoc, EditPaM, EditSelection, NodeId, WrongList};
pub use editing::{
    AutoCorrect, AutoCorrectDoc, CursorMove, DeleteDirection, DeleteGranularity, DeleteMode,
    EditEngine, EditView, EngineServices, Feature, Generation, ImeAttr, Inserted, JoinMode,
    Notification, UndoKind, ViewId,
};
pub use error::{Error, ErrorKind};
pub use field::{DefaultFieldResolver, FieldKind, FieldPlaceholder, FieldResolver};
pub use layout::{
    balance_columns, Clock, ColumnBalance, EditLine, FormatProgress, LineEnd, ParaPortion,
    PortionKind, TextPortion,
};
#[cfg(feature = "std")]
pub use layout::SystemClock;
pub use measure::{FixedAdvanceDevice, FontDesc, FontMetrics, FontWeight, RefDevice};
pub use style::{ParaStyle, StyleId, StylePool, StyleSheet};
