// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use peniko::kurbo::Size;

use crate::analysis::ScriptType;
use crate::measure::FontDesc;

/// Largest number of paragraphs a document may hold.
pub const MAX_PARAGRAPHS: usize = 0x7fff_fff0;

/// Largest paragraph length in bytes.
pub const MAX_PARAGRAPH_LEN: usize = 0x7fff_fff0;

/// Separator used when flattening a document to plain text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ParagraphSeparator {
    /// `"\n"`
    #[default]
    Lf,
    /// `"\r"`
    Cr,
    /// `"\r\n"`
    CrLf,
}

impl ParagraphSeparator {
    /// Returns the separator as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Cr => "\r",
            Self::CrLf => "\r\n",
        }
    }
}

/// Paper (output area) settings.
///
/// The width bounds line breaking; the height only matters for page moves and
/// auto sizing. When an axis is auto sized, the engine grows or shrinks the
/// paper on that axis to fit the formatted text, clamped to the min/max sizes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PaperConfig {
    /// Current paper size.
    pub size: Size,
    /// Lower bound applied when auto sizing.
    pub min_size: Size,
    /// Upper bound applied when auto sizing. An infinite width means lines are
    /// only broken at hard breaks.
    pub max_size: Size,
    /// Fit the width to the widest line.
    pub auto_width: bool,
    /// Fit the height to the text height.
    pub auto_height: bool,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            size: Size::new(f64::INFINITY, f64::INFINITY),
            min_size: Size::ZERO,
            max_size: Size::new(f64::INFINITY, f64::INFINITY),
            auto_width: false,
            auto_height: false,
        }
    }
}

/// Configuration for an [`EditEngine`](crate::EditEngine).
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Paper size and auto sizing.
    pub paper: PaperConfig,
    /// Number of text columns. Values below 2 disable column balancing.
    pub columns: u16,
    /// Gap between columns.
    pub column_spacing: f32,
    /// Minimum column height used as the balancing start point.
    pub min_column_height: f32,
    /// Lay lines out top to bottom, with successive lines progressing right to
    /// left. Geometry is rotated at the public boundary only.
    pub vertical: bool,
    /// Add the lower space of a paragraph and the upper space of the next one
    /// instead of collapsing them to their maximum.
    pub space_summation: bool,
    /// Copy attributes that end at a split point into the new paragraph as
    /// empty attributes, so typing continues with the same formatting.
    pub keep_ending_attribs: bool,
    /// On a backward join (delete at paragraph start) the joined paragraph
    /// takes the style and paragraph attributes of the paragraph being
    /// removed.
    pub backward_join_adopts_style: bool,
    /// Direction used by paragraphs whose writing direction is
    /// [`Environment`](crate::WritingDirection::Environment).
    pub default_rtl: bool,
    /// Default font for text without explicit font attributes.
    pub default_font: FontDesc,
    /// Script type used when a paragraph contains only weak characters.
    pub default_script: ScriptType,
    /// Separator used by [`EditEngine::text`](crate::EditEngine::text).
    pub separator: ParagraphSeparator,
    /// Paragraph count limit.
    pub max_paragraphs: usize,
    /// Paragraph length limit, in bytes.
    pub max_paragraph_len: usize,
    /// Hit testing picks the nearer side of a character. When off, the
    /// leading edge of the hit character is always used.
    pub smart_hit_test: bool,
    /// Record undo steps.
    pub undo_enabled: bool,
    /// Largest number of undo groups kept.
    pub max_undo_groups: usize,
    /// Largest run of typed text merged into one undo step.
    pub undo_merge_limit: usize,
    /// Default tab stop distance used when a paragraph has no tab width.
    pub default_tab_width: f32,
    /// Fraction of the visible height moved by page up and page down.
    pub page_move_factor: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            paper: PaperConfig::default(),
            columns: 1,
            column_spacing: 0.0,
            min_column_height: 0.0,
            vertical: false,
            space_summation: false,
            keep_ending_attribs: true,
            backward_join_adopts_style: true,
            default_rtl: false,
            default_font: FontDesc::default(),
            default_script: ScriptType::Latin,
            separator: ParagraphSeparator::Lf,
            max_paragraphs: MAX_PARAGRAPHS,
            max_paragraph_len: MAX_PARAGRAPH_LEN,
            smart_hit_test: true,
            undo_enabled: true,
            max_undo_groups: 100,
            undo_merge_limit: 64,
            default_tab_width: 40.0,
            page_move_factor: 0.9,
        }
    }
}

impl EngineConfig {
    /// Returns a config with the given paper width and unbounded height.
    pub fn with_width(width: f64) -> Self {
        let mut config = Self::default();
        config.paper.size = Size::new(width, f64::INFINITY);
        config
    }
}
