// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Script and direction analysis.
//!
//! Each paragraph is split into maximal runs of one [`ScriptType`] and into
//! runs of one BiDi embedding level. Both are cached on the paragraph and
//! rebuilt lazily after edits.

mod boundaries;

use alloc::{vec, vec::Vec};
use core::ops::Range;

use icu_properties::props::Script;
use icu_properties::CodePointMapData;
use unicode_bidi::{BidiInfo, Level};

use crate::attributes::{CharAttr, CharAttrKind, FIELD_CHAR};
use crate::document::ContentNode;

pub use boundaries::{BreakService, IcuBreakService, WordSegment};

/// Coarse script classification used to pick fonts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScriptType {
    /// Latin and other simple scripts.
    #[default]
    Latin,
    /// Chinese, Japanese and Korean.
    Asian,
    /// Scripts that need complex shaping or are written right to left.
    Complex,
    /// Digits, punctuation, spaces and marks; takes the script of its
    /// neighbours.
    Weak,
}

/// Resolved layout direction of a paragraph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextDirection {
    /// Horizontal, left to right.
    LeftToRight,
    /// Horizontal, right to left.
    RightToLeft,
    /// Vertical, top to bottom with lines progressing right to left.
    TopToBottom,
}

/// A maximal run of one script type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptRun {
    /// Byte range of the run.
    pub range: Range<usize>,
    /// Script of the run. Never [`ScriptType::Weak`].
    pub script: ScriptType,
}

/// A maximal run of one BiDi embedding level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectionRun {
    /// Byte range of the run.
    pub range: Range<usize>,
    /// Embedding level. Odd levels are right to left.
    pub level: u8,
}

impl DirectionRun {
    /// Returns `true` for right-to-left runs.
    pub fn is_rtl(&self) -> bool {
        self.level & 1 != 0
    }
}

/// Classifies a single character.
pub fn classify_char(c: char) -> ScriptType {
    let script = CodePointMapData::<Script>::new().get(c);
    match script {
        Script::Han
        | Script::Hiragana
        | Script::Katakana
        | Script::Hangul
        | Script::Bopomofo
        | Script::Yi => ScriptType::Asian,
        Script::Arabic
        | Script::Hebrew
        | Script::Syriac
        | Script::Thaana
        | Script::Nko
        | Script::Thai
        | Script::Lao
        | Script::Khmer
        | Script::Myanmar
        | Script::Tibetan
        | Script::Devanagari
        | Script::Bengali
        | Script::Gurmukhi
        | Script::Gujarati
        | Script::Oriya
        | Script::Tamil
        | Script::Telugu
        | Script::Kannada
        | Script::Malayalam
        | Script::Sinhala => ScriptType::Complex,
        Script::Common | Script::Inherited | Script::Unknown => {
            if is_fullwidth_common(c) {
                ScriptType::Asian
            } else {
                ScriptType::Weak
            }
        }
        _ => ScriptType::Latin,
    }
}

/// CJK punctuation, enclosed CJK and fullwidth forms are shared between the
/// scripts but always set in an Asian font.
fn is_fullwidth_common(c: char) -> bool {
    matches!(c, '\u{3000}'..='\u{303F}' | '\u{3200}'..='\u{33FF}' | '\u{FF00}'..='\u{FFEF}')
}

/// Script a field displaying `value` is treated as.
///
/// The first strong character decides, except that a later Asian or complex
/// character wins over a leading Latin one.
fn field_script(value: &str) -> ScriptType {
    let mut first = None;
    for c in value.chars() {
        let script = classify_char(c);
        match (first, script) {
            (_, ScriptType::Weak) => {}
            (None, _) => first = Some(script),
            (Some(ScriptType::Latin), ScriptType::Asian | ScriptType::Complex) => return script,
            (Some(_), _) => {}
        }
    }
    first.unwrap_or(ScriptType::Weak)
}

/// Computes the direction runs of `text` for a paragraph of the given base
/// direction.
pub(crate) fn analyze_directions(text: &str, rtl: bool) -> Vec<DirectionRun> {
    let base = if rtl { Level::rtl() } else { Level::ltr() };
    if text.is_empty() {
        return vec![DirectionRun {
            range: 0..0,
            level: base.number(),
        }];
    }
    let info = BidiInfo::new(text, Some(base));
    if info.levels.len() != text.len() {
        log::warn!("bidi analysis failed, treating paragraph as left to right");
        return vec![DirectionRun {
            range: 0..text.len(),
            level: 0,
        }];
    }
    let mut runs: Vec<DirectionRun> = Vec::new();
    for (i, _) in text.char_indices() {
        let level = info.levels[i].number();
        if runs.last().is_none_or(|run| run.level != level) {
            runs.push(DirectionRun {
                range: i..i,
                level,
            });
        }
    }
    let mut next_start = text.len();
    for run in runs.iter_mut().rev() {
        run.range.end = next_start;
        next_start = run.range.start;
    }
    runs
}

/// Computes the script runs of a paragraph.
///
/// Fields count as the script of their value, script hint attributes override
/// the characters they cover and weak characters inside right-to-left runs
/// become complex. Remaining weak runs join their preceding run, or the
/// following one at the paragraph start.
pub(crate) fn analyze_scripts(
    node: &ContentNode,
    directions: &[DirectionRun],
    default: ScriptType,
) -> Vec<ScriptRun> {
    let text = node.text();
    if text.is_empty() {
        return vec![ScriptRun {
            range: 0..0,
            script: default,
        }];
    }
    let attribs = node.char_attribs();
    let mut dir = directions.iter().peekable();
    let mut runs: Vec<ScriptRun> = Vec::new();
    for (i, c) in text.char_indices() {
        let mut script = if c == FIELD_CHAR {
            match attribs.feature_at(i).map(|f| f.value()) {
                Some(CharAttr::Field(field)) => field_script(field.value()),
                _ => ScriptType::Weak,
            }
        } else {
            classify_char(c)
        };
        if let Some(CharAttr::ScriptHint(hint)) = attribs.value_at(CharAttrKind::ScriptHint, i) {
            script = *hint;
        }
        while dir.peek().is_some_and(|d| d.range.end <= i) {
            dir.next();
        }
        if script == ScriptType::Weak && dir.peek().is_some_and(|d| d.is_rtl()) {
            script = ScriptType::Complex;
        }
        let end = i + c.len_utf8();
        match runs.last_mut() {
            Some(run) if run.script == script => run.range.end = end,
            _ => runs.push(ScriptRun {
                range: i..end,
                script,
            }),
        }
    }
    resolve_weak(&mut runs, default);
    runs
}

fn resolve_weak(runs: &mut Vec<ScriptRun>, default: ScriptType) {
    let first_strong = runs
        .iter()
        .map(|r| r.script)
        .find(|s| *s != ScriptType::Weak)
        .unwrap_or(default);
    let mut prev = first_strong;
    for run in runs.iter_mut() {
        if run.script == ScriptType::Weak {
            run.script = prev;
        } else {
            prev = run.script;
        }
    }
    runs.dedup_by(|next, run| {
        if run.script == next.script {
            run.range.end = next.range.end;
            true
        } else {
            false
        }
    });
}

/// Rebuilds the analysis caches of `node` when they are stale.
pub(crate) fn ensure_analysis(node: &mut ContentNode, rtl: bool, default: ScriptType) {
    if node.directions.is_empty() {
        node.directions = analyze_directions(node.text(), rtl);
    }
    if node.scripts.is_empty() {
        let scripts = analyze_scripts(node, &node.directions, default);
        node.scripts = scripts;
    }
}

/// Script of the character before `offset`, or of the first character at
/// offset 0.
pub(crate) fn script_at(runs: &[ScriptRun], offset: usize) -> ScriptType {
    let before = offset.saturating_sub(1);
    runs.iter()
        .find(|r| r.range.contains(&before))
        .or(runs.last())
        .map_or(ScriptType::Latin, |r| r.script)
}
