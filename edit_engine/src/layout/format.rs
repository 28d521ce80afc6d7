// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaking of one paragraph.

use alloc::vec::Vec;

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "only needed where core lacks the method")]
use core_maths::CoreFloat;

use crate::analysis::{ensure_analysis, BreakService, ScriptType};
use crate::attributes::{
    Alignment, CharAttr, CharAttrKind, LineSpacing, ResolvedParaAttribs, FIELD_CHAR,
    LINE_BREAK_CHAR, TAB_CHAR,
};
use crate::config::EngineConfig;
use crate::document::ContentNode;
use crate::measure::{FontDesc, FontMetrics, RefDevice};
use crate::style::{resolve_para, StylePool};

use super::{EditLine, LineEnd, ParaPortion, PortionKind, TextPortion};

const SOFT_HYPHEN: char = '\u{AD}';

/// Collaborators and settings used while formatting.
pub(crate) struct FormatContext<'a> {
    pub(crate) device: &'a dyn RefDevice,
    pub(crate) breaks: &'a dyn BreakService,
    pub(crate) styles: &'a dyn StylePool,
    pub(crate) config: &'a EngineConfig,
    /// Available line length. Infinite when lines are only broken at hard
    /// breaks.
    pub(crate) width: f32,
}

#[derive(Clone, Debug)]
struct CharInfo {
    offset: usize,
    ch: char,
    kind: PortionKind,
    level: u8,
    script: ScriptType,
    font: usize,
    advance: f32,
    /// Width of the visible hyphen when a soft hyphen ends the line.
    hyphen: f32,
}

impl CharInfo {
    /// Whitespace hangs past the line end instead of causing a break.
    fn is_space(&self) -> bool {
        match self.kind {
            PortionKind::Tab => true,
            PortionKind::Text => self.ch.is_whitespace(),
            _ => false,
        }
    }

    fn is_stretchable(&self) -> bool {
        self.kind == PortionKind::Text && matches!(self.ch, ' ' | '\u{A0}')
    }
}

/// Fonts used by one paragraph, with their metrics.
#[derive(Default)]
struct FontTable {
    fonts: Vec<FontDesc>,
    metrics: Vec<FontMetrics>,
}

impl FontTable {
    fn intern(&mut self, font: FontDesc, device: &dyn RefDevice) -> usize {
        if let Some(index) = self.fonts.iter().position(|f| *f == font) {
            return index;
        }
        let metrics = device.metrics(&font).unwrap_or_else(|| {
            log::warn!("no metrics for font {:?}, estimating from its size", font.family);
            font.estimated_metrics()
        });
        self.fonts.push(font);
        self.metrics.push(metrics);
        self.fonts.len() - 1
    }
}

#[derive(Copy, Clone)]
struct TabStops {
    origin: f32,
    width: f32,
}

impl TabStops {
    fn advance(self, x: f32) -> f32 {
        if self.width <= 0.0 {
            return 0.0;
        }
        let pos = self.origin + x;
        ((pos / self.width).floor() + 1.0) * self.width - pos
    }
}

/// Left and right margins of a line.
fn margins(attrs: &ResolvedParaAttribs, first: bool) -> (f32, f32) {
    let first_line = if first { attrs.indent.first_line } else { 0.0 };
    if attrs.is_rtl() {
        (attrs.indent.left, attrs.indent.right + first_line)
    } else {
        (attrs.indent.left + first_line, attrs.indent.right)
    }
}

/// Resolves the font of the character at `offset`: direct attributes, then
/// the paragraph style, then the configured default.
fn font_at(cx: &FormatContext<'_>, node: &ContentNode, offset: usize, script: ScriptType) -> FontDesc {
    let mut font = cx.config.default_font.clone();
    font.script = script;
    let kinds = [
        CharAttrKind::FontFamily,
        CharAttrKind::FontSize,
        CharAttrKind::Weight,
        CharAttrKind::Italic,
    ];
    for kind in kinds {
        let value = node
            .char_attribs()
            .value_at(kind, offset)
            .cloned()
            .or_else(|| node.style().and_then(|s| cx.styles.style_char_attr(s, kind)));
        match value {
            Some(CharAttr::FontFamily(family)) => font.family = family,
            Some(CharAttr::FontSize(size)) if size > 0.0 => font.size = size,
            Some(CharAttr::Weight(weight)) => font.weight = weight,
            Some(CharAttr::Italic(italic)) => font.italic = italic,
            _ => {}
        }
    }
    font
}

/// Formats `node` into `para`, replacing its lines and portions.
pub(crate) fn format_paragraph(
    cx: &FormatContext<'_>,
    node: &mut ContentNode,
    para: &mut ParaPortion,
) {
    let attrs = resolve_para(cx.styles, node.para_attribs(), node.style(), cx.config);
    let rtl = attrs.is_rtl();
    ensure_analysis(node, rtl, cx.config.default_script);
    let base_level = u8::from(rtl);

    let mut fonts = FontTable::default();
    let mut chars = collect_chars(cx, node, base_level, &mut fonts);
    measure(cx, node, &fonts, &mut chars);
    let breaks = cx.breaks.line_breaks(node.text());
    let graphemes = cx.breaks.graphemes(node.text());

    let mut lines: Vec<EditLine> = Vec::new();
    let mut portions = Vec::new();
    let mut first_natural = 0.0;
    let mut max_width: f32 = 0.0;
    let mut top = 0.0;
    let mut start = 0;
    loop {
        let first = lines.is_empty();
        let (left, right) = margins(&attrs, first);
        let max = cx.width - left - right;
        let tabs = TabStops {
            origin: if rtl { right } else { left },
            width: attrs.tab_width,
        };
        let (end, reason) = break_line(&mut chars, start, max, tabs, &breaks, &graphemes);
        let line_start = chars.get(start).map_or(node.len(), |c| c.offset);
        let line_end = chars.get(end).map_or(node.len(), |c| c.offset);
        let empty_font = if start == end {
            let script = chars.get(start).map_or(cx.config.default_script, |c| c.script);
            fonts.intern(font_at(cx, node, line_start, script), cx.device)
        } else {
            0
        };
        let shape = LineShape {
            start: line_start,
            end: line_end,
            reason,
            first,
            margins: (left, right),
            max,
            base_level,
            empty_font,
        };
        let (mut line, natural) =
            build_line(&shape, &attrs, &fonts, &mut chars[start..end], &mut portions);
        if first {
            first_natural = natural;
        }
        line.top = top;
        top += line.height;
        max_width = max_width.max(left + line.width + right);
        lines.push(line);
        start = end;
        if start >= chars.len() {
            if reason != LineEnd::Manual {
                break;
            }
            // A manual break at the paragraph end opens an empty line.
            let empty_font = fonts.intern(
                font_at(cx, node, node.len(), cx.config.default_script),
                cx.device,
            );
            let (left, right) = margins(&attrs, false);
            let shape = LineShape {
                start: node.len(),
                end: node.len(),
                reason: LineEnd::Paragraph,
                first: false,
                margins: (left, right),
                max: cx.width - left - right,
                base_level,
                empty_font,
            };
            let (mut line, _) = build_line(&shape, &attrs, &fonts, &mut [], &mut portions);
            line.top = top;
            top += line.height;
            lines.push(line);
            break;
        }
    }

    para.spacing_extra = match attrs.line_spacing {
        LineSpacing::Proportional(p) if p > 100 => first_natural * f32::from(p - 100) / 100.0,
        _ => 0.0,
    };
    para.lines = lines;
    para.portions = portions;
    para.rtl = rtl;
    para.lines_height = top;
    para.upper_space = attrs.upper_space;
    para.lower_space = attrs.lower_space;
    para.max_width = max_width;
    para.invalid = None;
    log::trace!(
        "formatted paragraph of {} bytes into {} lines",
        node.len(),
        para.lines.len()
    );
}

fn collect_chars(
    cx: &FormatContext<'_>,
    node: &ContentNode,
    base_level: u8,
    fonts: &mut FontTable,
) -> Vec<CharInfo> {
    let text = node.text();
    let mut points = node.char_attribs().change_points();
    points.extend(node.scripts.iter().map(|r| r.range.start));
    points.sort_unstable();
    points.dedup();

    let mut next_point = 0;
    let mut font = None;
    let mut dirs = node.directions.iter().peekable();
    let mut scripts = node.scripts.iter().peekable();
    let mut chars = Vec::with_capacity(text.len());
    for (offset, ch) in text.char_indices() {
        while dirs.peek().is_some_and(|d| d.range.end <= offset) {
            dirs.next();
        }
        while scripts.peek().is_some_and(|r| r.range.end <= offset) {
            scripts.next();
        }
        let level = dirs.peek().map_or(base_level, |d| d.level);
        let script = scripts
            .peek()
            .map_or(cx.config.default_script, |r| r.script);
        let mut changed = font.is_none();
        while next_point < points.len() && points[next_point] <= offset {
            next_point += 1;
            changed = true;
        }
        if changed {
            font = Some(fonts.intern(font_at(cx, node, offset, script), cx.device));
        }
        let kind = match ch {
            TAB_CHAR => PortionKind::Tab,
            LINE_BREAK_CHAR => PortionKind::LineBreak,
            FIELD_CHAR if node.feature_at(offset).is_some() => PortionKind::Field,
            _ => PortionKind::Text,
        };
        chars.push(CharInfo {
            offset,
            ch,
            kind,
            level,
            script,
            font: font.unwrap_or_default(),
            advance: 0.0,
            hyphen: 0.0,
        });
    }
    chars
}

/// Measures text and field characters. Tabs are measured while breaking
/// since their advance depends on the position.
fn measure(cx: &FormatContext<'_>, node: &ContentNode, fonts: &FontTable, chars: &mut [CharInfo]) {
    let text = node.text();
    let mut advances = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i].kind {
            PortionKind::Text => {
                let font = chars[i].font;
                let mut j = i + 1;
                while j < chars.len() && chars[j].kind == PortionKind::Text && chars[j].font == font
                {
                    j += 1;
                }
                let end = chars.get(j).map_or(text.len(), |c| c.offset);
                advances.clear();
                cx.device
                    .advances(&fonts.fonts[font], &text[chars[i].offset..end], &mut advances);
                if advances.len() != j - i {
                    log::warn!(
                        "device reported {} advances for {} characters, estimating",
                        advances.len(),
                        j - i
                    );
                    advances.clear();
                    advances.resize(j - i, fonts.fonts[font].size * 0.5);
                }
                for (c, advance) in chars[i..j].iter_mut().zip(&advances) {
                    c.advance = *advance;
                }
                for c in chars[i..j].iter_mut().filter(|c| c.ch == SOFT_HYPHEN) {
                    advances.clear();
                    cx.device.advances(&fonts.fonts[font], "-", &mut advances);
                    c.hyphen = advances.iter().sum();
                }
                i = j;
            }
            PortionKind::Field => {
                let value = match node.feature_at(chars[i].offset).map(|f| f.value()) {
                    Some(CharAttr::Field(field)) => field.value(),
                    _ => "",
                };
                advances.clear();
                cx.device
                    .advances(&fonts.fonts[chars[i].font], value, &mut advances);
                chars[i].advance = advances.iter().sum();
                i += 1;
            }
            _ => i += 1,
        }
    }
}

/// Finds the end of the line starting at `start`, returning the index of
/// the first character of the next line.
fn break_line(
    chars: &mut [CharInfo],
    start: usize,
    max: f32,
    tabs: TabStops,
    breaks: &[usize],
    graphemes: &[usize],
) -> (usize, LineEnd) {
    let mut x = 0.0;
    let mut last_break = None;
    let mut i = start;
    while i < chars.len() {
        let c = &chars[i];
        if c.kind == PortionKind::LineBreak {
            return (i + 1, LineEnd::Manual);
        }
        if i > start && breaks.binary_search(&c.offset).is_ok() {
            // A soft hyphen break must leave room for the hyphen.
            let before = &chars[i - 1];
            if before.ch != SOFT_HYPHEN || x + before.hyphen <= max {
                last_break = Some(i);
            }
        }
        let advance = if c.kind == PortionKind::Tab {
            tabs.advance(x)
        } else {
            c.advance
        };
        if i > start && !c.is_space() && x + advance > max {
            let Some(end) = last_break else {
                return (forced_break(chars, start, i, graphemes), LineEnd::Wrapped);
            };
            let hyphen = &mut chars[end - 1];
            if hyphen.ch == SOFT_HYPHEN {
                hyphen.kind = PortionKind::Hyphenator;
                hyphen.advance = hyphen.hyphen;
            }
            return (end, LineEnd::Wrapped);
        }
        chars[i].advance = advance;
        x += advance;
        i += 1;
    }
    (i, LineEnd::Paragraph)
}

/// Breaks at the last grapheme boundary at or before `at`, or at the first
/// one after the line start when a single cluster overflows.
fn forced_break(chars: &[CharInfo], start: usize, at: usize, graphemes: &[usize]) -> usize {
    let start_offset = chars[start].offset;
    let at_offset = chars[at].offset;
    let split = graphemes.partition_point(|&g| g <= at_offset);
    let boundary = graphemes[..split]
        .iter()
        .rev()
        .find(|&&g| g > start_offset)
        .or_else(|| graphemes[split..].first())
        .copied();
    match boundary {
        Some(b) => chars.partition_point(|c| c.offset < b),
        None => at,
    }
}

struct LineShape {
    start: usize,
    end: usize,
    reason: LineEnd,
    first: bool,
    margins: (f32, f32),
    max: f32,
    base_level: u8,
    /// Font measuring an empty line.
    empty_font: usize,
}

/// Builds the portions, metrics and alignment of one line. Returns the line
/// and its natural height before line spacing.
fn build_line(
    shape: &LineShape,
    attrs: &ResolvedParaAttribs,
    fonts: &FontTable,
    chars: &mut [CharInfo],
    portions: &mut Vec<TextPortion>,
) -> (EditLine, f32) {
    // Trailing whitespace takes the paragraph level (UAX #9, rule L1).
    let mut trailing = 0.0;
    let mut content = chars.len();
    for c in chars.iter_mut().rev() {
        if !(c.is_space() || c.kind == PortionKind::LineBreak) {
            break;
        }
        c.level = shape.base_level;
        trailing += c.advance;
        content -= 1;
    }
    let mut width: f32 = chars.iter().map(|c| c.advance).sum::<f32>() - trailing;

    if attrs.alignment == Alignment::Justified
        && shape.reason == LineEnd::Wrapped
        && shape.max.is_finite()
    {
        let free = shape.max - width;
        let spaces = chars[..content].iter().filter(|c| c.is_stretchable()).count();
        if free > 0.0 && spaces > 0 {
            let adjustment = free / spaces as f32;
            for c in chars[..content].iter_mut().filter(|c| c.is_stretchable()) {
                c.advance += adjustment;
            }
            width += free;
        }
    }

    let first_portion = portions.len();
    let mut prev: Option<&CharInfo> = None;
    for c in chars.iter() {
        let len = c.ch.len_utf8();
        let extend = prev.is_some_and(|p| {
            p.kind == PortionKind::Text
                && c.kind == PortionKind::Text
                && p.level == c.level
                && p.script == c.script
                && p.font == c.font
        });
        match portions.last_mut() {
            Some(portion) if extend => {
                portion.len += len;
                portion.width += c.advance;
            }
            _ => portions.push(TextPortion {
                kind: c.kind,
                len,
                width: c.advance,
                level: c.level,
                script: c.script,
            }),
        }
        prev = Some(c);
    }
    if chars.is_empty() {
        portions.push(TextPortion {
            kind: PortionKind::Text,
            len: 0,
            width: 0.0,
            level: shape.base_level,
            script: fonts.fonts[shape.empty_font].script,
        });
    }

    let mut metrics = FontMetrics::default();
    let mut used = chars.iter().map(|c| c.font).peekable();
    if used.peek().is_none() {
        metrics = fonts.metrics[shape.empty_font];
    }
    for font in used {
        let m = fonts.metrics[font];
        metrics.ascent = metrics.ascent.max(m.ascent);
        metrics.descent = metrics.descent.max(m.descent);
    }
    let natural = metrics.height();
    let mut ascent = metrics.ascent;
    let height = match attrs.line_spacing {
        LineSpacing::Proportional(p) if p > 100 && shape.first => natural,
        LineSpacing::Proportional(p) if p != 100 => {
            let scaled = natural * f32::from(p) / 100.0;
            ascent = (ascent + scaled - natural).max(0.0);
            scaled
        }
        LineSpacing::Proportional(_) => natural,
        LineSpacing::Extra(extra) => (natural + extra).max(0.0),
        LineSpacing::Fixed(fixed) => {
            ascent = (ascent + fixed - natural).max(0.0);
            fixed.max(0.0)
        }
    };

    let rtl = attrs.is_rtl();
    let mut offset = 0.0;
    if shape.max.is_finite() {
        let free = (shape.max - width).max(0.0);
        offset = match (attrs.alignment, rtl) {
            (Alignment::Left, _) | (Alignment::Start, false) | (Alignment::End, true) => 0.0,
            (Alignment::Right, _) | (Alignment::Start, true) | (Alignment::End, false) => free,
            (Alignment::Middle, _) => free * 0.5,
            (Alignment::Justified, _) => {
                if rtl {
                    free
                } else {
                    0.0
                }
            }
        };
        if rtl {
            // Trailing whitespace of an RTL line hangs off the left edge.
            offset -= trailing;
        }
    }

    let mut char_x = Vec::with_capacity(chars.len() + 1);
    let mut x = 0.0;
    for c in chars.iter() {
        char_x.push(x);
        x += c.advance;
    }
    char_x.push(x);

    let line = EditLine {
        start: shape.start,
        end: shape.end,
        portions: first_portion..portions.len(),
        ascent,
        height,
        start_x: shape.margins.0 + offset,
        width,
        trailing,
        char_offsets: chars.iter().map(|c| c.offset).collect(),
        char_x,
        top: 0.0,
        end_reason: shape.reason,
    };
    (line, natural)
}
