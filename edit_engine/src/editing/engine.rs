// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::{boxed::Box, string::String, vec, vec::Vec};
use core::time::Duration;

use peniko::kurbo::{Point, Rect, Size};
use slotmap::SlotMap;

use crate::analysis::{
    ensure_analysis, script_at, BreakService, DirectionRun, IcuBreakService, ScriptRun,
    ScriptType, TextDirection,
};
use crate::config::EngineConfig;
use crate::cursor::{CursorFlags, Navigator};
use crate::document::{EditDoc, EditPaM, EditSelection, WrongList};
use crate::field::{DefaultFieldResolver, FieldResolver};
use crate::layout::{
    balance_columns, format_paragraph, position_paragraphs, Clock, ColumnBalance, FormatContext,
    FormatProgress, IdleFormatter, ParaPortion,
};
use crate::measure::{FixedAdvanceDevice, RefDevice};
use crate::style::{resolve_para, StyleId, StylePool, StyleSheet};

use super::autocorrect::AutoCorrect;
use super::ime::ImeComposition;
use super::notify::Notification;
use super::sync::{remap, Gravity, RemapEvent};
use super::undo::{UndoKind, UndoManager};
use super::view::{EditView, ViewId};

/// Opaque representation of a generation.
///
/// Obtained from [`EditEngine::generation`]. Changes whenever the text,
/// the layout or a selection changes.
// Overflow handling: the generations are only compared,
// so wrapping is fine.
#[derive(PartialEq, Eq, Default, Clone, Copy, Debug)]
pub struct Generation(u32);

impl Generation {
    /// Make it not what it currently is.
    pub(crate) fn nudge(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// The collaborators an engine talks to.
pub struct EngineServices {
    /// Text measurement.
    pub device: Box<dyn RefDevice>,
    /// Grapheme, word, sentence and line boundaries.
    pub breaks: Box<dyn BreakService>,
    /// Style registry.
    pub styles: Box<dyn StylePool>,
    /// Field values.
    pub fields: Box<dyn FieldResolver>,
    /// Called after each typed character.
    pub autocorrect: Option<Box<dyn AutoCorrect>>,
}

impl Default for EngineServices {
    fn default() -> Self {
        Self {
            device: Box::new(FixedAdvanceDevice::default()),
            breaks: Box::new(IcuBreakService::new()),
            styles: Box::new(StyleSheet::new()),
            fields: Box::new(DefaultFieldResolver),
            autocorrect: None,
        }
    }
}

impl core::fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineServices")
            .field("autocorrect", &self.autocorrect.is_some())
            .finish_non_exhaustive()
    }
}

/// A rich text document with its layout, views and edit history.
pub struct EditEngine {
    pub(crate) config: EngineConfig,
    pub(crate) doc: EditDoc,
    /// One per paragraph, in document order.
    pub(crate) portions: Vec<ParaPortion>,
    pub(crate) views: SlotMap<ViewId, EditView>,
    pub(crate) undo: UndoManager,
    pub(crate) ime: Option<ImeComposition>,
    pub(crate) services: EngineServices,
    notify: Option<Box<dyn FnMut(&Notification)>>,
    pending: Vec<Notification>,
    text_height: f32,
    text_width: f32,
    idle: IdleFormatter,
    op_depth: usize,
    /// The text changed during the current operation.
    pub(crate) modified: bool,
    pub(crate) generation: Generation,
}

impl core::fmt::Debug for EditEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EditEngine")
            .field("paragraphs", &self.doc.len())
            .field("views", &self.views.len())
            .field("composing", &self.ime.is_some())
            .field("text_height", &self.text_height)
            .finish_non_exhaustive()
    }
}

impl EditEngine {
    /// Creates an engine with one empty paragraph and default collaborators.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_services(config, EngineServices::default())
    }

    /// Creates an engine with one empty paragraph.
    pub fn with_services(config: EngineConfig, services: EngineServices) -> Self {
        let undo = UndoManager::new(
            config.undo_enabled,
            config.max_undo_groups,
            config.undo_merge_limit,
        );
        Self {
            config,
            doc: EditDoc::new(),
            portions: vec![ParaPortion::new()],
            views: SlotMap::with_key(),
            undo,
            ime: None,
            services,
            notify: None,
            pending: Vec::new(),
            text_height: 0.0,
            text_width: 0.0,
            idle: IdleFormatter::default(),
            op_depth: 0,
            modified: false,
            generation: Generation(1),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The document.
    pub fn doc(&self) -> &EditDoc {
        &self.doc
    }

    /// The whole text, paragraphs joined with the configured separator.
    pub fn text(&self) -> String {
        self.doc.text(self.config.separator)
    }

    /// Text covered by `selection`, paragraphs joined with the configured
    /// separator.
    pub fn get_selected(&self, selection: EditSelection) -> String {
        self.doc.selected_text(selection, self.config.separator)
    }

    /// Current generation. Compare with an earlier value to decide whether
    /// to redraw.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Installs the notification handler, replacing the previous one.
    pub fn set_notification_handler(&mut self, handler: impl FnMut(&Notification) + 'static) {
        self.notify = Some(Box::new(handler));
    }

    /// Returns `true` if there is a step to undo.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Returns `true` if there is a step to redo.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    // --- MARK: Operations ---

    /// Starts a user level operation. Nested operations fold into the
    /// outermost one, for undo and for notifications.
    pub(crate) fn begin_op(&mut self, kind: UndoKind) {
        self.op_depth += 1;
        self.undo.begin(kind);
    }

    pub(crate) fn end_op(&mut self) {
        self.undo.end();
        self.op_depth = self.op_depth.saturating_sub(1);
        if self.op_depth == 0 {
            self.flush_notifications();
        }
    }

    pub(crate) fn queue_notification(&mut self, notification: Notification) {
        self.pending.push(notification);
        if self.op_depth == 0 {
            self.flush_notifications();
        }
    }

    fn flush_notifications(&mut self) {
        if core::mem::take(&mut self.modified) {
            self.pending.push(Notification::TextModified);
        }
        if self.pending.is_empty() {
            return;
        }
        self.generation.nudge();
        let pending = core::mem::take(&mut self.pending);
        if let Some(handler) = &mut self.notify {
            for notification in &pending {
                handler(notification);
            }
        }
    }

    /// Updates every stored position for a structural change.
    pub(crate) fn remap_positions(&mut self, event: RemapEvent) {
        for view in self.views.values_mut() {
            for end in view.selection.ends_mut() {
                remap(end, event, Gravity::After, &self.doc, &self.portions);
            }
        }
        let intact = self
            .ime
            .as_mut()
            .is_none_or(|ime| ime.remap(event, &self.doc, &self.portions));
        if !intact {
            self.drop_composition();
        }
    }

    /// Resolves a position, treating stale or out of range input as a
    /// contract error.
    pub(crate) fn locate(&self, pam: EditPaM) -> (usize, usize) {
        debug_assert!(
            self.doc.check_position(pam).is_ok(),
            "invalid position {pam:?}"
        );
        self.doc.resolve(pam).unwrap_or_else(|| {
            log::warn!("stale position {pam:?}, using the document start");
            (0, 0)
        })
    }

    pub(crate) fn invalidate(&mut self, para: usize, offset: usize) {
        if let Some(portion) = self.portions.get_mut(para) {
            portion.mark_invalid(offset);
        }
    }

    pub(crate) fn invalidate_all(&mut self) {
        for portion in &mut self.portions {
            portion.mark_invalid(0);
        }
    }

    // --- MARK: Formatting ---

    /// Length available to a line.
    fn line_extent(&self) -> f32 {
        let paper = &self.config.paper;
        let (size, auto) = if self.config.vertical {
            (paper.size.height, paper.auto_height)
        } else {
            (paper.size.width, paper.auto_width)
        };
        let max = if self.config.vertical {
            paper.max_size.height
        } else {
            paper.max_size.width
        };
        if auto {
            max as f32
        } else {
            size as f32
        }
    }

    fn format_para(&mut self, para: usize) {
        let width = self.line_extent();
        let cx = FormatContext {
            device: &*self.services.device,
            breaks: &*self.services.breaks,
            styles: &*self.services.styles,
            config: &self.config,
            width,
        };
        if let (Some(node), Some(portion)) = (self.doc.node_mut(para), self.portions.get_mut(para))
        {
            format_paragraph(&cx, node, portion);
        }
    }

    /// Returns `true` while some paragraph needs formatting.
    pub fn has_pending_format(&self) -> bool {
        self.portions.iter().any(|p| !p.is_valid())
    }

    /// Formats every invalid paragraph.
    pub fn format_all(&mut self) {
        if !self.has_pending_format() {
            return;
        }
        for para in 0..self.portions.len() {
            if !self.portions[para].is_valid() {
                self.format_para(para);
            }
        }
        self.finish_pass();
    }

    /// Formats invalid paragraphs until `budget` has elapsed on `clock`.
    ///
    /// At least one paragraph is formatted per call. Resumes after the last
    /// paragraph the previous call formatted.
    pub fn format_chunk(&mut self, clock: &dyn Clock, budget: Duration) -> FormatProgress {
        let start = clock.now();
        loop {
            let portions = &self.portions;
            let next = self
                .idle
                .next_invalid(|i| !portions[i].is_valid(), portions.len());
            let Some(para) = next else {
                self.finish_pass();
                return FormatProgress::Done;
            };
            self.format_para(para);
            self.idle.next_para = para + 1;
            if clock.now().saturating_sub(start) >= budget {
                if self.has_pending_format() {
                    return FormatProgress::Pending;
                }
                self.finish_pass();
                return FormatProgress::Done;
            }
        }
    }

    /// Positions paragraphs, measures the text and fits the paper.
    fn finish_pass(&mut self) {
        let height = position_paragraphs(&mut self.portions, self.config.space_summation);
        self.text_width = self
            .portions
            .iter()
            .filter(|p| p.is_visible())
            .map(|p| p.max_width)
            .fold(0.0, f32::max);
        let changed = height != self.text_height;
        self.text_height = height;
        self.fit_paper();
        if changed {
            self.queue_notification(Notification::TextHeightChanged);
        }
        self.generation.nudge();
        log::debug!(
            "format pass finished: {} paragraphs, height {height}",
            self.portions.len()
        );
    }

    fn fit_paper(&mut self) {
        let paper = &mut self.config.paper;
        let (width, height) = if self.config.vertical {
            (self.text_height, self.text_width)
        } else {
            (self.text_width, self.text_height)
        };
        if paper.auto_width {
            paper.size.width = f64::from(width).clamp(paper.min_size.width, paper.max_size.width);
        }
        if paper.auto_height {
            paper.size.height =
                f64::from(height).clamp(paper.min_size.height, paper.max_size.height);
        }
    }

    /// Changes the paper size.
    ///
    /// Lines are only re-broken when the line length changes or the paper
    /// is auto sized.
    pub fn set_paper_size(&mut self, size: Size) {
        let old = self.line_extent();
        self.config.paper.size = size;
        let auto = self.config.paper.auto_width || self.config.paper.auto_height;
        if self.line_extent() != old || auto {
            log::debug!("paper size changed to {size:?}, reformatting");
            self.invalidate_all();
        }
        self.generation.nudge();
    }

    /// Current paper size, after auto sizing.
    pub fn paper_size(&mut self) -> Size {
        self.format_all();
        self.config.paper.size
    }

    /// Total height of the formatted text.
    pub fn text_height(&mut self) -> f32 {
        self.format_all();
        self.text_height
    }

    /// Width of the widest line including indents, as needed to show the
    /// text without wrapping at the current paper width.
    pub fn calc_text_width(&mut self) -> f32 {
        self.format_all();
        self.text_width
    }

    /// Formatting state of paragraph `para`.
    pub fn paragraph_portion(&mut self, para: usize) -> Option<&ParaPortion> {
        self.format_all();
        self.portions.get(para)
    }

    /// Distributes all visible lines over the configured columns.
    ///
    /// Returns `None` for single column layouts.
    pub fn columns(&mut self) -> Option<ColumnBalance> {
        if self.config.columns < 2 {
            return None;
        }
        self.format_all();
        let heights: Vec<f32> = self
            .portions
            .iter()
            .filter(|p| p.is_visible())
            .flat_map(|p| p.lines().iter().map(|l| l.height()))
            .collect();
        Some(balance_columns(
            &heights,
            usize::from(self.config.columns),
            self.config.min_column_height,
        ))
    }

    // --- MARK: Geometry ---

    /// Formats pending paragraphs and returns a navigator over the result.
    pub fn navigator(&mut self) -> Navigator<'_> {
        self.format_all();
        Navigator::new(
            &self.doc,
            &self.portions,
            &*self.services.breaks,
            &self.config,
        )
    }

    /// Extent of the block direction used to rotate vertical geometry.
    fn rotation_extent(&self) -> f64 {
        let width = self.config.paper.size.width;
        if width.is_finite() {
            width
        } else {
            f64::from(self.text_height)
        }
    }

    /// Converts a layout rectangle to paper coordinates.
    pub(crate) fn to_physical(&self, rect: Rect) -> Rect {
        if !self.config.vertical {
            return rect;
        }
        let w = self.rotation_extent();
        Rect::new(w - rect.y1, rect.x0, w - rect.y0, rect.x1)
    }

    /// Converts a paper point to layout coordinates.
    pub(crate) fn to_logical(&self, point: Point) -> Point {
        if !self.config.vertical {
            return point;
        }
        Point::new(point.y, self.rotation_extent() - point.x)
    }

    /// Caret rectangle of `pam` in paper coordinates.
    pub fn cursor_rect(&mut self, pam: EditPaM, flags: CursorFlags) -> Rect {
        let rect = self.navigator().position_to_rect(pam, flags, None);
        self.to_physical(rect)
    }

    /// The position closest to a point in paper coordinates.
    pub fn position_at_point(&mut self, point: Point) -> EditPaM {
        let point = self.to_logical(point);
        self.navigator().hit_test(point)
    }

    // --- MARK: Analysis ---

    fn para_is_rtl(&self, para: usize) -> bool {
        self.doc.node(para).is_some_and(|node| {
            resolve_para(
                &*self.services.styles,
                node.para_attribs(),
                node.style(),
                &self.config,
            )
            .is_rtl()
        })
    }

    fn analyze(&mut self, para: usize) {
        let rtl = self.para_is_rtl(para);
        let default = self.config.default_script;
        if let Some(node) = self.doc.node_mut(para) {
            ensure_analysis(node, rtl, default);
        }
    }

    /// Script type of the text before `pam`, or after it at a paragraph
    /// start.
    pub fn script_type_at(&mut self, pam: EditPaM) -> ScriptType {
        let (para, offset) = self.locate(pam);
        self.analyze(para);
        self.doc.node(para).map_or(self.config.default_script, |node| {
            script_at(&node.scripts, offset)
        })
    }

    /// Script runs of paragraph `para`.
    pub fn script_runs(&mut self, para: usize) -> Vec<ScriptRun> {
        self.analyze(para);
        self.doc
            .node(para)
            .map(|node| node.scripts.clone())
            .unwrap_or_default()
    }

    /// BiDi runs of paragraph `para`, in logical order.
    pub fn direction_runs(&mut self, para: usize) -> Vec<DirectionRun> {
        self.analyze(para);
        self.doc
            .node(para)
            .map(|node| node.directions.clone())
            .unwrap_or_default()
    }

    /// Returns `true` if paragraph `para` is laid out right to left.
    pub fn is_right_to_left(&self, para: usize) -> bool {
        self.para_is_rtl(para)
    }

    /// Layout direction of paragraph `para`.
    pub fn text_direction(&self, para: usize) -> TextDirection {
        if self.config.vertical {
            TextDirection::TopToBottom
        } else if self.para_is_rtl(para) {
            TextDirection::RightToLeft
        } else {
            TextDirection::LeftToRight
        }
    }

    // --- MARK: Styles, fields, spelling ---

    /// Replaces the style registry and reformats everything.
    pub fn set_style_pool(&mut self, styles: Box<dyn StylePool>) {
        self.services.styles = styles;
        for para in 0..self.doc.len() {
            if let Some(node) = self.doc.node_mut(para) {
                node.invalidate_analysis();
            }
        }
        self.invalidate_all();
        self.generation.nudge();
    }

    /// Removes every reference to `style`, before the host deletes it from
    /// its registry. Returns the number of paragraphs changed.
    pub fn detach_style(&mut self, style: &StyleId) -> usize {
        let mut changed = 0;
        for para in 0..self.doc.len() {
            let Some(node) = self.doc.node_mut(para) else {
                continue;
            };
            if node.style() == Some(style) {
                node.set_style(None);
                changed += 1;
                self.invalidate(para, 0);
                self.pending
                    .push(Notification::ParagraphAttributesChanged(para));
            }
        }
        if changed > 0 {
            self.flush_notifications();
        }
        changed
    }

    /// Shows or hides paragraph `para`. Hidden paragraphs take no space and
    /// are skipped by navigation.
    pub fn set_paragraph_visible(&mut self, para: usize, visible: bool) {
        if let Some(portion) = self.portions.get_mut(para) {
            if portion.visible != visible {
                portion.visible = visible;
                portion.mark_invalid(0);
            }
        }
    }

    pub(crate) fn para_visible(&self, para: usize) -> bool {
        self.portions.get(para).is_some_and(ParaPortion::is_visible)
    }

    /// Re-expands every field through the field resolver. Paragraphs whose
    /// field values changed are reformatted. Returns the number of changed
    /// fields.
    pub fn update_fields(&mut self) -> usize {
        let mut total = 0;
        for para in 0..self.doc.len() {
            let resolver = &*self.services.fields;
            let Some(node) = self.doc.node_mut(para) else {
                continue;
            };
            let changed = node.refresh_fields(|field, offset| resolver.expand(field, para, offset));
            if changed > 0 {
                self.invalidate(para, 0);
                total += changed;
            }
        }
        if total > 0 {
            self.modified = true;
            self.flush_notifications();
        }
        total
    }

    /// Spell check state of paragraph `para`, created on first access.
    pub fn wrong_list_mut(&mut self, para: usize) -> Option<&mut WrongList> {
        self.doc.node_mut(para).map(|node| node.wrong_list_mut())
    }
}
