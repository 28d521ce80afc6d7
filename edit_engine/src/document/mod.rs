// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The paragraph based document model.

mod node;
mod position;
mod wrong_list;

use alloc::{string::String, vec, vec::Vec};
use core::cell::Cell;
use core::ops::Range;

use slotmap::SlotMap;

use crate::config::ParagraphSeparator;
use crate::error::Error;

pub use node::ContentNode;
pub use position::{EditPaM, EditSelection, NodeId};
pub use wrong_list::WrongList;

/// An ordered list of paragraphs. Never empty.
///
/// Paragraphs are stored by [`NodeId`] so positions keep referring to the
/// same paragraph while others are inserted or removed.
#[derive(Clone, Debug)]
pub struct EditDoc {
    nodes: SlotMap<NodeId, ContentNode>,
    order: Vec<NodeId>,
    /// Last index returned by [`Self::index_of`].
    hint: Cell<usize>,
}

impl Default for EditDoc {
    fn default() -> Self {
        Self::new()
    }
}

impl EditDoc {
    /// Creates a document with one empty paragraph.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let first = nodes.insert(ContentNode::default());
        Self {
            nodes,
            order: vec![first],
            hint: Cell::new(0),
        }
    }

    /// Number of paragraphs. At least one.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the document holds no text.
    pub fn is_empty(&self) -> bool {
        self.order.len() == 1 && self.nodes[self.order[0]].is_empty()
    }

    /// The paragraph at `para`.
    pub fn node(&self, para: usize) -> Option<&ContentNode> {
        self.order.get(para).map(|id| &self.nodes[*id])
    }

    pub(crate) fn node_mut(&mut self, para: usize) -> Option<&mut ContentNode> {
        let id = *self.order.get(para)?;
        self.nodes.get_mut(id)
    }

    /// The identity of the paragraph at `para`.
    pub fn id(&self, para: usize) -> Option<NodeId> {
        self.order.get(para).copied()
    }

    /// The paragraph with identity `id`, if it still exists.
    pub fn get(&self, id: NodeId) -> Option<&ContentNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut ContentNode> {
        self.nodes.get_mut(id)
    }

    /// Iterates the paragraphs in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &ContentNode> + '_ {
        self.order.iter().map(|id| &self.nodes[*id])
    }

    /// Index of the paragraph with identity `id`.
    ///
    /// Lookups near the previous result are constant time.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        let hint = self.hint.get();
        let near = [hint, hint + 1, hint.wrapping_sub(1)];
        let index = near
            .into_iter()
            .find(|&i| self.order.get(i) == Some(&id))
            .or_else(|| self.order.iter().position(|n| *n == id))?;
        self.hint.set(index);
        Some(index)
    }

    /// Position at `offset` in paragraph `para`, clamped to the document.
    pub fn pam(&self, para: usize, offset: usize) -> EditPaM {
        let para = para.min(self.len() - 1);
        let node = &self.nodes[self.order[para]];
        EditPaM::new(self.order[para], node.clamp_offset(offset))
    }

    /// Position at `offset` in paragraph `para`, or an error if it does not
    /// exist.
    pub fn try_pam(&self, para: usize, offset: usize) -> Result<EditPaM, Error> {
        let id = self
            .id(para)
            .ok_or_else(|| Error::invalid_paragraph(para, self.len()))?;
        let node = &self.nodes[id];
        if offset > node.len() {
            return Err(Error::invalid_offset(para, offset, node.len()));
        }
        if !node.text().is_char_boundary(offset) {
            return Err(Error::not_on_char_boundary(para, offset));
        }
        Ok(EditPaM::new(id, offset))
    }

    /// Start of the first paragraph.
    pub fn start_pam(&self) -> EditPaM {
        EditPaM::new(self.order[0], 0)
    }

    /// End of the last paragraph.
    pub fn end_pam(&self) -> EditPaM {
        let last = self.len() - 1;
        self.para_end(last)
    }

    /// End of paragraph `para`.
    pub fn para_end(&self, para: usize) -> EditPaM {
        let id = self.order[para.min(self.len() - 1)];
        EditPaM::new(id, self.nodes[id].len())
    }

    /// Paragraph index and clamped offset of `pam`, or `None` if its paragraph
    /// was removed.
    pub fn resolve(&self, pam: EditPaM) -> Option<(usize, usize)> {
        let para = self.index_of(pam.node())?;
        Some((para, self.nodes[pam.node()].clamp_offset(pam.index())))
    }

    /// Checked form of [`resolve`](Self::resolve).
    pub fn check_position(&self, pam: EditPaM) -> Result<(usize, usize), Error> {
        let para = self.index_of(pam.node()).ok_or_else(Error::stale_node)?;
        let node = &self.nodes[pam.node()];
        if pam.index() > node.len() {
            return Err(Error::invalid_offset(para, pam.index(), node.len()));
        }
        if !node.text().is_char_boundary(pam.index()) {
            return Err(Error::not_on_char_boundary(para, pam.index()));
        }
        Ok((para, pam.index()))
    }

    /// Replaces a stale or out of range position with the nearest valid one.
    pub fn clamp(&self, pam: EditPaM) -> EditPaM {
        match self.resolve(pam) {
            Some((para, offset)) => EditPaM::new(self.order[para], offset),
            None => self.start_pam(),
        }
    }

    /// Returns the two ends of a selection in document order, resolved.
    pub fn ordered(&self, sel: EditSelection) -> ((usize, usize), (usize, usize)) {
        let a = self.resolve(sel.anchor()).unwrap_or((0, 0));
        let b = self.resolve(sel.focus()).unwrap_or((0, 0));
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Text of paragraphs joined with `separator`.
    ///
    /// Manual line breaks are rendered as `'\n'` and fields as their value.
    pub fn text(&self, separator: ParagraphSeparator) -> String {
        let mut out = String::new();
        for (i, node) in self.paragraphs().enumerate() {
            if i > 0 {
                out.push_str(separator.as_str());
            }
            node.render_into(0..node.len(), &mut out);
        }
        out
    }

    /// Text covered by `sel`, with paragraphs joined with `separator`.
    pub fn selected_text(&self, sel: EditSelection, separator: ParagraphSeparator) -> String {
        let ((sp, so), (ep, eo)) = self.ordered(sel);
        let mut out = String::new();
        for para in sp..=ep {
            let node = &self.nodes[self.order[para]];
            let start = if para == sp { so } else { 0 };
            let end = if para == ep { eo } else { node.len() };
            if para > sp {
                out.push_str(separator.as_str());
            }
            node.render_into(start..end, &mut out);
        }
        out
    }

    pub(crate) fn insert_node(&mut self, index: usize, node: ContentNode) -> NodeId {
        let id = self.nodes.insert(node);
        self.order.insert(index.min(self.order.len()), id);
        id
    }

    /// Removes the paragraph at `index`. The last paragraph cannot be removed.
    pub(crate) fn remove_node(&mut self, index: usize) -> Option<(NodeId, ContentNode)> {
        if self.order.len() <= 1 || index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);
        self.nodes.remove(id).map(|node| (id, node))
    }

    /// Moves the paragraphs in `range` before the paragraph at `dest`.
    pub(crate) fn move_nodes(&mut self, range: Range<usize>, dest: usize) -> bool {
        move_block(&mut self.order, range, dest)
    }
}

/// Moves `items[range]` before the item at `dest`, where `dest` counts in the
/// numbering before the move. Fails when `dest` lies inside or at the edges of
/// `range`, where the move would be a no-op.
pub(crate) fn move_block<T>(items: &mut Vec<T>, range: Range<usize>, dest: usize) -> bool {
    if range.is_empty()
        || range.end > items.len()
        || dest > items.len()
        || (range.start..=range.end).contains(&dest)
    {
        return false;
    }
    let len = range.len();
    let block: Vec<T> = items.drain(range.clone()).collect();
    let at = if dest > range.end { dest - len } else { dest };
    items.splice(at..at, block);
    true
}

#[cfg(test)]
mod tests {
    use super::{ContentNode, EditDoc, EditSelection};
    use crate::config::ParagraphSeparator;
    use crate::error::ErrorKind;

    fn doc(paras: &[&str]) -> EditDoc {
        let mut doc = EditDoc::new();
        for (i, text) in paras.iter().enumerate() {
            doc.insert_node(i + 1, ContentNode::new(text));
        }
        doc.remove_node(0);
        doc
    }

    #[test]
    fn identities_survive_reordering() {
        let mut doc = doc(&["a", "b", "c", "d"]);
        let c = doc.id(2).unwrap();
        assert!(doc.move_nodes(2..4, 0));
        assert_eq!(doc.text(ParagraphSeparator::Lf), "c\nd\na\nb");
        assert_eq!(doc.index_of(c), Some(0));
        assert!(doc.move_nodes(0..2, 4));
        assert_eq!(doc.text(ParagraphSeparator::Lf), "a\nb\nc\nd");
        assert_eq!(doc.index_of(c), Some(2));
    }

    #[test]
    fn last_paragraph_is_kept() {
        let mut doc = EditDoc::new();
        assert!(doc.remove_node(0).is_none());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn stale_positions_are_reported() {
        let mut doc = doc(&["one", "two"]);
        let pam = doc.pam(1, 2);
        doc.remove_node(1);
        assert_eq!(doc.resolve(pam), None);
        assert_eq!(doc.check_position(pam).unwrap_err().kind(), ErrorKind::StaleNode);
        assert_eq!(doc.clamp(pam), doc.start_pam());
    }

    #[test]
    fn checked_positions() {
        let doc = doc(&["a\u{5D0}"]);
        assert_eq!(doc.try_pam(3, 0).unwrap_err().kind(), ErrorKind::InvalidParagraph);
        assert_eq!(doc.try_pam(0, 9).unwrap_err().kind(), ErrorKind::InvalidOffset);
        assert_eq!(doc.try_pam(0, 2).unwrap_err().kind(), ErrorKind::NotOnCharBoundary);
        assert!(doc.try_pam(0, 3).is_ok());
    }

    #[test]
    fn selected_text_spans_paragraphs() {
        let doc = doc(&["hello", "big", "world"]);
        let sel = EditSelection::new(doc.pam(2, 3), doc.pam(0, 2));
        assert_eq!(
            doc.selected_text(sel, ParagraphSeparator::CrLf),
            "llo\r\nbig\r\nwor"
        );
    }
}
