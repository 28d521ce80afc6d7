// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

slotmap::new_key_type! {
    /// Stable identity of a paragraph.
    ///
    /// Survives insertion and removal of other paragraphs; becomes stale when
    /// the paragraph itself is removed.
    pub struct NodeId;
}

/// A paragraph and a byte offset into its text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EditPaM {
    node: NodeId,
    index: usize,
}

impl EditPaM {
    /// Creates a position.
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }

    /// The paragraph.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Byte offset into the paragraph text.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }
}

/// An anchor and a focus position.
///
/// The two ends are not ordered; the focus is where the caret is drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EditSelection {
    anchor: EditPaM,
    focus: EditPaM,
}

impl EditSelection {
    /// Creates a selection.
    pub fn new(anchor: EditPaM, focus: EditPaM) -> Self {
        Self { anchor, focus }
    }

    /// Creates a collapsed selection.
    pub fn caret(pam: EditPaM) -> Self {
        Self::new(pam, pam)
    }

    /// The fixed end.
    pub fn anchor(&self) -> EditPaM {
        self.anchor
    }

    /// The moving end.
    pub fn focus(&self) -> EditPaM {
        self.focus
    }

    /// Returns `true` if anchor and focus coincide.
    pub fn is_caret(&self) -> bool {
        self.anchor == self.focus
    }

    /// Moves the focus, keeping the anchor.
    #[must_use]
    pub fn extend_to(self, focus: EditPaM) -> Self {
        Self::new(self.anchor, focus)
    }

    pub(crate) fn ends_mut(&mut self) -> [&mut EditPaM; 2] {
        [&mut self.anchor, &mut self.focus]
    }
}
