// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keeping stored positions valid across edits.

use crate::document::{EditDoc, EditPaM, NodeId};
use crate::layout::ParaPortion;

/// A structural change that stored positions must follow.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum RemapEvent {
    /// `len` bytes were inserted at `offset`.
    Inserted {
        node: NodeId,
        offset: usize,
        len: usize,
    },
    /// `start..end` was removed.
    Removed {
        node: NodeId,
        start: usize,
        end: usize,
    },
    /// The text from `offset` on moved into `new_node`.
    Split {
        node: NodeId,
        offset: usize,
        new_node: NodeId,
    },
    /// `right` was appended to `left`, which was `offset` bytes long.
    Joined {
        left: NodeId,
        right: NodeId,
        offset: usize,
    },
    /// The paragraph at `index` was removed.
    NodeRemoved { node: NodeId, index: usize },
}

/// How a position sitting exactly at an insertion point behaves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Gravity {
    /// Moves behind the inserted text, like a caret typing.
    After,
    /// Stays before the inserted text, like the start of a composition.
    Before,
}

/// Updates `pam` for `event`. The document must already reflect the change.
pub(crate) fn remap(
    pam: &mut EditPaM,
    event: RemapEvent,
    gravity: Gravity,
    doc: &EditDoc,
    portions: &[ParaPortion],
) {
    match event {
        RemapEvent::Inserted { node, offset, len } => {
            let moves = match gravity {
                Gravity::After => pam.index() >= offset,
                Gravity::Before => pam.index() > offset,
            };
            if pam.node() == node && moves {
                pam.set_index(pam.index() + len);
            }
        }
        RemapEvent::Removed { node, start, end } => {
            if pam.node() != node || pam.index() <= start {
                return;
            }
            let index = if pam.index() <= end {
                start
            } else {
                pam.index() - (end - start)
            };
            pam.set_index(index);
        }
        RemapEvent::Split {
            node,
            offset,
            new_node,
        } => {
            if pam.node() == node && pam.index() >= offset {
                *pam = EditPaM::new(new_node, pam.index() - offset);
            }
        }
        RemapEvent::Joined {
            left,
            right,
            offset,
        } => {
            if pam.node() == right {
                *pam = EditPaM::new(left, offset + pam.index());
            }
        }
        RemapEvent::NodeRemoved { node, index } => {
            if pam.node() == node {
                let para = nearest_visible(portions, index).unwrap_or(index);
                *pam = doc.pam(para, 0);
            }
        }
    }
}

/// The visible paragraph nearest to `index`, searching forward from it
/// first and then backward.
fn nearest_visible(portions: &[ParaPortion], index: usize) -> Option<usize> {
    (index..portions.len())
        .find(|&p| portions[p].is_visible())
        .or_else(|| (0..index.min(portions.len())).rev().find(|&p| portions[p].is_visible()))
}
