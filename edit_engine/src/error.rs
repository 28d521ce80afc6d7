// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Rich error type for checked engine operations.
///
/// Carries a non-exhaustive [`ErrorKind`] plus the paragraph, offset and limit
/// that were involved, when they are known. The infallible entry points of
/// [`EditEngine`](crate::EditEngine) never return this type: they clamp and
/// log instead. The `try_*` variants surface it to hosts that want to
/// validate their input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The paragraph index the caller referred to.
    paragraph: Option<usize>,

    /// The byte offset the caller referred to.
    offset: Option<usize>,

    /// The limit that was violated (paragraph count, paragraph length, ...).
    limit: Option<usize>,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The paragraph index involved, if any.
    pub fn paragraph(&self) -> Option<usize> {
        self.paragraph
    }

    /// The byte offset involved, if any.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// The limit that was exceeded, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            paragraph: None,
            offset: None,
            limit: None,
        }
    }

    pub(crate) fn invalid_paragraph(paragraph: usize, count: usize) -> Self {
        Self {
            paragraph: Some(paragraph),
            limit: Some(count),
            ..Self::new(ErrorKind::InvalidParagraph)
        }
    }

    pub(crate) fn invalid_offset(paragraph: usize, offset: usize, len: usize) -> Self {
        Self {
            paragraph: Some(paragraph),
            offset: Some(offset),
            limit: Some(len),
            ..Self::new(ErrorKind::InvalidOffset)
        }
    }

    pub(crate) fn not_on_char_boundary(paragraph: usize, offset: usize) -> Self {
        Self {
            paragraph: Some(paragraph),
            offset: Some(offset),
            ..Self::new(ErrorKind::NotOnCharBoundary)
        }
    }

    pub(crate) fn stale_node() -> Self {
        Self::new(ErrorKind::StaleNode)
    }

    pub(crate) fn capacity(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new(ErrorKind::CapacityExceeded)
        }
    }

    pub(crate) fn nothing_to_undo() -> Self {
        Self::new(ErrorKind::NothingToUndo)
    }

    pub(crate) fn composition_active() -> Self {
        Self::new(ErrorKind::CompositionActive)
    }

    pub(crate) fn no_composition() -> Self {
        Self::new(ErrorKind::NoComposition)
    }

    pub(crate) fn invalid_view() -> Self {
        Self::new(ErrorKind::InvalidView)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let para = self.paragraph.unwrap_or_default();
        let offset = self.offset.unwrap_or_default();
        let limit = self.limit.unwrap_or_default();
        match self.kind {
            ErrorKind::InvalidParagraph => write!(
                f,
                "paragraph {para} out of bounds for document with {limit} paragraphs"
            ),
            ErrorKind::InvalidOffset => write!(
                f,
                "offset {offset} out of bounds for paragraph {para} of len {limit}"
            ),
            ErrorKind::NotOnCharBoundary => write!(
                f,
                "offset {offset} in paragraph {para} not on UTF-8 boundary"
            ),
            ErrorKind::StaleNode => write!(f, "position refers to a removed paragraph"),
            ErrorKind::CapacityExceeded => write!(f, "capacity limit {limit} exceeded"),
            ErrorKind::NothingToUndo => write!(f, "no undo or redo step is available"),
            ErrorKind::CompositionActive => write!(f, "an IME composition is already active"),
            ErrorKind::NoComposition => write!(f, "no IME composition is active"),
            ErrorKind::InvalidView => write!(f, "view handle is not registered"),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A paragraph index was out of bounds.
    InvalidParagraph,

    /// A byte offset was past the end of its paragraph.
    InvalidOffset,

    /// A byte offset was not aligned to a UTF-8 character boundary.
    NotOnCharBoundary,

    /// A position referred to a paragraph that no longer exists.
    StaleNode,

    /// A paragraph count or paragraph length limit would have been exceeded.
    CapacityExceeded,

    /// Undo or redo was requested with an empty stack, or during a
    /// composition.
    NothingToUndo,

    /// An IME composition was started while another one is active.
    CompositionActive,

    /// An IME update or end was requested without an active composition.
    NoComposition,

    /// A view handle did not refer to a registered view.
    InvalidView,
}
