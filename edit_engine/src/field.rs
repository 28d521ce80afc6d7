// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field placeholders.
//!
//! A field occupies one placeholder character in the paragraph text. Its
//! display value is produced by a [`FieldResolver`] and cached on the
//! attribute until the next field update.

use alloc::string::String;

/// The kind of data a field displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Current page number.
    PageNumber,
    /// Total page count.
    PageCount,
    /// Current date.
    Date,
    /// Current time.
    Time,
    /// Name of the document file.
    FileName,
    /// A hyperlink with its display text.
    Url {
        /// Link target.
        url: String,
        /// Text shown for the link.
        representation: String,
    },
    /// A host defined variable.
    Variable(String),
}

/// A field feature: its kind and the currently displayed value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPlaceholder {
    kind: FieldKind,
    value: String,
}

impl FieldPlaceholder {
    /// Creates a placeholder with an initial value.
    pub fn new(kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// The field kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The displayed value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn set_value(&mut self, value: String) {
        self.value = value;
    }
}

/// Produces display values for fields.
pub trait FieldResolver {
    /// Returns the text shown for `field` at `offset` of paragraph `para`.
    fn expand(&self, field: &FieldKind, para: usize, offset: usize) -> String;
}

/// Resolver used when the host does not provide one.
///
/// URLs show their representation, variables their name and everything else
/// a question mark.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFieldResolver;

impl FieldResolver for DefaultFieldResolver {
    fn expand(&self, field: &FieldKind, _para: usize, _offset: usize) -> String {
        match field {
            FieldKind::Url {
                url,
                representation,
            } => {
                if representation.is_empty() {
                    url.clone()
                } else {
                    representation.clone()
                }
            }
            FieldKind::Variable(name) => name.clone(),
            _ => "?".into(),
        }
    }
}
