// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use icu_properties::props::GeneralCategory;
use icu_properties::CodePointMapData;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CharClass {
    Space,
    Digit,
    Letter,
    Currency,
    Other,
}

fn class_of(c: char) -> CharClass {
    match CodePointMapData::<GeneralCategory>::new().get(c) {
        GeneralCategory::SpaceSeparator
        | GeneralCategory::LineSeparator
        | GeneralCategory::ParagraphSeparator => CharClass::Space,
        GeneralCategory::DecimalNumber
        | GeneralCategory::LetterNumber
        | GeneralCategory::OtherNumber => CharClass::Digit,
        GeneralCategory::UppercaseLetter
        | GeneralCategory::LowercaseLetter
        | GeneralCategory::TitlecaseLetter
        | GeneralCategory::ModifierLetter
        | GeneralCategory::OtherLetter
        | GeneralCategory::NonspacingMark
        | GeneralCategory::SpacingMark
        | GeneralCategory::EnclosingMark => CharClass::Letter,
        GeneralCategory::CurrencySymbol => CharClass::Currency,
        _ if c.is_whitespace() => CharClass::Space,
        _ => CharClass::Other,
    }
}

/// Finds where `text` can be cut so the head is at most `limit` bytes long,
/// without consulting language data.
///
/// Prefers the last point at or before `limit` where the character class
/// changes between whitespace, digits, letters and currency symbols. Falls
/// back to the last character boundary at or before `limit`.
pub(crate) fn neutral_break(text: &str, limit: usize) -> usize {
    if limit >= text.len() {
        return text.len();
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let head = &text[..cut];
    let mut next = text[cut..].chars().next().map(class_of);
    for (i, c) in head.char_indices().rev() {
        let class = class_of(c);
        if next.is_some_and(|n| n != class) {
            return i + c.len_utf8();
        }
        next = Some(class);
    }
    cut
}
