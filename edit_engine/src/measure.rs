// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Abstract text measurement.
//!
//! The formatter never talks to a font stack directly. It asks a
//! [`RefDevice`] for per-character advances and font metrics; hosts plug in
//! their shaper, tests plug in [`FixedAdvanceDevice`].

use alloc::{sync::Arc, vec::Vec};

use icu_properties::props::GeneralCategory;
use icu_properties::CodePointMapData;

use crate::analysis::{classify_char, ScriptType};

/// Visual weight class of a font.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Weight value of 400.
    pub const NORMAL: Self = Self(400);
    /// Weight value of 700.
    pub const BOLD: Self = Self(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// The font a run of text is measured with.
#[derive(Clone, Debug, PartialEq)]
pub struct FontDesc {
    /// Family name.
    pub family: Arc<str>,
    /// Size in layout units.
    pub size: f32,
    /// Weight.
    pub weight: FontWeight,
    /// Italic or upright.
    pub italic: bool,
    /// Script type of the measured run.
    pub script: ScriptType,
}

impl Default for FontDesc {
    fn default() -> Self {
        Self {
            family: "sans-serif".into(),
            size: 10.0,
            weight: FontWeight::NORMAL,
            italic: false,
            script: ScriptType::Latin,
        }
    }
}

impl FontDesc {
    /// Returns the same font with a different size.
    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Metrics estimated from the size, used when a device reports none.
    pub fn estimated_metrics(&self) -> FontMetrics {
        FontMetrics {
            ascent: self.size * 0.8,
            descent: self.size * 0.2,
        }
    }
}

/// Vertical font metrics.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the line.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line.
    pub descent: f32,
}

impl FontMetrics {
    /// Total line height.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// A reference device used for measurement.
pub trait RefDevice {
    /// Appends one advance per `char` of `text` to `advances`.
    ///
    /// Characters that form a cluster with their predecessor report zero.
    fn advances(&self, font: &FontDesc, text: &str, advances: &mut Vec<f32>);

    /// Vertical metrics of `font`, or `None` when the font is unavailable.
    fn metrics(&self, font: &FontDesc) -> Option<FontMetrics>;
}

/// A device with fixed, size relative advances.
///
/// Latin and other narrow characters advance `narrow * size`, Asian
/// characters `wide * size`. Combining marks, format and control characters
/// do not advance. Ascent and descent are `0.8 * size` and `0.2 * size`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedAdvanceDevice {
    /// Advance factor for narrow characters.
    pub narrow: f32,
    /// Advance factor for wide (Asian) characters.
    pub wide: f32,
}

impl Default for FixedAdvanceDevice {
    fn default() -> Self {
        Self {
            narrow: 0.5,
            wide: 1.0,
        }
    }
}

impl RefDevice for FixedAdvanceDevice {
    fn advances(&self, font: &FontDesc, text: &str, advances: &mut Vec<f32>) {
        let categories = CodePointMapData::<GeneralCategory>::new();
        advances.extend(text.chars().map(|c| {
            match categories.get(c) {
                GeneralCategory::NonspacingMark
                | GeneralCategory::EnclosingMark
                | GeneralCategory::Format
                | GeneralCategory::Control => return 0.0,
                _ => {}
            }
            if classify_char(c) == ScriptType::Asian {
                font.size * self.wide
            } else {
                font.size * self.narrow
            }
        }));
    }

    fn metrics(&self, font: &FontDesc) -> Option<FontMetrics> {
        Some(font.estimated_metrics())
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedAdvanceDevice, FontDesc, RefDevice};

    #[test]
    fn narrow_wide_and_marks() {
        let device = FixedAdvanceDevice::default();
        let font = FontDesc::default().with_size(20.0);
        let mut advances = Vec::new();
        device.advances(&font, "a\u{4E2D}e\u{301}", &mut advances);
        assert_eq!(advances, [10.0, 20.0, 10.0, 0.0]);
        let metrics = device.metrics(&font).unwrap();
        assert_eq!(metrics.height(), 20.0);
    }
}
