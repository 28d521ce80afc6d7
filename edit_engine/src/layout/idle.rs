// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;
#[cfg(feature = "std")]
use std::time::Instant;

/// Time source for time-sliced formatting.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed point.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`].
#[cfg(feature = "std")]
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    start: Instant,
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Creates a clock starting now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Outcome of a time-sliced formatting call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormatProgress {
    /// Every paragraph is formatted.
    Done,
    /// Invalid paragraphs remain; call again later.
    Pending,
}

/// Resumable state of time-sliced formatting.
#[derive(Clone, Debug, Default)]
pub(crate) struct IdleFormatter {
    /// Paragraph where the next chunk starts looking for invalid work.
    pub(crate) next_para: usize,
}

impl IdleFormatter {
    /// Finds the next invalid paragraph at or after the resume point,
    /// wrapping around once.
    pub(crate) fn next_invalid(&self, invalid: impl Fn(usize) -> bool, count: usize) -> Option<usize> {
        let start = self.next_para.min(count);
        (start..count).chain(0..start).find(|&i| invalid(i))
    }
}
