// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame instruction counters.
//!
//! [`Stats`] is filled by the encoder during one encode pass and read by
//! diagnostics consumers afterwards. Every category keeps two numbers:
//!
//! - `total` — calls that reached the encoder (draws dropped by the
//!   visibility threshold never reach it and are not counted);
//! - `cached` — the subset of those calls that emitted nothing because the
//!   state was already current or the instruction was elided.
//!
//! The number of emitted instructions is therefore `total - cached`.
//!
//! [`ReplayCounters`] is the interpreter-side counterpart.

/// An instruction category tracked by [`Stats`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StatKind {
    /// Transform pushes.
    PushTransform = 0,
    /// Transform pops.
    PopTransform = 1,
    /// Style changes.
    SetStyle = 2,
    /// Opacity changes.
    SetOpacity = 3,
    /// Filled rectangles.
    FillRect = 4,
    /// Stroked rectangles.
    StrokeRect = 5,
    /// Filled ellipses.
    FillEllipse = 6,
    /// Stroked ellipses.
    StrokeEllipse = 7,
    /// Stroked lines.
    Line = 8,
    /// Image blits.
    Image = 9,
    /// Filled text runs.
    FillText = 10,
    /// Stroked text runs.
    StrokeText = 11,
}

impl StatKind {
    /// Number of categories.
    pub const COUNT: usize = 12;

    /// Every category, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::PushTransform,
        Self::PopTransform,
        Self::SetStyle,
        Self::SetOpacity,
        Self::FillRect,
        Self::StrokeRect,
        Self::FillEllipse,
        Self::StrokeEllipse,
        Self::Line,
        Self::Image,
        Self::FillText,
        Self::StrokeText,
    ];

    /// Short lowercase label used by diagnostics output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PushTransform => "push_transform",
            Self::PopTransform => "pop_transform",
            Self::SetStyle => "set_style",
            Self::SetOpacity => "set_opacity",
            Self::FillRect => "fill_rect",
            Self::StrokeRect => "stroke_rect",
            Self::FillEllipse => "fill_ellipse",
            Self::StrokeEllipse => "stroke_ellipse",
            Self::Line => "line",
            Self::Image => "image",
            Self::FillText => "fill_text",
            Self::StrokeText => "stroke_text",
        }
    }

    /// Decodes a category from its discriminant.
    #[must_use]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        if (raw as usize) < Self::COUNT {
            Some(Self::ALL[raw as usize])
        } else {
            None
        }
    }

    /// Whether this category is a draw primitive.
    #[must_use]
    pub const fn is_draw(self) -> bool {
        (self as u8) >= (Self::FillRect as u8)
    }
}

/// Counters for one [`StatKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counter {
    /// Calls that reached the encoder.
    pub total: u64,
    /// Calls that emitted nothing.
    pub cached: u64,
}

impl Counter {
    /// Instructions actually written to the stream.
    #[inline]
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.total - self.cached
    }
}

/// Per-category counters for one encode pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    counters: [Counter; StatKind::COUNT],
}

impl Stats {
    /// Creates zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counters: [Counter { total: 0, cached: 0 }; StatKind::COUNT],
        }
    }

    /// Builds stats from raw counters (used by trace decoders).
    #[must_use]
    pub const fn from_counters(counters: [Counter; StatKind::COUNT]) -> Self {
        Self { counters }
    }

    /// Returns the counter for one category.
    #[inline]
    #[must_use]
    pub const fn get(&self, kind: StatKind) -> Counter {
        self.counters[kind as usize]
    }

    /// Returns all counters in [`StatKind::ALL`] order.
    #[inline]
    #[must_use]
    pub const fn counters(&self) -> &[Counter; StatKind::COUNT] {
        &self.counters
    }

    /// Records a call that emitted an instruction.
    #[inline]
    pub fn record_emitted(&mut self, kind: StatKind) {
        self.counters[kind as usize].total += 1;
    }

    /// Records a call that emitted nothing.
    #[inline]
    pub fn record_cached(&mut self, kind: StatKind) {
        let c = &mut self.counters[kind as usize];
        c.total += 1;
        c.cached += 1;
    }

    /// Reclassifies `count` previously emitted calls as cached.
    ///
    /// Used when deferred transform pushes are elided after the fact.
    #[inline]
    pub fn mark_cached(&mut self, kind: StatKind, count: u64) {
        self.counters[kind as usize].cached += count;
    }

    /// Sum of `total` across all categories.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counters.iter().map(|c| c.total).sum()
    }

    /// Sum of `cached` across all categories.
    #[must_use]
    pub fn cached(&self) -> u64 {
        self.counters.iter().map(|c| c.cached).sum()
    }

    /// Number of draw instructions emitted.
    #[must_use]
    pub fn draws_emitted(&self) -> u64 {
        StatKind::ALL
            .iter()
            .filter(|k| k.is_draw())
            .map(|&k| self.get(k).emitted())
            .sum()
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Iterates `(kind, counter)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (StatKind, Counter)> + '_ {
        StatKind::ALL.iter().map(|&k| (k, self.get(k)))
    }
}

/// Counters collected while replaying one command stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayCounters {
    /// Instructions decoded.
    pub commands: u64,
    /// Drawing-context property writes issued.
    pub property_writes: u64,
    /// Property writes skipped because the context already held the value.
    pub property_writes_skipped: u64,
    /// Primitive draw calls issued (a tiled instruction counts each copy).
    pub draw_calls: u64,
    /// Image instructions skipped because the image could not be resolved.
    pub images_missing: u64,
    /// Transform pushes whose matrix could not be inverted.
    pub degenerate_transforms: u64,
}

impl ReplayCounters {
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_discriminants() {
        for (i, kind) in StatKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
            assert_eq!(StatKind::from_u8(*kind as u8), Some(*kind));
        }
        assert_eq!(StatKind::from_u8(12), None);
    }

    #[test]
    fn emitted_is_total_minus_cached() {
        let mut stats = Stats::new();
        stats.record_emitted(StatKind::SetStyle);
        stats.record_cached(StatKind::SetStyle);
        stats.record_cached(StatKind::SetStyle);
        let c = stats.get(StatKind::SetStyle);
        assert_eq!(c.total, 3);
        assert_eq!(c.cached, 2);
        assert_eq!(c.emitted(), 1);
    }

    #[test]
    fn draw_totals_only_count_draw_kinds() {
        let mut stats = Stats::new();
        stats.record_emitted(StatKind::PushTransform);
        stats.record_emitted(StatKind::FillRect);
        stats.record_emitted(StatKind::Line);
        assert_eq!(stats.draws_emitted(), 2);
        assert_eq!(stats.total(), 3);
        stats.reset();
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn mark_cached_reclassifies() {
        let mut stats = Stats::new();
        stats.record_emitted(StatKind::PushTransform);
        stats.record_emitted(StatKind::PushTransform);
        stats.mark_cached(StatKind::PushTransform, 1);
        assert_eq!(stats.get(StatKind::PushTransform).emitted(), 1);
    }
}
