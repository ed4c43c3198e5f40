// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). With
//! [`with_breakdown`](PrettyPrintSink::with_breakdown) enabled, each encoded
//! frame is followed by one indented line per instruction category.

use std::io::Write;

use stipple_core::trace::{
    FrameEncodedEvent, FrameReplayedEvent, ImageUnresolvedEvent, SubtreeCulledEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    breakdown: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("breakdown", &self.breakdown)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            breakdown: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            breakdown: false,
        }
    }

    /// Also prints per-category counters after each encoded frame.
    #[must_use]
    pub fn with_breakdown(mut self, breakdown: bool) -> Self {
        self.breakdown = breakdown;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_encoded(&mut self, e: &FrameEncodedEvent) {
        let _ = writeln!(
            self.writer,
            "[encode] frame={} ops={} data={} calls={} cached={} draws={}",
            e.frame_index,
            e.op_count,
            e.data_len,
            e.stats.total(),
            e.stats.cached(),
            e.stats.draws_emitted(),
        );
        if self.breakdown {
            for (kind, counter) in e.stats.iter().filter(|(_, c)| c.total > 0) {
                let _ = writeln!(
                    self.writer,
                    "    {:<15} emitted={} cached={}",
                    kind.name(),
                    counter.emitted(),
                    counter.cached,
                );
            }
        }
    }

    fn on_frame_replayed(&mut self, e: &FrameReplayedEvent) {
        let r = &e.replay;
        let _ = writeln!(
            self.writer,
            "[replay] frame={} commands={} writes={} skipped={} draws={} \
             missing={} degenerate={}",
            e.frame_index,
            r.commands,
            r.property_writes,
            r.property_writes_skipped,
            r.draw_calls,
            r.images_missing,
            r.degenerate_transforms,
        );
    }

    fn on_image_unresolved(&mut self, e: &ImageUnresolvedEvent) {
        let _ = writeln!(
            self.writer,
            "[image] frame={} unresolved id={}",
            e.frame_index,
            e.image.get(),
        );
    }

    fn on_subtree_culled(&mut self, e: &SubtreeCulledEvent) {
        let _ = writeln!(
            self.writer,
            "[cull] frame={} entity={}",
            e.frame_index, e.entity_index,
        );
    }
}
