// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the encode/replay frame.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! renderer calls at each stage of a frame. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates [`SubtreeCulledEvent`] and the
//!   corresponding `TraceSink` method.

use crate::intern::InternId;
use crate::stats::{ReplayCounters, Stats};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after the encode pass of a frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameEncodedEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Instructions in the command stream.
    pub op_count: u32,
    /// Operands in the command stream.
    pub data_len: u32,
    /// Encoder counters for the pass.
    pub stats: Stats,
}

/// Emitted after the replay pass of a frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameReplayedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Interpreter counters for the pass.
    pub replay: ReplayCounters,
}

/// Emitted when an image instruction is skipped because its handle could
/// not be resolved to a loaded image.
#[derive(Clone, Copy, Debug)]
pub struct ImageUnresolvedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The interned image handle.
    pub image: InternId,
}

/// Emitted when traversal skips a subtree outside the cull box.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct SubtreeCulledEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the subtree root.
    pub entity_index: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the renderer.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after the encode pass.
    fn on_frame_encoded(&mut self, e: &FrameEncodedEvent) {
        _ = e;
    }

    /// Called after the replay pass.
    fn on_frame_replayed(&mut self, e: &FrameReplayedEvent) {
        _ = e;
    }

    /// Called when an image handle cannot be resolved.
    fn on_image_unresolved(&mut self, e: &ImageUnresolvedEvent) {
        _ = e;
    }

    /// Called when a subtree is culled (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_subtree_culled(&mut self, e: &SubtreeCulledEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameEncodedEvent`].
    #[inline]
    pub fn frame_encoded(&mut self, e: &FrameEncodedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_encoded(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameReplayedEvent`].
    #[inline]
    pub fn frame_replayed(&mut self, e: &FrameReplayedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_replayed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ImageUnresolvedEvent`].
    #[inline]
    pub fn image_unresolved(&mut self, e: &ImageUnresolvedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_image_unresolved(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SubtreeCulledEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn subtree_culled(&mut self, e: &SubtreeCulledEvent) {
        if let Some(s) = &mut self.sink {
            s.on_subtree_culled(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
