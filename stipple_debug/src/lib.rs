// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for stipple
//! diagnostics.
//!
//! This crate provides [`TraceSink`](stipple_core::trace::TraceSink)
//! implementations for development and post-mortem analysis, plus a
//! drawing context that logs what the renderer asked of it:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format counter tracks
//!   from recorded bytes.
//! - [`canvas_log::CanvasLog`]: a [`DrawingContext`](stipple_render::DrawingContext)
//!   that records every call as a line of text.

pub mod canvas_log;
pub mod chrome;
pub mod pretty;
pub mod recorder;
