// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Frame counters become counter tracks (`"ph": "C"`): one `stream` track
//! for the command-stream size, one track per instruction category, and one
//! `replay` track. Unresolved images and culled subtrees become instant
//! events on the frame they happened in.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Frame spacing used by [`export`] callers that have no real timestamps.
pub const DEFAULT_FRAME_INTERVAL_US: f64 = 16_666.667;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Recorded events carry frame indices rather than clock readings, so frame
/// `n` is placed at `n * frame_interval_us` microseconds.
pub fn export(bytes: &[u8], frame_interval_us: f64, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let ts = frame_ts(recorded.frame_index(), frame_interval_us);
        match recorded {
            RecordedEvent::FrameEncoded(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "stream",
                    "cat": "Encode",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "ops": e.op_count,
                        "data": e.data_len,
                    }
                }));
                for (kind, counter) in e.stats.iter() {
                    events.push(json!({
                        "ph": "C",
                        "name": kind.name(),
                        "cat": "Encode",
                        "ts": ts,
                        "pid": 0,
                        "tid": 0,
                        "args": {
                            "emitted": counter.emitted(),
                            "cached": counter.cached,
                        }
                    }));
                }
            }
            RecordedEvent::FrameReplayed(e) => {
                let r = e.replay;
                events.push(json!({
                    "ph": "C",
                    "name": "replay",
                    "cat": "Replay",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "commands": r.commands,
                        "property_writes": r.property_writes,
                        "property_writes_skipped": r.property_writes_skipped,
                        "draw_calls": r.draw_calls,
                        "images_missing": r.images_missing,
                        "degenerate_transforms": r.degenerate_transforms,
                    }
                }));
            }
            RecordedEvent::ImageUnresolved(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ImageUnresolved",
                    "cat": "Replay",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "image": e.image.get(),
                    }
                }));
            }
            RecordedEvent::SubtreeCulled(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "SubtreeCulled",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "entity": e.entity_index,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn frame_ts(frame_index: u64, frame_interval_us: f64) -> f64 {
    frame_index as f64 * frame_interval_us
}
