// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Encoder stats are stored in full, one `(total, cached)` pair per
//! [`StatKind`], so a recording can be re-exported later without loss.

use stipple_core::intern::InternId;
use stipple_core::stats::{Counter, ReplayCounters, StatKind, Stats};
use stipple_core::trace::{
    FrameEncodedEvent, FrameReplayedEvent, ImageUnresolvedEvent, SubtreeCulledEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_ENCODED: u8 = 1;
const TAG_FRAME_REPLAYED: u8 = 2;
const TAG_IMAGE_UNRESOLVED: u8 = 3;
const TAG_SUBTREE_CULLED: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_stats(&mut self, stats: &Stats) {
        for counter in stats.counters() {
            self.write_u64(counter.total);
            self.write_u64(counter.cached);
        }
    }

    fn write_replay(&mut self, r: &ReplayCounters) {
        self.write_u64(r.commands);
        self.write_u64(r.property_writes);
        self.write_u64(r.property_writes_skipped);
        self.write_u64(r.draw_calls);
        self.write_u64(r.images_missing);
        self.write_u64(r.degenerate_transforms);
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_encoded(&mut self, e: &FrameEncodedEvent) {
        self.write_u8(TAG_FRAME_ENCODED);
        self.write_u64(e.frame_index);
        self.write_u32(e.op_count);
        self.write_u32(e.data_len);
        self.write_stats(&e.stats);
    }

    fn on_frame_replayed(&mut self, e: &FrameReplayedEvent) {
        self.write_u8(TAG_FRAME_REPLAYED);
        self.write_u64(e.frame_index);
        self.write_replay(&e.replay);
    }

    fn on_image_unresolved(&mut self, e: &ImageUnresolvedEvent) {
        self.write_u8(TAG_IMAGE_UNRESOLVED);
        self.write_u64(e.frame_index);
        self.write_u32(e.image.get());
    }

    fn on_subtree_culled(&mut self, e: &SubtreeCulledEvent) {
        self.write_u8(TAG_SUBTREE_CULLED);
        self.write_u64(e.frame_index);
        self.write_u32(e.entity_index);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`FrameEncodedEvent`].
    FrameEncoded(FrameEncodedEvent),
    /// A [`FrameReplayedEvent`].
    FrameReplayed(FrameReplayedEvent),
    /// An [`ImageUnresolvedEvent`].
    ImageUnresolved(ImageUnresolvedEvent),
    /// A [`SubtreeCulledEvent`].
    SubtreeCulled(SubtreeCulledEvent),
}

impl RecordedEvent {
    /// The frame the event belongs to.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::FrameEncoded(e) => e.frame_index,
            Self::FrameReplayed(e) => e.frame_index,
            Self::ImageUnresolved(e) => e.frame_index,
            Self::SubtreeCulled(e) => e.frame_index,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Iteration stops at the first unknown tag or truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_stats(&mut self) -> Option<Stats> {
        let mut counters = [Counter::default(); StatKind::COUNT];
        for counter in &mut counters {
            counter.total = self.read_u64()?;
            counter.cached = self.read_u64()?;
        }
        Some(Stats::from_counters(counters))
    }

    fn read_replay(&mut self) -> Option<ReplayCounters> {
        Some(ReplayCounters {
            commands: self.read_u64()?,
            property_writes: self.read_u64()?,
            property_writes_skipped: self.read_u64()?,
            draw_calls: self.read_u64()?,
            images_missing: self.read_u64()?,
            degenerate_transforms: self.read_u64()?,
        })
    }

    fn decode_frame_encoded(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameEncoded(FrameEncodedEvent {
            frame_index: self.read_u64()?,
            op_count: self.read_u32()?,
            data_len: self.read_u32()?,
            stats: self.read_stats()?,
        }))
    }

    fn decode_frame_replayed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameReplayed(FrameReplayedEvent {
            frame_index: self.read_u64()?,
            replay: self.read_replay()?,
        }))
    }

    fn decode_image_unresolved(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ImageUnresolved(ImageUnresolvedEvent {
            frame_index: self.read_u64()?,
            image: InternId::new(self.read_u32()?)?,
        }))
    }

    fn decode_subtree_culled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SubtreeCulled(SubtreeCulledEvent {
            frame_index: self.read_u64()?,
            entity_index: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_ENCODED => self.decode_frame_encoded(),
            TAG_FRAME_REPLAYED => self.decode_frame_replayed(),
            TAG_IMAGE_UNRESOLVED => self.decode_image_unresolved(),
            TAG_SUBTREE_CULLED => self.decode_subtree_culled(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_encoded() -> FrameEncodedEvent {
        let mut stats = Stats::new();
        stats.record_emitted(StatKind::PushTransform);
        stats.record_emitted(StatKind::PushTransform);
        stats.mark_cached(StatKind::PushTransform, 1);
        stats.record_emitted(StatKind::FillRect);
        stats.record_cached(StatKind::SetStyle);
        FrameEncodedEvent {
            frame_index: 7,
            op_count: 5,
            data_len: 17,
            stats,
        }
    }

    #[test]
    fn frame_encoded_keeps_every_counter() {
        let mut rec = RecorderSink::new();
        let orig = sample_encoded();
        rec.on_frame_encoded(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::FrameEncoded(e) => {
                assert_eq!(e.frame_index, 7);
                assert_eq!(e.op_count, 5);
                assert_eq!(e.data_len, 17);
                assert_eq!(e.stats, orig.stats);
                assert_eq!(e.stats.get(StatKind::PushTransform).emitted(), 1);
            }
            other => panic!("expected FrameEncoded, got {other:?}"),
        }
    }

    #[test]
    fn records_are_fixed_size() {
        let mut rec = RecorderSink::new();
        rec.on_frame_encoded(&sample_encoded());
        let one = rec.as_bytes().len();
        rec.on_frame_encoded(&FrameEncodedEvent {
            frame_index: 8,
            op_count: 0,
            data_len: 0,
            stats: Stats::new(),
        });
        assert_eq!(rec.as_bytes().len(), 2 * one);
        assert_eq!(one, 1 + 8 + 4 + 4 + 16 * StatKind::COUNT);
    }

    #[test]
    fn mixed_events_decode_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_frame_encoded(&sample_encoded());
        rec.on_image_unresolved(&ImageUnresolvedEvent {
            frame_index: 7,
            image: InternId::new(3).unwrap(),
        });
        rec.on_subtree_culled(&SubtreeCulledEvent {
            frame_index: 7,
            entity_index: 12,
        });
        rec.on_frame_replayed(&FrameReplayedEvent {
            frame_index: 7,
            replay: ReplayCounters {
                commands: 5,
                property_writes: 2,
                property_writes_skipped: 1,
                draw_calls: 1,
                images_missing: 1,
                degenerate_transforms: 0,
            },
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.frame_index() == 7));
        match events[1] {
            RecordedEvent::ImageUnresolved(e) => assert_eq!(e.image.get(), 3),
            other => panic!("expected ImageUnresolved, got {other:?}"),
        }
        match events[2] {
            RecordedEvent::SubtreeCulled(e) => assert_eq!(e.entity_index, 12),
            other => panic!("expected SubtreeCulled, got {other:?}"),
        }
        match events[3] {
            RecordedEvent::FrameReplayed(e) => {
                assert_eq!(e.replay.property_writes_skipped, 1);
                assert_eq!(e.replay.images_missing, 1);
            }
            other => panic!("expected FrameReplayed, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_frame_encoded(&sample_encoded());
        rec.on_frame_encoded(&sample_encoded());
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
