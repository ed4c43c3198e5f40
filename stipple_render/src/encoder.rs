// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The command encoder: turns traversal calls into a [`CommandStream`].
//!
//! The encoder removes work before it reaches the stream:
//!
//! - **Deferred transforms.** A pushed transform is held on a pending stack
//!   and only written when a draw depends on it. A push popped before any
//!   draw emits nothing at all.
//! - **Interning.** Styles, image keys and text runs are replaced by
//!   [`InternId`]s from registries that outlive the frame, so "same style
//!   as before" is one integer compare.
//! - **No-op suppression.** Setting the active style or opacity again is
//!   counted as cached and emits nothing.
//! - **Visibility cutoff.** Draws issued while opacity is below the
//!   visibility threshold are dropped entirely.

use alloc::string::String;

use kurbo::{Line, Point, Rect};
use stipple_core::buffer::TypedBuffer;
use stipple_core::intern::{InternId, Interner};
use stipple_core::matrix::Matrix;
use stipple_core::stats::{StatKind, Stats};

use crate::config::RenderConfig;
use crate::stream::{CommandStream, Op, Tiling};
use crate::style::Style;

/// Coefficients per pending transform.
const MATRIX_LEN: usize = 6;

/// Interning registries shared by the encoder and the interpreter.
///
/// Registries persist across frames; ids stay valid until the registry is
/// cleared explicitly.
#[derive(Debug)]
pub struct Registries {
    /// Styles, keyed by [`Style::cache_key`].
    pub styles: Interner<Style>,
    /// Image keys.
    pub images: Interner<String>,
    /// Text runs.
    pub texts: Interner<String>,
}

impl Registries {
    /// Creates empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            styles: Interner::new(Style::cache_key),
            images: Interner::identity(),
            texts: Interner::identity(),
        }
    }

    /// Clears all three registries. Ids issued before the clear resolve to
    /// nothing afterwards.
    pub fn clear(&mut self) {
        self.styles.clear();
        self.images.clear();
        self.texts.clear();
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

/// Records one frame of drawing into a [`CommandStream`].
#[derive(Debug)]
pub struct CommandEncoder {
    stream: CommandStream,
    /// Coefficients of pushes not yet written, oldest first.
    pending: TypedBuffer<f64>,
    /// Pushes written to the stream and not yet popped.
    open_pushes: u32,
    active_style: Option<InternId>,
    active_opacity: f64,
    stats: Stats,
    registries: Registries,
    visibility_threshold: f64,
}

impl CommandEncoder {
    /// Creates an encoder with the default visibility threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(RenderConfig::DEFAULT_VISIBILITY_THRESHOLD)
    }

    /// Creates an encoder that drops draws below `visibility_threshold`
    /// opacity.
    #[must_use]
    pub fn with_threshold(visibility_threshold: f64) -> Self {
        Self {
            stream: CommandStream::new(),
            pending: TypedBuffer::new(),
            open_pushes: 0,
            active_style: None,
            active_opacity: 1.0,
            stats: Stats::new(),
            registries: Registries::new(),
            visibility_threshold,
        }
    }

    /// Starts a new frame.
    ///
    /// Empties the stream, drops pending transforms, zeroes the stats and
    /// forgets the active style and opacity. Registries are kept.
    pub fn clear(&mut self) {
        self.stream.clear();
        self.pending.clear();
        self.open_pushes = 0;
        self.active_style = None;
        self.active_opacity = 1.0;
        self.stats.reset();
    }

    /// Records a transform push. Nothing is written until a draw needs it.
    pub fn push_transform(&mut self, m: &Matrix) {
        self.pending.push_multiple(&m.as_coeffs());
        self.stats.record_emitted(StatKind::PushTransform);
    }

    /// Pops the most recent transform.
    ///
    /// A pop matching a still-pending push cancels it, and both calls are
    /// counted as cached. A pop with nothing open is ignored.
    pub fn pop_transform(&mut self) {
        if !self.pending.is_empty() {
            self.pending.pop(MATRIX_LEN);
            self.stats.mark_cached(StatKind::PushTransform, 1);
            self.stats.record_cached(StatKind::PopTransform);
        } else if self.open_pushes > 0 {
            self.open_pushes -= 1;
            self.stream.push(Op::PopTransform, &[]);
            self.stats.record_emitted(StatKind::PopTransform);
        } else {
            self.stats.record_cached(StatKind::PopTransform);
        }
    }

    /// Interns `style` and makes it active, returning its id.
    pub fn set_style(&mut self, style: &Style) -> InternId {
        let id = self.registries.styles.to_id(style);
        self.set_style_id(id);
        id
    }

    /// Makes an already interned style active.
    pub fn set_style_id(&mut self, id: InternId) {
        if self.active_style == Some(id) {
            self.stats.record_cached(StatKind::SetStyle);
            return;
        }
        self.active_style = Some(id);
        self.stream.push(Op::SetStyle, &[id.to_f64()]);
        self.stats.record_emitted(StatKind::SetStyle);
    }

    /// Sets the opacity for subsequent draws.
    pub fn set_opacity(&mut self, opacity: f64) {
        if self.active_opacity == opacity {
            self.stats.record_cached(StatKind::SetOpacity);
            return;
        }
        self.active_opacity = opacity;
        self.stream.push(Op::SetOpacity, &[opacity]);
        self.stats.record_emitted(StatKind::SetOpacity);
    }

    /// Fills `rect`, tiled. Returns whether anything was recorded.
    pub fn fill_rect(&mut self, rect: Rect, tiling: Tiling) -> bool {
        self.rect_op(Op::FillRect, rect, tiling)
    }

    /// Strokes `rect`, tiled.
    pub fn stroke_rect(&mut self, rect: Rect, tiling: Tiling) -> bool {
        self.rect_op(Op::StrokeRect, rect, tiling)
    }

    /// Fills the axis-aligned ellipse inscribed in `bounds`, tiled.
    pub fn fill_ellipse(&mut self, bounds: Rect, tiling: Tiling) -> bool {
        self.rect_op(Op::FillEllipse, bounds, tiling)
    }

    /// Strokes the axis-aligned ellipse inscribed in `bounds`, tiled.
    pub fn stroke_ellipse(&mut self, bounds: Rect, tiling: Tiling) -> bool {
        self.rect_op(Op::StrokeEllipse, bounds, tiling)
    }

    /// Strokes `line`, tiled.
    pub fn line(&mut self, line: Line, tiling: Tiling) -> bool {
        if !self.begin_draw() {
            return false;
        }
        self.stream.push_line(line, tiling);
        self.stats.record_emitted(StatKind::Line);
        true
    }

    /// Draws the image registered under `key` over `rect`, tiled.
    pub fn draw_image(&mut self, key: &str, rect: Rect, tiling: Tiling) -> bool {
        if !self.begin_draw() {
            return false;
        }
        let id = self.registries.images.intern_str(key);
        self.stream.push_image(id, rect, tiling);
        self.stats.record_emitted(StatKind::Image);
        true
    }

    /// Fills a text run.
    pub fn fill_text(&mut self, text: &str, at: Point) -> bool {
        self.text_op(Op::FillText, text, at)
    }

    /// Strokes a text run.
    pub fn stroke_text(&mut self, text: &str, at: Point) -> bool {
        self.text_op(Op::StrokeText, text, at)
    }

    /// Ends the frame.
    ///
    /// Pending pushes that never met a draw are discarded (and counted as
    /// cached); pushes left open are closed so the stream is balanced.
    pub fn finish(&mut self) -> &Stats {
        let discarded = self.pending.len() / MATRIX_LEN;
        if discarded > 0 {
            self.pending.clear();
            self.stats
                .mark_cached(StatKind::PushTransform, discarded as u64);
        }
        while self.open_pushes > 0 {
            self.open_pushes -= 1;
            self.stream.push(Op::PopTransform, &[]);
            self.stats.record_emitted(StatKind::PopTransform);
        }
        &self.stats
    }

    /// The recorded stream.
    #[must_use]
    pub fn stream(&self) -> &CommandStream {
        &self.stream
    }

    /// Counters for the current frame.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The interning registries.
    #[must_use]
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Mutable access to the registries, e.g. to clear them.
    pub fn registries_mut(&mut self) -> &mut Registries {
        &mut self.registries
    }

    /// The opacity that subsequent draws use.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.active_opacity
    }

    /// The current visibility threshold.
    #[must_use]
    pub fn visibility_threshold(&self) -> f64 {
        self.visibility_threshold
    }

    /// Changes the visibility threshold.
    pub fn set_visibility_threshold(&mut self, threshold: f64) {
        self.visibility_threshold = threshold;
    }

    /// Number of pushes recorded but not yet written.
    #[must_use]
    pub fn pending_depth(&self) -> usize {
        self.pending.len() / MATRIX_LEN
    }

    fn rect_op(&mut self, op: Op, rect: Rect, tiling: Tiling) -> bool {
        if !self.begin_draw() {
            return false;
        }
        self.stream.push_rect(op, rect, tiling);
        self.stats.record_emitted(op.stat_kind());
        true
    }

    fn text_op(&mut self, op: Op, text: &str, at: Point) -> bool {
        if !self.begin_draw() {
            return false;
        }
        let id = self.registries.texts.intern_str(text);
        self.stream.push(op, &[id.to_f64(), at.x, at.y]);
        self.stats.record_emitted(op.stat_kind());
        true
    }

    /// Checks visibility and flushes pending transforms.
    fn begin_draw(&mut self) -> bool {
        if self.active_opacity < self.visibility_threshold {
            return false;
        }
        for m in self.pending.as_slice().chunks_exact(MATRIX_LEN) {
            self.stream.push(Op::PushTransform, m);
            self.open_pushes += 1;
        }
        self.pending.clear();
        true
    }
}

impl Default for CommandEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Vec2;

    use super::*;
    use crate::stream::Command;

    fn unit_rect() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    fn ops(enc: &CommandEncoder) -> Vec<Op> {
        enc.stream()
            .ops()
            .iter()
            .map(|&b| Op::from_u8(b).unwrap())
            .collect()
    }

    #[test]
    fn same_style_twice_emits_once() {
        let mut enc = CommandEncoder::new();
        let s = Style::new().with_fill("red");
        let a = enc.set_style(&s);
        let b = enc.set_style(&s.clone());
        assert_eq!(a, b);
        assert_eq!(ops(&enc), [Op::SetStyle]);
        let c = enc.stats().get(StatKind::SetStyle);
        assert_eq!(c.total, 2);
        assert_eq!(c.cached, 1);
    }

    #[test]
    fn push_pop_without_draw_emits_nothing() {
        let mut enc = CommandEncoder::new();
        enc.push_transform(&Matrix::from_translation(3.0, 4.0));
        enc.pop_transform();
        enc.finish();
        assert!(enc.stream().is_empty());
        assert_eq!(enc.stream().data_len(), 0);
        let push = enc.stats().get(StatKind::PushTransform);
        let pop = enc.stats().get(StatKind::PopTransform);
        assert_eq!((push.total, push.cached), (1, 1));
        assert_eq!((pop.total, pop.cached), (1, 1));
    }

    #[test]
    fn nested_pushes_flush_in_order() {
        let mut enc = CommandEncoder::new();
        let outer = Matrix::from_translation(1.0, 0.0);
        let inner = Matrix::from_scale(2.0, 2.0);
        enc.push_transform(&outer);
        enc.push_transform(&inner);
        assert_eq!(enc.pending_depth(), 2);
        assert!(enc.fill_rect(unit_rect(), Tiling::NONE));
        enc.pop_transform();
        enc.pop_transform();
        enc.finish();

        let cmds: Vec<_> = enc.stream().commands().collect();
        assert_eq!(
            cmds,
            [
                Command::PushTransform(outer),
                Command::PushTransform(inner),
                Command::FillRect(unit_rect(), Tiling::NONE),
                Command::PopTransform,
                Command::PopTransform,
            ]
        );
    }

    #[test]
    fn emitted_pushes_and_pops_balance() {
        let mut enc = CommandEncoder::new();
        // Root with one drawn child and one empty child.
        enc.push_transform(&Matrix::from_translation(1.0, 1.0));
        enc.push_transform(&Matrix::from_translation(2.0, 2.0));
        enc.fill_rect(unit_rect(), Tiling::NONE);
        enc.pop_transform();
        enc.push_transform(&Matrix::from_translation(3.0, 3.0));
        enc.pop_transform();
        enc.pop_transform();
        enc.finish();

        let o = ops(&enc);
        let pushes = o.iter().filter(|&&op| op == Op::PushTransform).count();
        let pops = o.iter().filter(|&&op| op == Op::PopTransform).count();
        assert_eq!(pushes, 2);
        assert_eq!(pops, 2);
        assert_eq!(enc.stats().get(StatKind::PushTransform).emitted(), 2);
        assert_eq!(enc.stats().get(StatKind::PopTransform).emitted(), 2);
    }

    #[test]
    fn extra_pop_is_ignored() {
        let mut enc = CommandEncoder::new();
        enc.pop_transform();
        assert!(enc.stream().is_empty());
        assert_eq!(enc.stats().get(StatKind::PopTransform).cached, 1);
    }

    #[test]
    fn finish_discards_pending_and_closes_open() {
        let mut enc = CommandEncoder::new();
        enc.push_transform(&Matrix::from_translation(1.0, 0.0));
        enc.fill_rect(unit_rect(), Tiling::NONE);
        enc.push_transform(&Matrix::from_translation(0.0, 1.0));
        let stats = *enc.finish();
        assert_eq!(
            ops(&enc),
            [Op::PushTransform, Op::FillRect, Op::PopTransform]
        );
        assert_eq!(stats.get(StatKind::PushTransform).cached, 1);
        assert_eq!(enc.pending_depth(), 0);
    }

    #[test]
    fn red_rect_across_two_frames() {
        let mut enc = CommandEncoder::new();
        let red = Style::new().with_fill("red").with_line_width(2.0);
        let expected_data = [1.0, 0.0, 0.0, 10.0, 10.0, 1.0, 1.0, 0.0, 0.0];

        for _ in 0..2 {
            enc.clear();
            let id = enc.set_style(&red);
            assert_eq!(id.get(), 1);
            assert!(enc.fill_rect(unit_rect(), Tiling::NONE));
            enc.finish();
            assert_eq!(ops(&enc), [Op::SetStyle, Op::FillRect]);
            assert_eq!(enc.stream().data(), expected_data);
            assert_eq!(enc.stats().get(StatKind::SetStyle).cached, 0);
        }
        assert_eq!(enc.registries().styles.len(), 1);
    }

    #[test]
    fn below_threshold_opacity_drops_draws() {
        let mut enc = CommandEncoder::new();
        enc.set_opacity(0.0005);
        assert!(!enc.fill_rect(unit_rect(), Tiling::NONE));
        enc.finish();
        assert!(!ops(&enc).contains(&Op::FillRect));
        assert_eq!(enc.stats().get(StatKind::FillRect).total, 0);
        assert_eq!(enc.stats().draws_emitted(), 0);
    }

    #[test]
    fn dropped_draw_does_not_flush_transforms() {
        let mut enc = CommandEncoder::new();
        enc.push_transform(&Matrix::from_translation(5.0, 5.0));
        enc.set_opacity(0.0);
        enc.fill_rect(unit_rect(), Tiling::NONE);
        enc.pop_transform();
        enc.finish();
        assert_eq!(ops(&enc), [Op::SetOpacity]);
    }

    #[test]
    fn clear_resets_opacity_and_style() {
        let mut enc = CommandEncoder::new();
        enc.set_opacity(0.5);
        enc.set_style(&Style::new().with_fill("blue"));
        enc.clear();
        assert_eq!(enc.opacity(), 1.0);
        enc.set_opacity(1.0);
        assert!(enc.stream().is_empty());
        assert_eq!(enc.stats().get(StatKind::SetOpacity).cached, 1);
        enc.set_style(&Style::new().with_fill("blue"));
        assert_eq!(ops(&enc), [Op::SetStyle]);
    }

    #[test]
    fn images_and_text_are_interned() {
        let mut enc = CommandEncoder::new();
        enc.draw_image("tree.png", unit_rect(), Tiling::NONE);
        enc.draw_image("tree.png", unit_rect(), Tiling::grid(3, 1, Vec2::new(12.0, 0.0)));
        enc.fill_text("hello", Point::new(1.0, 2.0));
        enc.stroke_text("hello", Point::new(1.0, 2.0));
        assert_eq!(enc.registries().images.len(), 1);
        assert_eq!(enc.registries().texts.len(), 1);
        let image = enc.registries().images.id_of_str("tree.png").unwrap();
        let cmds: Vec<_> = enc.stream().commands().collect();
        assert_eq!(
            cmds[1],
            Command::Image(image, unit_rect(), Tiling::grid(3, 1, Vec2::new(12.0, 0.0)))
        );
    }

    #[test]
    fn ellipse_encodes_bounding_rect() {
        let mut enc = CommandEncoder::new();
        enc.stroke_ellipse(Rect::new(0.0, 3.0, 10.0, 7.0), Tiling::NONE);
        assert_eq!(
            enc.stream().data(),
            [0.0, 3.0, 10.0, 4.0, 1.0, 1.0, 0.0, 0.0]
        );
        assert_eq!(
            enc.stream().commands().next(),
            Some(Command::StrokeEllipse(Rect::new(0.0, 3.0, 10.0, 7.0), Tiling::NONE))
        );
    }

    #[test]
    fn stats_totals_add_up() {
        let mut enc = CommandEncoder::new();
        let s = Style::new().with_stroke("black");
        enc.push_transform(&Matrix::IDENTITY);
        enc.set_style(&s);
        enc.set_style(&s);
        enc.line(Line::new((0.0, 0.0), (1.0, 1.0)), Tiling::NONE);
        enc.pop_transform();
        enc.push_transform(&Matrix::IDENTITY);
        enc.pop_transform();
        enc.finish();
        let stats = enc.stats();
        let emitted = stats.total() - stats.cached();
        assert_eq!(emitted, enc.stream().op_count() as u64);
    }
}
