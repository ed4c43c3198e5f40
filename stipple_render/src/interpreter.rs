// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The command interpreter: replays a [`CommandStream`] onto a
//! [`DrawingContext`].
//!
//! Replay is one linear pass. Alongside the context it keeps:
//!
//! - a **scale stack** of accumulated uniform scale, used to keep stroke
//!   widths constant on screen;
//! - an **inverse stack**, so a pop undoes its push by applying the inverse
//!   matrix instead of saving and restoring the whole context;
//! - a **state cache** of the last value written to each context property,
//!   so writes that would not change anything are skipped;
//! - a lazy **image cache** from image ids to loaded images.
//!
//! A push whose matrix cannot be inverted is never applied to the context.
//! Everything drawn until its matching pop is suppressed, and the pop
//! applies nothing, so the context comes back to exactly its pre-push state.

use alloc::vec::Vec;

use kurbo::{Affine, Ellipse, Line};
use stipple_core::buffer::TypedBuffer;
use stipple_core::cache::LazyCache;
use stipple_core::intern::InternId;
use stipple_core::matrix::Matrix;
use stipple_core::stats::ReplayCounters;
use stipple_core::trace::{ImageUnresolvedEvent, Tracer};

use crate::config::RenderConfig;
use crate::context::{DrawingContext, ImageLoader};
use crate::encoder::Registries;
use crate::stream::{Command, CommandStream};
use crate::style::{ActiveStyle, LineCap, TextAlign, TextBaseline};

/// Per-push replay state.
const APPLIED: u8 = 0;
/// The push was degenerate; draws are suppressed until its pop.
const DEGENERATE: u8 = 1;
/// The push happened inside a suppressed region and was not applied.
const SKIPPED: u8 = 2;

/// Replays command streams, keeping caches across frames.
pub struct Interpreter<I> {
    scale_stack: TypedBuffer<f64>,
    inverse_stack: TypedBuffer<f64>,
    push_state: TypedBuffer<u8>,
    images: LazyCache<InternId, I>,
    /// Images that failed to resolve during the current replay.
    missed: Vec<InternId>,
    counters: ReplayCounters,
    screen_space_strokes: bool,
}

impl<I> core::fmt::Debug for Interpreter<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Interpreter")
            .field("images", &self.images)
            .field("counters", &self.counters)
            .field("screen_space_strokes", &self.screen_space_strokes)
            .finish_non_exhaustive()
    }
}

impl<I> Interpreter<I> {
    /// Creates an interpreter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&RenderConfig::default())
    }

    /// Creates an interpreter using the replay-side options of `config`.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            scale_stack: TypedBuffer::new(),
            inverse_stack: TypedBuffer::new(),
            push_state: TypedBuffer::new(),
            images: LazyCache::new(config.cache_missing_images),
            missed: Vec::new(),
            counters: ReplayCounters::default(),
            screen_space_strokes: config.screen_space_strokes,
        }
    }

    /// Counters from the most recent replay.
    #[must_use]
    pub fn counters(&self) -> &ReplayCounters {
        &self.counters
    }

    /// The image cache.
    #[must_use]
    pub fn images(&self) -> &LazyCache<InternId, I> {
        &self.images
    }

    /// Forgets the loaded image (or remembered miss) for `id`.
    pub fn invalidate_image(&mut self, id: InternId) {
        self.images.invalidate(&id);
    }

    /// Forgets every loaded image.
    pub fn clear_images(&mut self) {
        self.images.clear();
    }

    /// Replays `stream` onto `ctx`.
    ///
    /// Ids are resolved through `registries`; images that are not cached yet
    /// are requested from `loader`.
    pub fn replay<C, L>(
        &mut self,
        stream: &CommandStream,
        registries: &Registries,
        ctx: &mut C,
        loader: &mut L,
        tracer: &mut Tracer<'_>,
        frame_index: u64,
    ) -> &ReplayCounters
    where
        C: DrawingContext<Image = I>,
        L: ImageLoader<Image = I>,
    {
        let Self {
            scale_stack,
            inverse_stack,
            push_state,
            images,
            missed,
            counters,
            screen_space_strokes,
        } = self;

        counters.reset();
        missed.clear();
        scale_stack.clear();
        scale_stack.push(1.0);
        inverse_stack.clear();
        push_state.clear();

        let mut style = ActiveStyle::default();
        let mut state = StateCache::default();
        let mut alpha = 1.0;
        let mut suppressed = 0_u32;

        for command in stream.commands() {
            counters.commands += 1;
            match command {
                Command::PushTransform(m) => {
                    let top = scale_stack.last().unwrap_or(1.0);
                    if suppressed > 0 {
                        inverse_stack.push_multiple(&Matrix::IDENTITY.as_coeffs());
                        scale_stack.push(top);
                        push_state.push(SKIPPED);
                    } else if let Some(inverse) = m.inverse() {
                        ctx.transform(Affine::from(m));
                        inverse_stack.push_multiple(&inverse.as_coeffs());
                        scale_stack.push(top * m.uniform_scale());
                        push_state.push(APPLIED);
                    } else {
                        inverse_stack.push_multiple(&Matrix::IDENTITY.as_coeffs());
                        scale_stack.push(top);
                        push_state.push(DEGENERATE);
                        suppressed += 1;
                        counters.degenerate_transforms += 1;
                    }
                }
                Command::PopTransform => {
                    let (Some(flag), Some(inv)) = (push_state.last(), inverse_stack.last_n(6))
                    else {
                        continue;
                    };
                    match flag {
                        APPLIED => {
                            let mut coeffs = [0.0; 6];
                            coeffs.copy_from_slice(inv);
                            ctx.transform(Affine::new(coeffs));
                        }
                        DEGENERATE => suppressed -= 1,
                        _ => {}
                    }
                    push_state.pop(1);
                    inverse_stack.pop(6);
                    scale_stack.pop(1);
                }
                Command::SetStyle(id) => {
                    if let Some(s) = registries.styles.id_to_item(id) {
                        style.overlay(s);
                    }
                }
                Command::SetOpacity(a) => alpha = a,
                _ if suppressed > 0 => {}
                Command::FillRect(rect, tiling) => {
                    state.fill(ctx, &style, alpha, counters);
                    for off in tiling.offsets() {
                        ctx.fill_rect(rect + off);
                        counters.draw_calls += 1;
                    }
                }
                Command::StrokeRect(rect, tiling) => {
                    let width = stroke_width(&style, scale_stack, *screen_space_strokes);
                    state.stroke(ctx, &style, width, alpha, counters);
                    for off in tiling.offsets() {
                        ctx.stroke_rect(rect + off);
                        counters.draw_calls += 1;
                    }
                }
                Command::FillEllipse(rect, tiling) => {
                    state.fill(ctx, &style, alpha, counters);
                    for off in tiling.offsets() {
                        ctx.fill_ellipse(Ellipse::from_rect(rect + off));
                        counters.draw_calls += 1;
                    }
                }
                Command::StrokeEllipse(rect, tiling) => {
                    let width = stroke_width(&style, scale_stack, *screen_space_strokes);
                    state.stroke(ctx, &style, width, alpha, counters);
                    for off in tiling.offsets() {
                        ctx.stroke_ellipse(Ellipse::from_rect(rect + off));
                        counters.draw_calls += 1;
                    }
                }
                Command::Line(line, tiling) => {
                    let width = stroke_width(&style, scale_stack, *screen_space_strokes);
                    state.stroke(ctx, &style, width, alpha, counters);
                    for off in tiling.offsets() {
                        ctx.stroke_line(Line::new(line.p0 + off, line.p1 + off));
                        counters.draw_calls += 1;
                    }
                }
                Command::Image(id, rect, tiling) => {
                    if missed.contains(&id) {
                        counters.images_missing += 1;
                        continue;
                    }
                    let resolved = images.get_or_resolve(id, |id| {
                        let key = registries.images.id_to_item(*id)?;
                        loader.load(key)
                    });
                    let Some(image) = resolved else {
                        counters.images_missing += 1;
                        missed.push(id);
                        tracer.image_unresolved(&ImageUnresolvedEvent {
                            frame_index,
                            image: id,
                        });
                        continue;
                    };
                    state.image(ctx, &style, alpha, counters);
                    for off in tiling.offsets() {
                        ctx.draw_image(image, rect + off);
                        counters.draw_calls += 1;
                    }
                }
                Command::FillText(id, at) => {
                    let Some(text) = registries.texts.id_to_item(id) else {
                        continue;
                    };
                    state.fill(ctx, &style, alpha, counters);
                    state.text(ctx, &style, counters);
                    ctx.fill_text(text, at);
                    counters.draw_calls += 1;
                }
                Command::StrokeText(id, at) => {
                    let Some(text) = registries.texts.id_to_item(id) else {
                        continue;
                    };
                    let width = stroke_width(&style, scale_stack, *screen_space_strokes);
                    state.stroke(ctx, &style, width, alpha, counters);
                    state.text(ctx, &style, counters);
                    ctx.stroke_text(text, at);
                    counters.draw_calls += 1;
                }
            }
        }

        counters
    }
}

impl<I> Default for Interpreter<I> {
    fn default() -> Self {
        Self::new()
    }
}

fn stroke_width(style: &ActiveStyle<'_>, scale_stack: &TypedBuffer<f64>, screen_space: bool) -> f64 {
    if !screen_space {
        return style.line_width;
    }
    match scale_stack.last() {
        Some(scale) if scale > 0.0 && scale.is_finite() => style.line_width / scale,
        _ => style.line_width,
    }
}

/// The values last written to each context property during one replay.
#[derive(Default)]
struct StateCache<'a> {
    alpha: Option<f64>,
    fill: Option<&'a str>,
    stroke: Option<&'a str>,
    line_width: Option<f64>,
    line_cap: Option<LineCap>,
    font: Option<&'a str>,
    text_align: Option<TextAlign>,
    text_baseline: Option<TextBaseline>,
    image_smoothing: Option<bool>,
}

/// Stores `value` in `slot` and reports whether the context needs a write.
#[inline]
fn changed<T: PartialEq>(slot: &mut Option<T>, value: T, counters: &mut ReplayCounters) -> bool {
    if slot.as_ref() == Some(&value) {
        counters.property_writes_skipped += 1;
        return false;
    }
    *slot = Some(value);
    counters.property_writes += 1;
    true
}

impl<'a> StateCache<'a> {
    fn fill<C: DrawingContext>(
        &mut self,
        ctx: &mut C,
        style: &ActiveStyle<'a>,
        alpha: f64,
        counters: &mut ReplayCounters,
    ) {
        if changed(&mut self.alpha, alpha, counters) {
            ctx.set_global_alpha(alpha);
        }
        if changed(&mut self.fill, style.fill, counters) {
            ctx.set_fill_style(style.fill);
        }
    }

    fn stroke<C: DrawingContext>(
        &mut self,
        ctx: &mut C,
        style: &ActiveStyle<'a>,
        width: f64,
        alpha: f64,
        counters: &mut ReplayCounters,
    ) {
        if changed(&mut self.alpha, alpha, counters) {
            ctx.set_global_alpha(alpha);
        }
        if changed(&mut self.stroke, style.stroke, counters) {
            ctx.set_stroke_style(style.stroke);
        }
        if changed(&mut self.line_width, width, counters) {
            ctx.set_line_width(width);
        }
        if changed(&mut self.line_cap, style.line_cap, counters) {
            ctx.set_line_cap(style.line_cap);
        }
    }

    fn text<C: DrawingContext>(
        &mut self,
        ctx: &mut C,
        style: &ActiveStyle<'a>,
        counters: &mut ReplayCounters,
    ) {
        if changed(&mut self.font, style.font, counters) {
            ctx.set_font(style.font);
        }
        if changed(&mut self.text_align, style.text_align, counters) {
            ctx.set_text_align(style.text_align);
        }
        if changed(&mut self.text_baseline, style.text_baseline, counters) {
            ctx.set_text_baseline(style.text_baseline);
        }
    }

    fn image<C: DrawingContext>(
        &mut self,
        ctx: &mut C,
        style: &ActiveStyle<'a>,
        alpha: f64,
        counters: &mut ReplayCounters,
    ) {
        if changed(&mut self.alpha, alpha, counters) {
            ctx.set_global_alpha(alpha);
        }
        if changed(&mut self.image_smoothing, style.image_smoothing, counters) {
            ctx.set_image_smoothing(style.image_smoothing);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use kurbo::{Point, Rect, Vec2};

    use super::*;
    use crate::encoder::CommandEncoder;
    use crate::stream::Tiling;
    use crate::style::Style;
    use crate::testing::{Call, MapLoader, RecordingContext};

    fn replay(
        interp: &mut Interpreter<u32>,
        enc: &CommandEncoder,
        loader: &mut MapLoader,
    ) -> RecordingContext {
        let mut ctx = RecordingContext::new();
        interp.replay(
            enc.stream(),
            enc.registries(),
            &mut ctx,
            loader,
            &mut Tracer::none(),
            0,
        );
        ctx
    }

    fn square() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn degenerate_push_leaves_context_untouched() {
        let mut enc = CommandEncoder::new();
        enc.push_transform(&Matrix::new(0.0, 0.0, 0.0, 0.0, 5.0, 5.0));
        enc.fill_rect(square(), Tiling::NONE);
        enc.pop_transform();
        enc.fill_rect(square(), Tiling::NONE);
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        assert_eq!(ctx.current, Affine::IDENTITY);
        assert_eq!(ctx.transforms(), 0);
        // Only the draw after the pop reaches the context.
        assert_eq!(ctx.draws(), [&Call::FillRect(square())]);
        assert_eq!(interp.counters().degenerate_transforms, 1);
    }

    #[test]
    fn nested_push_inside_degenerate_is_not_applied() {
        let mut enc = CommandEncoder::new();
        enc.push_transform(&Matrix::from_scale(0.0, 1.0));
        enc.push_transform(&Matrix::from_translation(1.0, 1.0));
        enc.fill_rect(square(), Tiling::NONE);
        enc.pop_transform();
        enc.pop_transform();
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        assert_eq!(ctx.transforms(), 0);
        assert!(ctx.draws().is_empty());
    }

    #[test]
    fn pop_restores_transform() {
        let mut enc = CommandEncoder::new();
        enc.push_transform(&Matrix::from_translation(10.0, 0.0));
        enc.push_transform(Matrix::from_scale(2.0, 2.0).rotate(0.5));
        enc.fill_rect(square(), Tiling::NONE);
        enc.pop_transform();
        enc.pop_transform();
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        let coeffs = ctx.current.as_coeffs();
        let identity = Affine::IDENTITY.as_coeffs();
        for (got, want) in coeffs.iter().zip(identity) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn unchanged_properties_are_skipped() {
        let mut enc = CommandEncoder::new();
        let red = Style::new().with_fill("red");
        let red_wide = Style::new().with_fill("red").with_line_width(4.0);
        enc.set_style(&red);
        enc.fill_rect(square(), Tiling::NONE);
        // Different style id, same fill color.
        enc.set_style(&red_wide);
        enc.fill_rect(square(), Tiling::NONE);
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        let fills = ctx
            .calls
            .iter()
            .filter(|c| matches!(c, Call::FillStyle(_)))
            .count();
        assert_eq!(fills, 1);
        let counters = interp.counters();
        assert_eq!(counters.property_writes, 2);
        assert_eq!(counters.property_writes_skipped, 2);
        assert_eq!(counters.property_writes, ctx.property_writes() as u64);
    }

    #[test]
    fn styles_overlay_field_by_field() {
        let mut enc = CommandEncoder::new();
        enc.set_style(&Style::new().with_fill("red"));
        enc.set_style(&Style::new().with_stroke("blue"));
        enc.fill_rect(square(), Tiling::NONE);
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        assert!(ctx.calls.contains(&Call::FillStyle("red".to_string())));
    }

    #[test]
    fn stroke_width_follows_scale_stack() {
        let mut enc = CommandEncoder::new();
        enc.set_style(&Style::new().with_line_width(2.0));
        enc.push_transform(&Matrix::from_scale(4.0, 4.0));
        enc.stroke_rect(square(), Tiling::NONE);
        enc.pop_transform();
        enc.stroke_rect(square(), Tiling::NONE);
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        let widths: Vec<_> = ctx
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::LineWidth(w) => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(widths, [0.5, 2.0]);

        let mut exact = Interpreter::from_config(&RenderConfig::exact());
        let ctx = replay(&mut exact, &enc, &mut MapLoader::default());
        assert!(!ctx.calls.contains(&Call::LineWidth(0.5)));
    }

    #[test]
    fn tiled_draw_issues_one_call_per_copy() {
        let mut enc = CommandEncoder::new();
        enc.fill_rect(square(), Tiling::grid(3, 2, Vec2::new(20.0, 15.0)));
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        let draws = ctx.draws();
        assert_eq!(draws.len(), 6);
        assert_eq!(interp.counters().draw_calls, 6);
        assert_eq!(
            draws[5],
            &Call::FillRect(Rect::new(40.0, 15.0, 50.0, 25.0))
        );
    }

    #[test]
    fn images_resolve_once_and_misses_retry_next_frame() {
        let mut enc = CommandEncoder::new();
        enc.draw_image("hero.png", square(), Tiling::NONE);
        enc.draw_image("hero.png", square(), Tiling::NONE);
        enc.draw_image("later.png", square(), Tiling::NONE);
        enc.draw_image("later.png", square(), Tiling::NONE);
        enc.finish();

        let mut loader = MapLoader::with(&[("hero.png", 7)]);
        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut loader);
        assert_eq!(ctx.draws().len(), 2);
        assert_eq!(ctx.draws()[0], &Call::DrawImage(7, square()));
        assert_eq!(interp.counters().images_missing, 2);
        // One load per image; the second miss in a frame is not retried.
        assert_eq!(loader.loads, 2);

        loader.images.push(("later.png".to_string(), 9));
        let ctx = replay(&mut interp, &enc, &mut loader);
        assert_eq!(ctx.draws().len(), 4);
        assert_eq!(interp.counters().images_missing, 0);
        assert_eq!(loader.loads, 3);
    }

    #[test]
    fn negative_caching_keeps_misses() {
        let mut enc = CommandEncoder::new();
        enc.draw_image("gone.png", square(), Tiling::NONE);
        enc.finish();

        let config = RenderConfig {
            cache_missing_images: true,
            ..RenderConfig::default()
        };
        let mut loader = MapLoader::default();
        let mut interp = Interpreter::from_config(&config);
        replay(&mut interp, &enc, &mut loader);
        replay(&mut interp, &enc, &mut loader);
        assert_eq!(loader.loads, 1);
        assert_eq!(interp.counters().images_missing, 1);

        interp.invalidate_image(enc.registries().images.id_of_str("gone.png").unwrap());
        replay(&mut interp, &enc, &mut loader);
        assert_eq!(loader.loads, 2);
    }

    #[test]
    fn text_sets_font_state() {
        let mut enc = CommandEncoder::new();
        enc.set_style(
            &Style::new()
                .with_font("12px serif")
                .with_text_align(TextAlign::Center),
        );
        enc.fill_text("score", Point::new(4.0, 8.0));
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        assert!(ctx.calls.contains(&Call::Font("12px serif".to_string())));
        assert!(ctx.calls.contains(&Call::TextAlign(TextAlign::Center)));
        assert_eq!(
            ctx.draws(),
            [&Call::FillText("score".to_string(), Point::new(4.0, 8.0))]
        );
    }

    #[test]
    fn opacity_reaches_context() {
        let mut enc = CommandEncoder::new();
        enc.set_opacity(0.25);
        enc.fill_rect(square(), Tiling::NONE);
        enc.finish();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        assert!(ctx.calls.contains(&Call::GlobalAlpha(0.25)));
    }

    #[test]
    fn unknown_style_ids_are_ignored() {
        let mut enc = CommandEncoder::new();
        enc.set_style(&Style::new().with_fill("red"));
        enc.fill_rect(square(), Tiling::NONE);
        enc.finish();
        enc.registries_mut().clear();

        let mut interp = Interpreter::new();
        let ctx = replay(&mut interp, &enc, &mut MapLoader::default());
        assert!(ctx.calls.contains(&Call::FillStyle(ActiveStyle::default().fill.to_string())));
        assert_eq!(ctx.draws().len(), 1);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn unresolved_images_are_traced_once_per_frame() {
        use stipple_core::trace::TraceSink;

        #[derive(Default)]
        struct Misses(u32);
        impl TraceSink for Misses {
            fn on_image_unresolved(&mut self, _e: &ImageUnresolvedEvent) {
                self.0 += 1;
            }
        }

        let mut enc = CommandEncoder::new();
        enc.draw_image("x.png", square(), Tiling::NONE);
        enc.draw_image("x.png", square(), Tiling::NONE);
        enc.finish();

        let mut sink = Misses::default();
        let mut interp = Interpreter::<u32>::new();
        let mut ctx = RecordingContext::new();
        interp.replay(
            enc.stream(),
            enc.registries(),
            &mut ctx,
            &mut MapLoader::default(),
            &mut Tracer::new(&mut sink),
            3,
        );
        assert_eq!(sink.0, 1);
    }
}
