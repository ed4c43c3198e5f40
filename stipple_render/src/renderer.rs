// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame entry point tying encoder and interpreter together.

use stipple_core::intern::InternId;
use stipple_core::scene::{EntityId, SceneStore};
use stipple_core::stats::{ReplayCounters, Stats};
use stipple_core::trace::{FrameEncodedEvent, FrameReplayedEvent, Tracer};

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::context::{DrawingContext, ImageLoader};
use crate::encoder::{CommandEncoder, Registries};
use crate::interpreter::Interpreter;
use crate::stream::CommandStream;
use crate::traverse::encode_frame;
use crate::visual::Visual;

/// Renders a scene onto a drawing context, one frame per call.
///
/// Each [`render`](Self::render) encodes the scene into a fresh command
/// stream and immediately replays it. Registries and the image cache
/// persist across frames.
pub struct Renderer<L: ImageLoader> {
    encoder: CommandEncoder,
    interpreter: Interpreter<L::Image>,
    loader: L,
    config: RenderConfig,
    frame_index: u64,
}

impl<L: ImageLoader> core::fmt::Debug for Renderer<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Renderer")
            .field("encoder", &self.encoder)
            .field("interpreter", &self.interpreter)
            .field("config", &self.config)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl<L: ImageLoader> Renderer<L> {
    /// Creates a renderer with the default configuration.
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self::with_config(loader, RenderConfig::default())
    }

    /// Creates a renderer with the given configuration.
    #[must_use]
    pub fn with_config(loader: L, config: RenderConfig) -> Self {
        Self {
            encoder: CommandEncoder::with_threshold(config.visibility_threshold),
            interpreter: Interpreter::from_config(&config),
            loader,
            config,
            frame_index: 0,
        }
    }

    /// Renders the subtree under `root` as seen by `camera`.
    pub fn render<C, V>(&mut self, ctx: &mut C, scene: &mut SceneStore<V>, root: EntityId, camera: &Camera)
    where
        C: DrawingContext<Image = L::Image>,
        V: Visual,
    {
        self.render_traced(ctx, scene, root, camera, &mut Tracer::none());
    }

    /// Like [`render`](Self::render), reporting frame events to `tracer`.
    pub fn render_traced<C, V>(
        &mut self,
        ctx: &mut C,
        scene: &mut SceneStore<V>,
        root: EntityId,
        camera: &Camera,
        tracer: &mut Tracer<'_>,
    ) where
        C: DrawingContext<Image = L::Image>,
        V: Visual,
    {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        encode_frame(
            &mut self.encoder,
            scene,
            root,
            camera,
            self.config.cull_margin,
            tracer,
            frame_index,
        );
        let stream = self.encoder.stream();
        tracer.frame_encoded(&FrameEncodedEvent {
            frame_index,
            op_count: saturate(stream.op_count()),
            data_len: saturate(stream.data_len()),
            stats: *self.encoder.stats(),
        });

        let replay = *self.interpreter.replay(
            stream,
            self.encoder.registries(),
            ctx,
            &mut self.loader,
            tracer,
            frame_index,
        );
        tracer.frame_replayed(&FrameReplayedEvent {
            frame_index,
            replay,
        });
    }

    /// Encode counters from the last frame.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        self.encoder.stats()
    }

    /// Replay counters from the last frame.
    #[must_use]
    pub fn replay_counters(&self) -> &ReplayCounters {
        self.interpreter.counters()
    }

    /// The command stream of the last frame.
    #[must_use]
    pub fn stream(&self) -> &CommandStream {
        self.encoder.stream()
    }

    /// The interning registries.
    #[must_use]
    pub fn registries(&self) -> &Registries {
        self.encoder.registries()
    }

    /// Mutable access to the registries.
    pub fn registries_mut(&mut self) -> &mut Registries {
        self.encoder.registries_mut()
    }

    /// Number of frames rendered so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The image loader.
    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Drops the cached image for `key` so it is loaded again next frame.
    pub fn invalidate_image(&mut self, key: &str) {
        if let Some(id) = self.encoder.registries().images.id_of_str(key) {
            self.interpreter.invalidate_image(id);
        }
    }

    /// The cached image id for `key`, if the key has been drawn.
    #[must_use]
    pub fn image_id(&self, key: &str) -> Option<InternId> {
        self.encoder.registries().images.id_of_str(key)
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::ToString;

    use kurbo::{Point, Rect, Size};
    use stipple_core::stats::StatKind;

    use super::*;
    use crate::style::Style;
    use crate::testing::{Call, MapLoader, RecordingContext};
    use crate::visual::{ImageVisual, Scene, ShapeVisual};

    fn scene_with_square() -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let e = scene.create_entity();
        scene.add_component(
            e,
            Box::new(ShapeVisual::filled_rect(
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Style::new().with_fill("red").with_line_width(2.0),
            )),
        );
        (scene, e)
    }

    #[test]
    fn renders_a_square() {
        let (mut scene, root) = scene_with_square();
        let mut renderer = Renderer::new(MapLoader::default());
        let mut ctx = RecordingContext::new();
        let cam = Camera::new(Size::new(100.0, 100.0));
        renderer.render(&mut ctx, &mut scene, root, &cam);

        assert_eq!(ctx.draws(), [&Call::FillRect(Rect::new(0.0, 0.0, 10.0, 10.0))]);
        assert!(ctx.calls.contains(&Call::FillStyle("red".to_string())));
        assert_eq!(renderer.frame_index(), 1);
        assert_eq!(renderer.replay_counters().draw_calls, 1);
        assert_eq!(renderer.stats().get(StatKind::FillRect).emitted(), 1);
    }

    #[test]
    fn repeated_frames_are_stable() {
        let (mut scene, root) = scene_with_square();
        let mut renderer = Renderer::new(MapLoader::default());
        let cam = Camera::new(Size::new(100.0, 100.0));

        let mut first = RecordingContext::new();
        renderer.render(&mut first, &mut scene, root, &cam);
        let evals = scene.eval_counters();
        let mut second = RecordingContext::new();
        renderer.render(&mut second, &mut scene, root, &cam);

        assert_eq!(first.calls, second.calls);
        // Nothing moved, so nothing was recomputed.
        assert_eq!(scene.eval_counters(), evals);
        assert_eq!(renderer.registries().styles.len(), 1);
    }

    #[test]
    fn images_load_lazily() {
        let mut scene = Scene::new();
        let root = scene.create_entity();
        scene.add_component(
            root,
            Box::new(ImageVisual::new("hero.png", Rect::new(0.0, 0.0, 8.0, 8.0))),
        );
        let mut renderer = Renderer::new(MapLoader::default());
        let cam = Camera::new(Size::new(100.0, 100.0));

        let mut ctx = RecordingContext::new();
        renderer.render(&mut ctx, &mut scene, root, &cam);
        assert!(ctx.draws().is_empty());
        assert_eq!(renderer.replay_counters().images_missing, 1);

        renderer
            .loader_mut()
            .images
            .push(("hero.png".to_string(), 4));
        let mut ctx = RecordingContext::new();
        renderer.render(&mut ctx, &mut scene, root, &cam);
        assert_eq!(ctx.draws(), [&Call::DrawImage(4, Rect::new(0.0, 0.0, 8.0, 8.0))]);

        renderer.loader_mut().images[0].1 = 5;
        renderer.invalidate_image("hero.png");
        let mut ctx = RecordingContext::new();
        renderer.render(&mut ctx, &mut scene, root, &cam);
        assert_eq!(ctx.draws(), [&Call::DrawImage(5, Rect::new(0.0, 0.0, 8.0, 8.0))]);
    }

    #[test]
    fn camera_transform_reaches_context() {
        let (mut scene, root) = scene_with_square();
        let mut renderer = Renderer::new(MapLoader::default());
        let cam = Camera::new(Size::new(100.0, 100.0)).with_position(Point::new(5.0, 5.0));
        let mut ctx = RecordingContext::new();
        renderer.render(&mut ctx, &mut scene, root, &cam);
        assert_eq!(ctx.calls[0], Call::Transform(cam.world_to_screen().into()));
    }

    #[test]
    fn visibility_threshold_comes_from_config() {
        let (mut scene, root) = scene_with_square();
        scene.set_opacity(root, 0.0005);
        let cam = Camera::new(Size::new(100.0, 100.0));

        let mut renderer = Renderer::new(MapLoader::default());
        let mut ctx = RecordingContext::new();
        renderer.render(&mut ctx, &mut scene, root, &cam);
        assert!(ctx.draws().is_empty());

        let mut exact = Renderer::with_config(MapLoader::default(), RenderConfig::exact());
        let mut ctx = RecordingContext::new();
        exact.render(&mut ctx, &mut scene, root, &cam);
        assert_eq!(ctx.draws().len(), 1);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn frame_events_are_reported() {
        use alloc::vec::Vec;
        use stipple_core::trace::TraceSink;

        #[derive(Default)]
        struct Frames(Vec<(u64, u32)>);
        impl TraceSink for Frames {
            fn on_frame_encoded(&mut self, e: &FrameEncodedEvent) {
                self.0.push((e.frame_index, e.op_count));
            }
        }

        let (mut scene, root) = scene_with_square();
        let mut renderer = Renderer::new(MapLoader::default());
        let cam = Camera::new(Size::new(100.0, 100.0));
        let mut sink = Frames::default();
        for _ in 0..2 {
            let mut ctx = RecordingContext::new();
            renderer.render_traced(&mut ctx, &mut scene, root, &cam, &mut Tracer::new(&mut sink));
        }
        let ops = u32::try_from(renderer.stream().op_count()).unwrap();
        assert_eq!(sink.0, [(0, ops), (1, ops)]);
    }
}
