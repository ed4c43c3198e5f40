// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated frame loop that exercises the renderer and the diagnostics
//! pipeline.
//!
//! Builds a small scene (a parallax backdrop, a tiled floor, a walking
//! sprite, a HUD label and a far-away prop), pans the camera across it for
//! 60 frames, and replays each frame onto a
//! [`CanvasLog`](stipple_debug::canvas_log::CanvasLog). Events go to both a
//! [`PrettyPrintSink`](stipple_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](stipple_debug::recorder::RecorderSink), and the recording
//! is exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::{self, BufWriter};

use kurbo::{Line, Point, Rect, Size, Vec2};
use stipple_core::trace::{
    FrameEncodedEvent, FrameReplayedEvent, ImageUnresolvedEvent, SubtreeCulledEvent, TraceSink,
    Tracer,
};
use stipple_debug::canvas_log::{CanvasLog, KeyImages};
use stipple_debug::chrome::{self, DEFAULT_FRAME_INTERVAL_US};
use stipple_debug::pretty::PrettyPrintSink;
use stipple_debug::recorder::RecorderSink;
use stipple_render::{
    Anchor, Camera, EntityId, ImageVisual, Paint, Renderer, Scene, Shape, ShapeVisual, Sizing,
    Style, TextVisual, Tiling,
};

const FRAME_COUNT: u64 = 60;
/// Frame on which the sprite sheet finishes "loading".
const SPRITE_READY_FRAME: u64 = 5;
const SPRITE_KEY: &str = "hero.png";
/// World units the camera moves per frame.
const PAN_SPEED: f64 = 8.0;

/// Forwards every event to two sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_frame_encoded(&mut self, e: &FrameEncodedEvent) {
        self.pretty.on_frame_encoded(e);
        self.recorder.on_frame_encoded(e);
    }

    fn on_frame_replayed(&mut self, e: &FrameReplayedEvent) {
        self.pretty.on_frame_replayed(e);
        self.recorder.on_frame_replayed(e);
    }

    fn on_image_unresolved(&mut self, e: &ImageUnresolvedEvent) {
        self.pretty.on_image_unresolved(e);
        self.recorder.on_image_unresolved(e);
    }

    fn on_subtree_culled(&mut self, e: &SubtreeCulledEvent) {
        self.pretty.on_subtree_culled(e);
        self.recorder.on_subtree_culled(e);
    }
}

struct World {
    scene: Scene,
    root: EntityId,
    hero: EntityId,
}

fn build_world() -> World {
    let mut scene = Scene::new();
    let root = scene.create_entity();

    // -- backdrop: drifts at half the camera speed --------------------------
    let backdrop = scene.create_entity();
    scene.add_child(root, backdrop);
    scene.set_anchor(backdrop, Some(Anchor::parallax(0.5, 0.5)));
    scene.add_component(
        backdrop,
        Box::new(ShapeVisual::filled_rect(
            Rect::new(-400.0, -300.0, 400.0, 300.0),
            Style::new().with_fill("#1d2b53"),
        )),
    );
    scene.add_component(
        backdrop,
        Box::new(
            ShapeVisual::new(
                Shape::Ellipse(Rect::ZERO),
                Paint::Stroke,
                Style::new().with_stroke("#29adff").with_line_width(2.0),
            )
            .with_sizing(Sizing::Fill)
            .with_z_index(1),
        ),
    );

    // -- floor: one tiled instruction -----------------------------------------
    let floor = scene.create_entity();
    scene.add_child(root, floor);
    scene.set_position(floor, Point::new(-320.0, 120.0));
    scene.add_component(
        floor,
        Box::new(
            ShapeVisual::filled_rect(
                Rect::new(0.0, 0.0, 30.0, 30.0),
                Style::new().with_fill("#5f574f"),
            )
            .with_tiling(Tiling::grid(40, 2, Vec2::new(32.0, 32.0))),
        ),
    );

    // -- hero: sprite plus a drop shadow --------------------------------------
    let hero = scene.create_entity();
    scene.add_child(root, hero);
    scene.set_position(hero, Point::new(0.0, 80.0));
    scene.add_component(
        hero,
        Box::new(
            ShapeVisual::new(
                Shape::Ellipse(Rect::new(-12.0, 36.0, 12.0, 44.0)),
                Paint::Fill,
                Style::new().with_fill("#000000"),
            )
            .with_z_index(-1),
        ),
    );
    scene.add_component(
        hero,
        Box::new(
            ImageVisual::new(SPRITE_KEY, Rect::new(-16.0, 0.0, 16.0, 40.0))
                .with_style(Style::new().with_image_smoothing(false)),
        ),
    );

    // -- HUD: pinned to the screen's top-left corner -------------------------
    let hud = scene.create_entity();
    scene.add_child(root, hud);
    scene.set_anchor(hud, Some(Anchor::SCREEN));
    scene.set_position(hud, Point::new(-300.0, -220.0));
    scene.add_component(
        hud,
        Box::new(
            TextVisual::new(
                "stipple",
                Point::new(0.0, 16.0),
                Style::new()
                    .with_fill("#fff1e8")
                    .with_font("16px monospace"),
            )
            .with_extent(Size::new(80.0, 16.0)),
        ),
    );
    scene.add_component(
        hud,
        Box::new(ShapeVisual::new(
            Shape::Line(Line::new((0.0, 20.0), (80.0, 20.0))),
            Paint::Stroke,
            Style::new().with_stroke("#fff1e8"),
        )),
    );

    // -- far prop: only visible near the end of the pan ------------------------
    let prop = scene.create_entity();
    scene.add_child(root, prop);
    scene.set_position(prop, Point::new(700.0, 60.0));
    scene.set_opacity(prop, 0.8);
    scene.add_component(
        prop,
        Box::new(ShapeVisual::new(
            Shape::Rect(Rect::new(0.0, 0.0, 40.0, 60.0)),
            Paint::FillAndStroke,
            Style::new().with_fill("#ab5236").with_stroke("#000000"),
        )),
    );

    World { scene, root, hero }
}

fn main() -> io::Result<()> {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(io::stdout()));
    let mut recorder = RecorderSink::new();

    // -- scene and renderer ------------------------------------------------
    let World {
        mut scene,
        root,
        hero,
    } = build_world();
    let mut renderer = Renderer::new(KeyImages::new());
    let mut camera = Camera::new(Size::new(640.0, 480.0));
    let mut log = CanvasLog::new();

    // -- simulated loop ----------------------------------------------------
    for frame_index in 0..FRAME_COUNT {
        if frame_index == SPRITE_READY_FRAME {
            renderer.loader_mut().ready(SPRITE_KEY);
        }

        // The hero walks right a little faster than the camera pans.
        let t = frame_index as f64;
        scene.set_position(hero, Point::new(t * PAN_SPEED * 1.25, 80.0));
        camera = camera.with_position(Point::new(t * PAN_SPEED, 0.0));

        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        renderer.render_traced(&mut log, &mut scene, root, &camera, &mut Tracer::new(&mut tee));

        if frame_index == 0 {
            println!("-- frame 0 draw log --");
            for line in log.lines() {
                println!("    {line}");
            }
        }
        log.take_lines();
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    chrome::export(recorder.as_bytes(), DEFAULT_FRAME_INTERVAL_US, &mut writer)?;

    let evals = scene.eval_counters();
    let loads = renderer.loader_mut().loads();
    println!(
        "Wrote {path} ({FRAME_COUNT} frames, {} styles, {loads} image loads, {evals:?})",
        renderer.registries().styles.len(),
    );
    Ok(())
}
