// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-stream encoding and replay for stipple scenes.
//!
//! A frame runs in two passes over an intermediate [`CommandStream`]:
//!
//! 1. **Encode.** [`encode_frame`] walks a [`SceneStore`] of [`Visual`]s,
//!    culls subtrees outside the [`Camera`], and records draws through a
//!    [`CommandEncoder`]. The encoder defers transforms until a draw needs
//!    them, interns styles, images and text into [`Registries`], and drops
//!    draws that would be invisible.
//! 2. **Replay.** An [`Interpreter`] walks the stream once and issues calls
//!    on a [`DrawingContext`], skipping property writes the context already
//!    holds and undoing transforms through precomputed inverses.
//!
//! [`Renderer`] runs both passes and is the usual entry point:
//!
//! ```
//! use kurbo::{Rect, Size};
//! use stipple_render::{Camera, NoImages, Renderer, Scene, ShapeVisual, Style};
//!
//! let mut scene = Scene::new();
//! let square = scene.create_entity();
//! scene.add_component(
//!     square,
//!     Box::new(ShapeVisual::filled_rect(
//!         Rect::new(0.0, 0.0, 10.0, 10.0),
//!         Style::new().with_fill("tomato"),
//!     )),
//! );
//!
//! let mut renderer = Renderer::new(NoImages);
//! let camera = Camera::new(Size::new(320.0, 240.0));
//! # struct Null;
//! # impl stipple_render::DrawingContext for Null {
//! #     type Image = ();
//! #     fn transform(&mut self, _: kurbo::Affine) {}
//! #     fn set_fill_style(&mut self, _: &str) {}
//! #     fn set_stroke_style(&mut self, _: &str) {}
//! #     fn set_line_width(&mut self, _: f64) {}
//! #     fn set_global_alpha(&mut self, _: f64) {}
//! #     fn set_font(&mut self, _: &str) {}
//! #     fn set_text_align(&mut self, _: stipple_render::TextAlign) {}
//! #     fn set_text_baseline(&mut self, _: stipple_render::TextBaseline) {}
//! #     fn set_line_cap(&mut self, _: stipple_render::LineCap) {}
//! #     fn set_image_smoothing(&mut self, _: bool) {}
//! #     fn fill_rect(&mut self, _: Rect) {}
//! #     fn stroke_rect(&mut self, _: Rect) {}
//! #     fn fill_ellipse(&mut self, _: kurbo::Ellipse) {}
//! #     fn stroke_ellipse(&mut self, _: kurbo::Ellipse) {}
//! #     fn stroke_line(&mut self, _: kurbo::Line) {}
//! #     fn draw_image(&mut self, _: &(), _: Rect) {}
//! #     fn fill_text(&mut self, _: &str, _: kurbo::Point) {}
//! #     fn stroke_text(&mut self, _: &str, _: kurbo::Point) {}
//! # }
//! # let mut ctx = Null;
//! renderer.render(&mut ctx, &mut scene, square, &camera);
//! assert_eq!(renderer.replay_counters().draw_calls, 1);
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Forwards to `stipple_core/trace`.
//! - `trace-rich` (disabled by default, implies `trace`): Also reports culled
//!   subtrees.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod camera;
mod config;
mod context;
mod encoder;
mod interpreter;
mod renderer;
mod stream;
mod style;
#[cfg(test)]
mod testing;
mod traverse;
mod visual;

pub use camera::Camera;
pub use config::RenderConfig;
pub use context::{DrawingContext, ImageLoader, NoImages};
pub use encoder::{CommandEncoder, Registries};
pub use interpreter::Interpreter;
pub use renderer::Renderer;
pub use stream::{Command, CommandStream, Commands, Op, Tiling};
pub use style::{ActiveStyle, LineCap, Style, TextAlign, TextBaseline};
pub use traverse::{apply_anchors, encode_frame};
pub use visual::{ImageVisual, Paint, RenderView, Scene, Shape, ShapeVisual, Sizing, TextVisual, Visual};

// Re-exported so callers can name scene types without a direct dependency.
pub use stipple_core::scene::{Anchor, EntityId, SceneStore};
