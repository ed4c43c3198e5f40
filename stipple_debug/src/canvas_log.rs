// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A drawing context that writes down what it was asked to do.
//!
//! [`CanvasLog`] implements [`DrawingContext`] by appending one line of text
//! per call, in a canvas-like notation. Images are identified by their key,
//! so [`KeyImages`] is the matching loader.

use std::collections::HashSet;
use std::fmt::Write as _;

use kurbo::{Affine, Ellipse, Line, Point, Rect};
use stipple_render::{DrawingContext, ImageLoader, LineCap, TextAlign, TextBaseline};

/// A [`DrawingContext`] that records every call as a line of text.
#[derive(Clone, Debug, Default)]
pub struct CanvasLog {
    lines: Vec<String>,
    draw_calls: u64,
}

impl CanvasLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of primitive draws recorded.
    #[must_use]
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    /// Returns the recorded lines and starts a fresh log.
    pub fn take_lines(&mut self) -> Vec<String> {
        self.draw_calls = 0;
        std::mem::take(&mut self.lines)
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    fn draw(&mut self, line: String) {
        self.draw_calls += 1;
        self.push(line);
    }
}

fn rect_args(r: Rect) -> String {
    format!("{}, {}, {}, {}", r.x0, r.y0, r.width(), r.height())
}

impl DrawingContext for CanvasLog {
    type Image = String;

    fn transform(&mut self, m: Affine) {
        let mut line = String::from("transform(");
        for (i, c) in m.as_coeffs().iter().enumerate() {
            if i > 0 {
                line.push_str(", ");
            }
            let _ = write!(line, "{c}");
        }
        line.push(')');
        self.push(line);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.push(format!("fillStyle = {color}"));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.push(format!("strokeStyle = {color}"));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(format!("lineWidth = {width}"));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.push(format!("globalAlpha = {alpha}"));
    }

    fn set_font(&mut self, font: &str) {
        self.push(format!("font = {font}"));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.push(format!("textAlign = {}", align.as_str()));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.push(format!("textBaseline = {}", baseline.as_str()));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.push(format!("lineCap = {}", cap.as_str()));
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.push(format!("imageSmoothingEnabled = {enabled}"));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.draw(format!("fillRect({})", rect_args(rect)));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.draw(format!("strokeRect({})", rect_args(rect)));
    }

    fn fill_ellipse(&mut self, ellipse: Ellipse) {
        let c = ellipse.center();
        let r = ellipse.radii();
        self.draw(format!("fillEllipse({}, {}, {}, {})", c.x, c.y, r.x, r.y));
    }

    fn stroke_ellipse(&mut self, ellipse: Ellipse) {
        let c = ellipse.center();
        let r = ellipse.radii();
        self.draw(format!("strokeEllipse({}, {}, {}, {})", c.x, c.y, r.x, r.y));
    }

    fn stroke_line(&mut self, line: Line) {
        self.draw(format!(
            "line({}, {}, {}, {})",
            line.p0.x, line.p0.y, line.p1.x, line.p1.y
        ));
    }

    fn draw_image(&mut self, image: &String, dest: Rect) {
        self.draw(format!("drawImage({image}, {})", rect_args(dest)));
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.draw(format!("fillText({text:?}, {}, {})", at.x, at.y));
    }

    fn stroke_text(&mut self, text: &str, at: Point) {
        self.draw(format!("strokeText({text:?}, {}, {})", at.x, at.y));
    }
}

/// An [`ImageLoader`] that resolves a fixed set of keys to themselves.
///
/// Keys not yet marked [`ready`](Self::ready) behave like images that are
/// still loading.
#[derive(Clone, Debug, Default)]
pub struct KeyImages {
    ready: HashSet<String>,
    loads: u64,
}

impl KeyImages {
    /// Creates a loader with no images available.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `key` available from now on.
    pub fn ready(&mut self, key: &str) {
        self.ready.insert(key.to_owned());
    }

    /// Number of load attempts so far.
    #[must_use]
    pub fn loads(&self) -> u64 {
        self.loads
    }
}

impl ImageLoader for KeyImages {
    type Image = String;

    fn load(&mut self, key: &str) -> Option<String> {
        self.loads += 1;
        self.ready.get(key).cloned()
    }
}
