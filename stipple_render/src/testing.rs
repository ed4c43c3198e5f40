// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording drawing context and image loader for unit tests.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Affine, Ellipse, Line, Point, Rect};

use crate::context::{DrawingContext, ImageLoader};
use crate::style::{LineCap, TextAlign, TextBaseline};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Transform(Affine),
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    GlobalAlpha(f64),
    Font(String),
    TextAlign(TextAlign),
    TextBaseline(TextBaseline),
    LineCap(LineCap),
    ImageSmoothing(bool),
    FillRect(Rect),
    StrokeRect(Rect),
    FillEllipse(Ellipse),
    StrokeEllipse(Ellipse),
    StrokeLine(Line),
    DrawImage(u32, Rect),
    FillText(String, Point),
    StrokeText(String, Point),
}

impl Call {
    pub(crate) fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::FillRect(_)
                | Self::StrokeRect(_)
                | Self::FillEllipse(_)
                | Self::StrokeEllipse(_)
                | Self::StrokeLine(_)
                | Self::DrawImage(..)
                | Self::FillText(..)
                | Self::StrokeText(..)
        )
    }

    pub(crate) fn is_property(&self) -> bool {
        !self.is_draw() && !matches!(self, Self::Transform(_))
    }
}

/// Records every call and tracks the current transform.
#[derive(Debug)]
pub(crate) struct RecordingContext {
    pub(crate) calls: Vec<Call>,
    pub(crate) current: Affine,
}

impl RecordingContext {
    pub(crate) fn new() -> Self {
        Self {
            calls: Vec::new(),
            current: Affine::IDENTITY,
        }
    }

    pub(crate) fn draws(&self) -> Vec<&Call> {
        self.calls.iter().filter(|c| c.is_draw()).collect()
    }

    pub(crate) fn property_writes(&self) -> usize {
        self.calls.iter().filter(|c| c.is_property()).count()
    }

    pub(crate) fn transforms(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Transform(_)))
            .count()
    }
}

impl DrawingContext for RecordingContext {
    type Image = u32;

    fn transform(&mut self, m: Affine) {
        self.current *= m;
        self.calls.push(Call::Transform(m));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.calls.push(Call::FillStyle(color.to_string()));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.calls.push(Call::StrokeStyle(color.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.calls.push(Call::LineWidth(width));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.calls.push(Call::GlobalAlpha(alpha));
    }

    fn set_font(&mut self, font: &str) {
        self.calls.push(Call::Font(font.to_string()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.calls.push(Call::TextAlign(align));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.calls.push(Call::TextBaseline(baseline));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.calls.push(Call::LineCap(cap));
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.calls.push(Call::ImageSmoothing(enabled));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.calls.push(Call::FillRect(rect));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.calls.push(Call::StrokeRect(rect));
    }

    fn fill_ellipse(&mut self, ellipse: Ellipse) {
        self.calls.push(Call::FillEllipse(ellipse));
    }

    fn stroke_ellipse(&mut self, ellipse: Ellipse) {
        self.calls.push(Call::StrokeEllipse(ellipse));
    }

    fn stroke_line(&mut self, line: Line) {
        self.calls.push(Call::StrokeLine(line));
    }

    fn draw_image(&mut self, image: &u32, dest: Rect) {
        self.calls.push(Call::DrawImage(*image, dest));
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.calls.push(Call::FillText(text.to_string(), at));
    }

    fn stroke_text(&mut self, text: &str, at: Point) {
        self.calls.push(Call::StrokeText(text.to_string(), at));
    }
}

/// Serves a fixed set of images and counts lookups.
#[derive(Debug, Default)]
pub(crate) struct MapLoader {
    pub(crate) images: Vec<(String, u32)>,
    pub(crate) loads: u32,
}

impl MapLoader {
    pub(crate) fn with(images: &[(&str, u32)]) -> Self {
        Self {
            images: images.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
            loads: 0,
        }
    }
}

impl ImageLoader for MapLoader {
    type Image = u32;

    fn load(&mut self, key: &str) -> Option<u32> {
        self.loads += 1;
        self.images.iter().find(|(k, _)| k == key).map(|&(_, v)| v)
    }
}
