// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing-context contract the interpreter replays onto.

use kurbo::{Affine, Ellipse, Line, Point, Rect};

use crate::style::{LineCap, TextAlign, TextBaseline};

/// An immediate-mode 2-D drawing surface.
///
/// The shape mirrors a canvas-style API: a current transform that
/// [`transform`](Self::transform) multiplies into, and a set of state
/// properties that persist until overwritten. The interpreter skips
/// property writes that would not change the stored value, so setters may
/// be arbitrarily expensive.
pub trait DrawingContext {
    /// A loaded image the context can blit.
    type Image;

    /// Post-multiplies the current transform by `m`.
    fn transform(&mut self, m: Affine);

    /// Sets the fill color.
    fn set_fill_style(&mut self, color: &str);
    /// Sets the stroke color.
    fn set_stroke_style(&mut self, color: &str);
    /// Sets the stroke width in current user units.
    fn set_line_width(&mut self, width: f64);
    /// Sets the global alpha.
    fn set_global_alpha(&mut self, alpha: f64);
    /// Sets the font shorthand.
    fn set_font(&mut self, font: &str);
    /// Sets the text alignment.
    fn set_text_align(&mut self, align: TextAlign);
    /// Sets the text baseline.
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    /// Sets the stroke cap.
    fn set_line_cap(&mut self, cap: LineCap);
    /// Sets whether scaled images are smoothed.
    fn set_image_smoothing(&mut self, enabled: bool);

    /// Fills a rectangle.
    fn fill_rect(&mut self, rect: Rect);
    /// Strokes a rectangle outline.
    fn stroke_rect(&mut self, rect: Rect);
    /// Fills an ellipse.
    fn fill_ellipse(&mut self, ellipse: Ellipse);
    /// Strokes an ellipse outline.
    fn stroke_ellipse(&mut self, ellipse: Ellipse);
    /// Strokes a line segment.
    fn stroke_line(&mut self, line: Line);
    /// Draws `image` stretched over `dest`.
    fn draw_image(&mut self, image: &Self::Image, dest: Rect);
    /// Fills a text run anchored at `at`.
    fn fill_text(&mut self, text: &str, at: Point);
    /// Strokes a text run anchored at `at`.
    fn stroke_text(&mut self, text: &str, at: Point);
}

/// Resolves image keys to loaded images.
///
/// Asset I/O lives outside the renderer; a loader that returns `None` for
/// an image that is still loading is expected, and the lookup is retried
/// on a later frame.
pub trait ImageLoader {
    /// The image type handed to the drawing context.
    type Image;

    /// Returns the image for `key`, if it is available.
    fn load(&mut self, key: &str) -> Option<Self::Image>;
}

/// An [`ImageLoader`] that never has any image.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoImages;

impl ImageLoader for NoImages {
    type Image = ();

    fn load(&mut self, _key: &str) -> Option<()> {
        None
    }
}
