// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The 2-D camera: maps world space to the screen.

use kurbo::{Point, Size, Vec2};
use stipple_core::bbox::BoundingBox;
use stipple_core::matrix::Matrix;
use stipple_core::scene::Anchor;

/// A view onto the world.
///
/// `position` is the world point shown at the center of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World point at the center of the viewport.
    pub position: Point,
    /// Screen pixels per world unit.
    pub zoom: f64,
    /// Viewport size in screen pixels.
    pub viewport: Size,
}

impl Camera {
    /// Creates a camera centered on the world origin with zoom 1.
    #[must_use]
    pub const fn new(viewport: Size) -> Self {
        Self {
            position: Point::ORIGIN,
            zoom: 1.0,
            viewport,
        }
    }

    /// Returns a copy centered on `position`.
    #[must_use]
    pub const fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Returns a copy with the given zoom.
    #[must_use]
    pub const fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// World-to-screen matrix: `T(viewport / 2) · S(zoom) · T(-position)`.
    #[must_use]
    pub fn world_to_screen(&self) -> Matrix {
        let mut m = Matrix::from_translation(self.viewport.width / 2.0, self.viewport.height / 2.0);
        m.scale(self.zoom, self.zoom)
            .translate(-self.position.x, -self.position.y);
        m
    }

    /// Screen-to-world matrix, or identity when the zoom is degenerate.
    #[must_use]
    pub fn screen_to_world(&self) -> Matrix {
        self.world_to_screen().inverse_or_identity()
    }

    /// The visible world region, inflated by `margin` world units.
    #[must_use]
    pub fn cull_box(&self, margin: f64) -> BoundingBox {
        let screen = BoundingBox::from_origin_size(0.0, 0.0, self.viewport.width, self.viewport.height);
        let mut world = BoundingBox::EMPTY;
        world.expand_transformed(&screen, &self.screen_to_world());
        world.inflate(margin)
    }

    /// Position offset that pins an entity with `anchor` relative to the
    /// camera.
    ///
    /// A parallax of `(1, 1)` moves with the world (no offset); `(0, 0)`
    /// stays fixed on screen.
    #[must_use]
    pub fn anchor_offset(&self, anchor: &Anchor) -> Vec2 {
        Vec2::new(
            self.position.x * (1.0 - anchor.parallax.x),
            self.position.y * (1.0 - anchor.parallax.y),
        )
    }

    /// Scale multiplier for an anchored entity.
    #[must_use]
    pub fn anchor_scale(&self, anchor: &Anchor) -> Vec2 {
        if anchor.screen_scale && self.zoom != 0.0 {
            Vec2::new(1.0 / self.zoom, 1.0 / self.zoom)
        } else {
            Vec2::new(1.0, 1.0)
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn camera_center_maps_to_viewport_center() {
        let cam = Camera::new(Size::new(200.0, 100.0))
            .with_position(Point::new(50.0, -20.0))
            .with_zoom(2.0);
        let m = cam.world_to_screen();
        assert!(approx(m.transform_point(cam.position), Point::new(100.0, 50.0)));
        assert!(approx(
            m.transform_point(Point::new(51.0, -20.0)),
            Point::new(102.0, 50.0)
        ));
    }

    #[test]
    fn screen_to_world_round_trips() {
        let cam = Camera::new(Size::new(200.0, 100.0)).with_zoom(4.0);
        let p = Point::new(13.0, 7.0);
        let back = cam
            .screen_to_world()
            .transform_point(cam.world_to_screen().transform_point(p));
        assert!(approx(back, p));
    }

    #[test]
    fn cull_box_covers_visible_world() {
        let cam = Camera::new(Size::new(200.0, 100.0))
            .with_position(Point::new(10.0, 10.0))
            .with_zoom(2.0);
        let b = cam.cull_box(0.0);
        assert!((b.x1 - -40.0).abs() < 1e-9);
        assert!((b.x2 - 60.0).abs() < 1e-9);
        assert!((b.y1 - -15.0).abs() < 1e-9);
        assert!((b.y2 - 35.0).abs() < 1e-9);
        let inflated = cam.cull_box(5.0);
        assert!((inflated.x1 - -45.0).abs() < 1e-9);
    }

    #[test]
    fn anchor_offsets() {
        let cam = Camera::default()
            .with_position(Point::new(100.0, 40.0))
            .with_zoom(2.0);
        assert_eq!(cam.anchor_offset(&Anchor::SCREEN), Vec2::new(100.0, 40.0));
        assert_eq!(
            cam.anchor_offset(&Anchor::parallax(0.5, 1.0)),
            Vec2::new(50.0, 0.0)
        );
        assert_eq!(cam.anchor_scale(&Anchor::SCREEN), Vec2::new(0.5, 0.5));
        assert_eq!(
            cam.anchor_scale(&Anchor::parallax(0.5, 0.5)),
            Vec2::new(1.0, 1.0)
        );
    }
}
