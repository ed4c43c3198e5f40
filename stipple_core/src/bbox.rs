// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding box with an explicit empty state.

use kurbo::{Point, Rect};

use crate::matrix::Matrix;

/// An axis-aligned box accumulated by min/max expansion.
///
/// Accumulation starts from [`EMPTY`](Self::EMPTY), whose minimum corner is
/// `+inf` and maximum corner is `-inf`, so the first expansion snaps the box
/// onto the first point. A box that was never expanded stays inverted and
/// reports [`is_empty`](Self::is_empty); it is never mistaken for a
/// zero-area box at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum x.
    pub x1: f64,
    /// Minimum y.
    pub y1: f64,
    /// Maximum x.
    pub x2: f64,
    /// Maximum y.
    pub y2: f64,
}

impl BoundingBox {
    /// The inverted box every accumulation starts from.
    pub const EMPTY: Self = Self {
        x1: f64::INFINITY,
        y1: f64::INFINITY,
        x2: f64::NEG_INFINITY,
        y2: f64::NEG_INFINITY,
    };

    /// Creates a box from its corners.
    #[inline]
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates a box from an origin and a size.
    #[inline]
    #[must_use]
    pub fn from_origin_size(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x.min(x + w), y.min(y + h), x.max(x + w), y.max(y + h))
    }

    /// Resets to [`EMPTY`](Self::EMPTY).
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    /// Whether nothing has been accumulated (`x1 > x2` or `y1 > y2`).
    ///
    /// A NaN corner also counts as empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.x1 <= self.x2 && self.y1 <= self.y2)
    }

    /// Grows the box to contain `p`.
    #[inline]
    pub fn expand_point(&mut self, p: Point) {
        self.x1 = self.x1.min(p.x);
        self.y1 = self.y1.min(p.y);
        self.x2 = self.x2.max(p.x);
        self.y2 = self.y2.max(p.y);
    }

    /// Grows the box to contain `other`. Empty boxes contribute nothing.
    #[inline]
    pub fn expand_box(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.x1 = self.x1.min(other.x1);
        self.y1 = self.y1.min(other.y1);
        self.x2 = self.x2.max(other.x2);
        self.y2 = self.y2.max(other.y2);
    }

    /// Grows the box to contain the four corners of `local` mapped through
    /// `matrix`.
    pub fn expand_transformed(&mut self, local: &Self, matrix: &Matrix) {
        if local.is_empty() {
            return;
        }
        for corner in local.corners() {
            self.expand_point(matrix.transform_point(corner));
        }
    }

    /// The four corners, clockwise from the minimum corner.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x1, self.y2),
        ]
    }

    /// Whether the two boxes overlap (touching edges count).
    ///
    /// Empty boxes intersect nothing, including each other.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x1 <= other.x2
            && other.x1 <= self.x2
            && self.y1 <= other.y2
            && other.y1 <= self.y2
    }

    /// Returns a copy grown by `margin` on every side.
    #[must_use]
    pub fn inflate(&self, margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::new(
            self.x1 - margin,
            self.y1 - margin,
            self.x2 + margin,
            self.y2 + margin,
        )
    }

    /// Width, or zero when empty.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.x2 - self.x1 }
    }

    /// Height, or zero when empty.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.y2 - self.y1 }
    }

    /// Converts to a [`Rect`], or `None` when empty.
    #[inline]
    #[must_use]
    pub fn to_rect(&self) -> Option<Rect> {
        (!self.is_empty()).then(|| Rect::new(self.x1, self.y1, self.x2, self.y2))
    }
}

impl Default for BoundingBox {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<Rect> for BoundingBox {
    #[inline]
    fn from(rect: Rect) -> Self {
        let r = rect.abs();
        Self::new(r.x0, r.y0, r.x1, r.y1)
    }
}
