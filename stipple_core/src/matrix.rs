// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Six-coefficient 2-D affine matrix.
//!
//! [`Matrix`] is the mutable, in-place counterpart of [`kurbo::Affine`]: the
//! scene store keeps one local and one world matrix per entity and rewrites
//! them when dirty instead of allocating new values. The coefficient layout
//! is the same as kurbo's, so conversion in both directions is free.
//!
//! ```text
//!   | a c e |     x' = a·x + c·y + e
//!   | b d f |     y' = b·x + d·y + f
//!   | 0 0 1 |
//! ```

use core::ops::{Mul, MulAssign};

use kurbo::{Affine, Point, Vec2};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A 2-D affine transform stored as six coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    /// Horizontal scale / rotation component.
    pub a: f64,
    /// Vertical skew / rotation component.
    pub b: f64,
    /// Horizontal skew / rotation component.
    pub c: f64,
    /// Vertical scale / rotation component.
    pub d: f64,
    /// Horizontal translation.
    pub e: f64,
    /// Vertical translation.
    pub f: f64,
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    /// Creates a matrix from its six coefficients.
    #[inline]
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Creates a matrix from a `[a, b, c, d, e, f]` array.
    #[inline]
    #[must_use]
    pub const fn from_coeffs(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    /// Returns the coefficients as `[a, b, c, d, e, f]`.
    #[inline]
    #[must_use]
    pub const fn as_coeffs(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Creates a rotation (radians, positive is clockwise in y-down space).
    #[inline]
    #[must_use]
    pub fn from_rotation(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Resets to the identity.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Post-multiplies by a translation: `self = self · T(tx, ty)`.
    #[inline]
    pub fn translate(&mut self, tx: f64, ty: f64) -> &mut Self {
        self.e += self.a * tx + self.c * ty;
        self.f += self.b * tx + self.d * ty;
        self
    }

    /// Post-multiplies by a rotation: `self = self · R(radians)`.
    #[inline]
    pub fn rotate(&mut self, radians: f64) -> &mut Self {
        if radians == 0.0 {
            return self;
        }
        let (s, c) = sin_cos(radians);
        let Self { a, b, c: c0, d, .. } = *self;
        self.a = a * c + c0 * s;
        self.b = b * c + d * s;
        self.c = c0 * c - a * s;
        self.d = d * c - b * s;
        self
    }

    /// Post-multiplies by a scale: `self = self · S(sx, sy)`.
    #[inline]
    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.a *= sx;
        self.b *= sx;
        self.c *= sy;
        self.d *= sy;
        self
    }

    /// Pre-multiplies in place: `self = lhs · self`.
    #[inline]
    pub fn pre_multiply(&mut self, lhs: &Self) {
        *self = *lhs * *self;
    }

    /// Determinant of the linear part, `a·d − b·c`.
    #[inline]
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Returns the inverse, or `None` if the matrix is degenerate
    /// (zero or non-finite determinant).
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    /// Returns the inverse, substituting the identity for degenerate
    /// matrices.
    #[inline]
    #[must_use]
    pub fn inverse_or_identity(&self) -> Self {
        self.inverse().unwrap_or(Self::IDENTITY)
    }

    /// Maps a point through the transform.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// The uniform scale factor this matrix applies to lengths,
    /// `sqrt(|det|)`.
    ///
    /// Exact for similarity transforms; a geometric-mean approximation for
    /// non-uniform scales.
    #[inline]
    #[must_use]
    pub fn uniform_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// Returns the translation component.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.e, self.f)
    }

    /// Is this matrix [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
            && self.e.is_finite()
            && self.f.is_finite()
    }

    /// Is this matrix [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub const fn is_nan(&self) -> bool {
        self.a.is_nan()
            || self.b.is_nan()
            || self.c.is_nan()
            || self.d.is_nan()
            || self.e.is_nan()
            || self.f.is_nan()
    }
}

#[inline]
fn sin_cos(radians: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    let sc = radians.sin_cos();
    #[cfg(not(feature = "std"))]
    let sc = (radians.sin(), radians.cos());
    sc
}

impl Default for Matrix {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }
}

impl MulAssign for Matrix {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl From<Affine> for Matrix {
    #[inline]
    fn from(affine: Affine) -> Self {
        Self::from_coeffs(affine.as_coeffs())
    }
}

impl From<Matrix> for Affine {
    #[inline]
    fn from(m: Matrix) -> Self {
        Self::new(m.as_coeffs())
    }
}
