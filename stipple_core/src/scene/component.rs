// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable components and camera anchoring.

use alloc::boxed::Box;

use kurbo::Vec2;

use crate::bbox::BoundingBox;

/// Something attached to an entity that occupies space in its local frame.
///
/// The store only needs two facts about a component: where it is (for
/// bounding-box aggregation) and where it sorts among its siblings.
pub trait Component {
    /// The component's extent in its entity's local space, or `None` if it
    /// does not contribute to the entity's bounds.
    fn local_bounds(&self) -> Option<BoundingBox>;

    /// Paint order among the entity's components; lower draws first.
    ///
    /// Components with equal z keep their insertion order.
    fn z_index(&self) -> i32 {
        0
    }
}

impl<T: Component + ?Sized> Component for Box<T> {
    #[inline]
    fn local_bounds(&self) -> Option<BoundingBox> {
        (**self).local_bounds()
    }

    #[inline]
    fn z_index(&self) -> i32 {
        (**self).z_index()
    }
}

/// Camera-relative placement of an entity.
///
/// Before each frame, traversal writes the entity's
/// [`position_offset`](super::SceneStore::set_position_offset) and
/// [`scale_mult`](super::SceneStore::set_scale_mult) from the camera, so
/// the entity keeps its place on screen instead of in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// How strongly the entity follows world scrolling, per axis.
    ///
    /// `1.0` scrolls with the world, `0.0` is pinned to the screen, values
    /// in between give a parallax layer.
    pub parallax: Vec2,
    /// Whether the entity ignores camera zoom.
    pub screen_scale: bool,
}

impl Anchor {
    /// An anchor that pins the entity to the screen entirely.
    pub const SCREEN: Self = Self {
        parallax: Vec2::ZERO,
        screen_scale: true,
    };

    /// A parallax anchor that still zooms with the world.
    #[must_use]
    pub const fn parallax(x: f64, y: f64) -> Self {
        Self {
            parallax: Vec2::new(x, y),
            screen_scale: false,
        }
    }
}
