// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable components and the built-in visuals.

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::{Line, Point, Rect, Size, Vec2};
use stipple_core::bbox::BoundingBox;
use stipple_core::scene::{Component, SceneStore};

use crate::camera::Camera;
use crate::encoder::CommandEncoder;
use crate::stream::Tiling;
use crate::style::Style;

/// Per-entity information handed to a visual while encoding.
#[derive(Clone, Copy, Debug)]
pub struct RenderView<'a> {
    /// The frame's camera.
    pub camera: &'a Camera,
    /// Union of the local bounds of the entity's components.
    pub content_bounds: BoundingBox,
}

/// A component that records draw commands.
///
/// Visuals are encoded in the entity's local space; the entity's transform
/// is already pushed when [`queue_render_commands`](Self::queue_render_commands)
/// runs.
pub trait Visual: Component {
    /// Records this visual's commands. Returns whether anything was drawn.
    fn queue_render_commands(&self, encoder: &mut CommandEncoder, view: &RenderView<'_>) -> bool;
}

impl<T: Visual + ?Sized> Visual for Box<T> {
    #[inline]
    fn queue_render_commands(&self, encoder: &mut CommandEncoder, view: &RenderView<'_>) -> bool {
        (**self).queue_render_commands(encoder, view)
    }
}

/// A scene of boxed visuals.
pub type Scene = SceneStore<Box<dyn Visual>>;

/// Which of fill and stroke a visual paints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Paint {
    /// Interior only.
    #[default]
    Fill,
    /// Outline only.
    Stroke,
    /// Interior, then outline.
    FillAndStroke,
}

impl Paint {
    const fn fills(self) -> bool {
        matches!(self, Self::Fill | Self::FillAndStroke)
    }

    const fn strokes(self) -> bool {
        matches!(self, Self::Stroke | Self::FillAndStroke)
    }
}

/// Where a visual's rectangle comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sizing {
    /// The rectangle the visual was built with.
    #[default]
    Fixed,
    /// The union of the entity's other components' bounds, recomputed on
    /// every draw.
    ///
    /// A fill-sized visual reports no bounds of its own, so an entity
    /// whose only visuals are fill-sized has nothing to stretch over and
    /// draws nothing.
    Fill,
}

/// Geometry of a [`ShapeVisual`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// The axis-aligned ellipse inscribed in a rectangle.
    Ellipse(Rect),
    /// A line segment. Always stroked; [`Sizing`] does not apply.
    Line(Line),
}

/// A filled and/or stroked primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeVisual {
    /// Geometry in local space.
    pub shape: Shape,
    /// Fill, stroke or both.
    pub paint: Paint,
    /// Style made active before drawing.
    pub style: Style,
    /// Grid repetition.
    pub tiling: Tiling,
    /// Rectangle source.
    pub sizing: Sizing,
    /// Paint order among the entity's components.
    pub z_index: i32,
}

impl ShapeVisual {
    /// Creates a fixed-size, untiled shape.
    #[must_use]
    pub fn new(shape: Shape, paint: Paint, style: Style) -> Self {
        Self {
            shape,
            paint,
            style,
            tiling: Tiling::NONE,
            sizing: Sizing::Fixed,
            z_index: 0,
        }
    }

    /// A filled rectangle.
    #[must_use]
    pub fn filled_rect(rect: Rect, style: Style) -> Self {
        Self::new(Shape::Rect(rect), Paint::Fill, style)
    }

    /// Sets the tiling.
    #[must_use]
    pub fn with_tiling(mut self, tiling: Tiling) -> Self {
        self.tiling = tiling;
        self
    }

    /// Sets the sizing.
    #[must_use]
    pub fn with_sizing(mut self, sizing: Sizing) -> Self {
        self.sizing = sizing;
        self
    }

    /// Sets the z index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

impl Component for ShapeVisual {
    fn local_bounds(&self) -> Option<BoundingBox> {
        if self.sizing == Sizing::Fill && !matches!(self.shape, Shape::Line(_)) {
            return None;
        }
        let base = match self.shape {
            Shape::Rect(r) | Shape::Ellipse(r) => BoundingBox::from(r),
            Shape::Line(l) => {
                let mut b = BoundingBox::EMPTY;
                b.expand_point(l.p0);
                b.expand_point(l.p1);
                b
            }
        };
        Some(tiled_bounds(base, self.tiling))
    }

    fn z_index(&self) -> i32 {
        self.z_index
    }
}

impl Visual for ShapeVisual {
    fn queue_render_commands(&self, encoder: &mut CommandEncoder, view: &RenderView<'_>) -> bool {
        let rect = |r: Rect| match self.sizing {
            Sizing::Fixed => Some(r),
            Sizing::Fill => view.content_bounds.to_rect(),
        };
        encoder.set_style(&self.style);
        let mut drawn = false;
        match self.shape {
            Shape::Rect(r) => {
                let Some(r) = rect(r) else { return false };
                if self.paint.fills() {
                    drawn |= encoder.fill_rect(r, self.tiling);
                }
                if self.paint.strokes() {
                    drawn |= encoder.stroke_rect(r, self.tiling);
                }
            }
            Shape::Ellipse(r) => {
                let Some(r) = rect(r) else { return false };
                if self.paint.fills() {
                    drawn |= encoder.fill_ellipse(r, self.tiling);
                }
                if self.paint.strokes() {
                    drawn |= encoder.stroke_ellipse(r, self.tiling);
                }
            }
            Shape::Line(l) => drawn |= encoder.line(l, self.tiling),
        }
        drawn
    }
}

/// An image stretched over a rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageVisual {
    /// Key handed to the image loader.
    pub key: String,
    /// Destination in local space.
    pub rect: Rect,
    /// Grid repetition.
    pub tiling: Tiling,
    /// Rectangle source.
    pub sizing: Sizing,
    /// Optional style, e.g. to turn off smoothing for pixel art.
    pub style: Option<Style>,
    /// Paint order among the entity's components.
    pub z_index: i32,
}

impl ImageVisual {
    /// Creates a fixed-size, untiled image.
    #[must_use]
    pub fn new(key: impl Into<String>, rect: Rect) -> Self {
        Self {
            key: key.into(),
            rect,
            tiling: Tiling::NONE,
            sizing: Sizing::Fixed,
            style: None,
            z_index: 0,
        }
    }

    /// Sets the tiling.
    #[must_use]
    pub fn with_tiling(mut self, tiling: Tiling) -> Self {
        self.tiling = tiling;
        self
    }

    /// Sets the sizing.
    #[must_use]
    pub fn with_sizing(mut self, sizing: Sizing) -> Self {
        self.sizing = sizing;
        self
    }

    /// Sets the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the z index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

impl Component for ImageVisual {
    fn local_bounds(&self) -> Option<BoundingBox> {
        match self.sizing {
            Sizing::Fixed => Some(tiled_bounds(BoundingBox::from(self.rect), self.tiling)),
            Sizing::Fill => None,
        }
    }

    fn z_index(&self) -> i32 {
        self.z_index
    }
}

impl Visual for ImageVisual {
    fn queue_render_commands(&self, encoder: &mut CommandEncoder, view: &RenderView<'_>) -> bool {
        let rect = match self.sizing {
            Sizing::Fixed => self.rect,
            Sizing::Fill => match view.content_bounds.to_rect() {
                Some(r) => r,
                None => return false,
            },
        };
        if let Some(style) = &self.style {
            encoder.set_style(style);
        }
        encoder.draw_image(&self.key, rect, self.tiling)
    }
}

/// A single run of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextVisual {
    /// The text.
    pub text: String,
    /// Anchor point in local space.
    pub position: Point,
    /// Fill, stroke or both.
    pub paint: Paint,
    /// Style made active before drawing.
    pub style: Style,
    /// Approximate size of the run, used only for bounds.
    ///
    /// The box extends right and up from the anchor, which matches start
    /// alignment on the alphabetic baseline. A zero size contributes no
    /// bounds.
    pub extent: Size,
    /// Paint order among the entity's components.
    pub z_index: i32,
}

impl TextVisual {
    /// Creates a filled text run.
    #[must_use]
    pub fn new(text: impl Into<String>, position: Point, style: Style) -> Self {
        Self {
            text: text.into(),
            position,
            paint: Paint::Fill,
            style,
            extent: Size::ZERO,
            z_index: 0,
        }
    }

    /// Sets the paint.
    #[must_use]
    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.paint = paint;
        self
    }

    /// Sets the bounds hint.
    #[must_use]
    pub fn with_extent(mut self, extent: Size) -> Self {
        self.extent = extent;
        self
    }

    /// Sets the z index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

impl Component for TextVisual {
    fn local_bounds(&self) -> Option<BoundingBox> {
        if self.extent.is_zero_area() {
            return None;
        }
        let top_left = self.position - Vec2::new(0.0, self.extent.height);
        Some(BoundingBox::from(Rect::from_origin_size(top_left, self.extent)))
    }

    fn z_index(&self) -> i32 {
        self.z_index
    }
}

impl Visual for TextVisual {
    fn queue_render_commands(&self, encoder: &mut CommandEncoder, _view: &RenderView<'_>) -> bool {
        encoder.set_style(&self.style);
        let mut drawn = false;
        if self.paint.fills() {
            drawn |= encoder.fill_text(&self.text, self.position);
        }
        if self.paint.strokes() {
            drawn |= encoder.stroke_text(&self.text, self.position);
        }
        drawn
    }
}

/// Bounds of `base` repeated over `tiling`.
fn tiled_bounds(base: BoundingBox, tiling: Tiling) -> BoundingBox {
    if tiling.columns == 0 || tiling.rows == 0 {
        return BoundingBox::EMPTY;
    }
    let last = Vec2::new(
        f64::from(tiling.columns - 1) * tiling.gap.x,
        f64::from(tiling.rows - 1) * tiling.gap.y,
    );
    let mut b = base;
    b.expand_box(&BoundingBox::new(
        base.x1 + last.x,
        base.y1 + last.y,
        base.x2 + last.x,
        base.y2 + last.y,
    ));
    b
}
