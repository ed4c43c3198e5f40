// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing styles.
//!
//! A [`Style`] is a *sparse overlay*: every field is optional, and replaying
//! a style only overwrites the fields it sets. [`ActiveStyle`] is the fully
//! resolved state the interpreter keeps while replaying a stream.

use alloc::string::String;
use core::fmt::Write as _;

/// Horizontal text alignment relative to the anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Aligned to the start of the line (left in LTR text).
    #[default]
    Start,
    /// Aligned to the end of the line.
    End,
    /// Left edge at the anchor.
    Left,
    /// Right edge at the anchor.
    Right,
    /// Centered on the anchor.
    Center,
}

impl TextAlign {
    /// CSS keyword for this alignment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

/// Vertical text alignment relative to the anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Top of the em square.
    Top,
    /// Hanging baseline.
    Hanging,
    /// Middle of the em square.
    Middle,
    /// Alphabetic baseline.
    #[default]
    Alphabetic,
    /// Ideographic baseline.
    Ideographic,
    /// Bottom of the em square.
    Bottom,
}

impl TextBaseline {
    /// CSS keyword for this baseline.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Hanging => "hanging",
            Self::Middle => "middle",
            Self::Alphabetic => "alphabetic",
            Self::Ideographic => "ideographic",
            Self::Bottom => "bottom",
        }
    }
}

/// Shape of stroke end points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// Flat, ending exactly at the end point.
    #[default]
    Butt,
    /// Rounded.
    Round,
    /// Flat, extended by half the line width.
    Square,
}

impl LineCap {
    /// CSS keyword for this cap.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// A sparse set of drawing properties.
///
/// Colors and fonts are CSS-like strings passed through to the drawing
/// context untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Fill color.
    pub fill: Option<String>,
    /// Stroke color.
    pub stroke: Option<String>,
    /// Nominal stroke width in screen pixels.
    pub line_width: Option<f64>,
    /// Font shorthand.
    pub font: Option<String>,
    /// Text alignment.
    pub text_align: Option<TextAlign>,
    /// Text baseline.
    pub text_baseline: Option<TextBaseline>,
    /// Stroke cap.
    pub line_cap: Option<LineCap>,
    /// Whether scaled images are smoothed.
    pub image_smoothing: Option<bool>,
}

impl Style {
    /// Creates a style that sets nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fill color.
    #[must_use]
    pub fn with_fill(mut self, color: impl Into<String>) -> Self {
        self.fill = Some(color.into());
        self
    }

    /// Sets the stroke color.
    #[must_use]
    pub fn with_stroke(mut self, color: impl Into<String>) -> Self {
        self.stroke = Some(color.into());
        self
    }

    /// Sets the nominal stroke width.
    #[must_use]
    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    /// Sets the font.
    #[must_use]
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Sets the text alignment.
    #[must_use]
    pub fn with_text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    /// Sets the text baseline.
    #[must_use]
    pub fn with_text_baseline(mut self, baseline: TextBaseline) -> Self {
        self.text_baseline = Some(baseline);
        self
    }

    /// Sets the stroke cap.
    #[must_use]
    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = Some(cap);
        self
    }

    /// Sets image smoothing.
    #[must_use]
    pub fn with_image_smoothing(mut self, smoothing: bool) -> Self {
        self.image_smoothing = Some(smoothing);
        self
    }

    /// Content key used for interning: every field, in order, with unset
    /// fields spelled as `-`.
    ///
    /// Two styles with equal keys are interchangeable.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut key = String::new();
        push_field(&mut key, self.fill.as_deref());
        push_field(&mut key, self.stroke.as_deref());
        match self.line_width {
            // `{:?}` keeps `2` and `2.0` distinct from `20` and is exact.
            Some(w) => _ = write!(key, "={w:?}|"),
            None => key.push_str("-|"),
        }
        push_field(&mut key, self.font.as_deref());
        push_field(&mut key, self.text_align.map(TextAlign::as_str));
        push_field(&mut key, self.text_baseline.map(TextBaseline::as_str));
        push_field(&mut key, self.line_cap.map(LineCap::as_str));
        push_field(
            &mut key,
            self.image_smoothing.map(|s| if s { "smooth" } else { "pixelated" }),
        );
        key
    }
}

fn push_field(key: &mut String, value: Option<&str>) {
    match value {
        // Set values start with `=` so no value can read as the unset `-`.
        // Escape the separator so "a|" + "b" cannot collide with "a" + "|b".
        Some(v) => {
            key.push('=');
            for ch in v.chars() {
                if ch == '|' || ch == '\\' {
                    key.push('\\');
                }
                key.push(ch);
            }
        }
        None => key.push('-'),
    }
    key.push('|');
}

/// The fully resolved drawing state while replaying a stream.
///
/// String fields borrow from the style registry for the duration of one
/// replay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveStyle<'a> {
    /// Fill color.
    pub fill: &'a str,
    /// Stroke color.
    pub stroke: &'a str,
    /// Nominal stroke width.
    pub line_width: f64,
    /// Font shorthand.
    pub font: &'a str,
    /// Text alignment.
    pub text_align: TextAlign,
    /// Text baseline.
    pub text_baseline: TextBaseline,
    /// Stroke cap.
    pub line_cap: LineCap,
    /// Image smoothing.
    pub image_smoothing: bool,
}

impl Default for ActiveStyle<'_> {
    fn default() -> Self {
        Self {
            fill: "#000000",
            stroke: "#000000",
            line_width: 1.0,
            font: "10px sans-serif",
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
            line_cap: LineCap::Butt,
            image_smoothing: true,
        }
    }
}

impl<'a> ActiveStyle<'a> {
    /// Overwrites the fields `style` sets, keeping the rest.
    pub fn overlay(&mut self, style: &'a Style) {
        if let Some(fill) = &style.fill {
            self.fill = fill;
        }
        if let Some(stroke) = &style.stroke {
            self.stroke = stroke;
        }
        if let Some(w) = style.line_width {
            self.line_width = w;
        }
        if let Some(font) = &style.font {
            self.font = font;
        }
        if let Some(align) = style.text_align {
            self.text_align = align;
        }
        if let Some(baseline) = style.text_baseline {
            self.text_baseline = baseline;
        }
        if let Some(cap) = style.line_cap {
            self.line_cap = cap;
        }
        if let Some(smoothing) = style.image_smoothing {
            self.image_smoothing = smoothing;
        }
    }
}
