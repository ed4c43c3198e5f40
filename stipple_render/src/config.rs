// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer configuration.

/// Knobs for the encode and replay passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Draws issued while the effective opacity is below this value are
    /// dropped by the encoder.
    pub visibility_threshold: f64,
    /// Divide stroke widths by the accumulated uniform scale so strokes keep
    /// their nominal on-screen width under zoom.
    pub screen_space_strokes: bool,
    /// World units the camera's cull box is inflated by.
    pub cull_margin: f64,
    /// Remember failed image lookups instead of retrying them next frame.
    pub cache_missing_images: bool,
}

impl RenderConfig {
    /// Default opacity below which draws are dropped.
    pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.001;

    /// No opacity cutoff and no stroke correction.
    ///
    /// Every draw reaches the context with exactly the widths it was given,
    /// which is easier to compare against hand-written expectations.
    #[must_use]
    pub const fn exact() -> Self {
        Self {
            visibility_threshold: 0.0,
            screen_space_strokes: false,
            cull_margin: 0.0,
            cache_missing_images: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: Self::DEFAULT_VISIBILITY_THRESHOLD,
            screen_space_strokes: true,
            cull_margin: 0.0,
            cache_missing_images: false,
        }
    }
}
