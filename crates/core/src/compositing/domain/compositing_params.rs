use serde::{Deserialize, Serialize};

use super::blend_mode::BlendMode;
use crate::shared::constants::{
    DEFAULT_HIGHLIGHT_THRESHOLD, DEFAULT_RECOLOR_EXPANSION, DEFAULT_RECOLOR_FEATHER,
    DEFAULT_RECOLOR_INTENSITY,
};

/// Options for compositing a lens texture onto an iris.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositingParams {
    pub blend_mode: BlendMode,
    /// Scales the texture alpha; `0` leaves the image untouched.
    pub opacity: f64,
    /// Restore bright catch-lights from the original after blending.
    pub preserve_highlights: bool,
    /// Lightness cutoff on the 8-bit scale above which a pixel is a highlight.
    pub highlight_threshold: u8,
}

impl Default for CompositingParams {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
            preserve_highlights: true,
            highlight_threshold: DEFAULT_HIGHLIGHT_THRESHOLD,
        }
    }
}

/// Options for the chroma-only recoloring path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecolorParams {
    /// Peak mask weight in `[0, 1]`.
    pub intensity: f64,
    /// Half-width of the soft band around the mask rim, in pixels.
    pub feather: f64,
    /// Mask radius relative to the iris radius.
    pub expansion: f64,
}

impl Default for RecolorParams {
    fn default() -> Self {
        Self {
            intensity: DEFAULT_RECOLOR_INTENSITY,
            feather: DEFAULT_RECOLOR_FEATHER,
            expansion: DEFAULT_RECOLOR_EXPANSION,
        }
    }
}
