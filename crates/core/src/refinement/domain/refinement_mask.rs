//! Masks telling a refiner which pixels around each eye it may repaint.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::detection::domain::detection_result::DetectionResult;
use crate::shared::mask::Mask;
use crate::shared::pixel_rect::PixelRect;

const FULL_DISC_BLUR: usize = 5;
const RING_BLUR: usize = 7;
const OUTLINE_WIDTH: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStyle {
    /// The whole iris plus the expansion margin.
    FullDisc,
    /// Iris edge only; the inner `protect_ratio` of the radius keeps its
    /// texture.
    Ring { protect_ratio: f64 },
    /// A thin hard circle at the lens rim, for pixel-level inpainting.
    Outline,
}

/// Builds the repaint mask for every present eye, 255 = repaint.
pub fn build_mask(detection: &DetectionResult, style: MaskStyle, expand: i32) -> GrayImage {
    let (w, h) = detection.image_size;
    let bounds = PixelRect::image(w, h);
    let mut combined = Mask::zeros(bounds);

    for (_, eye) in detection.eyes() {
        let center = eye.center_px();
        let radius = eye.radius_px();
        let outer = (radius + expand as f64) as i32;
        let eye_mask = match style {
            MaskStyle::FullDisc => Mask::disc(center, outer, &bounds),
            MaskStyle::Ring { protect_ratio } => {
                let mut ring = Mask::disc(center, outer, &bounds);
                let inner = (radius * protect_ratio.clamp(0.0, 1.0)) as i32;
                ring.cut_out(&Mask::disc(center, inner, &bounds));
                ring
            }
            MaskStyle::Outline => {
                let half = OUTLINE_WIDTH / 2;
                let mut ring = Mask::disc(center, outer + half, &bounds);
                ring.cut_out(&Mask::disc(center, outer - half - 1, &bounds));
                ring
            }
        };
        combined.max_with(&eye_mask);
    }

    let combined = match style {
        MaskStyle::FullDisc => combined.blurred(FULL_DISC_BLUR),
        MaskStyle::Ring { .. } => combined.blurred(RING_BLUR),
        MaskStyle::Outline => combined,
    };
    combined.to_gray_image(w, h)
}
