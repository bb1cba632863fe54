//! Full-texture compositing: scale, warp, blend, restore highlights.

use image::imageops::{self, FilterType};

use super::highlight_extractor::HighlightExtractor;
use super::perspective_warper::PerspectiveWarper;
use crate::compositing::domain::compositing_params::CompositingParams;
use crate::compositing::domain::iris_compositor::{require_rgb, EyeOutcome, IrisCompositor, SkipReason};
use crate::detection::domain::eye_geometry::EyeGeometry;
use crate::lens::domain::lens_texture::LensTexture;
use crate::shared::constants::{COVERAGE_FACTOR, MIN_SCALED_SIZE};
use crate::shared::error::LensError;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::{PixelRect, Placement};

/// Blends a lens texture over the iris, centered on the eye.
pub struct TextureCompositor {
    texture: LensTexture,
    params: CompositingParams,
    warper: PerspectiveWarper,
}

impl TextureCompositor {
    pub fn new(texture: LensTexture, params: CompositingParams) -> Self {
        Self {
            texture,
            params,
            warper: PerspectiveWarper::default(),
        }
    }

    /// Size of the texture once its intrinsic radius is fitted to the eye.
    pub fn scaled_size(&self, eye: &EyeGeometry) -> (u32, u32) {
        let scale = COVERAGE_FACTOR * eye.radius_px() / self.texture.radius_px();
        let dim = |v: u32| {
            let s = v as f64 * scale;
            if s.is_finite() && s > 0.0 {
                s.min(u32::MAX as f64) as u32
            } else {
                0
            }
        };
        (dim(self.texture.width()), dim(self.texture.height()))
    }
}

impl IrisCompositor for TextureCompositor {
    fn apply(&self, frame: &mut Frame, eye: &EyeGeometry) -> Result<EyeOutcome, LensError> {
        require_rgb(frame)?;
        let opacity = self.params.opacity.clamp(0.0, 1.0) as f32;
        if opacity <= 0.0 {
            return Ok(EyeOutcome::Skipped(SkipReason::ZeroOpacity));
        }

        let (new_w, new_h) = self.scaled_size(eye);
        if new_w < MIN_SCALED_SIZE || new_h < MIN_SCALED_SIZE {
            return Ok(EyeOutcome::Skipped(SkipReason::TooSmall));
        }

        let (tex_cx, tex_cy) = self.texture.center_px();
        let anchor = (
            (tex_cx as f64 * new_w as f64 / self.texture.width() as f64) as i32,
            (tex_cy as f64 * new_h as f64 / self.texture.height() as f64) as i32,
        );
        let bounds = PixelRect::image(frame.width(), frame.height());
        let Some(placement) = Placement::anchored(new_w, new_h, anchor, eye.center_px(), &bounds)
        else {
            return Ok(EyeOutcome::Skipped(SkipReason::OutOfFrame));
        };

        let scaled = imageops::resize(self.texture.pixels(), new_w, new_h, FilterType::Triangle);
        let lens = self.warper.warp(&scaled, &eye.euler_angles());

        let highlights = self
            .params
            .preserve_highlights
            .then(|| HighlightExtractor::new(self.params.highlight_threshold).extract(frame, eye));

        let mode = self.params.blend_mode;
        let target = placement.target;
        for y in target.y..target.bottom() {
            for x in target.x..target.right() {
                let sx = (placement.source_x + x - target.x) as u32;
                let sy = (placement.source_y + y - target.y) as u32;
                let [lr, lg, lb, la] = lens.get_pixel(sx, sy).0;
                let alpha = la as f32 / 255.0 * opacity;
                if alpha <= 0.0 {
                    continue;
                }
                let hl = highlights.as_ref().map_or(0.0, |m| m.get(x, y));

                let base = frame.rgb(x as u32, y as u32);
                let over = [lr, lg, lb];
                let mut out = [0u8; 3];
                for c in 0..3 {
                    let b = base[c] as f32 / 255.0;
                    let o = over[c] as f32 / 255.0;
                    let blended = alpha * mode.apply(b, o) + (1.0 - alpha) * b;
                    let v = hl * b + (1.0 - hl) * blended;
                    out[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
                }
                frame.set_rgb(x as u32, y as u32, out);
            }
        }
        Ok(EyeOutcome::Applied)
    }
}
