use image::GrayImage;

use crate::refinement::domain::edge_refiner::{EdgeRefiner, RefineError};
use crate::shared::constants::LOCAL_INPAINT_RADIUS;
use crate::shared::frame::Frame;

/// Offline inpainting: fills masked pixels from the mask boundary inward.
///
/// Each pass fills the unknown pixels that touch a known one, using an
/// inverse-distance-weighted mean of the known pixels within `radius`. The
/// strength argument is ignored; masked pixels are always replaced.
pub struct LocalInpaintRefiner {
    radius: i32,
}

impl Default for LocalInpaintRefiner {
    fn default() -> Self {
        Self::new(LOCAL_INPAINT_RADIUS)
    }
}

impl LocalInpaintRefiner {
    pub fn new(radius: i32) -> Self {
        Self {
            radius: radius.max(1),
        }
    }

    fn fill_value(&self, out: &Frame, known: &[bool], x: i32, y: i32) -> Option<[u8; 3]> {
        let (w, h) = (out.width() as i32, out.height() as i32);
        let r = self.radius;
        let mut sum = [0.0f64; 3];
        let mut weight = 0.0f64;
        for dy in -r..=r {
            for dx in -r..=r {
                let (nx, ny) = (x + dx, y + dy);
                if (dx == 0 && dy == 0) || nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                if d > r as f64 || !known[(ny * w + nx) as usize] {
                    continue;
                }
                let wgt = 1.0 / d;
                let px = out.rgb(nx as u32, ny as u32);
                for c in 0..3 {
                    sum[c] += px[c] as f64 * wgt;
                }
                weight += wgt;
            }
        }
        (weight > 0.0).then(|| sum.map(|s| (s / weight).round().clamp(0.0, 255.0) as u8))
    }
}

impl EdgeRefiner for LocalInpaintRefiner {
    fn name(&self) -> &str {
        "local-inpaint"
    }

    fn refine(&self, image: &Frame, mask: &GrayImage, _strength: f64) -> Result<Frame, RefineError> {
        if mask.dimensions() != image.size() {
            return Err(RefineError::InvalidResponse(format!(
                "mask is {}x{}, image is {}x{}",
                mask.width(),
                mask.height(),
                image.width(),
                image.height()
            )));
        }
        let mut out = image.to_rgb();
        let (w, h) = (out.width() as i32, out.height() as i32);
        let mut known: Vec<bool> = mask.pixels().map(|p| p.0[0] == 0).collect();
        let mut remaining = known.iter().filter(|k| !**k).count();

        while remaining > 0 {
            let mut layer = Vec::new();
            for y in 0..h {
                for x in 0..w {
                    if known[(y * w + x) as usize] || !touches_known(&known, w, h, x, y) {
                        continue;
                    }
                    if let Some(v) = self.fill_value(&out, &known, x, y) {
                        layer.push((x, y, v));
                    }
                }
            }
            if layer.is_empty() {
                // Nothing known to grow from: the whole image is masked.
                break;
            }
            for (x, y, v) in layer {
                out.set_rgb(x as u32, y as u32, v);
                known[(y * w + x) as usize] = true;
                remaining -= 1;
            }
        }
        Ok(out)
    }
}

fn touches_known(known: &[bool], w: i32, h: i32, x: i32, y: i32) -> bool {
    for dy in -1..=1 {
        for dx in -1..=1 {
            let (nx, ny) = (x + dx, y + dy);
            if (dx != 0 || dy != 0) && nx >= 0 && ny >= 0 && nx < w && ny < h && known[(ny * w + nx) as usize] {
                return true;
            }
        }
    }
    false
}
