//! Single-channel `[0, 1]` weight fields over a bounded pixel rectangle.
//!
//! Masks are ephemeral: built per call, read by the compositors, then dropped.
//! Lookups outside the rectangle read as zero, so callers never clip.

use ndarray::Array2;

use super::gaussian;
use super::pixel_rect::PixelRect;

#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    rect: PixelRect,
    /// Indexed `[row, col]` relative to `rect`'s top-left.
    values: Array2<f32>,
}

impl Mask {
    pub fn zeros(rect: PixelRect) -> Self {
        let h = rect.height.max(0) as usize;
        let w = rect.width.max(0) as usize;
        Self {
            rect,
            values: Array2::zeros((h, w)),
        }
    }

    /// Hard filled disc: 1 where `dx² + dy² <= radius²`, else 0.
    pub fn disc(center: (i32, i32), radius: i32, bounds: &PixelRect) -> Self {
        let rect = PixelRect::around_circle(center.0, center.1, radius, 0)
            .intersect(bounds)
            .unwrap_or(PixelRect::new(bounds.x, bounds.y, 0, 0));
        let mut mask = Self::zeros(rect);
        if radius < 0 {
            return mask;
        }
        let r_sq = (radius as i64) * (radius as i64);
        mask.fill_with(|x, y| {
            let dx = (x - center.0) as i64;
            let dy = (y - center.1) as i64;
            if dx * dx + dy * dy <= r_sq {
                1.0
            } else {
                0.0
            }
        });
        mask
    }

    /// Radial ramp: 1 within `inner` of `center`, falling linearly to 0 at
    /// `outer`, 0 beyond.
    pub fn radial(center: (f64, f64), inner: f64, outer: f64, bounds: &PixelRect) -> Self {
        let reach = outer.max(inner).max(0.0).ceil() as i32;
        let rect = PixelRect::around_circle(
            center.0.round() as i32,
            center.1.round() as i32,
            reach,
            1,
        )
        .intersect(bounds)
        .unwrap_or(PixelRect::new(bounds.x, bounds.y, 0, 0));
        let mut mask = Self::zeros(rect);
        let band = outer - inner;
        mask.fill_with(|x, y| {
            let dist = ((x as f64 - center.0).powi(2) + (y as f64 - center.1).powi(2)).sqrt();
            if dist < inner {
                1.0
            } else if dist < outer && band > 0.0 {
                (1.0 - (dist - inner) / band) as f32
            } else {
                0.0
            }
        });
        mask
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Weight at image coordinate `(x, y)`; zero outside the mask's rectangle.
    pub fn get(&self, x: i32, y: i32) -> f32 {
        if !self.rect.contains(x, y) {
            return 0.0;
        }
        self.values[[(y - self.rect.y) as usize, (x - self.rect.x) as usize]]
    }

    pub fn set(&mut self, x: i32, y: i32, value: f32) {
        if self.rect.contains(x, y) {
            self.values[[(y - self.rect.y) as usize, (x - self.rect.x) as usize]] =
                value.clamp(0.0, 1.0);
        }
    }

    /// True when the mask has no area or carries no weight anywhere.
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty() || self.values.iter().all(|&v| v <= 0.0)
    }

    pub fn scale(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        self.values.mapv_inplace(|v| v * factor);
    }

    /// Zeroes every pixel covered by `other` with weight 1.
    pub fn cut_out(&mut self, other: &Mask) {
        let rect = self.rect;
        for row in 0..rect.height.max(0) {
            for col in 0..rect.width.max(0) {
                let w = other.get(rect.x + col, rect.y + row);
                if w > 0.0 {
                    let v = &mut self.values[[row as usize, col as usize]];
                    *v *= 1.0 - w;
                }
            }
        }
    }

    /// Pointwise maximum with `other`, over this mask's rectangle.
    pub fn max_with(&mut self, other: &Mask) {
        let rect = self.rect;
        for row in 0..rect.height.max(0) {
            for col in 0..rect.width.max(0) {
                let w = other.get(rect.x + col, rect.y + row);
                let v = &mut self.values[[row as usize, col as usize]];
                *v = v.max(w);
            }
        }
    }

    pub fn dilated(&self) -> Mask {
        Mask {
            rect: self.rect,
            values: gaussian::dilate_field(&self.values),
        }
    }

    pub fn blurred(&self, kernel_size: usize) -> Mask {
        Mask {
            rect: self.rect,
            values: gaussian::blur_field(&self.values, kernel_size),
        }
    }

    /// Exports the mask as an 8-bit image covering `width x height` pixels
    /// from the image origin (255 = full weight).
    pub fn to_gray_image(&self, width: u32, height: u32) -> image::GrayImage {
        image::GrayImage::from_fn(width, height, |x, y| {
            let v = self.get(x as i32, y as i32);
            image::Luma([(v * 255.0).round().clamp(0.0, 255.0) as u8])
        })
    }

    fn fill_with(&mut self, f: impl Fn(i32, i32) -> f32) {
        let rect = self.rect;
        for row in 0..rect.height.max(0) {
            for col in 0..rect.width.max(0) {
                self.values[[row as usize, col as usize]] = f(rect.x + col, rect.y + row);
            }
        }
    }
}
