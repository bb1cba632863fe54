//! Lens material prepared for compositing.
//!
//! A texture always carries an alpha channel (synthesized for RGB inputs) and
//! an intrinsic center and radius measured from its opaque pixels, so crops
//! with uneven margins still scale correctly onto the iris.

use image::RgbaImage;

use crate::shared::constants::{
    OPAQUE_ALPHA_THRESHOLD, RADIUS_FALLBACK_FACTOR, RADIUS_PERCENTILE, SYNTH_ALPHA_FEATHER,
    SYNTH_ALPHA_MARGIN,
};
use crate::shared::error::LensError;
use crate::shared::frame::Frame;

#[derive(Clone, Debug, PartialEq)]
pub struct LensTexture {
    pixels: RgbaImage,
    center_px: (i32, i32),
    radius_px: f64,
}

impl LensTexture {
    /// Builds a texture from a 3- or 4-channel frame.
    pub fn prepare(frame: &Frame) -> Result<Self, LensError> {
        let (w, h) = frame.size();
        if w == 0 || h == 0 {
            return Err(LensError::InvalidTexture("lens image is empty".into()));
        }
        let pixels = match frame.channels() {
            4 => RgbaImage::from_raw(w, h, frame.data().to_vec()),
            3 => {
                let alpha = synthesize_alpha(w, h);
                let data = frame
                    .data()
                    .chunks_exact(3)
                    .zip(alpha)
                    .flat_map(|(px, a)| [px[0], px[1], px[2], a])
                    .collect();
                RgbaImage::from_raw(w, h, data)
            }
            channels => return Err(LensError::UnsupportedFrame { channels }),
        }
        .ok_or_else(|| LensError::InvalidTexture("pixel buffer does not match size".into()))?;

        Ok(Self::from_rgba(pixels))
    }

    /// Wraps an RGBA buffer, measuring its intrinsic center and radius.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let (center_px, radius_px) = estimate_center_radius(&pixels);
        log::info!(
            "Lens texture {}x{}: center={center_px:?} radius={radius_px:.1}px",
            pixels.width(),
            pixels.height()
        );
        Self {
            pixels,
            center_px,
            radius_px,
        }
    }

    /// Wraps an RGBA buffer whose center and radius are already known.
    pub fn with_geometry(pixels: RgbaImage, center_px: (i32, i32), radius_px: f64) -> Self {
        Self {
            pixels,
            center_px,
            radius_px,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn center_px(&self) -> (i32, i32) {
        self.center_px
    }

    pub fn radius_px(&self) -> f64 {
        self.radius_px
    }
}

/// Alpha of a disc of radius `outer` whose rim fades linearly over `band`
/// pixels: 255 at `d <= outer - band`, 0 at `d >= outer`.
pub fn feathered_disc_alpha(distance: f64, outer: f64, band: f64) -> u8 {
    if distance >= outer {
        return 0;
    }
    let band = band.min(outer).max(0.0);
    if distance <= outer - band || band <= 0.0 {
        return 255;
    }
    (255.0 * (outer - distance) / band).round().clamp(0.0, 255.0) as u8
}

/// Alpha for an RGB texture: a disc centered on the image, `margin` pixels
/// inside the shorter edge, feathered over the outer band.
pub fn synthesize_alpha(width: u32, height: u32) -> Vec<u8> {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let outer = width.min(height) as f64 / 2.0 - SYNTH_ALPHA_MARGIN;
    let mut alpha = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            alpha.push(feathered_disc_alpha(d, outer, SYNTH_ALPHA_FEATHER));
        }
    }
    alpha
}

/// Centroid of the opaque pixels and the 95th-percentile distance from it.
///
/// Falls back to the geometric center and `0.9 * min(w, h) / 2` when no pixel
/// is opaque.
pub fn estimate_center_radius(pixels: &RgbaImage) -> ((i32, i32), f64) {
    let opaque: Vec<(f64, f64)> = pixels
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[3] > OPAQUE_ALPHA_THRESHOLD)
        .map(|(x, y, _)| (x as f64, y as f64))
        .collect();

    if opaque.is_empty() {
        let (w, h) = pixels.dimensions();
        let radius = w.min(h) as f64 / 2.0 * RADIUS_FALLBACK_FACTOR;
        return (((w / 2) as i32, (h / 2) as i32), radius);
    }

    let n = opaque.len() as f64;
    let cx = opaque.iter().map(|p| p.0).sum::<f64>() / n;
    let cy = opaque.iter().map(|p| p.1).sum::<f64>() / n;

    let mut distances: Vec<f64> = opaque
        .iter()
        .map(|&(x, y)| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt())
        .collect();
    distances.sort_by(f64::total_cmp);

    ((cx as i32, cy as i32), percentile(&distances, RADIUS_PERCENTILE))
}

/// Linear-interpolated percentile of an ascending slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn disc_rgba(size: u32, radius: f64) -> RgbaImage {
        let c = (size as f64 - 1.0) / 2.0;
        RgbaImage::from_fn(size, size, |x, y| {
            let d = ((x as f64 - c).powi(2) + (y as f64 - c).powi(2)).sqrt();
            let a = if d <= radius { 255 } else { 0 };
            image::Rgba([10, 20, 200, a])
        })
    }

    // ── Alpha synthesis ──────────────────────────────────────────────

    #[test]
    fn test_synthesized_alpha_inner_and_outer() {
        let (w, h) = (120, 100);
        let alpha = synthesize_alpha(w, h);
        let at = |x: u32, y: u32| alpha[(y * w + x) as usize];
        // outer = 50 - 5 = 45, inner = 25
        assert_eq!(at(60, 50), 255);
        assert_eq!(at(60 + 24, 50), 255);
        assert_eq!(at(60 + 46, 50), 0);
        assert_eq!(at(0, 0), 0);
    }

    #[rstest]
    #[case::horizontal(1, 0)]
    #[case::vertical(0, 1)]
    #[case::diagonal(1, 1)]
    fn test_synthesized_alpha_monotone_outward(#[case] sx: i32, #[case] sy: i32) {
        let size = 120u32;
        let alpha = synthesize_alpha(size, size);
        let mut prev = 255u8;
        for step in 0..60 {
            let x = 60 + sx * step;
            let y = 60 + sy * step;
            if x >= size as i32 || y >= size as i32 {
                break;
            }
            let a = alpha[(y as u32 * size + x as u32) as usize];
            assert!(a <= prev, "alpha rose from {prev} to {a} at step {step}");
            prev = a;
        }
        assert_eq!(prev, 0);
    }

    #[test]
    fn test_feathered_disc_alpha_ramp() {
        assert_eq!(feathered_disc_alpha(0.0, 45.0, 20.0), 255);
        assert_eq!(feathered_disc_alpha(25.0, 45.0, 20.0), 255);
        assert_eq!(feathered_disc_alpha(35.0, 45.0, 20.0), 128);
        assert_eq!(feathered_disc_alpha(45.0, 45.0, 20.0), 0);
        assert_eq!(feathered_disc_alpha(90.0, 45.0, 20.0), 0);
    }

    #[test]
    fn test_feathered_disc_alpha_band_wider_than_disc() {
        // Small textures: the band is clamped to the radius, center stays opaque.
        assert_eq!(feathered_disc_alpha(0.0, 10.0, 20.0), 255);
        assert_eq!(feathered_disc_alpha(5.0, 10.0, 20.0), 128);
    }

    // ── Prepare ──────────────────────────────────────────────────────

    #[test]
    fn test_prepare_rgb_synthesizes_alpha() {
        let frame = Frame::filled(100, 100, [10, 20, 200]);
        let tex = LensTexture::prepare(&frame).unwrap();
        assert_eq!(tex.pixels().get_pixel(50, 50).0, [10, 20, 200, 255]);
        assert_eq!(tex.pixels().get_pixel(0, 0).0[3], 0);
        assert_eq!(tex.center_px(), (50, 50));
        assert!(tex.radius_px() > 25.0 && tex.radius_px() < 45.0);
    }

    #[test]
    fn test_prepare_rgba_keeps_alpha() {
        let img = disc_rgba(41, 15.0);
        let frame = Frame::from_rgba_image(img.clone());
        let tex = LensTexture::prepare(&frame).unwrap();
        assert_eq!(tex.pixels(), &img);
    }

    #[test]
    fn test_prepare_rejects_gray() {
        let frame = Frame::new(vec![0; 16], 4, 4, 1);
        assert!(matches!(
            LensTexture::prepare(&frame),
            Err(LensError::UnsupportedFrame { channels: 1 })
        ));
    }

    #[test]
    fn test_prepare_rejects_empty() {
        let frame = Frame::new(Vec::new(), 0, 0, 3);
        assert!(matches!(
            LensTexture::prepare(&frame),
            Err(LensError::InvalidTexture(_))
        ));
    }

    // ── Radius / center ──────────────────────────────────────────────

    #[test]
    fn test_radius_of_disc_near_true_radius() {
        let ((cx, cy), r) = estimate_center_radius(&disc_rgba(101, 40.0));
        assert_eq!((cx, cy), (50, 50));
        // 95th percentile of a uniform disc: r * sqrt(0.95)
        assert_relative_eq!(r, 40.0 * 0.95f64.sqrt(), epsilon = 1.0);
    }

    #[test]
    fn test_radius_ignores_image_bounds() {
        // Off-center disc in a wide canvas: center follows the material.
        let img = RgbaImage::from_fn(200, 100, |x, y| {
            let d = ((x as f64 - 150.0).powi(2) + (y as f64 - 50.0).powi(2)).sqrt();
            image::Rgba([0, 0, 0, if d <= 20.0 { 255 } else { 0 }])
        });
        let ((cx, cy), r) = estimate_center_radius(&img);
        assert_eq!((cx, cy), (150, 50));
        assert!(r < 21.0 && r > 15.0);
    }

    #[test]
    fn test_radius_fallback_when_transparent() {
        let img = RgbaImage::from_pixel(80, 60, image::Rgba([1, 2, 3, 100]));
        let ((cx, cy), r) = estimate_center_radius(&img);
        assert_eq!((cx, cy), (40, 30));
        assert_relative_eq!(r, 27.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_relative_eq!(percentile(&v, 50.0), 20.0);
        assert_relative_eq!(percentile(&v, 95.0), 38.0, epsilon = 1e-9);
        assert_relative_eq!(percentile(&[7.0], 95.0), 7.0);
    }
}
