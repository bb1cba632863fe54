//! Perspective warp of a lens texture toward the gaze direction.
//!
//! Approximates corneal parallax by pulling the texture's corners into a
//! trapezoid, then resampling through the inverse homography. The output has
//! the input's size; samples falling outside the source are transparent.

use image::{Rgba, RgbaImage};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use crate::detection::domain::orientation::EulerAngles;
use crate::shared::constants::{MAX_WARP_ANGLE, WARP_FACTOR};

#[derive(Clone, Copy, Debug)]
pub struct PerspectiveWarper {
    max_angle: f64,
    factor: f64,
}

impl Default for PerspectiveWarper {
    fn default() -> Self {
        Self::new(MAX_WARP_ANGLE, WARP_FACTOR)
    }
}

impl PerspectiveWarper {
    pub fn new(max_angle: f64, factor: f64) -> Self {
        Self { max_angle, factor }
    }

    /// Destination corners (TL, TR, BR, BL) for a `width x height` texture.
    pub fn destination_corners(&self, width: u32, height: u32, angles: &EulerAngles) -> [[f64; 2]; 4] {
        let pitch = angles.pitch.clamp(-self.max_angle, self.max_angle);
        let yaw = angles.yaw.clamp(-self.max_angle, self.max_angle);
        let (w, h) = (width as f64, height as f64);
        let ox = w * self.factor * yaw.sin();
        let oy = h * self.factor * pitch.sin();
        [
            [ox, oy],
            [w - 1.0 - ox, -oy],
            [w - 1.0 + ox, h - 1.0 + oy],
            [-ox, h - 1.0 - oy],
        ]
    }

    pub fn warp(&self, texture: &RgbaImage, angles: &EulerAngles) -> RgbaImage {
        let (w, h) = texture.dimensions();
        let pitch = angles.pitch.clamp(-self.max_angle, self.max_angle);
        let yaw = angles.yaw.clamp(-self.max_angle, self.max_angle);
        if (pitch == 0.0 && yaw == 0.0) || w < 2 || h < 2 {
            return texture.clone();
        }

        let (wf, hf) = (w as f64, h as f64);
        let src = [[0.0, 0.0], [wf - 1.0, 0.0], [wf - 1.0, hf - 1.0], [0.0, hf - 1.0]];
        let dst = self.destination_corners(w, h, angles);

        let Some(inverse) = homography_from_quads(&src, &dst).and_then(|m| m.try_inverse()) else {
            log::debug!("perspective transform is singular, using texture unwarped");
            return texture.clone();
        };

        RgbaImage::from_fn(w, h, |x, y| {
            let p = inverse * Vector3::new(x as f64, y as f64, 1.0);
            if p.z.abs() < 1e-12 {
                return Rgba([0, 0, 0, 0]);
            }
            sample_bilinear(texture, p.x / p.z, p.y / p.z)
        })
    }
}

/// Exact homography mapping four `src` points onto four `dst` points, with
/// `h33 = 1`. `None` when the correspondence is degenerate.
pub fn homography_from_quads(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Option<Matrix3<f64>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for i in 0..4 {
        let [x, y] = src[i];
        let [u, v] = dst[i];
        let r = 2 * i;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -u * x;
        a[(r, 7)] = -u * y;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -v * x;
        a[(r + 1, 7)] = -v * y;
        b[r + 1] = v;
    }
    let h = a.lu().solve(&b)?;
    if h.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0))
}

/// Bilinear sample where taps outside the image read as transparent black.
fn sample_bilinear(img: &RgbaImage, sx: f64, sy: f64) -> Rgba<u8> {
    let (w, h) = (img.width() as i64, img.height() as i64);
    if !sx.is_finite() || !sy.is_finite() || sx <= -1.0 || sy <= -1.0 || sx >= w as f64 || sy >= h as f64 {
        return Rgba([0, 0, 0, 0]);
    }
    let x0 = sx.floor() as i64;
    let y0 = sy.floor() as i64;
    let fx = sx - x0 as f64;
    let fy = sy - y0 as f64;

    let tap = |x: i64, y: i64| -> [f64; 4] {
        if x < 0 || y < 0 || x >= w || y >= h {
            return [0.0; 4];
        }
        img.get_pixel(x as u32, y as u32).0.map(f64::from)
    };
    let (p00, p10, p01, p11) = (tap(x0, y0), tap(x0 + 1, y0), tap(x0, y0 + 1), tap(x0 + 1, y0 + 1));

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn angles(pitch: f64, yaw: f64) -> EulerAngles {
        EulerAngles { pitch, yaw, roll: 0.0 }
    }

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let v = if (x / 4 + y / 4) % 2 == 0 { 200 } else { 40 };
            Rgba([v, v, v, 255])
        })
    }

    fn project(m: &Matrix3<f64>, p: [f64; 2]) -> [f64; 2] {
        let v = m * Vector3::new(p[0], p[1], 1.0);
        [v.x / v.z, v.y / v.z]
    }

    // ── Homography ───────────────────────────────────────────────────

    #[test]
    fn test_homography_maps_corners() {
        let src = [[0.0, 0.0], [39.0, 0.0], [39.0, 29.0], [0.0, 29.0]];
        let dst = [[3.0, 1.5], [36.0, -1.5], [42.0, 30.5], [-3.0, 27.5]];
        let m = homography_from_quads(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            let p = project(&m, *s);
            assert_relative_eq!(p[0], d[0], epsilon = 1e-9);
            assert_relative_eq!(p[1], d[1], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_homography_identity() {
        let q = [[0.0, 0.0], [9.0, 0.0], [9.0, 9.0], [0.0, 9.0]];
        let m = homography_from_quads(&q, &q).unwrap();
        assert_relative_eq!(m, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_homography_degenerate_is_none() {
        let src = [[0.0, 0.0], [9.0, 0.0], [9.0, 9.0], [0.0, 9.0]];
        let dst = [[1.0, 1.0]; 4];
        assert!(homography_from_quads(&src, &dst).map_or(true, |m| m.try_inverse().is_none()));
    }

    // ── Corners ──────────────────────────────────────────────────────

    #[test]
    fn test_corner_offsets_follow_yaw() {
        let warper = PerspectiveWarper::default();
        let c = warper.destination_corners(100, 80, &angles(0.0, 0.2));
        let ox = 100.0 * 0.15 * 0.2f64.sin();
        assert_relative_eq!(c[0][0], ox);
        assert_relative_eq!(c[1][0], 99.0 - ox);
        assert_relative_eq!(c[2][0], 99.0 + ox);
        assert_relative_eq!(c[3][0], -ox);
        assert_eq!(c[0][1], 0.0);
    }

    #[test]
    fn test_angles_clipped() {
        let warper = PerspectiveWarper::default();
        let wide = warper.destination_corners(100, 100, &angles(1.5, -1.5));
        let capped = warper.destination_corners(100, 100, &angles(0.4, -0.4));
        assert_eq!(wide, capped);
    }

    // ── Warp ─────────────────────────────────────────────────────────

    #[test]
    fn test_zero_angles_is_identity() {
        let tex = checker(30, 20);
        assert_eq!(PerspectiveWarper::default().warp(&tex, &angles(0.0, 0.0)), tex);
    }

    #[rstest]
    #[case(0.3, 0.0)]
    #[case(0.0, -0.3)]
    #[case(0.25, 0.35)]
    fn test_warp_keeps_size(#[case] pitch: f64, #[case] yaw: f64) {
        let tex = checker(40, 30);
        let out = PerspectiveWarper::default().warp(&tex, &angles(pitch, yaw));
        assert_eq!(out.dimensions(), tex.dimensions());
    }

    #[test]
    fn test_warp_uncovered_corner_is_transparent() {
        // Positive yaw pulls the top-left corner inward: (0, 0) is off the quad.
        let tex = RgbaImage::from_pixel(60, 60, Rgba([10, 20, 200, 255]));
        let out = PerspectiveWarper::default().warp(&tex, &angles(0.0, 0.4));
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_warp_center_stays_opaque_color() {
        let tex = RgbaImage::from_pixel(60, 60, Rgba([10, 20, 200, 255]));
        let out = PerspectiveWarper::default().warp(&tex, &angles(0.2, -0.3));
        assert_eq!(out.get_pixel(30, 30).0, [10, 20, 200, 255]);
    }

    #[test]
    fn test_sample_bilinear_midpoint() {
        let img = RgbaImage::from_fn(2, 1, |x, _| if x == 0 { Rgba([0, 0, 0, 255]) } else { Rgba([100, 100, 100, 255]) });
        assert_eq!(sample_bilinear(&img, 0.5, 0.0).0, [50, 50, 50, 255]);
        assert_eq!(sample_bilinear(&img, 5.0, 0.0).0, [0, 0, 0, 0]);
    }
}
