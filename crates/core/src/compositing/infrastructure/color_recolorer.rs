use palette::Lab;

use crate::compositing::domain::compositing_params::RecolorParams;
use crate::compositing::domain::iris_compositor::{require_rgb, EyeOutcome, IrisCompositor, SkipReason};
use crate::detection::domain::eye_geometry::EyeGeometry;
use crate::shared::color::{lab_to_rgb, rgb_to_lab, shift_chroma};
use crate::shared::error::LensError;
use crate::shared::frame::Frame;
use crate::shared::mask::Mask;
use crate::shared::pixel_rect::PixelRect;

/// Shifts the iris's chroma toward a target color, keeping its lightness.
///
/// No texture is involved, so no seams or scaling artifacts appear; the
/// original iris detail shows through unchanged.
pub struct ColorRecolorer {
    target_lab: Lab,
    params: RecolorParams,
}

impl ColorRecolorer {
    pub fn new(target: [u8; 3], params: RecolorParams) -> Self {
        Self {
            target_lab: rgb_to_lab(target),
            params,
        }
    }

    /// Blend weights around the eye: opaque inside `R - feather`, fading to
    /// zero at `R + feather` where `R = radius * expansion`, scaled by
    /// intensity.
    pub fn mask(&self, eye: &EyeGeometry, image_size: (u32, u32)) -> Mask {
        let (cx, cy) = eye.center_px();
        let r = eye.radius_px() * self.params.expansion;
        let feather = self.params.feather.max(0.0);
        let mut mask = Mask::radial(
            (cx as f64, cy as f64),
            r - feather,
            r + feather,
            &PixelRect::image(image_size.0, image_size.1),
        );
        mask.scale(self.params.intensity as f32);
        mask
    }
}

impl IrisCompositor for ColorRecolorer {
    fn apply(&self, frame: &mut Frame, eye: &EyeGeometry) -> Result<EyeOutcome, LensError> {
        require_rgb(frame)?;
        let mask = self.mask(eye, frame.size());
        if mask.is_empty() {
            return Ok(EyeOutcome::Skipped(SkipReason::EmptyMask));
        }

        let rect = mask.rect();
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let w = mask.get(x, y);
                if w <= 0.0 {
                    continue;
                }
                let (px, py) = (x as u32, y as u32);
                let base = rgb_to_lab(frame.rgb(px, py));
                let lab = shift_chroma(base, self.target_lab.a, self.target_lab.b, w);
                frame.set_rgb(px, py, lab_to_rgb(lab));
            }
        }
        Ok(EyeOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn eye(x: f64, y: f64, r: f64) -> EyeGeometry {
        EyeGeometry::frontal((x, y), r, (120, 120)).unwrap()
    }

    fn params(intensity: f64) -> RecolorParams {
        RecolorParams {
            intensity,
            feather: 6.0,
            expansion: 1.0,
        }
    }

    fn iris_frame() -> Frame {
        let img = image::RgbImage::from_fn(120, 120, |x, y| {
            image::Rgb([90 + (x % 30) as u8, 70 + (y % 20) as u8, 50])
        });
        Frame::from_rgb_image(img)
    }

    #[test]
    fn test_lightness_preserved() {
        let original = iris_frame();
        let mut frame = original.clone();
        let recolorer = ColorRecolorer::new([60, 110, 170], params(0.6));
        recolorer.apply(&mut frame, &eye(60.0, 60.0, 20.0)).unwrap();
        for y in (30..90).step_by(3) {
            for x in (30..90).step_by(3) {
                let before = rgb_to_lab(original.rgb(x, y)).l;
                let after = rgb_to_lab(frame.rgb(x, y)).l;
                assert_relative_eq!(before, after, epsilon = 1.0);
            }
        }
    }

    #[rstest]
    #[case::bright_gray_to_blue([240, 240, 240], [0, 0, 255])]
    #[case::bright_gray_to_red([240, 240, 240], [255, 0, 0])]
    #[case::yellow_to_blue([200, 190, 60], [0, 0, 255])]
    #[case::white_to_green([255, 255, 255], [0, 200, 0])]
    #[case::dark_to_yellow([30, 30, 30], [255, 255, 0])]
    fn test_lightness_preserved_for_saturated_targets(#[case] base: [u8; 3], #[case] target: [u8; 3]) {
        let original = Frame::filled(60, 60, base);
        let eye = EyeGeometry::frontal((30.0, 30.0), 10.0, (60, 60)).unwrap();
        for intensity in [1.0, 0.45] {
            let mut frame = original.clone();
            ColorRecolorer::new(target, params(intensity))
                .apply(&mut frame, &eye)
                .unwrap();
            for (x, y) in [(30, 30), (36, 30), (30, 41)] {
                let before = rgb_to_lab(original.rgb(x, y)).l;
                let after = rgb_to_lab(frame.rgb(x, y)).l;
                assert_relative_eq!(before, after, epsilon = 1.0);
            }
        }
    }

    #[test]
    fn test_chroma_moves_toward_target() {
        let original = iris_frame();
        let mut frame = original.clone();
        let target = [60, 110, 170];
        ColorRecolorer::new(target, params(0.6))
            .apply(&mut frame, &eye(60.0, 60.0, 20.0))
            .unwrap();
        let t = rgb_to_lab(target);
        let before = rgb_to_lab(original.rgb(60, 60));
        let after = rgb_to_lab(frame.rgb(60, 60));
        assert!((after.b - t.b).abs() < (before.b - t.b).abs());
        assert!((after.a - t.a).abs() < (before.a - t.a).abs());
    }

    #[test]
    fn test_pixels_outside_mask_untouched() {
        let original = iris_frame();
        let mut frame = original.clone();
        ColorRecolorer::new([60, 110, 170], params(1.0))
            .apply(&mut frame, &eye(60.0, 60.0, 20.0))
            .unwrap();
        // Support ends at r + feather = 26.
        for (x, y) in [(60, 60 + 27), (60 + 30, 60), (0, 0), (119, 119)] {
            assert_eq!(frame.rgb(x, y), original.rgb(x, y));
        }
    }

    #[test]
    fn test_zero_intensity_skips() {
        let original = iris_frame();
        let mut frame = original.clone();
        let outcome = ColorRecolorer::new([60, 110, 170], params(0.0))
            .apply(&mut frame, &eye(60.0, 60.0, 20.0))
            .unwrap();
        assert_eq!(outcome, EyeOutcome::Skipped(SkipReason::EmptyMask));
        assert_eq!(frame, original);
    }

    #[test]
    fn test_eye_off_image_skips() {
        let mut frame = iris_frame();
        let far = EyeGeometry::frontal((-500.0, -500.0), 10.0, (120, 120)).unwrap();
        let outcome = ColorRecolorer::new([60, 110, 170], params(0.5))
            .apply(&mut frame, &far)
            .unwrap();
        assert_eq!(outcome, EyeOutcome::Skipped(SkipReason::EmptyMask));
    }

    #[test]
    fn test_mask_profile() {
        let recolorer = ColorRecolorer::new([0, 0, 0], params(0.5));
        let mask = recolorer.mask(&eye(60.0, 60.0, 20.0), (120, 120));
        assert_relative_eq!(mask.get(60, 60), 0.5);
        assert_relative_eq!(mask.get(60 + 20, 60), 0.25, epsilon = 1e-6);
        assert_eq!(mask.get(60 + 26, 60), 0.0);
    }
}
