//! sRGB ⇄ CIE L*a*b* conversions used for lightness tests and chroma blending.

use palette::{FromColor, IsWithinBounds, Lab, Srgb};

/// Bisection steps when pulling an out-of-gamut chroma shift back in.
const GAMUT_SEARCH_STEPS: usize = 20;

pub fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    let srgb: Srgb<f32> = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format();
    Lab::from_color(srgb)
}

/// Converts back to 8-bit sRGB, clamping out-of-gamut colors.
pub fn lab_to_rgb(lab: Lab) -> [u8; 3] {
    let srgb: Srgb<u8> = Srgb::<f32>::from_color(lab).into_format();
    [srgb.red, srgb.green, srgb.blue]
}

/// Moves `base`'s a*/b* toward `(a, b)` by `weight`, holding L* fixed.
///
/// When the full shift leaves the sRGB gamut, the largest in-gamut fraction
/// of it is used, so quantizing never has to clamp lightness away.
pub fn shift_chroma(base: Lab, a: f32, b: f32, weight: f32) -> Lab {
    let toward = |t: f32| {
        Lab::new(
            base.l,
            base.a + (a - base.a) * weight * t,
            base.b + (b - base.b) * weight * t,
        )
    };
    let in_gamut = |lab: Lab| Srgb::<f32>::from_color(lab).is_within_bounds();

    let full = toward(1.0);
    if in_gamut(full) {
        return full;
    }
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..GAMUT_SEARCH_STEPS {
        let mid = 0.5 * (lo + hi);
        if in_gamut(toward(mid)) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    toward(lo)
}

/// Perceptual lightness on the 8-bit scale (L* · 255 / 100), the range
/// highlight thresholds are expressed in.
pub fn lightness_u8(rgb: [u8; 3]) -> f32 {
    rgb_to_lab(rgb).l * 255.0 / 100.0
}
