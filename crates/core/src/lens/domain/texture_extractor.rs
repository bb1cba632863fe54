use image::RgbaImage;

use super::lens_texture::feathered_disc_alpha;
use crate::shared::constants::EXTRACT_MIN_FEATHER;
use crate::shared::error::LensError;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

/// Cuts a lens texture out of an eye photo.
///
/// Takes the square of side `2 * radius` around `center` (clipped to the
/// image) and gives it a feathered circular alpha inscribed in the crop.
pub fn extract_lens(frame: &Frame, center: (i32, i32), radius: i32) -> Result<RgbaImage, LensError> {
    if radius <= 0 {
        return Err(LensError::DegenerateGeometry(format!(
            "extraction radius {radius} is not positive"
        )));
    }
    let (cx, cy) = center;
    let crop = PixelRect::new(cx - radius, cy - radius, 2 * radius, 2 * radius)
        .intersect(&PixelRect::image(frame.width(), frame.height()))
        .ok_or_else(|| {
            LensError::DegenerateGeometry(format!("eye at {center:?} is outside the image"))
        })?;

    let (cw, ch) = (crop.width as u32, crop.height as u32);
    let short = cw.min(ch);
    let outer = (short / 2) as f64;
    let band = EXTRACT_MIN_FEATHER.max(short / 20) as f64;
    let (dx, dy) = ((cw / 2) as f64, (ch / 2) as f64);

    Ok(RgbaImage::from_fn(cw, ch, |x, y| {
        let [r, g, b] = frame.rgb(crop.x as u32 + x, crop.y as u32 + y);
        let d = ((x as f64 - dx).powi(2) + (y as f64 - dy).powi(2)).sqrt();
        image::Rgba([r, g, b, feathered_disc_alpha(d, outer, band)])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> Frame {
        let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb([x as u8, y as u8, 77]));
        Frame::from_rgb_image(img)
    }

    #[test]
    fn test_crop_is_square_around_center() {
        let out = extract_lens(&gradient(200, 150), (100, 75), 40).unwrap();
        assert_eq!(out.dimensions(), (80, 80));
        // Top-left of the crop maps to (60, 35) in the source.
        assert_eq!(&out.get_pixel(0, 0).0[..3], &[60, 35, 77]);
    }

    #[test]
    fn test_alpha_opaque_center_transparent_corners() {
        let out = extract_lens(&gradient(200, 200), (100, 100), 50).unwrap();
        assert_eq!(out.get_pixel(50, 50).0[3], 255);
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(99, 99).0[3], 0);
        // Inside the fade band: partially transparent.
        let a = out.get_pixel(50 + 45, 50).0[3];
        assert!(a > 0 && a < 255);
    }

    #[test]
    fn test_crop_clipped_at_image_edge() {
        let out = extract_lens(&gradient(100, 100), (10, 50), 30).unwrap();
        assert_eq!(out.dimensions(), (40, 60));
        assert_eq!(&out.get_pixel(0, 0).0[..3], &[0, 20, 77]);
    }

    #[test]
    fn test_zero_radius_is_degenerate() {
        assert!(matches!(
            extract_lens(&gradient(10, 10), (5, 5), 0),
            Err(LensError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_center_outside_image_is_degenerate() {
        assert!(extract_lens(&gradient(10, 10), (-50, -50), 5).is_err());
    }
}
