use crate::detection::domain::eye_geometry::EyeGeometry;
use crate::shared::color::lightness_u8;
use crate::shared::constants::{HIGHLIGHT_BLUR_KERNEL, HIGHLIGHT_REGION_FACTOR};
use crate::shared::frame::Frame;
use crate::shared::mask::Mask;
use crate::shared::pixel_rect::PixelRect;

/// Finds specular catch-lights around an iris.
#[derive(Clone, Copy, Debug)]
pub struct HighlightExtractor {
    threshold: u8,
}

impl HighlightExtractor {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Soft mask of pixels brighter than the threshold within
    /// `1.3 * radius` of the eye center.
    ///
    /// The detected pixels are grown by one pixel and blurred, but keep full
    /// weight themselves so they are restored exactly.
    pub fn extract(&self, frame: &Frame, eye: &EyeGeometry) -> Mask {
        let (cx, cy) = eye.center_px();
        let reach = (eye.radius_px() * HIGHLIGHT_REGION_FACTOR) as i32;
        let pad = 1 + HIGHLIGHT_BLUR_KERNEL as i32 / 2;
        let bounds = PixelRect::image(frame.width(), frame.height());
        let Some(rect) = PixelRect::around_circle(cx, cy, reach, pad).intersect(&bounds) else {
            return Mask::zeros(PixelRect::new(0, 0, 0, 0));
        };

        let region = Mask::disc((cx, cy), reach, &bounds);
        let mut hard = Mask::zeros(rect);
        let mut count = 0usize;
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if region.get(x, y) > 0.0
                    && lightness_u8(frame.rgb(x as u32, y as u32)) > self.threshold as f32
                {
                    hard.set(x, y, 1.0);
                    count += 1;
                }
            }
        }
        if count == 0 {
            return hard;
        }
        log::debug!("{count} highlight pixels near {:?}", eye.center_px());

        let mut soft = hard.dilated().blurred(HIGHLIGHT_BLUR_KERNEL);
        soft.max_with(&hard);
        soft
    }
}
