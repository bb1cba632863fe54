use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Decodes image files with the `image` crate.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let img = image::open(path)?;
        let frame = if img.color().has_alpha() {
            Frame::from_rgba_image(img.to_rgba8())
        } else {
            Frame::from_rgb_image(img.to_rgb8())
        };
        log::debug!(
            "Read {} ({}x{}, {} channels)",
            path.display(),
            frame.width(),
            frame.height(),
            frame.channels()
        );
        Ok(frame)
    }
}
