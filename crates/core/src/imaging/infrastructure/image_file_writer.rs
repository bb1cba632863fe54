use std::path::Path;

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Encodes frames with the `image` crate, creating the parent directory.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (w, h) = frame.size();
        match frame.channels() {
            3 => image::RgbImage::from_raw(w, h, frame.data().to_vec())
                .ok_or("Failed to create image from frame data")?
                .save(path)?,
            4 => image::RgbaImage::from_raw(w, h, frame.data().to_vec())
                .ok_or("Failed to create image from frame data")?
                .save(path)?,
            n => return Err(format!("cannot write a {n}-channel frame").into()),
        }
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}
