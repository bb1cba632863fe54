use std::path::Path;

use crate::detection::domain::eye_locator::EyeLocator;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::lens::domain::texture_extractor::extract_lens;
use crate::shared::constants::{EXTRACT_EXPAND_RATIO, EXTRACT_FALLBACK_RADIUS_FACTOR};
use crate::shared::error::LensError;
use crate::shared::frame::Frame;

/// Turns a close-up eye photo into a lens texture: a square crop around the
/// iris with a feathered circular alpha, written as RGBA.
///
/// The iris is found by the locator when one is set, otherwise by the
/// explicit center and radius, otherwise it is assumed to sit in the middle
/// of the photo.
pub struct ExtractLensUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    locator: Option<Box<dyn EyeLocator>>,
    center: Option<(i32, i32)>,
    radius: Option<i32>,
}

impl ExtractLensUseCase {
    pub fn new(reader: Box<dyn ImageReader>, writer: Box<dyn ImageWriter>) -> Self {
        Self {
            reader,
            writer,
            locator: None,
            center: None,
            radius: None,
        }
    }

    pub fn with_locator(mut self, locator: Box<dyn EyeLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn with_center(mut self, center: (i32, i32)) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_radius(mut self, radius: i32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Returns the size of the written texture.
    pub fn execute(&mut self, input_path: &Path, output_path: &Path) -> Result<(u32, u32), LensError> {
        let frame = self
            .reader
            .read(input_path)
            .map_err(|source| LensError::ImageRead {
                path: input_path.to_path_buf(),
                source,
            })?;

        let (center, radius) = self.iris_circle(&frame)?;
        log::info!("Extracting lens around {center:?}, radius {radius}px");
        let lens = Frame::from_rgba_image(extract_lens(&frame, center, radius)?);

        self.writer
            .write(output_path, &lens)
            .map_err(|source| LensError::ImageWrite {
                path: output_path.to_path_buf(),
                source,
            })?;
        log::info!("Lens texture saved to {}", output_path.display());
        Ok(lens.size())
    }

    fn iris_circle(&mut self, frame: &Frame) -> Result<((i32, i32), i32), LensError> {
        if let Some(locator) = self.locator.as_mut() {
            let detection = locator
                .locate(frame)
                .map_err(|e| LensError::Landmarks(e.to_string()))?;
            if let Some((side, eye)) = detection.eyes().next() {
                log::info!("Using detected {side} eye");
                let radius = (eye.radius_px() * EXTRACT_EXPAND_RATIO) as i32;
                return Ok((eye.center_px(), radius));
            }
            log::warn!("no eye located in the source photo, falling back");
        }

        let (w, h) = frame.size();
        let center = self.center.unwrap_or(((w / 2) as i32, (h / 2) as i32));
        let radius = self
            .radius
            .unwrap_or((w.min(h) as f64 * EXTRACT_FALLBACK_RADIUS_FACTOR) as i32);
        Ok((center, radius))
    }
}
