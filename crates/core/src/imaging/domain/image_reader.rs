use std::path::Path;

use crate::shared::frame::Frame;

/// Loads an image file into a frame.
///
/// Images with transparency come back as 4-channel RGBA frames, everything
/// else as 3-channel RGB.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
