use std::path::Path;

use crate::shared::frame::Frame;

/// Writes an RGB or RGBA frame to an image file; the format follows the
/// path's extension.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
