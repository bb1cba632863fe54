use image::GrayImage;
use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum RefineError {
    #[error("refinement backend unavailable: {0}")]
    Unavailable(String),
    #[error("refinement request timed out")]
    Timeout,
    #[error("invalid refinement response: {0}")]
    InvalidResponse(String),
}

/// Smooths the seam of a composited lens by regenerating masked pixels.
///
/// `mask` is white where pixels may change. `strength` in `[0, 1]` is how far
/// the backend may depart from the input. The result has the input's size.
pub trait EdgeRefiner: Send {
    fn name(&self) -> &str;

    fn refine(&self, image: &Frame, mask: &GrayImage, strength: f64) -> Result<Frame, RefineError>;
}
