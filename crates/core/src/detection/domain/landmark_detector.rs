use super::landmark_set::LandmarkSet;
use crate::shared::frame::Frame;

/// Source of face-mesh landmarks for one image.
///
/// `Ok(None)` means the detector ran but found no face. Implementations may
/// be stateful (e.g. caching a loaded model or file), hence `&mut self`.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>>;
}
