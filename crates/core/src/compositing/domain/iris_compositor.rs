use std::fmt;

use crate::detection::domain::eye_geometry::EyeGeometry;
use crate::shared::error::LensError;
use crate::shared::frame::Frame;

/// Why an eye was left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    ZeroOpacity,
    /// The scaled lens would be smaller than the minimum usable size.
    TooSmall,
    /// The lens footprint does not overlap the image.
    OutOfFrame,
    /// The blend mask carries no weight.
    EmptyMask,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::ZeroOpacity => "opacity is zero",
            SkipReason::TooSmall => "scaled lens too small",
            SkipReason::OutOfFrame => "lens outside the image",
            SkipReason::EmptyMask => "mask is empty",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EyeOutcome {
    Applied,
    Skipped(SkipReason),
}

/// Strategy for changing the look of one iris in place.
///
/// Degenerate situations are reported as [`EyeOutcome::Skipped`] with the
/// frame unchanged; `Err` is reserved for unusable inputs such as a
/// non-RGB frame.
pub trait IrisCompositor: Send {
    fn apply(&self, frame: &mut Frame, eye: &EyeGeometry) -> Result<EyeOutcome, LensError>;
}

/// Fails unless `frame` is 3-channel RGB.
pub fn require_rgb(frame: &Frame) -> Result<(), LensError> {
    match frame.channels() {
        3 => Ok(()),
        channels => Err(LensError::UnsupportedFrame { channels }),
    }
}
