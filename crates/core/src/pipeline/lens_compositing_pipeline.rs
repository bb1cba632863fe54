use crate::compositing::domain::iris_compositor::{EyeOutcome, IrisCompositor};
use crate::detection::domain::detection_result::DetectionResult;
use crate::shared::error::LensError;
use crate::shared::frame::Frame;

/// Per-run tally of what happened to each eye.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositeReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Applies one compositing strategy to every detected eye.
///
/// Fails with [`LensError::NoFaceDetected`] when detection failed and with
/// [`LensError::NoEyeDetected`] when it succeeded without a usable eye; in
/// both cases the target is not touched. Per-eye skips are logged and the
/// remaining eyes are still processed. The returned image is always RGB: an
/// RGBA target loses its alpha channel even when no eye changes it, so a
/// zero-opacity pass reproduces the target's color channels only.
pub fn composite(
    target: &Frame,
    detection: &DetectionResult,
    compositor: &dyn IrisCompositor,
) -> Result<(Frame, CompositeReport), LensError> {
    if !detection.success {
        return Err(LensError::NoFaceDetected);
    }
    if !detection.has_eyes() {
        return Err(LensError::NoEyeDetected);
    }

    let mut out = target.to_rgb();
    let mut report = CompositeReport::default();
    for (side, eye) in detection.eyes() {
        match compositor.apply(&mut out, eye)? {
            EyeOutcome::Applied => {
                log::info!("{side} eye composited");
                report.applied += 1;
            }
            EyeOutcome::Skipped(reason) => {
                log::warn!("{side} eye skipped: {reason}");
                report.skipped += 1;
            }
        }
    }
    Ok((out, report))
}
