use std::path::PathBuf;

use thiserror::Error;

/// Hard failures surfaced to callers of the compositing pipeline.
///
/// Per-eye degenerate cases are reported as skips, not errors; see
/// `compositing::domain::iris_compositor::EyeOutcome`.
#[derive(Error, Debug)]
pub enum LensError {
    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("no face detected")]
    NoFaceDetected,
    #[error("no usable eye in detection")]
    NoEyeDetected,
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("invalid lens texture: {0}")]
    InvalidTexture(String),
    #[error("landmark source: {0}")]
    Landmarks(String),
    #[error("expected an RGB frame, got {channels} channels")]
    UnsupportedFrame { channels: u8 },
}
