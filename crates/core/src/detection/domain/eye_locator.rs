use super::detection_result::DetectionResult;
use super::eye_geometry::EyeGeometry;
use super::eye_geometry_estimator::EyeGeometryEstimator;
use super::landmark_detector::LandmarkDetector;
use super::landmark_set::LandmarkSet;
use crate::shared::frame::Frame;

/// Locates both eyes in an image.
pub trait EyeLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Result<DetectionResult, Box<dyn std::error::Error>>;

    /// Raw landmarks behind the last `locate` call, if this locator uses any.
    fn landmarks(&self) -> Option<&LandmarkSet> {
        None
    }
}

/// Landmark detection followed by per-eye geometry estimation.
pub struct LandmarkEyeLocator {
    detector: Box<dyn LandmarkDetector>,
    estimator: EyeGeometryEstimator,
    last: Option<LandmarkSet>,
}

impl LandmarkEyeLocator {
    pub fn new(detector: Box<dyn LandmarkDetector>) -> Self {
        Self {
            detector,
            estimator: EyeGeometryEstimator::new(),
            last: None,
        }
    }
}

impl EyeLocator for LandmarkEyeLocator {
    fn locate(&mut self, frame: &Frame) -> Result<DetectionResult, Box<dyn std::error::Error>> {
        let landmarks = self.detector.detect(frame)?;
        if landmarks.is_none() {
            log::warn!("no face found by landmark detector");
        }
        let result = self.estimator.analyze(landmarks.as_ref(), frame.size());
        self.last = landmarks;
        Ok(result)
    }

    fn landmarks(&self) -> Option<&LandmarkSet> {
        self.last.as_ref()
    }
}

/// A hand-placed eye circle: center and radius in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManualEye {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl ManualEye {
    pub fn new(center_x: f64, center_y: f64, radius: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }
}

/// Eyes positioned explicitly instead of detected. Each placed eye is
/// assumed to look straight at the camera.
pub struct ManualEyeLocator {
    left: Option<ManualEye>,
    right: Option<ManualEye>,
}

impl ManualEyeLocator {
    pub fn new(left: Option<ManualEye>, right: Option<ManualEye>) -> Self {
        Self { left, right }
    }

    fn place(eye: Option<ManualEye>, size: (u32, u32)) -> Option<EyeGeometry> {
        let eye = eye?;
        match EyeGeometry::frontal((eye.center_x, eye.center_y), eye.radius, size) {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                log::warn!("ignoring manual eye {eye:?}: {e}");
                None
            }
        }
    }
}

impl EyeLocator for ManualEyeLocator {
    fn locate(&mut self, frame: &Frame) -> Result<DetectionResult, Box<dyn std::error::Error>> {
        let size = frame.size();
        let left_eye = Self::place(self.left, size);
        let right_eye = Self::place(self.right, size);
        let success = left_eye.is_some() || right_eye.is_some();
        Ok(DetectionResult {
            left_eye,
            right_eye,
            success,
            image_size: size,
        })
    }
}
