use nalgebra::Vector3;

use super::detection_result::DetectionResult;
use super::eye_geometry::EyeGeometry;
use super::landmark_set::{EyeSide, LandmarkSet};
use super::orientation::{face_camera, fit_plane_normal, FORWARD_NORMAL};
use crate::shared::error::LensError;

/// Radii at or below this many pixels are treated as coincident landmarks.
const MIN_RADIUS_PX: f64 = 1e-9;

/// Converts raw face-mesh landmarks into per-eye [`EyeGeometry`].
///
/// Pure and deterministic: the same landmarks and image size always give the
/// same geometry.
#[derive(Clone, Copy, Debug, Default)]
pub struct EyeGeometryEstimator;

impl EyeGeometryEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimates one eye's geometry.
    ///
    /// Fails with [`LensError::NoEyeDetected`] when the landmark set lacks the
    /// eye's iris points and with [`LensError::DegenerateGeometry`] when the
    /// boundary collapses onto the center. An ill-conditioned orientation fit
    /// is recovered with a camera-facing normal.
    pub fn estimate(
        &self,
        landmarks: &LandmarkSet,
        side: EyeSide,
        image_size: (u32, u32),
    ) -> Result<EyeGeometry, LensError> {
        let center = landmarks
            .iris_center(side)
            .ok_or(LensError::NoEyeDetected)?;
        let boundary = landmarks
            .iris_boundary(side)
            .ok_or(LensError::NoEyeDetected)?;

        let (cx, cy) = center.to_pixel(image_size);
        let boundary_px = boundary.map(|p| p.to_pixel(image_size));

        let radius = boundary_px
            .iter()
            .map(|&(x, y)| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt())
            .sum::<f64>()
            / boundary_px.len() as f64;
        if !radius.is_finite() || radius <= MIN_RADIUS_PX {
            return Err(LensError::DegenerateGeometry(format!(
                "{side} iris boundary collapses onto its center (radius {radius})"
            )));
        }

        let relative: Vec<Vector3<f64>> = boundary
            .iter()
            .map(|p| Vector3::new(p.x - center.x, p.y - center.y, p.z - center.z))
            .collect();
        let normal = match fit_plane_normal(&relative) {
            Ok(n) => face_camera(n),
            Err(e) => {
                log::debug!("{side} eye: {e}, assuming forward gaze");
                FORWARD_NORMAL
            }
        };

        EyeGeometry::from_parts(
            Vector3::new(center.x, center.y, center.z),
            (cx as i32, cy as i32),
            radius,
            normal,
            boundary_px,
        )
    }

    /// Estimates both eyes. `None` landmarks means no face was found.
    ///
    /// An eye whose estimation fails is logged and left absent.
    pub fn analyze(
        &self,
        landmarks: Option<&LandmarkSet>,
        image_size: (u32, u32),
    ) -> DetectionResult {
        let Some(landmarks) = landmarks else {
            return DetectionResult::no_face(image_size);
        };

        let mut result = DetectionResult {
            left_eye: None,
            right_eye: None,
            success: true,
            image_size,
        };
        for side in EyeSide::BOTH {
            match self.estimate(landmarks, side, image_size) {
                Ok(eye) => {
                    let angles = eye.euler_angles();
                    log::info!(
                        "{side} eye: center={:?} radius={:.1}px pitch={:.3} yaw={:.3}",
                        eye.center_px(),
                        eye.radius_px(),
                        angles.pitch,
                        angles.yaw
                    );
                    match side {
                        EyeSide::Left => result.left_eye = Some(eye),
                        EyeSide::Right => result.right_eye = Some(eye),
                    }
                }
                Err(e) => log::warn!("{side} eye skipped: {e}"),
            }
        }
        result
    }
}
