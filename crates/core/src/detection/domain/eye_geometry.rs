use nalgebra::{Matrix3, Vector3};

use super::orientation::{EulerAngles, FORWARD_NORMAL};
use crate::shared::error::LensError;

/// Per-eye center, apparent radius, and gaze orientation.
///
/// Invariants (upheld by every constructor): `radius_px > 0`, `normal.z <= 0`,
/// `rotation == euler_angles.rotation_matrix()`.
#[derive(Clone, Debug, PartialEq)]
pub struct EyeGeometry {
    center: Vector3<f64>,
    center_px: (i32, i32),
    radius_px: f64,
    normal: Vector3<f64>,
    rotation: Matrix3<f64>,
    euler_angles: EulerAngles,
    boundary_px: [(f64, f64); 4],
}

impl EyeGeometry {
    /// Builds a geometry from estimator outputs. `normal` must already face
    /// the camera.
    pub(crate) fn from_parts(
        center: Vector3<f64>,
        center_px: (i32, i32),
        radius_px: f64,
        normal: Vector3<f64>,
        boundary_px: [(f64, f64); 4],
    ) -> Result<Self, LensError> {
        if !radius_px.is_finite() || radius_px <= 0.0 {
            return Err(LensError::DegenerateGeometry(format!(
                "iris radius {radius_px} is not positive"
            )));
        }
        let euler_angles = EulerAngles::from_normal(&normal);
        Ok(Self {
            center,
            center_px,
            radius_px,
            normal,
            rotation: euler_angles.rotation_matrix(),
            euler_angles,
            boundary_px,
        })
    }

    /// A camera-facing eye at a known pixel position, used when the eye is
    /// positioned by hand instead of by landmarks.
    pub fn frontal(
        center_px: (f64, f64),
        radius_px: f64,
        image_size: (u32, u32),
    ) -> Result<Self, LensError> {
        let (w, h) = (image_size.0.max(1) as f64, image_size.1.max(1) as f64);
        let (cx, cy) = center_px;
        let boundary_px = [
            (cx, cy - radius_px),
            (cx + radius_px, cy),
            (cx, cy + radius_px),
            (cx - radius_px, cy),
        ];
        Self::from_parts(
            Vector3::new(cx / w, cy / h, 0.0),
            (cx as i32, cy as i32),
            radius_px,
            FORWARD_NORMAL,
            boundary_px,
        )
    }

    /// Normalized 3-D center (x, y as image fractions, z relative depth).
    pub fn center(&self) -> Vector3<f64> {
        self.center
    }

    pub fn center_px(&self) -> (i32, i32) {
        self.center_px
    }

    pub fn radius_px(&self) -> f64 {
        self.radius_px
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    pub fn rotation(&self) -> Matrix3<f64> {
        self.rotation
    }

    pub fn euler_angles(&self) -> EulerAngles {
        self.euler_angles
    }

    /// Iris boundary points in pixels: top, outer, bottom, inner.
    pub fn boundary_px(&self) -> [(f64, f64); 4] {
        self.boundary_px
    }
}
