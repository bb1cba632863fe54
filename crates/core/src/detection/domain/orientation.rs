//! Iris plane orientation from boundary landmarks.
//!
//! The four boundary points (relative to the iris center) are treated as
//! samples of a local plane; its normal approximates the gaze direction.

use nalgebra::{DMatrix, Matrix3, Vector3};
use thiserror::Error;

/// Default normal when the plane fit is ill-conditioned: facing the camera.
pub const FORWARD_NORMAL: Vector3<f64> = Vector3::new(0.0, 0.0, -1.0);

/// Second-largest / largest singular value below which the points are
/// considered collinear (no unique plane).
const RANK_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("iris plane fit failed: {0}")]
pub struct OrientationFitFailure(pub &'static str);

/// Gaze angles in radians. `roll` is not modeled and stays 0.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct EulerAngles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl EulerAngles {
    /// Angles of a camera-facing unit normal.
    pub fn from_normal(normal: &Vector3<f64>) -> Self {
        Self {
            pitch: (-normal.y).clamp(-1.0, 1.0).asin(),
            yaw: normal.x.atan2(-normal.z),
            roll: 0.0,
        }
    }

    /// `Rz(roll) · Ry(yaw) · Rx(pitch)`.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        let (sr, cr) = self.roll.sin_cos();

        #[rustfmt::skip]
        let rx = Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, cp,  -sp,
            0.0, sp,  cp,
        );
        #[rustfmt::skip]
        let ry = Matrix3::new(
            cy,  0.0, sy,
            0.0, 1.0, 0.0,
            -sy, 0.0, cy,
        );
        #[rustfmt::skip]
        let rz = Matrix3::new(
            cr,  -sr, 0.0,
            sr,  cr,  0.0,
            0.0, 0.0, 1.0,
        );
        rz * ry * rx
    }
}

/// Least-squares plane normal through the origin via SVD: the right singular
/// vector of the smallest singular value.
pub fn fit_plane_normal(points: &[Vector3<f64>]) -> Result<Vector3<f64>, OrientationFitFailure> {
    if points.len() < 3 {
        return Err(OrientationFitFailure("need at least 3 points"));
    }
    if points.iter().any(|p| !p.iter().all(|v| v.is_finite())) {
        return Err(OrientationFitFailure("non-finite coordinates"));
    }

    let a = DMatrix::from_fn(points.len(), 3, |r, c| points[r][c]);
    let svd = a.svd(false, true);
    let v_t = svd
        .v_t
        .ok_or(OrientationFitFailure("SVD did not produce V^T"))?;
    let s = svd.singular_values;

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| s[i].total_cmp(&s[j]));
    let (smallest, middle, largest) = (order[0], order[1], order[2]);

    if !(s[largest] > 0.0) || s[middle] <= RANK_TOLERANCE * s[largest] {
        return Err(OrientationFitFailure("boundary points are rank-deficient"));
    }

    let row = v_t.row(smallest);
    let normal = Vector3::new(row[0], row[1], row[2]);
    let norm = normal.norm();
    if !norm.is_finite() || norm <= 1e-12 {
        return Err(OrientationFitFailure("degenerate singular vector"));
    }
    Ok(normal / norm)
}

/// Flips `normal` so its camera-axis (z) component is non-positive, then
/// normalizes it.
pub fn face_camera(normal: Vector3<f64>) -> Vector3<f64> {
    let flipped = if normal.z > 0.0 { -normal } else { normal };
    let norm = flipped.norm();
    if norm > 0.0 && norm.is_finite() {
        flipped / norm
    } else {
        FORWARD_NORMAL
    }
}
