use super::eye_geometry::EyeGeometry;
use super::landmark_set::EyeSide;

/// Outcome of locating the eyes in one image.
///
/// `success == false` means no face was found; in that case both eyes are
/// absent. On success an eye may still be absent when its landmarks were
/// unusable.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    pub left_eye: Option<EyeGeometry>,
    pub right_eye: Option<EyeGeometry>,
    pub success: bool,
    pub image_size: (u32, u32),
}

impl DetectionResult {
    pub fn no_face(image_size: (u32, u32)) -> Self {
        Self {
            left_eye: None,
            right_eye: None,
            success: false,
            image_size,
        }
    }

    pub fn eye(&self, side: EyeSide) -> Option<&EyeGeometry> {
        match side {
            EyeSide::Left => self.left_eye.as_ref(),
            EyeSide::Right => self.right_eye.as_ref(),
        }
    }

    /// Present eyes in left, right order.
    pub fn eyes(&self) -> impl Iterator<Item = (EyeSide, &EyeGeometry)> {
        EyeSide::BOTH
            .into_iter()
            .filter_map(move |side| self.eye(side).map(|eye| (side, eye)))
    }

    pub fn has_eyes(&self) -> bool {
        self.left_eye.is_some() || self.right_eye.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(x: f64) -> EyeGeometry {
        EyeGeometry::frontal((x, 50.0), 10.0, (200, 100)).unwrap()
    }

    #[test]
    fn test_no_face_has_no_eyes() {
        let r = DetectionResult::no_face((640, 480));
        assert!(!r.success);
        assert!(!r.has_eyes());
        assert_eq!(r.eyes().count(), 0);
        assert_eq!(r.image_size, (640, 480));
    }

    #[test]
    fn test_eyes_iterates_left_then_right() {
        let r = DetectionResult {
            left_eye: Some(eye(40.0)),
            right_eye: Some(eye(160.0)),
            success: true,
            image_size: (200, 100),
        };
        let sides: Vec<_> = r.eyes().map(|(s, e)| (s, e.center_px().0)).collect();
        assert_eq!(sides, vec![(EyeSide::Left, 40), (EyeSide::Right, 160)]);
    }

    #[test]
    fn test_eyes_skips_absent() {
        let r = DetectionResult {
            left_eye: None,
            right_eye: Some(eye(160.0)),
            success: true,
            image_size: (200, 100),
        };
        assert!(r.has_eyes());
        assert_eq!(r.eyes().count(), 1);
        assert!(r.eye(EyeSide::Left).is_none());
    }
}
