pub mod detection_result;
pub mod eye_geometry;
pub mod eye_geometry_estimator;
pub mod eye_locator;
pub mod landmark_detector;
pub mod landmark_set;
pub mod orientation;
