//! Face-mesh landmarks in normalized image coordinates.
//!
//! `x` and `y` are fractions of image width/height; `z` is relative depth
//! (same scale as `x`, negative toward the camera).

use std::fmt;

use crate::shared::constants::{
    LEFT_EYE_CONTOUR, LEFT_IRIS_BOUNDARY, LEFT_IRIS_CENTER, RIGHT_EYE_CONTOUR,
    RIGHT_IRIS_BOUNDARY, RIGHT_IRIS_CENTER,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Pixel position for an image of the given size.
    pub fn to_pixel(&self, image_size: (u32, u32)) -> (f64, f64) {
        (self.x * image_size.0 as f64, self.y * image_size.1 as f64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EyeSide {
    Left,
    Right,
}

impl EyeSide {
    pub const BOTH: [EyeSide; 2] = [EyeSide::Left, EyeSide::Right];

    pub fn iris_center_index(self) -> usize {
        match self {
            EyeSide::Left => LEFT_IRIS_CENTER,
            EyeSide::Right => RIGHT_IRIS_CENTER,
        }
    }

    pub fn iris_boundary_indices(self) -> [usize; 4] {
        match self {
            EyeSide::Left => LEFT_IRIS_BOUNDARY,
            EyeSide::Right => RIGHT_IRIS_BOUNDARY,
        }
    }

    pub fn contour_indices(self) -> [usize; 8] {
        match self {
            EyeSide::Left => LEFT_EYE_CONTOUR,
            EyeSide::Right => RIGHT_EYE_CONTOUR,
        }
    }
}

impl fmt::Display for EyeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EyeSide::Left => write!(f, "left"),
            EyeSide::Right => write!(f, "right"),
        }
    }
}

/// One face's landmarks, immutable once produced by a detector.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied()
    }

    pub fn iris_center(&self, side: EyeSide) -> Option<Landmark> {
        self.get(side.iris_center_index())
    }

    /// The four iris-boundary landmarks, or `None` if any is missing.
    pub fn iris_boundary(&self, side: EyeSide) -> Option<[Landmark; 4]> {
        let idx = side.iris_boundary_indices();
        Some([
            self.get(idx[0])?,
            self.get(idx[1])?,
            self.get(idx[2])?,
            self.get(idx[3])?,
        ])
    }

    /// Eye-contour landmarks that are present in this set.
    pub fn eye_contour(&self, side: EyeSide) -> Vec<Landmark> {
        side.contour_indices()
            .iter()
            .filter_map(|&i| self.get(i))
            .collect()
    }
}
