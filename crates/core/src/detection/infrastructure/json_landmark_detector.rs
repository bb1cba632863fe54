use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::detection::domain::landmark_set::{Landmark, LandmarkSet};
use crate::shared::error::LensError;
use crate::shared::frame::Frame;

/// On-disk landmark dump: `{"landmarks": [[x, y, z], ...]}`, with `null` or a
/// missing key meaning no face was found.
#[derive(Deserialize, Debug)]
struct LandmarkFile {
    #[serde(default)]
    landmarks: Option<Vec<Vec<f64>>>,
}

/// Serves landmarks from a JSON file produced by an external face-mesh run.
///
/// The file is parsed once at construction; every `detect` call returns the
/// same landmarks regardless of the frame.
pub struct JsonLandmarkDetector {
    path: PathBuf,
    landmarks: Option<LandmarkSet>,
}

impl JsonLandmarkDetector {
    pub fn from_path(path: &Path) -> Result<Self, LensError> {
        let text = fs::read_to_string(path)
            .map_err(|e| LensError::Landmarks(format!("{}: {e}", path.display())))?;
        let landmarks = Self::parse(&text)
            .map_err(|e| LensError::Landmarks(format!("{}: {e}", path.display())))?;
        if let Some(set) = &landmarks {
            log::info!("Loaded {} landmarks from {}", set.len(), path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
            landmarks,
        })
    }

    /// Parses a landmark dump. Each point needs two or three coordinates;
    /// a missing depth reads as 0.
    pub fn parse(text: &str) -> Result<Option<LandmarkSet>, String> {
        let file: LandmarkFile = serde_json::from_str(text).map_err(|e| e.to_string())?;
        let Some(raw) = file.landmarks else {
            return Ok(None);
        };
        let points = raw
            .iter()
            .enumerate()
            .map(|(i, p)| match p.as_slice() {
                [x, y] => Ok(Landmark::new(*x, *y, 0.0)),
                [x, y, z] => Ok(Landmark::new(*x, *y, *z)),
                _ => Err(format!("landmark {i} has {} coordinates", p.len())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if points.is_empty() {
            return Ok(None);
        }
        Ok(Some(LandmarkSet::new(points)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LandmarkDetector for JsonLandmarkDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>> {
        Ok(self.landmarks.clone())
    }
}
