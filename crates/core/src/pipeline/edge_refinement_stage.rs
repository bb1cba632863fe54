use crate::detection::domain::detection_result::DetectionResult;
use crate::refinement::domain::edge_refiner::{EdgeRefiner, RefineError};
use crate::refinement::domain::refinement_mask::{build_mask, MaskStyle};
use crate::shared::constants::{DEFAULT_DENOISING_STRENGTH, DEFAULT_REFINE_EXPAND, LOCAL_INPAINT_EXPAND};
use crate::shared::frame::Frame;

/// Optional seam-smoothing pass after compositing.
///
/// Never fails: when the primary refiner is unreachable the fallback (if
/// any) runs on a rim outline instead, and when nothing succeeds the
/// composited image is returned as is.
pub struct EdgeRefinementStage {
    primary: Box<dyn EdgeRefiner>,
    style: MaskStyle,
    strength: f64,
    expand: i32,
    fallback: Option<Box<dyn EdgeRefiner>>,
}

impl EdgeRefinementStage {
    pub fn new(primary: Box<dyn EdgeRefiner>, style: MaskStyle) -> Self {
        Self {
            primary,
            style,
            strength: DEFAULT_DENOISING_STRENGTH,
            expand: DEFAULT_REFINE_EXPAND,
            fallback: None,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    pub fn with_expand(mut self, expand: i32) -> Self {
        self.expand = expand;
        self
    }

    pub fn with_fallback(mut self, fallback: Box<dyn EdgeRefiner>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn run(&self, image: &Frame, detection: &DetectionResult) -> Frame {
        if !detection.has_eyes() {
            return image.clone();
        }

        let mask = build_mask(detection, self.style, self.expand);
        let err = match self.primary.refine(image, &mask, self.strength) {
            Ok(refined) => {
                log::info!("Edges refined by {}", self.primary.name());
                return refined;
            }
            Err(e) => e,
        };

        match (&err, &self.fallback) {
            (RefineError::Unavailable(_) | RefineError::Timeout, Some(fallback)) => {
                log::warn!("{} failed ({err}), using {}", self.primary.name(), fallback.name());
                let outline = build_mask(detection, MaskStyle::Outline, LOCAL_INPAINT_EXPAND);
                match fallback.refine(image, &outline, self.strength) {
                    Ok(refined) => refined,
                    Err(e) => {
                        log::warn!("{} failed ({e}), keeping unrefined image", fallback.name());
                        image.clone()
                    }
                }
            }
            _ => {
                log::warn!("{} failed ({err}), keeping unrefined image", self.primary.name());
                image.clone()
            }
        }
    }
}
