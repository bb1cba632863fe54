use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::compositing::domain::compositing_params::{CompositingParams, RecolorParams};
use crate::compositing::domain::iris_compositor::IrisCompositor;
use crate::compositing::infrastructure::color_recolorer::ColorRecolorer;
use crate::compositing::infrastructure::dominant_color::estimate_colors;
use crate::compositing::infrastructure::texture_compositor::TextureCompositor;
use crate::detection::domain::eye_locator::EyeLocator;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::imaging::infrastructure::landmark_overlay::draw_landmark_overlay;
use crate::lens::domain::lens_texture::LensTexture;
use crate::pipeline::edge_refinement_stage::EdgeRefinementStage;
use crate::pipeline::lens_compositing_pipeline::{composite, CompositeReport};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::error::LensError;
use crate::shared::frame::Frame;

/// How the iris is changed.
#[derive(Clone, Debug, PartialEq)]
pub enum LensMode {
    /// Warp and blend the lens image over the iris.
    Texture(CompositingParams),
    /// Shift the iris chroma toward `color`, or toward the lens image's
    /// dominant color when no color is given.
    Color {
        params: RecolorParams,
        color: Option<[u8; 3]>,
    },
}

/// Photo pipeline: read → locate eyes → composite → refine → write.
pub struct ReplaceLensUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    locator: Box<dyn EyeLocator>,
    mode: LensMode,
    refinement: Option<EdgeRefinementStage>,
    debug_overlay: Option<PathBuf>,
    logger: Box<dyn PipelineLogger>,
}

impl ReplaceLensUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        locator: Box<dyn EyeLocator>,
        mode: LensMode,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            locator,
            mode,
            refinement: None,
            debug_overlay: None,
            logger,
        }
    }

    pub fn with_refinement(mut self, stage: EdgeRefinementStage) -> Self {
        self.refinement = Some(stage);
        self
    }

    /// Also writes the located eyes drawn over the input to `path`.
    pub fn with_debug_overlay(mut self, path: PathBuf) -> Self {
        self.debug_overlay = Some(path);
        self
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        lens_path: Option<&Path>,
        output_path: &Path,
    ) -> Result<CompositeReport, LensError> {
        let start = Instant::now();
        let target = self.read(input_path)?;
        let compositor = self.build_compositor(lens_path)?;
        self.lap("read", start);

        let start = Instant::now();
        let detection = self
            .locator
            .locate(&target)
            .map_err(|e| LensError::Landmarks(e.to_string()))?;
        self.lap("locate", start);

        if let Some(path) = &self.debug_overlay {
            let overlay = draw_landmark_overlay(&target, &detection, self.locator.landmarks());
            match self.writer.write(path, &overlay) {
                Ok(()) => self.logger.info(&format!("Landmark overlay: {}", path.display())),
                Err(e) => log::warn!("could not write landmark overlay {}: {e}", path.display()),
            }
        }

        let start = Instant::now();
        let (mut result, report) = composite(&target, &detection, compositor.as_ref())?;
        self.lap("composite", start);

        if report.applied > 0 {
            if let Some(stage) = &self.refinement {
                let start = Instant::now();
                result = stage.run(&result, &detection);
                self.lap("refine", start);
            }
        }

        let start = Instant::now();
        self.writer
            .write(output_path, &result)
            .map_err(|source| LensError::ImageWrite {
                path: output_path.to_path_buf(),
                source,
            })?;
        self.lap("write", start);

        self.logger.info(&format!(
            "Saved {} ({} eye(s) changed, {} skipped)",
            output_path.display(),
            report.applied,
            report.skipped
        ));
        self.logger.summary();
        Ok(report)
    }

    fn read(&self, path: &Path) -> Result<Frame, LensError> {
        self.reader.read(path).map_err(|source| LensError::ImageRead {
            path: path.to_path_buf(),
            source,
        })
    }

    fn build_compositor(&mut self, lens_path: Option<&Path>) -> Result<Box<dyn IrisCompositor>, LensError> {
        match self.mode.clone() {
            LensMode::Texture(params) => {
                let path = lens_path
                    .ok_or_else(|| LensError::InvalidTexture("texture mode needs a lens image".into()))?;
                let texture = LensTexture::prepare(&self.read(path)?)?;
                self.logger.info(&format!(
                    "Lens {}: blend={} opacity={:.2}",
                    path.display(),
                    params.blend_mode,
                    params.opacity
                ));
                Ok(Box::new(TextureCompositor::new(texture, params)))
            }
            LensMode::Color { params, color } => {
                let target = match (color, lens_path) {
                    (Some(rgb), _) => rgb,
                    (None, Some(path)) => {
                        let texture = LensTexture::prepare(&self.read(path)?)?;
                        estimate_colors(texture.pixels())
                            .map(|c| c.dominant)
                            .ok_or_else(|| LensError::InvalidTexture("lens image has no pixels".into()))?
                    }
                    (None, None) => {
                        return Err(LensError::InvalidTexture(
                            "color mode needs a lens image or an explicit color".into(),
                        ))
                    }
                };
                self.logger
                    .info(&format!("Recoloring toward RGB{target:?}, intensity {:.2}", params.intensity));
                Ok(Box::new(ColorRecolorer::new(target, params)))
            }
        }
    }

    fn lap(&mut self, stage: &str, start: Instant) {
        self.logger
            .timing(stage, start.elapsed().as_secs_f64() * 1000.0);
    }
}
