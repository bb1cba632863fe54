use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use lensfit_core::compositing::domain::blend_mode::BlendMode;
use lensfit_core::compositing::domain::compositing_params::{CompositingParams, RecolorParams};
use lensfit_core::detection::domain::eye_locator::{
    EyeLocator, LandmarkEyeLocator, ManualEye, ManualEyeLocator,
};
use lensfit_core::detection::infrastructure::json_landmark_detector::JsonLandmarkDetector;
use lensfit_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use lensfit_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use lensfit_core::pipeline::edge_refinement_stage::EdgeRefinementStage;
use lensfit_core::pipeline::extract_lens_use_case::ExtractLensUseCase;
use lensfit_core::pipeline::pipeline_logger::LogPipelineLogger;
use lensfit_core::pipeline::replace_lens_use_case::{LensMode, ReplaceLensUseCase};
use lensfit_core::refinement::domain::refinement_mask::MaskStyle;
use lensfit_core::refinement::infrastructure::inpaint_service_refiner::{
    InpaintServiceConfig, InpaintServiceRefiner,
};
use lensfit_core::refinement::infrastructure::local_inpaint_refiner::LocalInpaintRefiner;
use lensfit_core::shared::constants::{
    DEFAULT_SERVICE_URL, IMAGE_EXTENSIONS, LOCAL_INPAINT_EXPAND,
};

/// Composite a colored contact lens onto the irises of a photographed face.
#[derive(Parser, Debug)]
#[command(name = "lensfit")]
struct Cli {
    /// Input face photo (or eye photo with --extract).
    input: PathBuf,

    /// Output image file.
    output: PathBuf,

    /// Lens material image (RGBA, or RGB with alpha synthesized).
    #[arg(long)]
    lens: Option<PathBuf>,

    /// Face-mesh landmark dump (JSON) for the input image.
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// Manually placed left eye: X,Y,RADIUS in pixels.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    left_eye: Option<Vec<f64>>,

    /// Manually placed right eye: X,Y,RADIUS in pixels.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    right_eye: Option<Vec<f64>>,

    /// Compositing mode: texture or color.
    #[arg(long, default_value = "texture")]
    mode: String,

    /// Lens opacity (0.0-1.0).
    #[arg(long, default_value = "1.0")]
    opacity: f64,

    /// Blend mode: normal, soft_light or overlay.
    #[arg(long, default_value = "normal")]
    blend: String,

    /// Do not restore specular highlights after blending.
    #[arg(long)]
    no_highlights: bool,

    /// Lightness above which iris pixels count as highlights (0-255).
    #[arg(long, default_value = "220")]
    highlight_threshold: u32,

    /// Recolor strength at the iris center (0.0-1.0, color mode).
    #[arg(long, default_value = "0.45")]
    intensity: f64,

    /// Recolor feather width in pixels (color mode).
    #[arg(long, default_value = "18")]
    feather: f64,

    /// Recolor radius relative to the iris radius (color mode).
    #[arg(long, default_value = "1.1")]
    expansion: f64,

    /// Explicit recolor target: R,G,B (color mode).
    #[arg(long, value_delimiter = ',')]
    color: Option<Vec<u8>>,

    /// Edge refinement: off, local or service.
    #[arg(long, default_value = "off")]
    refine: String,

    /// Inpainting service base URL.
    #[arg(long, default_value = DEFAULT_SERVICE_URL)]
    service_url: String,

    /// Denoising strength for service refinement (0.0-1.0).
    #[arg(long, default_value = "0.35")]
    denoise: f64,

    /// Let the service repaint the whole iris instead of only its rim.
    #[arg(long)]
    no_protect_center: bool,

    /// Fraction of the iris radius kept untouched by service refinement.
    #[arg(long, default_value = "0.65")]
    protect_ratio: f64,

    /// Service request timeout in seconds.
    #[arg(long, default_value = "120")]
    timeout: u64,

    /// Also save the located eyes drawn over the input.
    #[arg(long)]
    debug_landmarks: Option<PathBuf>,

    /// Cut a lens texture out of an eye photo instead of compositing.
    #[arg(long)]
    extract: bool,

    /// Iris center for --extract: X,Y in pixels.
    #[arg(long, value_delimiter = ',')]
    center: Option<Vec<i32>>,

    /// Iris radius for --extract, in pixels.
    #[arg(long)]
    radius: Option<i32>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    if cli.extract {
        run_extract(&cli)
    } else {
        run_replace(&cli)
    }
}

fn run_extract(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case =
        ExtractLensUseCase::new(Box::new(ImageFileReader::new()), Box::new(ImageFileWriter::new()));
    if let Some(path) = &cli.landmarks {
        use_case = use_case.with_locator(landmark_locator(path)?);
    }
    if let Some(c) = &cli.center {
        use_case = use_case.with_center((c[0], c[1]));
    }
    if let Some(r) = cli.radius {
        use_case = use_case.with_radius(r);
    }

    let (w, h) = use_case.execute(&cli.input, &cli.output)?;
    log::info!("Lens texture {w}x{h} written to {}", cli.output.display());
    Ok(())
}

fn run_replace(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let locator: Box<dyn EyeLocator> = match &cli.landmarks {
        Some(path) => landmark_locator(path)?,
        None => Box::new(ManualEyeLocator::new(
            cli.left_eye.as_deref().map(manual_eye),
            cli.right_eye.as_deref().map(manual_eye),
        )),
    };

    let mut use_case = ReplaceLensUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        locator,
        lens_mode(cli)?,
        Box::new(LogPipelineLogger::new()),
    );
    if let Some(stage) = refinement_stage(cli) {
        use_case = use_case.with_refinement(stage);
    }
    if let Some(path) = &cli.debug_landmarks {
        use_case = use_case.with_debug_overlay(path.clone());
    }

    let report = use_case.execute(&cli.input, cli.lens.as_deref(), &cli.output)?;
    log::info!(
        "{} eye(s) changed, {} skipped. Output: {}",
        report.applied,
        report.skipped,
        cli.output.display()
    );
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !is_image(&cli.output) {
        return Err(format!(
            "Output must be an image file ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            cli.output.display()
        )
        .into());
    }
    if let Some(path) = &cli.landmarks {
        if !path.exists() {
            return Err(format!("Landmark file not found: {}", path.display()).into());
        }
    }

    if cli.extract {
        if let Some(c) = &cli.center {
            if c.len() != 2 {
                return Err("--center takes X,Y".into());
            }
        }
        if let Some(r) = cli.radius {
            if r <= 0 {
                return Err(format!("Radius must be positive, got {r}").into());
            }
        }
        return Ok(());
    }

    let manual = cli.left_eye.is_some() || cli.right_eye.is_some();
    if cli.landmarks.is_some() && manual {
        return Err("--landmarks and --left-eye/--right-eye are mutually exclusive".into());
    }
    if cli.landmarks.is_none() && !manual {
        return Err("Eye positions are required: use --landmarks or --left-eye/--right-eye".into());
    }
    for (flag, eye) in [("--left-eye", &cli.left_eye), ("--right-eye", &cli.right_eye)] {
        if let Some(values) = eye {
            if values.len() != 3 {
                return Err(format!("{flag} takes X,Y,RADIUS").into());
            }
            if values[2] <= 0.0 {
                return Err(format!("{flag} radius must be positive, got {}", values[2]).into());
            }
        }
    }

    match cli.mode.as_str() {
        "texture" => {
            if cli.lens.is_none() {
                return Err("--lens is required in texture mode".into());
            }
        }
        "color" => {
            if cli.lens.is_none() && cli.color.is_none() {
                return Err("Color mode needs --lens or --color".into());
            }
        }
        other => return Err(format!("Mode must be 'texture' or 'color', got '{other}'").into()),
    }
    if let Some(path) = &cli.lens {
        if !path.exists() {
            return Err(format!("Lens file not found: {}", path.display()).into());
        }
    }
    if let Some(c) = &cli.color {
        if c.len() != 3 {
            return Err("--color takes R,G,B".into());
        }
    }
    cli.blend.parse::<BlendMode>()?;

    for (name, value) in [
        ("Opacity", cli.opacity),
        ("Intensity", cli.intensity),
        ("Denoise", cli.denoise),
        ("Protect ratio", cli.protect_ratio),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("{name} must be between 0.0 and 1.0, got {value}").into());
        }
    }
    if cli.highlight_threshold > 255 {
        return Err(format!(
            "Highlight threshold must be between 0 and 255, got {}",
            cli.highlight_threshold
        )
        .into());
    }
    if cli.feather < 0.0 {
        return Err(format!("Feather must not be negative, got {}", cli.feather).into());
    }
    if cli.expansion <= 0.0 {
        return Err(format!("Expansion must be positive, got {}", cli.expansion).into());
    }
    if !["off", "local", "service"].contains(&cli.refine.as_str()) {
        return Err(format!(
            "Refine must be one of: off, local, service, got '{}'",
            cli.refine
        )
        .into());
    }
    if cli.timeout == 0 {
        return Err("Timeout must be at least one second".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn landmark_locator(path: &Path) -> Result<Box<dyn EyeLocator>, Box<dyn std::error::Error>> {
    let detector = JsonLandmarkDetector::from_path(path)?;
    Ok(Box::new(LandmarkEyeLocator::new(Box::new(detector))))
}

fn manual_eye(values: &[f64]) -> ManualEye {
    ManualEye::new(values[0], values[1], values[2])
}

fn lens_mode(cli: &Cli) -> Result<LensMode, Box<dyn std::error::Error>> {
    if cli.mode == "color" {
        return Ok(LensMode::Color {
            params: RecolorParams {
                intensity: cli.intensity,
                feather: cli.feather,
                expansion: cli.expansion,
            },
            color: cli.color.as_deref().map(|c| [c[0], c[1], c[2]]),
        });
    }
    Ok(LensMode::Texture(CompositingParams {
        blend_mode: cli.blend.parse()?,
        opacity: cli.opacity,
        preserve_highlights: !cli.no_highlights,
        highlight_threshold: cli.highlight_threshold.min(255) as u8,
    }))
}

fn refinement_stage(cli: &Cli) -> Option<EdgeRefinementStage> {
    match cli.refine.as_str() {
        "local" => Some(
            EdgeRefinementStage::new(Box::new(LocalInpaintRefiner::default()), MaskStyle::Outline)
                .with_expand(LOCAL_INPAINT_EXPAND),
        ),
        "service" => {
            let config = InpaintServiceConfig {
                url: cli.service_url.clone(),
                timeout_secs: cli.timeout,
                ..InpaintServiceConfig::default()
            };
            let style = if cli.no_protect_center {
                MaskStyle::FullDisc
            } else {
                MaskStyle::Ring {
                    protect_ratio: cli.protect_ratio,
                }
            };
            Some(
                EdgeRefinementStage::new(Box::new(InpaintServiceRefiner::new(config)), style)
                    .with_strength(cli.denoise)
                    .with_fallback(Box::new(LocalInpaintRefiner::default())),
            )
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Inputs {
        _dir: tempfile::TempDir,
        face: String,
        lens: String,
        landmarks: String,
    }

    fn inputs() -> Inputs {
        let dir = tempfile::tempdir().unwrap();
        let touch = |name: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, b"x").unwrap();
            path.to_string_lossy().into_owned()
        };
        let (face, lens, landmarks) = (touch("face.png"), touch("lens.png"), touch("face.json"));
        Inputs {
            _dir: dir,
            face,
            lens,
            landmarks,
        }
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["lensfit"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_texture_mode_with_landmarks_is_valid() {
        let f = inputs();
        let cli = parse(&[f.face.as_str(), "out.png", "--lens", f.lens.as_str(), "--landmarks", f.landmarks.as_str()]);
        assert!(validate(&cli).is_ok());
        assert!(refinement_stage(&cli).is_none());
    }

    #[test]
    fn test_manual_eyes_parse() {
        let f = inputs();
        let cli = parse(&[
            f.face.as_str(), "out.png", "--lens", f.lens.as_str(), "--left-eye", "100,120,22", "--right-eye", "200,118,21",
        ]);
        assert!(validate(&cli).is_ok());
        assert_eq!(cli.left_eye, Some(vec![100.0, 120.0, 22.0]));
        assert_eq!(manual_eye(cli.right_eye.as_deref().unwrap()), ManualEye::new(200.0, 118.0, 21.0));
    }

    #[test]
    fn test_missing_input_rejected() {
        let cli = parse(&["/nonexistent/face.png", "out.png", "--left-eye", "1,1,1"]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_conflicting_eye_sources_rejected() {
        let f = inputs();
        let cli = parse(&[
            f.face.as_str(), "out.png", "--lens", f.lens.as_str(), "--landmarks", f.landmarks.as_str(), "--left-eye", "1,2,3",
        ]);
        let err = validate(&cli).unwrap_err().to_string();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn test_no_eye_source_rejected() {
        let f = inputs();
        let cli = parse(&[f.face.as_str(), "out.png", "--lens", f.lens.as_str()]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_texture_mode_requires_lens() {
        let f = inputs();
        let cli = parse(&[f.face.as_str(), "out.png", "--landmarks", f.landmarks.as_str()]);
        assert!(validate(&cli).unwrap_err().to_string().contains("--lens"));
    }

    #[test]
    fn test_color_mode_accepts_explicit_color() {
        let f = inputs();
        let cli = parse(&[
            f.face.as_str(), "out.png", "--landmarks", f.landmarks.as_str(), "--mode", "color", "--color", "20,120,60",
        ]);
        assert!(validate(&cli).is_ok());
        match lens_mode(&cli).unwrap() {
            LensMode::Color { color, params } => {
                assert_eq!(color, Some([20, 120, 60]));
                assert_eq!(params, RecolorParams::default());
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[rstest]
    #[case::opacity(&["--opacity", "1.5"])]
    #[case::intensity(&["--intensity", "1.1"])]
    #[case::denoise(&["--denoise", "2"])]
    #[case::protect_ratio(&["--protect-ratio", "1.01"])]
    #[case::threshold(&["--highlight-threshold", "300"])]
    #[case::blend(&["--blend", "multiply"])]
    #[case::mode(&["--mode", "paint"])]
    #[case::refine(&["--refine", "cloud"])]
    #[case::expansion(&["--expansion", "0"])]
    #[case::timeout(&["--timeout", "0"])]
    #[case::eye_arity(&["--right-eye", "1,2"])]
    fn test_out_of_range_values_rejected(#[case] extra: &[&str]) {
        let f = inputs();
        let mut args = vec![f.face.as_str(), "out.png", "--lens", f.lens.as_str(), "--left-eye", "10,10,5"];
        args.extend_from_slice(extra);
        assert!(validate(&parse(&args)).is_err());
    }

    #[test]
    fn test_output_must_be_image() {
        let f = inputs();
        let cli = parse(&[f.face.as_str(), "out.txt", "--lens", f.lens.as_str(), "--left-eye", "10,10,5"]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_texture_params_from_flags() {
        let f = inputs();
        let cli = parse(&[
            f.face.as_str(), "out.png", "--lens", f.lens.as_str(), "--left-eye", "10,10,5", "--blend", "soft_light",
            "--opacity", "0.7", "--no-highlights", "--highlight-threshold", "200",
        ]);
        assert_eq!(
            lens_mode(&cli).unwrap(),
            LensMode::Texture(CompositingParams {
                blend_mode: BlendMode::SoftLight,
                opacity: 0.7,
                preserve_highlights: false,
                highlight_threshold: 200,
            })
        );
    }

    #[rstest]
    #[case::local("local")]
    #[case::service("service")]
    fn test_refinement_stage_built(#[case] refine: &str) {
        let f = inputs();
        let cli = parse(&[f.face.as_str(), "out.png", "--lens", f.lens.as_str(), "--left-eye", "10,10,5", "--refine", refine]);
        assert!(validate(&cli).is_ok());
        assert!(refinement_stage(&cli).is_some());
    }

    #[test]
    fn test_extract_needs_no_lens_or_eyes() {
        let f = inputs();
        let cli = parse(&[f.face.as_str(), "lens_out.png", "--extract", "--center", "40,50", "--radius", "30"]);
        assert!(validate(&cli).is_ok());
    }

    // ── Runs ─────────────────────────────────────────────────────────

    fn photo(dir: &Path) -> String {
        use lensfit_core::imaging::domain::image_writer::ImageWriter;
        use lensfit_core::shared::frame::Frame;

        let path = dir.join("photo.png");
        ImageFileWriter::new()
            .write(&path, &Frame::filled(80, 80, [120, 90, 60]))
            .unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_extract_run_writes_texture() {
        let dir = tempfile::tempdir().unwrap();
        let input = photo(dir.path());
        let output = dir.path().join("lens.png");
        let out = output.to_string_lossy().into_owned();
        let cli = parse(&[input.as_str(), out.as_str(), "--extract", "--center", "40,40", "--radius", "20"]);
        validate(&cli).unwrap();
        run_extract(&cli).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn test_color_run_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = photo(dir.path());
        let output = dir.path().join("out.png");
        let out = output.to_string_lossy().into_owned();
        let cli = parse(&[
            input.as_str(), out.as_str(), "--mode", "color", "--color", "20,60,200", "--left-eye", "40,40,10",
        ]);
        validate(&cli).unwrap();
        run_replace(&cli).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn test_extract_rejects_bad_radius() {
        let f = inputs();
        let cli = parse(&[f.face.as_str(), "lens_out.png", "--extract", "--radius", "0"]);
        assert!(validate(&cli).is_err());
    }
}
