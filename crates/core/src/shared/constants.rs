// ── Detection ────────────────────────────────────────────────────────

pub const LEFT_IRIS_CENTER: usize = 468;
/// Left iris boundary: top, outer, bottom, inner.
pub const LEFT_IRIS_BOUNDARY: [usize; 4] = [469, 470, 471, 472];
pub const RIGHT_IRIS_CENTER: usize = 473;
pub const RIGHT_IRIS_BOUNDARY: [usize; 4] = [474, 475, 476, 477];
pub const LEFT_EYE_CONTOUR: [usize; 8] = [33, 133, 160, 159, 158, 144, 145, 153];
pub const RIGHT_EYE_CONTOUR: [usize; 8] = [362, 263, 387, 386, 385, 373, 374, 380];

/// Full face-mesh landmark count with iris refinement.
pub const FACE_MESH_LANDMARKS: usize = 478;

// ── Lens texture ─────────────────────────────────────────────────────

/// Alpha above which a texture pixel counts as opaque.
pub const OPAQUE_ALPHA_THRESHOLD: u8 = 128;
pub const SYNTH_ALPHA_MARGIN: f64 = 5.0;
pub const SYNTH_ALPHA_FEATHER: f64 = 20.0;
pub const RADIUS_PERCENTILE: f64 = 95.0;
pub const RADIUS_FALLBACK_FACTOR: f64 = 0.9;

// ── Compositing ──────────────────────────────────────────────────────

/// Lens diameter relative to the iris radius (2.0 covers the full iris).
pub const COVERAGE_FACTOR: f64 = 2.0;
/// Scaled textures narrower or shorter than this are skipped.
pub const MIN_SCALED_SIZE: u32 = 10;
pub const MAX_WARP_ANGLE: f64 = 0.4;
pub const WARP_FACTOR: f64 = 0.15;
pub const DEFAULT_HIGHLIGHT_THRESHOLD: u8 = 220;
pub const HIGHLIGHT_REGION_FACTOR: f64 = 1.3;
pub const HIGHLIGHT_BLUR_KERNEL: usize = 5;

// ── Recoloring ───────────────────────────────────────────────────────

pub const DEFAULT_RECOLOR_INTENSITY: f64 = 0.45;
pub const DEFAULT_RECOLOR_FEATHER: f64 = 18.0;
pub const DEFAULT_RECOLOR_EXPANSION: f64 = 1.1;
pub const DOMINANT_COLOR_CLUSTERS: usize = 3;
pub const DOMINANT_COLOR_MAX_ITERS: usize = 20;

// ── Edge refinement ──────────────────────────────────────────────────

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:7860";
pub const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 120;
pub const SERVICE_PROBE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DENOISING_STRENGTH: f64 = 0.35;
pub const DEFAULT_PROTECT_RATIO: f64 = 0.65;
pub const DEFAULT_REFINE_EXPAND: i32 = 5;
pub const LOCAL_INPAINT_EXPAND: i32 = 3;
pub const LOCAL_INPAINT_RADIUS: i32 = 3;

// ── Extraction ───────────────────────────────────────────────────────

pub const EXTRACT_EXPAND_RATIO: f64 = 1.2;
pub const EXTRACT_FALLBACK_RADIUS_FACTOR: f64 = 0.30;
pub const EXTRACT_MIN_FEATHER: u32 = 15;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
