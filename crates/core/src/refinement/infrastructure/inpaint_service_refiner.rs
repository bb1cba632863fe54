//! Refinement through a Stable-Diffusion-WebUI style img2img inpainting API.

use std::io::Cursor;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::refinement::domain::edge_refiner::{EdgeRefiner, RefineError};
use crate::shared::constants::{
    DEFAULT_SERVICE_TIMEOUT_SECS, DEFAULT_SERVICE_URL, SERVICE_PROBE_TIMEOUT_SECS,
};
use crate::shared::frame::Frame;

const DEFAULT_PROMPT: &str = "extremely realistic eyes, wet texture, sharp focus, \
     8k resolution, seamless iris integration, natural eye reflection, \
     detailed eyelashes, realistic skin texture around eyes";
const DEFAULT_NEGATIVE_PROMPT: &str = "blurry, low quality, artificial, fake looking, \
     wrong iris color, changed iris pattern, distorted pupil, \
     asymmetric eyes, unnatural highlights, plastic skin";

/// Connection settings for the inpainting service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InpaintServiceConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub steps: u32,
    pub cfg_scale: f64,
    pub sampler_name: String,
    pub prompt: String,
    pub negative_prompt: String,
}

impl Default for InpaintServiceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.to_string(),
            timeout_secs: DEFAULT_SERVICE_TIMEOUT_SECS,
            steps: 25,
            cfg_scale: 7.0,
            sampler_name: "DPM++ 2M Karras".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
struct Img2ImgRequest<'a> {
    init_images: Vec<String>,
    mask: String,
    prompt: &'a str,
    negative_prompt: &'a str,
    denoising_strength: f64,
    sampler_name: &'a str,
    steps: u32,
    cfg_scale: f64,
    width: u32,
    height: u32,
    mask_blur: u32,
    /// 1 = start from the original content.
    inpainting_fill: u32,
    inpaint_full_res: bool,
    inpaint_full_res_padding: u32,
}

#[derive(Deserialize, Debug)]
struct Img2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

pub struct InpaintServiceRefiner {
    config: InpaintServiceConfig,
}

impl InpaintServiceRefiner {
    pub fn new(config: InpaintServiceConfig) -> Self {
        let url = config.url.trim_end_matches('/').to_string();
        Self {
            config: InpaintServiceConfig { url, ..config },
        }
    }

    pub fn config(&self) -> &InpaintServiceConfig {
        &self.config
    }

    /// True when the service answers its model listing within the probe
    /// timeout.
    pub fn is_available(&self) -> bool {
        let client = match reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(SERVICE_PROBE_TIMEOUT_SECS))
            .build()
        {
            Ok(c) => c,
            Err(_) => return false,
        };
        client
            .get(format!("{}/sdapi/v1/sd-models", self.config.url))
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn request_body<'a>(
        &'a self,
        image: &Frame,
        mask: &GrayImage,
        strength: f64,
    ) -> Result<Img2ImgRequest<'a>, RefineError> {
        Ok(Img2ImgRequest {
            init_images: vec![encode_frame(image)?],
            mask: encode_png(&DynamicImage::ImageLuma8(mask.clone()))?,
            prompt: &self.config.prompt,
            negative_prompt: &self.config.negative_prompt,
            denoising_strength: strength.clamp(0.0, 1.0),
            sampler_name: &self.config.sampler_name,
            steps: self.config.steps,
            cfg_scale: self.config.cfg_scale,
            width: image.width(),
            height: image.height(),
            mask_blur: 4,
            inpainting_fill: 1,
            inpaint_full_res: true,
            inpaint_full_res_padding: 32,
        })
    }
}

impl EdgeRefiner for InpaintServiceRefiner {
    fn name(&self) -> &str {
        "inpaint-service"
    }

    fn refine(&self, image: &Frame, mask: &GrayImage, strength: f64) -> Result<Frame, RefineError> {
        if !self.is_available() {
            return Err(RefineError::Unavailable(format!(
                "no inpainting API at {}",
                self.config.url
            )));
        }

        let body = self.request_body(image, mask, strength)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| RefineError::Unavailable(e.to_string()))?;

        log::info!("Requesting inpainting from {}", self.config.url);
        let response = client
            .post(format!("{}/sdapi/v1/img2img", self.config.url))
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;
        let parsed: Img2ImgResponse = response.json().map_err(classify)?;

        decode_response(parsed, image.size())
    }
}

fn classify(e: reqwest::Error) -> RefineError {
    if e.is_timeout() {
        RefineError::Timeout
    } else if e.is_connect() {
        RefineError::Unavailable(e.to_string())
    } else {
        RefineError::InvalidResponse(e.to_string())
    }
}

fn encode_frame(frame: &Frame) -> Result<String, RefineError> {
    let rgb = frame.to_rgb();
    let img = RgbImage::from_raw(rgb.width(), rgb.height(), rgb.data().to_vec())
        .ok_or_else(|| RefineError::InvalidResponse("frame buffer does not match size".into()))?;
    encode_png(&DynamicImage::ImageRgb8(img))
}

fn encode_png(img: &DynamicImage) -> Result<String, RefineError> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| RefineError::InvalidResponse(format!("PNG encoding failed: {e}")))?;
    Ok(STANDARD.encode(bytes.into_inner()))
}

fn decode_response(response: Img2ImgResponse, size: (u32, u32)) -> Result<Frame, RefineError> {
    let first = response
        .images
        .into_iter()
        .next()
        .ok_or_else(|| RefineError::InvalidResponse("no image returned".into()))?;
    // Some servers prefix a data URL header.
    let payload = first.rsplit(',').next().unwrap_or(&first);
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| RefineError::InvalidResponse(format!("bad base64: {e}")))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| RefineError::InvalidResponse(format!("undecodable image: {e}")))?
        .to_rgb8();
    if img.dimensions() != size {
        return Err(RefineError::InvalidResponse(format!(
            "expected {}x{}, got {}x{}",
            size.0,
            size.1,
            img.width(),
            img.height()
        )));
    }
    Ok(Frame::from_rgb_image(img))
}
