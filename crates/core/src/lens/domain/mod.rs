pub mod lens_texture;
pub mod texture_extractor;
