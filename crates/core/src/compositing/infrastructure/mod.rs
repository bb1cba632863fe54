pub mod color_recolorer;
pub mod dominant_color;
pub mod highlight_extractor;
pub mod perspective_warper;
pub mod texture_compositor;
