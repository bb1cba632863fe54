pub mod color;
pub mod constants;
pub mod error;
pub mod frame;
pub mod gaussian;
pub mod mask;
pub mod pixel_rect;
