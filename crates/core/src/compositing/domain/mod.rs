pub mod blend_mode;
pub mod compositing_params;
pub mod iris_compositor;
