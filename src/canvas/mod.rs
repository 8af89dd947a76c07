pub mod colors;
pub mod coordinates;
pub mod overlay_renderer;
pub mod transform;
