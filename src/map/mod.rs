mod geometry;
pub mod palette;
mod projection;
mod renderer;
mod spatial;

pub use projection::Viewport;
pub use renderer::{ChoroplethRenderer, Highlight, MapLayers};
