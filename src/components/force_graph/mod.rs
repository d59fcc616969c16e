mod component;
mod fetch;
mod render;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use types::GraphSource;
