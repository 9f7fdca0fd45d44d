//! Raster layer rendering and compositing.

mod compositor;
mod convert;
mod layer;
pub mod relief;

pub use compositor::{Composite, GroupCompositor};
pub use layer::{CompositionRequest, RasterLayer, RasterLayerRenderer};
