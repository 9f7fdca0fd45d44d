//! Styled raster and vector map compositing.
//!
//! Raster layers are fetched from a [`RasterStore`] at the best matching
//! resolution, converted to RGBA, rescaled to the requested canvas and
//! painted in order by the [`GroupCompositor`]. Shaded relief layers
//! darken the finished canvas instead of painting. Vector features are
//! drawn onto a [`rastyle_canvas::GraphicsContext`] by the
//! [`VectorFeatureRenderer`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rastyle::{CompositionRequest, Extent, GroupCompositor, RasterLayer, RenderConfig, StandardEncoder};
//!
//! let config = RenderConfig::default();
//! let compositor = GroupCompositor::new(&store, &StandardEncoder, &config);
//! let request = CompositionRequest::new(256, 256, Extent::new(0.0, 0.0, 1000.0, 1000.0));
//! let png = compositor.composite(&[RasterLayer::new("dem", Default::default())], &request)?;
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod raster;
pub mod storage;
pub mod symbolizer;
pub mod vector;

pub use rastyle_canvas as canvas;

pub use config::{FontSettings, ReliefConfig, RenderConfig};
pub use encoder::{EncodeInput, Encoder, OutputFormat, StandardEncoder};
pub use error::{RenderError, RenderResult};
pub use raster::{Composite, CompositionRequest, GroupCompositor, RasterLayer, RasterLayerRenderer};
pub use storage::{
    BandStatistics, CoverageInfo, ElevationGrid, Extent, PixelKind, RasterRequest, RasterStore, RawRaster,
    ResolutionLevel, Samples, Scale, Section,
};
pub use symbolizer::{
    promote_pixel_kind, BandSelection, ColorMap, ColorMapEntry, RasterSymbolizer, ShadedRelief,
};
pub use vector::{GeometryProcessor, PlanarGeometry, VectorFeatureRenderer, VectorStyle, ViewTransform};
