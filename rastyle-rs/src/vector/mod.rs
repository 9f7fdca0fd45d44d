//! Symbolized vector features: polygons, lines, point marks and labels.

mod geometry;
mod marks;
mod processor;
mod renderer;
mod symbolizer;
mod view;

pub use geometry::{Geometry, LineString, Point, Polygon};
pub use processor::{GeometryProcessor, PlanarGeometry};
pub use renderer::VectorFeatureRenderer;
pub use symbolizer::{
    Fill, LabelPlacement, LineSymbolizer, MarkShape, MultiStroke, MultiStrokeBuilder,
    PointGraphic, PointSymbolizer, PolygonSymbolizer, Stroke, StrokePaint, TextSymbolizer,
    VectorStyle,
};
pub use view::ViewTransform;
