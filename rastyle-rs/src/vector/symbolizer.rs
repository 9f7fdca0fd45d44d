//! Vector feature symbolizers.

use crate::error::RenderResult;
use rastyle_canvas::{
    parse_dash_list, Bitmap, Font, GraphicsContext, LineCap, LineJoin, LinearGradient, Paint,
    Pattern, Rgba,
};
use std::sync::Arc;

/// Paint source of a stroke.
#[derive(Debug, Clone)]
pub enum StrokePaint {
    Solid(Rgba),
    Gradient(LinearGradient),
    Pattern(Arc<Pattern>),
}

/// One pen applied to a path.
#[derive(Debug, Clone)]
pub struct Stroke {
    pub paint: StrokePaint,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub dash: Vec<f32>,
    pub dash_offset: f32,
}

impl Stroke {
    pub fn solid(color: Rgba, width: f32) -> Self {
        Self {
            paint: StrokePaint::Solid(color),
            width,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }

    /// Solid stroke from a CSS color string.
    pub fn css(color: &str, width: f32) -> RenderResult<Self> {
        Ok(Self::solid(Rgba::parse(color)?, width))
    }

    pub fn gradient(gradient: LinearGradient, width: f32) -> Self {
        Self {
            paint: StrokePaint::Gradient(gradient),
            ..Self::solid(Rgba::BLACK, width)
        }
    }

    pub fn pattern(pattern: Arc<Pattern>, width: f32) -> Self {
        Self {
            paint: StrokePaint::Pattern(pattern),
            ..Self::solid(Rgba::BLACK, width)
        }
    }

    pub fn with_cap_join(mut self, cap: LineCap, join: LineJoin) -> Self {
        self.cap = cap;
        self.join = join;
        self
    }

    pub fn with_dash(mut self, dash: Vec<f32>, offset: f32) -> Self {
        self.dash = dash;
        self.dash_offset = offset;
        self
    }

    /// Dash list in SLD `stroke-dasharray` form, e.g. `"8 4"`.
    pub fn with_dash_str(self, dash: &str, offset: f32) -> RenderResult<Self> {
        let dash = parse_dash_list(dash)?;
        Ok(self.with_dash(dash, offset))
    }

    /// Select this stroke as the context pen.
    pub(crate) fn apply(&self, ctx: &mut GraphicsContext) -> RenderResult<()> {
        let color = match self.paint {
            StrokePaint::Solid(color) => color,
            _ => Rgba::BLACK,
        };
        ctx.set_dashed_pen(
            color,
            self.width,
            self.cap,
            self.join,
            &self.dash,
            self.dash_offset,
        )?;
        let paint = match &self.paint {
            StrokePaint::Solid(_) => return Ok(()),
            StrokePaint::Gradient(gradient) => Paint::LinearGradient(gradient.clone()),
            StrokePaint::Pattern(pattern) => Paint::Pattern(Arc::clone(pattern)),
        };
        let mut pen = ctx.pen().clone();
        pen.paint = paint;
        ctx.set_pen_state(pen);
        Ok(())
    }
}

/// Ordered pens drawn over the same path, bottom first (casings, rails).
#[derive(Debug, Clone, Default)]
pub struct MultiStroke {
    strokes: Vec<Stroke>,
}

impl MultiStroke {
    pub fn builder() -> MultiStrokeBuilder {
        MultiStrokeBuilder::default()
    }

    pub fn single(stroke: Stroke) -> Self {
        Self {
            strokes: vec![stroke],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stroke> {
        self.strokes.iter()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct MultiStrokeBuilder {
    strokes: Vec<Stroke>,
}

impl MultiStrokeBuilder {
    pub fn stroke(mut self, stroke: Stroke) -> Self {
        self.strokes.push(stroke);
        self
    }

    pub fn build(self) -> MultiStroke {
        MultiStroke {
            strokes: self.strokes,
        }
    }
}

/// Polygon interior paint.
#[derive(Debug, Clone)]
pub enum Fill {
    Solid(Rgba),
    Pattern(Arc<Pattern>),
    /// External graphic tiled over the interior.
    Graphic(Bitmap),
}

impl Fill {
    pub(crate) fn apply(&self, ctx: &mut GraphicsContext) -> RenderResult<()> {
        match self {
            Fill::Solid(color) => ctx.set_brush(*color),
            Fill::Pattern(pattern) => ctx.set_pattern_brush(Arc::clone(pattern)),
            Fill::Graphic(bitmap) => {
                ctx.set_pattern_brush(Arc::new(Pattern::from_bitmap(bitmap, true)?))
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PolygonSymbolizer {
    pub fill: Option<Fill>,
    /// Any stroke paint, gradients included.
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, Default)]
pub struct LineSymbolizer {
    pub strokes: MultiStroke,
    /// Pixels to the left of the line direction; negative moves right.
    pub perpendicular_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkShape {
    Square,
    Circle,
    Triangle,
    Star,
    Cross,
    X,
}

impl MarkShape {
    /// Parse an SLD well-known mark name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "square" => Some(MarkShape::Square),
            "circle" => Some(MarkShape::Circle),
            "triangle" => Some(MarkShape::Triangle),
            "star" => Some(MarkShape::Star),
            "cross" => Some(MarkShape::Cross),
            "x" => Some(MarkShape::X),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PointGraphic {
    Mark {
        shape: MarkShape,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    External(Bitmap),
}

#[derive(Debug, Clone)]
pub struct PointSymbolizer {
    pub graphic: PointGraphic,
    /// Symbol size in pixels.
    pub size: f32,
    /// Degrees, clockwise.
    pub rotation: f32,
    /// Fractional point of the symbol placed on the feature; (0.5, 0.5) centres it.
    pub anchor: (f32, f32),
    /// Pixel displacement, x right and y up.
    pub displacement: (f32, f32),
}

impl PointSymbolizer {
    pub fn mark(shape: MarkShape, size: f32, fill: Option<Fill>, stroke: Option<Stroke>) -> Self {
        Self {
            graphic: PointGraphic::Mark {
                shape,
                fill,
                stroke,
            },
            size,
            rotation: 0.0,
            anchor: (0.5, 0.5),
            displacement: (0.0, 0.0),
        }
    }

    pub fn external(bitmap: Bitmap, size: f32) -> Self {
        Self {
            graphic: PointGraphic::External(bitmap),
            size,
            rotation: 0.0,
            anchor: (0.5, 0.5),
            displacement: (0.0, 0.0),
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor = (x, y);
        self
    }

    pub fn with_displacement(mut self, dx: f32, dy: f32) -> Self {
        self.displacement = (dx, dy);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LabelPlacement {
    Point {
        /// (0, 0) bottom-left to (1, 1) top-right of the label box.
        anchor: (f32, f32),
        /// Pixel displacement, x right and y up.
        displacement: (f32, f32),
        rotation: f32,
    },
    Line {
        /// Warp the label along the line instead of one horizontal label.
        aligned: bool,
        perpendicular_offset: f32,
        /// Simplify the line before warping text along it.
        generalize: bool,
    },
}

impl Default for LabelPlacement {
    fn default() -> Self {
        LabelPlacement::Point {
            anchor: (0.5, 0.5),
            displacement: (0.0, 0.0),
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextSymbolizer {
    pub label: String,
    pub font: Font,
    pub placement: LabelPlacement,
}

impl TextSymbolizer {
    pub fn new(label: impl Into<String>, font: Font) -> Self {
        Self {
            label: label.into(),
            font,
            placement: LabelPlacement::default(),
        }
    }

    pub fn with_placement(mut self, placement: LabelPlacement) -> Self {
        self.placement = placement;
        self
    }
}

/// Symbolizers for one feature; any may be absent.
#[derive(Debug, Clone, Default)]
pub struct VectorStyle {
    pub polygon: Option<PolygonSymbolizer>,
    pub line: Option<LineSymbolizer>,
    pub point: Option<PointSymbolizer>,
    pub text: Option<TextSymbolizer>,
}
