//! Pen and brush state: solid colors, linear gradients and patterns.

use crate::color::Rgba;
use crate::pattern::Pattern;
use crate::style::{LineCap, LineJoin};
use std::sync::Arc;
use tiny_skia::{Shader, SpreadMode, Transform};

/// A two-stop linear gradient spanning an axis-aligned rectangle, from its
/// top-left corner to its bottom-right corner.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub start: Rgba,
    pub end: Rgba,
}

impl LinearGradient {
    pub fn start_point(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn end_point(&self) -> (f32, f32) {
        (self.x + self.width, self.y + self.height)
    }
}

/// Paint source shared by pens and brushes.
#[derive(Debug, Clone)]
pub enum Paint {
    Solid(Rgba),
    LinearGradient(LinearGradient),
    /// Borrowed pattern; the context never owns it.
    Pattern(Arc<Pattern>),
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Rgba::BLACK)
    }
}

impl Paint {
    /// Build the rasterizer shader for this paint in device space.
    pub(crate) fn shader(&self) -> Option<Shader<'_>> {
        match self {
            Paint::Solid(color) => Some(Shader::SolidColor((*color).into())),
            Paint::LinearGradient(gradient) => {
                let (x0, y0) = gradient.start_point();
                let (x1, y1) = gradient.end_point();
                tiny_skia::LinearGradient::new(
                    tiny_skia::Point { x: x0, y: y0 },
                    tiny_skia::Point { x: x1, y: y1 },
                    vec![
                        tiny_skia::GradientStop::new(0.0, gradient.start.into()),
                        tiny_skia::GradientStop::new(1.0, gradient.end.into()),
                    ],
                    SpreadMode::Pad,
                    Transform::identity(),
                )
            }
            Paint::Pattern(pattern) => Some(pattern.shader(Transform::identity())),
        }
    }

    pub(crate) fn is_pattern(&self) -> bool {
        matches!(self, Paint::Pattern(_))
    }
}

/// Stroke state of a graphics context.
#[derive(Debug, Clone)]
pub struct Pen {
    pub paint: Paint,
    pub width: f32,
    /// Ordered on/off lengths; empty means solid.
    pub dash: Vec<f32>,
    pub dash_offset: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            paint: Paint::default(),
            width: 1.0,
            dash: Vec::new(),
            dash_offset: 0.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
        }
    }
}

impl Pen {
    /// Same pen with width and dash lengths multiplied by `scale`.
    pub(crate) fn scaled(&self, scale: f32) -> Pen {
        Pen {
            width: self.width * scale,
            dash: self.dash.iter().map(|d| d * scale).collect(),
            dash_offset: self.dash_offset * scale,
            ..self.clone()
        }
    }

    pub(crate) fn stroke(&self) -> tiny_skia::Stroke {
        tiny_skia::Stroke {
            width: self.width,
            line_cap: self.cap.into(),
            line_join: self.join.into(),
            miter_limit: 10.0,
            dash: if self.dash.is_empty() {
                None
            } else {
                tiny_skia::StrokeDash::new(self.dash.clone(), self.dash_offset)
            },
        }
    }
}

/// Fill state of a graphics context.
#[derive(Debug, Clone, Default)]
pub struct Brush {
    pub paint: Paint,
}
