//! Convenience shape outlines.
//!
//! tiny-skia has no arc primitives, so curved outlines are flattened to
//! cubic segments through kurbo first.

use kurbo::{PathEl, Shape};
use tiny_skia::{Path, PathBuilder};

/// Curve fitting tolerance in device pixels.
const TOLERANCE: f64 = 0.1;

fn to_path(shape: &impl Shape) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in shape.path_elements(TOLERANCE) {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

pub(crate) fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Option<Path> {
    let rect = tiny_skia::Rect::from_xywh(x, y, width, height)?;
    Some(PathBuilder::from_rect(rect))
}

/// Rectangle with corners rounded by `radius`, clamped to half the shorter side.
pub(crate) fn rounded_rectangle(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Option<Path> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let radius = radius.clamp(0.0, width.min(height) / 2.0);
    let rect = kurbo::RoundedRect::new(
        x as f64,
        y as f64,
        (x + width) as f64,
        (y + height) as f64,
        radius as f64,
    );
    to_path(&rect)
}

/// Ellipse inscribed in the given box.
pub(crate) fn ellipse(x: f32, y: f32, width: f32, height: f32) -> Option<Path> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let ellipse = kurbo::Ellipse::from_rect(kurbo::Rect::new(
        x as f64,
        y as f64,
        (x + width) as f64,
        (y + height) as f64,
    ));
    to_path(&ellipse)
}

/// Pie slice from `from_deg` to `to_deg`, angles clockwise from the x axis.
pub(crate) fn circle_sector(cx: f32, cy: f32, radius: f32, from_deg: f32, to_deg: f32) -> Option<Path> {
    if radius <= 0.0 {
        return None;
    }
    let mut sweep = (to_deg - from_deg) as f64;
    if sweep <= 0.0 {
        sweep += 360.0;
    }
    let sector = kurbo::CircleSegment::new(
        (cx as f64, cy as f64),
        radius as f64,
        0.0,
        (from_deg as f64).to_radians(),
        sweep.min(360.0).to_radians(),
    );
    to_path(&sector)
}

pub(crate) fn line(x0: f32, y0: f32, x1: f32, y1: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    pb.line_to(x1, y1);
    pb.finish()
}
