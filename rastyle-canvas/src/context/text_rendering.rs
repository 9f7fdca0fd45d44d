//! Label rendering for GraphicsContext.
//!
//! Text is always painted as glyph outlines, so every surface kind renders
//! it through the same fill and stroke primitives.

use super::GraphicsContext;
use crate::error::GraphicsResult;
use crate::font::Font;
use crate::paint::{Paint, Pen};
use crate::style::{FillRule, LineCap, LineJoin};
use crate::surface::svg::transform_scale;
use crate::text::{ShapedText, TextExtent};
use tiny_skia::Transform;

impl GraphicsContext {
    /// Measure `text` in the current font.
    pub fn text_extent(&mut self, text: &str) -> GraphicsResult<TextExtent> {
        let font = self.state.font.clone();
        Ok(self.text_engine().shape(text, &font)?.extent)
    }

    /// Draw `text` rotated by `angle` degrees about (x, y).
    ///
    /// (anchor_x, anchor_y) is the fractional point of the text box placed on
    /// (x, y): (0, 0) is bottom-left, (0.5, 0.5) the centre, (1, 1) top-right.
    pub fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        angle: f32,
        anchor_x: f32,
        anchor_y: f32,
    ) -> GraphicsResult<()> {
        log::debug!(target: "canvas", "draw_text \"{}\" at {} {} angle {}", text, x, y, angle);
        let font = self.state.font.clone();
        let shaped = self.text_engine().shape(text, &font)?;
        if shaped.glyphs.is_empty() {
            return Ok(());
        }
        let extent = shaped.extent;
        let origin = self
            .state
            .transform
            .pre_translate(x, y)
            .pre_concat(Transform::from_rotate(angle))
            .pre_translate(
                -extent.width * anchor_x,
                extent.height * anchor_y - extent.descent,
            );
        let placed: Vec<Transform> = shaped
            .glyphs
            .iter()
            .map(|glyph| origin.pre_translate(glyph.x, glyph.y))
            .collect();
        self.paint_glyphs(&shaped, &placed, &font)
    }

    /// Draw `text` along a polyline, each glyph centred on the line and
    /// rotated to follow it.
    ///
    /// The label is centred on the line and reads left to right; nothing is
    /// drawn when the line is shorter than the text.
    pub fn draw_text_along_path(&mut self, text: &str, points: &[(f32, f32)]) -> GraphicsResult<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let font = self.state.font.clone();
        let shaped = self.text_engine().shape(text, &font)?;
        if shaped.glyphs.is_empty() {
            return Ok(());
        }

        let mut line: Vec<(f32, f32)> = points.to_vec();
        if let (Some(first), Some(last)) = (line.first(), line.last()) {
            if first.0 > last.0 {
                line.reverse();
            }
        }
        let length = polyline_length(&line);
        let extent = shaped.extent;
        if length < extent.width {
            log::debug!(
                target: "canvas",
                "line too short for \"{}\" ({} < {})",
                text,
                length,
                extent.width
            );
            return Ok(());
        }

        let start = (length - extent.width) / 2.0;
        let baseline = (extent.ascent - extent.descent) / 2.0;
        let mut placed = Vec::with_capacity(shaped.glyphs.len());
        for glyph in &shaped.glyphs {
            let half = glyph.advance / 2.0;
            let ((px, py), angle) = point_along(&line, start + glyph.x + half);
            placed.push(
                self.state
                    .transform
                    .pre_translate(px, py)
                    .pre_concat(Transform::from_rotate(angle))
                    .pre_translate(-half, baseline + glyph.y),
            );
        }
        self.paint_glyphs(&shaped, &placed, &font)
    }

    /// Halo strokes first for all glyphs, then fills, so halos never cover
    /// neighbouring glyphs.
    fn paint_glyphs(
        &mut self,
        shaped: &ShapedText,
        placed: &[Transform],
        font: &Font,
    ) -> GraphicsResult<()> {
        let paths: Vec<tiny_skia::Path> = shaped
            .glyphs
            .iter()
            .zip(placed)
            .filter_map(|(glyph, transform)| glyph.path.clone()?.transform(*transform))
            .collect();

        if let Some(halo) = font.halo {
            let pen = Pen {
                paint: Paint::Solid(halo.color),
                width: halo.radius * 2.0,
                cap: LineCap::Round,
                join: LineJoin::Round,
                ..Pen::default()
            };
            let scale = transform_scale(&self.state.transform);
            for path in &paths {
                self.surface.stroke_path(path, &pen, scale)?;
            }
        }
        let fill = Paint::Solid(font.fill);
        for path in &paths {
            self.surface.fill_path(path, &fill, FillRule::NonZero)?;
        }
        Ok(())
    }
}

fn polyline_length(points: &[(f32, f32)]) -> f32 {
    points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
        .sum()
}

/// Point at arc length `distance` and the direction (degrees) of the segment
/// containing it. Distances past the end extrapolate along the last segment.
fn point_along(points: &[(f32, f32)], distance: f32) -> ((f32, f32), f32) {
    let mut remaining = distance.max(0.0);
    let mut last = ((points[0].0, points[0].1), 0.0);
    for w in points.windows(2) {
        let (dx, dy) = (w[1].0 - w[0].0, w[1].1 - w[0].1);
        let seg = dx.hypot(dy);
        if seg == 0.0 {
            continue;
        }
        let angle = dy.atan2(dx).to_degrees();
        if remaining <= seg {
            let t = remaining / seg;
            return ((w[0].0 + dx * t, w[0].1 + dy * t), angle);
        }
        remaining -= seg;
        last = ((w[1].0 + dx / seg * remaining, w[1].1 + dy / seg * remaining), angle);
    }
    last
}
