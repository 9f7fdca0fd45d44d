//! Feature rendering onto a graphics context.

use super::geometry::{Geometry, LineString, Point, Polygon};
use super::marks::mark_outline;
use super::processor::GeometryProcessor;
use super::symbolizer::{
    LabelPlacement, LineSymbolizer, PointGraphic, PointSymbolizer, PolygonSymbolizer,
    TextSymbolizer, VectorStyle,
};
use super::view::ViewTransform;
use crate::error::RenderResult;
use rastyle_canvas::{FillRule, GraphicsContext, LineCap, LineJoin, Rgba};

/// Screen-space tolerance used to generalize lines before warping labels.
const GENERALIZE_TOLERANCE: f64 = 2.0;

/// Draws one feature's geometry with its symbolizers.
///
/// Polygons are painted first, then lines, then points; labels always come
/// last so text sits above the geometry.
pub struct VectorFeatureRenderer<'a, G: GeometryProcessor + ?Sized> {
    view: ViewTransform,
    geometry: &'a G,
}

impl<'a, G: GeometryProcessor + ?Sized> VectorFeatureRenderer<'a, G> {
    pub fn new(view: ViewTransform, geometry: &'a G) -> Self {
        Self { view, geometry }
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn render(&self, ctx: &mut GraphicsContext, feature: &Geometry, style: &VectorStyle) -> RenderResult<()> {
        log::debug!(
            target: "vector",
            "feature with {} points, {} lines, {} polygons",
            feature.points.len(),
            feature.lines.len(),
            feature.polygons.len()
        );
        if let Some(symbolizer) = &style.polygon {
            for polygon in &feature.polygons {
                self.scoped(ctx, |r, ctx| r.draw_polygon(ctx, polygon, symbolizer))?;
            }
        }
        if let Some(symbolizer) = &style.line {
            for line in &feature.lines {
                self.scoped(ctx, |r, ctx| r.draw_line(ctx, line, symbolizer))?;
            }
        }
        if let Some(symbolizer) = &style.point {
            for point in &feature.points {
                self.scoped(ctx, |r, ctx| r.draw_point(ctx, point, symbolizer))?;
            }
        }
        if let Some(symbolizer) = &style.text {
            self.scoped(ctx, |r, ctx| r.draw_labels(ctx, feature, symbolizer))?;
        }
        Ok(())
    }

    /// Run `f` between save and restore so no pen, brush or transform leaks.
    fn scoped<F>(&self, ctx: &mut GraphicsContext, f: F) -> RenderResult<()>
    where
        F: FnOnce(&Self, &mut GraphicsContext) -> RenderResult<()>,
    {
        ctx.save();
        let result = f(self, ctx);
        ctx.restore();
        result
    }

    fn draw_polygon(&self, ctx: &mut GraphicsContext, polygon: &Polygon, symbolizer: &PolygonSymbolizer) -> RenderResult<()> {
        ctx.new_path();
        let mut traced = false;
        for ring in polygon.rings() {
            let pts = self.view.project(ring);
            if pts.len() < 3 {
                continue;
            }
            trace(ctx, &pts);
            ctx.close_subpath();
            traced = true;
        }
        if !traced {
            log::warn!(target: "vector", "degenerate polygon skipped");
            return Ok(());
        }
        ctx.set_fill_rule(FillRule::EvenOdd);
        if let Some(fill) = &symbolizer.fill {
            fill.apply(ctx)?;
            ctx.fill_path(symbolizer.stroke.is_some())?;
        }
        match &symbolizer.stroke {
            Some(stroke) => {
                stroke.apply(ctx)?;
                ctx.stroke_path(false)?;
            }
            None if symbolizer.fill.is_none() => ctx.new_path(),
            None => {}
        }
        Ok(())
    }

    fn draw_line(&self, ctx: &mut GraphicsContext, line: &LineString, symbolizer: &LineSymbolizer) -> RenderResult<()> {
        let mut pts = self.view.project(&line.points);
        if pts.len() < 2 || symbolizer.strokes.is_empty() {
            return Ok(());
        }
        if symbolizer.perpendicular_offset != 0.0 {
            pts = self.offset_screen(&pts, symbolizer.perpendicular_offset);
        }
        ctx.new_path();
        trace(ctx, &pts);
        let last = symbolizer.strokes.len() - 1;
        for (i, stroke) in symbolizer.strokes.iter().enumerate() {
            stroke.apply(ctx)?;
            ctx.stroke_path(i < last)?;
        }
        Ok(())
    }

    fn draw_point(&self, ctx: &mut GraphicsContext, point: &Point, symbolizer: &PointSymbolizer) -> RenderResult<()> {
        if symbolizer.size <= 0.0 {
            return Ok(());
        }
        let (x, y) = self.view.to_screen(point);
        let (x, y) = (x + symbolizer.displacement.0, y - symbolizer.displacement.1);
        let size = symbolizer.size;
        let (ax, ay) = symbolizer.anchor;
        match &symbolizer.graphic {
            PointGraphic::External(bitmap) => {
                let width = size * bitmap.width() as f32 / bitmap.height() as f32;
                ctx.draw_graphic_symbol(bitmap, width, size, x, y, symbolizer.rotation, ax, ay)?;
            }
            PointGraphic::Mark {
                shape,
                fill,
                stroke,
            } => {
                ctx.translate(x, y);
                ctx.rotate(symbolizer.rotation);
                ctx.translate(size * (0.5 - ax), size * (0.5 - ay));
                ctx.set_fill_rule(FillRule::NonZero);
                match fill {
                    Some(fill) => fill.apply(ctx)?,
                    None => ctx.set_brush(Rgba::TRANSPARENT),
                }
                match stroke {
                    Some(stroke) => stroke.apply(ctx)?,
                    None => ctx.set_solid_pen(Rgba::TRANSPARENT, 0.0, LineCap::Butt, LineJoin::Miter),
                }
                let outline = mark_outline(*shape, size);
                if outline.is_empty() {
                    ctx.draw_ellipse(-size / 2.0, -size / 2.0, size, size)?;
                    return Ok(());
                }
                ctx.new_path();
                for ring in &outline {
                    trace(ctx, ring);
                    ctx.close_subpath();
                }
                if fill.is_some() {
                    ctx.fill_path(stroke.is_some())?;
                }
                if stroke.is_some() {
                    ctx.stroke_path(false)?;
                }
                ctx.new_path();
            }
        }
        Ok(())
    }

    fn draw_labels(&self, ctx: &mut GraphicsContext, feature: &Geometry, symbolizer: &TextSymbolizer) -> RenderResult<()> {
        if symbolizer.label.trim().is_empty() {
            return Ok(());
        }
        ctx.set_font(symbolizer.font.clone());
        let label = symbolizer.label.as_str();
        match symbolizer.placement {
            LabelPlacement::Point {
                anchor,
                displacement,
                rotation,
            } => {
                for (x, y) in self.label_points(feature) {
                    ctx.draw_text(
                        label,
                        x + displacement.0,
                        y - displacement.1,
                        rotation,
                        anchor.0,
                        anchor.1,
                    )?;
                }
            }
            LabelPlacement::Line {
                aligned,
                perpendicular_offset,
                generalize,
            } => {
                let rings = feature.polygons.iter().map(|p| {
                    let mut ring = p.exterior.clone();
                    if let Some(first) = ring.first().copied() {
                        ring.push(first);
                    }
                    ring
                });
                let lines = feature.lines.iter().map(|l| l.points.clone()).chain(rings);
                for line in lines {
                    let mut pts = self.view.project(&line);
                    if pts.len() < 2 {
                        continue;
                    }
                    if generalize {
                        pts = from_points(&self.geometry.simplify(&to_points(&pts), GENERALIZE_TOLERANCE));
                    }
                    if perpendicular_offset != 0.0 {
                        pts = self.offset_screen(&pts, perpendicular_offset);
                    }
                    if aligned {
                        ctx.draw_text_along_path(label, &pts)?;
                    } else if let Some(mid) = self.geometry.interpolate(&to_points(&pts), 0.5) {
                        ctx.draw_text(label, mid.x as f32, mid.y as f32, 0.0, 0.5, 0.5)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Screen anchors for point placement: points themselves, line
    /// midpoints and polygon centroids.
    fn label_points(&self, feature: &Geometry) -> Vec<(f32, f32)> {
        let points = feature.points.iter().copied();
        let mids = feature
            .lines
            .iter()
            .filter_map(|l| self.geometry.interpolate(&l.points, 0.5));
        let centroids = feature
            .polygons
            .iter()
            .filter_map(|p| self.geometry.centroid(p));
        points
            .chain(mids)
            .chain(centroids)
            .map(|p| self.view.to_screen(&p))
            .collect()
    }

    /// Screen y grows downwards, so a visual left offset is a negative
    /// planar one.
    fn offset_screen(&self, pts: &[(f32, f32)], offset: f32) -> Vec<(f32, f32)> {
        from_points(&self.geometry.offset_curve(&to_points(pts), -(offset as f64)))
    }
}

fn trace(ctx: &mut GraphicsContext, pts: &[(f32, f32)]) {
    if let Some((&(x, y), rest)) = pts.split_first() {
        ctx.move_to(x, y);
        for &(x, y) in rest {
            ctx.line_to(x, y);
        }
    }
}

fn to_points(pts: &[(f32, f32)]) -> Vec<Point> {
    pts.iter()
        .map(|&(x, y)| Point::new(x as f64, y as f64))
        .collect()
}

fn from_points(pts: &[Point]) -> Vec<(f32, f32)> {
    pts.iter().map(|p| (p.x as f32, p.y as f32)).collect()
}
