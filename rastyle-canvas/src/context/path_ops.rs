//! Path building and painting for GraphicsContext.

use super::GraphicsContext;
use crate::error::GraphicsResult;
use crate::shapes;
use crate::surface::svg::transform_scale;

impl GraphicsContext {
    /// Discard the pending path.
    pub fn new_path(&mut self) {
        self.path_builder = tiny_skia::PathBuilder::new();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.move_to(tx, ty);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.line_to(tx, ty);
    }

    pub fn close_subpath(&mut self) {
        self.path_builder.close();
    }

    /// Fill the pending path with the current brush and fill rule. With
    /// `preserve` the path stays available for a following stroke.
    pub fn fill_path(&mut self, preserve: bool) -> GraphicsResult<()> {
        log::debug!(target: "canvas", "fill_path preserve={}", preserve);
        let path = self.take_path(preserve);
        if let Some(path) = path {
            self.surface
                .fill_path(&path, &self.state.brush.paint, self.state.fill_rule)?;
        }
        Ok(())
    }

    /// Stroke the pending path with the current pen.
    pub fn stroke_path(&mut self, preserve: bool) -> GraphicsResult<()> {
        log::debug!(target: "canvas", "stroke_path preserve={}", preserve);
        let path = self.take_path(preserve);
        if let Some(path) = path {
            let scale = transform_scale(&self.state.transform);
            self.surface.stroke_path(&path, &self.state.pen, scale)?;
        }
        Ok(())
    }

    fn take_path(&mut self, preserve: bool) -> Option<tiny_skia::Path> {
        if preserve {
            self.path_builder.clone().finish()
        } else {
            std::mem::replace(&mut self.path_builder, tiny_skia::PathBuilder::new()).finish()
        }
    }

    // --- Convenience shapes: brush first, then pen ---

    pub fn draw_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) -> GraphicsResult<()> {
        log::debug!(target: "canvas", "rectangle {} {} {} {}", x, y, width, height);
        self.fill_and_stroke(shapes::rectangle(x, y, width, height))
    }

    pub fn draw_rounded_rectangle(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
    ) -> GraphicsResult<()> {
        self.fill_and_stroke(shapes::rounded_rectangle(x, y, width, height, radius))
    }

    /// Ellipse inscribed in the given box.
    pub fn draw_ellipse(&mut self, x: f32, y: f32, width: f32, height: f32) -> GraphicsResult<()> {
        self.fill_and_stroke(shapes::ellipse(x, y, width, height))
    }

    /// Pie slice; angles in degrees, clockwise from the positive x axis.
    pub fn draw_circle_sector(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        from_angle: f32,
        to_angle: f32,
    ) -> GraphicsResult<()> {
        self.fill_and_stroke(shapes::circle_sector(
            center_x, center_y, radius, from_angle, to_angle,
        ))
    }

    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> GraphicsResult<()> {
        self.fill_and_stroke(shapes::line(x0, y0, x1, y1))
    }

    /// Shapes start a fresh path and leave none pending.
    fn fill_and_stroke(&mut self, path: Option<tiny_skia::Path>) -> GraphicsResult<()> {
        self.new_path();
        let Some(path) = path.and_then(|p| p.transform(self.state.transform)) else {
            log::debug!(target: "canvas", "degenerate shape skipped");
            return Ok(());
        };
        self.surface
            .fill_path(&path, &self.state.brush.paint, self.state.fill_rule)?;
        let scale = transform_scale(&self.state.transform);
        self.surface.stroke_path(&path, &self.state.pen, scale)
    }
}
