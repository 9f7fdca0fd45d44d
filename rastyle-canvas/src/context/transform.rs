//! Transform operations for GraphicsContext.

use super::GraphicsContext;
use tiny_skia::Transform;

impl GraphicsContext {
    pub fn translate(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "translate {} {}", x, y);
        self.state.transform = self.state.transform.pre_translate(x, y);
    }

    /// Rotate by `degrees`, clockwise on screen.
    pub fn rotate(&mut self, degrees: f32) {
        log::debug!(target: "canvas", "rotate {}", degrees);
        self.state.transform = self.state.transform.pre_concat(Transform::from_rotate(degrees));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        log::debug!(target: "canvas", "scale {} {}", sx, sy);
        self.state.transform = self.state.transform.pre_scale(sx, sy);
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = Transform::identity();
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub(crate) fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let t = &self.state.transform;
        (t.sx * x + t.kx * y + t.tx, t.ky * x + t.sy * y + t.ty)
    }
}
