//! Map to screen coordinate transform.

use super::geometry::Point;
use crate::error::{RenderError, RenderResult};
use crate::storage::Extent;

/// Maps an extent onto a `width`×`height` canvas with y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    extent: Extent,
    x_res: f64,
    y_res: f64,
    height: u32,
}

impl ViewTransform {
    pub fn new(extent: Extent, width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 || extent.is_empty() {
            return Err(RenderError::InvalidRequest(format!(
                "cannot map {:?} onto {}x{}",
                extent, width, height
            )));
        }
        Ok(Self {
            extent,
            x_res: extent.width() / width as f64,
            y_res: extent.height() / height as f64,
            height,
        })
    }

    pub fn x_res(&self) -> f64 {
        self.x_res
    }

    pub fn y_res(&self) -> f64 {
        self.y_res
    }

    pub fn to_screen(&self, point: &Point) -> (f32, f32) {
        let x = (point.x - self.extent.minx) / self.x_res;
        let y = self.height as f64 - (point.y - self.extent.miny) / self.y_res;
        (x as f32, y as f32)
    }

    /// Screen vertices of `points`, with consecutive duplicates dropped.
    pub fn project(&self, points: &[Point]) -> Vec<(f32, f32)> {
        let mut out: Vec<(f32, f32)> = Vec::with_capacity(points.len());
        for p in points {
            let sp = self.to_screen(p);
            if out.last() != Some(&sp) {
                out.push(sp);
            }
        }
        out
    }
}
