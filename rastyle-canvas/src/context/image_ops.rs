//! Bitmap drawing and pixel readback for GraphicsContext.

use super::GraphicsContext;
use crate::bitmap::{pixmap_to_png, pixmap_to_rgba, Bitmap};
use crate::error::{GraphicsError, GraphicsResult};
use tiny_skia::Transform;

impl GraphicsContext {
    /// Paint a bitmap with its top-left corner at (x, y).
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, x: f32, y: f32) -> GraphicsResult<()> {
        log::debug!(target: "canvas", "draw_bitmap {}x{} at {} {}", bitmap.width(), bitmap.height(), x, y);
        let transform = self.state.transform.pre_translate(x, y);
        self.paint_bitmap(bitmap, transform)
    }

    /// Paint a bitmap scaled by (scale_x, scale_y) with its top-left corner
    /// at (x, y), resampled with the current image quality.
    pub fn draw_rescaled_bitmap(
        &mut self,
        bitmap: &Bitmap,
        scale_x: f32,
        scale_y: f32,
        x: f32,
        y: f32,
    ) -> GraphicsResult<()> {
        log::debug!(
            target: "canvas",
            "draw_rescaled_bitmap {}x{} scale {} {}",
            bitmap.width(),
            bitmap.height(),
            scale_x,
            scale_y
        );
        if !(scale_x.is_finite() && scale_y.is_finite()) || scale_x <= 0.0 || scale_y <= 0.0 {
            return Err(GraphicsError::InvalidArgument(format!(
                "invalid bitmap scale {} x {}",
                scale_x, scale_y
            )));
        }
        let transform = self
            .state
            .transform
            .pre_translate(x, y)
            .pre_scale(scale_x, scale_y);
        self.paint_bitmap(bitmap, transform)
    }

    /// Stamp a bitmap as a `width`×`height` symbol rotated by `angle`
    /// degrees about (x, y). The anchor is the fractional point of the
    /// symbol box placed on (x, y); (0.5, 0.5) centres it.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_graphic_symbol(
        &mut self,
        bitmap: &Bitmap,
        width: f32,
        height: f32,
        x: f32,
        y: f32,
        angle: f32,
        anchor_x: f32,
        anchor_y: f32,
    ) -> GraphicsResult<()> {
        if width <= 0.0 || height <= 0.0 {
            return Ok(());
        }
        let transform = self
            .state
            .transform
            .pre_translate(x, y)
            .pre_concat(Transform::from_rotate(angle))
            .pre_translate(-width * anchor_x, -height * anchor_y)
            .pre_scale(
                width / bitmap.width() as f32,
                height / bitmap.height() as f32,
            );
        self.paint_bitmap(bitmap, transform)
    }

    fn paint_bitmap(&mut self, bitmap: &Bitmap, transform: Transform) -> GraphicsResult<()> {
        let quality = self.state.image_quality.into();
        self.surface
            .draw_pixmap(bitmap.pixmap(), transform, quality, 1.0)
    }

    /// Non-premultiplied RGBA of a bitmap surface.
    pub fn get_rgba_array(&self) -> GraphicsResult<Vec<u8>> {
        Ok(pixmap_to_rgba(self.surface.pixmap()?))
    }

    /// RGB plane of a bitmap surface; fully transparent pixels read as black.
    pub fn get_rgb_array(&self) -> GraphicsResult<Vec<u8>> {
        let rgba = self.get_rgba_array()?;
        Ok(rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect())
    }

    pub fn get_alpha_array(&self) -> GraphicsResult<Vec<u8>> {
        let pixmap = self.surface.pixmap()?;
        Ok(pixmap.pixels().iter().map(|p| p.alpha()).collect())
    }

    /// Encode the bitmap surface as PNG.
    pub fn to_png(&self) -> GraphicsResult<Vec<u8>> {
        pixmap_to_png(self.surface.pixmap()?)
    }

    /// Replace every pixel of a bitmap surface, e.g. to prime a background.
    pub fn fill_background(&mut self, color: crate::color::Rgba) -> GraphicsResult<()> {
        self.surface.pixmap_mut()?.fill(color.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::style::ImageQuality;

    fn checker() -> Bitmap {
        // 2x2: red, green / blue, transparent
        #[rustfmt::skip]
        let data = [
            255, 0, 0, 255,   0, 255, 0, 255,
            0, 0, 255, 255,   0, 0, 0, 0,
        ];
        Bitmap::from_rgba(&data, 2, 2).unwrap()
    }

    #[test]
    fn test_draw_bitmap_offsets() {
        let mut ctx = GraphicsContext::new_bitmap(4, 4).unwrap();
        ctx.set_image_quality(ImageQuality::Nearest);
        ctx.draw_bitmap(&checker(), 2.0, 2.0).unwrap();
        let rgb = ctx.get_rgb_array().unwrap();
        let alpha = ctx.get_alpha_array().unwrap();
        assert_eq!(&rgb[(2 * 4 + 2) * 3..(2 * 4 + 2) * 3 + 3], &[255, 0, 0]);
        assert_eq!(alpha[0], 0);
        assert_eq!(alpha[3 * 4 + 3], 0);
    }

    #[test]
    fn test_rescaled_nearest_replicates_pixels() {
        let mut ctx = GraphicsContext::new_bitmap(4, 4).unwrap();
        ctx.set_image_quality(ImageQuality::Nearest);
        ctx.draw_rescaled_bitmap(&checker(), 2.0, 2.0, 0.0, 0.0).unwrap();
        let rgba = ctx.get_rgba_array().unwrap();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let i = (y * 4 + x) * 4;
            assert_eq!(&rgba[i..i + 4], &[255, 0, 0, 255]);
        }
        let i = (3 * 4 + 3) * 4;
        assert_eq!(rgba[i + 3], 0);
    }

    #[test]
    fn test_rescale_rejects_zero_scale() {
        let mut ctx = GraphicsContext::new_bitmap(4, 4).unwrap();
        assert!(ctx.draw_rescaled_bitmap(&checker(), 0.0, 1.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_graphic_symbol_centred() {
        let solid = Bitmap::from_rgba(&[0, 0, 0, 255].repeat(4), 2, 2).unwrap();
        let mut ctx = GraphicsContext::new_bitmap(20, 20).unwrap();
        ctx.set_image_quality(ImageQuality::Nearest);
        ctx.draw_graphic_symbol(&solid, 6.0, 6.0, 10.0, 10.0, 0.0, 0.5, 0.5)
            .unwrap();
        let alpha = ctx.get_alpha_array().unwrap();
        assert_eq!(alpha[10 * 20 + 10], 255);
        assert_eq!(alpha[8 * 20 + 8], 255);
        assert_eq!(alpha[5 * 20 + 5], 0);
        assert_eq!(alpha[14 * 20 + 14], 0);
    }

    #[test]
    fn test_fill_background() {
        let mut ctx = GraphicsContext::new_bitmap(2, 2).unwrap();
        ctx.fill_background(Rgba::opaque(200, 200, 200)).unwrap();
        assert_eq!(ctx.get_rgb_array().unwrap(), vec![200; 12]);
    }
}
