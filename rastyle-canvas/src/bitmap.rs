//! Symbol bitmaps and straight/premultiplied pixel helpers.

use crate::error::{GraphicsError, GraphicsResult};
use crate::pixel::endian;
use tiny_skia::{IntSize, Pixmap, PremultipliedColorU8};

/// An RGBA image that can be stamped onto a graphics context.
///
/// The pixel data is kept premultiplied, which is what the rasterizer consumes
/// directly when the bitmap is painted or used as a paint source.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pixmap: Pixmap,
}

impl Bitmap {
    /// Create a bitmap from straight-alpha RGBA bytes (4 bytes per pixel).
    pub fn from_rgba(data: &[u8], width: u32, height: u32) -> GraphicsResult<Self> {
        Ok(Self {
            pixmap: pixmap_from_rgba(data, width, height)?,
        })
    }

    /// Create a bitmap from premultiplied ARGB words in native byte order.
    ///
    /// This is the in-memory layout of 32-bit image surfaces in native 2D
    /// libraries; the conversion goes through [`endian`] so that the result is
    /// independent of the host byte order.
    pub fn from_native_argb32(words: &[u32], width: u32, height: u32) -> GraphicsResult<Self> {
        check_len(words.len(), width, height, 1)?;
        let size = IntSize::from_wh(width, height)
            .ok_or(GraphicsError::InvalidDimensions { width, height })?;
        let mut data = Vec::with_capacity(words.len() * 4);
        for word in words {
            let [a, r, g, b] = endian::argb32_to_bytes(*word);
            // Premultiplied input: clamp channels that exceed alpha
            data.extend_from_slice(&[r.min(a), g.min(a), b.min(a), a]);
        }
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or(GraphicsError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap })
    }

    /// Create a bitmap from the raw memory bytes of a native ARGB32 surface,
    /// 4 bytes per pixel in host byte order.
    pub fn from_native_bytes(bytes: &[u8], width: u32, height: u32) -> GraphicsResult<Self> {
        check_len(bytes.len(), width, height, 4)?;
        let size = IntSize::from_wh(width, height)
            .ok_or(GraphicsError::InvalidDimensions { width, height })?;
        let mut data = Vec::with_capacity(bytes.len());
        for px in bytes.chunks_exact(4) {
            let [r, g, b, a] = endian::read_native_pixel(&[px[0], px[1], px[2], px[3]]);
            data.extend_from_slice(&[r.min(a), g.min(a), b.min(a), a]);
        }
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or(GraphicsError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap })
    }

    pub(crate) fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA copy of the bitmap content.
    pub fn to_rgba(&self) -> Vec<u8> {
        pixmap_to_rgba(&self.pixmap)
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

fn check_len(len: usize, width: u32, height: u32, unit: usize) -> GraphicsResult<()> {
    if width == 0 || height == 0 {
        return Err(GraphicsError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * unit;
    if len != expected {
        return Err(GraphicsError::InvalidArgument(format!(
            "Data length {} does not match expected {} for {}x{} image",
            len, expected, width, height
        )));
    }
    Ok(())
}

/// Build a premultiplied pixmap from straight-alpha RGBA bytes.
pub(crate) fn pixmap_from_rgba(data: &[u8], width: u32, height: u32) -> GraphicsResult<Pixmap> {
    check_len(data.len(), width, height, 4)?;
    let mut pixmap =
        Pixmap::new(width, height).ok_or(GraphicsError::InvalidDimensions { width, height })?;

    for (pixel, src) in pixmap.pixels_mut().iter_mut().zip(data.chunks_exact(4)) {
        let (r, g, b, a) = (src[0], src[1], src[2], src[3]);
        // Convert to premultiplied alpha using integer math
        let (pr, pg, pb) = if a == 255 {
            (r, g, b)
        } else if a == 0 {
            (0, 0, 0)
        } else {
            let a16 = a as u16;
            (
                ((r as u16 * a16 + 127) / 255) as u8,
                ((g as u16 * a16 + 127) / 255) as u8,
                ((b as u16 * a16 + 127) / 255) as u8,
            )
        };
        if let Some(color) = PremultipliedColorU8::from_rgba(pr, pg, pb, a) {
            *pixel = color;
        }
    }
    Ok(pixmap)
}

/// Straight-alpha RGBA bytes of a premultiplied pixmap.
pub(crate) fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    data
}

/// Encode a pixmap as an 8-bit RGBA PNG.
pub(crate) fn pixmap_to_png(pixmap: &Pixmap) -> GraphicsResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixmap_to_rgba(pixmap))?;
    }
    Ok(buf)
}
