//! Tileable image patterns used as pen or brush paint sources.

use crate::bitmap::{pixmap_from_rgba, pixmap_to_rgba, Bitmap};
use crate::error::{GraphicsError, GraphicsResult};
use tiny_skia::{Pixmap, Shader, SpreadMode, Transform};

/// Maximum pattern size (4096x4096).
const MAX_PATTERN_SIZE: u32 = 4096;

/// An image pattern for fill/stroke operations.
///
/// A pattern is shared with a context as `Arc<Pattern>` when selected as pen or
/// brush; the context only holds a reference until the pattern is released.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Tile content (premultiplied).
    pixmap: Pixmap,
    /// Non-tiled content padded with one transparent pixel on each side, so
    /// that pad spreading extends transparency instead of the edge color.
    padded: Option<Pixmap>,
    tiled: bool,
}

impl Pattern {
    /// Create a new pattern from straight-alpha RGBA pixel data.
    pub fn new(data: &[u8], width: u32, height: u32, tiled: bool) -> GraphicsResult<Self> {
        if width > MAX_PATTERN_SIZE || height > MAX_PATTERN_SIZE {
            return Err(GraphicsError::InvalidArgument(format!(
                "Pattern size {}x{} exceeds maximum {}x{}",
                width, height, MAX_PATTERN_SIZE, MAX_PATTERN_SIZE
            )));
        }
        let pixmap = pixmap_from_rgba(data, width, height)?;
        Self::from_pixmap(pixmap, tiled)
    }

    /// Create a pattern from the content of a bitmap.
    pub fn from_bitmap(bitmap: &Bitmap, tiled: bool) -> GraphicsResult<Self> {
        Self::from_pixmap(bitmap.pixmap().clone(), tiled)
    }

    fn from_pixmap(pixmap: Pixmap, tiled: bool) -> GraphicsResult<Self> {
        let padded = if tiled {
            None
        } else {
            let (width, height) = (pixmap.width() + 2, pixmap.height() + 2);
            let mut padded = Pixmap::new(width, height)
                .ok_or(GraphicsError::InvalidDimensions { width, height })?;
            padded.draw_pixmap(
                1,
                1,
                pixmap.as_ref(),
                &tiny_skia::PixmapPaint::default(),
                Transform::identity(),
                None,
            );
            Some(padded)
        };
        Ok(Self {
            pixmap,
            padded,
            tiled,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn is_tiled(&self) -> bool {
        self.tiled
    }

    /// Straight-alpha RGBA copy of one tile.
    pub fn rgba(&self) -> Vec<u8> {
        pixmap_to_rgba(&self.pixmap)
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Shader painting this pattern anchored at the device origin, then
    /// moved by `transform`.
    pub(crate) fn shader(&self, transform: Transform) -> Shader<'_> {
        match &self.padded {
            None => tiny_skia::Pattern::new(
                self.pixmap.as_ref(),
                SpreadMode::Repeat,
                tiny_skia::FilterQuality::Nearest,
                1.0,
                transform,
            ),
            Some(padded) => tiny_skia::Pattern::new(
                padded.as_ref(),
                SpreadMode::Pad,
                tiny_skia::FilterQuality::Nearest,
                1.0,
                Transform::from_translate(-1.0, -1.0).post_concat(transform),
            ),
        }
    }
}
