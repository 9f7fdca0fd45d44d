//! Drawing targets behind a graphics context.
//!
//! A bitmap surface rasterizes immediately through tiny-skia. Vector
//! surfaces record an SVG document; PDF pages are converted when the
//! context is finished.

pub mod pdf;
pub(crate) mod svg;

use crate::bitmap::pixmap_to_rgba;
use crate::error::{GraphicsError, GraphicsResult};
use crate::paint::{Paint, Pen};
use crate::style::FillRule;
use std::path::PathBuf;
use svg::SvgDocument;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

pub use pdf::PageSetup;

/// Where a PDF page ends up.
pub(crate) enum PdfTarget {
    File(PathBuf),
    Memory,
}

pub(crate) enum Surface {
    Bitmap(Pixmap),
    Svg { doc: SvgDocument, path: PathBuf },
    Pdf { doc: SvgDocument, target: PdfTarget },
}

/// Result of finishing a graphics context.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOutput {
    /// Final pixels of a bitmap context, non-premultiplied RGBA.
    Bitmap {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
    SvgWritten(PathBuf),
    PdfWritten(PathBuf),
    /// Bytes of an in-memory PDF document.
    PdfBytes(Vec<u8>),
}

impl Surface {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Surface::Bitmap(_) => "bitmap",
            Surface::Svg { .. } => "svg",
            Surface::Pdf { .. } => "pdf",
        }
    }

    pub(crate) fn pixmap(&self) -> GraphicsResult<&Pixmap> {
        match self {
            Surface::Bitmap(pixmap) => Ok(pixmap),
            _ => Err(GraphicsError::NotABitmapSurface),
        }
    }

    pub(crate) fn pixmap_mut(&mut self) -> GraphicsResult<&mut Pixmap> {
        match self {
            Surface::Bitmap(pixmap) => Ok(pixmap),
            _ => Err(GraphicsError::NotABitmapSurface),
        }
    }

    /// Fill `path` (already in device coordinates).
    pub(crate) fn fill_path(
        &mut self,
        path: &tiny_skia::Path,
        paint: &Paint,
        rule: FillRule,
    ) -> GraphicsResult<()> {
        match self {
            Surface::Bitmap(pixmap) => {
                let Some(shader) = paint.shader() else {
                    // Degenerate gradient
                    return Ok(());
                };
                let sk_paint = tiny_skia::Paint {
                    shader,
                    anti_alias: true,
                    ..Default::default()
                };
                pixmap.fill_path(path, &sk_paint, rule.into(), Transform::identity(), None);
                Ok(())
            }
            Surface::Svg { doc, .. } | Surface::Pdf { doc, .. } => {
                doc.fill_path(path, paint, rule, Transform::identity())
            }
        }
    }

    /// Stroke `path` (already in device coordinates) with widths scaled by
    /// `scale`.
    pub(crate) fn stroke_path(
        &mut self,
        path: &tiny_skia::Path,
        pen: &Pen,
        scale: f32,
    ) -> GraphicsResult<()> {
        match self {
            Surface::Bitmap(pixmap) => {
                let Some(shader) = pen.paint.shader() else {
                    return Ok(());
                };
                let sk_paint = tiny_skia::Paint {
                    shader,
                    anti_alias: true,
                    ..Default::default()
                };
                let stroke = pen.scaled(scale).stroke();
                pixmap.stroke_path(path, &sk_paint, &stroke, Transform::identity(), None);
                Ok(())
            }
            Surface::Svg { doc, .. } | Surface::Pdf { doc, .. } => {
                doc.stroke_path(path, &pen.scaled(scale), Transform::identity())
            }
        }
    }

    pub(crate) fn draw_pixmap(
        &mut self,
        image: &Pixmap,
        transform: Transform,
        quality: FilterQuality,
        opacity: f32,
    ) -> GraphicsResult<()> {
        match self {
            Surface::Bitmap(pixmap) => {
                let paint = PixmapPaint {
                    opacity,
                    quality,
                    ..Default::default()
                };
                pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
                Ok(())
            }
            Surface::Svg { doc, .. } | Surface::Pdf { doc, .. } => {
                doc.image(image, transform, opacity)
            }
        }
    }

    pub(crate) fn finish(self) -> GraphicsResult<SurfaceOutput> {
        match self {
            Surface::Bitmap(pixmap) => Ok(SurfaceOutput::Bitmap {
                width: pixmap.width(),
                height: pixmap.height(),
                rgba: pixmap_to_rgba(&pixmap),
            }),
            Surface::Svg { doc, path } => {
                let bytes = doc.finish()?;
                std::fs::write(&path, bytes)?;
                log::debug!(target: "canvas", "SVG written to {}", path.display());
                Ok(SurfaceOutput::SvgWritten(path))
            }
            Surface::Pdf { doc, target } => {
                let pdf = pdf::svg_to_pdf(&doc.finish()?)?;
                match target {
                    PdfTarget::File(path) => {
                        std::fs::write(&path, pdf)?;
                        Ok(SurfaceOutput::PdfWritten(path))
                    }
                    PdfTarget::Memory => Ok(SurfaceOutput::PdfBytes(pdf)),
                }
            }
        }
    }
}
