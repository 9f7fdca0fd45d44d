//! Graphics context over a bitmap, SVG or PDF surface.

mod image_ops;
mod path_ops;
mod text_rendering;
mod transform;

use crate::color::Rgba;
use crate::error::{GraphicsError, GraphicsResult};
use crate::font::Font;
use crate::font_config::ResolvedFontConfig;
use crate::paint::{Brush, LinearGradient, Paint, Pen};
use crate::pattern::Pattern;
use crate::style::{FillRule, ImageQuality, LineCap, LineJoin, PenStyle};
use crate::surface::svg::SvgDocument;
use crate::surface::{PageSetup, PdfTarget, Surface, SurfaceOutput};
use crate::text::TextEngine;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{Pixmap, Transform};

/// Maximum surface dimension in device pixels.
const MAX_DIMENSION: u32 = 32767;

/// Which kind of surface a context draws on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Bitmap,
    Svg,
    Pdf,
    InMemoryPdf,
}

/// State captured by [`GraphicsContext::save`].
#[derive(Debug, Clone)]
pub(crate) struct DrawingState {
    pub pen: Pen,
    pub brush: Brush,
    pub font: Font,
    pub fill_rule: FillRule,
    pub transform: Transform,
    pub image_quality: ImageQuality,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            pen: Pen::default(),
            brush: Brush::default(),
            font: Font::default(),
            fill_rule: FillRule::NonZero,
            transform: Transform::identity(),
            image_quality: ImageQuality::Bilinear,
        }
    }
}

/// A drawing context owning exactly one surface.
///
/// Path coordinates are mapped through the current transform as they are
/// added, so the pending path is always in device space. Finishing the
/// context consumes it, flushing vector surfaces to their target.
pub struct GraphicsContext {
    width: u32,
    height: u32,
    kind: SurfaceKind,
    pub(crate) surface: Surface,
    pub(crate) state: DrawingState,
    state_stack: Vec<DrawingState>,
    pub(crate) path_builder: tiny_skia::PathBuilder,
    fonts: Option<ResolvedFontConfig>,
    text_engine: Option<TextEngine>,
}

impl GraphicsContext {
    /// Create a context over a transparent RGBA bitmap.
    pub fn new_bitmap(width: u32, height: u32) -> GraphicsResult<Self> {
        check_dimensions(width, height)?;
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            GraphicsError::BackendInit(format!("cannot allocate {}x{} bitmap", width, height))
        })?;
        log::debug!(target: "canvas", "bitmap context {}x{}", width, height);
        Ok(Self::with_surface(width, height, SurfaceKind::Bitmap, Surface::Bitmap(pixmap)))
    }

    /// Create a context recording an SVG document written to `path` on finish.
    pub fn new_svg(path: impl AsRef<Path>, width: u32, height: u32) -> GraphicsResult<Self> {
        check_dimensions(width, height)?;
        let doc = SvgDocument::new(width as f32, height as f32)?;
        let path = path.as_ref().to_path_buf();
        log::debug!(target: "canvas", "svg context {}x{} -> {}", width, height, path.display());
        Ok(Self::with_surface(
            width,
            height,
            SurfaceKind::Svg,
            Surface::Svg { doc, path },
        ))
    }

    /// Create a single-page PDF context written to `path` on finish.
    ///
    /// Drawing targets the margin box; one device pixel is `72 / dpi` points.
    pub fn new_pdf(path: impl AsRef<Path>, page: PageSetup) -> GraphicsResult<Self> {
        Self::pdf(page, PdfTarget::File(path.as_ref().to_path_buf()), SurfaceKind::Pdf)
    }

    /// Like [`GraphicsContext::new_pdf`], but the document bytes are returned by
    /// [`GraphicsContext::finish`] as [`SurfaceOutput::PdfBytes`].
    pub fn new_pdf_in_memory(page: PageSetup) -> GraphicsResult<Self> {
        Self::pdf(page, PdfTarget::Memory, SurfaceKind::InMemoryPdf)
    }

    fn pdf(page: PageSetup, target: PdfTarget, kind: SurfaceKind) -> GraphicsResult<Self> {
        let (width, height) = page.drawable_size()?;
        check_dimensions(width, height)?;
        let doc = page.begin_document()?;
        log::debug!(target: "canvas", "pdf context {}x{} at {} dpi", width, height, page.dpi);
        Ok(Self::with_surface(width, height, kind, Surface::Pdf { doc, target }))
    }

    fn with_surface(width: u32, height: u32, kind: SurfaceKind, surface: Surface) -> Self {
        Self {
            width,
            height,
            kind,
            surface,
            state: DrawingState::default(),
            state_stack: Vec::new(),
            path_builder: tiny_skia::PathBuilder::new(),
            fonts: None,
            text_engine: None,
        }
    }

    /// Use a pre-resolved font database for text instead of scanning the
    /// default configuration on first use.
    pub fn with_fonts(mut self, fonts: &ResolvedFontConfig) -> Self {
        self.fonts = Some(fonts.clone());
        self.text_engine = None;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Flush the surface and release the context.
    pub fn finish(self) -> GraphicsResult<SurfaceOutput> {
        log::debug!(target: "canvas", "finish {} surface", self.surface.kind());
        self.surface.finish()
    }

    pub(crate) fn text_engine(&mut self) -> &mut TextEngine {
        let fonts = &self.fonts;
        self.text_engine.get_or_insert_with(|| {
            let db = match fonts {
                Some(resolved) => resolved.fontdb.clone(),
                None => ResolvedFontConfig::default().fontdb,
            };
            TextEngine::new(db)
        })
    }

    // --- State stack ---

    /// Push pen, brush, font, fill rule and transform.
    pub fn save(&mut self) {
        log::debug!(target: "canvas", "save");
        self.state_stack.push(self.state.clone());
    }

    /// Pop the most recently saved state; a no-op when nothing was saved.
    pub fn restore(&mut self) {
        log::debug!(target: "canvas", "restore");
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
        }
    }

    // --- Pen ---

    /// Solid pen with one of the fixed dash styles, butt caps and miter joins.
    pub fn set_pen(&mut self, color: Rgba, width: f32, style: PenStyle) {
        self.state.pen = Pen {
            paint: Paint::Solid(color),
            width: sanitize_width(width),
            dash: style.dash_list().to_vec(),
            ..Pen::default()
        };
    }

    pub fn set_solid_pen(&mut self, color: Rgba, width: f32, cap: LineCap, join: LineJoin) {
        self.state.pen = Pen {
            paint: Paint::Solid(color),
            width: sanitize_width(width),
            cap,
            join,
            ..Pen::default()
        };
    }

    /// Solid pen with an explicit on/off dash list.
    ///
    /// Odd-length lists are repeated to even length; negative or non-finite
    /// lengths are rejected.
    pub fn set_dashed_pen(
        &mut self,
        color: Rgba,
        width: f32,
        cap: LineCap,
        join: LineJoin,
        dash: &[f32],
        offset: f32,
    ) -> GraphicsResult<()> {
        let dash = normalize_dash(dash)?;
        self.state.pen = Pen {
            paint: Paint::Solid(color),
            width: sanitize_width(width),
            dash,
            dash_offset: if offset.is_finite() { offset } else { 0.0 },
            cap,
            join,
        };
        Ok(())
    }

    pub fn set_linear_gradient_pen(
        &mut self,
        gradient: LinearGradient,
        width: f32,
        cap: LineCap,
        join: LineJoin,
    ) {
        self.state.pen = Pen {
            paint: Paint::LinearGradient(gradient),
            width: sanitize_width(width),
            cap,
            join,
            ..Pen::default()
        };
    }

    /// Stroke with a shared pattern; call [`GraphicsContext::release_pattern_pen`]
    /// to detach it.
    pub fn set_pattern_pen(
        &mut self,
        pattern: Arc<Pattern>,
        width: f32,
        cap: LineCap,
        join: LineJoin,
    ) {
        self.state.pen = Pen {
            paint: Paint::Pattern(pattern),
            width: sanitize_width(width),
            cap,
            join,
            ..Pen::default()
        };
    }

    /// Replace the whole pen state.
    pub fn set_pen_state(&mut self, pen: Pen) {
        self.state.pen = pen;
    }

    /// Drop a pattern pen, reverting to the default solid black pen.
    /// Other pens are left untouched.
    pub fn release_pattern_pen(&mut self) {
        if self.state.pen.paint.is_pattern() {
            self.state.pen = Pen::default();
        }
    }

    pub fn pen(&self) -> &Pen {
        &self.state.pen
    }

    // --- Brush ---

    pub fn set_brush(&mut self, color: Rgba) {
        self.state.brush = Brush {
            paint: Paint::Solid(color),
        };
    }

    pub fn set_linear_gradient_brush(&mut self, gradient: LinearGradient) {
        self.state.brush = Brush {
            paint: Paint::LinearGradient(gradient),
        };
    }

    pub fn set_pattern_brush(&mut self, pattern: Arc<Pattern>) {
        self.state.brush = Brush {
            paint: Paint::Pattern(pattern),
        };
    }

    /// Drop a pattern brush, reverting to the default solid black brush.
    pub fn release_pattern_brush(&mut self) {
        if self.state.brush.paint.is_pattern() {
            self.state.brush = Brush::default();
        }
    }

    pub fn brush(&self) -> &Brush {
        &self.state.brush
    }

    // --- Other state ---

    pub fn set_font(&mut self, font: Font) {
        self.state.font = font;
    }

    pub fn font(&self) -> &Font {
        &self.state.font
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.state.fill_rule = rule;
    }

    pub fn set_image_quality(&mut self, quality: ImageQuality) {
        self.state.image_quality = quality;
    }
}

fn check_dimensions(width: u32, height: u32) -> GraphicsResult<()> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(GraphicsError::InvalidDimensions { width, height });
    }
    Ok(())
}

fn sanitize_width(width: f32) -> f32 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        1.0
    }
}

fn normalize_dash(dash: &[f32]) -> GraphicsResult<Vec<f32>> {
    if dash.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(GraphicsError::InvalidArgument(format!(
            "invalid dash list {:?}",
            dash
        )));
    }
    let mut dash = dash.to_vec();
    if dash.len() % 2 == 1 {
        dash.extend_from_within(..);
    }
    Ok(dash)
}
