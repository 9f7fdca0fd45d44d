//! Single-layer raster rendering.

use super::convert::{alloc_rgba, raster_to_rgba};
use super::relief;
use crate::config::RenderConfig;
use crate::encoder::{EncodeInput, Encoder, OutputFormat};
use crate::error::{RenderError, RenderResult};
use crate::storage::{Extent, RasterRequest, RasterStore, ResolutionLevel, Section};
use crate::symbolizer::{promote_pixel_kind, RasterSymbolizer, ShadedRelief};
use rastyle_canvas::pixel;
use rastyle_canvas::{Bitmap, GraphicsContext, GraphicsError, Rgb};
use std::borrow::Cow;

/// One coverage and its style.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    pub coverage: String,
    pub symbolizer: RasterSymbolizer,
}

impl RasterLayer {
    pub fn new(coverage: impl Into<String>, symbolizer: RasterSymbolizer) -> Self {
        Self {
            coverage: coverage.into(),
            symbolizer,
        }
    }
}

/// Requested canvas: pixel size, geographic extent and output encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionRequest {
    pub width: u32,
    pub height: u32,
    pub extent: Extent,
    pub background: Rgb,
    pub format: OutputFormat,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Keep the alpha plane in the encoded output (PNG only).
    pub transparent: bool,
}

impl CompositionRequest {
    pub fn new(width: u32, height: u32, extent: Extent) -> Self {
        Self {
            width,
            height,
            extent,
            background: Rgb::gray(255),
            format: OutputFormat::Png,
            quality: 80,
            transparent: true,
        }
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    pub fn with_format(mut self, format: OutputFormat, quality: u8) -> Self {
        self.format = format;
        self.quality = quality;
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Ground units per canvas pixel, horizontally.
    pub fn x_res(&self) -> f64 {
        self.extent.width() / self.width as f64
    }

    pub fn y_res(&self) -> f64 {
        self.extent.height() / self.height as f64
    }

    pub(crate) fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub(crate) fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GraphicsError::InvalidDimensions {
                width: self.width,
                height: self.height,
            }
            .into());
        }
        if self.extent.is_empty() {
            return Err(RenderError::InvalidRequest(format!(
                "empty extent {:?}",
                self.extent
            )));
        }
        Ok(())
    }
}

/// Fetched and converted content of one layer, sized to the request.
#[derive(Debug)]
pub(crate) enum LayerImage {
    /// Straight RGBA, transparent where the layer has no data.
    Color(Vec<u8>),
    /// Brightness coefficients applied after all color layers.
    Relief(Vec<f32>),
}

/// Renders single coverages at a requested size and extent.
pub struct RasterLayerRenderer<'a, S: RasterStore + ?Sized> {
    store: &'a S,
    config: &'a RenderConfig,
}

impl<'a, S: RasterStore + ?Sized> RasterLayerRenderer<'a, S> {
    pub fn new(store: &'a S, config: &'a RenderConfig) -> Self {
        Self { store, config }
    }

    /// RGBA of `layer` at the request's size.
    pub fn render_rgba(&self, layer: &RasterLayer, request: &CompositionRequest) -> RenderResult<Vec<u8>> {
        request.validate()?;
        if self.store.is_mixed_resolution(&layer.coverage)? {
            self.render_mixed(layer, request)
        } else {
            self.render_ordinary(layer, request)
        }
    }

    /// Render `layer` alone and encode it with its symbolizer opacity.
    ///
    /// Shaded relief layers encode their mask as gray levels.
    pub fn render_image<E: Encoder + ?Sized>(
        &self,
        layer: &RasterLayer,
        request: &CompositionRequest,
        encoder: &E,
    ) -> RenderResult<Vec<u8>> {
        let rgba = match self.fetch(layer, request)? {
            LayerImage::Color(rgba) => rgba,
            LayerImage::Relief(mask) => mask
                .iter()
                .flat_map(|m| {
                    let v = (m * 255.0).round() as u8;
                    [v, v, v, if *m > 0.0 { 255 } else { 0 }]
                })
                .collect(),
        };
        let (rgb, alpha) = pixel::rgba_to_rgb_alpha(request.width, request.height, &rgba)?;
        let keep_alpha = request.transparent && request.format.supports_alpha();
        let input = EncodeInput {
            width: request.width,
            height: request.height,
            rgb: &rgb,
            alpha: keep_alpha.then_some(alpha.as_slice()),
        };
        encoder.encode(&input, request.format, request.quality, layer.symbolizer.opacity)
    }

    pub(crate) fn fetch(&self, layer: &RasterLayer, request: &CompositionRequest) -> RenderResult<LayerImage> {
        match layer.symbolizer.shaded_relief {
            Some(relief) => {
                request.validate()?;
                Ok(LayerImage::Relief(self.render_relief(layer, request, relief)?))
            }
            None => Ok(LayerImage::Color(self.render_rgba(layer, request)?)),
        }
    }

    fn render_ordinary(&self, layer: &RasterLayer, request: &CompositionRequest) -> RenderResult<Vec<u8>> {
        let level = self.store.find_best_resolution_level(
            &layer.coverage,
            None,
            request.x_res(),
            request.y_res(),
        )?;
        self.check_aspect(request, &level)?;
        let (base_w, base_h) = base_size(&request.extent, &level);
        log::debug!(
            target: "raster",
            "{}: level {} ({:?}), base {}x{}, requested {}x{}",
            layer.coverage,
            level.level_id,
            level.scale,
            base_w,
            base_h,
            request.width,
            request.height
        );
        let rgba = self.fetch_rgba(layer, request, None, request.extent, level, base_w, base_h)?;
        resize_rgba(rgba, base_w, base_h, request.width, request.height)
    }

    /// Each section is read at its own best level and copied into its
    /// share of the canvas.
    fn render_mixed(&self, layer: &RasterLayer, request: &CompositionRequest) -> RenderResult<Vec<u8>> {
        let mut canvas = alloc_rgba(request.pixel_count())?;
        let sections = self.store.sections(&layer.coverage, &request.extent)?;
        if sections.is_empty() {
            log::warn!(target: "raster", "{}: no section intersects the request", layer.coverage);
        }
        for section in &sections {
            let Some(area) = request.extent.intersection(&section.extent) else {
                log::warn!(target: "raster", "{}: section {} is outside the request", layer.coverage, section.id);
                continue;
            };
            let rect = section_rect(request, &area);
            if rect.width == 0 || rect.height == 0 {
                log::warn!(target: "raster", "{}: section {} covers no pixel", layer.coverage, section.id);
                continue;
            }
            self.paint_section(layer, request, section, area, rect, &mut canvas)?;
        }
        Ok(canvas)
    }

    fn paint_section(
        &self,
        layer: &RasterLayer,
        request: &CompositionRequest,
        section: &Section,
        area: Extent,
        rect: PixelRect,
        canvas: &mut [u8],
    ) -> RenderResult<()> {
        let level = self.store.find_best_resolution_level(
            &layer.coverage,
            Some(section.id),
            request.x_res(),
            request.y_res(),
        )?;
        self.check_aspect(request, &level)?;
        let (base_w, base_h) = base_size(&area, &level);
        log::debug!(
            target: "raster",
            "{}: section {} level {} base {}x{} into {}x{} at {} {}",
            layer.coverage,
            section.id,
            level.level_id,
            base_w,
            base_h,
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        let rgba = self.fetch_rgba(layer, request, Some(section.id), area, level, base_w, base_h)?;
        let rgba = resize_rgba(rgba, base_w, base_h, rect.width, rect.height)?;

        let canvas_w = request.width as usize;
        let rect_w = rect.width as usize;
        for row in 0..rect.height as usize {
            let src_row = &rgba[row * rect_w * 4..(row + 1) * rect_w * 4];
            let dst_start = ((rect.y as usize + row) * canvas_w + rect.x as usize) * 4;
            let dst_row = &mut canvas[dst_start..dst_start + rect_w * 4];
            for (src, dst) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                if src[3] > 0 {
                    dst.copy_from_slice(src);
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn fetch_rgba(
        &self,
        layer: &RasterLayer,
        request: &CompositionRequest,
        section: Option<i64>,
        extent: Extent,
        level: ResolutionLevel,
        width: u32,
        height: u32,
    ) -> RenderResult<Vec<u8>> {
        let info = self.store.coverage_info(&layer.coverage)?;
        let out_kind = promote_pixel_kind(&info, &layer.symbolizer, level.scale)?;
        let raw = self.store.get_raw_raster_data(&RasterRequest {
            coverage: &layer.coverage,
            section,
            extent,
            width,
            height,
            level,
            pixel_kind: out_kind,
            band_selection: layer.symbolizer.band_selection,
            background: request.background,
        })?;
        if raw.width != width || raw.height != height {
            return Err(RenderError::StorageQueryFailure(format!(
                "{}: asked for {}x{}, got {}x{}",
                layer.coverage, width, height, raw.width, raw.height
            )));
        }
        // Native samples are converted here; promoted ones come from the store
        if raw.pixel_kind != info.pixel_kind && raw.pixel_kind != out_kind {
            return Err(RenderError::StorageQueryFailure(format!(
                "{}: asked for {:?} samples, got {:?}",
                layer.coverage, out_kind, raw.pixel_kind
            )));
        }
        let symbolizer = if raw.pixel_kind == info.pixel_kind {
            Cow::Borrowed(&layer.symbolizer)
        } else {
            log::debug!(target: "raster", "{}: store returned {:?} samples", layer.coverage, out_kind);
            Cow::Owned(RasterSymbolizer {
                band_selection: None,
                ..layer.symbolizer.clone()
            })
        };
        raster_to_rgba(
            &raw,
            out_kind,
            &symbolizer,
            request.background,
            info.band_statistics(0),
        )
    }

    /// Elevation is read at one coverage-wide level, so mixed-resolution
    /// coverages shade from their common best level rather than per section.
    fn render_relief(
        &self,
        layer: &RasterLayer,
        request: &CompositionRequest,
        shaded: ShadedRelief,
    ) -> RenderResult<Vec<f32>> {
        let level = self.store.find_best_resolution_level(
            &layer.coverage,
            None,
            request.x_res(),
            request.y_res(),
        )?;
        self.check_aspect(request, &level)?;
        let (base_w, base_h) = base_size(&request.extent, &level);
        let grid = self
            .store
            .get_elevation(&layer.coverage, &request.extent, &level, base_w, base_h)?;
        log::debug!(
            target: "raster",
            "{}: relief from {}x{} elevation grid",
            layer.coverage,
            grid.width,
            grid.height
        );
        let shade = relief::hillshade(&grid, shaded.relief_factor, &self.config.relief)?;
        Ok(relief::rescale_mask(
            &shade,
            grid.width,
            grid.height,
            request.width,
            request.height,
        ))
    }

    fn check_aspect(&self, request: &CompositionRequest, level: &ResolutionLevel) -> RenderResult<()> {
        if self.config.allow_reaspect {
            return Ok(());
        }
        let requested = request.x_res() / request.y_res();
        let native = level.x_res / level.y_res;
        if ((requested / native) - 1.0).abs() > self.config.aspect_tolerance {
            return Err(RenderError::AspectMismatch { requested, native });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Canvas pixels covered by `area`. Edges are rounded independently so
/// neighbouring sections share their boundary column or row exactly.
fn section_rect(request: &CompositionRequest, area: &Extent) -> PixelRect {
    let ext = &request.extent;
    let to_col = |x: f64| ((x - ext.minx) / request.x_res()).round().clamp(0.0, request.width as f64) as u32;
    let to_row = |y: f64| ((ext.maxy - y) / request.y_res()).round().clamp(0.0, request.height as f64) as u32;
    let (x0, x1) = (to_col(area.minx), to_col(area.maxx));
    let (y0, y1) = (to_row(area.maxy), to_row(area.miny));
    PixelRect {
        x: x0,
        y: y0,
        width: x1.saturating_sub(x0),
        height: y1.saturating_sub(y0),
    }
}

/// Native pixel size of `extent` at `level`.
fn base_size(extent: &Extent, level: &ResolutionLevel) -> (u32, u32) {
    let w = (extent.width() / level.x_res).round().max(1.0) as u32;
    let h = (extent.height() / level.y_res).round().max(1.0) as u32;
    (w, h)
}

fn scratch_context(width: u32, height: u32) -> RenderResult<GraphicsContext> {
    GraphicsContext::new_bitmap(width, height).map_err(|e| match e {
        GraphicsError::InvalidDimensions { .. } | GraphicsError::BackendInit(_) => {
            RenderError::AllocationFailure(format!("{}x{} scratch canvas: {}", width, height, e))
        }
        other => other.into(),
    })
}

/// Resample an RGBA buffer to the requested size through a scratch canvas.
pub(crate) fn resize_rgba(rgba: Vec<u8>, width: u32, height: u32, to_w: u32, to_h: u32) -> RenderResult<Vec<u8>> {
    if width == to_w && height == to_h {
        return Ok(rgba);
    }
    let bitmap = Bitmap::from_rgba(&rgba, width, height)?;
    drop(rgba);
    let mut ctx = scratch_context(to_w, to_h)?;
    ctx.draw_rescaled_bitmap(
        &bitmap,
        to_w as f32 / width as f32,
        to_h as f32 / height as f32,
        0.0,
        0.0,
    )?;
    Ok(ctx.get_rgba_array()?)
}
