//! Multi-layer raster compositing.

use super::convert::alloc_rgba;
use super::layer::{CompositionRequest, LayerImage, RasterLayer, RasterLayerRenderer};
use super::relief;
use crate::config::RenderConfig;
use crate::encoder::{EncodeInput, Encoder};
use crate::error::{RenderError, RenderResult};
use crate::storage::RasterStore;
use rastyle_canvas::pixel::{self, ALPHA_THRESHOLD};
use rastyle_canvas::Rgb;

/// Split result of a composite, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub alpha: Vec<u8>,
}

/// Paints an ordered list of raster layers onto one canvas.
///
/// Later layers paint over earlier ones at their opaque pixels. Shaded
/// relief layers do not paint; their masks darken the finished canvas.
pub struct GroupCompositor<'a, S: RasterStore + ?Sized, E: Encoder + ?Sized> {
    store: &'a S,
    encoder: &'a E,
    config: &'a RenderConfig,
}

impl<'a, S: RasterStore + ?Sized, E: Encoder + ?Sized> GroupCompositor<'a, S, E> {
    pub fn new(store: &'a S, encoder: &'a E, config: &'a RenderConfig) -> Self {
        Self {
            store,
            encoder,
            config,
        }
    }

    /// Composite `layers` and encode the result in the requested format.
    pub fn composite(&self, layers: &[RasterLayer], request: &CompositionRequest) -> RenderResult<Vec<u8>> {
        let composite = self.composite_rgba(layers, request)?;
        let keep_alpha = request.transparent && request.format.supports_alpha();
        let input = EncodeInput {
            width: composite.width,
            height: composite.height,
            rgb: &composite.rgb,
            alpha: keep_alpha.then_some(composite.alpha.as_slice()),
        };
        self.encoder
            .encode(&input, request.format, request.quality, 1.0)
    }

    /// Composite `layers` into split RGB and alpha planes.
    pub fn composite_rgba(&self, layers: &[RasterLayer], request: &CompositionRequest) -> RenderResult<Composite> {
        request.validate()?;
        let workers = self.config.worker_count();
        log::debug!(
            target: "raster",
            "compositing {} layers into {}x{} with {} workers",
            layers.len(),
            request.width,
            request.height,
            workers
        );

        let mut canvas = alloc_rgba(request.pixel_count())?;
        let bg = request.background;
        for px in canvas.chunks_exact_mut(4) {
            px.copy_from_slice(&[bg.r, bg.g, bg.b, 0]);
        }

        let renderer = RasterLayerRenderer::new(self.store, self.config);
        let mut mask: Option<Vec<f32>> = None;
        for batch in layers.chunks(workers) {
            let images = fetch_batch(&renderer, batch, request)?;
            for (layer, image) in batch.iter().zip(images) {
                match image {
                    LayerImage::Color(rgba) => {
                        log::debug!(target: "raster", "painting {}", layer.coverage);
                        paint_layer(&mut canvas, &rgba, layer.symbolizer.opacity, bg);
                    }
                    LayerImage::Relief(layer_mask) => {
                        log::debug!(target: "raster", "deferring relief of {}", layer.coverage);
                        match mask.as_mut() {
                            Some(acc) => relief::merge_masks(acc, &layer_mask),
                            None => mask = Some(layer_mask),
                        }
                    }
                }
            }
        }

        let (mut rgb, alpha) = pixel::rgba_to_rgb_alpha(request.width, request.height, &canvas)?;
        drop(canvas);
        if let Some(mask) = mask {
            relief::apply_relief(&mut rgb, &alpha, &mask);
        }
        Ok(Composite {
            width: request.width,
            height: request.height,
            rgb,
            alpha,
        })
    }
}

/// Fetch one batch of layers, one scoped thread per layer.
fn fetch_batch<S: RasterStore + ?Sized>(
    renderer: &RasterLayerRenderer<'_, S>,
    batch: &[RasterLayer],
    request: &CompositionRequest,
) -> RenderResult<Vec<LayerImage>> {
    if batch.len() <= 1 {
        return batch.iter().map(|layer| renderer.fetch(layer, request)).collect();
    }
    std::thread::scope(|scope| {
        let handles: Vec<_> = batch
            .iter()
            .map(|layer| scope.spawn(move || renderer.fetch(layer, request)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.join().map_err(|_| {
                    RenderError::BackendStatus("raster fetch worker panicked".to_string())
                })?
            })
            .collect()
    })
}

/// Paint the opaque pixels of `layer` onto `canvas`.
///
/// Below full opacity, opaque layer pixels are mixed with what is already
/// painted (or the background where nothing is) and become fully opaque.
fn paint_layer(canvas: &mut [u8], layer: &[u8], opacity: f64, background: Rgb) {
    if opacity <= 0.0 {
        return;
    }
    let bg = [background.r, background.g, background.b];
    for (dst, src) in canvas.chunks_exact_mut(4).zip(layer.chunks_exact(4)) {
        if src[3] < ALPHA_THRESHOLD {
            continue;
        }
        if opacity >= 1.0 {
            dst.copy_from_slice(&[src[0], src[1], src[2], 255]);
            continue;
        }
        let base = if dst[3] >= ALPHA_THRESHOLD {
            [dst[0], dst[1], dst[2]]
        } else {
            bg
        };
        for c in 0..3 {
            dst[c] = (src[c] as f64 * opacity + base[c] as f64 * (1.0 - opacity)).round() as u8;
        }
        dst[3] = 255;
    }
}
