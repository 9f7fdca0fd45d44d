//! Raw raster samples to RGBA, per output pixel kind.

use crate::error::{RenderError, RenderResult};
use crate::storage::{BandStatistics, PixelKind, RawRaster};
use crate::symbolizer::{BandSelection, ColorMap, RasterSymbolizer};
use rastyle_canvas::pixel;
use rastyle_canvas::Rgb;

/// Convert `raster` into a zeroed-then-filled RGBA buffer of the same size.
///
/// Pixels equal to `background` (or zero monochrome samples, or no-data
/// cells of a data grid) stay fully transparent. Data grids without a
/// color ramp are stretched over `stats`, the coverage-wide value range,
/// so that every tile of a coverage maps a value to the same gray.
pub(crate) fn raster_to_rgba(
    raster: &RawRaster,
    out_kind: PixelKind,
    symbolizer: &RasterSymbolizer,
    background: Rgb,
    stats: Option<BandStatistics>,
) -> RenderResult<Vec<u8>> {
    raster.validate()?;
    let (width, height) = (raster.width, raster.height);
    let count = raster.pixel_count();
    let mut rgba = alloc_rgba(count)?;

    match raster.pixel_kind {
        PixelKind::Monochrome => {
            let samples = band_plane(raster, 0)?;
            pixel::mono_to_rgba(width, height, &samples, &mut rgba)?;
        }
        PixelKind::Palette => {
            let palette = raster.palette.as_ref().ok_or_else(|| {
                RenderError::UnsupportedPixelKind("palette raster without a palette".to_string())
            })?;
            let indices = band_plane(raster, 0)?;
            pixel::palette_to_rgba(width, height, &indices, palette, background, &mut rgba)?;
        }
        PixelKind::DataGrid => {
            let (rgb, alpha) = match &symbolizer.color_map {
                Some(map) => ramp_planes(raster, 0, map),
                None => stretch_planes(raster, stats),
            };
            pixel::rgb_alpha_to_rgba(width, height, &rgb, &alpha, &mut rgba)?;
        }
        PixelKind::Grayscale | PixelKind::Rgb | PixelKind::Multiband => {
            if let Some(map) = &symbolizer.color_map {
                let band = match symbolizer.band_selection {
                    Some(BandSelection::Mono(band)) => band,
                    _ => 0,
                };
                check_band(raster, band)?;
                let (rgb, alpha) = ramp_planes(raster, band, map);
                pixel::rgb_alpha_to_rgba(width, height, &rgb, &alpha, &mut rgba)?;
                return Ok(rgba);
            }
            match out_kind {
                PixelKind::Grayscale => {
                    let band = match symbolizer.band_selection {
                        Some(BandSelection::Mono(band)) => band,
                        _ => 0,
                    };
                    let gray = band_plane(raster, band)?;
                    pixel::gray_to_rgba(width, height, &gray, background.luma(), &mut rgba)?;
                }
                PixelKind::Rgb => {
                    let rgb = rgb_plane(raster, symbolizer.band_selection)?;
                    pixel::rgb_to_rgba(width, height, &rgb, background, &mut rgba)?;
                }
                other => {
                    return Err(RenderError::UnsupportedPixelKind(format!(
                        "{:?} raster cannot be rendered as {:?}",
                        raster.pixel_kind, other
                    )))
                }
            }
        }
    }
    Ok(rgba)
}

pub(crate) fn alloc_rgba(count: usize) -> RenderResult<Vec<u8>> {
    let len = count
        .checked_mul(4)
        .ok_or_else(|| RenderError::AllocationFailure(format!("{} pixel buffer", count)))?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| RenderError::AllocationFailure(format!("{} byte buffer: {}", len, e)))?;
    buf.resize(len, 0);
    Ok(buf)
}

fn check_band(raster: &RawRaster, band: u8) -> RenderResult<()> {
    if band >= raster.bands {
        return Err(RenderError::UnsupportedPixelKind(format!(
            "band {} requested from a {}-band raster",
            band, raster.bands
        )));
    }
    Ok(())
}

fn band_plane(raster: &RawRaster, band: u8) -> RenderResult<Vec<u8>> {
    check_band(raster, band)?;
    Ok((0..raster.pixel_count())
        .map(|i| raster.sample_u8(i, band))
        .collect())
}

fn rgb_plane(raster: &RawRaster, selection: Option<BandSelection>) -> RenderResult<Vec<u8>> {
    let (r, g, b) = match selection {
        Some(BandSelection::Triple { red, green, blue }) => (red, green, blue),
        Some(BandSelection::Mono(band)) => (band, band, band),
        None if raster.bands >= 3 => (0, 1, 2),
        None => (0, 0, 0),
    };
    check_band(raster, r.max(g).max(b))?;
    let mut rgb = Vec::with_capacity(raster.pixel_count() * 3);
    for i in 0..raster.pixel_count() {
        rgb.extend_from_slice(&[
            raster.sample_u8(i, r),
            raster.sample_u8(i, g),
            raster.sample_u8(i, b),
        ]);
    }
    Ok(rgb)
}

fn ramp_planes(raster: &RawRaster, band: u8, map: &ColorMap) -> (Vec<u8>, Vec<u8>) {
    let count = raster.pixel_count();
    let mut rgb = Vec::with_capacity(count * 3);
    let mut alpha = Vec::with_capacity(count);
    for i in 0..count {
        let value = raster.sample(i, band);
        if raster.is_no_data(value) {
            rgb.extend_from_slice(&[0, 0, 0]);
            alpha.push(0);
        } else {
            let color = map.color_for(value);
            rgb.extend_from_slice(&[color.r, color.g, color.b]);
            alpha.push(255);
        }
    }
    (rgb, alpha)
}

/// Linear stretch of band 0 over `stats`, or over the buffer's own valid
/// values when the coverage has no statistics.
fn stretch_planes(raster: &RawRaster, stats: Option<BandStatistics>) -> (Vec<u8>, Vec<u8>) {
    let count = raster.pixel_count();
    let (min, max) = match stats {
        Some(stats) => (stats.min, stats.max),
        None => {
            log::warn!(target: "raster", "data grid without statistics, stretching per tile");
            let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
            for i in 0..count {
                let value = raster.sample(i, 0);
                if !raster.is_no_data(value) {
                    min = min.min(value);
                    max = max.max(value);
                }
            }
            (min, max)
        }
    };
    let range = max - min;
    let mut rgb = Vec::with_capacity(count * 3);
    let mut alpha = Vec::with_capacity(count);
    for i in 0..count {
        let value = raster.sample(i, 0);
        if raster.is_no_data(value) {
            rgb.extend_from_slice(&[0, 0, 0]);
            alpha.push(0);
            continue;
        }
        let gray = if range > 0.0 {
            ((value - min) / range * 255.0).round().clamp(0.0, 255.0) as u8
        } else {
            128
        };
        rgb.extend_from_slice(&[gray, gray, gray]);
        alpha.push(255);
    }
    log::debug!(target: "raster", "data grid stretched over {}..{}", min, max);
    (rgb, alpha)
}
