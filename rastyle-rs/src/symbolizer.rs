//! Raster symbolizers and output pixel kind promotion.

use crate::error::{RenderError, RenderResult};
use crate::storage::{CoverageInfo, PixelKind, Scale};
use rastyle_canvas::{Rgb, Rgba};

/// Which bands of a multiband coverage are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSelection {
    Triple { red: u8, green: u8, blue: u8 },
    Mono(u8),
}

impl BandSelection {
    fn max_band(&self) -> u8 {
        match *self {
            BandSelection::Triple { red, green, blue } => red.max(green).max(blue),
            BandSelection::Mono(band) => band,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMapEntry {
    pub value: f64,
    pub color: Rgb,
}

/// Interpolated color ramp for single-band values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    entries: Vec<ColorMapEntry>,
}

impl ColorMap {
    /// Entries are sorted by value; at least one is required.
    pub fn new(mut entries: Vec<ColorMapEntry>) -> RenderResult<Self> {
        if entries.is_empty() || entries.iter().any(|e| !e.value.is_finite()) {
            return Err(RenderError::UnsupportedPixelKind(
                "color map needs at least one finite entry".to_string(),
            ));
        }
        entries.sort_by(|a, b| a.value.total_cmp(&b.value));
        Ok(Self { entries })
    }

    /// Build a ramp from `(value, css color)` pairs.
    pub fn from_css(stops: &[(f64, &str)]) -> RenderResult<Self> {
        let entries = stops
            .iter()
            .map(|(value, css)| {
                Ok(ColorMapEntry {
                    value: *value,
                    color: Rgb::from(Rgba::parse(css)?),
                })
            })
            .collect::<RenderResult<Vec<_>>>()?;
        Self::new(entries)
    }

    /// Color for `value`, clamped to the end entries.
    pub fn color_for(&self, value: f64) -> Rgb {
        let entries = &self.entries;
        let first = entries[0];
        let last = entries[entries.len() - 1];
        if value <= first.value {
            return first.color;
        }
        if value >= last.value {
            return last.color;
        }
        let upper = entries.partition_point(|e| e.value <= value);
        let (lo, hi) = (entries[upper - 1], entries[upper]);
        let t = (value - lo.value) / (hi.value - lo.value);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(
            mix(lo.color.r, hi.color.r),
            mix(lo.color.g, hi.color.g),
            mix(lo.color.b, hi.color.b),
        )
    }
}

/// Brightness-only hillshade overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedRelief {
    /// Vertical exaggeration applied to the elevation gradient.
    pub relief_factor: f64,
}

impl Default for ShadedRelief {
    fn default() -> Self {
        Self { relief_factor: 1.0 }
    }
}

/// Style of one raster layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSymbolizer {
    /// 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f64,
    pub band_selection: Option<BandSelection>,
    pub color_map: Option<ColorMap>,
    pub shaded_relief: Option<ShadedRelief>,
}

impl Default for RasterSymbolizer {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            band_selection: None,
            color_map: None,
            shaded_relief: None,
        }
    }
}

impl RasterSymbolizer {
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    pub fn with_bands(mut self, bands: BandSelection) -> Self {
        self.band_selection = Some(bands);
        self
    }

    pub fn with_color_map(mut self, color_map: ColorMap) -> Self {
        self.color_map = Some(color_map);
        self
    }

    pub fn with_shaded_relief(mut self, relief_factor: f64) -> Self {
        self.shaded_relief = Some(ShadedRelief { relief_factor });
        self
    }
}

/// Output pixel kind for a coverage read at `scale` and styled by `symbolizer`.
///
/// Indexed and 1-bit data read below native scale are promoted so that
/// resampling can produce intermediate values; band selections and color
/// ramps decide the kind for everything else.
pub fn promote_pixel_kind(
    info: &CoverageInfo,
    symbolizer: &RasterSymbolizer,
    scale: Scale,
) -> RenderResult<PixelKind> {
    if let Some(bands) = symbolizer.band_selection {
        if bands.max_band() >= info.bands {
            return Err(RenderError::UnsupportedPixelKind(format!(
                "band {} requested from a {}-band coverage",
                bands.max_band(),
                info.bands
            )));
        }
    }
    let rescaled = scale != Scale::Full;
    let ramp = symbolizer.color_map.is_some();
    let kind = match (info.pixel_kind, symbolizer.band_selection) {
        (PixelKind::Monochrome, _) if rescaled => PixelKind::Grayscale,
        (PixelKind::Monochrome, _) => PixelKind::Monochrome,
        (PixelKind::Palette, _) if rescaled => PixelKind::Rgb,
        (PixelKind::Palette, _) => {
            if info.palette.is_none() {
                return Err(RenderError::UnsupportedPixelKind(
                    "palette coverage without a palette".to_string(),
                ));
            }
            PixelKind::Palette
        }
        (PixelKind::Rgb, Some(BandSelection::Mono(_))) if !ramp => PixelKind::Grayscale,
        (PixelKind::Rgb, _) => PixelKind::Rgb,
        (PixelKind::Grayscale, Some(BandSelection::Triple { .. })) => PixelKind::Rgb,
        (PixelKind::Grayscale, _) if ramp => PixelKind::Rgb,
        (PixelKind::Grayscale, _) => PixelKind::Grayscale,
        (PixelKind::Multiband, Some(BandSelection::Triple { .. })) => PixelKind::Rgb,
        (PixelKind::Multiband, _) if ramp => PixelKind::Rgb,
        (PixelKind::Multiband, Some(BandSelection::Mono(_))) => PixelKind::Grayscale,
        (PixelKind::Multiband, None) if info.bands >= 3 => PixelKind::Rgb,
        (PixelKind::Multiband, None) => PixelKind::Grayscale,
        (PixelKind::DataGrid, _) if ramp => PixelKind::Rgb,
        (PixelKind::DataGrid, Some(BandSelection::Triple { .. })) => {
            return Err(RenderError::UnsupportedPixelKind(
                "triple band selection on a data grid".to_string(),
            ))
        }
        (PixelKind::DataGrid, _) => PixelKind::Grayscale,
    };
    log::debug!(
        target: "raster",
        "pixel kind {:?} at {:?} -> {:?}",
        info.pixel_kind,
        scale,
        kind
    );
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastyle_canvas::pixel::Palette;
    use rstest::rstest;

    fn info(pixel_kind: PixelKind, bands: u8) -> CoverageInfo {
        let palette = (pixel_kind == PixelKind::Palette)
            .then(|| Palette::new(vec![Rgb::gray(0), Rgb::gray(255)]).unwrap());
        CoverageInfo {
            pixel_kind,
            bands,
            palette,
            statistics: Vec::new(),
        }
    }

    fn ramp() -> ColorMap {
        ColorMap::from_css(&[(0.0, "#000000"), (100.0, "#ffffff")]).unwrap()
    }

    #[rstest]
    #[case(PixelKind::Monochrome, 1, Scale::Full, PixelKind::Monochrome)]
    #[case(PixelKind::Monochrome, 1, Scale::Half, PixelKind::Grayscale)]
    #[case(PixelKind::Palette, 1, Scale::Full, PixelKind::Palette)]
    #[case(PixelKind::Palette, 1, Scale::Quarter, PixelKind::Rgb)]
    #[case(PixelKind::Grayscale, 1, Scale::Eighth, PixelKind::Grayscale)]
    #[case(PixelKind::Rgb, 3, Scale::Half, PixelKind::Rgb)]
    #[case(PixelKind::Multiband, 4, Scale::Full, PixelKind::Rgb)]
    #[case(PixelKind::Multiband, 2, Scale::Full, PixelKind::Grayscale)]
    #[case(PixelKind::DataGrid, 1, Scale::Full, PixelKind::Grayscale)]
    fn test_default_promotion(
        #[case] kind: PixelKind,
        #[case] bands: u8,
        #[case] scale: Scale,
        #[case] expected: PixelKind,
    ) {
        let out = promote_pixel_kind(&info(kind, bands), &RasterSymbolizer::default(), scale).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_ramp_promotes_to_rgb() {
        let sym = RasterSymbolizer::default().with_color_map(ramp());
        for kind in [PixelKind::Grayscale, PixelKind::DataGrid] {
            assert_eq!(
                promote_pixel_kind(&info(kind, 1), &sym, Scale::Full).unwrap(),
                PixelKind::Rgb
            );
        }
    }

    #[test]
    fn test_triple_band_on_grayscale() {
        let sym = RasterSymbolizer::default().with_bands(BandSelection::Triple {
            red: 0,
            green: 0,
            blue: 0,
        });
        assert_eq!(
            promote_pixel_kind(&info(PixelKind::Grayscale, 1), &sym, Scale::Full).unwrap(),
            PixelKind::Rgb
        );
    }

    #[test]
    fn test_band_out_of_range() {
        let sym = RasterSymbolizer::default().with_bands(BandSelection::Mono(5));
        assert!(matches!(
            promote_pixel_kind(&info(PixelKind::Multiband, 4), &sym, Scale::Full),
            Err(RenderError::UnsupportedPixelKind(_))
        ));
    }

    #[test]
    fn test_color_map_interpolates_and_clamps() {
        let map = ramp();
        assert_eq!(map.color_for(-5.0), Rgb::gray(0));
        assert_eq!(map.color_for(50.0), Rgb::gray(128));
        assert_eq!(map.color_for(1e9), Rgb::gray(255));
    }

    #[test]
    fn test_opacity_clamped() {
        assert_eq!(RasterSymbolizer::default().with_opacity(3.0).opacity, 1.0);
        assert_eq!(RasterSymbolizer::default().with_opacity(f64::NAN).opacity, 1.0);
    }
}
