//! Storage collaborator interface and the raster data it returns.

use crate::error::{RenderError, RenderResult};
use crate::symbolizer::BandSelection;
use rastyle_canvas::pixel::Palette;
use rastyle_canvas::Rgb;

/// A geographic rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Extent {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Overlap of two extents, `None` when they only touch or are disjoint.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        let ix = Extent {
            minx: self.minx.max(other.minx),
            miny: self.miny.max(other.miny),
            maxx: self.maxx.min(other.maxx),
            maxy: self.maxy.min(other.maxy),
        };
        (!ix.is_empty()).then_some(ix)
    }
}

/// Native sample layout of a coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelKind {
    /// 1-bit samples, 1 = ink.
    Monochrome,
    /// 8-bit indices into a palette.
    Palette,
    /// 8-bit single band.
    Grayscale,
    /// 8-bit interleaved red, green, blue.
    Rgb,
    /// Any number of interleaved bands.
    Multiband,
    /// One band of integer or floating point measurements.
    DataGrid,
}

/// Zoom scale at which a pyramid level is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// Native 1:1 resolution.
    #[default]
    Full,
    Half,
    Quarter,
    Eighth,
}

/// Resolution level chosen by the storage layer for a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionLevel {
    pub level_id: u32,
    pub scale: Scale,
    /// Ground units per pixel at this level.
    pub x_res: f64,
    pub y_res: f64,
}

/// Interleaved sample buffer, one variant per sample type.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(v) => v.len(),
            Samples::U16(v) => v.len(),
            Samples::I16(v) => v.len(),
            Samples::I32(v) => v.len(),
            Samples::U32(v) => v.len(),
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self, index: usize) -> f64 {
        match self {
            Samples::U8(v) => v[index] as f64,
            Samples::U16(v) => v[index] as f64,
            Samples::I16(v) => v[index] as f64,
            Samples::I32(v) => v[index] as f64,
            Samples::U32(v) => v[index] as f64,
            Samples::F32(v) => v[index] as f64,
            Samples::F64(v) => v[index],
        }
    }

    /// Sample mapped onto 0..=255: 8-bit values pass through, 16-bit
    /// unsigned values are scaled down, anything else is clamped.
    pub fn value_u8(&self, index: usize) -> u8 {
        match self {
            Samples::U8(v) => v[index],
            Samples::U16(v) => (v[index] / 257) as u8,
            other => other.value(index).round().clamp(0.0, 255.0) as u8,
        }
    }
}

/// Raw samples returned for one request.
#[derive(Debug, Clone)]
pub struct RawRaster {
    pub width: u32,
    pub height: u32,
    pub bands: u8,
    pub pixel_kind: PixelKind,
    pub samples: Samples,
    pub palette: Option<Palette>,
    pub no_data: Option<f64>,
}

impl RawRaster {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that the buffer holds `width * height * bands` samples.
    pub fn validate(&self) -> RenderResult<()> {
        let expected = self.pixel_count() * self.bands as usize;
        if self.bands == 0 || self.samples.len() != expected {
            return Err(RenderError::StorageQueryFailure(format!(
                "raster {}x{}x{} holds {} samples",
                self.width,
                self.height,
                self.bands,
                self.samples.len()
            )));
        }
        Ok(())
    }

    pub fn sample(&self, pixel: usize, band: u8) -> f64 {
        self.samples.value(pixel * self.bands as usize + band as usize)
    }

    pub fn sample_u8(&self, pixel: usize, band: u8) -> u8 {
        self.samples.value_u8(pixel * self.bands as usize + band as usize)
    }

    pub fn is_no_data(&self, value: f64) -> bool {
        value.is_nan() || self.no_data == Some(value)
    }
}

/// Value range of one band over the whole coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStatistics {
    pub min: f64,
    pub max: f64,
}

/// Static description of a coverage.
#[derive(Debug, Clone)]
pub struct CoverageInfo {
    pub pixel_kind: PixelKind,
    pub bands: u8,
    pub palette: Option<Palette>,
    /// Per-band statistics, empty when the store keeps none.
    pub statistics: Vec<BandStatistics>,
}

impl CoverageInfo {
    pub fn band_statistics(&self, band: u8) -> Option<BandStatistics> {
        self.statistics
            .get(band as usize)
            .copied()
            .filter(|s| s.min.is_finite() && s.max.is_finite() && s.min <= s.max)
    }
}

/// One tile of a mixed-resolution coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    pub id: i64,
    pub extent: Extent,
}

/// Parameters of one raw raster fetch.
#[derive(Debug, Clone, Copy)]
pub struct RasterRequest<'a> {
    pub coverage: &'a str,
    /// Restrict the fetch to one section of a mixed-resolution coverage.
    pub section: Option<i64>,
    pub extent: Extent,
    pub width: u32,
    pub height: u32,
    pub level: ResolutionLevel,
    /// Output pixel kind after promotion. Stores read below native scale
    /// may return samples of this kind instead of the native one.
    pub pixel_kind: PixelKind,
    /// Bands to display. Samples returned as the promoted `pixel_kind`
    /// must already have this selection applied.
    pub band_selection: Option<BandSelection>,
    /// Declared background; storage fills gaps with it.
    pub background: Rgb,
}

/// Elevation samples for shaded relief, row-major from the north edge.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
    pub x_res: f64,
    pub y_res: f64,
    pub no_data: Option<f32>,
}

/// Query surface of the raster storage layer.
///
/// Implementations are shared by concurrent fetch workers.
pub trait RasterStore: Sync {
    fn coverage_info(&self, coverage: &str) -> RenderResult<CoverageInfo>;

    /// Best pyramid level for the requested resolution, optionally for one
    /// section of a mixed-resolution coverage.
    fn find_best_resolution_level(
        &self,
        coverage: &str,
        section: Option<i64>,
        x_res: f64,
        y_res: f64,
    ) -> RenderResult<ResolutionLevel>;

    fn get_raw_raster_data(&self, request: &RasterRequest<'_>) -> RenderResult<RawRaster>;

    fn is_mixed_resolution(&self, coverage: &str) -> RenderResult<bool>;

    /// Sections of `coverage` intersecting `extent`.
    fn sections(&self, coverage: &str, extent: &Extent) -> RenderResult<Vec<Section>>;

    fn get_elevation(
        &self,
        coverage: &str,
        extent: &Extent,
        level: &ResolutionLevel,
        width: u32,
        height: u32,
    ) -> RenderResult<ElevationGrid>;
}
