use rastyle::canvas::pixel::Palette;
use rastyle::canvas::Rgb;
use rastyle::{
    BandSelection, BandStatistics, Composite, CompositionRequest, CoverageInfo, ElevationGrid, Encoder, Extent,
    GroupCompositor, OutputFormat, PixelKind, RasterLayer, RasterLayerRenderer, RasterRequest, RasterStore,
    RasterSymbolizer, RawRaster, RenderConfig, RenderError, RenderResult, ResolutionLevel, Samples, Scale, Section,
    StandardEncoder,
};
use rstest::rstest;
use std::collections::HashMap;
use std::sync::Mutex;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type ColorFn = fn(f64, f64) -> [u8; 3];
type ValueFn = fn(f64, f64) -> f64;
type ElevationFn = fn(f64, f64) -> f32;

/// Extra band carried by multiband coverages.
const NIR: u8 = 7;
const NO_DATA: f64 = -9999.0;

struct MockCoverage {
    kind: PixelKind,
    color: ColorFn,
    /// Measurements of a data grid coverage.
    values: Option<ValueFn>,
    statistics: Vec<BandStatistics>,
    level: ResolutionLevel,
    /// Mixed-resolution sections with their own levels.
    sections: Vec<(Section, ResolutionLevel)>,
    elevation: Option<ElevationFn>,
}

impl MockCoverage {
    fn new(kind: PixelKind, color: ColorFn, level: ResolutionLevel) -> Self {
        Self {
            kind,
            color,
            values: None,
            statistics: Vec::new(),
            level,
            sections: Vec::new(),
            elevation: None,
        }
    }

    fn bands(&self) -> u8 {
        kind_bands(self.kind)
    }
}

fn kind_bands(kind: PixelKind) -> u8 {
    match kind {
        PixelKind::Rgb => 3,
        PixelKind::Multiband => 4,
        _ => 1,
    }
}

/// In-memory store sampling coverage colors at pixel centres.
///
/// Monochrome and palette coverages read below full scale come back as
/// the requested output kind, unless `reply_as` forces a sample layout.
#[derive(Default)]
struct MockStore {
    coverages: HashMap<String, MockCoverage>,
    reply_as: Option<PixelKind>,
    requested: Mutex<Vec<PixelKind>>,
}

fn level(id: u32, x_res: f64, y_res: f64) -> ResolutionLevel {
    ResolutionLevel {
        level_id: id,
        scale: Scale::Full,
        x_res,
        y_res,
    }
}

fn mock_palette() -> Palette {
    Palette::new(vec![BG, Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]).unwrap()
}

impl MockStore {
    fn insert(mut self, name: &str, coverage: MockCoverage) -> Self {
        self.coverages.insert(name.to_string(), coverage);
        self
    }

    fn with(self, name: &str, color: ColorFn, res: f64) -> Self {
        self.insert(name, MockCoverage::new(PixelKind::Rgb, color, level(0, res, res)))
    }

    fn with_level(self, name: &str, color: ColorFn, lvl: ResolutionLevel) -> Self {
        self.insert(name, MockCoverage::new(PixelKind::Rgb, color, lvl))
    }

    fn with_kind(self, name: &str, kind: PixelKind, color: ColorFn, lvl: ResolutionLevel) -> Self {
        self.insert(name, MockCoverage::new(kind, color, lvl))
    }

    fn with_grid(self, name: &str, values: ValueFn, statistics: Vec<BandStatistics>, lvl: ResolutionLevel) -> Self {
        let mut coverage = MockCoverage::new(PixelKind::DataGrid, |_, _| [0, 0, 0], lvl);
        coverage.values = Some(values);
        coverage.statistics = statistics;
        self.insert(name, coverage)
    }

    fn with_sections(self, name: &str, color: ColorFn, sections: Vec<(Section, ResolutionLevel)>) -> Self {
        let mut coverage = MockCoverage::new(PixelKind::Rgb, color, level(0, 1.0, 1.0));
        coverage.sections = sections;
        self.insert(name, coverage)
    }

    fn with_elevation(self, name: &str, elevation: ElevationFn, res: f64) -> Self {
        let mut coverage = MockCoverage::new(PixelKind::Rgb, |_, _| [0, 0, 0], level(0, res, res));
        coverage.elevation = Some(elevation);
        self.insert(name, coverage)
    }

    fn replying_as(mut self, kind: PixelKind) -> Self {
        self.reply_as = Some(kind);
        self
    }

    fn requested(&self) -> Vec<PixelKind> {
        self.requested.lock().unwrap().clone()
    }

    fn coverage(&self, name: &str) -> RenderResult<&MockCoverage> {
        self.coverages
            .get(name)
            .ok_or_else(|| RenderError::StorageQueryFailure(format!("no coverage {}", name)))
    }
}

fn centre(extent: &Extent, width: u32, height: u32, col: u32, row: u32) -> (f64, f64) {
    let x = extent.minx + (col as f64 + 0.5) * extent.width() / width as f64;
    let y = extent.maxy - (row as f64 + 0.5) * extent.height() / height as f64;
    (x, y)
}

/// Samples of one pixel of color `[r, g, b]` laid out as `kind`.
fn pixel_samples(native: PixelKind, kind: PixelKind, [r, g, b]: [u8; 3], palette: &Palette) -> Vec<u8> {
    let color = Rgb::new(r, g, b);
    match kind {
        PixelKind::Rgb => vec![r, g, b],
        PixelKind::Multiband => vec![r, g, b, NIR],
        PixelKind::Grayscale if native == PixelKind::Monochrome => {
            vec![if color == BG { BG.luma() } else { 0 }]
        }
        PixelKind::Grayscale => vec![r],
        PixelKind::Palette => vec![palette.index_of(color)],
        PixelKind::Monochrome => vec![u8::from(color != BG)],
        PixelKind::DataGrid => unreachable!("data grids carry measurements"),
    }
}

impl RasterStore for MockStore {
    fn coverage_info(&self, coverage: &str) -> RenderResult<CoverageInfo> {
        let cov = self.coverage(coverage)?;
        Ok(CoverageInfo {
            pixel_kind: cov.kind,
            bands: cov.bands(),
            palette: (cov.kind == PixelKind::Palette).then(mock_palette),
            statistics: cov.statistics.clone(),
        })
    }

    fn find_best_resolution_level(
        &self,
        coverage: &str,
        section: Option<i64>,
        _x_res: f64,
        _y_res: f64,
    ) -> RenderResult<ResolutionLevel> {
        let cov = self.coverage(coverage)?;
        match section {
            Some(id) => cov
                .sections
                .iter()
                .find(|(s, _)| s.id == id)
                .map(|(_, l)| *l)
                .ok_or_else(|| RenderError::StorageQueryFailure(format!("no section {}", id))),
            None => Ok(cov.level),
        }
    }

    fn get_raw_raster_data(&self, request: &RasterRequest<'_>) -> RenderResult<RawRaster> {
        let cov = self.coverage(request.coverage)?;
        self.requested.lock().unwrap().push(request.pixel_kind);
        let kind = match (self.reply_as, cov.kind) {
            (Some(forced), _) => forced,
            (None, PixelKind::Monochrome | PixelKind::Palette) if request.level.scale != Scale::Full => {
                request.pixel_kind
            }
            (None, native) => native,
        };
        let centres: Vec<(f64, f64)> = (0..request.height)
            .flat_map(|row| (0..request.width).map(move |col| (col, row)))
            .map(|(col, row)| centre(&request.extent, request.width, request.height, col, row))
            .collect();

        if kind == PixelKind::DataGrid {
            let values = cov
                .values
                .ok_or_else(|| RenderError::StorageQueryFailure(format!("{} has no values", request.coverage)))?;
            return Ok(RawRaster {
                width: request.width,
                height: request.height,
                bands: 1,
                pixel_kind: kind,
                samples: Samples::F32(centres.iter().map(|&(x, y)| values(x, y) as f32).collect()),
                palette: None,
                no_data: Some(NO_DATA),
            });
        }

        let palette = mock_palette();
        let samples: Vec<u8> = centres
            .iter()
            .flat_map(|&(x, y)| pixel_samples(cov.kind, kind, (cov.color)(x, y), &palette))
            .collect();
        Ok(RawRaster {
            width: request.width,
            height: request.height,
            bands: kind_bands(kind),
            pixel_kind: kind,
            samples: Samples::U8(samples),
            palette: (kind == PixelKind::Palette).then_some(palette),
            no_data: None,
        })
    }

    fn is_mixed_resolution(&self, coverage: &str) -> RenderResult<bool> {
        Ok(!self.coverage(coverage)?.sections.is_empty())
    }

    fn sections(&self, coverage: &str, extent: &Extent) -> RenderResult<Vec<Section>> {
        Ok(self
            .coverage(coverage)?
            .sections
            .iter()
            .map(|(s, _)| *s)
            .filter(|s| s.extent.intersection(extent).is_some())
            .collect())
    }

    fn get_elevation(
        &self,
        coverage: &str,
        extent: &Extent,
        _level: &ResolutionLevel,
        width: u32,
        height: u32,
    ) -> RenderResult<ElevationGrid> {
        let cov = self.coverage(coverage)?;
        let elevation = cov
            .elevation
            .ok_or_else(|| RenderError::StorageQueryFailure(format!("{} has no elevation", coverage)))?;
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height {
            for col in 0..width {
                let (x, y) = centre(extent, width, height, col, row);
                values.push(elevation(x, y));
            }
        }
        Ok(ElevationGrid {
            width,
            height,
            values,
            x_res: extent.width() / width as f64,
            y_res: extent.height() / height as f64,
            no_data: None,
        })
    }
}

const BG: Rgb = Rgb::new(200, 200, 200);

fn checker(x: f64, y: f64) -> [u8; 3] {
    if ((x / 10.0).floor() as i64 + (y / 10.0).floor() as i64) % 2 == 0 {
        [255, 0, 0]
    } else {
        [0, 0, 255]
    }
}

fn all_background(_: f64, _: f64) -> [u8; 3] {
    [BG.r, BG.g, BG.b]
}

fn request() -> CompositionRequest {
    CompositionRequest::new(100, 100, Extent::new(0.0, 0.0, 100.0, 100.0)).with_background(BG)
}

fn composite(store: &MockStore, config: &RenderConfig, layers: &[RasterLayer]) -> RenderResult<Composite> {
    GroupCompositor::new(store, &StandardEncoder, config).composite_rgba(layers, &request())
}

#[test]
fn test_single_rgb_layer_is_exact() {
    init_logger();
    let store = MockStore::default().with("ortho", checker, 1.0);
    let config = RenderConfig::default();
    let result = composite(&store, &config, &[RasterLayer::new("ortho", RasterSymbolizer::default())]).unwrap();

    assert!(result.alpha.iter().all(|a| *a == 255));
    for row in 0..100u32 {
        for col in 0..100u32 {
            let (x, y) = centre(&request().extent, 100, 100, col, row);
            let i = (row * 100 + col) as usize * 3;
            assert_eq!(&result.rgb[i..i + 3], &checker(x, y));
        }
    }
}

#[test]
fn test_transparent_layer_changes_nothing() {
    let store = MockStore::default()
        .with("ortho", checker, 1.0)
        .with("blank", all_background, 1.0);
    let config = RenderConfig::default();
    let base = composite(&store, &config, &[RasterLayer::new("ortho", RasterSymbolizer::default())]).unwrap();
    let layered = composite(
        &store,
        &config,
        &[
            RasterLayer::new("ortho", RasterSymbolizer::default()),
            RasterLayer::new("blank", RasterSymbolizer::default()),
        ],
    )
    .unwrap();
    assert_eq!(base, layered);
}

#[test]
fn test_empty_layer_list_is_background() {
    let store = MockStore::default();
    let result = composite(&store, &RenderConfig::default(), &[]).unwrap();
    assert!(result.alpha.iter().all(|a| *a == 0));
    assert!(result.rgb.chunks_exact(3).all(|px| px == [200, 200, 200]));
}

#[test]
fn test_later_layers_paint_over() {
    fn green(_: f64, _: f64) -> [u8; 3] {
        [0, 255, 0]
    }
    let store = MockStore::default()
        .with("ortho", checker, 1.0)
        .with("green", green, 1.0);
    let result = composite(
        &store,
        &RenderConfig::default(),
        &[
            RasterLayer::new("ortho", RasterSymbolizer::default()),
            RasterLayer::new("green", RasterSymbolizer::default()),
        ],
    )
    .unwrap();
    assert!(result.rgb.chunks_exact(3).all(|px| px == [0, 255, 0]));
}

#[test]
fn test_mixed_resolution_sections_tile_exactly() {
    init_logger();
    fn by_half(x: f64, _: f64) -> [u8; 3] {
        if x < 50.0 {
            [255, 0, 0]
        } else {
            [0, 0, 255]
        }
    }
    let sections = vec![
        (
            Section {
                id: 1,
                extent: Extent::new(0.0, 0.0, 50.0, 100.0),
            },
            level(0, 1.0, 1.0),
        ),
        (
            Section {
                id: 2,
                extent: Extent::new(50.0, 0.0, 100.0, 100.0),
            },
            level(1, 2.0, 2.0),
        ),
    ];
    let store = MockStore::default().with_sections("mosaic", by_half, sections);
    let result = composite(
        &store,
        &RenderConfig::default(),
        &[RasterLayer::new("mosaic", RasterSymbolizer::default())],
    )
    .unwrap();

    assert!(result.alpha.iter().all(|a| *a == 255), "gap between sections");
    for row in 0..100usize {
        let west = &result.rgb[(row * 100 + 49) * 3..(row * 100 + 49) * 3 + 3];
        let east = &result.rgb[(row * 100 + 50) * 3..(row * 100 + 50) * 3 + 3];
        assert_eq!(west, &[255, 0, 0]);
        assert!(east[0] <= 2 && east[2] >= 253, "east pixel {:?}", east);
    }
}

#[test]
fn test_aspect_mismatch() {
    let store = MockStore::default().with_level("stretched", checker, level(0, 1.0, 2.0));
    let layers = [RasterLayer::new("stretched", RasterSymbolizer::default())];
    let err = composite(&store, &RenderConfig::default(), &layers).unwrap_err();
    assert!(matches!(err, RenderError::AspectMismatch { .. }));

    let permissive = RenderConfig {
        allow_reaspect: true,
        ..RenderConfig::default()
    };
    let result = composite(&store, &permissive, &layers).unwrap();
    assert!(result.alpha.iter().all(|a| *a == 255));
}

#[test]
fn test_unknown_coverage_fails() {
    let store = MockStore::default();
    let err = composite(
        &store,
        &RenderConfig::default(),
        &[RasterLayer::new("missing", RasterSymbolizer::default())],
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::StorageQueryFailure(_)));
}

#[test]
fn test_relief_darkens_opaque_pixels() {
    fn white(_: f64, _: f64) -> [u8; 3] {
        [250, 250, 250]
    }
    fn flat(_: f64, _: f64) -> f32 {
        100.0
    }
    let store = MockStore::default()
        .with("white", white, 1.0)
        .with_elevation("dem", flat, 1.0);
    let result = composite(
        &store,
        &RenderConfig::default(),
        &[
            RasterLayer::new("white", RasterSymbolizer::default()),
            RasterLayer::new("dem", RasterSymbolizer::default().with_shaded_relief(1.0)),
        ],
    )
    .unwrap();
    // Flat terrain under a 45 degree sun keeps cos(45) of the brightness
    let expected = (250.0 * 45f32.to_radians().cos()).round() as i32;
    for px in result.rgb.chunks_exact(3) {
        assert!((px[0] as i32 - expected).abs() <= 1);
    }
    assert!(result.alpha.iter().all(|a| *a == 255));
}

#[test]
fn test_relief_leaves_background_alone() {
    fn ridge(x: f64, _: f64) -> f32 {
        (x * 3.0) as f32
    }
    let store = MockStore::default().with_elevation("dem", ridge, 1.0);
    let result = composite(
        &store,
        &RenderConfig::default(),
        &[RasterLayer::new("dem", RasterSymbolizer::default().with_shaded_relief(2.0))],
    )
    .unwrap();
    assert!(result.rgb.chunks_exact(3).all(|px| px == [200, 200, 200]));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(8)]
fn test_worker_count_does_not_change_output(#[case] workers: usize) {
    fn stripes(x: f64, _: f64) -> [u8; 3] {
        if (x as i64) % 3 == 0 {
            [BG.r, BG.g, BG.b]
        } else {
            [0, 128, 0]
        }
    }
    let store = MockStore::default()
        .with("ortho", checker, 1.0)
        .with("stripes", stripes, 1.0)
        .with("blank", all_background, 1.0);
    let layers = [
        RasterLayer::new("ortho", RasterSymbolizer::default()),
        RasterLayer::new("stripes", RasterSymbolizer::default()),
        RasterLayer::new("blank", RasterSymbolizer::default()),
    ];
    let sequential = composite(&store, &RenderConfig::default(), &layers).unwrap();
    let config = RenderConfig {
        max_workers: workers,
        ..RenderConfig::default()
    };
    assert_eq!(composite(&store, &config, &layers).unwrap(), sequential);
}

#[test]
fn test_rescaled_layer_fills_canvas() {
    fn orange(_: f64, _: f64) -> [u8; 3] {
        [255, 128, 0]
    }
    // Native pixels four times coarser than requested
    let store = MockStore::default().with("coarse", orange, 4.0);
    let result = composite(
        &store,
        &RenderConfig::default(),
        &[RasterLayer::new("coarse", RasterSymbolizer::default())],
    )
    .unwrap();
    assert!(result.alpha.iter().all(|a| *a == 255));
    assert!(result
        .rgb
        .chunks_exact(3)
        .all(|px| px[0] >= 253 && (px[1] as i32 - 128).abs() <= 2 && px[2] <= 2));
}

fn decode_png(bytes: &[u8]) -> (png::ColorType, Vec<u8>) {
    let mut reader = png::Decoder::new(bytes).read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info.color_type, buf)
}

#[test]
fn test_composite_encodes_png_with_alpha() {
    let store = MockStore::default().with("ortho", checker, 1.0);
    let config = RenderConfig::default();
    let compositor = GroupCompositor::new(&store, &StandardEncoder, &config);
    let layers = [RasterLayer::new("ortho", RasterSymbolizer::default())];

    let png = compositor.composite(&layers, &request()).unwrap();
    let (color, data) = decode_png(&png);
    assert_eq!(color, png::ColorType::Rgba);
    assert_eq!(data.len(), 100 * 100 * 4);

    let opaque = compositor
        .composite(&layers, &request().with_transparent(false))
        .unwrap();
    assert_eq!(decode_png(&opaque).0, png::ColorType::Rgb);

    let jpeg = compositor
        .composite(&layers, &request().with_format(OutputFormat::Jpeg, 90))
        .unwrap();
    assert!(jpeg.starts_with(&[0xFF, 0xD8]));
}

#[test]
fn test_render_image_applies_opacity() {
    fn gray(_: f64, _: f64) -> [u8; 3] {
        [90, 90, 90]
    }
    let store = MockStore::default().with("gray", gray, 1.0);
    let config = RenderConfig::default();
    let renderer = RasterLayerRenderer::new(&store, &config);
    let layer = RasterLayer::new("gray", RasterSymbolizer::default().with_opacity(0.5));
    let small = CompositionRequest::new(4, 4, Extent::new(0.0, 0.0, 4.0, 4.0));
    let png = renderer.render_image(&layer, &small, &StandardEncoder).unwrap();
    let (_, data) = decode_png(&png);
    assert!(data.chunks_exact(4).all(|px| px == [90, 90, 90, 128]));
}

/// Encoder double recording what the compositor hands over.
struct Recorder(std::sync::Mutex<Option<(usize, bool)>>);

impl Encoder for Recorder {
    fn encode(
        &self,
        input: &rastyle::EncodeInput<'_>,
        _format: OutputFormat,
        _quality: u8,
        _opacity: f64,
    ) -> RenderResult<Vec<u8>> {
        *self.0.lock().unwrap() = Some((input.rgb.len(), input.alpha.is_some()));
        Ok(Vec::new())
    }
}

#[test]
fn test_tiff_never_receives_alpha() {
    let store = MockStore::default().with("ortho", checker, 1.0);
    let recorder = Recorder(std::sync::Mutex::new(None));
    let config = RenderConfig::default();
    let compositor = GroupCompositor::new(&store, &recorder, &config);
    compositor
        .composite(
            &[RasterLayer::new("ortho", RasterSymbolizer::default())],
            &request().with_format(OutputFormat::Tiff, 0),
        )
        .unwrap();
    assert_eq!(*recorder.0.lock().unwrap(), Some((100 * 100 * 3, false)));
}

fn west_red(x: f64, _: f64) -> [u8; 3] {
    if x < 50.0 {
        [255, 0, 0]
    } else {
        [BG.r, BG.g, BG.b]
    }
}

fn west_value(x: f64, _: f64) -> f64 {
    if x < 50.0 {
        1.0
    } else {
        NO_DATA
    }
}

fn scaled_level(scale: Scale) -> ResolutionLevel {
    ResolutionLevel {
        scale,
        ..level(0, 1.0, 1.0)
    }
}

fn assert_west_ink(result: &Composite, ink: [u8; 3]) {
    for row in 0..100usize {
        for col in 0..100usize {
            let i = row * 100 + col;
            let px = &result.rgb[i * 3..i * 3 + 3];
            if col < 50 {
                assert_eq!(px, &ink, "pixel {} {}", col, row);
                assert_eq!(result.alpha[i], 255);
            } else {
                assert_eq!(px, &[BG.r, BG.g, BG.b], "pixel {} {}", col, row);
                assert_eq!(result.alpha[i], 0);
            }
        }
    }
}

#[rstest]
#[case(PixelKind::Rgb, Scale::Full, [255, 0, 0])]
#[case(PixelKind::Rgb, Scale::Half, [255, 0, 0])]
#[case(PixelKind::Grayscale, Scale::Full, [255, 255, 255])]
#[case(PixelKind::Grayscale, Scale::Half, [255, 255, 255])]
#[case(PixelKind::Palette, Scale::Full, [255, 0, 0])]
#[case(PixelKind::Palette, Scale::Half, [255, 0, 0])]
#[case(PixelKind::Monochrome, Scale::Full, [0, 0, 0])]
#[case(PixelKind::Monochrome, Scale::Half, [0, 0, 0])]
#[case(PixelKind::Multiband, Scale::Full, [255, 0, 0])]
#[case(PixelKind::Multiband, Scale::Half, [255, 0, 0])]
#[case(PixelKind::DataGrid, Scale::Full, [255, 255, 255])]
#[case(PixelKind::DataGrid, Scale::Half, [255, 255, 255])]
fn test_every_pixel_kind_keeps_background_transparent(
    #[case] kind: PixelKind,
    #[case] scale: Scale,
    #[case] ink: [u8; 3],
) {
    init_logger();
    let store = if kind == PixelKind::DataGrid {
        let stats = vec![BandStatistics { min: 0.0, max: 1.0 }];
        MockStore::default().with_grid("cov", west_value, stats, scaled_level(scale))
    } else {
        MockStore::default().with_kind("cov", kind, west_red, scaled_level(scale))
    };
    let result = composite(
        &store,
        &RenderConfig::default(),
        &[RasterLayer::new("cov", RasterSymbolizer::default())],
    )
    .unwrap();
    assert_west_ink(&result, ink);
}

#[rstest]
#[case(None)]
#[case(Some(PixelKind::Monochrome))]
fn test_half_scale_monochrome_asks_for_gray(#[case] reply_as: Option<PixelKind>) {
    let mut store = MockStore::default().with_kind("scan", PixelKind::Monochrome, west_red, scaled_level(Scale::Half));
    if let Some(kind) = reply_as {
        store = store.replying_as(kind);
    }
    let result = composite(
        &store,
        &RenderConfig::default(),
        &[RasterLayer::new("scan", RasterSymbolizer::default())],
    )
    .unwrap();
    assert_eq!(store.requested(), vec![PixelKind::Grayscale]);
    // Promoted gray and native bits render the same
    assert_west_ink(&result, [0, 0, 0]);
}

#[test]
fn test_unexpected_sample_kind_is_rejected() {
    let store = MockStore::default()
        .with("ortho", checker, 1.0)
        .replying_as(PixelKind::Grayscale);
    let err = composite(
        &store,
        &RenderConfig::default(),
        &[RasterLayer::new("ortho", RasterSymbolizer::default())],
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::StorageQueryFailure(_)));
}

#[rstest]
#[case(Scale::Full)]
#[case(Scale::Half)]
fn test_multiband_selection_picks_bands(#[case] scale: Scale) {
    let store = MockStore::default().with_kind("bands", PixelKind::Multiband, west_red, scaled_level(scale));
    let swapped = RasterSymbolizer::default().with_bands(BandSelection::Triple {
        red: 2,
        green: 1,
        blue: 0,
    });
    let result = composite(&store, &RenderConfig::default(), &[RasterLayer::new("bands", swapped)]).unwrap();
    assert_eq!(store.requested(), vec![PixelKind::Rgb]);
    assert_west_ink(&result, [0, 0, 255]);

    let nir = RasterSymbolizer::default().with_bands(BandSelection::Mono(3));
    let result = composite(&store, &RenderConfig::default(), &[RasterLayer::new("bands", nir)]).unwrap();
    assert!(result.rgb.chunks_exact(3).all(|px| px == [NIR, NIR, NIR]));
    assert!(result.alpha.iter().all(|a| *a == 255));
}

#[test]
fn test_rgb_mono_selection_renders_gray() {
    let store = MockStore::default().with_kind("ortho", PixelKind::Rgb, west_red, level(0, 1.0, 1.0));
    let red_band = RasterSymbolizer::default().with_bands(BandSelection::Mono(0));
    let result = composite(&store, &RenderConfig::default(), &[RasterLayer::new("ortho", red_band)]).unwrap();
    assert_eq!(store.requested(), vec![PixelKind::Grayscale]);
    assert_west_ink(&result, [255, 255, 255]);
}

#[test]
fn test_adjacent_grid_tiles_share_stretch() {
    fn easting(x: f64, _: f64) -> f64 {
        x
    }
    let stats = vec![BandStatistics { min: 0.0, max: 21.0 }];
    let store = MockStore::default().with_grid("dem", easting, stats, level(0, 1.0, 1.0));
    let config = RenderConfig::default();
    let compositor = GroupCompositor::new(&store, &StandardEncoder, &config);
    let layers = [RasterLayer::new("dem", RasterSymbolizer::default())];
    let tile = |minx: f64| CompositionRequest::new(11, 1, Extent::new(minx, 0.0, minx + 11.0, 1.0)).with_background(BG);

    let west = compositor.composite_rgba(&layers, &tile(0.0)).unwrap();
    let east = compositor.composite_rgba(&layers, &tile(10.0)).unwrap();
    // Last pixel of the west tile and first of the east tile both sample 10.5
    assert_eq!(&west.rgb[30..33], &east.rgb[0..3]);
    assert_eq!(&west.rgb[30..33], &[128, 128, 128]);
    assert_eq!((west.alpha[10], east.alpha[0]), (255, 255));
}

#[test]
fn test_mixed_section_aspect_mismatch() {
    let sections = vec![
        (
            Section {
                id: 1,
                extent: Extent::new(0.0, 0.0, 50.0, 100.0),
            },
            level(0, 1.0, 1.0),
        ),
        (
            Section {
                id: 2,
                extent: Extent::new(50.0, 0.0, 100.0, 100.0),
            },
            level(1, 1.0, 2.0),
        ),
    ];
    let store = MockStore::default().with_sections("mosaic", checker, sections);
    let layers = [RasterLayer::new("mosaic", RasterSymbolizer::default())];
    let err = composite(&store, &RenderConfig::default(), &layers).unwrap_err();
    assert!(matches!(err, RenderError::AspectMismatch { .. }));

    let permissive = RenderConfig {
        allow_reaspect: true,
        ..RenderConfig::default()
    };
    let result = composite(&store, &permissive, &layers).unwrap();
    assert!(result.alpha.iter().all(|a| *a == 255));
}
