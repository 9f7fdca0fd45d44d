use rastyle_canvas::{
    Bitmap, Font, FontConfig, FontStyle, FontWeight, GraphicsContext, GraphicsError,
    LinearGradient, PageSetup, Pattern, PenStyle, ResolvedFontConfig, Rgba, SurfaceOutput,
    ToyFamily,
};
use rstest::rstest;
use std::sync::Arc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rgb_at(rgb: &[u8], width: u32, x: usize, y: usize) -> [u8; 3] {
    let i = (y * width as usize + x) * 3;
    [rgb[i], rgb[i + 1], rgb[i + 2]]
}

fn system_fonts() -> Option<ResolvedFontConfig> {
    let resolved = FontConfig::default().resolve();
    (resolved.face_count() > 0).then_some(resolved)
}

fn letter_page() -> PageSetup {
    PageSetup {
        width_in: 8.5,
        height_in: 11.0,
        margin_x_in: 0.5,
        margin_y_in: 0.75,
        dpi: 96.0,
    }
}

#[test]
fn test_rectangle_scenario() {
    init_logger();
    let mut ctx = GraphicsContext::new_bitmap(100, 100).unwrap();
    ctx.set_pen(Rgba::BLACK, 1.0, PenStyle::Solid);
    ctx.set_brush(Rgba::WHITE);
    ctx.draw_rectangle(10.0, 10.0, 50.0, 50.0).unwrap();

    let rgb = ctx.get_rgb_array().unwrap();
    let alpha = ctx.get_alpha_array().unwrap();
    assert_eq!(rgb.len(), 100 * 100 * 3);
    assert_eq!(alpha.len(), 100 * 100);

    // Outside: untouched transparent background
    assert_eq!(rgb_at(&rgb, 100, 5, 5), [0, 0, 0]);
    assert_eq!(alpha[5 * 100 + 5], 0);

    // Inside: brush color
    assert_eq!(rgb_at(&rgb, 100, 30, 30), [255, 255, 255]);
    assert_eq!(alpha[30 * 100 + 30], 255);

    // Boundary: the 1px stroke straddles x = 10 and darkens pixels 9 and 10
    let boundary = [rgb_at(&rgb, 100, 9, 30), rgb_at(&rgb, 100, 10, 30)];
    assert!(boundary.iter().any(|px| px[0] < 200));
    assert!(alpha[30 * 100 + 9] > 0);
    assert_eq!(rgb_at(&rgb, 100, 9, 30), [0, 0, 0]);
}

#[test]
fn test_dashed_pen_paints_less_than_solid() {
    let covered = |style: PenStyle| {
        let mut ctx = GraphicsContext::new_bitmap(100, 40).unwrap();
        ctx.set_pen(Rgba::BLACK, 2.0, style);
        ctx.draw_line(5.0, 20.0, 95.0, 20.0).unwrap();
        ctx.get_alpha_array()
            .unwrap()
            .iter()
            .filter(|a| **a > 0)
            .count()
    };
    let solid = covered(PenStyle::Solid);
    let dashed = covered(PenStyle::ShortDash);
    assert!(solid > 0);
    assert!(dashed < solid, "dashed {} solid {}", dashed, solid);
}

#[rstest]
#[case(PenStyle::Dot)]
#[case(PenStyle::LongDash)]
#[case(PenStyle::ShortDash)]
#[case(PenStyle::DotDash)]
fn test_every_dash_style_leaves_gaps(#[case] style: PenStyle) {
    let mut ctx = GraphicsContext::new_bitmap(120, 10).unwrap();
    ctx.set_pen(Rgba::BLACK, 2.0, style);
    ctx.draw_line(0.0, 5.0, 120.0, 5.0).unwrap();
    let alpha = ctx.get_alpha_array().unwrap();
    let row = &alpha[5 * 120..6 * 120];
    assert!(row.iter().any(|a| *a == 0));
    assert!(row.iter().any(|a| *a == 255));
}

#[test]
fn test_gradient_brush_runs_from_start_to_end() {
    let mut ctx = GraphicsContext::new_bitmap(100, 10).unwrap();
    ctx.set_linear_gradient_brush(LinearGradient {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 0.0,
        start: Rgba::opaque(255, 0, 0),
        end: Rgba::opaque(0, 0, 255),
    });
    ctx.set_pen(Rgba::TRANSPARENT, 1.0, PenStyle::Solid);
    ctx.draw_rectangle(0.0, 0.0, 100.0, 10.0).unwrap();
    let rgb = ctx.get_rgb_array().unwrap();
    let left = rgb_at(&rgb, 100, 1, 5);
    let right = rgb_at(&rgb, 100, 98, 5);
    assert!(left[0] > 200 && left[2] < 55);
    assert!(right[2] > 200 && right[0] < 55);
}

#[test]
fn test_pattern_brush_tiles() {
    // 2x1 pattern: red, blue
    let pattern = Arc::new(Pattern::new(&[255, 0, 0, 255, 0, 0, 255, 255], 2, 1, true).unwrap());
    let mut ctx = GraphicsContext::new_bitmap(8, 2).unwrap();
    ctx.set_pattern_brush(pattern.clone());
    ctx.set_pen(Rgba::TRANSPARENT, 1.0, PenStyle::Solid);
    ctx.draw_rectangle(0.0, 0.0, 8.0, 2.0).unwrap();
    ctx.release_pattern_brush();
    assert_eq!(Arc::strong_count(&pattern), 1);

    let rgb = ctx.get_rgb_array().unwrap();
    assert_eq!(rgb_at(&rgb, 8, 4, 1), [255, 0, 0]);
    assert_eq!(rgb_at(&rgb, 8, 5, 1), [0, 0, 255]);
}

#[test]
fn test_bitmap_surface_finish_returns_pixels() {
    let mut ctx = GraphicsContext::new_bitmap(3, 2).unwrap();
    ctx.draw_bitmap(&Bitmap::from_rgba(&[9, 8, 7, 255], 1, 1).unwrap(), 0.0, 0.0)
        .unwrap();
    match ctx.finish().unwrap() {
        SurfaceOutput::Bitmap {
            width,
            height,
            rgba,
        } => {
            assert_eq!((width, height), (3, 2));
            assert_eq!(&rgba[..4], &[9, 8, 7, 255]);
        }
        other => panic!("unexpected output {:?}", other),
    }
}

#[test]
fn test_svg_surface_written_on_finish() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.svg");
    let mut ctx = GraphicsContext::new_svg(&path, 200, 100).unwrap();
    ctx.set_brush(Rgba::opaque(0, 128, 0));
    ctx.draw_ellipse(10.0, 10.0, 80.0, 40.0).unwrap();
    ctx.draw_bitmap(&Bitmap::from_rgba(&[255; 16], 2, 2).unwrap(), 0.0, 0.0)
        .unwrap();
    assert!(matches!(
        ctx.get_rgb_array(),
        Err(GraphicsError::NotABitmapSurface)
    ));

    let output = ctx.finish().unwrap();
    assert_eq!(output, SurfaceOutput::SvgWritten(path.clone()));
    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("fill=\"#008000\""));
    assert!(svg.contains("data:image/png;base64,"));
}

#[test]
fn test_pdf_surface_written_on_finish() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.pdf");
    let mut ctx = GraphicsContext::new_pdf(&path, letter_page()).unwrap();
    assert_eq!((ctx.width(), ctx.height()), (720, 912));
    ctx.set_brush(Rgba::BLACK);
    ctx.draw_rectangle(0.0, 0.0, 100.0, 100.0).unwrap();

    assert_eq!(ctx.finish().unwrap(), SurfaceOutput::PdfWritten(path.clone()));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_in_memory_pdf() {
    let mut ctx = GraphicsContext::new_pdf_in_memory(letter_page()).unwrap();
    ctx.set_pen(Rgba::opaque(200, 0, 0), 3.0, PenStyle::LongDash);
    ctx.draw_circle_sector(300.0, 300.0, 100.0, 30.0, 300.0).unwrap();
    match ctx.finish().unwrap() {
        SurfaceOutput::PdfBytes(bytes) => assert!(bytes.starts_with(b"%PDF")),
        other => panic!("unexpected output {:?}", other),
    }
}

#[test]
fn test_text_is_drawn_with_halo() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let count = |halo: bool| {
        let mut ctx = GraphicsContext::new_bitmap(200, 60).unwrap().with_fonts(&fonts);
        let mut font = Font::toy(ToyFamily::SansSerif, 24.0, FontStyle::Normal, FontWeight::Bold);
        if halo {
            font = font.with_halo(2.0, Rgba::WHITE);
        }
        ctx.set_font(font);
        ctx.draw_text("Label", 100.0, 30.0, 0.0, 0.5, 0.5).unwrap();
        ctx.get_alpha_array()
            .unwrap()
            .iter()
            .filter(|a| **a > 0)
            .count()
    };
    let plain = count(false);
    let haloed = count(true);
    assert!(plain > 0);
    assert!(haloed > plain);
}

#[test]
fn test_text_extent_grows_with_text() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut ctx = GraphicsContext::new_bitmap(10, 10).unwrap().with_fonts(&fonts);
    let short = ctx.text_extent("ab").unwrap();
    let long = ctx.text_extent("abcdef").unwrap();
    assert!(long.width > short.width);
    assert!(short.height > 0.0);
    assert_eq!(short.height, short.ascent + short.descent);
}

#[test]
fn test_warped_text_on_long_line() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut ctx = GraphicsContext::new_bitmap(300, 100).unwrap().with_fonts(&fonts);
    ctx.set_font(Font::toy(ToyFamily::Serif, 14.0, FontStyle::Normal, FontWeight::Normal));
    // Right-to-left input still reads left to right
    ctx.draw_text_along_path("River", &[(290.0, 80.0), (150.0, 20.0), (10.0, 80.0)])
        .unwrap();
    let alpha = ctx.get_alpha_array().unwrap();
    assert!(alpha.iter().any(|a| *a > 0));
}
