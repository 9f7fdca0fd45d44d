//! Text shaping and glyph outline extraction using cosmic-text.

use crate::error::{GraphicsError, GraphicsResult};
use crate::font::{Font, FontFace, ToyFamily};
use cosmic_text::{Attrs, Buffer, CacheKeyFlags, Command, Family, FontSystem, Metrics, Shaping, SwashCache};

/// Measured size of a label.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtent {
    /// Advance width of the whole text.
    pub width: f32,
    /// `ascent + descent`.
    pub height: f32,
    /// Distance from the baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f32,
}

/// One shaped glyph, outline in glyph-local coordinates (origin on the
/// baseline, y pointing down).
#[derive(Debug, Clone)]
pub(crate) struct ShapedGlyph {
    pub path: Option<tiny_skia::Path>,
    /// Offset of the glyph origin from the start of the text.
    pub x: f32,
    pub y: f32,
    pub advance: f32,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ShapedText {
    pub glyphs: Vec<ShapedGlyph>,
    pub extent: TextExtent,
}

/// Font system plus glyph cache, created on first use of text by a context.
pub(crate) struct TextEngine {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl TextEngine {
    pub(crate) fn new(db: fontdb::Database) -> Self {
        Self {
            font_system: FontSystem::new_with_locale_and_db("en".to_string(), db),
            swash_cache: SwashCache::new(),
        }
    }

    /// Named faces missing from the database fall back to the sans-serif
    /// toy family.
    pub(crate) fn resolve_font(&self, font: &Font) -> Font {
        match font.face() {
            FontFace::Toy(_) => font.clone(),
            FontFace::Named(name) => {
                if let Some(toy) = ToyFamily::from_generic(name) {
                    return font.to_toy(toy);
                }
                let found = self.font_system.db().faces().any(|face| {
                    face.families
                        .iter()
                        .any(|(family, _)| family.eq_ignore_ascii_case(name))
                });
                if found {
                    font.clone()
                } else {
                    log::warn!(target: "canvas", "font '{}' not found, using toy sans-serif", name);
                    font.to_toy(ToyFamily::SansSerif)
                }
            }
        }
    }

    /// Shape `text` as a single line and extract glyph outlines.
    pub(crate) fn shape(&mut self, text: &str, font: &Font) -> GraphicsResult<ShapedText> {
        if text.is_empty() {
            return Ok(ShapedText::default());
        }
        let font = self.resolve_font(font);
        let size = font.size();
        let metrics = Metrics::new(size, size * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        let family = match font.face() {
            FontFace::Toy(toy) => toy.family(),
            FontFace::Named(name) => Family::Name(name.as_str()),
        };
        let attrs = Attrs::new()
            .family(family)
            .weight(font.weight.into())
            .style(font.style.into())
            .cache_key_flags(CacheKeyFlags::DISABLE_HINTING);

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut shaped = ShapedText::default();
        let mut ascent: f32 = 0.0;
        let mut descent: f32 = 0.0;
        for run in buffer.layout_runs() {
            shaped.extent.width = shaped.extent.width.max(run.line_w);
            ascent = ascent.max(run.line_y - run.line_top);
            descent = descent.max((run.line_top + run.line_height) - run.line_y);

            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((0.0, 0.0), 1.0);
                let path = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical.cache_key)
                    .and_then(outline_to_path);
                shaped.glyphs.push(ShapedGlyph {
                    path,
                    x: glyph.x + glyph.font_size * glyph.x_offset,
                    y: glyph.y - glyph.font_size * glyph.y_offset,
                    advance: glyph.w,
                });
            }
        }
        if ascent == 0.0 && descent == 0.0 {
            ascent = size * 0.8;
            descent = size * 0.2;
        }
        if !shaped.extent.width.is_finite() {
            return Err(GraphicsError::BackendStatus(format!(
                "text shaping produced an invalid width for '{}'",
                text
            )));
        }
        shaped.extent.ascent = ascent;
        shaped.extent.descent = descent;
        shaped.extent.height = ascent + descent;
        Ok(shaped)
    }
}

/// Font outlines have y pointing up; the surface has y pointing down.
fn outline_to_path(commands: &[Command]) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for cmd in commands {
        match cmd {
            Command::MoveTo(p) => pb.move_to(p.x, -p.y),
            Command::LineTo(p) => pb.line_to(p.x, -p.y),
            Command::QuadTo(ctrl, end) => pb.quad_to(ctrl.x, -ctrl.y, end.x, -end.y),
            Command::CurveTo(c1, c2, end) => pb.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y),
            Command::Close => pb.close(),
        }
    }
    pb.finish()
}
