//! Style types and enums for graphics context operations.

use crate::error::{GraphicsError, GraphicsResult};

/// Line cap style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat edge at the endpoint.
    #[default]
    Butt,
    /// Rounded edge extending past the endpoint.
    Round,
    /// Square edge extending past the endpoint.
    Square,
}

impl From<LineCap> for tiny_skia::LineCap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        }
    }
}

impl LineCap {
    pub(crate) fn svg_name(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Line join style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

impl From<LineJoin> for tiny_skia::LineJoin {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

impl LineJoin {
    pub(crate) fn svg_name(self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

/// Predefined pen dash styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenStyle {
    #[default]
    Solid,
    Dot,
    LongDash,
    ShortDash,
    DotDash,
}

impl PenStyle {
    /// On/off lengths for this style; empty means a solid line.
    pub fn dash_list(self) -> &'static [f32] {
        match self {
            PenStyle::Solid => &[],
            PenStyle::Dot => &[2.0, 2.0],
            PenStyle::LongDash => &[16.0, 8.0],
            PenStyle::ShortDash => &[8.0, 4.0],
            PenStyle::DotDash => &[8.0, 4.0, 2.0, 4.0],
        }
    }
}

/// Parse an SLD/SVG style dash array such as `"8 4 2 4"` or `"5,2"`.
///
/// Odd-length lists are duplicated so that on/off pairs stay aligned.
pub fn parse_dash_list(s: &str) -> GraphicsResult<Vec<f32>> {
    let mut dashes = Vec::new();
    for number in svgtypes::NumberListParser::from(s) {
        let value = number
            .map_err(|e| GraphicsError::InvalidArgument(format!("dash list '{}': {}", s, e)))?;
        if !value.is_finite() || value < 0.0 {
            return Err(GraphicsError::InvalidArgument(format!(
                "dash list '{}' contains an invalid length",
                s
            )));
        }
        dashes.push(value as f32);
    }
    if dashes.len() % 2 == 1 {
        let copy = dashes.clone();
        dashes.extend(copy);
    }
    Ok(dashes)
}

/// Fill rule for path operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Non-zero winding rule (default).
    #[default]
    NonZero,
    /// Even-odd rule, used for polygons with interior rings.
    EvenOdd,
}

impl From<FillRule> for tiny_skia::FillRule {
    fn from(rule: FillRule) -> Self {
        match rule {
            FillRule::NonZero => tiny_skia::FillRule::Winding,
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

impl FillRule {
    pub(crate) fn svg_name(self) -> &'static str {
        match self {
            FillRule::NonZero => "nonzero",
            FillRule::EvenOdd => "evenodd",
        }
    }
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl From<FontStyle> for cosmic_text::Style {
    fn from(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => cosmic_text::Style::Normal,
            FontStyle::Italic => cosmic_text::Style::Italic,
            FontStyle::Oblique => cosmic_text::Style::Oblique,
        }
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl From<FontWeight> for cosmic_text::Weight {
    fn from(weight: FontWeight) -> Self {
        match weight {
            FontWeight::Normal => cosmic_text::Weight::NORMAL,
            FontWeight::Bold => cosmic_text::Weight::BOLD,
        }
    }
}

/// Resampling quality used when drawing rescaled bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageQuality {
    /// Nearest neighbour (fastest, keeps hard palette edges).
    Nearest,
    /// Bilinear (default).
    #[default]
    Bilinear,
    /// Bicubic (slowest).
    Bicubic,
}

impl From<ImageQuality> for tiny_skia::FilterQuality {
    fn from(quality: ImageQuality) -> Self {
        match quality {
            ImageQuality::Nearest => tiny_skia::FilterQuality::Nearest,
            ImageQuality::Bilinear => tiny_skia::FilterQuality::Bilinear,
            ImageQuality::Bicubic => tiny_skia::FilterQuality::Bicubic,
        }
    }
}
