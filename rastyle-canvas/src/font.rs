//! Label fonts: face, size, style, fill color and optional halo.

use crate::color::Rgba;
use crate::style::{FontStyle, FontWeight};

/// Size limits applied to toy fonts.
const TOY_MIN_SIZE: f32 = 1.0;
const TOY_MAX_SIZE: f32 = 32.0;

/// The three generic fallback families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToyFamily {
    Serif,
    #[default]
    SansSerif,
    Monospace,
}

impl ToyFamily {
    /// Map a generic family keyword to a toy family.
    pub fn from_generic(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "serif" => Some(ToyFamily::Serif),
            "sans-serif" | "sans serif" | "sans" => Some(ToyFamily::SansSerif),
            "monospace" | "mono" => Some(ToyFamily::Monospace),
            _ => None,
        }
    }

    pub(crate) fn family(self) -> cosmic_text::Family<'static> {
        match self {
            ToyFamily::Serif => cosmic_text::Family::Serif,
            ToyFamily::SansSerif => cosmic_text::Family::SansSerif,
            ToyFamily::Monospace => cosmic_text::Family::Monospace,
        }
    }
}

/// Font face selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontFace {
    /// Generic fallback font (size clamped to 1..=32).
    Toy(ToyFamily),
    /// A scalable font resolved by family name in the font database.
    Named(String),
}

/// Outline drawn around label glyphs before they are filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Halo {
    pub radius: f32,
    pub color: Rgba,
}

/// A label font as selected into a graphics context.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    face: FontFace,
    size: f32,
    pub style: FontStyle,
    pub weight: FontWeight,
    pub fill: Rgba,
    pub halo: Option<Halo>,
}

impl Default for Font {
    fn default() -> Self {
        Self::toy(ToyFamily::SansSerif, 10.0, FontStyle::Normal, FontWeight::Normal)
    }
}

impl Font {
    /// Create a toy font; the size is clamped to `[1, 32]`.
    pub fn toy(family: ToyFamily, size: f32, style: FontStyle, weight: FontWeight) -> Self {
        Self {
            face: FontFace::Toy(family),
            size: clamp_toy_size(size),
            style,
            weight,
            fill: Rgba::BLACK,
            halo: None,
        }
    }

    /// Create a scalable font by family name; the size is not clamped.
    pub fn scalable(family: impl Into<String>, size: f32) -> Self {
        Self {
            face: FontFace::Named(family.into()),
            size: if size.is_finite() && size > 0.0 { size } else { 10.0 },
            style: FontStyle::Normal,
            weight: FontWeight::Normal,
            fill: Rgba::BLACK,
            halo: None,
        }
    }

    pub fn with_style(mut self, style: FontStyle, weight: FontWeight) -> Self {
        self.style = style;
        self.weight = weight;
        self
    }

    pub fn with_fill(mut self, fill: Rgba) -> Self {
        self.fill = fill;
        self
    }

    /// Attach a halo; a non-positive radius removes it.
    pub fn with_halo(mut self, radius: f32, color: Rgba) -> Self {
        self.halo = (radius > 0.0).then_some(Halo { radius, color });
        self
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Downgrade to the generic family when a named face is unavailable,
    /// applying the toy size limits.
    pub(crate) fn to_toy(&self, family: ToyFamily) -> Self {
        Self {
            face: FontFace::Toy(family),
            size: clamp_toy_size(self.size),
            ..self.clone()
        }
    }
}

fn clamp_toy_size(size: f32) -> f32 {
    if size.is_nan() {
        return TOY_MIN_SIZE;
    }
    size.clamp(TOY_MIN_SIZE, TOY_MAX_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(12.0, 12.0)]
    #[case(48.0, 32.0)]
    #[case(f32::NAN, 1.0)]
    fn test_toy_size_clamped(#[case] size: f32, #[case] expected: f32) {
        let font = Font::toy(ToyFamily::Serif, size, FontStyle::Normal, FontWeight::Normal);
        assert_eq!(font.size(), expected);
    }

    #[test]
    fn test_scalable_size_unclamped() {
        assert_eq!(Font::scalable("DejaVu Sans", 72.0).size(), 72.0);
        let toy = Font::scalable("Missing Font", 72.0).to_toy(ToyFamily::SansSerif);
        assert_eq!(toy.size(), 32.0);
        assert_eq!(toy.face(), &FontFace::Toy(ToyFamily::SansSerif));
    }

    #[test]
    fn test_halo() {
        let font = Font::default().with_halo(2.0, Rgba::WHITE);
        assert_eq!(font.halo.unwrap().radius, 2.0);
        assert!(Font::default().with_halo(0.0, Rgba::WHITE).halo.is_none());
    }

    #[test]
    fn test_generic_names() {
        assert_eq!(ToyFamily::from_generic("Serif"), Some(ToyFamily::Serif));
        assert_eq!(ToyFamily::from_generic("monospace"), Some(ToyFamily::Monospace));
        assert_eq!(ToyFamily::from_generic("Arial"), None);
    }
}
