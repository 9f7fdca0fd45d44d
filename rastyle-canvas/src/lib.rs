//! Graphics context for map rendering over tiny-skia and cosmic-text.
//!
//! A [`GraphicsContext`] draws onto one of four surfaces:
//! - a transparent RGBA bitmap, rasterized by `tiny-skia`
//! - an SVG document, written on finish
//! - a PDF page (file or in-memory), converted from the recorded document
//!   with `svg2pdf`
//!
//! Labels are shaped with `cosmic-text` and painted as glyph outlines. The
//! [`pixel`] module holds the stateless conversions between raw raster
//! sample layouts and RGBA.
//!
//! # Example
//!
//! ```rust,ignore
//! use rastyle_canvas::{GraphicsContext, PenStyle, Rgba};
//!
//! let mut ctx = GraphicsContext::new_bitmap(100, 100)?;
//! ctx.set_pen(Rgba::BLACK, 1.0, PenStyle::Solid);
//! ctx.set_brush(Rgba::WHITE);
//! ctx.draw_rectangle(10.0, 10.0, 50.0, 50.0)?;
//! let rgb = ctx.get_rgb_array()?;
//! ```

mod bitmap;
mod color;
mod context;
mod error;
mod font;
mod font_config;
mod paint;
mod pattern;
pub mod pixel;
mod shapes;
mod style;
mod surface;
mod text;

// Re-export public API
pub use bitmap::Bitmap;
pub use color::{Rgb, Rgba};
pub use context::{GraphicsContext, SurfaceKind};
pub use error::{GraphicsError, GraphicsResult};
pub use font::{Font, FontFace, Halo, ToyFamily};
pub use font_config::{CustomFont, FontConfig, GenericFamilyMap, ResolvedFontConfig};
pub use paint::{Brush, LinearGradient, Paint, Pen};
pub use pattern::Pattern;
pub use style::{
    parse_dash_list, FillRule, FontStyle, FontWeight, ImageQuality, LineCap, LineJoin, PenStyle,
};
pub use surface::{PageSetup, SurfaceOutput};
pub use text::TextExtent;
