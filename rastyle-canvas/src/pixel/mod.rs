//! Raw sample buffer conversions.
//!
//! Every `*_to_rgba` function writes into a caller-provided RGBA buffer that
//! is assumed to be pre-zeroed: pixels matching the declared background (or a
//! zero monochrome sample) are left untouched, so they stay fully
//! transparent. All other pixels are written fully opaque; there is no
//! partial alpha at this stage.

pub mod endian;

use crate::color::Rgb;
use crate::error::{GraphicsError, GraphicsResult};

/// Alpha threshold separating transparent from opaque in RGB+Alpha sources.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Indexed color lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Palette {
    /// Create a palette; at most 256 entries are addressable.
    pub fn new(entries: Vec<Rgb>) -> GraphicsResult<Self> {
        if entries.is_empty() || entries.len() > 256 {
            return Err(GraphicsError::InvalidArgument(format!(
                "palette must hold 1..=256 entries, got {}",
                entries.len()
            )));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.entries.get(index as usize).copied()
    }

    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    /// Exact match first, otherwise the nearest entry by squared distance.
    pub fn index_of(&self, color: Rgb) -> u8 {
        let mut best = 0usize;
        let mut best_dist = u32::MAX;
        for (i, entry) in self.entries.iter().enumerate() {
            let dr = entry.r as i32 - color.r as i32;
            let dg = entry.g as i32 - color.g as i32;
            let db = entry.b as i32 - color.b as i32;
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best = i;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

fn check(name: &str, len: usize, width: u32, height: u32, unit: usize) -> GraphicsResult<()> {
    let expected = width as usize * height as usize * unit;
    if len != expected {
        return Err(GraphicsError::InvalidArgument(format!(
            "{} buffer holds {} bytes, expected {} for {}x{}",
            name, len, expected, width, height
        )));
    }
    Ok(())
}

fn put_opaque(rgba: &mut [u8], color: Rgb) {
    rgba[0] = color.r;
    rgba[1] = color.g;
    rgba[2] = color.b;
    rgba[3] = 255;
}

/// One byte per pixel, 0 = background (transparent), anything else = black ink.
pub fn mono_to_rgba(width: u32, height: u32, samples: &[u8], rgba: &mut [u8]) -> GraphicsResult<()> {
    check("monochrome", samples.len(), width, height, 1)?;
    check("rgba", rgba.len(), width, height, 4)?;
    for (sample, out) in samples.iter().zip(rgba.chunks_exact_mut(4)) {
        if *sample != 0 {
            put_opaque(out, Rgb::gray(0));
        }
    }
    Ok(())
}

/// Palette indices; entries equal to `background` are transparent.
pub fn palette_to_rgba(
    width: u32,
    height: u32,
    indices: &[u8],
    palette: &Palette,
    background: Rgb,
    rgba: &mut [u8],
) -> GraphicsResult<()> {
    check("palette", indices.len(), width, height, 1)?;
    check("rgba", rgba.len(), width, height, 4)?;
    for (index, out) in indices.iter().zip(rgba.chunks_exact_mut(4)) {
        // Out-of-range indices resolve to black, like an unset table slot
        let color = palette.get(*index).unwrap_or_default();
        if color != background {
            put_opaque(out, color);
        }
    }
    Ok(())
}

/// 8-bit gray samples; samples equal to `background` are transparent.
pub fn gray_to_rgba(
    width: u32,
    height: u32,
    gray: &[u8],
    background: u8,
    rgba: &mut [u8],
) -> GraphicsResult<()> {
    check("grayscale", gray.len(), width, height, 1)?;
    check("rgba", rgba.len(), width, height, 4)?;
    for (value, out) in gray.iter().zip(rgba.chunks_exact_mut(4)) {
        if *value != background {
            put_opaque(out, Rgb::gray(*value));
        }
    }
    Ok(())
}

/// Interleaved RGB; pixels equal to `background` are transparent.
pub fn rgb_to_rgba(
    width: u32,
    height: u32,
    rgb: &[u8],
    background: Rgb,
    rgba: &mut [u8],
) -> GraphicsResult<()> {
    check("rgb", rgb.len(), width, height, 3)?;
    check("rgba", rgba.len(), width, height, 4)?;
    for (src, out) in rgb.chunks_exact(3).zip(rgba.chunks_exact_mut(4)) {
        let color = Rgb::new(src[0], src[1], src[2]);
        if color != background {
            put_opaque(out, color);
        }
    }
    Ok(())
}

/// Interleaved RGB plus a separate alpha plane.
///
/// Alpha is thresholded, not blended: `alpha < 128` leaves the pixel
/// transparent, anything else is written fully opaque.
pub fn rgb_alpha_to_rgba(
    width: u32,
    height: u32,
    rgb: &[u8],
    alpha: &[u8],
    rgba: &mut [u8],
) -> GraphicsResult<()> {
    check("rgb", rgb.len(), width, height, 3)?;
    check("alpha", alpha.len(), width, height, 1)?;
    check("rgba", rgba.len(), width, height, 4)?;
    for ((src, a), out) in rgb
        .chunks_exact(3)
        .zip(alpha.iter())
        .zip(rgba.chunks_exact_mut(4))
    {
        if *a >= ALPHA_THRESHOLD {
            put_opaque(out, Rgb::new(src[0], src[1], src[2]));
        }
    }
    Ok(())
}

/// Split RGBA into an output-ready RGB plane and an alpha plane.
pub fn rgba_to_rgb_alpha(width: u32, height: u32, rgba: &[u8]) -> GraphicsResult<(Vec<u8>, Vec<u8>)> {
    check("rgba", rgba.len(), width, height, 4)?;
    let count = width as usize * height as usize;
    let mut rgb = Vec::with_capacity(count * 3);
    let mut alpha = Vec::with_capacity(count);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }
    Ok((rgb, alpha))
}

/// Inverse of [`mono_to_rgba`]: transparent pixels become 0, opaque ones 1.
pub fn rgba_to_mono(width: u32, height: u32, rgba: &[u8]) -> GraphicsResult<Vec<u8>> {
    check("rgba", rgba.len(), width, height, 4)?;
    Ok(rgba
        .chunks_exact(4)
        .map(|px| u8::from(px[3] >= ALPHA_THRESHOLD))
        .collect())
}

/// Inverse of [`gray_to_rgba`]: transparent pixels become `background`.
pub fn rgba_to_gray(width: u32, height: u32, rgba: &[u8], background: u8) -> GraphicsResult<Vec<u8>> {
    check("rgba", rgba.len(), width, height, 4)?;
    Ok(rgba
        .chunks_exact(4)
        .map(|px| {
            if px[3] < ALPHA_THRESHOLD {
                background
            } else {
                Rgb::new(px[0], px[1], px[2]).luma()
            }
        })
        .collect())
}

/// Inverse of [`rgb_to_rgba`]: transparent pixels become `background`.
pub fn rgba_to_rgb(width: u32, height: u32, rgba: &[u8], background: Rgb) -> GraphicsResult<Vec<u8>> {
    check("rgba", rgba.len(), width, height, 4)?;
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        if px[3] < ALPHA_THRESHOLD {
            rgb.extend_from_slice(&[background.r, background.g, background.b]);
        } else {
            rgb.extend_from_slice(&px[..3]);
        }
    }
    Ok(rgb)
}

/// Inverse of [`palette_to_rgba`]: transparent pixels map to the entry
/// closest to `background`, opaque ones to their (nearest) palette entry.
pub fn rgba_to_palette(
    width: u32,
    height: u32,
    rgba: &[u8],
    palette: &Palette,
    background: Rgb,
) -> GraphicsResult<Vec<u8>> {
    check("rgba", rgba.len(), width, height, 4)?;
    let bg_index = palette.index_of(background);
    Ok(rgba
        .chunks_exact(4)
        .map(|px| {
            if px[3] < ALPHA_THRESHOLD {
                bg_index
            } else {
                palette.index_of(Rgb::new(px[0], px[1], px[2]))
            }
        })
        .collect())
}
