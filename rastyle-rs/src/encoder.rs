//! Output encoding of composited images.

use crate::error::{RenderError, RenderResult};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Tiff,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Tiff => "image/tiff",
        }
    }

    /// Only PNG output carries an alpha channel.
    pub fn supports_alpha(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }
}

/// Split RGB plus optional alpha plane handed to an encoder.
#[derive(Debug, Clone, Copy)]
pub struct EncodeInput<'a> {
    pub width: u32,
    pub height: u32,
    pub rgb: &'a [u8],
    pub alpha: Option<&'a [u8]>,
}

/// The encoder collaborator.
pub trait Encoder: Sync {
    /// Encode `input` as `format`. `quality` (1-100) applies to JPEG;
    /// `opacity` scales the alpha plane where the format keeps one.
    fn encode(
        &self,
        input: &EncodeInput<'_>,
        format: OutputFormat,
        quality: u8,
        opacity: f64,
    ) -> RenderResult<Vec<u8>>;
}

/// PNG through `png`, JPEG and TIFF through `image`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEncoder;

impl Encoder for StandardEncoder {
    fn encode(
        &self,
        input: &EncodeInput<'_>,
        format: OutputFormat,
        quality: u8,
        opacity: f64,
    ) -> RenderResult<Vec<u8>> {
        check_input(input)?;
        log::debug!(
            target: "raster",
            "encoding {}x{} as {:?}",
            input.width,
            input.height,
            format
        );
        match format {
            OutputFormat::Png => encode_png(input, opacity),
            OutputFormat::Jpeg => {
                let mut buf = Vec::new();
                JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).write_image(
                    input.rgb,
                    input.width,
                    input.height,
                    ExtendedColorType::Rgb8,
                )?;
                Ok(buf)
            }
            OutputFormat::Tiff => {
                let mut buf = Cursor::new(Vec::new());
                TiffEncoder::new(&mut buf).write_image(
                    input.rgb,
                    input.width,
                    input.height,
                    ExtendedColorType::Rgb8,
                )?;
                Ok(buf.into_inner())
            }
        }
    }
}

fn check_input(input: &EncodeInput<'_>) -> RenderResult<()> {
    let pixels = input.width as usize * input.height as usize;
    let alpha_ok = input.alpha.map_or(true, |a| a.len() == pixels);
    if pixels == 0 || input.rgb.len() != pixels * 3 || !alpha_ok {
        return Err(RenderError::Encoder(format!(
            "buffer sizes do not match {}x{}",
            input.width, input.height
        )));
    }
    Ok(())
}

fn encode_png(input: &EncodeInput<'_>, opacity: f64) -> RenderResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, input.width, input.height);
        encoder.set_depth(png::BitDepth::Eight);
        match input.alpha {
            Some(alpha) => {
                encoder.set_color(png::ColorType::Rgba);
                let opacity = opacity.clamp(0.0, 1.0);
                let mut rgba = Vec::with_capacity(alpha.len() * 4);
                for (px, a) in input.rgb.chunks_exact(3).zip(alpha) {
                    rgba.extend_from_slice(px);
                    rgba.push((*a as f64 * opacity).round() as u8);
                }
                let mut writer = encoder.write_header()?;
                writer.write_image_data(&rgba)?;
            }
            None => {
                encoder.set_color(png::ColorType::Rgb);
                let mut writer = encoder.write_header()?;
                writer.write_image_data(input.rgb)?;
            }
        }
    }
    Ok(buf)
}
