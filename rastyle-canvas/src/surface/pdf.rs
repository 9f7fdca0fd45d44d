use super::svg::SvgDocument;
use crate::error::{GraphicsError, GraphicsResult};
use svg2pdf::{ConversionOptions, PageOptions};

/// PDF points per inch.
pub(crate) const POINTS_PER_INCH: f32 = 72.0;

/// Page geometry for a PDF surface, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width_in: f32,
    pub height_in: f32,
    /// Left and right margin.
    pub margin_x_in: f32,
    /// Top and bottom margin.
    pub margin_y_in: f32,
    pub dpi: f32,
}

impl PageSetup {
    /// Drawable size in device pixels: `(page - 2 * margin) * dpi`.
    pub fn drawable_size(&self) -> GraphicsResult<(u32, u32)> {
        let w = (self.width_in - 2.0 * self.margin_x_in) * self.dpi;
        let h = (self.height_in - 2.0 * self.margin_y_in) * self.dpi;
        if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 || self.dpi <= 0.0 {
            return Err(GraphicsError::InvalidDimensions {
                width: w.max(0.0) as u32,
                height: h.max(0.0) as u32,
            });
        }
        Ok((w.round() as u32, h.round() as u32))
    }

    /// Start the page document: device pixels are mapped into the margin box
    /// at `72 / dpi` points each and clipped to it.
    pub(crate) fn begin_document(&self) -> GraphicsResult<SvgDocument> {
        let (w, h) = self.drawable_size()?;
        let mut doc = SvgDocument::new(
            self.width_in * POINTS_PER_INCH,
            self.height_in * POINTS_PER_INCH,
        )?;
        let scale = POINTS_PER_INCH / self.dpi;
        doc.begin_clipped_area(
            self.margin_x_in * POINTS_PER_INCH,
            self.margin_y_in * POINTS_PER_INCH,
            w as f32 * scale,
            h as f32 * scale,
            scale,
        )?;
        Ok(doc)
    }
}

/// Convert a finished page document into PDF bytes.
pub(crate) fn svg_to_pdf(svg: &[u8]) -> GraphicsResult<Vec<u8>> {
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default())
        .map_err(|err| GraphicsError::Pdf(format!("failed to parse page document: {}", err)))?;
    let pdf = svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
        .map_err(|err| GraphicsError::Pdf(err.to_string()))?;
    log::debug!(target: "canvas", "PDF page written ({} bytes)", pdf.len());
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawable_size() {
        let page = PageSetup {
            width_in: 8.5,
            height_in: 11.0,
            margin_x_in: 0.5,
            margin_y_in: 0.5,
            dpi: 100.0,
        };
        assert_eq!(page.drawable_size().unwrap(), (750, 1000));
    }

    #[test]
    fn test_margins_larger_than_page() {
        let page = PageSetup {
            width_in: 1.0,
            height_in: 1.0,
            margin_x_in: 0.6,
            margin_y_in: 0.2,
            dpi: 72.0,
        };
        assert!(matches!(
            page.drawable_size(),
            Err(GraphicsError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_empty_page_converts() {
        let page = PageSetup {
            width_in: 2.0,
            height_in: 2.0,
            margin_x_in: 0.25,
            margin_y_in: 0.5,
            dpi: 72.0,
        };
        let doc = page.begin_document().unwrap();
        let pdf = svg_to_pdf(&doc.finish().unwrap()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
