//! SVG document writer backing the SVG and PDF surfaces.

use crate::bitmap::pixmap_to_png;
use crate::color::Rgba;
use crate::error::{GraphicsError, GraphicsResult};
use crate::paint::{Paint, Pen};
use crate::style::FillRule;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fmt::Write as _;
use tiny_skia::{PathSegment, Pixmap, Transform};

/// Streaming SVG writer; geometry is emitted in device coordinates.
pub(crate) struct SvgDocument {
    writer: Writer<Vec<u8>>,
    next_id: u32,
    open_groups: usize,
}

fn xml_err<E: std::fmt::Display>(err: E) -> GraphicsError {
    GraphicsError::BackendStatus(format!("SVG writer: {}", err))
}

impl SvgDocument {
    /// Start a document of `width`×`height` user units with a matching viewBox.
    pub(crate) fn new(width: f32, height: f32) -> GraphicsResult<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;

        let width_attr = fmt_num(width);
        let height_attr = fmt_num(height);
        let view_box = format!("0 0 {} {}", width_attr, height_attr);
        let mut root = BytesStart::new("svg");
        root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
        root.push_attribute(("version", "1.1"));
        root.push_attribute(("width", width_attr.as_str()));
        root.push_attribute(("height", height_attr.as_str()));
        root.push_attribute(("viewBox", view_box.as_str()));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        Ok(Self {
            writer,
            next_id: 0,
            open_groups: 0,
        })
    }

    /// Open a group clipped to the given rectangle and mapping drawing
    /// coordinates through `scale`, with its origin at the rectangle corner.
    pub(crate) fn begin_clipped_area(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        scale: f32,
    ) -> GraphicsResult<()> {
        let id = self.next_id("clip");
        self.start("defs", &[])?;
        self.start("clipPath", &[("id", id.clone())])?;
        self.empty(
            "rect",
            &[
                ("x", fmt_num(x)),
                ("y", fmt_num(y)),
                ("width", fmt_num(width)),
                ("height", fmt_num(height)),
            ],
        )?;
        self.end("clipPath")?;
        self.end("defs")?;

        self.start("g", &[("clip-path", format!("url(#{})", id))])?;
        self.open_groups += 1;
        self.start(
            "g",
            &[(
                "transform",
                format!(
                    "translate({} {}) scale({})",
                    fmt_num(x),
                    fmt_num(y),
                    fmt_num(scale)
                ),
            )],
        )?;
        self.open_groups += 1;
        Ok(())
    }

    pub(crate) fn fill_path(
        &mut self,
        path: &tiny_skia::Path,
        paint: &Paint,
        rule: FillRule,
        transform: Transform,
    ) -> GraphicsResult<()> {
        let Some(d) = path_data(path, transform) else {
            return Ok(());
        };
        let mut attrs = vec![("d", d)];
        attrs.extend(self.paint_attrs(paint, "fill")?);
        attrs.push(("fill-rule", rule.svg_name().to_string()));
        attrs.push(("stroke", "none".to_string()));
        self.empty("path", &attrs)
    }

    pub(crate) fn stroke_path(
        &mut self,
        path: &tiny_skia::Path,
        pen: &Pen,
        transform: Transform,
    ) -> GraphicsResult<()> {
        let Some(d) = path_data(path, transform) else {
            return Ok(());
        };
        // Widths scale with the transform the same way the rasterizer does
        let scale = transform_scale(&transform);
        let mut attrs = vec![("d", d), ("fill", "none".to_string())];
        attrs.extend(self.paint_attrs(&pen.paint, "stroke")?);
        attrs.push(("stroke-width", fmt_num(pen.width * scale)));
        attrs.push(("stroke-linecap", pen.cap.svg_name().to_string()));
        attrs.push(("stroke-linejoin", pen.join.svg_name().to_string()));
        if !pen.dash.is_empty() {
            let dashes: Vec<String> = pen.dash.iter().map(|d| fmt_num(d * scale)).collect();
            attrs.push(("stroke-dasharray", dashes.join(" ")));
            attrs.push(("stroke-dashoffset", fmt_num(pen.dash_offset * scale)));
        }
        self.empty("path", &attrs)
    }

    pub(crate) fn image(
        &mut self,
        pixmap: &Pixmap,
        transform: Transform,
        opacity: f32,
    ) -> GraphicsResult<()> {
        let href = png_data_url(pixmap)?;
        let mut attrs = vec![
            ("width", pixmap.width().to_string()),
            ("height", pixmap.height().to_string()),
            ("preserveAspectRatio", "none".to_string()),
            ("transform", matrix(&transform)),
        ];
        if opacity < 1.0 {
            attrs.push(("opacity", fmt_num(opacity)));
        }
        attrs.push(("href", href));
        self.empty("image", &attrs)
    }

    /// Close open groups and the root element, returning the document bytes.
    pub(crate) fn finish(mut self) -> GraphicsResult<Vec<u8>> {
        while self.open_groups > 0 {
            self.end("g")?;
            self.open_groups -= 1;
        }
        self.end("svg")?;
        Ok(self.writer.into_inner())
    }

    /// Paint attributes for `target` ("fill" or "stroke"); gradients and
    /// patterns are written as definitions right before their first use.
    fn paint_attrs(&mut self, paint: &Paint, target: &'static str) -> GraphicsResult<Vec<(&'static str, String)>> {
        let opacity_attr = if target == "fill" { "fill-opacity" } else { "stroke-opacity" };
        match paint {
            Paint::Solid(color) => Ok(vec![
                (target, color.to_hex()),
                (opacity_attr, fmt_num(color.opacity())),
            ]),
            Paint::LinearGradient(gradient) => {
                let id = self.next_id("grad");
                let (x1, y1) = gradient.start_point();
                let (x2, y2) = gradient.end_point();
                self.start("defs", &[])?;
                self.start(
                    "linearGradient",
                    &[
                        ("id", id.clone()),
                        ("gradientUnits", "userSpaceOnUse".to_string()),
                        ("x1", fmt_num(x1)),
                        ("y1", fmt_num(y1)),
                        ("x2", fmt_num(x2)),
                        ("y2", fmt_num(y2)),
                    ],
                )?;
                self.stop(0.0, gradient.start)?;
                self.stop(1.0, gradient.end)?;
                self.end("linearGradient")?;
                self.end("defs")?;
                Ok(vec![(target, format!("url(#{})", id))])
            }
            Paint::Pattern(pattern) => {
                let id = self.next_id("pat");
                let href = png_data_url(pattern.pixmap())?;
                let (w, h) = (pattern.width().to_string(), pattern.height().to_string());
                self.start("defs", &[])?;
                self.start(
                    "pattern",
                    &[
                        ("id", id.clone()),
                        ("patternUnits", "userSpaceOnUse".to_string()),
                        ("x", "0".to_string()),
                        ("y", "0".to_string()),
                        ("width", w.clone()),
                        ("height", h.clone()),
                    ],
                )?;
                self.empty("image", &[("width", w), ("height", h), ("href", href)])?;
                self.end("pattern")?;
                self.end("defs")?;
                Ok(vec![(target, format!("url(#{})", id))])
            }
        }
    }

    fn stop(&mut self, offset: f32, color: Rgba) -> GraphicsResult<()> {
        self.empty(
            "stop",
            &[
                ("offset", fmt_num(offset)),
                ("stop-color", color.to_hex()),
                ("stop-opacity", fmt_num(color.opacity())),
            ],
        )
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn start(&mut self, name: &str, attrs: &[(&str, String)]) -> GraphicsResult<()> {
        let mut elem = BytesStart::new(name);
        for (key, value) in attrs {
            elem.push_attribute((*key, value.as_str()));
        }
        self.writer.write_event(Event::Start(elem)).map_err(xml_err)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, String)]) -> GraphicsResult<()> {
        let mut elem = BytesStart::new(name);
        for (key, value) in attrs {
            elem.push_attribute((*key, value.as_str()));
        }
        self.writer.write_event(Event::Empty(elem)).map_err(xml_err)
    }

    fn end(&mut self, name: &str) -> GraphicsResult<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_err)
    }
}

fn png_data_url(pixmap: &Pixmap) -> GraphicsResult<String> {
    let png = pixmap_to_png(pixmap)?;
    Ok(format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png)))
}

fn fmt_num(v: f32) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn matrix(t: &Transform) -> String {
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_num(t.sx),
        fmt_num(t.ky),
        fmt_num(t.kx),
        fmt_num(t.sy),
        fmt_num(t.tx),
        fmt_num(t.ty)
    )
}

pub(crate) fn transform_scale(t: &Transform) -> f32 {
    ((t.sx * t.sx + t.ky * t.ky).sqrt() + (t.kx * t.kx + t.sy * t.sy).sqrt()) / 2.0
}

/// SVG path data of `path` mapped through `transform`.
fn path_data(path: &tiny_skia::Path, transform: Transform) -> Option<String> {
    let path = path.clone().transform(transform)?;
    let mut d = String::new();
    for segment in path.segments() {
        // Writing into a String cannot fail
        let _ = match segment {
            PathSegment::MoveTo(p) => write!(d, "M{} {} ", fmt_num(p.x), fmt_num(p.y)),
            PathSegment::LineTo(p) => write!(d, "L{} {} ", fmt_num(p.x), fmt_num(p.y)),
            PathSegment::QuadTo(c, p) => write!(
                d,
                "Q{} {} {} {} ",
                fmt_num(c.x),
                fmt_num(c.y),
                fmt_num(p.x),
                fmt_num(p.y)
            ),
            PathSegment::CubicTo(c1, c2, p) => write!(
                d,
                "C{} {} {} {} {} {} ",
                fmt_num(c1.x),
                fmt_num(c1.y),
                fmt_num(c2.x),
                fmt_num(c2.y),
                fmt_num(p.x),
                fmt_num(p.y)
            ),
            PathSegment::Close => write!(d, "Z "),
        };
    }
    Some(d.trim_end().to_string())
}
