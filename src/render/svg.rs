//! SVG serialization of a layout, rasterized with `resvg`.

use std::{fmt::Write as _, sync::Arc};

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::{
    assets::{decode::PreparedImage, fonts::FontSet},
    foundation::{
        core::Rect,
        error::{CardError, CardResult},
    },
    layout::element::{CardLayout, Element, TextRun},
    render::backend::{CardPainter, FrameRGBA, image_to_png},
};

/// Paints by serialising the layout to SVG and rasterizing it with `resvg`.
pub struct SvgPainter {
    fonts: Arc<FontSet>,
}

impl SvgPainter {
    /// Painter resolving text against `fonts`.
    pub fn new(fonts: Arc<FontSet>) -> Self {
        Self { fonts }
    }

    /// Serialize `layout` as a standalone SVG document.
    pub fn to_svg(&self, layout: &CardLayout, logo: Option<&PreparedImage>) -> CardResult<String> {
        let family = escape_xml(&self.fonts.css_family());
        let (w, h) = (layout.canvas.width, layout.canvas.height);
        let mut out = String::with_capacity(4096);
        // String formatting cannot fail; results are ignored throughout.
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(
            out,
            r#"<rect x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
            layout.background.to_css_hex()
        );

        let logo_href = match logo {
            Some(img) => Some(format!(
                "data:image/png;base64,{}",
                BASE64.encode(image_to_png(img)?)
            )),
            None => None,
        };

        for placed in &layout.elements {
            match &placed.element {
                Element::Rect {
                    rect,
                    radius,
                    fill,
                    border,
                } => {
                    let mut inner = *rect;
                    let mut inner_radius = *radius;
                    if let Some(b) = border {
                        write_rect(&mut out, *rect, *radius, &b.color.to_css_hex());
                        inner = rect.inset(-b.width);
                        inner_radius = (radius - b.width).max(0.0);
                    }
                    write_rect(&mut out, inner, inner_radius, &fill.to_css_hex());
                }
                Element::Circle {
                    center,
                    radius,
                    fill,
                } => {
                    let _ = writeln!(
                        out,
                        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
                        center.x,
                        center.y,
                        radius,
                        fill.to_css_hex()
                    );
                }
                Element::Text(run) => write_text(&mut out, run, &family),
                Element::Image { slot, placeholder } => match (&logo_href, logo) {
                    (Some(href), Some(img)) => {
                        let dst = img.contain_in(*slot);
                        let _ = writeln!(
                            out,
                            r#"<image x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" preserveAspectRatio="xMidYMid meet" href="{href}"/>"#,
                            dst.x0,
                            dst.y0,
                            dst.width(),
                            dst.height()
                        );
                    }
                    _ => write_text(&mut out, placeholder, &family),
                },
            }
        }
        out.push_str("</svg>\n");
        Ok(out)
    }
}

impl CardPainter for SvgPainter {
    #[tracing::instrument(level = "debug", skip_all, fields(w = layout.canvas.width, h = layout.canvas.height))]
    fn paint(
        &mut self,
        layout: &CardLayout,
        logo: Option<&PreparedImage>,
    ) -> CardResult<FrameRGBA> {
        let svg = self.to_svg(layout, logo)?;
        let opts = usvg::Options {
            fontdb: self.fonts.database(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse card svg")?;

        let (w, h) = (layout.canvas.width, layout.canvas.height);
        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| CardError::render("failed to allocate svg pixmap"))?;
        let bg = layout.background;
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        Ok(FrameRGBA {
            width: w,
            height: h,
            data: pixmap.data().to_vec(),
            premultiplied: true,
        })
    }
}

fn write_rect(out: &mut String, rect: Rect, radius: f64, fill: &str) {
    let r = radius.min(rect.width().min(rect.height()) / 2.0).max(0.0);
    let _ = writeln!(
        out,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{r:.2}" fill="{fill}"/>"#,
        rect.x0,
        rect.y0,
        rect.width(),
        rect.height()
    );
}

fn write_text(out: &mut String, run: &TextRun, family: &str) {
    let size = f64::from(run.size_px);
    // Alphabetic baseline placed so the em box sits centred in the line box.
    let baseline = run.origin.y + run.line_height / 2.0 + 0.35 * size;
    let _ = writeln!(
        out,
        r#"<text x="{:.2}" y="{:.2}" font-family="{family}" font-size="{:.2}" font-weight="{}" fill="{}" xml:space="preserve">{}</text>"#,
        run.origin.x,
        baseline,
        size,
        run.weight.css(),
        run.color.to_css_hex(),
        escape_xml(&run.text)
    );
}

/// Escape text for use in XML content and attribute values.
///
/// Characters XML 1.0 does not allow (C0 controls other than tab, newline and carriage
/// return, and the non-characters U+FFFE and U+FFFF) are dropped.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' | '\n' | '\r' => out.push(c),
            c if c < ' ' || c == '\u{fffe}' || c == '\u{ffff}' => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
