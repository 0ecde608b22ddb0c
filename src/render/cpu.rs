use std::sync::Arc;

use vello_cpu::kurbo::Shape as _;

use crate::{
    assets::{
        decode::PreparedImage,
        fonts::{FontSet, TextShaper},
    },
    foundation::{
        core::{Rect, Rgba8},
        error::{CardError, CardResult},
    },
    layout::{
        element::{Border, CardLayout, Element, TextRun},
        metrics::{TextMeasure, TextWeight},
    },
    render::backend::{CardPainter, FrameRGBA},
};

const TOLERANCE: f64 = 0.1;

/// Rasterizes layouts with `vello_cpu`. Text is shaped with `parley`.
pub struct CpuPainter {
    shaper: TextShaper,
    regular: Option<vello_cpu::peniko::FontData>,
    bold: Option<vello_cpu::peniko::FontData>,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuPainter {
    /// Painter drawing text with faces from `fonts`.
    pub fn new(fonts: Arc<FontSet>) -> Self {
        let font_data = |weight| {
            fonts.face(weight).map(|f| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(f.bytes.as_ref().clone()),
                    f.index,
                )
            })
        };
        let regular = font_data(TextWeight::Regular);
        let bold = font_data(TextWeight::Bold);
        Self {
            shaper: TextShaper::new(fonts),
            regular,
            bold,
            ctx: None,
        }
    }

    /// The measurer that matches what this painter draws.
    pub fn measure(&mut self) -> &mut dyn TextMeasure {
        &mut self.shaper
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> CardResult<R>,
    ) -> CardResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx);
        self.ctx = Some(ctx);
        out
    }

    fn draw_text(&mut self, ctx: &mut vello_cpu::RenderContext, run: &TextRun) {
        let font = match run.weight {
            TextWeight::Regular => self.regular.as_ref(),
            TextWeight::Bold => self.bold.as_ref().or(self.regular.as_ref()),
        };
        let Some(font) = font else {
            return;
        };
        let Some(layout) = self
            .shaper
            .shape(&run.text, run.size_px, run.weight, run.color)
        else {
            return;
        };

        let dy = run.origin.y + (run.line_height - f64::from(layout.height())) / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((run.origin.x, dy)));
        ctx.set_paint(paint(run.color));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let glyphs = glyph_run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(glyph_run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl CardPainter for CpuPainter {
    #[tracing::instrument(level = "debug", skip_all, fields(w = layout.canvas.width, h = layout.canvas.height))]
    fn paint(
        &mut self,
        layout: &CardLayout,
        logo: Option<&PreparedImage>,
    ) -> CardResult<FrameRGBA> {
        let (w, h) = surface_size(layout)?;
        let logo_paint = logo.map(image_paint).transpose()?;

        self.with_ctx_mut(w, h, |this, ctx| {
            ctx.set_paint(paint(layout.background));
            ctx.fill_rect(&cpu_rect(layout.canvas.rect()));

            for placed in &layout.elements {
                match &placed.element {
                    Element::Rect {
                        rect,
                        radius,
                        fill,
                        border,
                    } => fill_rounded(ctx, *rect, *radius, *fill, border.as_ref()),
                    Element::Circle {
                        center,
                        radius,
                        fill,
                    } => {
                        ctx.set_paint(paint(*fill));
                        let circle =
                            vello_cpu::kurbo::Circle::new((center.x, center.y), *radius);
                        ctx.fill_path(&circle.to_path(TOLERANCE));
                    }
                    Element::Text(run) => this.draw_text(ctx, run),
                    Element::Image { slot, placeholder } => match (&logo_paint, logo) {
                        (Some(image), Some(img)) => {
                            let dst = img.contain_in(*slot);
                            let s = dst.width() / f64::from(img.width);
                            ctx.set_transform(
                                vello_cpu::kurbo::Affine::translate((dst.x0, dst.y0))
                                    * vello_cpu::kurbo::Affine::scale(s),
                            );
                            ctx.set_paint(image.clone());
                            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                                0.0,
                                0.0,
                                f64::from(img.width),
                                f64::from(img.height),
                            ));
                            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                        }
                        _ => this.draw_text(ctx, placeholder),
                    },
                }
            }

            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(FrameRGBA {
                width: layout.canvas.width,
                height: layout.canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }
}

fn surface_size(layout: &CardLayout) -> CardResult<(u16, u16)> {
    let w: u16 = layout
        .canvas
        .width
        .try_into()
        .map_err(|_| CardError::render("canvas width exceeds u16"))?;
    let h: u16 = layout
        .canvas
        .height
        .try_into()
        .map_err(|_| CardError::render("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn paint(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn cpu_rect(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn fill_rounded(
    ctx: &mut vello_cpu::RenderContext,
    rect: Rect,
    radius: f64,
    fill: Rgba8,
    border: Option<&Border>,
) {
    let mut inner = rect;
    let mut inner_radius = radius;
    if let Some(b) = border {
        ctx.set_paint(paint(b.color));
        fill_shape(ctx, rect, radius);
        inner = rect.inset(-b.width);
        inner_radius = (radius - b.width).max(0.0);
    }
    ctx.set_paint(paint(fill));
    fill_shape(ctx, inner, inner_radius);
}

fn fill_shape(ctx: &mut vello_cpu::RenderContext, rect: Rect, radius: f64) {
    let r = radius.min(rect.width().min(rect.height()) / 2.0).max(0.0);
    if r <= 0.0 {
        ctx.fill_rect(&cpu_rect(rect));
        return;
    }
    let rr = vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, r);
    ctx.fill_path(&rr.to_path(TOLERANCE));
}

fn image_paint(img: &PreparedImage) -> CardResult<vello_cpu::Image> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| CardError::render("logo width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| CardError::render("logo height exceeds u16"))?;
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = img
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    if pixels.len() != usize::from(w) * usize::from(h) {
        return Err(CardError::render("logo pixel buffer does not match its size"));
    }
    let has_opacities = pixels.iter().any(|p| p.a != 255);
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, has_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
