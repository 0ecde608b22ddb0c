//! Painting layouts to pixels and PNG.

pub mod backend;
pub mod cpu;
pub mod svg;

use std::sync::Arc;

use crate::{
    assets::{decode::PreparedImage, fonts::FontSet},
    card::model::CardModel,
    foundation::{core::Canvas, error::CardResult},
    layout::{element::CardLayout, rules::layout_card},
};

pub use backend::{CardPainter, FrameRGBA, PainterKind, create_painter, encode_png};
pub use cpu::CpuPainter;
pub use svg::SvgPainter;

/// Server-side rasterizer: model in, PNG out.
///
/// Holds only immutable font data, so one instance can be shared across requests.
#[derive(Clone, Debug)]
pub struct CardRenderer {
    fonts: Arc<FontSet>,
    canvas: Canvas,
}

impl CardRenderer {
    /// Renderer for the fixed 1200×630 canvas.
    pub fn new(fonts: Arc<FontSet>) -> Self {
        Self {
            fonts,
            canvas: Canvas::OG,
        }
    }

    /// Override the output canvas.
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Shared font data.
    pub fn fonts(&self) -> &Arc<FontSet> {
        &self.fonts
    }

    /// Lay `model` out with the same measurements the painter uses.
    pub fn layout(&self, model: &CardModel) -> CardLayout {
        let mut painter = CpuPainter::new(Arc::clone(&self.fonts));
        layout_card(model, self.canvas, painter.measure())
    }

    /// Lay out, paint and encode one card.
    #[tracing::instrument(level = "debug", skip_all, fields(company = model.company(), logo = logo.is_some()))]
    pub fn render_png(&self, model: &CardModel, logo: Option<&PreparedImage>) -> CardResult<Vec<u8>> {
        let mut painter = CpuPainter::new(Arc::clone(&self.fonts));
        let layout = layout_card(model, self.canvas, painter.measure());
        let frame = painter.paint(&layout, logo)?;
        encode_png(&frame)
    }
}
