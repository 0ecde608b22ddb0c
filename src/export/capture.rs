use std::sync::Arc;

use crate::{
    assets::fonts::FontSet,
    export::node::CardNode,
    foundation::error::{CardError, CardResult},
    render::{
        backend::{CardPainter, encode_png},
        cpu::CpuPainter,
        svg::SvgPainter,
    },
};

/// Capability to snapshot a live node as PNG bytes.
pub trait CaptureBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// PNG bytes of `node` at its layout box size.
    fn capture(&self, node: &CardNode) -> CardResult<Vec<u8>>;
}

fn ensure_painted(node: &CardNode) -> CardResult<()> {
    if node.is_fully_painted() {
        Ok(())
    } else {
        Err(CardError::capture("incomplete paint"))
    }
}

/// Serializes the node to SVG and rasterizes it over the page background.
#[derive(Clone, Debug)]
pub struct SvgCapture {
    fonts: Arc<FontSet>,
}

impl SvgCapture {
    /// Backend resolving text against `fonts`.
    pub fn new(fonts: Arc<FontSet>) -> Self {
        Self { fonts }
    }
}

impl CaptureBackend for SvgCapture {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn capture(&self, node: &CardNode) -> CardResult<Vec<u8>> {
        ensure_painted(node)?;
        let mut painter = SvgPainter::new(Arc::clone(&self.fonts));
        let frame = painter.paint(node.layout(), node.logo_image())?;
        encode_png(&frame)
    }
}

/// Captures with the same `vello_cpu` painter the server uses.
#[derive(Clone, Debug)]
pub struct CpuCapture {
    fonts: Arc<FontSet>,
}

impl CpuCapture {
    /// Backend drawing text with `fonts`.
    pub fn new(fonts: Arc<FontSet>) -> Self {
        Self { fonts }
    }
}

impl CaptureBackend for CpuCapture {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn capture(&self, node: &CardNode) -> CardResult<Vec<u8>> {
        ensure_painted(node)?;
        let mut painter = CpuPainter::new(Arc::clone(&self.fonts));
        let frame = painter.paint(node.layout(), node.logo_image())?;
        encode_png(&frame)
    }
}
