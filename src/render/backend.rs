use std::sync::Arc;

use anyhow::Context as _;
use image::ImageEncoder as _;

use crate::{
    assets::{
        decode::{PreparedImage, unpremultiply_in_place},
        fonts::FontSet,
    },
    foundation::error::{CardError, CardResult},
    layout::element::CardLayout,
};

/// A painted card as RGBA8 pixels.
///
/// Both painters produce premultiplied alpha; the flag makes that explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .and_then(|px| <[u8; 4]>::try_from(px).ok())
    }
}

/// Something that can turn a [`CardLayout`] into pixels.
///
/// `logo` is drawn into the logo slot when present; otherwise the slot's placeholder glyph is.
pub trait CardPainter {
    /// Paint `layout` onto a surface of `layout.canvas` size.
    fn paint(&mut self, layout: &CardLayout, logo: Option<&PreparedImage>)
    -> CardResult<FrameRGBA>;
}

/// Available painters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainterKind {
    /// `vello_cpu` rasterizer.
    #[default]
    Cpu,
    /// SVG serialization rasterized by `resvg`.
    Svg,
}

/// Create a painter bound to `fonts`.
pub fn create_painter(kind: PainterKind, fonts: Arc<FontSet>) -> Box<dyn CardPainter> {
    match kind {
        PainterKind::Cpu => Box::new(crate::render::cpu::CpuPainter::new(fonts)),
        PainterKind::Svg => Box::new(crate::render::svg::SvgPainter::new(fonts)),
    }
}

/// Encode a frame as PNG, converting premultiplied pixels back to straight alpha.
pub fn encode_png(frame: &FrameRGBA) -> CardResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(CardError::render(format!(
            "frame byte length {} does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut straight;
    let data = if frame.premultiplied {
        straight = frame.data.clone();
        unpremultiply_in_place(&mut straight);
        straight.as_slice()
    } else {
        frame.data.as_slice()
    };

    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            data,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )
        .context("encode png")?;
    Ok(out)
}

/// Re-encode a decoded logo as PNG (used to embed it in SVG).
pub(crate) fn image_to_png(img: &PreparedImage) -> CardResult<Vec<u8>> {
    encode_png(&FrameRGBA {
        width: img.width,
        height: img.height,
        data: img.rgba8_premul.as_ref().clone(),
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
