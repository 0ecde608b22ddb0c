use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{CardError, CardResult};

/// Decoded raster logo in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 pixels.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Largest rectangle with the image's aspect ratio that fits `slot`, centred in it.
    pub fn contain_in(&self, slot: kurbo::Rect) -> kurbo::Rect {
        let (iw, ih) = (f64::from(self.width), f64::from(self.height));
        let s = (slot.width() / iw).min(slot.height() / ih);
        let (w, h) = (iw * s, ih * s);
        let c = slot.center();
        kurbo::Rect::new(c.x - w / 2.0, c.y - h / 2.0, c.x + w / 2.0, c.y + h / 2.0)
    }
}

/// Decode PNG, JPEG, GIF or WebP bytes.
pub fn decode_image(bytes: &[u8]) -> CardResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode logo image")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(CardError::asset("logo image has zero size"));
    }

    let mut px = rgba.into_raw();
    premultiply_in_place(&mut px);
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(px),
    })
}

pub(crate) fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

pub(crate) fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
