use super::*;
use crate::{
    card::model::CardModel,
    foundation::core::Canvas,
    layout::{metrics::ApproxMetrics, rules::layout_card},
};

fn frame(w: u32, h: u32, px: [u8; 4], premultiplied: bool) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied,
    }
}

#[test]
fn png_round_trips_straight_alpha() {
    let png = encode_png(&frame(3, 2, [64, 32, 0, 128], true)).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(0, 0).0, [128, 64, 0, 128]);

    let png = encode_png(&frame(1, 1, [10, 20, 30, 40], false)).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 40]);
}

#[test]
fn mismatched_buffer_is_a_render_error() {
    let mut f = frame(2, 2, [0; 4], true);
    f.data.pop();
    assert!(matches!(encode_png(&f), Err(CardError::Render(_))));
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let f = frame(2, 1, [1, 2, 3, 4], false);
    assert_eq!(f.pixel(1, 0), Some([1, 2, 3, 4]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.pixel(0, 1), None);
}

#[test]
fn both_painters_fill_the_canvas() {
    let canvas = Canvas::new(600, 315).unwrap();
    let layout = layout_card(&CardModel::sample(), canvas, &mut ApproxMetrics);
    for kind in [PainterKind::Cpu, PainterKind::Svg] {
        let mut painter = create_painter(kind, Arc::new(FontSet::empty()));
        let f = painter.paint(&layout, None).unwrap();
        assert_eq!((f.width, f.height), (600, 315), "{kind:?}");
        assert_eq!(f.data.len(), 600 * 315 * 4);
    }
}
