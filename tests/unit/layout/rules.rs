use super::*;
use crate::{
    card::model::{Batch, LogoRef, TagSet},
    layout::metrics::ApproxMetrics,
};
use std::sync::Arc;

fn lay(model: &CardModel) -> CardLayout {
    layout_card(model, Canvas::OG, &mut ApproxMetrics)
}

fn acme() -> CardModel {
    CardModel::new("Acme", "https://acme.io", Batch::Summer2027)
        .with_jobs(12)
        .with_tags(TagSet::from_delimited("AI,SAAS"))
}

#[test]
fn layout_is_deterministic() {
    let m = acme();
    assert_eq!(lay(&m), lay(&m));
}

#[test]
fn sample_card_places_every_fixed_element() {
    let l = lay(&CardModel::sample());
    for role in [
        ElementRole::Background,
        ElementRole::LogoBox,
        ElementRole::LogoSlot,
        ElementRole::Company,
        ElementRole::OrgBadge,
        ElementRole::BatchBadge,
        ElementRole::StatusBadge,
        ElementRole::StatusDot,
        ElementRole::Divider,
        ElementRole::JobsLabel,
        ElementRole::JobsValue,
        ElementRole::UrlLabel,
        ElementRole::UrlValue,
        ElementRole::UrlUnderline,
    ] {
        assert!(l.bounds(role).is_some(), "missing {role:?}");
    }
    assert_eq!(l.text(ElementRole::Company), Some("Company Name"));
    assert_eq!(l.text(ElementRole::BatchBadge), Some("Winter 2030"));
    assert_eq!(l.text(ElementRole::StatusBadge), Some("ACTIVE"));
    assert_eq!(l.text(ElementRole::OrgBadge), Some("Y"));
    assert_eq!(l.text(ElementRole::JobsValue), Some("69"));
    assert_eq!(l.text(ElementRole::UrlValue), Some("https://yourcompany.com"));
    assert_eq!(l.tag_texts(), vec!["SOFTWARE", "DATA", "STARTUP"]);
    assert!(l.bounds(ElementRole::Description).is_none());
}

#[test]
fn elements_stay_inside_the_canvas() {
    let l = lay(&acme().with_description("Rockets for everyone"));
    let canvas = Canvas::OG.rect();
    for p in &l.elements {
        let b = p.bounds();
        assert!(
            b.x0 >= 0.0 && b.y0 >= 0.0 && b.x1 <= canvas.x1 && b.y1 <= canvas.y1,
            "{:?} escapes the canvas: {b:?}",
            p.role
        );
    }
}

#[test]
fn empty_tag_list_emits_no_tag_row() {
    let l = lay(&acme().with_tags(TagSet::new()));
    assert!(!l.has_tag_row());
}

#[test]
fn tags_keep_insertion_order() {
    let l = lay(&acme().with_tags(TagSet::from_delimited("ZETA,ALPHA,MID")));
    assert_eq!(l.tag_texts(), vec!["ZETA", "ALPHA", "MID"]);
}

#[test]
fn surplus_tags_collapse_into_overflow_pill() {
    let tags: TagSet = (0..40)
        .map(|i| format!("TAG NUMBER {i}"))
        .collect::<Vec<_>>()
        .iter()
        .map(String::as_str)
        .collect();
    let l = lay(&acme().with_tags(tags));
    let shown = l.tag_texts().len();
    assert!(shown > 0 && shown < 40);
    let overflow = l
        .with_role(ElementRole::TagOverflow)
        .find_map(|p| match &p.element {
            Element::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(overflow, format!("+{}", 40 - shown));

    // Two lines at most.
    let mut rows: Vec<i64> = l
        .elements
        .iter()
        .filter(|p| matches!(p.role, ElementRole::Tag(_) | ElementRole::TagOverflow))
        .map(|p| p.bounds().y0.round() as i64)
        .collect();
    rows.dedup();
    rows.sort();
    rows.dedup();
    assert_eq!(rows.len(), 2);
}

#[test]
fn logo_slot_is_stable_whether_or_not_a_logo_is_set() {
    let without = lay(&acme());
    let with = lay(&acme().with_logo(LogoRef::Bytes(Arc::new(vec![1, 2, 3]))));
    let a = without.bounds(ElementRole::LogoSlot).unwrap();
    let b = with.bounds(ElementRole::LogoSlot).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.width(), 120.0);
    assert_eq!(a.height(), 120.0);

    let outer = without.bounds(ElementRole::LogoBox).unwrap();
    assert_eq!(outer.width(), 160.0);
    assert_eq!(outer.center(), a.center());
}

#[test]
fn placeholder_is_centred_in_the_slot() {
    let l = lay(&acme());
    let Some(Placed {
        element: Element::Image { slot, placeholder },
        ..
    }) = l.with_role(ElementRole::LogoSlot).next()
    else {
        panic!("no logo slot");
    };
    assert_eq!(placeholder.text, "Logo");
    let c = placeholder.bounds().center();
    assert!((c.x - slot.center().x).abs() < 1e-9);
    assert!((c.y - slot.center().y).abs() < 1e-9);
}

#[test]
fn long_company_name_is_ellipsized_within_the_column() {
    let name = "Extraordinarily Long Company Name That Keeps Going ".repeat(4);
    let l = lay(&CardModel::new(name.trim(), "https://x.io", Batch::Winter2026));
    let text = l.text(ElementRole::Company).unwrap();
    assert!(text.ends_with('…'));
    let b = l.bounds(ElementRole::Company).unwrap();
    assert!(b.x1 <= 1200.0 - 48.0 + 1e-9);
}

#[test]
fn description_sits_between_company_and_badges() {
    let l = lay(&acme().with_description("We build rockets"));
    let company = l.bounds(ElementRole::Company).unwrap();
    let description = l.bounds(ElementRole::Description).unwrap();
    let badges = l.bounds(ElementRole::BatchBadge).unwrap();
    assert!(company.y1 <= description.y0);
    assert!(description.y1 <= badges.y0);
}

#[test]
fn footer_follows_the_divider() {
    let l = lay(&acme());
    let divider = l.bounds(ElementRole::Divider).unwrap();
    let header = l.bounds(ElementRole::LogoBox).unwrap();
    assert!(divider.y0 >= header.y1 + 48.0 - 1e-9);
    assert_eq!(divider.height(), 2.0);
    let jobs = l.bounds(ElementRole::JobsLabel).unwrap();
    assert!((jobs.y0 - (divider.y1 + 32.0)).abs() < 1e-9);
    let url = l.bounds(ElementRole::UrlLabel).unwrap();
    assert!(url.x0 > jobs.x1);
}

#[test]
fn url_underline_spans_the_url_text() {
    let l = lay(&acme());
    let text = l.bounds(ElementRole::UrlValue).unwrap();
    let line = l.bounds(ElementRole::UrlUnderline).unwrap();
    assert_eq!(line.x0, text.x0);
    assert_eq!(line.x1, text.x1);
    assert!(line.y0 > text.y0 && line.y1 <= text.y1);
}

#[test]
fn smaller_canvas_scales_uniformly() {
    let m = acme();
    let full = lay(&m);
    let half = layout_card(&m, Canvas::new(600, 315).unwrap(), &mut ApproxMetrics);
    assert_eq!(half.scale, 0.5);
    let a = full.bounds(ElementRole::LogoSlot).unwrap();
    let b = half.bounds(ElementRole::LogoSlot).unwrap();
    assert!((b.x0 - a.x0 / 2.0).abs() < 1e-9);
    assert!((b.width() - a.width() / 2.0).abs() < 1e-9);
    assert_eq!(half.bounds(ElementRole::Background), Some(Canvas::new(600, 315).unwrap().rect()));
}
