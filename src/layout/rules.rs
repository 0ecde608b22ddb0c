//! Deterministic card composition shared by both rendering paths.
//!
//! Everything is laid out in a 1200×630 design space and uniformly scaled into the target
//! canvas at the end, so the server raster and the live node agree element for element.

use crate::{
    card::{
        defaults::{self, MAX_DESCRIPTION_CHARS},
        model::CardModel,
    },
    foundation::core::{Canvas, Point, Rect, Rgba8},
    layout::{
        element::{Border, CardLayout, Element, ElementRole, Placed, TextRun},
        metrics::{TextMeasure, TextWeight, fit_text},
    },
};

const DESIGN: Canvas = Canvas::OG;
const PAD: f64 = 48.0;
const LINE: f64 = 1.2;

const LOGO_BOX: f64 = 160.0;
const LOGO_IMAGE: f64 = 120.0;
const LOGO_RADIUS: f64 = 32.0;
const LOGO_GAP: f64 = 40.0;

const COMPANY_PX: f32 = 56.0;
const DESCRIPTION_PX: f32 = 24.0;
const BADGE_PX: f32 = 28.0;
const TAG_PX: f32 = 24.0;
const LABEL_PX: f32 = 20.0;
const JOBS_PX: f32 = 28.0;
const URL_PX: f32 = 24.0;
const PLACEHOLDER_PX: f32 = 48.0;

const ROW_GAP: f64 = 16.0;
const BADGE_GAP: f64 = 16.0;
const TAG_GAP: f64 = 12.0;
const TAG_LINES: usize = 2;
const STATUS_DOT: f64 = 16.0;
const STAT_GAP: f64 = 80.0;
const DIVIDER_MARGIN: f64 = 48.0;
const FOOTER_PAD: f64 = 32.0;

/// Card palette.
pub mod palette {
    use crate::foundation::core::Rgba8;

    /// Canonical off-white page color.
    pub const PAGE: Rgba8 = Rgba8::hex(0xfaf9f6);
    /// Logo box fill.
    pub const WHITE: Rgba8 = Rgba8::hex(0xffffff);
    /// Hairlines (logo border, divider).
    pub const HAIRLINE: Rgba8 = Rgba8::hex(0xeeeeee);
    /// Placeholder glyph.
    pub const PLACEHOLDER: Rgba8 = Rgba8::hex(0xbbbbbb);
    /// Primary ink.
    pub const INK: Rgba8 = Rgba8::hex(0x222222);
    /// Company name ink.
    pub const INK_STRONG: Rgba8 = Rgba8::hex(0x111827);
    /// Description ink.
    pub const INK_SOFT: Rgba8 = Rgba8::hex(0x4b5563);
    /// Footer captions.
    pub const CAPTION: Rgba8 = Rgba8::hex(0x6b7280);
    /// Organisation badge background.
    pub const ORG_BG: Rgba8 = Rgba8::hex(0xffe6cc);
    /// Organisation badge ink.
    pub const ORG_FG: Rgba8 = Rgba8::hex(0xd97706);
    /// Batch badge background.
    pub const BATCH_BG: Rgba8 = Rgba8::hex(0xf3f4f6);
    /// Status pill background.
    pub const STATUS_BG: Rgba8 = Rgba8::hex(0xd1fae5);
    /// Status pill ink.
    pub const STATUS_FG: Rgba8 = Rgba8::hex(0x047857);
    /// Status dot.
    pub const STATUS_DOT: Rgba8 = Rgba8::hex(0x22c55e);
    /// Tag pill background.
    pub const TAG_BG: Rgba8 = Rgba8::hex(0xe5e7eb);
    /// Link color.
    pub const LINK: Rgba8 = Rgba8::hex(0x2563eb);
}

/// Organisation badge text.
pub const ORG_BADGE: &str = "Y";
/// Placeholder glyph text shown when no logo is available.
pub const LOGO_PLACEHOLDER: &str = "Logo";

struct PillStyle {
    size_px: f32,
    pad_x: f64,
    pad_y: f64,
    radius: f64,
    bg: Rgba8,
    fg: Rgba8,
}

const BADGE: PillStyle = PillStyle {
    size_px: BADGE_PX,
    pad_x: 16.0,
    pad_y: 4.0,
    radius: 8.0,
    bg: palette::BATCH_BG,
    fg: palette::INK,
};

const TAG: PillStyle = PillStyle {
    size_px: TAG_PX,
    pad_x: 12.0,
    pad_y: 2.0,
    radius: 8.0,
    bg: palette::TAG_BG,
    fg: palette::INK,
};

impl PillStyle {
    fn height(&self) -> f64 {
        line_height(self.size_px) + 2.0 * self.pad_y
    }
}

fn line_height(size_px: f32) -> f64 {
    f64::from(size_px) * LINE
}

struct Composer<'m> {
    measure: &'m mut dyn TextMeasure,
    out: Vec<Placed>,
}

impl Composer<'_> {
    fn push(&mut self, role: ElementRole, element: Element) {
        self.out.push(Placed { role, element });
    }

    fn run(
        &mut self,
        text: &str,
        origin: Point,
        size_px: f32,
        weight: TextWeight,
        color: Rgba8,
        max_width: f64,
    ) -> TextRun {
        let (text, width) = fit_text(self.measure, text, size_px, weight, max_width);
        TextRun {
            text,
            origin,
            size_px,
            weight,
            color,
            width,
            line_height: line_height(size_px),
        }
    }

    fn pill_width(&mut self, text: &str, style: &PillStyle) -> f64 {
        self.measure.measure(text, style.size_px, TextWeight::Bold) + 2.0 * style.pad_x
    }

    /// Emit a pill at `(x, y)`; returns its width.
    fn pill(
        &mut self,
        role: ElementRole,
        text: &str,
        x: f64,
        y: f64,
        style: &PillStyle,
        max_width: f64,
    ) -> f64 {
        let run = self.run(
            text,
            Point::new(x + style.pad_x, y + style.pad_y),
            style.size_px,
            TextWeight::Bold,
            style.fg,
            (max_width - 2.0 * style.pad_x).max(0.0),
        );
        let w = run.width + 2.0 * style.pad_x;
        self.push(
            role,
            Element::Rect {
                rect: Rect::new(x, y, x + w, y + style.height()),
                radius: style.radius,
                fill: style.bg,
                border: None,
            },
        );
        self.push(role, Element::Text(run));
        w
    }
}

/// Compose `model` into `canvas`.
///
/// The result is a pure function of the inputs: the same model, canvas and measurer always
/// produce the same elements in the same order.
#[tracing::instrument(level = "debug", skip(model, measure), fields(company = model.company()))]
pub fn layout_card(
    model: &CardModel,
    canvas: Canvas,
    measure: &mut dyn TextMeasure,
) -> CardLayout {
    let mut c = Composer {
        measure,
        out: Vec::new(),
    };

    let col_x = PAD + LOGO_BOX + LOGO_GAP;
    let col_w = f64::from(DESIGN.width) - PAD - col_x;

    // Column is composed at y = 0 and shifted once the header height is known.
    let col_h = compose_column(&mut c, model, col_x, col_w);
    let column = std::mem::take(&mut c.out);

    let header_h = col_h.max(LOGO_BOX);
    let top = PAD;

    c.push(
        ElementRole::Background,
        Element::Rect {
            rect: DESIGN.rect(),
            radius: 0.0,
            fill: palette::PAGE,
            border: None,
        },
    );
    compose_logo(&mut c, PAD, top + (header_h - LOGO_BOX) / 2.0);

    let dy = top + (header_h - col_h) / 2.0;
    c.out
        .extend(column.into_iter().map(|p| translate(p, 0.0, dy)));

    let divider_y = top + header_h + DIVIDER_MARGIN;
    c.push(
        ElementRole::Divider,
        Element::Rect {
            rect: Rect::new(PAD, divider_y, f64::from(DESIGN.width) - PAD, divider_y + 2.0),
            radius: 0.0,
            fill: palette::HAIRLINE,
            border: None,
        },
    );
    compose_footer(&mut c, model, divider_y + 2.0 + FOOTER_PAD);

    let scale = (f64::from(canvas.width) / f64::from(DESIGN.width))
        .min(f64::from(canvas.height) / f64::from(DESIGN.height));
    let mut elements: Vec<Placed> = c.out.into_iter().map(|p| scaled(p, scale)).collect();
    if let Some(bg) = elements
        .iter_mut()
        .find(|p| p.role == ElementRole::Background)
    {
        bg.element = Element::Rect {
            rect: canvas.rect(),
            radius: 0.0,
            fill: palette::PAGE,
            border: None,
        };
    }

    CardLayout {
        canvas,
        background: palette::PAGE,
        scale,
        elements,
    }
}

fn compose_logo(c: &mut Composer<'_>, x: f64, y: f64) {
    c.push(
        ElementRole::LogoBox,
        Element::Rect {
            rect: Rect::new(x, y, x + LOGO_BOX, y + LOGO_BOX),
            radius: LOGO_RADIUS,
            fill: palette::WHITE,
            border: Some(Border {
                width: 2.0,
                color: palette::HAIRLINE,
            }),
        },
    );

    let inset = (LOGO_BOX - LOGO_IMAGE) / 2.0;
    let slot = Rect::new(
        x + inset,
        y + inset,
        x + inset + LOGO_IMAGE,
        y + inset + LOGO_IMAGE,
    );
    let mut placeholder = c.run(
        LOGO_PLACEHOLDER,
        Point::ZERO,
        PLACEHOLDER_PX,
        TextWeight::Regular,
        palette::PLACEHOLDER,
        LOGO_IMAGE,
    );
    let center = slot.center();
    placeholder.origin = Point::new(
        center.x - placeholder.width / 2.0,
        center.y - placeholder.line_height / 2.0,
    );
    c.push(ElementRole::LogoSlot, Element::Image { slot, placeholder });
}

/// Company, description, badges and tags. Returns the column height.
fn compose_column(c: &mut Composer<'_>, model: &CardModel, x: f64, width: f64) -> f64 {
    let mut y = 0.0;

    let company = c.run(
        model.company(),
        Point::new(x, y),
        COMPANY_PX,
        TextWeight::Bold,
        palette::INK_STRONG,
        width,
    );
    y += company.line_height;
    c.push(ElementRole::Company, Element::Text(company));

    if let Some(description) = model.description() {
        let description = defaults::truncate_chars(description, MAX_DESCRIPTION_CHARS);
        y += ROW_GAP / 2.0;
        let run = c.run(
            description,
            Point::new(x, y),
            DESCRIPTION_PX,
            TextWeight::Regular,
            palette::INK_SOFT,
            width,
        );
        y += run.line_height;
        c.push(ElementRole::Description, Element::Text(run));
    }

    y += ROW_GAP;
    compose_badges(c, model, x, y, width);
    y += BADGE.height();

    if !model.tags().is_empty() {
        y += ROW_GAP;
        y += compose_tags(c, model, x, y, width);
    }
    y
}

fn compose_badges(c: &mut Composer<'_>, model: &CardModel, x0: f64, y: f64, width: f64) {
    let org = PillStyle {
        bg: palette::ORG_BG,
        fg: palette::ORG_FG,
        ..BADGE
    };
    let mut x = x0;
    x += c.pill(ElementRole::OrgBadge, ORG_BADGE, x, y, &org, width) + BADGE_GAP;
    x += c.pill(
        ElementRole::BatchBadge,
        model.batch().as_str(),
        x,
        y,
        &BADGE,
        x0 + width - x,
    ) + BADGE_GAP;

    // Status pill: dot, gap, label.
    let label_w = c.measure.measure(model.status().label(), BADGE_PX, TextWeight::Bold);
    let w = BADGE.pad_x * 2.0 + STATUS_DOT + 8.0 + label_w;
    let h = BADGE.height();
    c.push(
        ElementRole::StatusBadge,
        Element::Rect {
            rect: Rect::new(x, y, x + w, y + h),
            radius: h / 2.0,
            fill: palette::STATUS_BG,
            border: None,
        },
    );
    c.push(
        ElementRole::StatusDot,
        Element::Circle {
            center: Point::new(x + BADGE.pad_x + STATUS_DOT / 2.0, y + h / 2.0),
            radius: STATUS_DOT / 2.0,
            fill: palette::STATUS_DOT,
        },
    );
    let label = TextRun {
        text: model.status().label().to_string(),
        origin: Point::new(x + BADGE.pad_x + STATUS_DOT + 8.0, y + BADGE.pad_y),
        size_px: BADGE_PX,
        weight: TextWeight::Bold,
        color: palette::STATUS_FG,
        width: label_w,
        line_height: line_height(BADGE_PX),
    };
    c.push(ElementRole::StatusBadge, Element::Text(label));
}

/// Lay tag pills out in insertion order over at most [`TAG_LINES`] lines.
///
/// Tags that do not fit collapse into a trailing "+N" pill. Returns the rows' height.
fn compose_tags(c: &mut Composer<'_>, model: &CardModel, x0: f64, y0: f64, width: f64) -> f64 {
    let tags: Vec<&str> = model.tags().iter().collect();
    let widths: Vec<f64> = tags
        .iter()
        .map(|t| c.pill_width(t, &TAG).min(width))
        .collect();

    // (line, x offset) per placed tag.
    let mut slots: Vec<(usize, f64)> = Vec::with_capacity(tags.len());
    let (mut line, mut x) = (0usize, 0.0f64);
    for &w in &widths {
        if x > 0.0 && x + w > width {
            if line + 1 == TAG_LINES {
                break;
            }
            line += 1;
            x = 0.0;
        }
        slots.push((line, x));
        x += w + TAG_GAP;
    }

    let mut overflow = None;
    if slots.len() < tags.len() {
        loop {
            let hidden = tags.len() - slots.len();
            let label = format!("+{hidden}");
            let ow = c.pill_width(&label, &TAG);
            let (last_line, end) = slots
                .last()
                .map(|&(l, sx)| (l, sx + widths[slots.len() - 1] + TAG_GAP))
                .unwrap_or((0, 0.0));
            if end + ow <= width || slots.is_empty() {
                overflow = Some((label, last_line, end));
                break;
            }
            slots.pop();
        }
    }

    let pill_h = TAG.height();
    let line_y = |l: usize| y0 + (l as f64) * (pill_h + TAG_GAP);
    for (i, &(l, sx)) in slots.iter().enumerate() {
        c.pill(ElementRole::Tag(i), tags[i], x0 + sx, line_y(l), &TAG, width);
    }
    let used_lines = match &overflow {
        Some((label, l, sx)) => {
            c.pill(ElementRole::TagOverflow, label, x0 + sx, line_y(*l), &TAG, width);
            l + 1
        }
        None => slots.last().map(|&(l, _)| l + 1).unwrap_or(0),
    };
    (used_lines as f64) * pill_h + (used_lines.saturating_sub(1) as f64) * TAG_GAP
}

fn compose_footer(c: &mut Composer<'_>, model: &CardModel, y: f64) {
    let right = f64::from(DESIGN.width) - PAD;
    let label_h = line_height(LABEL_PX);
    let mut x = PAD;

    let jobs = model.jobs().to_string();
    let stats = [
        (
            ElementRole::JobsLabel,
            "Jobs",
            ElementRole::JobsValue,
            jobs.as_str(),
            JOBS_PX,
            TextWeight::Bold,
            palette::INK,
        ),
        (
            ElementRole::UrlLabel,
            "URL",
            ElementRole::UrlValue,
            model.url(),
            URL_PX,
            TextWeight::Regular,
            palette::LINK,
        ),
    ];

    for (label_role, label, value_role, value, size_px, weight, color) in stats {
        let mut caption = c.run(
            label,
            Point::ZERO,
            LABEL_PX,
            TextWeight::Regular,
            palette::CAPTION,
            right - x,
        );
        let mut run = c.run(value, Point::ZERO, size_px, weight, color, right - x);
        let col_w = caption.width.max(run.width);
        caption.origin = Point::new(x + (col_w - caption.width) / 2.0, y);
        run.origin = Point::new(x + (col_w - run.width) / 2.0, y + label_h);

        if value_role == ElementRole::UrlValue {
            let thickness = (f64::from(size_px) / 12.0).max(1.0);
            let baseline = run.origin.y + run.line_height / 2.0 + 0.35 * f64::from(size_px);
            let uy = baseline + 0.12 * f64::from(size_px);
            c.push(
                ElementRole::UrlUnderline,
                Element::Rect {
                    rect: Rect::new(run.origin.x, uy, run.origin.x + run.width, uy + thickness),
                    radius: 0.0,
                    fill: color,
                    border: None,
                },
            );
        }
        c.push(label_role, Element::Text(caption));
        c.push(value_role, Element::Text(run));
        x += col_w + STAT_GAP;
    }
}

fn map_point(p: Point, f: impl Fn(f64) -> f64, g: impl Fn(f64) -> f64) -> Point {
    Point::new(f(p.x), g(p.y))
}

fn translate(p: Placed, dx: f64, dy: f64) -> Placed {
    transform(p, |x| x + dx, |y| y + dy, 1.0)
}

fn scaled(p: Placed, s: f64) -> Placed {
    transform(p, |x| x * s, |y| y * s, s)
}

fn transform(p: Placed, fx: impl Fn(f64) -> f64 + Copy, fy: impl Fn(f64) -> f64 + Copy, s: f64) -> Placed {
    let rect = |r: Rect| Rect::new(fx(r.x0), fy(r.y0), fx(r.x1), fy(r.y1));
    let run = |t: TextRun| TextRun {
        origin: map_point(t.origin, fx, fy),
        size_px: (f64::from(t.size_px) * s) as f32,
        width: t.width * s,
        line_height: t.line_height * s,
        ..t
    };
    let element = match p.element {
        Element::Rect {
            rect: r,
            radius,
            fill,
            border,
        } => Element::Rect {
            rect: rect(r),
            radius: radius * s,
            fill,
            border: border.map(|b| Border {
                width: b.width * s,
                color: b.color,
            }),
        },
        Element::Circle {
            center,
            radius,
            fill,
        } => Element::Circle {
            center: map_point(center, fx, fy),
            radius: radius * s,
            fill,
        },
        Element::Text(t) => Element::Text(run(t)),
        Element::Image { slot, placeholder } => Element::Image {
            slot: rect(slot),
            placeholder: run(placeholder),
        },
    };
    Placed {
        role: p.role,
        element,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/rules.rs"]
mod tests;
