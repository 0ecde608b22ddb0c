use crate::{
    foundation::core::{Canvas, Point, Rect, Rgba8},
    layout::metrics::TextWeight,
};

/// What a placed element represents on the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    /// Full-canvas background fill.
    Background,
    /// Bordered square holding the logo.
    LogoBox,
    /// Logo image slot (image or placeholder glyph).
    LogoSlot,
    /// Company name.
    Company,
    /// Optional description line.
    Description,
    /// Fixed organisation badge.
    OrgBadge,
    /// Batch label badge.
    BatchBadge,
    /// Status pill.
    StatusBadge,
    /// Colored dot inside the status pill.
    StatusDot,
    /// Tag pill, by insertion index.
    Tag(usize),
    /// Trailing "+N" pill for tags that did not fit.
    TagOverflow,
    /// Horizontal rule between header and footer.
    Divider,
    /// "Jobs" caption.
    JobsLabel,
    /// Jobs count.
    JobsValue,
    /// "URL" caption.
    UrlLabel,
    /// Visible URL text.
    UrlValue,
    /// Underline beneath the URL text.
    UrlUnderline,
}

/// Solid stroke drawn inside a rectangle's edge.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Border {
    /// Stroke width in pixels.
    pub width: f64,
    /// Stroke color.
    pub color: Rgba8,
}

/// One line of text positioned by its line box.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextRun {
    /// Text content, already fitted to the available width.
    pub text: String,
    /// Top-left corner of the line box.
    pub origin: Point,
    /// Font size in pixels.
    pub size_px: f32,
    /// Weight class.
    pub weight: TextWeight,
    /// Fill color.
    pub color: Rgba8,
    /// Measured advance width.
    pub width: f64,
    /// Line box height; glyphs are centred vertically inside it.
    pub line_height: f64,
}

impl TextRun {
    /// Line box bounds.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.line_height,
        )
    }
}

/// Drawing primitive emitted by layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// Rounded rectangle with optional inner border.
    Rect {
        /// Outer bounds.
        rect: Rect,
        /// Corner radius, clamped by painters to half the short side.
        radius: f64,
        /// Interior fill.
        fill: Rgba8,
        /// Optional border.
        border: Option<Border>,
    },
    /// Filled circle.
    Circle {
        /// Center point.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill color.
        fill: Rgba8,
    },
    /// Single line of text.
    Text(TextRun),
    /// Image slot. Painters contain-fit the image, or draw `placeholder` when none is available.
    Image {
        /// Destination box.
        slot: Rect,
        /// Glyph drawn instead of a missing image, centred in `slot`.
        placeholder: TextRun,
    },
}

/// An element tagged with its role.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Placed {
    /// What the element represents.
    pub role: ElementRole,
    /// How to draw it.
    pub element: Element,
}

impl Placed {
    /// Bounding box of the element.
    pub fn bounds(&self) -> Rect {
        match &self.element {
            Element::Rect { rect, .. } => *rect,
            Element::Circle { center, radius, .. } => Rect::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            ),
            Element::Text(t) => t.bounds(),
            Element::Image { slot, .. } => *slot,
        }
    }
}

/// Complete, paint-ready arrangement of one card.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CardLayout {
    /// Output surface size.
    pub canvas: Canvas,
    /// Canonical background color; capture backends fill it explicitly.
    pub background: Rgba8,
    /// Design-space to canvas scale factor.
    pub scale: f64,
    /// Elements in paint order.
    pub elements: Vec<Placed>,
}

impl CardLayout {
    /// Elements with the given role, in paint order.
    pub fn with_role(&self, role: ElementRole) -> impl Iterator<Item = &Placed> {
        self.elements.iter().filter(move |p| p.role == role)
    }

    /// Text content of the first text run carrying `role`.
    pub fn text(&self, role: ElementRole) -> Option<&str> {
        self.with_role(role).find_map(|p| match &p.element {
            Element::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    /// Union of the bounds of every element carrying `role`.
    pub fn bounds(&self, role: ElementRole) -> Option<Rect> {
        self.with_role(role)
            .map(Placed::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Tag labels in paint order (the overflow pill excluded).
    pub fn tag_texts(&self) -> Vec<&str> {
        self.elements
            .iter()
            .filter_map(|p| match (&p.role, &p.element) {
                (ElementRole::Tag(_), Element::Text(t)) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `true` when any tag pill (including overflow) was emitted.
    pub fn has_tag_row(&self) -> bool {
        self.elements
            .iter()
            .any(|p| matches!(p.role, ElementRole::Tag(_) | ElementRole::TagOverflow))
    }
}
