//! Font discovery and text shaping.
//!
//! Fonts are resolved once through `fontdb` and shared read-only. [`TextShaper`] shapes with
//! `parley` when a face exists and falls back to [`ApproxMetrics`] otherwise, so layout never
//! depends on whether the host has fonts installed.

use std::{borrow::Cow, path::PathBuf, sync::Arc};

use usvg::fontdb;

use crate::{
    foundation::core::Rgba8,
    layout::metrics::{ApproxMetrics, TextMeasure, TextWeight},
};

/// Where to look for fonts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontConfig {
    /// Extra directory scanned for font files.
    pub font_dir: Option<PathBuf>,
    /// Whether to scan the host's system font locations.
    pub system_fonts: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_dir: None,
            system_fonts: true,
        }
    }
}

/// One resolved font face.
#[derive(Clone, Debug)]
pub struct FontFace {
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    /// Family name as reported by the font.
    pub family: String,
    /// OpenType weight class.
    pub weight: u16,
}

/// Families tried in order before the generic sans-serif lookup.
pub const PREFERRED_FAMILIES: &[&str] = &[
    "Inter",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

/// Lowest weight class accepted as a bold face.
pub const MIN_BOLD_WEIGHT: u16 = 600;

/// Immutable font data shared by every render.
#[derive(Clone, Debug)]
pub struct FontSet {
    regular: Option<FontFace>,
    bold: Option<FontFace>,
    db: Arc<fontdb::Database>,
}

impl FontSet {
    /// A set with no faces; every measurement uses the approximate table.
    pub fn empty() -> Self {
        Self {
            regular: None,
            bold: None,
            db: Arc::new(fontdb::Database::new()),
        }
    }

    /// Discover fonts according to `cfg`.
    ///
    /// The first installed family of [`PREFERRED_FAMILIES`] wins, then the generic sans-serif
    /// family, then any face at all. Bold comes from the same family and only when a face of at
    /// least [`MIN_BOLD_WEIGHT`] exists. Missing fonts are not an error.
    #[tracing::instrument(level = "debug")]
    pub fn load(cfg: &FontConfig) -> Self {
        let mut db = fontdb::Database::new();
        if cfg.system_fonts {
            db.load_system_fonts();
        }
        if let Some(dir) = &cfg.font_dir {
            db.load_fonts_dir(dir);
        }

        let regular = pick_regular(&db);
        let bold = regular.as_ref().and_then(|r| pick_bold(&db, &r.family));
        match &regular {
            Some(f) => tracing::debug!(
                family = %f.family,
                bold = bold.is_some(),
                faces = db.len(),
                "fonts resolved"
            ),
            None => tracing::warn!("no usable font found; text falls back to approximate metrics"),
        }

        Self {
            regular,
            bold,
            db: Arc::new(db),
        }
    }

    /// Face for `weight`, if any.
    pub fn face(&self, weight: TextWeight) -> Option<&FontFace> {
        match weight {
            TextWeight::Regular => self.regular.as_ref(),
            TextWeight::Bold => self.bold.as_ref().or(self.regular.as_ref()),
        }
    }

    /// `true` when no face was resolved.
    pub fn is_empty(&self) -> bool {
        self.regular.is_none()
    }

    /// Database handed to `usvg` when rasterizing SVG text.
    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }

    /// CSS `font-family` value naming the resolved family first.
    pub fn css_family(&self) -> String {
        match &self.regular {
            Some(f) => format!("'{}', sans-serif", f.family.replace('\'', "")),
            None => "sans-serif".to_string(),
        }
    }
}

fn query(
    db: &fontdb::Database,
    family: fontdb::Family<'_>,
    weight: fontdb::Weight,
) -> Option<fontdb::ID> {
    db.query(&fontdb::Query {
        families: &[family],
        weight,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    })
}

fn pick_regular(db: &fontdb::Database) -> Option<FontFace> {
    let id = PREFERRED_FAMILIES
        .iter()
        .find_map(|name| query(db, fontdb::Family::Name(name), fontdb::Weight::NORMAL))
        .or_else(|| query(db, fontdb::Family::SansSerif, fontdb::Weight::NORMAL))
        .or_else(|| db.faces().next().map(|f| f.id))?;
    load_face(db, id)
}

fn pick_bold(db: &fontdb::Database, family: &str) -> Option<FontFace> {
    let id = query(db, fontdb::Family::Name(family), fontdb::Weight::BOLD)?;
    let face = load_face(db, id)?;
    (face.weight >= MIN_BOLD_WEIGHT && face.family == family).then_some(face)
}

fn load_face(db: &fontdb::Database, id: fontdb::ID) -> Option<FontFace> {
    let info = db.face(id)?;
    let family = info.families.first().map(|(name, _)| name.clone())?;
    let weight = info.weight.0;
    let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
    Some(FontFace {
        bytes: Arc::new(bytes),
        index,
        family,
        weight,
    })
}

/// `parley` layout with card colors as the brush.
pub type ShapedText = parley::Layout<Rgba8>;

/// Stateful text shaper bound to one [`FontSet`].
pub struct TextShaper {
    fonts: Arc<FontSet>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    families: [Option<String>; 2],
}

impl TextShaper {
    /// Register the set's faces with fresh `parley` contexts.
    pub fn new(fonts: Arc<FontSet>) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let mut register = |face: Option<&FontFace>| -> Option<String> {
            let face = face?;
            let families = font_ctx.collection.register_fonts(
                parley::fontique::Blob::from(face.bytes.as_ref().clone()),
                None,
            );
            let (id, _) = families.first()?;
            font_ctx.collection.family_name(*id).map(str::to_string)
        };
        let families = [
            register(fonts.face(TextWeight::Regular)),
            register(fonts.face(TextWeight::Bold)),
        ];
        Self {
            fonts,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            families,
        }
    }

    /// The shared font set.
    pub fn fonts(&self) -> &Arc<FontSet> {
        &self.fonts
    }

    /// Shape one unwrapped line. `None` when no face is available for `weight`.
    pub fn shape(
        &mut self,
        text: &str,
        size_px: f32,
        weight: TextWeight,
        color: Rgba8,
    ) -> Option<ShapedText> {
        let family = match weight {
            TextWeight::Regular => self.families[0].clone(),
            TextWeight::Bold => self.families[1].clone().or_else(|| self.families[0].clone()),
        }?;
        if !size_px.is_finite() || size_px <= 0.0 {
            return None;
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(weight.css())),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(color));

        let mut layout: ShapedText = builder.build(text);
        layout.break_all_lines(None);
        Some(layout)
    }
}

impl TextMeasure for TextShaper {
    fn measure(&mut self, text: &str, size_px: f32, weight: TextWeight) -> f64 {
        match self.shape(text, size_px, weight, Rgba8::default()) {
            Some(layout) => f64::from(layout.width()),
            None => ApproxMetrics.measure(text, size_px, weight),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
