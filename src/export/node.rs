use std::sync::Arc;

use crate::{
    assets::{
        decode::PreparedImage,
        fonts::{FontSet, TextShaper},
        logo::LogoFetcher,
    },
    card::model::CardModel,
    foundation::core::Canvas,
    layout::{element::CardLayout, rules::layout_card},
};

/// Load state of the logo inside a live node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoState {
    /// The model has no logo; the placeholder is final.
    Absent,
    /// A logo is referenced but not decoded yet.
    Pending,
    /// Decoded and ready to paint.
    Loaded(PreparedImage),
    /// Loading failed; the placeholder is painted instead.
    Failed,
}

/// The live, composed card that the exporter captures.
#[derive(Clone, Debug)]
pub struct CardNode {
    model: CardModel,
    layout: CardLayout,
    logo: LogoState,
}

impl CardNode {
    /// Compose `model` into a layout box of `size`, measuring text with `fonts`.
    ///
    /// A referenced logo starts out [`LogoState::Pending`].
    pub fn compose(model: CardModel, size: Canvas, fonts: &Arc<FontSet>) -> Self {
        let mut shaper = TextShaper::new(Arc::clone(fonts));
        let layout = layout_card(&model, size, &mut shaper);
        let logo = match model.logo() {
            Some(_) => LogoState::Pending,
            None => LogoState::Absent,
        };
        Self {
            model,
            layout,
            logo,
        }
    }

    /// Resolve the referenced logo. Failures leave the node in [`LogoState::Failed`].
    pub async fn load_logo(&mut self, fetcher: &LogoFetcher) {
        if self.model.logo().is_none() {
            self.logo = LogoState::Absent;
            return;
        }
        self.logo = LogoState::Pending;
        self.logo = match fetcher.resolve(self.model.logo()).await {
            Some(img) => LogoState::Loaded(img),
            None => LogoState::Failed,
        };
    }

    /// Replace the logo state directly.
    pub fn set_logo_state(&mut self, state: LogoState) {
        self.logo = state;
    }

    /// Everything is drawn except possibly a logo that is still loading.
    pub fn is_fully_painted(&self) -> bool {
        !matches!(self.logo, LogoState::Pending)
    }

    /// The model the node shows.
    pub fn model(&self) -> &CardModel {
        &self.model
    }

    /// The composed layout.
    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    /// Current logo state.
    pub fn logo_state(&self) -> &LogoState {
        &self.logo
    }

    /// Decoded logo, when loaded.
    pub fn logo_image(&self) -> Option<&PreparedImage> {
        match &self.logo {
            LogoState::Loaded(img) => Some(img),
            _ => None,
        }
    }
}
