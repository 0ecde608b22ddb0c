use std::sync::Arc;

use actix_web::{
    HttpRequest, HttpResponse, Scope,
    http::header,
    web::{self, get, scope},
};

use crate::{
    assets::{fonts::FontSet, logo::LogoFetcher},
    card::query::parse_query,
    foundation::error::CardResult,
    render::CardRenderer,
    server::config::ServerConfig,
};

/// Base path of the image endpoint.
const API_PATH: &str = "/api";

/// `Cache-Control` for a card drawn with everything it asked for.
pub const CACHE_COMPLETE: &str = "public, max-age=86400, immutable";
/// `Cache-Control` for a card whose logo could not be resolved and shows the placeholder.
pub const CACHE_DEGRADED: &str = "public, max-age=60";

/// Immutable state shared by every request.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Rasterizer with the startup font set.
    pub renderer: CardRenderer,
    /// Logo resolver.
    pub logos: LogoFetcher,
}

impl AppState {
    /// State backed by `fonts` and `logos`.
    pub fn new(fonts: Arc<FontSet>, logos: LogoFetcher) -> Self {
        Self {
            renderer: CardRenderer::new(fonts),
            logos,
        }
    }

    /// Load fonts and build the logo client described by `cfg`.
    pub fn from_config(cfg: &ServerConfig) -> CardResult<Self> {
        let fonts = Arc::new(FontSet::load(&cfg.font_config()));
        let logos = LogoFetcher::new(cfg.logo_timeout(), cfg.logo_max_bytes)?;
        Ok(Self::new(fonts, logos))
    }
}

/// Routes served under `/api`.
///
/// * `GET /api/og?company=&logo=&batch=&jobs=&url=&tags=&description=` answers a 1200×630 PNG.
///   Every parameter is optional; missing or malformed values take their defaults.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/og", get().to(og_image))
}

#[tracing::instrument(level = "info", skip_all, fields(query = req.query_string()))]
async fn og_image(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let model = parse_query(req.query_string());
    let logo = state.logos.resolve(model.logo()).await;
    let cache = if model.logo().is_some() && logo.is_none() {
        CACHE_DEGRADED
    } else {
        CACHE_COMPLETE
    };

    let renderer = state.renderer.clone();
    let rendered = web::block(move || renderer.render_png(&model, logo.as_ref())).await;

    match rendered {
        Ok(Ok(png)) => HttpResponse::Ok()
            .content_type("image/png")
            .insert_header((header::CACHE_CONTROL, cache))
            .body(png),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "card render failed");
            failure()
        }
        Err(e) => {
            tracing::error!(error = %e, "card render task aborted");
            failure()
        }
    }
}

fn failure() -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type("text/plain; charset=utf-8")
        .body("Failed to generate image")
}
