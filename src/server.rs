//! HTTP surface: `GET /api/og`.

pub mod config;
pub mod routes;

use actix_web::{App, HttpServer, web};
use anyhow::Context as _;

pub use config::ServerConfig;
pub use routes::{AppState, configure_routes};

/// Bind and serve until shutdown.
pub async fn run(cfg: ServerConfig) -> anyhow::Result<()> {
    let state = web::Data::new(AppState::from_config(&cfg)?);
    tracing::info!(host = %cfg.host, port = cfg.port, "serving card images on /api/og");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(configure_routes())
    })
    .bind((cfg.host.as_str(), cfg.port))
    .with_context(|| format!("bind {}:{}", cfg.host, cfg.port))?
    .run()
    .await
    .context("run http server")
}
