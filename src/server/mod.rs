pub mod handlers;
mod types;

pub use types::*;

use crate::{Error, Result, config::Config, config::ServerConfig, diagnosis::DiagnosisService};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Builds the application from config. Fails before anything binds if the credential is missing.
pub fn build_app(config: &Config) -> Result<Router> {
    config.validate()?;

    let diagnosis = DiagnosisService::new(config.llm.clone())?;
    let app_state = handlers::AppState {
        diagnosis: Arc::new(diagnosis),
    };

    router(app_state, &config.server)
}

pub fn router(app_state: handlers::AppState, server: &ServerConfig) -> Result<Router> {
    let body_limit = match server.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    let app = Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/analyze/", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .layer(body_limit)
        .layer(cors_layer(&server.allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| Error::config(format!("Invalid CORS origin '{}': {}", origin, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

pub async fn run(config: Config) -> Result<()> {
    let app = build_app(&config)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
