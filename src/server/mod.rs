pub mod api;
pub mod dtos;
pub mod error;
pub mod services;

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;
use crate::server::services::AppServices;

static SERVER_START: LazyLock<Instant> = LazyLock::new(Instant::now);

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn get_uptime_seconds() -> u64 {
    SERVER_START.elapsed().as_secs()
}

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        LazyLock::force(&SERVER_START);

        let address = format!("{}:{}", config.host, config.port);
        let services = AppServices::new(config);
        let router = Self::router(services);

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;

        info!("listening on {address}");

        axum::serve(listener, router)
            .await
            .context("server stopped unexpectedly")?;

        Ok(())
    }

    /// Builds the full application router. Split out from [`Self::serve`] so
    /// tests can drive it in process.
    pub fn router(services: AppServices) -> Router {
        // unauthenticated read-only surface, everything is allowed through
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        // bound a request to the full retry budget plus processing headroom,
        // so a stuck upstream can't pin a worker forever
        let budget = services.config.fetch_timeout_secs + services.config.retry_timeout_secs + 30;

        Router::new()
            .merge(api::MetaController::app())
            .merge(api::HealthController::app())
            .merge(api::ScrapeController::app())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(budget)))
                    .layer(cors),
            )
            .layer(Extension(services))
    }
}
