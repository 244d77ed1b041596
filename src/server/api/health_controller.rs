use axum::{Extension, Json, Router, routing::get};
use chrono::Utc;

use crate::server::dtos::health_dto::{HealthResponse, HealthStatus};
use crate::server::services::app_services::AppServices;
use crate::server::{get_app_version, get_uptime_seconds};

pub struct HealthController;

impl HealthController {
    pub fn app() -> Router {
        Router::new().route("/health", get(Self::health_endpoint))
    }

    /// the service holds no connections and no state, so as long as we can
    /// answer at all we're healthy
    async fn health_endpoint(
        Extension(services): Extension<AppServices>,
    ) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: HealthStatus::Healthy,
            timestamp: Utc::now(),
            uptime_seconds: get_uptime_seconds(),
            version: get_app_version().to_string(),
            environment: format!("{:?}", services.config.cargo_env).to_lowercase(),
        })
    }
}
