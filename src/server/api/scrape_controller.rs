use axum::{
    Extension, Json, Router,
    extract::{Path, Query},
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::server::{
    dtos::scrape_dto::ScrapeResponse,
    error::{AppResult, Error},
    services::app_services::AppServices,
};

#[derive(Deserialize)]
struct ScrapeQuery {
    // optional so a missing parameter becomes a 422 instead of axum's
    // default rejection
    url: Option<String>,
}

pub struct ScrapeController;

impl ScrapeController {
    pub fn app() -> Router {
        Router::new()
            .route("/scrape", get(Self::scrape_by_url))
            .route("/scrape/{slug}", get(Self::scrape_by_slug))
    }

    async fn scrape_by_url(
        Extension(services): Extension<AppServices>,
        Query(params): Query<ScrapeQuery>,
    ) -> AppResult<Json<ScrapeResponse>> {
        let target_url = params.url.ok_or_else(|| {
            Error::UnprocessableEntity("missing required query parameter: url".to_string())
        })?;

        Self::validate_target(&target_url)?;

        Ok(Json(services.scraper.scrape(&target_url).await))
    }

    async fn scrape_by_slug(
        Extension(services): Extension<AppServices>,
        Path(slug): Path<String>,
    ) -> AppResult<Json<ScrapeResponse>> {
        let target_url = services.config.slug_url_template.replace("{slug}", &slug);
        info!("expanded slug {slug} to {target_url}");

        Ok(Json(services.scraper.scrape(&target_url).await))
    }

    fn validate_target(target_url: &str) -> AppResult<()> {
        let parsed = Url::parse(target_url)
            .map_err(|e| Error::UnprocessableEntity(format!("invalid url parameter: {e}")))?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(Error::UnprocessableEntity(format!(
                "unsupported url scheme: {other}"
            ))),
        }
    }
}
