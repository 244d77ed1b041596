use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::server::get_app_version;

pub struct MetaController;

impl MetaController {
    pub fn app() -> Router {
        Router::new().route("/", get(Self::service_metadata))
    }

    async fn service_metadata() -> Json<Value> {
        Json(json!({
            "message": "M3U8 Scraper API",
            "version": get_app_version(),
            "endpoints": {
                "/scrape": "Scrape m3u8 links from a URL",
                "/scrape/{slug}": "Scrape m3u8 links using a video slug",
            },
        }))
    }
}
