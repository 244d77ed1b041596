use std::sync::Arc;

use tracing::info;

use crate::{config::AppConfig, server::services::scrape_services::ScrapeService};

use super::scrape_services::DynScrapeService;

/// The cloneable bundle handed to every handler. Built once at startup and
/// read-only afterwards; the reqwest client inside the scrape service is the
/// only shared resource.
#[derive(Clone)]
pub struct AppServices {
    pub scraper: DynScrapeService,
    pub config: Arc<AppConfig>,
}

impl AppServices {
    pub fn new(config: Arc<AppConfig>) -> Self {
        info!("starting services...");

        let scraper = Arc::new(ScrapeService::new(config.clone())) as DynScrapeService;

        Self { scraper, config }
    }
}
