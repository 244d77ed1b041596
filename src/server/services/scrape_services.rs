// the whole scrape pipeline lives behind this service: resolve the slug,
// fetch the page, then hand the text to the pure unpack/extract code
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, error, info, warn};

use crate::{
    config::AppConfig,
    scraper::{extract_links, extract_sources, find_packed_scripts, resolve_slug, unpack},
    server::dtos::scrape_dto::ScrapeResponse,
};

pub type DynScrapeService = Arc<dyn ScrapeServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait ScrapeServiceTrait {
    /// Runs the full pipeline against `url`. Never fails at the transport
    /// level; every outcome is folded into the response body.
    async fn scrape(&self, url: &str) -> ScrapeResponse;
}

// the profile swapped in when the first connection attempt is refused
const ALTERNATE_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:144.0) Gecko/20100101 Firefox/144.0";

// a refusing host gets a beat before the reconnect attempt
const RECONNECT_PAUSE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy)]
enum HeaderProfile {
    Browser,
    Alternate,
}

#[derive(Debug, thiserror::Error)]
enum ScrapeError {
    #[error("Could not extract slug from URL")]
    NoSlug,
    #[error("Request error: {0}")]
    Fetch(String),
    #[error("No eval-packed scripts found")]
    NoScripts,
    #[error("No m3u8 links found in any packed script")]
    NoLinks { slug: String, total: usize },
}

#[derive(Clone)]
pub struct ScrapeService {
    config: Arc<AppConfig>,
    http_client: reqwest::Client,
}

impl ScrapeService {
    pub fn new(config: Arc<AppConfig>) -> Self {
        // timeouts are per attempt, not on the client, because the retry
        // policy widens them
        let http_client = reqwest::Client::new();

        Self {
            config,
            http_client,
        }
    }

    async fn run(&self, url: &str) -> Result<ScrapeResponse, ScrapeError> {
        let slug = resolve_slug(url).ok_or(ScrapeError::NoSlug)?;
        info!("resolved slug: {slug}");

        info!("fetching page: {url}");
        let page = self.fetch_page(url).await?;

        let packed_scripts = find_packed_scripts(&page);
        info!("found {} packed scripts", packed_scripts.len());
        if packed_scripts.is_empty() {
            return Err(ScrapeError::NoScripts);
        }

        let total = packed_scripts.len();
        let mut links: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (index, packed) in packed_scripts.iter().enumerate() {
            info!("processing packed script {}/{}", index + 1, total);

            // a script that refuses to unpack is skipped, not fatal
            let Some(unpacked) = unpack(packed) else {
                warn!("failed to unpack script {}", index + 1);
                continue;
            };

            for source in extract_sources(&unpacked) {
                if let Some(label) = &source.label {
                    debug!("script {} offers {} at {}", index + 1, label, source.file);
                }
            }

            let script_links = extract_links(&unpacked);
            info!(
                "found {} m3u8 links in script {}",
                script_links.len(),
                index + 1
            );

            // second dedup layer, across scripts
            for link in script_links {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
        }

        if links.is_empty() {
            return Err(ScrapeError::NoLinks { slug, total });
        }

        Ok(ScrapeResponse::found(slug, total, links))
    }

    /// Fetches the page body. One attempt at the short timeout, then exactly
    /// one retry: at the long timeout after a timeout, or with the alternate
    /// header profile after a connection failure. Non-2xx after the final
    /// attempt is terminal; response content never triggers a retry.
    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let short = Duration::from_secs(self.config.fetch_timeout_secs);
        let long = Duration::from_secs(self.config.retry_timeout_secs);

        let response = match self.send_attempt(url, HeaderProfile::Browser, short).await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("fetch timed out after {short:?}, retrying once at {long:?}");
                self.send_attempt(url, HeaderProfile::Browser, long)
                    .await
                    .map_err(|e| ScrapeError::Fetch(e.to_string()))?
            }
            Err(e) if e.is_connect() => {
                warn!("connection failed ({e}), retrying once with the alternate header profile");
                tokio::time::sleep(RECONNECT_PAUSE).await;
                self.send_attempt(url, HeaderProfile::Alternate, short)
                    .await
                    .map_err(|e| ScrapeError::Fetch(e.to_string()))?
            }
            Err(e) => return Err(ScrapeError::Fetch(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Fetch(format!("HTTP status {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ScrapeError::Fetch(e.to_string()))
    }

    async fn send_attempt(
        &self,
        url: &str,
        profile: HeaderProfile,
        timeout: Duration,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let request = self.http_client.get(url).timeout(timeout);

        let request = match profile {
            HeaderProfile::Browser => request
                .header("User-Agent", &self.config.user_agent)
                .header("Accept", &self.config.accept)
                .header("Accept-Language", &self.config.accept_language)
                .header("Referer", &self.config.referer),
            HeaderProfile::Alternate => request
                .header("User-Agent", ALTERNATE_USER_AGENT)
                .header("Accept", "*/*")
                .header("Accept-Language", "en-US,en;q=0.9"),
        };

        request.send().await
    }
}

#[async_trait]
impl ScrapeServiceTrait for ScrapeService {
    async fn scrape(&self, url: &str) -> ScrapeResponse {
        match self.run(url).await {
            Ok(report) => report,
            Err(e) => {
                error!("scrape failed: {e}");
                let message = e.to_string();
                match e {
                    ScrapeError::NoLinks { slug, total } => {
                        ScrapeResponse::failed_with_diagnostics(message, slug, total)
                    }
                    _ => ScrapeResponse::failed(message),
                }
            }
        }
    }
}
