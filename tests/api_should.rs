// in-process tests of the http surface, the pipeline is replaced by a mock
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use m3u8_scraper::config::AppConfig;
use m3u8_scraper::server::ApplicationServer;
use m3u8_scraper::server::dtos::health_dto::{HealthResponse, HealthStatus};
use m3u8_scraper::server::dtos::scrape_dto::ScrapeResponse;
use m3u8_scraper::server::services::app_services::AppServices;
use m3u8_scraper::server::services::scrape_services::{DynScrapeService, MockScrapeServiceTrait};

fn server_with(mock: MockScrapeServiceTrait, config: AppConfig) -> TestServer {
    let services = AppServices {
        scraper: Arc::new(mock) as DynScrapeService,
        config: Arc::new(config),
    };
    TestServer::new(ApplicationServer::router(services)).expect("router should start")
}

#[tokio::test]
async fn root_lists_the_endpoints() {
    let server = server_with(MockScrapeServiceTrait::new(), AppConfig::default());

    let response = server.get("/").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["message"], "M3U8 Scraper API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["endpoints"].get("/scrape").is_some());
    assert!(body["endpoints"].get("/scrape/{slug}").is_some());
}

#[tokio::test]
async fn health_reports_healthy() {
    let server = server_with(MockScrapeServiceTrait::new(), AppConfig::default());

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);

    let health: HealthResponse = response.json();
    assert_eq!(health.status, HealthStatus::Healthy);
    assert_eq!(health.environment, "development");
}

#[tokio::test]
async fn scrape_passes_the_url_through_to_the_pipeline() {
    let mut mock = MockScrapeServiceTrait::new();
    mock.expect_scrape()
        .withf(|url| url == "https://host.example/watch/ep-9")
        .times(1)
        .returning(|_| {
            ScrapeResponse::found(
                "ep-9".to_string(),
                1,
                vec!["https://cdn.example.com/x.m3u8".to_string()],
            )
        });
    let server = server_with(mock, AppConfig::default());

    let response = server
        .get("/scrape")
        .add_query_param("url", "https://host.example/watch/ep-9")
        .await;
    response.assert_status(StatusCode::OK);

    let report: ScrapeResponse = response.json();
    assert!(report.success);
    assert_eq!(report.count, 1);
}

#[tokio::test]
async fn pipeline_failures_still_come_back_as_200_bodies() {
    let mut mock = MockScrapeServiceTrait::new();
    mock.expect_scrape()
        .returning(|_| ScrapeResponse::failed("No eval-packed scripts found"));
    let server = server_with(mock, AppConfig::default());

    let response = server
        .get("/scrape")
        .add_query_param("url", "https://host.example/watch/empty")
        .await;
    response.assert_status(StatusCode::OK);

    let report: ScrapeResponse = response.json();
    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("No eval-packed scripts found"));
}

#[tokio::test]
async fn missing_url_parameter_is_a_422() {
    let server = server_with(MockScrapeServiceTrait::new(), AppConfig::default());

    let response = server.get("/scrape").await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["detail"], "missing required query parameter: url");
}

#[tokio::test]
async fn non_http_url_is_a_422() {
    let server = server_with(MockScrapeServiceTrait::new(), AppConfig::default());

    let response = server
        .get("/scrape")
        .add_query_param("url", "ftp://host.example/thing")
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["detail"], "unsupported url scheme: ftp");
}

#[tokio::test]
async fn slug_requests_expand_through_the_template() {
    let mut mock = MockScrapeServiceTrait::new();
    mock.expect_scrape()
        .withf(|url| url == "https://zpjid.com/bkg/ep-7?ref=animedub.pro")
        .times(1)
        .returning(|_| {
            ScrapeResponse::found(
                "ep-7".to_string(),
                1,
                vec!["https://cdn.example.com/y.m3u8".to_string()],
            )
        });
    let server = server_with(mock, AppConfig::default());

    let response = server.get("/scrape/ep-7").await;
    response.assert_status(StatusCode::OK);

    let report: ScrapeResponse = response.json();
    assert!(report.success);
    assert_eq!(report.slug.as_deref(), Some("ep-7"));
}
