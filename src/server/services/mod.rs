pub mod app_services;
pub mod scrape_services;

pub use app_services::AppServices;
pub use scrape_services::DynScrapeService;
