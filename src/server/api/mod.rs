pub mod health_controller;
pub mod meta_controller;
pub mod scrape_controller;

pub use health_controller::HealthController;
pub use meta_controller::MetaController;
pub use scrape_controller::ScrapeController;
