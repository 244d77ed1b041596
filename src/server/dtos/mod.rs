pub mod health_dto;
pub mod scrape_dto;
