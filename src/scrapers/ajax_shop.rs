//! E-commerce AJAX test site definition

use crate::traits::{Category, ScraperConfig, SiteSelectors, Timings};

pub const BASE_URL: &str = "https://webscraper.io/test-sites/e-commerce/ajax";

/// Build the scraper configuration for the AJAX test shop
pub fn config() -> ScraperConfig {
    ScraperConfig {
        name: "WebScraper AJAX shop".to_string(),
        base_url: BASE_URL.to_string(),
        selectors: SiteSelectors {
            product_container: ".thumbnail".to_string(),
            title: ".title".to_string(),
            price: ".price".to_string(),
            ratings: ".ratings".to_string(),
            rating_star: ".glyphicon-star".to_string(),
            review_count: "p".to_string(),
            pagination_next: ".pagination .next".to_string(),
            subcategory_link: ".sidebar-sub-category a".to_string(),
        },
        categories: vec![
            Category::new("Computers", format!("{BASE_URL}/computers")),
            Category::new("Phones", format!("{BASE_URL}/phones")),
        ],
        timings: Timings::default(),
    }
}
