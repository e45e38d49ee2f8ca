//! Run settings read from the environment
//!
//! | Variable                       | Default             |
//! |--------------------------------|---------------------|
//! | `PRODUCT_SCRAPER_OUTPUT`       | `product_data.json` |
//! | `PRODUCT_SCRAPER_MAX_PRODUCTS` | `50`                |
//! | `PRODUCT_SCRAPER_HEADLESS`     | `true`              |
//!
//! Unparseable values are logged and replaced by the default.

use std::path::PathBuf;

use tracing::warn;

use crate::browser::BrowserOptions;

pub const DEFAULT_OUTPUT: &str = "product_data.json";
pub const DEFAULT_MAX_PRODUCTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub output_path: PathBuf,
    /// Per-category quota
    pub max_products: usize,
    pub headless: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            max_products: DEFAULT_MAX_PRODUCTS,
            headless: true,
        }
    }
}

impl RunSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(path) = lookup("PRODUCT_SCRAPER_OUTPUT").filter(|p| !p.trim().is_empty()) {
            settings.output_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup("PRODUCT_SCRAPER_MAX_PRODUCTS") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => settings.max_products = n,
                _ => warn!(
                    "Ignoring invalid PRODUCT_SCRAPER_MAX_PRODUCTS={:?}, using {}",
                    raw, DEFAULT_MAX_PRODUCTS
                ),
            }
        }

        if let Some(raw) = lookup("PRODUCT_SCRAPER_HEADLESS") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => settings.headless = true,
                "0" | "false" | "no" => settings.headless = false,
                _ => warn!("Ignoring invalid PRODUCT_SCRAPER_HEADLESS={:?}", raw),
            }
        }

        settings
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: self.headless,
        }
    }
}
