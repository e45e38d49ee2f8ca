//! Traits and configuration for browser-driven listing scraping

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// Configuration for a website scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Display name for the website
    pub name: String,
    /// Base URL the category URLs are derived from
    pub base_url: String,
    /// CSS selectors for extracting data
    pub selectors: SiteSelectors,
    /// Top-level categories to scrape, in declaration order
    pub categories: Vec<Category>,
    /// Waits and limits applied while driving the browser
    pub timings: Timings,
}

/// A top-level category declared for a site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub url: String,
}

impl Category {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// CSS selectors for different parts of a product listing
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Item marker: one element per product tile
    pub product_container: String,
    /// Title link within product container (text is the name, `href` the detail page)
    pub title: String,
    /// Price selector within product container
    pub price: String,
    /// Ratings block within product container (optional on the page)
    pub ratings: String,
    /// Filled star indicator within the ratings block
    pub rating_star: String,
    /// Review count text within the ratings block
    pub review_count: String,
    /// "Next page" pagination control
    pub pagination_next: String,
    /// Subcategory links in the sidebar
    pub subcategory_link: String,
}

/// Fixed waits used while driving the browser
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// Pause after navigating or clicking so asynchronous content can render
    pub settle: Duration,
    /// Upper bound on waiting for the first item marker of a page
    pub element_timeout: Duration,
    /// Hard ceiling on pages visited per extraction
    pub max_pages: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(3),
            element_timeout: Duration::from_secs(10),
            max_pages: 50,
        }
    }
}

/// A live browser page the scraper drives.
///
/// Implementations own the underlying browser for as long as they live and
/// release it in [`BrowserSession::close`].
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate the page to `url`
    async fn goto(&self, url: &str) -> Result<()>;

    /// URL of the currently loaded document, if any
    async fn current_url(&self) -> Result<Option<String>>;

    /// Wait until at least one element matches `selector`
    ///
    /// # Returns
    /// * `Result<bool>` - `false` when `timeout` elapsed without a match
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Serialized HTML of the current DOM
    async fn content(&self) -> Result<String>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<()>;

    /// Terminate the session and the browser behind it
    async fn close(&mut self) -> Result<()>;
}
