use anyhow::Result;
use tracing::{error, info, warn};

use crate::models::Product;
use crate::scraper::{ListingParser, Subcategory, category_path, extract_products, page_url};
use crate::traits::{BrowserSession, Category, ScraperConfig};

pub struct ProductFinder<S> {
    session: S,
    parser: ListingParser,
    config: ScraperConfig,
    max_products: usize,
}

impl<S: BrowserSession> ProductFinder<S> {
    pub fn new(session: S, config: ScraperConfig, parser: ListingParser, max_products: usize) -> Self {
        Self {
            session,
            parser,
            config,
            max_products,
        }
    }

    /// Scrape every configured category
    pub async fn run(&self) -> Vec<Product> {
        self.run_categories(&self.config.categories).await
    }

    /// Scrape `categories` in order and concatenate their products
    pub async fn run_categories(&self, categories: &[Category]) -> Vec<Product> {
        info!(
            "Starting scraping process on {} ({})",
            self.config.name, self.config.base_url
        );

        let mut products = Vec::new();
        for category in categories {
            products.extend(self.scrape_category(category).await);
        }

        info!("Scraping complete! Total products extracted: {}", products.len());
        products
    }

    async fn scrape_category(&self, category: &Category) -> Vec<Product> {
        info!("Scraping category: {} ({})", category.name, category.url);

        if let Err(e) = self.load(&category.url).await {
            error!("Error loading category {}: {:#}", category.name, e);
            return Vec::new();
        }

        let subcategories = match self.discover_subcategories().await {
            Ok(subcategories) => subcategories,
            Err(e) => {
                warn!("Error finding subcategories: {:#}", e);
                Vec::new()
            }
        };
        info!("Found {} subcategories", subcategories.len());

        if subcategories.is_empty() {
            return self.extract(&category.name).await;
        }

        let mut products = Vec::new();
        for subcategory in subcategories {
            info!("Processing subcategory: {}", subcategory.name);
            if let Err(e) = self.load(&subcategory.url).await {
                error!("Error loading subcategory {}: {:#}", subcategory.name, e);
                continue;
            }
            let path = category_path(&category.name, Some(&subcategory.name));
            products.extend(self.extract(&path).await);
        }
        products
    }

    async fn discover_subcategories(&self) -> Result<Vec<Subcategory>> {
        let html = self.session.content().await?;
        let base = page_url(&self.session).await;
        Ok(self.parser.parse_subcategories(&html, base.as_ref()))
    }

    async fn extract(&self, path: &str) -> Vec<Product> {
        extract_products(
            &self.session,
            &self.parser,
            &self.config.timings,
            path,
            self.max_products,
        )
        .await
    }

    async fn load(&self, url: &str) -> Result<()> {
        self.session.goto(url).await?;
        tokio::time::sleep(self.config.timings.settle).await;
        Ok(())
    }

    /// Shut the browser session down; failures are logged, never returned
    pub async fn close(&mut self) {
        match self.session.close().await {
            Ok(()) => info!("Browser session closed"),
            Err(e) => error!("Error closing browser session: {:#}", e),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &S {
        &self.session
    }
}
