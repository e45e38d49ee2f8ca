use anyhow::Result;
use tracing::{error, info};

mod browser;
mod models;
mod output;
mod product_finder;
mod scraper;
mod scrapers;
mod settings;
#[cfg(test)]
mod testing;
mod traits;

use crate::browser::ChromiumSession;
use crate::product_finder::ProductFinder;
use crate::scraper::ListingParser;
use crate::settings::RunSettings;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Initializing scraper...");

    let settings = RunSettings::from_env();
    let config = scrapers::ajax_shop::config();
    let parser = ListingParser::new(&config.selectors)?;

    let session = ChromiumSession::launch(settings.browser_options()).await?;
    let mut finder = ProductFinder::new(session, config, parser, settings.max_products);

    let products = finder.run().await;
    let saved = output::save_results(&products, &settings.output_path);

    // Close on every path, including a failed save
    finder.close().await;

    if let Err(e) = &saved {
        error!("Failed to save results: {:#}", e);
    }
    saved
}
