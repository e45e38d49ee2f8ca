//! Data model for product records extracted from listing pages

use serde::{Deserialize, Serialize};

/// A single product tile extracted from a category listing.
///
/// Field order is the key order of the JSON output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Category path, e.g. `Computers > Laptops`
    pub category: String,
    pub name: String,
    /// Price exactly as displayed, currency symbol included
    pub price: String,
    /// Number of filled star indicators
    pub rating: u32,
    /// Review count parsed from the review text
    pub reviews: u64,
    /// Absolute URL of the product detail page
    pub url: String,
}
