use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::models::Product;

/// Write `products` as a pretty-printed JSON array (4-space indent),
/// replacing any existing file at `path`.
pub fn save_results(products: &[Product], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    products.serialize(&mut serializer)?;
    writer.flush()?;

    info!("Saved {} products to {}", products.len(), path.display());
    Ok(())
}
