//! Reading raw item records from JSON files or stdin.
//!
//! Accepts either a bare JSON array of records or an envelope object with an
//! `items` array (the shape the data generator writes). Records are normalized
//! before they are returned.

use crate::domain::Item;
use crate::normalize::{normalize_items, RawItem};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Path value meaning "read from stdin"
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemDocument {
    Bare(Vec<RawItem>),
    Envelope { items: Vec<RawItem> },
}

impl ItemDocument {
    fn into_records(self) -> Vec<RawItem> {
        match self {
            ItemDocument::Bare(items) | ItemDocument::Envelope { items } => items,
        }
    }
}

/// Parse and normalize item records from a JSON string.
pub fn parse_items(contents: &str) -> Result<Vec<Item>> {
    let document: ItemDocument =
        serde_json::from_str(contents).context("Failed to deserialize item records")?;
    let items = normalize_items(document.into_records()).context("Failed to normalize items")?;
    Ok(items)
}

/// Load and normalize item records from `path`, or stdin when `path` is `-`.
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let contents = if path.as_os_str() == STDIN_PATH {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read items from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?
    };

    let items = parse_items(&contents)
        .with_context(|| format!("Invalid items data in {}", path.display()))?;
    tracing::info!(count = items.len(), source = %path.display(), "loaded items");
    Ok(items)
}
