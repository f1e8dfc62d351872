//! Shared utilities for CLI commands.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use dose_core::OrderInput;

/// Reads a JSON array of orders from `path`, or from stdin when `path` is `-`.
pub fn load_orders(path: &Path) -> Result<Vec<OrderInput>> {
    let contents = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read orders from stdin")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read orders from {}", path.display()))?
    };
    parse_orders(&contents)
}

/// Parses a JSON array of orders.
pub fn parse_orders(contents: &str) -> Result<Vec<OrderInput>> {
    serde_json::from_str(contents).context("invalid orders JSON, expected an array of orders")
}
