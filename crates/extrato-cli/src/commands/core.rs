//! Shared command utilities

use std::path::Path;

use anyhow::{Context, Result};
use extrato_core::{ParserConfig, StatementImporter};

/// Build the importer from `--config`, the data-dir override or defaults
pub fn build_importer(config_path: Option<&Path>) -> Result<StatementImporter> {
    let config = ParserConfig::load(config_path).context("Failed to load parser config")?;
    StatementImporter::from_config(config).context("Failed to build statement importer")
}

/// Truncate a string to a maximum number of chars, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount as Brazilian currency (`R$ 1.234,56`)
pub fn format_brl(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!(
        "{}R$ {},{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}
