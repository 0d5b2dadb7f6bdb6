//! Free-text `DD/MM/YYYY description amount` lines

use super::Patterns;
use crate::models::RawExtraction;
use crate::normalize::{parse_amount, parse_date};

fn extract_line(line: &str, patterns: &Patterns) -> Option<RawExtraction> {
    let caps = patterns.positional.captures(line)?;
    let date = caps.name("date")?.as_str();
    let amount = caps.name("amount")?.as_str();

    parse_date(date)?;
    parse_amount(amount)?;

    Some(RawExtraction {
        date: date.to_string(),
        description: caps
            .name("desc")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        amount: Some(amount.to_string()),
        source_line: line.to_string(),
        ..Default::default()
    })
}

pub(super) fn extract(text: &str, patterns: &Patterns) -> Vec<RawExtraction> {
    text.lines()
        .filter_map(|line| extract_line(line, patterns))
        .collect()
}

/// True when some line reads as a dated positional record
pub(crate) fn has_positional_rows(text: &str, patterns: &Patterns) -> bool {
    text.lines().any(|line| extract_line(line, patterns).is_some())
}
