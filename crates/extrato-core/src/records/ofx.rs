//! `<STMTTRN>` block scraping for OFX statements
//!
//! SGML-style OFX leaves most tags unclosed, so each field is read as the
//! text following its opening tag up to the next `<` or line break.

use super::Patterns;
use crate::models::RawExtraction;

/// Description used when a block has neither MEMO nor NAME
pub const OFX_FALLBACK_DESCRIPTION: &str = "Transação OFX";

fn capture<'t>(re: &regex::Regex, block: &'t str) -> Option<&'t str> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

fn extract_block(block: &str, patterns: &Patterns) -> Option<RawExtraction> {
    let posted = capture(&patterns.ofx_posted, block)?;
    let amount = capture(&patterns.ofx_amount, block)?;

    // YYYYMMDD[hhmmss...]
    let date = format!("{}-{}-{}", &posted[0..4], &posted[4..6], &posted[6..8]);

    let description = capture(&patterns.ofx_memo, block)
        .or_else(|| capture(&patterns.ofx_name, block))
        .unwrap_or(OFX_FALLBACK_DESCRIPTION);

    Some(RawExtraction {
        date,
        description: description.to_string(),
        amount: Some(amount.to_string()),
        source_line: block.trim().to_string(),
        ..Default::default()
    })
}

pub(super) fn extract(text: &str, patterns: &Patterns) -> Vec<RawExtraction> {
    patterns
        .ofx_block
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|block| extract_block(block.as_str(), patterns))
        .collect()
}
