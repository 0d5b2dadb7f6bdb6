//! Line/record extraction for statement text
//!
//! Each institution profile selects one [`ExtractionStyle`]:
//! - `delimited` - fixed field positions in `,`/`;` separated lines
//! - `positional` - `DD/MM/YYYY description amount` free-text lines,
//!   optionally preceded by a debit/credit/balance [`PdfLayout`] pass
//! - `ofx` - `<STMTTRN>` block scraping
//!
//! Extractors never fail: lines that do not fit are left out.

mod delimited;
mod layout;
mod ofx;
mod positional;

use regex::Regex;

use crate::error::Result;
use crate::models::{RawExtraction, RawStatementText, SourceFormat};

pub(crate) use delimited::has_delimited_rows;
pub(crate) use positional::has_positional_rows;

/// Field separator for delimited statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    /// `;` when the line has one outside quotes, `,` otherwise
    Auto,
}

impl Delimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Auto => "auto",
        }
    }

    fn byte_for(&self, line: &str) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Semicolon => b';',
            Self::Auto if has_unquoted_semicolon(line) => b';',
            Self::Auto => b',',
        }
    }
}

fn has_unquoted_semicolon(line: &str) -> bool {
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            ';' if !quoted => return true,
            _ => {}
        }
    }
    false
}

impl std::str::FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "," | "comma" => Ok(Self::Comma),
            ";" | "semicolon" => Ok(Self::Semicolon),
            "auto" => Ok(Self::Auto),
            _ => Err(format!("Unknown delimiter: {}", s)),
        }
    }
}

/// Where the money lives in a delimited line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed amount column
    Signed(usize),
    /// Separate debit and credit columns; either may be blank
    DebitCredit { debit: usize, credit: usize },
}

/// Column mapping for a delimited statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedLayout {
    pub delimiter: Delimiter,
    pub min_fields: usize,
    pub date: usize,
    pub description: usize,
    pub amount: AmountColumns,
    pub category: Option<usize>,
    pub balance: Option<usize>,
}

impl DelimitedLayout {
    /// `date, description, amount` in the first three columns
    pub fn three_columns(delimiter: Delimiter) -> Self {
        Self {
            delimiter,
            min_fields: 3,
            date: 0,
            description: 1,
            amount: AmountColumns::Signed(2),
            category: None,
            balance: None,
        }
    }

    /// Smallest field count that covers every mapped column
    pub fn required_fields(&self) -> usize {
        let mut columns = vec![self.date, self.description];
        match self.amount {
            AmountColumns::Signed(i) => columns.push(i),
            AmountColumns::DebitCredit { debit, credit } => {
                columns.push(debit);
                columns.push(credit);
            }
        }
        columns.extend(self.category);
        columns.extend(self.balance);
        columns.into_iter().max().unwrap_or(0) + 1
    }
}

/// Multi-value layout heuristics for text extracted from PDFs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfLayout {
    /// Lines print debit, credit and running balance side by side
    DebitCreditBalance,
}

/// How a profile pulls records out of statement text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStyle {
    Delimited(DelimitedLayout),
    Positional { pdf_layout: Option<PdfLayout> },
    Ofx,
}

impl ExtractionStyle {
    pub fn positional() -> Self {
        Self::Positional { pdf_layout: None }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delimited(_) => "delimited",
            Self::Positional { .. } => "positional",
            Self::Ofx => "ofx",
        }
    }
}

/// Compiled patterns shared by every extractor
#[derive(Debug)]
pub(crate) struct Patterns {
    pub positional: Regex,
    pub layout_date: Regex,
    pub money: Regex,
    pub ofx_block: Regex,
    pub ofx_posted: Regex,
    pub ofx_amount: Regex,
    pub ofx_memo: Regex,
    pub ofx_name: Regex,
}

impl Patterns {
    pub fn compile() -> Result<Self> {
        Ok(Self {
            // DD/MM/YYYY, description, trailing amount
            positional: Regex::new(concat!(
                r"(?P<date>\d{2}/\d{2}/\d{4})\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<amount>[-+]?(?:R\$\s?)?\(?\d(?:[\d.,]*\d)?\)?)\s*$"
            ))?,
            layout_date: Regex::new(r"\d{2}/\d{2}/\d{4}")?,
            // 1.500,00 | 150,00 | 150.00
            money: Regex::new(r"-?(?:(?:\d{1,3}(?:\.\d{3})+|\d+),\d{2}|\d+\.\d{2})\b")?,
            ofx_block: Regex::new(r"(?is)<STMTTRN>(.*?)</STMTTRN>")?,
            ofx_posted: Regex::new(r"(?i)<DTPOSTED>\s*(\d{8})")?,
            ofx_amount: Regex::new(r"(?i)<TRNAMT>\s*([+-]?\d+(?:[.,]\d+)?)")?,
            ofx_memo: Regex::new(r"(?i)<MEMO>\s*([^<\r\n]*)")?,
            ofx_name: Regex::new(r"(?i)<NAME>\s*([^<\r\n]*)")?,
        })
    }
}

/// Run a profile's extraction style over statement text.
///
/// OFX input is always tag-scraped. Spreadsheet input is always read as
/// `;`-delimited rows; positional profiles fall back to the three-column
/// layout there.
pub(crate) fn extract(
    style: &ExtractionStyle,
    raw: &RawStatementText,
    patterns: &Patterns,
    pdf_layouts: bool,
) -> Vec<RawExtraction> {
    match (raw.format, style) {
        (SourceFormat::Ofx, _) | (_, ExtractionStyle::Ofx) => ofx::extract(&raw.text, patterns),
        (SourceFormat::Spreadsheet, ExtractionStyle::Delimited(layout)) => {
            let layout = DelimitedLayout {
                delimiter: Delimiter::Semicolon,
                ..layout.clone()
            };
            delimited::extract(&raw.text, &layout)
        }
        (SourceFormat::Spreadsheet, ExtractionStyle::Positional { .. }) => delimited::extract(
            &raw.text,
            &DelimitedLayout::three_columns(Delimiter::Semicolon),
        ),
        (_, ExtractionStyle::Delimited(layout)) => delimited::extract(&raw.text, layout),
        (SourceFormat::Pdf, ExtractionStyle::Positional { pdf_layout: Some(kind) })
            if pdf_layouts =>
        {
            layout::extract(&raw.text, *kind, patterns)
        }
        (_, ExtractionStyle::Positional { .. }) => positional::extract(&raw.text, patterns),
    }
}
