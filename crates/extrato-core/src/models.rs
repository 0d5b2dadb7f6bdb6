//! Domain models for Extrato

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Container format a statement arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// `.csv` / `.txt`, read verbatim
    Delimited,
    /// `.xlsx` / `.xls`, first sheet flattened to `;`-joined lines
    Spreadsheet,
    /// `.ofx`, read verbatim
    Ofx,
    /// `.pdf`, text extracted and whitespace-normalized
    Pdf,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Spreadsheet => "spreadsheet",
            Self::Ofx => "ofx",
            Self::Pdf => "pdf",
        }
    }

    /// Resolve a lowercase extension (with leading dot) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".csv" | ".txt" => Some(Self::Delimited),
            ".xlsx" | ".xls" => Some(Self::Spreadsheet),
            ".ofx" => Some(Self::Ofx),
            ".pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text view of an uploaded statement, tagged with its container format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatementText {
    pub format: SourceFormat,
    pub text: String,
}

impl RawStatementText {
    pub fn new(format: SourceFormat, text: impl Into<String>) -> Self {
        Self {
            format,
            text: text.into(),
        }
    }
}

/// Untyped fields pulled from one statement line or OFX block.
///
/// Values stay as text until [`crate::normalize::normalize`] coerces them.
/// Either `amount` (signed) or the `debit`/`credit` pair carries the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawExtraction {
    pub date: String,
    pub description: String,
    pub amount: Option<String>,
    pub debit: Option<String>,
    pub credit: Option<String>,
    pub balance: Option<String>,
    pub category: Option<String>,
    pub source_line: String,
}

/// Money direction, derived from the sign of the original amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Non-negative amounts are income
    pub fn from_signed(amount: f64) -> Self {
        if amount < 0.0 {
            Self::Expense
        } else {
            Self::Income
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized, institution-agnostic movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    pub date: NaiveDate,
    pub description: String,
    /// Always >= 0; the sign lives in `direction`
    pub amount: f64,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_balance: Option<f64>,
    pub source_line: String,
}

impl CanonicalTransaction {
    /// Amount with the direction applied (expenses negative)
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            Direction::Income => self.amount,
            Direction::Expense => -self.amount,
        }
    }
}

/// Income/expense totals of a parsed statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

/// Why a whole document could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnsupportedFormat,
    UnidentifiedInstitution,
    ExtractionFailed,
}

/// Result of one parse call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutcome {
    pub success: bool,
    pub transactions: Vec<CanonicalTransaction>,
    /// Only whole-document failures; skipped lines never show up here
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_detected: Option<String>,
    pub total_transactions: usize,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl ParseOutcome {
    /// Successful outcome; totals and counts are derived from `transactions`
    pub fn succeeded(institution: &str, transactions: Vec<CanonicalTransaction>) -> Self {
        let summary = crate::import::summarize(&transactions);
        Self {
            success: true,
            total_transactions: transactions.len(),
            transactions,
            errors: Vec::new(),
            institution_detected: Some(institution.to_string()),
            summary,
            failure: None,
        }
    }

    /// Failed outcome carrying a single user-facing message
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            transactions: Vec::new(),
            errors: vec![message.into()],
            institution_detected: None,
            total_transactions: 0,
            summary: Summary::default(),
            failure: Some(kind),
        }
    }

    /// Success with nothing importable, distinct from a hard failure
    pub fn is_empty_success(&self) -> bool {
        self.success && self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(SourceFormat::from_extension(".csv"), Some(SourceFormat::Delimited));
        assert_eq!(SourceFormat::from_extension(".txt"), Some(SourceFormat::Delimited));
        assert_eq!(SourceFormat::from_extension(".xls"), Some(SourceFormat::Spreadsheet));
        assert_eq!(SourceFormat::from_extension(".ofx"), Some(SourceFormat::Ofx));
        assert_eq!(SourceFormat::from_extension(".pdf"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_extension(".docx"), None);
    }

    #[test]
    fn test_direction_from_signed() {
        assert_eq!(Direction::from_signed(0.0), Direction::Income);
        assert_eq!(Direction::from_signed(12.5), Direction::Income);
        assert_eq!(Direction::from_signed(-0.01), Direction::Expense);
    }

    #[test]
    fn test_failed_outcome_shape() {
        let outcome = ParseOutcome::failed(FailureKind::UnsupportedFormat, "boom");
        assert!(!outcome.success);
        assert!(outcome.transactions.is_empty());
        assert_eq!(outcome.errors, vec!["boom".to_string()]);
        assert_eq!(outcome.total_transactions, 0);
        assert_eq!(outcome.summary, Summary::default());
        assert_eq!(outcome.institution_detected, None);
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let tx = CanonicalTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description: "PIX".to_string(),
            amount: 10.0,
            direction: Direction::Expense,
            category: None,
            running_balance: None,
            source_line: "15/01/2024 PIX -10,00".to_string(),
        };
        let outcome = ParseOutcome::succeeded("Itaú", vec![tx]);
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["totalTransactions"], 1);
        assert_eq!(json["institutionDetected"], "Itaú");
        assert_eq!(json["transactions"][0]["date"], "2024-01-15");
        assert_eq!(json["transactions"][0]["direction"], "EXPENSE");
        assert_eq!(json["transactions"][0]["sourceLine"], "15/01/2024 PIX -10,00");
        assert!(json["transactions"][0].get("category").is_none());
        assert!(json.get("failure").is_none());
    }
}
