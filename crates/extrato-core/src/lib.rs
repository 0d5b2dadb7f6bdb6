//! Extrato Core Library
//!
//! Bank statement parsing for Brazilian institutions:
//! - Content extraction from CSV/TXT, OFX, spreadsheet and PDF uploads
//! - Institution detection through an ordered profile registry
//! - Per-institution line/record extraction (delimited, positional, OFX)
//! - Normalization into canonical transactions with income/expense totals
//! - TOML configuration with custom institutions

pub mod config;
pub mod error;
pub mod extract;
pub mod import;
pub mod models;
pub mod normalize;
pub mod profiles;
pub mod records;

pub use config::ParserConfig;
pub use error::{Error, Result};
pub use extract::{DocumentTextExtractor, PdfTextExtractor};
pub use import::{summarize, StatementImporter};
pub use models::{
    CanonicalTransaction, Direction, FailureKind, ParseOutcome, RawStatementText, SourceFormat,
    Summary,
};
pub use normalize::NormalizeOptions;
pub use profiles::{Detector, InstitutionProfile, ProfileRegistry};
pub use records::{AmountColumns, DelimitedLayout, Delimiter, ExtractionStyle, PdfLayout};
