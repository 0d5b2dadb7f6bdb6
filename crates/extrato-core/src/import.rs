//! Statement import pipeline
//!
//! `extract_content` → `ProfileRegistry::detect` → profile extraction →
//! `normalize` → `summarize`, assembled into a [`ParseOutcome`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::extract::{extract_content, source_format, DocumentTextExtractor, PdfTextExtractor};
use crate::models::{CanonicalTransaction, Direction, ParseOutcome, RawStatementText, Summary};
use crate::normalize::{normalize, NormalizeOptions};
use crate::profiles::{InstitutionProfile, ProfileRegistry};

/// Income and expense totals; `balance = income - expenses`
pub fn summarize(transactions: &[CanonicalTransaction]) -> Summary {
    let (income, expenses) = transactions
        .iter()
        .fold((0.0, 0.0), |(income, expenses), tx| match tx.direction {
            Direction::Income => (income + tx.amount, expenses),
            Direction::Expense => (income, expenses + tx.amount),
        });

    Summary {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// Parses statements into [`ParseOutcome`]s.
///
/// Cheap to clone and safe to share across threads; the profile registry
/// and document extractor are reference-counted.
#[derive(Clone)]
pub struct StatementImporter {
    registry: Arc<ProfileRegistry>,
    options: NormalizeOptions,
    pdf_layout_heuristics: bool,
    documents: Arc<dyn DocumentTextExtractor>,
}

impl std::fmt::Debug for StatementImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementImporter")
            .field("profiles", &self.registry.profiles().len())
            .field("options", &self.options)
            .field("pdf_layout_heuristics", &self.pdf_layout_heuristics)
            .finish()
    }
}

impl StatementImporter {
    pub fn new(registry: Arc<ProfileRegistry>) -> Self {
        Self {
            registry,
            options: NormalizeOptions::default(),
            pdf_layout_heuristics: true,
            documents: Arc::new(PdfTextExtractor),
        }
    }

    /// Built-in profiles plus the config's custom institutions and settings
    pub fn from_config(config: ParserConfig) -> Result<Self> {
        let registry = ProfileRegistry::with_custom(config.institutions)?;
        Ok(Self::new(Arc::new(registry))
            .with_options(config.normalize)
            .with_pdf_layout_heuristics(config.pdf_layout_heuristics))
    }

    pub fn with_document_extractor(mut self, documents: Arc<dyn DocumentTextExtractor>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_pdf_layout_heuristics(mut self, enabled: bool) -> Self {
        self.pdf_layout_heuristics = enabled;
        self
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Parse an uploaded statement. Never fails: whole-document problems
    /// come back as an unsuccessful outcome.
    pub fn parse_reader<R: Read>(&self, reader: R, filename: &str) -> ParseOutcome {
        match self.run(reader, filename) {
            Ok((profile, transactions)) => {
                info!(
                    "Parsed {} transactions from {} ({})",
                    transactions.len(),
                    filename,
                    profile.name
                );
                ParseOutcome::succeeded(&profile.name, transactions)
            }
            Err(e) => failed(filename, e),
        }
    }

    /// Parse a statement from disk; the extension is checked before opening
    pub fn parse_file(&self, path: &Path) -> ParseOutcome {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let opened =
            source_format(&filename).and_then(|_| File::open(path).map_err(Error::from));
        match opened {
            Ok(file) => self.parse_reader(BufReader::new(file), &filename),
            Err(e) => failed(&filename, e),
        }
    }

    /// Run extraction and detection only; returns the institution name
    pub fn identify<R: Read>(&self, reader: R, filename: &str) -> Result<String> {
        let raw = extract_content(reader, filename, self.documents.as_ref())?;
        self.detect(&raw, filename).map(|profile| profile.name.clone())
    }

    fn detect(&self, raw: &RawStatementText, filename: &str) -> Result<&InstitutionProfile> {
        self.registry
            .detect(&raw.text, filename)
            .ok_or(Error::UnidentifiedInstitution)
    }

    fn run<R: Read>(
        &self,
        reader: R,
        filename: &str,
    ) -> Result<(&InstitutionProfile, Vec<CanonicalTransaction>)> {
        let raw = extract_content(reader, filename, self.documents.as_ref())?;
        let profile = self.detect(&raw, filename)?;

        let records = self
            .registry
            .extract(profile, &raw, self.pdf_layout_heuristics);
        let extracted = records.len();
        debug!("Extracted {} records with {} style", extracted, profile.style.kind());

        let transactions: Vec<_> = records
            .into_iter()
            .filter_map(|record| normalize(record, &self.options))
            .collect();

        let dropped = extracted - transactions.len();
        if dropped > 0 {
            debug!("Dropped {} records that failed normalization", dropped);
        }

        Ok((profile, transactions))
    }
}

fn failed(filename: &str, e: Error) -> ParseOutcome {
    warn!("Failed to parse {}: {}", filename, e);
    ParseOutcome::failed(e.failure_kind(), e.to_string())
}
