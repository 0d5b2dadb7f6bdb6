//! Parser configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, else the override in the data dir
//!    (~/.local/share/extrato/config/parser.toml) when it exists
//! 2. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::normalize::NormalizeOptions;
use crate::profiles::{Detector, InstitutionProfile};
use crate::records::{AmountColumns, DelimitedLayout, Delimiter, ExtractionStyle, PdfLayout};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/parser.toml");

/// Settings for one parser instance
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    pub normalize: NormalizeOptions,
    /// Enable debit/credit/balance reading of PDF text
    pub pdf_layout_heuristics: bool,
    /// Extra institutions, checked before the generic fallbacks
    pub institutions: Vec<InstitutionProfile>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            pdf_layout_heuristics: true,
            institutions: Vec::new(),
        }
    }
}

impl ParserConfig {
    /// Load config from `path`, the data-dir override, or the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                read_config(path)?
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => read_config(&default_path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::parse(&content)
    }

    /// Parse config from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(normalize) = raw.normalize {
            if let Some(placeholder) = normalize.description_placeholder {
                config.normalize.description_placeholder = placeholder;
            }
            if let Some(max) = normalize.max_description_chars {
                if max == 0 {
                    return Err(Error::Config(
                        "max_description_chars must be greater than zero".to_string(),
                    ));
                }
                config.normalize.max_description_chars = max;
            }
        }

        if let Some(layout) = raw.pdf.and_then(|pdf| pdf.layout_heuristics) {
            config.pdf_layout_heuristics = layout;
        }

        config.institutions = raw
            .institutions
            .unwrap_or_default()
            .into_iter()
            .map(RawInstitution::into_profile)
            .collect::<Result<_>>()?;

        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<String> {
    debug!("Loading config from {}", path.display());
    fs::read_to_string(path).map_err(|e| Error::Config(format!("Failed to read config: {}", e)))
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("extrato").join("config").join("parser.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    normalize: Option<RawNormalize>,
    pdf: Option<RawPdf>,
    institutions: Option<Vec<RawInstitution>>,
}

#[derive(Debug, Deserialize)]
struct RawNormalize {
    description_placeholder: Option<String>,
    max_description_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawPdf {
    layout_heuristics: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawInstitution {
    name: String,
    #[serde(default)]
    content_signatures: Vec<String>,
    #[serde(default)]
    filename_signatures: Vec<String>,
    style: RawStyle,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawStyle {
    Delimited {
        delimiter: Option<String>,
        date: Option<usize>,
        description: Option<usize>,
        amount: Option<usize>,
        debit: Option<usize>,
        credit: Option<usize>,
        category: Option<usize>,
        balance: Option<usize>,
        min_fields: Option<usize>,
    },
    Positional {
        pdf_layout: Option<String>,
    },
    Ofx,
}

impl RawInstitution {
    fn into_profile(self) -> Result<InstitutionProfile> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Config("Institution name is empty".to_string()));
        }

        let lower = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        let content = lower(self.content_signatures);
        let filename = lower(self.filename_signatures);
        if content.is_empty() && filename.is_empty() {
            return Err(Error::Config(format!(
                "Institution '{}' needs at least one signature",
                name
            )));
        }

        let style = self.style.into_style(&name)?;
        Ok(InstitutionProfile::new(
            name,
            Detector::Signatures { content, filename },
            style,
        ))
    }
}

impl RawStyle {
    fn into_style(self, name: &str) -> Result<ExtractionStyle> {
        match self {
            Self::Delimited {
                delimiter,
                date,
                description,
                amount,
                debit,
                credit,
                category,
                balance,
                min_fields,
            } => {
                let delimiter = match delimiter {
                    Some(d) => d
                        .parse::<Delimiter>()
                        .map_err(|e| Error::Config(format!("Institution '{}': {}", name, e)))?,
                    None => Delimiter::Auto,
                };

                let amount = match (amount, debit, credit) {
                    (Some(i), None, None) => AmountColumns::Signed(i),
                    (None, Some(debit), Some(credit)) => AmountColumns::DebitCredit { debit, credit },
                    _ => {
                        return Err(Error::Config(format!(
                            "Institution '{}' needs either amount or debit and credit columns",
                            name
                        )))
                    }
                };

                let mut layout = DelimitedLayout {
                    delimiter,
                    min_fields: 0,
                    date: date.unwrap_or(0),
                    description: description.unwrap_or(1),
                    amount,
                    category,
                    balance,
                };
                layout.min_fields = min_fields.unwrap_or_else(|| layout.required_fields());

                Ok(ExtractionStyle::Delimited(layout))
            }
            Self::Positional { pdf_layout } => {
                let pdf_layout = match pdf_layout.as_deref() {
                    None => None,
                    Some("debit_credit_balance") => Some(PdfLayout::DebitCreditBalance),
                    Some(other) => {
                        return Err(Error::Config(format!(
                            "Institution '{}': unknown pdf_layout '{}'",
                            name, other
                        )))
                    }
                };
                Ok(ExtractionStyle::Positional { pdf_layout })
            }
            Self::Ofx => Ok(ExtractionStyle::Ofx),
        }
    }
}
