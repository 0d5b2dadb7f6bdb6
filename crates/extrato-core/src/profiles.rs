//! Institution profiles and bank detection
//!
//! Profiles are checked in registration order and the first match wins:
//! named institutions first (built-in, then custom ones from config), then
//! the generic catch-alls for delimited rows, positional text and OFX markup.

use tracing::debug;

use crate::error::Result;
use crate::models::{RawExtraction, RawStatementText};
use crate::records::{
    self, has_delimited_rows, has_positional_rows, AmountColumns, DelimitedLayout, Delimiter,
    ExtractionStyle, Patterns, PdfLayout,
};

/// How a profile recognizes a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detector {
    /// Case-insensitive substrings of the content or of the filename
    Signatures {
        content: Vec<String>,
        filename: Vec<String>,
    },
    /// Some line has three or more delimited fields starting with a date
    DelimitedRows,
    /// Some line reads as `DD/MM/YYYY description amount`
    PositionalRows,
    /// `.ofx` filename or `<OFX>` in the content
    OfxMarkup,
}

impl Detector {
    pub fn signatures(content: &[&str], filename: &[&str]) -> Self {
        let lower = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| s.to_lowercase()).collect()
        };
        Self::Signatures {
            content: lower(content),
            filename: lower(filename),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Signatures { .. } => "signatures",
            Self::DelimitedRows => "delimited-rows",
            Self::PositionalRows => "positional-rows",
            Self::OfxMarkup => "ofx-markup",
        }
    }
}

/// A named institution: how to recognize it and how to read its lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionProfile {
    pub name: String,
    pub detector: Detector,
    pub style: ExtractionStyle,
}

/// Lowercased views of the inputs, computed once per detection
struct Probe<'a> {
    content: &'a str,
    content_lower: String,
    filename_lower: String,
}

impl InstitutionProfile {
    pub fn new(name: impl Into<String>, detector: Detector, style: ExtractionStyle) -> Self {
        Self {
            name: name.into(),
            detector,
            style,
        }
    }

    fn with_signatures(
        name: &str,
        content: &[&str],
        filename: &[&str],
        style: ExtractionStyle,
    ) -> Self {
        Self::new(name, Detector::signatures(content, filename), style)
    }

    /// Catch-all profiles that match on content shape instead of a bank name
    pub fn is_fallback(&self) -> bool {
        !matches!(self.detector, Detector::Signatures { .. })
    }

    fn matches_probe(&self, probe: &Probe<'_>, patterns: &Patterns) -> bool {
        match &self.detector {
            Detector::Signatures { content, filename } => {
                let found = |haystack: &str, signatures: &[String]| {
                    signatures
                        .iter()
                        .any(|s| haystack.contains(s.to_lowercase().as_str()))
                };
                found(&probe.content_lower, content) || found(&probe.filename_lower, filename)
            }
            Detector::DelimitedRows => has_delimited_rows(probe.content),
            Detector::PositionalRows => has_positional_rows(probe.content, patterns),
            Detector::OfxMarkup => {
                probe.filename_lower.ends_with(".ofx") || probe.content_lower.contains("<ofx>")
            }
        }
    }

    /// Pull raw records out of statement text with this profile's style
    pub(crate) fn extract(
        &self,
        raw: &RawStatementText,
        patterns: &Patterns,
        pdf_layouts: bool,
    ) -> Vec<RawExtraction> {
        records::extract(&self.style, raw, patterns, pdf_layouts)
    }
}

fn comma_three_columns() -> ExtractionStyle {
    ExtractionStyle::Delimited(DelimitedLayout::three_columns(Delimiter::Comma))
}

fn builtin_profiles() -> Vec<InstitutionProfile> {
    use InstitutionProfile as P;

    vec![
        P::with_signatures(
            "Nubank",
            &["nubank", "nu pagamentos"],
            &["nubank"],
            ExtractionStyle::Delimited(DelimitedLayout {
                delimiter: Delimiter::Comma,
                min_fields: 4,
                date: 0,
                description: 2,
                amount: AmountColumns::Signed(3),
                category: Some(1),
                balance: None,
            }),
        ),
        P::with_signatures(
            "Banco do Brasil",
            &["banco do brasil", "001 - bb"],
            &["bancodobrasil", "banco_do_brasil", "extrato_bb"],
            ExtractionStyle::positional(),
        ),
        P::with_signatures(
            "Bradesco",
            &["bradesco", "237 - bradesco"],
            &["bradesco"],
            ExtractionStyle::Positional {
                pdf_layout: Some(PdfLayout::DebitCreditBalance),
            },
        ),
        P::with_signatures(
            "Itaú",
            &["itaú", "itau unibanco", "341 - itau"],
            &["itau"],
            ExtractionStyle::positional(),
        ),
        P::with_signatures(
            "Santander",
            &["santander", "033 - santander"],
            &["santander"],
            ExtractionStyle::positional(),
        ),
        P::with_signatures(
            "Caixa Econômica Federal",
            &["caixa econômica", "caixa economica", "104 - caixa"],
            &["caixa"],
            ExtractionStyle::positional(),
        ),
        P::with_signatures(
            "Banco Inter",
            &["banco inter", "077 - inter"],
            &["inter"],
            ExtractionStyle::Delimited(DelimitedLayout::three_columns(Delimiter::Auto)),
        ),
        P::with_signatures("C6 Bank", &["c6 bank", "c6bank"], &["c6"], comma_three_columns()),
        P::with_signatures(
            "Banco Original",
            &["banco original"],
            &["original"],
            comma_three_columns(),
        ),
        P::with_signatures(
            "Mercado Pago",
            &["mercado pago", "mercadopago"],
            &["mercadopago"],
            ExtractionStyle::Delimited(DelimitedLayout {
                delimiter: Delimiter::Comma,
                min_fields: 4,
                date: 0,
                description: 2,
                amount: AmountColumns::Signed(3),
                category: None,
                balance: None,
            }),
        ),
        P::with_signatures("PicPay", &["picpay"], &["picpay"], comma_three_columns()),
    ]
}

fn fallback_profiles() -> Vec<InstitutionProfile> {
    vec![
        InstitutionProfile::new(
            "CSV Genérico",
            Detector::DelimitedRows,
            ExtractionStyle::Delimited(DelimitedLayout::three_columns(Delimiter::Auto)),
        ),
        InstitutionProfile::new(
            "Texto Genérico",
            Detector::PositionalRows,
            ExtractionStyle::positional(),
        ),
        InstitutionProfile::new("OFX Genérico", Detector::OfxMarkup, ExtractionStyle::Ofx),
    ]
}

/// Ordered, immutable set of institution profiles
#[derive(Debug)]
pub struct ProfileRegistry {
    profiles: Vec<InstitutionProfile>,
    patterns: Patterns,
}

impl ProfileRegistry {
    /// Built-in institutions followed by the generic catch-alls
    pub fn builtin() -> Result<Self> {
        Self::with_custom(Vec::new())
    }

    /// Built-in institutions, then `custom`, then the generic catch-alls
    pub fn with_custom(custom: Vec<InstitutionProfile>) -> Result<Self> {
        let mut profiles = builtin_profiles();
        profiles.extend(custom);
        profiles.extend(fallback_profiles());

        Ok(Self {
            profiles,
            patterns: Patterns::compile()?,
        })
    }

    /// Profiles in detection order
    pub fn profiles(&self) -> &[InstitutionProfile] {
        &self.profiles
    }

    pub fn get(&self, name: &str) -> Option<&InstitutionProfile> {
        let name = name.to_lowercase();
        self.profiles.iter().find(|p| p.name.to_lowercase() == name)
    }

    /// First profile that recognizes the statement, if any
    pub fn detect(&self, content: &str, filename: &str) -> Option<&InstitutionProfile> {
        let probe = Probe {
            content,
            content_lower: content.to_lowercase(),
            filename_lower: filename.to_lowercase(),
        };

        let found = self
            .profiles
            .iter()
            .find(|p| p.matches_probe(&probe, &self.patterns));

        match found {
            Some(profile) => debug!("Detected institution: {}", profile.name),
            None => debug!("No institution matched {}", filename),
        }
        found
    }

    pub(crate) fn extract(
        &self,
        profile: &InstitutionProfile,
        raw: &RawStatementText,
        pdf_layouts: bool,
    ) -> Vec<RawExtraction> {
        profile.extract(raw, &self.patterns, pdf_layouts)
    }
}
