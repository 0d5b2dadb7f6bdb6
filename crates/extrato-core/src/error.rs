//! Error types for Extrato

use thiserror::Error;

use crate::models::FailureKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Formato de arquivo não suportado: {0}")]
    UnsupportedFormat(String),

    #[error("Não foi possível identificar o banco do extrato")]
    UnidentifiedInstitution,

    #[error("Falha ao extrair texto do documento: {0}")]
    Extraction(String),

    #[error("Falha ao ler arquivo: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Classify a whole-document failure for [`crate::models::ParseOutcome`]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            Self::UnidentifiedInstitution => FailureKind::UnidentifiedInstitution,
            _ => FailureKind::ExtractionFailed,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
