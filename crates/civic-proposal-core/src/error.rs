//! Error types for the drafting core.
//!
//! Only [`ProposalError`] is meant to reach the HTTP layer. Model failures are absorbed by the
//! pipeline and turned into template drafts.

use thiserror::Error;

/// Request validation failures. Surfaced to callers as 4xx with the offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    #[error("{field} 필드는 필수입니다.")]
    MissingField { field: &'static str },
}

impl ProposalError {
    pub fn field(&self) -> &'static str {
        match self {
            ProposalError::MissingField { field } => field,
        }
    }
}

/// Failures of the external text-generation call.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No credential configured: the service runs in demo mode.
    #[error("model unavailable: no API key configured")]
    Unavailable,

    #[error("model request timed out")]
    Timeout,

    #[error("model request failed: {0}")]
    Call(String),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout
        } else if err.is_decode() {
            ModelError::Decode(err.to_string())
        } else {
            ModelError::Call(err.to_string())
        }
    }
}

/// Document rendering failures.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

/// Facility file loading failures. Logged and absorbed: the built-in table stays in service.
#[derive(Error, Debug)]
pub enum FacilityFileError {
    #[error("facility file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("facility file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
