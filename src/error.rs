use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API reported failure (code {code}): {message}")]
    Remote { code: i64, message: String },

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Missing expected data: {0}")]
    MissingData(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    #[error("Library entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single shape record was dropped from a fold.
///
/// None of these escalate: the builder logs the reason and moves on to the
/// next record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("unknown record kind '{0}'")]
    UnknownKind(String),

    #[error("{kind}: missing field {index}")]
    MissingField { kind: &'static str, index: usize },

    #[error("{kind}: field {index} is not a number: '{value}'")]
    BadNumber {
        kind: &'static str,
        index: usize,
        value: String,
    },

    #[error("{kind}: path parse failed: {message}")]
    Path { kind: &'static str, message: String },

    #[error("{kind}: unexpected path shape: {message}")]
    PathShape { kind: &'static str, message: String },

    #[error("{kind}: bad embedded JSON: {message}")]
    Json { kind: &'static str, message: String },

    #[error("{0} not supported")]
    Unsupported(&'static str),

    #[error("{0} intentionally not reproduced")]
    Inert(&'static str),

    #[error("{0}")]
    Suppressed(&'static str),
}

impl SkipReason {
    /// Level the fold logs this reason at.
    pub fn level(&self) -> log::Level {
        match self {
            SkipReason::UnknownKind(_) | SkipReason::Unsupported(_) | SkipReason::PathShape { .. } => {
                log::Level::Warn
            }
            SkipReason::Inert(_) | SkipReason::Suppressed(_) => log::Level::Debug,
            _ => log::Level::Error,
        }
    }
}
