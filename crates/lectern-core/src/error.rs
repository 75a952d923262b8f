use thiserror::Error;

use crate::types::FormErrors;

#[derive(Debug, Error)]
pub enum LecternError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(FormErrors),
}

impl LecternError {
    /// Short error code string, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            LecternError::Config(_) => "CONFIG_ERROR",
            LecternError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, LecternError>;
