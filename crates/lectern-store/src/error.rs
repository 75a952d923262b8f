use thiserror::Error;

/// Errors from the remote lecture service.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Connection refused, DNS failure or timeout.
    #[error("Lecture service unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            StoreError::Unavailable(e.to_string())
        } else {
            StoreError::Http(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
