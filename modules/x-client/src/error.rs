use thiserror::Error;

pub type Result<T> = std::result::Result<T, XError>;

#[derive(Debug, Error)]
pub enum XError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Rate limited by X")]
    RateLimited,
}

impl From<reqwest::Error> for XError {
    fn from(err: reqwest::Error) -> Self {
        XError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for XError {
    fn from(err: serde_json::Error) -> Self {
        XError::Parse(err.to_string())
    }
}
