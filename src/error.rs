use thiserror::Error;

#[derive(Debug, Error)]
pub enum StockError {
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not authorized: the access token was rejected")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No active session, log in first")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token store error: {0}")]
    Store(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Session renewal failed: {0}")]
    Renewal(#[from] RenewalError),

    #[error("{0}")]
    Other(String),
}

/// Reasons a token renewal can fail. The session guard turns every one of
/// them into a logout; they only surface in logs.
#[derive(Debug, Error)]
pub enum RenewalError {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("refresh endpoint returned status {status}")]
    RequestFailed { status: u16 },

    #[error("refresh request failed: {0}")]
    Network(String),

    #[error("malformed refresh response: {0}")]
    MalformedResponse(String),

    #[error("refresh request timed out")]
    TimedOut,

    #[error("could not persist renewed tokens: {0}")]
    Store(String),
}

impl From<reqwest::Error> for RenewalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RenewalError::TimedOut
        } else {
            RenewalError::Network(err.to_string())
        }
    }
}

impl From<anyhow::Error> for StockError {
    fn from(err: anyhow::Error) -> Self {
        StockError::Other(err.to_string())
    }
}

impl From<String> for StockError {
    fn from(msg: String) -> Self {
        StockError::Other(msg)
    }
}

impl From<&str> for StockError {
    fn from(msg: &str) -> Self {
        StockError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StockError>;
