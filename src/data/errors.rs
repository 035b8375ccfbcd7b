use thiserror::Error;

/// Error taxonomy for the data layer
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("API error: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimit { retry_after: u64 },

    #[error("Unknown sector '{0}' (see `sectorpulse sectors` for valid names)")]
    UnknownSector(String),

    #[error("No data available for {ticker} between {start} and {end}")]
    NoData {
        ticker: String,
        start: String,
        end: String,
    },

    #[error("Timeout error: operation took longer than {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    #[error("Data validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Whether retrying the operation can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            DataError::Network(_) => true,
            DataError::RateLimit { .. } => true,
            DataError::Timeout { .. } => true,
            // Server errors and throttling are transient; client errors are not
            DataError::Api { status_code, .. } => *status_code >= 500 || *status_code == 429,
            _ => false,
        }
    }

    /// Server-hinted delay in seconds before the next attempt. Transient
    /// failures without a hint are paced by the caller's backoff strategy.
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            DataError::RateLimit { retry_after } => Some(*retry_after),
            DataError::Api { status_code, .. } if *status_code == 429 => Some(10),
            _ => None,
        }
    }

    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        DataError::Parse {
            message: message.into(),
        }
    }

    pub fn validation_error<S: Into<String>>(field: S, message: S) -> Self {
        DataError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn api_error<S: Into<String>>(status_code: u16, message: S) -> Self {
        DataError::Api {
            status_code,
            message: message.into(),
        }
    }
}
