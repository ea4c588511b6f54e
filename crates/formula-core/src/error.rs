use thiserror::Error;

/// Why a single ticker produced no metrics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchFailure {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing fields: {0}")]
    MissingFields(String),

    #[error("Task error: {0}")]
    Task(String),
}

impl FetchFailure {
    /// True when the provider rejected the credential rather than the ticker.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchFailure::Unauthorized(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Provider rejected the API key: {0}")]
    Rejected(String),
}
