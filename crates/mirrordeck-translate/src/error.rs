//! Error types for translation providers

use thiserror::Error;

/// Errors that can occur while translating
#[derive(Error, Debug)]
pub enum TranslateError {
    /// Provider has no translation for a text
    #[error("No translation for {text:?}")]
    Untranslated { text: String },

    /// HTTP request error
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Provider answered with something other than the requested JSON
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Provider misconfigured (missing key, unknown provider, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranslateError {
    /// Create an untranslated-text error
    pub fn untranslated(text: impl Into<String>) -> Self {
        Self::Untranslated { text: text.into() }
    }

    /// Whether trying again might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            Self::Http(_) => true,
            Self::ServerError { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) => true,
            _ => false,
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslateError>;
