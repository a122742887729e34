use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Validation error: {0}")]
    #[diagnostic(code(calendar_todo::validation))]
    Validation(String),

    #[error("Unauthorized, no tokens available.")]
    #[diagnostic(
        code(calendar_todo::unauthorized),
        help("Open /auth-url and complete the Google consent flow first")
    )]
    Unauthorized,

    #[error("Google Calendar API returned HTTP {status}: {message}")]
    #[diagnostic(code(calendar_todo::upstream))]
    Upstream { status: u16, message: String },

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(calendar_todo::google_calendar))]
    GoogleCalendar(String),

    #[error("HTTP client error: {0}")]
    #[diagnostic(code(calendar_todo::http))]
    Http(#[from] reqwest::Error),

    #[error("Environment error: {0}")]
    #[diagnostic(code(calendar_todo::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calendar_todo::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(calendar_todo::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar_todo::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calendar_todo::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
