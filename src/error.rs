use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Browser launch failed: {0}")]
    LaunchError(String),

    #[error("Browser shutdown failed: {0}")]
    ShutdownError(String),

    #[error("Navigation failed: {0}")]
    NavigationError(String),

    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("Unknown form: {0}")]
    UnknownForm(String),

    #[error("Unknown autofill scenario: {0}")]
    UnknownScenario(String),

    #[error("Invalid field assignment: {0}")]
    InvalidAssignment(String),

    #[error("Invalid path segment: {0:?}")]
    InvalidSegment(String),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
