// Error types for starpick.
// Covers GitHub API failures, cache I/O, and selection errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarpickError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("account not provided via argument or GITHUB_ACCOUNT")]
    MissingAccount,

    #[error("invalid schema version {0:?}")]
    InvalidVersion(String),

    #[error("only {available} candidates left after filtering, need {requested}")]
    InsufficientPool { available: usize, requested: usize },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StarpickError>;
