use thiserror::Error;

/// Fetch failure taxonomy.
///
/// `Clone` because shared in-flight futures hand the same result to every
/// joined caller. Every variant is transient from the caller's point of
/// view: coordinators reset their state on failure and the next request
/// retries from scratch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed content: {0}")]
    Parse(String),
}

impl FetchError {
    /// Stable label for events and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Validation(_) => "validation",
            FetchError::Network(_) => "network",
            FetchError::NotFound(_) => "not_found",
            FetchError::Parse(_) => "parse",
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
