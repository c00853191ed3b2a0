//! Crate-level error type for configuration and server plumbing
//!
//! Request-level failures use [`ApiError`](crate::handlers::ApiError) and
//! store failures use [`RepositoryError`](crate::repository::RepositoryError);
//! this type covers startup and serving.

use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(Box<axum::http::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store error surfaced outside a request
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<axum::http::Error> for Error {
    fn from(err: axum::http::Error) -> Self {
        Error::Http(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_display() {
        let error = Error::Internal("no listener".to_string());
        assert_eq!(error.to_string(), "Internal error: no listener");

        let error: Error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken").into();
        assert_eq!(error.to_string(), "I/O error: port taken");

        let error: Error =
            RepositoryError::timeout(RepositoryOperation::Begin, "pool exhausted").into();
        assert_eq!(
            error.to_string(),
            "Repository timeout error during begin: pool exhausted"
        );
    }

    #[test]
    fn test_figment_error_is_boxed() {
        let error: Error = figment::Error::from("bad value".to_string()).into();
        assert!(matches!(error, Error::Config(_)));
    }
}
