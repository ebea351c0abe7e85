//! Error taxonomy for the scheduling core.
//!
//! Every fallible operation that crosses a module boundary returns
//! [`CoreError`]. The variants map 1:1 onto the machine-readable `kind`
//! surfaced to callers; `kind()` is what external adapters (HTTP layers,
//! CLIs) should match on instead of string-matching the `Display` text.

use thiserror::Error;

use crate::validation::ValidationError;

/// Machine-readable error category.
///
/// `Timeout` and `Cancelled` are not failures from the caller's point of
/// view — the runner translates both into a successful [`crate::RunResult`]
/// with `status: "cancelled"`. The variants exist here for strategies that
/// are invoked directly, bypassing the runner's translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NoSuchStrategy,
    BadConfig,
    Timeout,
    Cancelled,
    Internal,
}

impl ErrorKind {
    /// Stable string form, for serialization into `RunResult.status`/logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::NoSuchStrategy => "NoSuchStrategy",
            ErrorKind::BadConfig => "BadConfig",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Internal => "Internal",
        }
    }
}

/// Errors produced by the scheduling core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input bundle violates a fatal validation (§4.1). Not retried.
    #[error("invalid input: {0:?}")]
    InvalidInput(Vec<ValidationError>),

    /// Unknown strategy name requested from the factory. Not retried.
    #[error("no such strategy: {0}")]
    NoSuchStrategy(String),

    /// A configuration parameter is out of its documented range. Not retried.
    #[error("bad config: {0}")]
    BadConfig(String),

    /// Wall-clock budget exceeded mid-run.
    #[error("time limit exceeded after {0:.3}s")]
    Timeout(f64),

    /// Caller requested cancellation mid-run.
    #[error("run cancelled")]
    Cancelled,

    /// Unexpected fault inside a strategy, caught at the strategy boundary.
    #[error("internal error in strategy '{strategy}': {message}")]
    Internal { strategy: String, message: String },
}

impl CoreError {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::NoSuchStrategy(_) => ErrorKind::NoSuchStrategy,
            CoreError::BadConfig(_) => ErrorKind::BadConfig,
            CoreError::Timeout(_) => ErrorKind::Timeout,
            CoreError::Cancelled => ErrorKind::Cancelled,
            CoreError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn internal(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Internal {
            strategy: strategy.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(CoreError::NoSuchStrategy("x".into()).kind(), ErrorKind::NoSuchStrategy);
        assert_eq!(CoreError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(CoreError::Timeout(1.0).kind(), ErrorKind::Timeout);
        assert_eq!(
            CoreError::internal("ga", "boom").kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::BadConfig.as_str(), "BadConfig");
        assert_eq!(ErrorKind::Cancelled.as_str(), "Cancelled");
    }
}
