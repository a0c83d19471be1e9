//! Error types for the prefetch module.

use thiserror::Error;

/// Outcome of a failed prefetch or link command.
///
/// `Cancelled` is produced whenever a newer request supersedes an in-flight
/// one or the link is torn down. It is never counted as an attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrefetchError {
    /// The call was aborted through its cancellation token.
    #[error("Prefetch cancelled")]
    Cancelled,

    /// The prefetch primitive rejected the request.
    #[error("Prefetch failed: {detail}")]
    Failed { detail: String },

    /// The link instance has been torn down and accepts no more commands.
    #[error("Link has been torn down")]
    LinkClosed,
}

impl PrefetchError {
    /// Create a genuine (retryable) failure.
    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Failed {
            detail: detail.into(),
        }
    }

    /// Whether this is a benign cancellation rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_distinguishable() {
        assert!(PrefetchError::Cancelled.is_cancellation());
        assert!(!PrefetchError::failed("HTTP 503").is_cancellation());
        assert!(!PrefetchError::LinkClosed.is_cancellation());
    }

    #[test]
    fn test_failed_display_includes_detail() {
        let err = PrefetchError::failed("HTTP 503");
        assert_eq!(err.to_string(), "Prefetch failed: HTTP 503");
    }
}
