//! Error types for the relay.
//!
//! The taxonomy follows how each failure is allowed to propagate:
//! classification failures degrade to the default decision and never fail a
//! request; execution failures surface as a typed [`StreamEvent::Error`]
//! followed by `Done`, never as a silently truncated stream.
//!
//! [`StreamEvent::Error`]: crate::event::StreamEvent::Error

use crate::event::ErrorDetail;
use std::time::Duration;
use thiserror::Error;

/// Convenience result alias.
pub type RelayResult<T> = Result<T, RelayError>;

/// Unified relay error.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The decision backend did not answer within its latency budget.
    /// Recovered by falling back to the default decision.
    #[error("classification timed out after {elapsed:?}")]
    ClassificationTimeout {
        /// Time spent waiting
        elapsed: Duration,
    },

    /// The decision backend answered with something outside the closed
    /// enumeration. Recovered by falling back to the default decision.
    #[error("classification output malformed: {detail}")]
    ClassificationMalformed {
        /// What was wrong with the output
        detail: String,
    },

    /// The sandbox platform could not provide an execution context.
    #[error("sandbox unavailable: {message}")]
    SandboxUnavailable {
        /// Platform-reported reason
        message: String,
    },

    /// A sandbox event stream went silent past the read deadline.
    #[error("sandbox read timed out after {elapsed:?}")]
    SandboxReadTimeout {
        /// Time spent waiting for the next event
        elapsed: Duration,
    },

    /// An inference backend call failed.
    #[error("backend '{backend}' unavailable: {message}")]
    BackendUnavailable {
        /// Backend identifier
        backend: String,
        /// Backend-reported reason
        message: String,
        /// HTTP status, when the failure had one
        status_code: Option<u16>,
        /// Whether a fresh attempt could succeed
        retryable: bool,
    },

    /// The caller disconnected mid-stream. Cleanup is silent; nothing is
    /// surfaced to anyone.
    #[error("cancelled by caller")]
    CancelledByCaller,

    /// The request exceeded the global streaming ceiling.
    #[error("global timeout of {limit:?} exceeded")]
    GlobalTimeoutExceeded {
        /// The configured ceiling
        limit: Duration,
    },

    /// Invalid inbound request.
    #[error("validation failed: {message}")]
    Validation {
        /// What failed
        message: String,
        /// Offending field, when known
        field: Option<String>,
    },

    /// Broken or incomplete configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
    },

    /// A streaming transport failed mid-flight.
    #[error("streaming error: {message}")]
    Streaming {
        /// What failed
        message: String,
    },

    /// Catch-all for internal invariant breaches.
    #[error("internal error: {message}")]
    Internal {
        /// What happened
        message: String,
    },
}

impl RelayError {
    /// Validation error constructor.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: Option<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field,
        }
    }

    /// Configuration error constructor.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Backend error constructor.
    #[must_use]
    pub fn backend(
        backend: impl Into<String>,
        message: impl Into<String>,
        status_code: Option<u16>,
        retryable: bool,
    ) -> Self {
        Self::BackendUnavailable {
            backend: backend.into(),
            message: message.into(),
            status_code,
            retryable,
        }
    }

    /// Sandbox unavailability constructor.
    #[must_use]
    pub fn sandbox_unavailable(message: impl Into<String>) -> Self {
        Self::SandboxUnavailable {
            message: message.into(),
        }
    }

    /// Streaming error constructor.
    #[must_use]
    pub fn streaming(message: impl Into<String>) -> Self {
        Self::Streaming {
            message: message.into(),
        }
    }

    /// Internal error constructor.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether a fresh attempt at the failed operation could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::SandboxUnavailable { .. }
            | Self::SandboxReadTimeout { .. }
            | Self::Streaming { .. }
            | Self::ClassificationTimeout { .. } => true,
            Self::BackendUnavailable { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Whether this failure is recovered internally rather than surfaced.
    #[must_use]
    pub fn is_recoverable_degradation(&self) -> bool {
        matches!(
            self,
            Self::ClassificationTimeout { .. } | Self::ClassificationMalformed { .. }
        )
    }

    /// Stable machine-readable code for the wire error descriptor.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClassificationTimeout { .. } => "classification_timeout",
            Self::ClassificationMalformed { .. } => "classification_malformed",
            Self::SandboxUnavailable { .. } => "sandbox_unavailable",
            Self::SandboxReadTimeout { .. } => "sandbox_read_timeout",
            Self::BackendUnavailable { .. } => "backend_unavailable",
            Self::CancelledByCaller => "cancelled",
            Self::GlobalTimeoutExceeded { .. } => "global_timeout_exceeded",
            Self::Validation { .. } => "invalid_request",
            Self::Configuration { .. } => "configuration_error",
            Self::Streaming { .. } => "streaming_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// User-facing explanation for the error segment appended to a stream.
    ///
    /// Timeout-family errors carry decomposition guidance: the caller can
    /// usually succeed by splitting the task into smaller pieces.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::GlobalTimeoutExceeded { limit } => format!(
                "The task exceeded the {}s execution ceiling. \
                 Try breaking it into smaller, independent steps and submitting them separately.",
                limit.as_secs()
            ),
            Self::SandboxReadTimeout { .. } => {
                "The agent environment stopped responding and retries were exhausted. \
                 Try breaking the task into smaller, independent steps."
                    .to_string()
            }
            Self::SandboxUnavailable { .. } => {
                "No agent execution environment is available right now. Please retry shortly."
                    .to_string()
            }
            Self::BackendUnavailable { .. } => {
                "The model backend is currently unavailable. Please retry shortly.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Convert into the wire error descriptor.
    #[must_use]
    pub fn to_detail(&self) -> ErrorDetail {
        ErrorDetail::new(self.code(), self.user_message())
    }
}
