//! Error types for binding reconciliation.
//!
//! Local failures ([`BindingError::Conflict`], [`BindingError::Validation`],
//! [`BindingError::PriorityExhausted`]) are raised before the document is
//! submitted and therefore never leave remote side effects.

use std::fmt;

/// Errors raised by a gateway transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {message}")]
    Request {
        /// Target URL.
        url: String,
        /// Underlying failure.
        message: String,
    },

    /// The remote side answered a fetch with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        /// Target URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The gateway document could not be decoded.
    #[error("failed to decode gateway document: {0}")]
    Decode(String),

    /// No bearer token could be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The transport is misconfigured.
    #[error("transport configuration error: {0}")]
    Configuration(String),

    /// The requested gateway does not exist.
    #[error("application gateway not found: {0}")]
    NotFound(String),
}

impl TransportError {
    /// Creates a new `Request` error.
    #[must_use]
    pub fn request(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Errors that can occur while reconciling a binding.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// One or more declared names are already taken.
    #[error("name collision: {}", conflicts.join("; "))]
    Conflict {
        /// Every colliding name, with a description.
        conflicts: Vec<String>,
    },

    /// A declared entity breaks a constraint.
    #[error("invalid {kind} '{name}': {message} ({hint})")]
    Validation {
        /// Entity kind, e.g. "listener".
        kind: &'static str,
        /// Declared name of the offending entity.
        name: String,
        /// What is wrong.
        message: String,
        /// How to fix it.
        hint: String,
    },

    /// Every routing rule priority in the allowed range is taken.
    #[error("no free routing rule priority between {min} and {max}")]
    PriorityExhausted {
        /// Lower bound of the range.
        min: u32,
        /// Upper bound of the range.
        max: u32,
    },

    /// Fetching or submitting the document failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The gateway rejected the submitted document.
    #[error("application gateway rejected the update (HTTP {status}):\n{body}")]
    RemoteApply {
        /// HTTP status returned by the replace call.
        status: u16,
        /// Remote error payload, pretty-printed when it is JSON.
        body: String,
    },

    /// The document changed since it was fetched (conditional writes only).
    #[error("application gateway was modified concurrently; refresh and retry")]
    ConcurrentModification,

    /// A remote entity or reference could not be decoded.
    #[error("failed to decode {entity}: {message}")]
    Decode {
        /// Entity or reference being decoded.
        entity: String,
        /// Underlying failure.
        message: String,
    },
}

impl BindingError {
    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(conflicts: Vec<String>) -> Self {
        Self::Conflict { conflicts }
    }

    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(
        kind: &'static str,
        name: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Validation {
            kind,
            name: name.into(),
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Creates a new `RemoteApply` error, pretty-printing JSON payloads.
    #[must_use]
    pub fn remote_apply(status: u16, body: &str) -> Self {
        let body = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| serde_json::to_string_pretty(&json).ok())
            .unwrap_or_else(|| body.to_string());
        Self::RemoteApply { status, body }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(entity: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            entity: entity.into(),
            message: message.to_string(),
        }
    }

    /// Returns `true` if the error was raised before anything was submitted.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. } | Self::Validation { .. } | Self::PriorityExhausted { .. }
        )
    }

    /// Returns the error category for logging.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Conflict { .. } | Self::ConcurrentModification => ErrorCategory::Conflict,
            Self::Validation { .. } | Self::PriorityExhausted { .. } => ErrorCategory::Validation,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::RemoteApply { .. } => ErrorCategory::Remote,
            Self::Decode { .. } => ErrorCategory::Decode,
        }
    }
}

/// Categories of binding errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Name already in use or concurrent modification.
    Conflict,
    /// Constraint violation.
    Validation,
    /// Network or document retrieval failure.
    Transport,
    /// Gateway rejected the update.
    Remote,
    /// Malformed remote data.
    Decode,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Transport => write!(f, "transport"),
            Self::Remote => write!(f, "remote"),
            Self::Decode => write!(f, "decode"),
        }
    }
}
