//! Error types for fadebook-session — Railway Programming
//!
//! All fallible operations return `Result<T, SessionError>`.
//! No panics, no unwraps in production code paths.
//!
//! Classification matters more than structure here: the orchestrator retries
//! transient failures, surfaces credential rejections verbatim-once, and
//! absorbs storage faults entirely at the vault layer.

use thiserror::Error;

/// Unified error type for all session lifecycle operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    // ─── Precondition Errors ───

    #[error("No internet connection")]
    Offline,

    // ─── Auth Errors ───

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please confirm your email first")]
    EmailNotConfirmed,

    /// Credential exchange rejected for a reason that matched no known
    /// category; the cause is masked in the user-facing message
    #[error("Failed to sign in")]
    SignInFailed,

    // ─── Network Errors ───

    /// Transient network-level failure; eligible for retry
    #[error("Network error. Please try again.")]
    Network(String),

    /// Remote call exceeded the configured timeout; treated as transient
    #[error("Request timed out")]
    Timeout,

    // ─── Infrastructure Errors ───

    /// Storage backend fault. Absorbed (logged, swallowed) at the vault
    /// boundary; only the store implementations themselves return it.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote rejection that is neither credentials nor connectivity
    #[error("Service error: {0}")]
    Service(String),

    /// Orchestrator mailbox closed or reply dropped
    #[error("Auth orchestrator unavailable: {0}")]
    Orchestrator(String),
}

impl SessionError {
    /// Is this error worth retrying? Only network-level failures are.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }

    /// Classify a bare error string from a credential-exchange backend that
    /// does not expose a matchable error kind. Compatibility shim only;
    /// services implemented in Rust should construct the variants directly.
    /// Anything unrecognized is masked as [`SessionError::SignInFailed`]
    /// rather than leaking backend wording to the user.
    pub fn classify_remote(message: &str) -> Self {
        if message.contains("Invalid login credentials") {
            Self::InvalidCredentials
        } else if message.contains("Email not confirmed") {
            Self::EmailNotConfirmed
        } else if message.contains("Network request failed") {
            Self::Network(message.to_string())
        } else {
            Self::SignInFailed
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

/// Result type alias for session lifecycle operations
pub type Result<T> = std::result::Result<T, SessionError>;
