//! Error types for dependency resolution.

use thiserror::Error;

/// Result type for resolution operations.
pub type InjectResult<T> = Result<T, InjectError>;

/// Errors that can occur while resolving a token.
///
/// These are thrown errors, never path-addressed problems: a resolution
/// failure aborts the enclosing engine operation outright.
#[derive(Debug, Error)]
pub enum InjectError {
    /// No provider matched and no fallback produced a value.
    #[error("no provider found for token: {token}")]
    NotFound { token: String },

    /// A provider factory failed.
    #[error("provider factory failed for token {token}: {reason}")]
    Factory { token: String, reason: String },
}
