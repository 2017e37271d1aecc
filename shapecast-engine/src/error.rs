//! Error types for the marshaling engines.

use shapecast_inject::InjectError;
use shapecast_model::TypeKey;
use shapecast_types::ValidationError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in engine operations.
///
/// Problem-shaped failures travel as [`EngineError::Validation`]; the
/// remaining variants are argument/configuration errors and are never
/// represented as problems.
#[derive(Debug, Error)]
pub enum EngineError {
    /// One or more problems failed the operation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The addressed type has no registered declaration.
    #[error("type not registered: {key}")]
    UnregisteredType { key: TypeKey },

    /// Two instances of different declared types were compared.
    #[error("type mismatch: {left} vs {right}")]
    TypeMismatch { left: TypeKey, right: TypeKey },

    /// Dependency resolution for an injected field failed.
    #[error(transparent)]
    Inject(#[from] InjectError),
}
