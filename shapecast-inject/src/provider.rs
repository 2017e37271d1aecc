//! Providers: how a token resolves to a value.

use crate::error::InjectResult;
use async_trait::async_trait;
use shapecast_model::{Token, Value};
use std::fmt;
use std::sync::Arc;

/// Produces a value for a factory-backed provider.
///
/// Invoked fresh on every resolution; the registry never caches the
/// result.
#[async_trait]
pub trait ProvideFactory: Send + Sync {
    async fn produce(&self) -> InjectResult<Value>;
}

/// Resolves tokens no explicit provider matched.
#[async_trait]
pub trait FallbackResolver: Send + Sync {
    /// Returns `Some` to supply a value, `None` to decline.
    async fn resolve(&self, token: &Token) -> Option<Value>;
}

/// How a provider resolves its token.
#[derive(Clone)]
pub enum Resolution {
    /// A static value, cloned on every resolution.
    Static(Value),
    /// A factory invoked fresh on every resolution.
    Factory(Arc<dyn ProvideFactory>),
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(v) => write!(f, "Static({v:?})"),
            Self::Factory(_) => write!(f, "Factory"),
        }
    }
}

/// A provider table entry.
#[derive(Debug, Clone)]
pub struct Provider {
    pub token: Token,
    pub resolution: Resolution,
}

impl Provider {
    /// A provider resolving to a static value.
    #[must_use]
    pub fn value(token: Token, value: impl Into<Value>) -> Self {
        Self {
            token,
            resolution: Resolution::Static(value.into()),
        }
    }

    /// A factory-backed provider.
    #[must_use]
    pub fn factory(token: Token, factory: Arc<dyn ProvideFactory>) -> Self {
        Self {
            token,
            resolution: Resolution::Factory(factory),
        }
    }
}

/// What to do with the configured fallback resolver.
#[derive(Clone, Default)]
pub enum FallbackUpdate {
    /// Leave the current fallback untouched.
    #[default]
    Keep,
    /// Remove the current fallback.
    Clear,
    /// Install a new fallback.
    Set(Arc<dyn FallbackResolver>),
}

impl fmt::Debug for FallbackUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "Keep"),
            Self::Clear => write!(f, "Clear"),
            Self::Set(_) => write!(f, "Set"),
        }
    }
}
