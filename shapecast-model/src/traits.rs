//! Pluggable hooks carried by field and type declarations.
//!
//! Validators, default factories and custom converters are supplied by
//! the declaring code as trait objects or closures. Validators and
//! factories are async because they may consult external resources.

use crate::instance::Instance;
use crate::value::Value;
use async_trait::async_trait;
use shapecast_types::Problem;
use std::sync::Arc;

/// Produces a field's default value when the key is absent from input.
///
/// Invoked fresh on every parse; the engine never caches the result.
#[async_trait]
pub trait DefaultFactory: Send + Sync {
    async fn produce(&self) -> Value;
}

/// A field-level validator, run per scalar value or per array element
/// (or, as an array validator, once against the whole array).
///
/// Returned problems are soft; an empty path defaults to the field or
/// element path. A panic aborts the enclosing engine operation.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, value: &Value) -> Vec<Problem>;
}

/// A type-level validator, invoked with the fully constructed instance.
///
/// Problems keep their stated paths; an empty path addresses the
/// instance as a whole.
#[async_trait]
pub trait InstanceValidator: Send + Sync {
    async fn validate(&self, instance: &Instance) -> Vec<Problem>;
}

/// Custom serialize override: typed value → plain data.
pub type SerializeFn = Arc<dyn Fn(&Value) -> serde_json::Value + Send + Sync>;

/// Custom deserialize override: plain data → typed value, replacing the
/// type-directed step entirely. The returned problem is recorded as-is.
pub type DeserializeFn =
    Arc<dyn Fn(&serde_json::Value) -> Result<Value, Problem> + Send + Sync>;

/// Custom field equality. Authoritative for the field when declared.
pub type EqualsFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

#[async_trait]
impl<F> Validator for F
where
    F: Fn(&Value) -> Vec<Problem> + Send + Sync,
{
    async fn validate(&self, value: &Value) -> Vec<Problem> {
        self(value)
    }
}
