//! Typed instances of registered declarations.

use crate::ident::TypeKey;
use crate::value::Value;
use shapecast_types::Problem;
use std::collections::BTreeMap;

/// A sparse record of already-typed field values.
///
/// Produced by partial parse and consumed by update.
pub type PartialRecord = BTreeMap<String, Value>;

/// A typed value belonging to a registered type declaration.
///
/// Carries the field values, an optional reference to the raw plain data
/// it was parsed from, and the list of currently attached (soft) problems.
#[derive(Debug, Clone)]
pub struct Instance {
    type_key: TypeKey,
    fields: BTreeMap<String, Value>,
    raw: Option<serde_json::Value>,
    problems: Vec<Problem>,
}

impl Instance {
    /// Creates an empty instance of the given type.
    #[must_use]
    pub fn new(type_key: TypeKey) -> Self {
        Self {
            type_key,
            fields: BTreeMap::new(),
            raw: None,
            problems: Vec::new(),
        }
    }

    /// Creates an instance with pre-populated field values.
    #[must_use]
    pub fn with_fields(type_key: TypeKey, fields: BTreeMap<String, Value>) -> Self {
        Self {
            type_key,
            fields,
            raw: None,
            problems: Vec::new(),
        }
    }

    /// The key of the declaration this instance belongs to.
    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Returns a field value, or `None` when the field is unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Removes a field value, returning it if it was set.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// All set field values.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Consumes the instance, yielding its field values.
    #[must_use]
    pub fn into_fields(self) -> BTreeMap<String, Value> {
        self.fields
    }

    /// Extracts a string field value.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Extracts a boolean field value.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.fields.get(name).and_then(Value::as_bool)
    }

    /// Extracts a numeric field value.
    #[must_use]
    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }

    /// The raw plain data this instance was parsed from, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&serde_json::Value> {
        self.raw.as_ref()
    }

    /// Records the raw plain data reference.
    pub fn set_raw(&mut self, raw: serde_json::Value) {
        self.raw = Some(raw);
    }

    /// The currently attached problems.
    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Replaces the attached problem list wholesale, even with an empty one.
    pub fn set_problems(&mut self, problems: Vec<Problem>) {
        self.problems = problems;
    }
}

/// Structural equality: same type key, same field values. The raw-input
/// reference and attached problems are bookkeeping, not identity.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.type_key == other.type_key && self.fields == other.fields
    }
}
