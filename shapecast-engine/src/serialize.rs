//! Typed instance → plain data.

use crate::error::{EngineError, EngineResult};
use chrono::SecondsFormat;
use shapecast_model::{self as model, FieldDeclaration, Instance, Value};

/// Serializes an instance back to plain data. No validation occurs.
///
/// Wrapper types emit only the wrapped field's serialized value.
/// Otherwise, per declared field: injected fields are never serialized,
/// an unset field is omitted entirely, an explicit null is preserved,
/// and everything else serializes recursively — datetimes as ISO-8601
/// strings with millisecond precision and a UTC suffix, large integers
/// as decimal strings, nested instances via recursive serialization.
pub fn to_json(instance: &Instance) -> EngineResult<serde_json::Value> {
    let key = instance.type_key();
    let decl =
        model::get_declaration(key).ok_or(EngineError::UnregisteredType { key })?;

    if let Some(wrapped) = decl.wrapper_field() {
        return match instance.get(&wrapped.name) {
            Some(value) => serialize_field(wrapped, value),
            None => Ok(serde_json::Value::Null),
        };
    }

    let mut out = serde_json::Map::new();
    for field in decl.fields() {
        if field.injected.is_some() {
            continue;
        }
        match instance.get(&field.name) {
            None => {} // unset: the key does not appear
            Some(Value::Null) => {
                out.insert(field.name.clone(), serde_json::Value::Null);
            }
            Some(value) => {
                out.insert(field.name.clone(), serialize_field(field, value)?);
            }
        }
    }
    Ok(serde_json::Value::Object(out))
}

fn serialize_field(field: &FieldDeclaration, value: &Value) -> EngineResult<serde_json::Value> {
    if let Some(custom) = &field.serialize_with {
        return Ok(custom(value));
    }
    serialize_value(value)
}

fn serialize_value(value: &Value) -> EngineResult<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(dt) => {
            serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        Value::BigInt(v) => serde_json::Value::String(v.to_string()),
        Value::Array(items) => serde_json::Value::Array(
            items.iter().map(serialize_value).collect::<EngineResult<_>>()?,
        ),
        Value::Instance(inner) => to_json(inner)?,
        Value::Opaque(raw) => raw.clone(),
    })
}
