//! Structural comparison of instances.

use crate::error::{EngineError, EngineResult};
use shapecast_model::{self as model, FieldDeclaration, Instance, PartialRecord, Value};

/// One field-level difference between two instances of the same type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Structural equality of two instances.
///
/// True when both belong to the same registered type and [`diff`] finds
/// no changes. Instances of different types are unequal, not an error.
pub fn equals(a: &Instance, b: &Instance) -> EngineResult<bool> {
    if a.type_key() != b.type_key() {
        return Ok(false);
    }
    Ok(diff(a, b)?.is_empty())
}

/// Field-by-field comparison of two instances of the same declared
/// type, in declaration order.
///
/// A field's custom equality operation is authoritative when declared;
/// otherwise a deep structural comparison applies, recursing into
/// nested declared types. Fails with [`EngineError::TypeMismatch`] when
/// the two instances belong to different types.
pub fn diff(a: &Instance, b: &Instance) -> EngineResult<Vec<FieldChange>> {
    if a.type_key() != b.type_key() {
        return Err(EngineError::TypeMismatch {
            left: a.type_key(),
            right: b.type_key(),
        });
    }
    let key = a.type_key();
    let decl =
        model::get_declaration(key).ok_or(EngineError::UnregisteredType { key })?;

    let mut out = Vec::new();
    for field in decl.fields() {
        let old_value = a.get(&field.name);
        let new_value = b.get(&field.name);
        let same = match (old_value, new_value) {
            (None, None) => true,
            (Some(x), Some(y)) => field_values_equal(field, x, y)?,
            _ => false,
        };
        if !same {
            out.push(FieldChange {
                field: field.name.clone(),
                old_value: old_value.cloned(),
                new_value: new_value.cloned(),
            });
        }
    }
    Ok(out)
}

/// Projects [`diff`] into a sparse record of new values. A field whose
/// new side is unset is excluded.
pub fn changes(a: &Instance, b: &Instance) -> EngineResult<PartialRecord> {
    let mut out = PartialRecord::new();
    for change in diff(a, b)? {
        if let Some(value) = change.new_value {
            out.insert(change.field, value);
        }
    }
    Ok(out)
}

fn field_values_equal(field: &FieldDeclaration, x: &Value, y: &Value) -> EngineResult<bool> {
    if let Some(custom) = &field.equals_with {
        return Ok(custom(x, y));
    }
    values_equal(x, y)
}

fn values_equal(x: &Value, y: &Value) -> EngineResult<bool> {
    match (x, y) {
        (Value::Instance(a), Value::Instance(b)) => equals(a, b),
        (Value::Array(xs), Value::Array(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            for (a, b) in xs.iter().zip(ys) {
                if !values_equal(a, b)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(x == y),
    }
}
