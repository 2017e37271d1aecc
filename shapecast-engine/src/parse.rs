//! Plain data → typed instance.
//!
//! Parsing walks the declared fields in declaration order, collecting
//! problems into a single list with deterministic paths. Hard problems
//! always fail the call; soft problems fail it only in strict mode and
//! are otherwise attached to the returned instance.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use shapecast_model::{
    self as model, FieldDeclaration, FieldDefault, FieldType, Instance, PartialRecord,
    TypeDeclaration, TypeKey, Value,
};
use shapecast_types::{path, Problem, ValidationError};
use tracing::debug;

/// Options for parse and partial-parse calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Escalate any problem, hard or soft, into a thrown failure.
    pub strict: bool,
}

impl ParseOptions {
    /// Strict-mode options.
    #[must_use]
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Discriminated result of the safe call variants: problem-shaped
/// failures surface here instead of as errors.
#[derive(Debug)]
pub enum SafeOutcome<T> {
    Success { data: T, problems: Vec<Problem> },
    Failure { problems: Vec<Problem> },
}

impl<T> SafeOutcome<T> {
    /// Returns true for the success arm.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The recorded problems, whichever arm this is.
    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        match self {
            Self::Success { problems, .. } | Self::Failure { problems } => problems,
        }
    }
}

/// Converts plain data into a typed instance of the declared type.
///
/// Fails with [`ValidationError`] when a hard problem exists, or when
/// `strict` and any problem exists. Soft problems in non-strict mode are
/// attached to the returned instance together with the raw input
/// reference. Dependency-resolution failures abort with a distinct
/// error, never a problem.
pub async fn parse(
    key: TypeKey,
    raw: &serde_json::Value,
    options: ParseOptions,
) -> EngineResult<Instance> {
    let decl = declaration(key)?;
    debug!(%key, strict = options.strict, "parsing instance");

    let mut problems = Vec::new();
    let mut instance = parse_instance(decl, raw, String::new(), &mut problems).await?;

    if problems.iter().any(Problem::is_hard) || (options.strict && !problems.is_empty()) {
        return Err(ValidationError::new(problems).into());
    }
    instance.set_problems(problems);
    Ok(instance)
}

/// [`parse`] with problem-shaped failures surfaced as a [`SafeOutcome`].
pub async fn safe_parse(
    key: TypeKey,
    raw: &serde_json::Value,
    options: ParseOptions,
) -> EngineResult<SafeOutcome<Instance>> {
    match parse(key, raw, options).await {
        Ok(data) => {
            let problems = data.problems().to_vec();
            Ok(SafeOutcome::Success { data, problems })
        }
        Err(EngineError::Validation(err)) => Ok(SafeOutcome::Failure {
            problems: err.into_problems(),
        }),
        Err(other) => Err(other),
    }
}

/// Parses only the keys present in `raw` into a sparse record of typed
/// values.
///
/// Absent keys are neither required nor defaulted. In non-strict mode a
/// field whose processing yields a hard problem is excluded from the
/// result instead of failing the call. No type-level validators run: a
/// partial record cannot satisfy whole-type invariants. In strict mode
/// any recorded problem fails the call.
pub async fn partial_parse(
    key: TypeKey,
    raw: &serde_json::Value,
    options: ParseOptions,
) -> EngineResult<PartialRecord> {
    let (record, problems) = partial_parse_inner(key, raw).await?;
    if options.strict && !problems.is_empty() {
        return Err(ValidationError::new(problems).into());
    }
    Ok(record)
}

/// [`partial_parse`] with the recorded problems surfaced alongside the
/// record.
pub async fn safe_partial_parse(
    key: TypeKey,
    raw: &serde_json::Value,
    options: ParseOptions,
) -> EngineResult<SafeOutcome<PartialRecord>> {
    let (record, problems) = partial_parse_inner(key, raw).await?;
    if options.strict && !problems.is_empty() {
        return Ok(SafeOutcome::Failure { problems });
    }
    Ok(SafeOutcome::Success {
        data: record,
        problems,
    })
}

async fn partial_parse_inner(
    key: TypeKey,
    raw: &serde_json::Value,
) -> EngineResult<(PartialRecord, Vec<Problem>)> {
    let decl = declaration(key)?;
    debug!(%key, "partial-parsing record");

    let mut problems = Vec::new();
    let mut record = PartialRecord::new();

    let Some(obj) = raw.as_object() else {
        problems.push(mismatch("", "object", raw));
        return Ok((record, problems));
    };

    for field in decl.fields() {
        // Injected fields are not parseable input.
        if field.injected.is_some() {
            continue;
        }
        let Some(value) = obj.get(&field.name) else {
            continue;
        };

        let hard_before = count_hard(&problems);
        let parsed = process_field(field, value, &field.name, &mut problems).await?;
        if count_hard(&problems) > hard_before {
            // Hard problem: the field is excluded, the problem stays.
            continue;
        }
        if let Some(value) = parsed {
            record.insert(field.name.clone(), value);
        }
    }

    Ok((record, problems))
}

fn count_hard(problems: &[Problem]) -> usize {
    problems.iter().filter(|p| p.is_hard()).count()
}

fn declaration(key: TypeKey) -> EngineResult<TypeDeclaration> {
    model::get_declaration(key).ok_or(EngineError::UnregisteredType { key })
}

/// Parses one instance level. Problems accumulate into the shared list;
/// the returned instance carries whatever fields deserialized cleanly.
/// Only injection and unregistered-type failures abort.
fn parse_instance<'a>(
    decl: TypeDeclaration,
    raw: &'a serde_json::Value,
    prefix: String,
    problems: &'a mut Vec<Problem>,
) -> BoxFuture<'a, EngineResult<Instance>> {
    Box::pin(async move {
        let mut instance = Instance::new(decl.key());

        if let Some(wrapped) = decl.wrapper_field() {
            // Wrapper boundary: the raw value is the wrapped field's value.
            let field = wrapped.clone();
            let fpath = path::join(&prefix, &field.name);
            if let Some(token) = &field.injected {
                let value = shapecast_inject::resolve(token).await?;
                instance.set(field.name.clone(), value);
            } else if let Some(value) = process_field(&field, raw, &fpath, problems).await? {
                instance.set(field.name.clone(), value);
            }
        } else if let Some(obj) = raw.as_object() {
            for field in decl.fields() {
                let fpath = path::join(&prefix, &field.name);

                // 1. Injected fields ignore the raw input entirely.
                if let Some(token) = &field.injected {
                    let value = shapecast_inject::resolve(token).await?;
                    instance.set(field.name.clone(), value);
                    continue;
                }

                match obj.get(&field.name) {
                    // 2. Absent key: default, optional, or hard problem.
                    None => match &field.default {
                        FieldDefault::Value(value) => {
                            instance.set(field.name.clone(), value.clone());
                        }
                        FieldDefault::Factory(factory) => {
                            let value = factory.produce().await;
                            instance.set(field.name.clone(), value);
                        }
                        FieldDefault::None => {
                            if !field.optional {
                                problems.push(Problem::hard(
                                    &fpath,
                                    "Required property is missing from input",
                                ));
                            }
                        }
                    },
                    // 3–5. Present value.
                    Some(value) => {
                        if let Some(value) = process_field(field, value, &fpath, problems).await? {
                            instance.set(field.name.clone(), value);
                        }
                    }
                }
            }
        } else {
            problems.push(mismatch(&prefix, "object", raw));
            instance.set_raw(raw.clone());
            return Ok(instance);
        }

        // Type-level validators see the fully constructed instance.
        for validator in decl.validators() {
            for problem in validator.validate(&instance).await {
                problems.push(reroot(problem, &prefix));
            }
        }

        instance.set_raw(raw.clone());
        Ok(instance)
    })
}

/// Re-addresses a validator problem from instance-relative to absolute.
fn reroot(problem: Problem, prefix: &str) -> Problem {
    if prefix.is_empty() {
        return problem;
    }
    if problem.path.is_empty() {
        return problem.rooted_at(prefix);
    }
    Problem {
        path: path::join(prefix, &problem.path),
        message: problem.message,
        severity: problem.severity,
    }
}

/// Steps 3–5 for one present field value: null handling, type-directed
/// deserialization (or the custom override), then validators.
async fn process_field(
    field: &FieldDeclaration,
    raw: &serde_json::Value,
    fpath: &str,
    problems: &mut Vec<Problem>,
) -> EngineResult<Option<Value>> {
    // 3. Null: assigned verbatim when optional (validators skipped),
    // otherwise a hard problem.
    if raw.is_null() {
        if field.optional {
            return Ok(Some(Value::Null));
        }
        problems.push(Problem::hard(fpath, "Cannot be null or undefined"));
        return Ok(None);
    }

    // A custom deserializer replaces the whole type-directed step.
    if let Some(custom) = &field.deserialize_with {
        return match custom(raw) {
            Ok(value) => {
                let value = run_validators(field, value, fpath, problems).await;
                Ok(Some(value))
            }
            Err(problem) => {
                problems.push(problem.rooted_at(fpath));
                Ok(None)
            }
        };
    }

    // 4a. Passthrough: accepted unchecked, no validators.
    if field.is_passthrough() {
        return Ok(Some(Value::Opaque(raw.clone())));
    }

    // 4b. Arrays: shape check, then steps 3–5 per element.
    if field.is_array() {
        let Some(items) = raw.as_array() else {
            problems.push(mismatch(fpath, "array", raw));
            return Ok(None);
        };

        let mut out = Vec::with_capacity(items.len());
        let mut failed = false;
        for (i, item) in items.iter().enumerate() {
            let epath = path::index(fpath, i);
            if item.is_null() {
                if field.sparse {
                    out.push(Value::Null);
                } else {
                    problems.push(Problem::hard(&epath, "Cannot be null or undefined"));
                    failed = true;
                }
                continue;
            }
            match deserialize_scalar(field, item, &epath, problems).await? {
                Some(value) => {
                    for validator in &field.validators {
                        for problem in validator.validate(&value).await {
                            problems.push(problem.rooted_at(&epath));
                        }
                    }
                    out.push(value);
                }
                None => failed = true,
            }
        }
        if failed {
            return Ok(None);
        }

        let array = Value::Array(out);
        for validator in &field.array_validators {
            for problem in validator.validate(&array).await {
                problems.push(problem.rooted_at(fpath));
            }
        }
        return Ok(Some(array));
    }

    // 4c/5. Scalar: deserialize, then validators.
    match deserialize_scalar(field, raw, fpath, problems).await? {
        Some(value) => {
            for validator in &field.validators {
                for problem in validator.validate(&value).await {
                    problems.push(problem.rooted_at(fpath));
                }
            }
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

async fn run_validators(
    field: &FieldDeclaration,
    value: Value,
    fpath: &str,
    problems: &mut Vec<Problem>,
) -> Value {
    let validators = match &value {
        Value::Array(_) => &field.array_validators,
        _ => &field.validators,
    };
    for validator in validators {
        for problem in validator.validate(&value).await {
            problems.push(problem.rooted_at(fpath));
        }
    }
    value
}

/// Type-directed deserialization of one non-null scalar (or array
/// element) value. Primitive kinds require an exact runtime match, no
/// implicit coercion.
async fn deserialize_scalar(
    field: &FieldDeclaration,
    raw: &serde_json::Value,
    vpath: &str,
    problems: &mut Vec<Problem>,
) -> EngineResult<Option<Value>> {
    match &field.field_type {
        FieldType::Bool => match raw.as_bool() {
            Some(b) => Ok(Some(Value::Bool(b))),
            None => {
                problems.push(mismatch(vpath, "boolean", raw));
                Ok(None)
            }
        },
        FieldType::Number => match raw {
            serde_json::Value::Number(n) => Ok(Some(Value::Number(n.clone()))),
            _ => {
                problems.push(mismatch(vpath, "number", raw));
                Ok(None)
            }
        },
        FieldType::String => match raw.as_str() {
            Some(s) => Ok(Some(Value::String(s.to_string()))),
            None => {
                problems.push(mismatch(vpath, "string", raw));
                Ok(None)
            }
        },
        FieldType::DateTime => Ok(deserialize_datetime(raw, vpath, problems)),
        FieldType::BigInt => Ok(deserialize_bigint(raw, vpath, problems)),
        FieldType::Opaque => Ok(Some(Value::Opaque(raw.clone()))),
        FieldType::Declared(thunk) => {
            let key = thunk.resolve();
            let decl = declaration(key)?;
            let nested = parse_instance(decl, raw, vpath.to_string(), problems).await?;
            Ok(Some(Value::Instance(nested)))
        }
        FieldType::Discriminated { key } => {
            let Some(obj) = raw.as_object() else {
                problems.push(mismatch(vpath, "object", raw));
                return Ok(None);
            };
            let Some(tag) = obj.get(key) else {
                problems.push(Problem::hard(
                    vpath,
                    format!("Missing discriminator key: {key}"),
                ));
                return Ok(None);
            };
            let Some(name) = tag.as_str() else {
                problems.push(Problem::hard(
                    vpath,
                    format!("Unknown discriminator value: {tag}"),
                ));
                return Ok(None);
            };
            let Some(decl) = model::lookup_by_name(name) else {
                problems.push(Problem::hard(
                    vpath,
                    format!("Unknown discriminator value: {name}"),
                ));
                return Ok(None);
            };
            let nested = parse_instance(decl, raw, vpath.to_string(), problems).await?;
            Ok(Some(Value::Instance(nested)))
        }
    }
}

/// A datetime accepts an ISO-8601 string or the native plain-data form,
/// an integer epoch-millisecond timestamp.
fn deserialize_datetime(
    raw: &serde_json::Value,
    vpath: &str,
    problems: &mut Vec<Problem>,
) -> Option<Value> {
    if let Some(s) = raw.as_str() {
        return match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Some(Value::DateTime(dt.with_timezone(&Utc))),
            Err(_) => {
                problems.push(Problem::hard(
                    vpath,
                    format!("Invalid ISO-8601 datetime: {s}"),
                ));
                None
            }
        };
    }
    if let Some(ms) = raw.as_i64() {
        return match DateTime::from_timestamp_millis(ms) {
            Some(dt) => Some(Value::DateTime(dt)),
            None => {
                problems.push(Problem::hard(
                    vpath,
                    format!("Epoch-millisecond timestamp out of range: {ms}"),
                ));
                None
            }
        };
    }
    problems.push(mismatch(vpath, "datetime", raw));
    None
}

/// A large integer accepts a JSON integer or a pure-digit string with
/// an optional leading minus.
fn deserialize_bigint(
    raw: &serde_json::Value,
    vpath: &str,
    problems: &mut Vec<Problem>,
) -> Option<Value> {
    match raw {
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Some(Value::BigInt(i128::from(v)))
            } else if let Some(v) = n.as_u64() {
                Some(Value::BigInt(i128::from(v)))
            } else {
                problems.push(mismatch(vpath, "bigint", raw));
                None
            }
        }
        serde_json::Value::String(s) if is_digit_string(s) => match s.parse::<i128>() {
            Ok(v) => Some(Value::BigInt(v)),
            Err(_) => {
                problems.push(Problem::hard(
                    vpath,
                    format!("Big integer out of range: {s}"),
                ));
                None
            }
        },
        _ => {
            problems.push(mismatch(vpath, "bigint", raw));
            None
        }
    }
}

fn is_digit_string(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn mismatch(vpath: &str, expected: &str, raw: &serde_json::Value) -> Problem {
    Problem::hard(
        vpath,
        format!("Expected {expected}, received {}", json_kind(raw)),
    )
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_strings() {
        assert!(is_digit_string("0"));
        assert!(is_digit_string("-123"));
        assert!(is_digit_string("98765432109876543210"));
        assert!(!is_digit_string(""));
        assert!(!is_digit_string("-"));
        assert!(!is_digit_string("1.5"));
        assert!(!is_digit_string("1e9"));
        assert!(!is_digit_string(" 1"));
    }

    #[test]
    fn json_kinds() {
        assert_eq!(json_kind(&serde_json::json!(null)), "null");
        assert_eq!(json_kind(&serde_json::json!("x")), "string");
        assert_eq!(json_kind(&serde_json::json!([1])), "array");
        assert_eq!(json_kind(&serde_json::json!({})), "object");
    }
}
