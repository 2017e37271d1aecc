//! Re-checking an existing instance's invariants.
//!
//! Validation runs the field-level and type-level validator passes
//! against the instance's current field values, not the raw input it
//! was parsed from. Problems here are validator-sourced (soft); the
//! structural checks belong to the parse engine.

use crate::error::{EngineError, EngineResult};
use futures::future::BoxFuture;
use shapecast_model::{self as model, Instance, TypeDeclaration, Value};
use shapecast_types::{path, Problem};
use tracing::debug;

/// Runs all validators against the instance's current values and
/// returns the collected problems. The instance itself is untouched.
///
/// Fails with [`EngineError::UnregisteredType`] when the instance's
/// type (or a nested instance's type) is not registered.
pub async fn validate(instance: &Instance) -> EngineResult<Vec<Problem>> {
    let key = instance.type_key();
    let decl =
        model::get_declaration(key).ok_or(EngineError::UnregisteredType { key })?;
    debug!(%key, "validating instance");

    let mut problems = Vec::new();
    validate_level(decl, instance, String::new(), &mut problems).await?;
    Ok(problems)
}

/// [`validate`], then replaces the instance's attached problem list
/// wholesale — even with an empty list.
pub async fn validate_into(instance: &mut Instance) -> EngineResult<Vec<Problem>> {
    let problems = validate(&*instance).await?;
    instance.set_problems(problems.clone());
    Ok(problems)
}

fn validate_level<'a>(
    decl: TypeDeclaration,
    instance: &'a Instance,
    prefix: String,
    problems: &'a mut Vec<Problem>,
) -> BoxFuture<'a, EngineResult<()>> {
    Box::pin(async move {
        for field in decl.fields() {
            // Injected and passthrough fields bypass validation.
            if field.injected.is_some() || field.is_passthrough() {
                continue;
            }
            let Some(value) = instance.get(&field.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let fpath = path::join(&prefix, &field.name);

            match value {
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if item.is_null() {
                            continue;
                        }
                        let epath = path::index(&fpath, i);
                        for validator in &field.validators {
                            for problem in validator.validate(item).await {
                                problems.push(problem.rooted_at(&epath));
                            }
                        }
                        recurse_value(item, &epath, problems).await?;
                    }
                    for validator in &field.array_validators {
                        for problem in validator.validate(value).await {
                            problems.push(problem.rooted_at(&fpath));
                        }
                    }
                }
                _ => {
                    for validator in &field.validators {
                        for problem in validator.validate(value).await {
                            problems.push(problem.rooted_at(&fpath));
                        }
                    }
                    recurse_value(value, &fpath, problems).await?;
                }
            }
        }

        for validator in decl.validators() {
            for problem in validator.validate(instance).await {
                problems.push(reroot(problem, &prefix));
            }
        }
        Ok(())
    })
}

async fn recurse_value(
    value: &Value,
    vpath: &str,
    problems: &mut Vec<Problem>,
) -> EngineResult<()> {
    if let Value::Instance(nested) = value {
        let key = nested.type_key();
        let decl =
            model::get_declaration(key).ok_or(EngineError::UnregisteredType { key })?;
        validate_level(decl, nested, vpath.to_string(), problems).await?;
    }
    Ok(())
}

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
