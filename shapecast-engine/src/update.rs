//! Partial mutation producing a new, revalidated instance.

use crate::error::{EngineError, EngineResult};
use crate::validate::validate;
use shapecast_model::{self as model, Instance, PartialRecord};
use shapecast_types::{Problem, ValidationError};
use tracing::debug;

/// Options for update calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Escalate a non-empty problem list into a thrown failure.
    pub strict: bool,
}

impl UpdateOptions {
    /// Strict-mode options.
    #[must_use]
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Discriminated result of [`safe_update`]; failure hands back the
/// unmodified original instance alongside the problems.
#[derive(Debug)]
pub enum SafeUpdate {
    Success {
        data: Instance,
        problems: Vec<Problem>,
    },
    Failure {
        original: Instance,
        problems: Vec<Problem>,
    },
}

/// Applies partial changes to an instance, producing a new one.
///
/// The current field values are shallow-cloned; every key in `changes`
/// whose declared field is not immutable overwrites the clone (values
/// are taken as already typed, never re-deserialized). Keys matching an
/// immutable field or no declared field are ignored. The new instance
/// is then revalidated: in strict mode a non-empty problem list fails
/// with [`ValidationError`], otherwise the problems are attached.
pub async fn update(
    instance: &Instance,
    changes: &PartialRecord,
    options: UpdateOptions,
) -> EngineResult<Instance> {
    let key = instance.type_key();
    let decl =
        model::get_declaration(key).ok_or(EngineError::UnregisteredType { key })?;
    debug!(%key, changed = changes.len(), strict = options.strict, "updating instance");

    let mut fields = instance.fields().clone();
    for (name, value) in changes {
        match decl.field(name) {
            Some(field) if !field.immutable => {
                fields.insert(name.clone(), value.clone());
            }
            _ => {}
        }
    }

    let mut next = Instance::with_fields(key, fields);
    if let Some(raw) = instance.raw() {
        next.set_raw(raw.clone());
    }

    let problems = validate(&next).await?;
    if options.strict && !problems.is_empty() {
        return Err(ValidationError::new(problems).into());
    }
    next.set_problems(problems);
    Ok(next)
}

/// [`update`] with problem-shaped failures surfaced as a [`SafeUpdate`],
/// returning the unmodified instance alongside failure.
pub async fn safe_update(
    instance: &Instance,
    changes: &PartialRecord,
    options: UpdateOptions,
) -> EngineResult<SafeUpdate> {
    match update(instance, changes, options).await {
        Ok(data) => {
            let problems = data.problems().to_vec();
            Ok(SafeUpdate::Success { data, problems })
        }
        Err(EngineError::Validation(err)) => Ok(SafeUpdate::Failure {
            original: instance.clone(),
            problems: err.into_problems(),
        }),
        Err(other) => Err(other),
    }
}
