//! Marshaling engines for Shapecast.
//!
//! The engines consume registered type declarations and convert between
//! plain data (`serde_json::Value`) and typed [`Instance`] graphs:
//!
//! - [`parse`] / [`safe_parse`] — plain data → typed instance, with
//!   two-tier problem collection (hard problems always fail, soft
//!   problems fail only in strict mode)
//! - [`partial_parse`] / [`safe_partial_parse`] — present-keys-only
//!   parsing into a sparse record
//! - [`to_json`] — typed instance → plain data, no validation
//! - [`validate`] / [`validate_into`] — re-run validators against an
//!   instance's current values
//! - [`diff`] / [`equals`] / [`changes`] — structural comparison
//! - [`update`] / [`safe_update`] — partial mutation producing a new,
//!   revalidated instance
//!
//! Traversal is strictly sequential in declaration order / index order,
//! awaiting each nested step before starting the next, so problem paths
//! are deterministic and reproducible.
//!
//! [`Instance`]: shapecast_model::Instance

mod diff;
mod error;
mod parse;
mod serialize;
mod update;
mod validate;
pub mod validators;

pub use diff::{changes, diff, equals, FieldChange};
pub use error::{EngineError, EngineResult};
pub use parse::{
    parse, partial_parse, safe_parse, safe_partial_parse, ParseOptions, SafeOutcome,
};
pub use serialize::to_json;
pub use update::{safe_update, update, SafeUpdate, UpdateOptions};
pub use validate::{validate, validate_into};
