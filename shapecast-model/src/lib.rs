//! Declaration and value model for Shapecast.
//!
//! This crate defines the universal types the marshaling engines depend on:
//! - [`Value`] — the typed runtime value (scalars, arrays, nested instances)
//! - [`Instance`] — a typed value belonging to a registered type declaration
//! - [`FieldDeclaration`] / [`TypeDeclaration`] — the declared shape of a
//!   structured record, built through invariant-checking builders
//! - [`TypeThunk`] — lazy type resolution for self- and mutually-referencing
//!   declarations
//! - the process-wide Metadata Registry ([`register`], [`get_declaration`],
//!   [`lookup_by_name`])
//!
//! The engines that consume these declarations (parse, serialize, validate,
//! diff, update) live in `shapecast-engine`.

mod declaration;
mod ident;
mod instance;
mod registry;
mod traits;
mod value;

pub use declaration::{
    Cardinality, DeclarationError, FieldDeclaration, FieldDefault, FieldType, TypeDeclaration,
    TypeDeclarationBuilder, TypeKind, TypeThunk,
};
pub use ident::{Token, TypeKey};
pub use instance::{Instance, PartialRecord};
pub use registry::{get_declaration, is_registered, lookup_by_name, register, reset};
pub use traits::{
    DefaultFactory, DeserializeFn, EqualsFn, InstanceValidator, SerializeFn, Validator,
};
pub use value::Value;
