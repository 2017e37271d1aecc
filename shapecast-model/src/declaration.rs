//! Field and type declarations.
//!
//! A declaration describes the shape the engines work against: ordered
//! fields with expected types, cardinality, optionality, defaults and
//! validators, plus type-level options (wrapper kind, supertype,
//! registered name). Declarations are built through builders that
//! enforce the structural invariants once, at construction time.

use crate::ident::{Token, TypeKey};
use crate::traits::{
    DefaultFactory, DeserializeFn, EqualsFn, InstanceValidator, SerializeFn, Validator,
};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Lazily resolves a field's target type.
///
/// The thunk is invoked every time the target is needed, never cached at
/// declaration time, so forward references between mutually-recursive
/// declared types resolve correctly once both are registered. Thunks
/// must be idempotent and side-effect-free.
#[derive(Clone)]
pub struct TypeThunk(Arc<dyn Fn() -> TypeKey + Send + Sync>);

impl TypeThunk {
    /// Wraps a resolver closure.
    pub fn new(resolve: impl Fn() -> TypeKey + Send + Sync + 'static) -> Self {
        Self(Arc::new(resolve))
    }

    /// Convenience thunk for a known, non-recursive target.
    #[must_use]
    pub fn of(key: TypeKey) -> Self {
        Self(Arc::new(move || key))
    }

    /// Resolves the target type.
    #[must_use]
    pub fn resolve(&self) -> TypeKey {
        (self.0)()
    }
}

impl fmt::Debug for TypeThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeThunk")
    }
}

/// The declared type of a field's (scalar or element) value.
#[derive(Debug, Clone)]
pub enum FieldType {
    Bool,
    Number,
    String,
    DateTime,
    BigInt,
    /// Passthrough: the value bypasses the entire type/validator pipeline.
    Opaque,
    /// A nested declared type, resolved lazily.
    Declared(TypeThunk),
    /// A polymorphic field: the concrete type is selected by reading the
    /// discriminator key from the raw object and resolving it by
    /// registered name.
    Discriminated { key: String },
}

impl FieldType {
    /// The kind name used in mismatch messages.
    #[must_use]
    pub fn expected_name(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::DateTime => "datetime",
            Self::BigInt => "bigint",
            Self::Opaque => "opaque",
            Self::Declared(_) | Self::Discriminated { .. } => "object",
        }
    }
}

/// Whether a field holds one value or an array of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Scalar,
    Array,
}

/// A field's default, applied when the key is absent from input.
#[derive(Clone)]
pub enum FieldDefault {
    /// No default; absence is an error unless the field is optional.
    None,
    /// A static value, cloned on every use.
    Value(Value),
    /// A factory invoked fresh on every use; may be async.
    Factory(Arc<dyn DefaultFactory>),
}

impl FieldDefault {
    /// Returns true when no default is declared.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Value(v) => write!(f, "Value({v:?})"),
            Self::Factory(_) => write!(f, "Factory"),
        }
    }
}

/// A single field of a type declaration.
#[derive(Clone)]
pub struct FieldDeclaration {
    pub name: String,
    pub field_type: FieldType,
    pub cardinality: Cardinality,
    /// Null elements permitted inside the array.
    pub sparse: bool,
    pub optional: bool,
    /// Rejected by the update engine.
    pub immutable: bool,
    pub default: FieldDefault,
    /// Run per scalar value or per array element.
    pub validators: Vec<Arc<dyn Validator>>,
    /// Run once against the whole array.
    pub array_validators: Vec<Arc<dyn Validator>>,
    pub serialize_with: Option<SerializeFn>,
    pub deserialize_with: Option<DeserializeFn>,
    pub equals_with: Option<EqualsFn>,
    /// Resolved from the dependency registry instead of parsed from input.
    pub injected: Option<Token>,
}

impl FieldDeclaration {
    fn with_type(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            cardinality: Cardinality::Scalar,
            sparse: false,
            optional: false,
            immutable: false,
            default: FieldDefault::None,
            validators: Vec::new(),
            array_validators: Vec::new(),
            serialize_with: None,
            deserialize_with: None,
            equals_with: None,
            injected: None,
        }
    }

    /// Shorthand for a string field.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::String)
    }

    /// Shorthand for a numeric field.
    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Number)
    }

    /// Shorthand for a boolean field.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Bool)
    }

    /// Shorthand for a datetime field.
    #[must_use]
    pub fn datetime(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::DateTime)
    }

    /// Shorthand for a large-integer field.
    #[must_use]
    pub fn bigint(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::BigInt)
    }

    /// Shorthand for a passthrough field: accepted unchecked, skipping
    /// the whole type/validator pipeline.
    #[must_use]
    pub fn passthrough(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Opaque)
    }

    /// Shorthand for a nested declared-type field.
    #[must_use]
    pub fn nested(name: impl Into<String>, target: TypeThunk) -> Self {
        Self::with_type(name, FieldType::Declared(target))
    }

    /// Shorthand for a polymorphic field discriminated by `key`.
    #[must_use]
    pub fn discriminated(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Discriminated { key: key.into() })
    }

    /// Makes this an array field.
    #[must_use]
    pub fn array(mut self) -> Self {
        self.cardinality = Cardinality::Array;
        self
    }

    /// Permits null elements inside the array.
    #[must_use]
    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    /// Makes the field optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Makes the field immutable (the update engine refuses to change it).
    #[must_use]
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Declares a static default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Declares a default factory, invoked fresh on every use.
    #[must_use]
    pub fn default_factory(mut self, factory: Arc<dyn DefaultFactory>) -> Self {
        self.default = FieldDefault::Factory(factory);
        self
    }

    /// Adds a per-value (or per-element) validator.
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Adds a whole-array validator.
    #[must_use]
    pub fn array_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.array_validators.push(validator);
        self
    }

    /// Declares a custom serialize override.
    #[must_use]
    pub fn serialize_with(mut self, f: SerializeFn) -> Self {
        self.serialize_with = Some(f);
        self
    }

    /// Declares a custom deserialize override.
    #[must_use]
    pub fn deserialize_with(mut self, f: DeserializeFn) -> Self {
        self.deserialize_with = Some(f);
        self
    }

    /// Declares a custom equality operation.
    #[must_use]
    pub fn equals_with(mut self, f: EqualsFn) -> Self {
        self.equals_with = Some(f);
        self
    }

    /// Marks the field as injected, resolved by `token`.
    #[must_use]
    pub fn injected(mut self, token: Token) -> Self {
        self.injected = Some(token);
        self
    }

    /// True for passthrough (opaque) fields.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        matches!(self.field_type, FieldType::Opaque)
    }

    /// True for array-cardinality fields.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.cardinality == Cardinality::Array
    }
}

impl fmt::Debug for FieldDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDeclaration")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("cardinality", &self.cardinality)
            .field("sparse", &self.sparse)
            .field("optional", &self.optional)
            .field("immutable", &self.immutable)
            .field("default", &self.default)
            .field("validators", &self.validators.len())
            .field("array_validators", &self.array_validators.len())
            .field("injected", &self.injected)
            .finish_non_exhaustive()
    }
}

/// The boundary shape of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A keyed record.
    Plain,
    /// Wraps exactly one array field; unwraps to a bare array at the
    /// serialization boundary.
    CollectionWrapper,
    /// Wraps exactly one scalar field; unwraps to a bare scalar.
    ScalarWrapper,
}

/// Declaration invariant violations, reported at build time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("field `{0}` is passthrough and cannot be array, optional, or sparse")]
    PassthroughConflict(String),

    #[error("field `{0}` is sparse but not an array")]
    SparseRequiresArray(String),

    #[error("field `{0}` is injected and cannot be passthrough or an array")]
    InjectedConflict(String),

    #[error("duplicate field `{0}` in declaration of `{1}`")]
    DuplicateField(String, String),

    #[error("wrapper type `{0}` must declare exactly one {1} field")]
    WrapperShape(String, &'static str),
}

/// A declared type: ordered fields plus type-level options.
#[derive(Clone)]
pub struct TypeDeclaration {
    key: TypeKey,
    name: Option<String>,
    extends: Option<TypeKey>,
    kind: TypeKind,
    fields: Vec<FieldDeclaration>,
    validators: Vec<Arc<dyn InstanceValidator>>,
}

impl TypeDeclaration {
    /// Starts a builder for the given type key.
    #[must_use]
    pub fn builder(key: TypeKey) -> TypeDeclarationBuilder {
        TypeDeclarationBuilder {
            key,
            name: None,
            extends: None,
            kind: TypeKind::Plain,
            fields: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        key: TypeKey,
        name: Option<String>,
        extends: Option<TypeKey>,
        kind: TypeKind,
        fields: Vec<FieldDeclaration>,
        validators: Vec<Arc<dyn InstanceValidator>>,
    ) -> Self {
        Self {
            key,
            name,
            extends,
            kind,
            fields,
            validators,
        }
    }

    /// The declared type's key.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The registered name for polymorphic lookup, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The supertype, if any.
    #[must_use]
    pub fn extends(&self) -> Option<TypeKey> {
        self.extends
    }

    /// The boundary shape of this type.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The ordered field declarations.
    #[must_use]
    pub fn fields(&self) -> &[FieldDeclaration] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The type-level validators.
    #[must_use]
    pub fn validators(&self) -> &[Arc<dyn InstanceValidator>] {
        &self.validators
    }

    /// The single wrapped field of a wrapper type; `None` for plain types.
    #[must_use]
    pub fn wrapper_field(&self) -> Option<&FieldDeclaration> {
        match self.kind {
            TypeKind::Plain => None,
            TypeKind::CollectionWrapper | TypeKind::ScalarWrapper => self.fields.first(),
        }
    }
}

impl fmt::Debug for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDeclaration")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("extends", &self.extends)
            .field("kind", &self.kind)
            .field("fields", &self.fields)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Builder for [`TypeDeclaration`]; `build` enforces the declaration
/// invariants.
pub struct TypeDeclarationBuilder {
    key: TypeKey,
    name: Option<String>,
    extends: Option<TypeKey>,
    kind: TypeKind,
    fields: Vec<FieldDeclaration>,
    validators: Vec<Arc<dyn InstanceValidator>>,
}

impl TypeDeclarationBuilder {
    /// Registers a name for discriminator-based lookup.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares a supertype whose fields are merged beneath this type's.
    #[must_use]
    pub fn extends(mut self, key: TypeKey) -> Self {
        self.extends = Some(key);
        self
    }

    /// Makes this a collection wrapper (unwraps to a bare array).
    #[must_use]
    pub fn collection_wrapper(mut self) -> Self {
        self.kind = TypeKind::CollectionWrapper;
        self
    }

    /// Makes this a scalar wrapper (unwraps to a bare scalar).
    #[must_use]
    pub fn scalar_wrapper(mut self) -> Self {
        self.kind = TypeKind::ScalarWrapper;
        self
    }

    /// Appends a field declaration.
    #[must_use]
    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a type-level validator.
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn InstanceValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Validates the declaration invariants and builds the declaration.
    pub fn build(self) -> Result<TypeDeclaration, DeclarationError> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.is_passthrough() && (field.is_array() || field.optional || field.sparse) {
                return Err(DeclarationError::PassthroughConflict(field.name.clone()));
            }
            if field.sparse && !field.is_array() {
                return Err(DeclarationError::SparseRequiresArray(field.name.clone()));
            }
            if field.injected.is_some() && (field.is_passthrough() || field.is_array()) {
                return Err(DeclarationError::InjectedConflict(field.name.clone()));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(DeclarationError::DuplicateField(
                    field.name.clone(),
                    self.key.as_str().to_string(),
                ));
            }
        }

        match self.kind {
            TypeKind::Plain => {}
            TypeKind::CollectionWrapper => {
                if self.fields.len() != 1 || !self.fields[0].is_array() {
                    return Err(DeclarationError::WrapperShape(
                        self.key.as_str().to_string(),
                        "array",
                    ));
                }
            }
            TypeKind::ScalarWrapper => {
                if self.fields.len() != 1 || self.fields[0].is_array() {
                    return Err(DeclarationError::WrapperShape(
                        self.key.as_str().to_string(),
                        "scalar",
                    ));
                }
            }
        }

        Ok(TypeDeclaration {
            key: self.key,
            name: self.name,
            extends: self.extends,
            kind: self.kind,
            fields: self.fields,
            validators: self.validators,
        })
    }
}
