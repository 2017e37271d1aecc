//! Identity types for declared types and injection tokens.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Stable identity of a declared type.
///
/// Keys are static strings chosen at declaration time; the registry and
/// every engine address types exclusively through them, never through
/// runtime introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeKey(&'static str);

impl TypeKey {
    /// Creates a type key from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the underlying name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity used to look up a dependency provider.
///
/// A token is either a chosen name, a minted one-of-a-kind identity
/// (the symbol-like form), or a declared type's own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// A string-named token.
    Named(String),
    /// A freshly minted, globally unique token.
    Unique(Uuid),
    /// A declared type's identity.
    Type(TypeKey),
}

impl Token {
    /// Creates a named token.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Mints a new unique token. Two calls never collide.
    #[must_use]
    pub fn unique() -> Self {
        Self::Unique(Uuid::new_v4())
    }

    /// Creates a token from a declared type's key.
    #[must_use]
    pub const fn of_type(key: TypeKey) -> Self {
        Self::Type(key)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Unique(id) => write!(f, "unique:{id}"),
            Self::Type(key) => write!(f, "{key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_key_display() {
        assert_eq!(TypeKey::new("User").to_string(), "User");
    }

    #[test]
    fn unique_tokens_never_collide() {
        assert_ne!(Token::unique(), Token::unique());
    }

    #[test]
    fn named_tokens_compare_by_name() {
        assert_eq!(Token::named("db"), Token::named("db"));
        assert_ne!(Token::named("db"), Token::named("cache"));
    }

    #[test]
    fn type_token_displays_declared_key() {
        let t = Token::of_type(TypeKey::new("Config"));
        assert_eq!(t.to_string(), "Config");
    }
}
