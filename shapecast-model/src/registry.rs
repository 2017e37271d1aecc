//! The process-wide metadata registry.
//!
//! Declarations are registered once at start-up (or explicitly reset
//! between isolated test cases) and are safe to read concurrently once
//! stable. Lookup merges the field list across the supertype chain on
//! every call, so registration order between supertype and subtype does
//! not matter.

use crate::declaration::{FieldDeclaration, TypeDeclaration};
use crate::ident::TypeKey;
use std::collections::{HashMap, HashSet};
use std::sync::{OnceLock, RwLock};

static REGISTRY: OnceLock<RwLock<HashMap<TypeKey, TypeDeclaration>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<TypeKey, TypeDeclaration>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers a declaration. Idempotent: last write wins.
pub fn register(declaration: TypeDeclaration) {
    let mut map = registry().write().expect("metadata registry poisoned");
    map.insert(declaration.key(), declaration);
}

/// Returns true if a declaration is registered under `key`.
#[must_use]
pub fn is_registered(key: TypeKey) -> bool {
    let map = registry().read().expect("metadata registry poisoned");
    map.contains_key(&key)
}

/// Returns the declaration for `key` with its field list merged across
/// the supertype chain: each field appears once, the declaration closest
/// to the subtype wins, supertype fields precede subtype-only fields.
/// Type-level validators accumulate supertype-first.
#[must_use]
pub fn get_declaration(key: TypeKey) -> Option<TypeDeclaration> {
    let map = registry().read().expect("metadata registry poisoned");
    map.get(&key).map(|leaf| merge_chain(&map, leaf))
}

/// Name-based lookup for discriminator-driven polymorphic resolution.
#[must_use]
pub fn lookup_by_name(name: &str) -> Option<TypeDeclaration> {
    let map = registry().read().expect("metadata registry poisoned");
    map.values()
        .find(|d| d.name() == Some(name))
        .map(|leaf| merge_chain(&map, leaf))
}

/// Clears all registered declarations. Intended for test isolation.
pub fn reset() {
    let mut map = registry().write().expect("metadata registry poisoned");
    map.clear();
}

fn merge_chain(
    map: &HashMap<TypeKey, TypeDeclaration>,
    leaf: &TypeDeclaration,
) -> TypeDeclaration {
    // Chain from leaf to root; a revisited key would mean a cycle, stop there.
    let mut chain: Vec<&TypeDeclaration> = vec![leaf];
    let mut seen: HashSet<TypeKey> = HashSet::from([leaf.key()]);
    let mut next = leaf.extends();
    while let Some(key) = next {
        if !seen.insert(key) {
            break;
        }
        match map.get(&key) {
            Some(decl) => {
                chain.push(decl);
                next = decl.extends();
            }
            None => break,
        }
    }

    let mut fields: Vec<FieldDeclaration> = Vec::new();
    for decl in chain.iter().rev() {
        for field in decl.fields() {
            if let Some(slot) = fields.iter_mut().find(|f| f.name == field.name) {
                *slot = field.clone();
            } else {
                fields.push(field.clone());
            }
        }
    }

    let mut validators = Vec::new();
    for decl in chain.iter().rev() {
        validators.extend(decl.validators().iter().cloned());
    }

    TypeDeclaration::from_parts(
        leaf.key(),
        leaf.name().map(str::to_string),
        leaf.extends(),
        leaf.kind(),
        fields,
        validators,
    )
}
