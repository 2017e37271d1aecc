//! Error-path construction helpers.
//!
//! Problem paths are dotted for nested fields and bracket-indexed for
//! array elements: `address.street`, `scores[2]`, `orders[0].total`.
//! Paths are built exclusively through these helpers so that the same
//! traversal always produces the same path string.

/// Appends a field name to a path prefix.
///
/// An empty prefix yields the bare field name.
#[must_use]
pub fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

/// Appends an array index to a path prefix.
#[must_use]
pub fn index(prefix: &str, i: usize) -> String {
    format!("{prefix}[{i}]")
}
