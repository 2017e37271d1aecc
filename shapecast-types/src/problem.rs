//! Path-addressed problems and the aggregate validation failure.
//!
//! Problems come in two tiers:
//! - **Hard** — structural deserialization failures (wrong runtime type,
//!   missing required field, disallowed null, malformed discriminator).
//!   A hard problem always fails a parse.
//! - **Soft** — validator-sourced semantic failures. Tolerated and
//!   attached to the produced instance unless strict mode escalates them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The tier a problem belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Structural failure. Always fails the enclosing parse.
    Hard,
    /// Semantic (validator) failure. Tolerated unless strict.
    Soft,
}

/// A single path-addressed error record.
///
/// The path is dotted for nested fields and bracket-indexed for array
/// elements (`address.street`, `scores[2]`). An empty path means the
/// problem applies to the value as a whole; the engine rewrites it to
/// the owning field's path when attaching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

impl Problem {
    /// Creates a hard (structural) problem.
    #[must_use]
    pub fn hard(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Hard,
        }
    }

    /// Creates a soft (validator) problem.
    #[must_use]
    pub fn soft(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Soft,
        }
    }

    /// Returns true for hard problems.
    #[must_use]
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }

    /// Re-roots an empty path onto `path`; a non-empty path is kept.
    #[must_use]
    pub fn rooted_at(mut self, path: &str) -> Self {
        if self.path.is_empty() {
            self.path = path.to_string();
        }
        self
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// An aggregate validation failure: an ordered, non-empty problem list.
///
/// Renders as `"<n> error(s)"` followed by one `"path: message"` line
/// per problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", render(.problems))]
pub struct ValidationError {
    problems: Vec<Problem>,
}

impl ValidationError {
    /// Creates a validation error from a problem list.
    ///
    /// The list must be non-empty; an aggregate failure with nothing in
    /// it is a logic error in the caller.
    #[must_use]
    pub fn new(problems: Vec<Problem>) -> Self {
        debug_assert!(!problems.is_empty(), "ValidationError with no problems");
        Self { problems }
    }

    /// The problems, in the order they were recorded.
    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Consumes the error, yielding the problem list.
    #[must_use]
    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }

    /// Returns true if any problem is hard.
    #[must_use]
    pub fn has_hard(&self) -> bool {
        self.problems.iter().any(Problem::is_hard)
    }
}

fn render(problems: &[Problem]) -> String {
    let mut out = format!("{} error(s)", problems.len());
    for p in problems {
        out.push('\n');
        out.push_str(&p.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_single_problem() {
        let err = ValidationError::new(vec![Problem::hard("name", "Required property is missing from input")]);
        assert_eq!(
            err.to_string(),
            "1 error(s)\nname: Required property is missing from input"
        );
    }

    #[test]
    fn display_multiple_problems_in_order() {
        let err = ValidationError::new(vec![
            Problem::hard("age", "Expected number, received string"),
            Problem::soft("name", "too short"),
        ]);
        assert_eq!(
            err.to_string(),
            "2 error(s)\nage: Expected number, received string\nname: too short"
        );
    }

    #[test]
    fn empty_path_renders_message_only() {
        let err = ValidationError::new(vec![Problem::soft("", "totals do not add up")]);
        assert_eq!(err.to_string(), "1 error(s)\ntotals do not add up");
    }

    #[test]
    fn rooted_at_fills_empty_path() {
        let p = Problem::soft("", "too short").rooted_at("name");
        assert_eq!(p.path, "name");
    }

    #[test]
    fn rooted_at_keeps_existing_path() {
        let p = Problem::soft("street", "unknown").rooted_at("address");
        assert_eq!(p.path, "street");
    }
}
