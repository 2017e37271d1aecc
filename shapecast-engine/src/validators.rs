//! Built-in field validators.
//!
//! Each built-in produces soft problems with an empty path; the engine
//! re-roots them onto the field or element being validated. A built-in
//! applied to a value of another kind produces nothing — kind
//! enforcement is the parse engine's job.

use regex_lite::Regex;
use shapecast_model::{Validator, Value};
use shapecast_types::Problem;
use std::sync::Arc;

/// Requires a string of at least `min` characters.
#[must_use]
pub fn min_length(min: usize) -> Arc<dyn Validator> {
    Arc::new(move |value: &Value| match value.as_str() {
        Some(s) if s.chars().count() < min => vec![Problem::soft(
            "",
            format!("Must be at least {min} characters long"),
        )],
        _ => Vec::new(),
    })
}

/// Requires a string of at most `max` characters.
#[must_use]
pub fn max_length(max: usize) -> Arc<dyn Validator> {
    Arc::new(move |value: &Value| match value.as_str() {
        Some(s) if s.chars().count() > max => vec![Problem::soft(
            "",
            format!("Must be at most {max} characters long"),
        )],
        _ => Vec::new(),
    })
}

/// Requires a number within `[min, max]`.
#[must_use]
pub fn range(min: f64, max: f64) -> Arc<dyn Validator> {
    Arc::new(move |value: &Value| match value.as_f64() {
        Some(n) if n < min || n > max => vec![Problem::soft(
            "",
            format!("Must be between {min} and {max}"),
        )],
        _ => Vec::new(),
    })
}

/// Requires a string matching the pattern.
pub fn pattern(pattern: &str) -> Result<Arc<dyn Validator>, regex_lite::Error> {
    let regex = Regex::new(pattern)?;
    Ok(Arc::new(move |value: &Value| match value.as_str() {
        Some(s) if !regex.is_match(s) => vec![Problem::soft(
            "",
            format!("Must match pattern {}", regex.as_str()),
        )],
        _ => Vec::new(),
    }))
}

/// Requires the value to be one of the allowed values.
#[must_use]
pub fn one_of(allowed: Vec<Value>) -> Arc<dyn Validator> {
    Arc::new(move |value: &Value| {
        if allowed.contains(value) {
            Vec::new()
        } else {
            vec![Problem::soft("", "Must be one of the allowed values")]
        }
    })
}

/// Requires an array with at least `min` elements.
#[must_use]
pub fn min_items(min: usize) -> Arc<dyn Validator> {
    Arc::new(move |value: &Value| match value.as_array() {
        Some(items) if items.len() < min => vec![Problem::soft(
            "",
            format!("Must contain at least {min} elements"),
        )],
        _ => Vec::new(),
    })
}

/// Wraps a plain function as a validator.
#[must_use]
pub fn custom(f: impl Fn(&Value) -> Vec<Problem> + Send + Sync + 'static) -> Arc<dyn Validator> {
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(validator: &Arc<dyn Validator>, value: &Value) -> Vec<Problem> {
        futures::executor::block_on(validator.validate(value))
    }

    #[test]
    fn min_length_flags_short_strings() {
        let v = min_length(3);
        assert_eq!(run(&v, &Value::from("Jo")).len(), 1);
        assert!(run(&v, &Value::from("Joe")).is_empty());
    }

    #[test]
    fn min_length_ignores_non_strings() {
        let v = min_length(3);
        assert!(run(&v, &Value::from(1i64)).is_empty());
    }

    #[test]
    fn max_length_flags_long_strings() {
        let v = max_length(3);
        assert!(run(&v, &Value::from("abc")).is_empty());
        assert_eq!(run(&v, &Value::from("abcd")).len(), 1);
    }

    #[test]
    fn range_bounds_inclusive() {
        let v = range(0.0, 10.0);
        assert!(run(&v, &Value::from(0i64)).is_empty());
        assert!(run(&v, &Value::from(10i64)).is_empty());
        assert_eq!(run(&v, &Value::from(11i64)).len(), 1);
    }

    #[test]
    fn pattern_matches() {
        let v = pattern("^[a-z]+$").unwrap();
        assert!(run(&v, &Value::from("abc")).is_empty());
        assert_eq!(run(&v, &Value::from("Abc")).len(), 1);
    }

    #[test]
    fn pattern_rejects_bad_regex() {
        assert!(pattern("(").is_err());
    }

    #[test]
    fn one_of_membership() {
        let v = one_of(vec![Value::from("a"), Value::from("b")]);
        assert!(run(&v, &Value::from("a")).is_empty());
        assert_eq!(run(&v, &Value::from("c")).len(), 1);
    }

    #[test]
    fn min_items_counts_elements() {
        let v = min_items(2);
        assert!(run(&v, &Value::Array(vec![Value::from(1i64), Value::from(2i64)])).is_empty());
        assert_eq!(run(&v, &Value::Array(vec![])).len(), 1);
    }

    #[test]
    fn problems_carry_empty_paths() {
        let v = min_length(5);
        let problems = run(&v, &Value::from("x"));
        assert_eq!(problems[0].path, "");
    }
}
