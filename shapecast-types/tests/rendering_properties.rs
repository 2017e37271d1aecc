//! Property-based checks for problem-path construction and the
//! aggregate error rendering.

use proptest::prelude::*;
use shapecast_types::{path, Problem, ValidationError};

fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z_][a-z0-9_]{0,10}").unwrap()
}

proptest! {
    /// Joining segments and indices never produces adjacent separators
    /// and always embeds every segment in order.
    #[test]
    fn paths_embed_segments_in_order(
        segments in prop::collection::vec(segment_strategy(), 1..5),
        indices in prop::collection::vec(0usize..100, 0..3),
    ) {
        let mut built = String::new();
        for s in &segments {
            built = path::join(&built, s);
        }
        for i in &indices {
            built = path::index(&built, *i);
        }

        prop_assert!(!built.contains(".."));
        prop_assert!(!built.starts_with('.'));
        let mut cursor = 0;
        for s in &segments {
            let found = built[cursor..].find(s.as_str());
            prop_assert!(found.is_some());
            cursor += found.unwrap() + s.len();
        }
    }

    /// The aggregate message always counts its problems and renders one
    /// line per problem beneath the header.
    #[test]
    fn validation_error_message_counts_and_lists(
        messages in prop::collection::vec("[a-zA-Z ]{1,20}", 1..6),
    ) {
        let problems: Vec<Problem> = messages
            .iter()
            .enumerate()
            .map(|(i, m)| Problem::soft(format!("f{i}"), m.clone()))
            .collect();
        let err = ValidationError::new(problems);

        let rendered = err.to_string();
        let mut lines = rendered.lines();
        prop_assert_eq!(lines.next().unwrap(), format!("{} error(s)", messages.len()));
        prop_assert_eq!(lines.count(), messages.len());
    }
}
