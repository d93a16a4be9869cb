//! Property-based tests for import path normalization.
//!
//! These tests use proptest to generate random import paths and verify that
//! the normalizer's invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::naming::Normalizer;
    use proptest::prelude::*;

    fn normalizer() -> Normalizer {
        Normalizer::new().unwrap()
    }

    proptest! {
        /// Property: normalizing twice yields identical names
        #[test]
        fn normalize_is_deterministic(input in ".*") {
            let first = normalizer().normalize(&input);
            let second = normalizer().normalize(&input);
            prop_assert_eq!(first, second);
        }

        /// Property: cache names never contain path separators
        #[test]
        fn cache_name_has_no_separators(input in ".*") {
            let result = normalizer().cache_name(&input);
            prop_assert!(!result.contains('/'));
        }

        /// Property: mirror names never contain separators or dots
        #[test]
        fn mirror_name_has_no_separators_or_dots(input in ".*") {
            let result = normalizer().mirror_name(&input);
            prop_assert!(!result.contains('/'));
            prop_assert!(!result.contains('.'));
        }

        /// Property: a run of separators behaves like a single separator
        #[test]
        fn separator_runs_collapse(
            left in "[a-z0-9.]{1,8}",
            right in "[a-z0-9.]{1,8}",
            run in 1usize..5,
        ) {
            let n = normalizer();
            let single = format!("{}/{}", left, right);
            let repeated = format!("{}{}{}", left, "/".repeat(run), right);
            prop_assert_eq!(n.cache_name(&repeated), n.cache_name(&single));
            prop_assert_eq!(n.mirror_name(&repeated), n.mirror_name(&single));
        }

        /// Property: the output never contains two hyphens produced by one run
        #[test]
        fn mirror_name_never_doubles_hyphens_from_separators(input in "[a-z./]*") {
            let result = normalizer().mirror_name(&input);
            prop_assert!(!result.contains("--"));
        }

        /// Property: plain segment characters pass through untouched
        #[test]
        fn alphanumeric_is_preserved(input in "[a-zA-Z0-9_-]+") {
            let n = normalizer();
            prop_assert_eq!(n.cache_name(&input), input.clone());
            prop_assert_eq!(n.mirror_name(&input), input);
        }
    }
}
