//! Property-based tests for version resolution and tag naming.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::version::{
        check_conflict, compute_publish_tag, resolve_for_load, ConflictDecision, TagStyle,
        VersionSpecifier,
    };
    use proptest::prelude::*;
    use semver::Version;

    /// Strategy producing a valid semver triple as (major, minor, patch).
    fn version_triple() -> impl Strategy<Value = (u64, u64, u64)> {
        (0u64..100, 0u64..100, 0u64..100)
    }

    /// Strategy producing a small non-empty set of distinct version triples.
    fn version_set() -> impl Strategy<Value = Vec<(u64, u64, u64)>> {
        proptest::collection::btree_set(version_triple(), 1..12)
            .prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        /// Property: compute_publish_tag is deterministic and idempotent;
        /// calling it twice with the same inputs yields the same string.
        #[test]
        fn compute_publish_tag_is_deterministic((major, minor, patch) in version_triple()) {
            let version = format!("{}.{}.{}", major, minor, patch);
            let first = compute_publish_tag("pkg", &version, TagStyle::VPrefixed).unwrap();
            let second = compute_publish_tag("pkg", &version, TagStyle::VPrefixed).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first, format!("pkg/v{}", version));
        }

        /// Property: for any non-empty set of valid semver tags under a
        /// prefix, `latest` resolves to the tag with strictly maximal
        /// version precedence.
        #[test]
        fn latest_selects_maximal_version(versions in version_set()) {
            let tags: Vec<String> = versions
                .iter()
                .map(|(ma, mi, pa)| format!("pkg/v{}.{}.{}", ma, mi, pa))
                .collect();

            let expected = versions
                .iter()
                .map(|(ma, mi, pa)| Version::new(*ma, *mi, *pa))
                .max()
                .unwrap();

            let resolved = resolve_for_load(&VersionSpecifier::Latest, &tags, "pkg").unwrap();
            prop_assert_eq!(resolved, format!("pkg/v{}", expected));
        }

        /// Property: a tag created by compute_publish_tag resolves back to
        /// itself when fed through resolve_for_load as an exact version.
        #[test]
        fn publish_tag_round_trips((major, minor, patch) in version_triple()) {
            let version = format!("{}.{}.{}", major, minor, patch);
            let tag = compute_publish_tag("pkg", &version, TagStyle::VPrefixed).unwrap();
            let spec = VersionSpecifier::parse(&version).unwrap();
            let resolved = resolve_for_load(&spec, &[tag.clone()], "pkg").unwrap();
            prop_assert_eq!(resolved, tag);
        }

        /// Property: check_conflict never returns Proceed for a tag that is
        /// already present, regardless of the force flag, and with force the
        /// plan's delete step names the existing tag.
        #[test]
        fn conflict_check_never_proceeds_on_present_tag(
            (major, minor, patch) in version_triple(),
            force in any::<bool>(),
        ) {
            let tag = format!("pkg/v{}.{}.{}", major, minor, patch);
            let existing = vec![tag.clone()];

            match check_conflict(&tag, &existing, force) {
                ConflictDecision::Proceed => prop_assert!(false, "present tag must not Proceed"),
                ConflictDecision::Rejected => prop_assert!(!force),
                ConflictDecision::Override(plan) => {
                    prop_assert!(force);
                    prop_assert_eq!(&plan.delete, &tag);
                    prop_assert_eq!(&plan.create, &tag);
                }
            }
        }

        /// Property: resolution never invents tags; whatever comes back is
        /// a member of the input tag list.
        #[test]
        fn resolution_returns_member_of_input(versions in version_set()) {
            let tags: Vec<String> = versions
                .iter()
                .map(|(ma, mi, pa)| format!("pkg/v{}.{}.{}", ma, mi, pa))
                .collect();

            let resolved = resolve_for_load(&VersionSpecifier::Latest, &tags, "pkg").unwrap();
            prop_assert!(tags.contains(&resolved));
        }
    }
}
