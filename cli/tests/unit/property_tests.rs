//! Property-based tests for version parsing, the pod-table grammar, and
//! values repair.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use cdp_dev::domain::pods::{Readiness, parse_pod_table};
use cdp_dev::domain::tool::{MinorVersion, ProbeOutput, classify, parse_version};
use cdp_dev::domain::values::{is_valid_fernet_key, repair_values};

// ============================================================================
// parse_version() property tests
// ============================================================================

proptest! {
    /// The first `major.minor` pair is found regardless of surrounding text.
    #[test]
    fn prop_version_found_inside_noise(
        prefix in "[a-zA-Z :v]{0,20}",
        major in 0u32..1000,
        minor in 0u32..1000,
        patch in 0u32..1000,
        suffix in "[a-zA-Z +-]{0,20}",
    ) {
        let raw = format!("{prefix}{major}.{minor}.{patch}{suffix}");
        prop_assert_eq!(parse_version(&raw), Some(MinorVersion::new(major, minor)));
    }

    /// Text without digits never yields a version.
    #[test]
    fn prop_no_digits_no_version(raw in "[a-zA-Z .:_-]{0,60}") {
        prop_assert_eq!(parse_version(&raw), None);
    }

    /// A present tool is outdated exactly when its version sorts below the minimum.
    #[test]
    fn prop_classification_matches_ordering(
        found in (0u32..50, 0u32..50),
        min in (0u32..50, 0u32..50),
    ) {
        let found = MinorVersion::new(found.0, found.1);
        let min = MinorVersion::new(min.0, min.1);
        let status = classify(true, &ProbeOutput::Text(format!("v{found}.0")), min);
        prop_assert_eq!(status.is_satisfied(), found >= min);
    }
}

// ============================================================================
// Pod-table grammar
// ============================================================================

fn phase() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("Pending"),
        Just("Running"),
        Just("Succeeded"),
        Just("Failed"),
        Just("Unknown"),
    ]
}

fn ready_column() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("<none>".to_string()),
        prop::collection::vec(any::<bool>(), 1..4).prop_map(|flags| {
            flags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        }),
    ]
}

proptest! {
    /// Every well-formed line parses, and readiness never exceeds the total.
    #[test]
    fn prop_well_formed_tables_parse(
        rows in prop::collection::vec(("[a-z]{1,10}", "[a-z0-9-]{1,20}", phase(), ready_column()), 0..10)
    ) {
        let table: String = rows
            .iter()
            .map(|(ns, name, phase, ready)| format!("{ns}   {name}   {phase}   {ready}\n"))
            .collect();
        let pods = parse_pod_table(&table).expect("well-formed table");
        prop_assert_eq!(pods.len(), rows.len());
        let readiness = Readiness::of(&pods);
        prop_assert!(readiness.ready <= readiness.total);
        prop_assert_eq!(readiness.all_ready(), !pods.is_empty() && pods.iter().all(|p| p.is_ready()));
    }

    /// A line with a column missing is always rejected.
    #[test]
    fn prop_three_columns_rejected(ns in "[a-z]{1,10}", name in "[a-z0-9-]{1,20}", phase in phase()) {
        let line = format!("{ns} {name} {phase}\n");
        prop_assert!(parse_pod_table(&line).is_err());
    }
}

// ============================================================================
// Values repair
// ============================================================================

proptest! {
    /// Whatever key is configured, one repair pass leaves either no key,
    /// an empty key, or a valid key, and a second pass changes nothing.
    #[test]
    fn prop_repair_is_idempotent(key in "[A-Za-z0-9_=-]{0,60}", service in "[A-Za-z]{1,12}") {
        let yaml = format!("fernetKey: \"{key}\"\nwebserver:\n  service:\n    type: {service}\n");
        let mut doc: serde_yaml::Value = serde_yaml::from_str(&yaml).expect("valid yaml");
        repair_values(&mut doc, cdp_dev::domain::values::generate_fernet_key);

        let stored = doc["fernetKey"].as_str().unwrap_or_default();
        prop_assert!(stored.is_empty() || is_valid_fernet_key(stored));
        prop_assert_eq!(doc["webserver"]["service"]["type"].as_str(), Some("ClusterIP"));
        prop_assert!(repair_values(&mut doc, || unreachable!()).is_empty());
    }
}
