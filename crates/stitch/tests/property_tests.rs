//! Property-based tests for mapping, detection and value parsing.
//!
//! These tests use proptest to generate random headers and values and
//! verify that the inference engine keeps its invariants under all inputs.
//!
//! # Running Property Tests
//!
//! ```bash
//! # Run all property tests
//! cargo test -p stitch --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p stitch --test property_tests
//! ```

use std::collections::HashSet;

use proptest::prelude::*;

use stitch::mapping::{dice_coefficient, normalize_header};
use stitch::validation::{parse_currency, parse_timestamp};
use stitch::{builtin_schemas, detect_source, generate_mapping_suggestions, RawRow};

// =============================================================================
// Test Strategies
// =============================================================================

/// Header-like strings: known spellings mixed with noise.
fn header_like() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Email".to_string()),
        Just("Email Address".to_string()),
        Just("Customer Email".to_string()),
        Just("Amount".to_string()),
        Just("Total".to_string()),
        Just("Gross Amount".to_string()),
        Just("Status".to_string()),
        Just("Created".to_string()),
        Just("id".to_string()),
        Just("full_name".to_string()),
        "[A-Za-z_ ()#&]{0,20}",
    ]
}

fn headers() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(header_like(), 0..12)
}

/// Sample rows for the given headers, drawn from plausible cell values.
fn rows_for(headers: Vec<String>) -> impl Strategy<Value = (Vec<String>, Vec<RawRow>)> {
    let cell = prop_oneof![
        Just("jane@a.com".to_string()),
        Just("$12.50".to_string()),
        Just("ch_3MtwBwLkdIwHu7ix".to_string()),
        Just("#1001".to_string()),
        "[a-z0-9 ]{0,12}",
    ];
    let width = headers.len();
    prop::collection::vec(prop::collection::vec(cell, width), 0..6).prop_map(move |rows| {
        let raw = rows
            .into_iter()
            .map(|values| headers.iter().cloned().zip(values).collect::<RawRow>())
            .collect();
        (headers.clone(), raw)
    })
}

// =============================================================================
// Mapping properties
// =============================================================================

proptest! {
    #[test]
    fn mapping_is_injective((headers, rows) in headers().prop_flat_map(rows_for)) {
        for schema in builtin_schemas() {
            let suggestions = generate_mapping_suggestions(&headers, schema, &rows);
            prop_assert_eq!(suggestions.len(), headers.len());

            let mut seen = HashSet::new();
            for suggestion in &suggestions {
                if let Some(field) = &suggestion.schema_field {
                    prop_assert!(seen.insert(field.clone()), "{} mapped twice", field);
                    prop_assert!(schema.has_field(field));
                }
                prop_assert!((0.0..=1.0).contains(&suggestion.confidence));
            }
        }
    }

    #[test]
    fn mapping_is_deterministic((headers, rows) in headers().prop_flat_map(rows_for)) {
        for schema in builtin_schemas() {
            let first = generate_mapping_suggestions(&headers, schema, &rows);
            let second = generate_mapping_suggestions(&headers, schema, &rows);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn suggestions_keep_header_order(headers in headers()) {
        let schema = &builtin_schemas()[0];
        let suggestions = generate_mapping_suggestions(&headers, schema, &[]);
        let echoed: Vec<&str> = suggestions.iter().map(|s| s.csv_header.as_str()).collect();
        let expected: Vec<&str> = headers.iter().map(String::as_str).collect();
        prop_assert_eq!(echoed, expected);
    }

    #[test]
    fn detection_is_sorted_best_first((headers, rows) in headers().prop_flat_map(rows_for)) {
        let results = detect_source(&headers, &rows);
        prop_assert_eq!(results.len(), builtin_schemas().len());
        for pair in results.windows(2) {
            prop_assert!(pair[0].confidence >= pair[1].confidence);
        }
        for result in &results {
            prop_assert!((0.0..=1.0 + 1e-9).contains(&result.confidence));
        }
    }
}

// =============================================================================
// Normalizer and scorer properties
// =============================================================================

proptest! {
    #[test]
    fn normalizer_is_total_and_idempotent(s in any::<String>()) {
        let once = normalize_header(&s);
        prop_assert_eq!(normalize_header(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
        prop_assert!(!once.contains("  "));
    }

    #[test]
    fn dice_identity(s in "[a-z ]{1,30}") {
        prop_assert_eq!(dice_coefficient(&s, &s), 1.0);
    }

    #[test]
    fn dice_bounded_and_symmetric(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
        let ab = dice_coefficient(&a, &b);
        let ba = dice_coefficient(&b, &a);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert_eq!(ab, ba);
    }
}

// =============================================================================
// Value parsing properties
// =============================================================================

proptest! {
    #[test]
    fn currency_never_yields_non_finite(s in any::<String>()) {
        if let Some(n) = parse_currency(&s) {
            prop_assert!(n.is_finite());
        }
    }

    #[test]
    fn formatted_amounts_parse(cents in 0u64..10_000_000_000) {
        let whole = cents / 100;
        let mut grouped = String::new();
        for (i, digit) in whole.to_string().chars().enumerate() {
            let remaining = whole.to_string().len() - i;
            if i > 0 && remaining % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        let text = format!("${}.{:02}", grouped, cents % 100);
        let parsed = parse_currency(&text).unwrap();
        prop_assert!((parsed - cents as f64 / 100.0).abs() < 1e-6);
    }

    #[test]
    fn timestamp_parsing_never_panics(s in any::<String>()) {
        let _ = parse_timestamp(&s);
    }

    #[test]
    fn iso_dates_round_trip(y in 2000i32..2100, m in 1u32..=12, d in 1u32..=28) {
        use chrono::Datelike;
        let parsed = parse_timestamp(&format!("{y:04}-{m:02}-{d:02}")).unwrap();
        prop_assert_eq!((parsed.year(), parsed.month(), parsed.day()), (y, m, d));
    }
}
