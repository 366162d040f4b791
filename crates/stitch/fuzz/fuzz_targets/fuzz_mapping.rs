//! Fuzz target for mapping inference and source detection.
//!
//! Arbitrary headers must never map two columns to one field, and
//! detection must always rank every schema.

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stitch::mapping::normalize_header;
use stitch::{builtin_schemas, detect_source, generate_mapping_suggestions};

#[derive(Debug, Arbitrary)]
struct Input {
    headers: Vec<String>,
}

fuzz_target!(|input: Input| {
    if input.headers.len() > 64 {
        return;
    }

    for header in &input.headers {
        let normalized = normalize_header(header);
        assert_eq!(normalize_header(&normalized), normalized);
    }

    for schema in builtin_schemas() {
        let suggestions = generate_mapping_suggestions(&input.headers, schema, &[]);
        assert_eq!(suggestions.len(), input.headers.len());

        let mut seen = HashSet::new();
        for field in suggestions.iter().filter_map(|s| s.schema_field.as_ref()) {
            assert!(seen.insert(field), "{field} mapped twice");
        }
    }

    let results = detect_source(&input.headers, &[]);
    assert_eq!(results.len(), builtin_schemas().len());
});
