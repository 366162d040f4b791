//! Fuzz target for cell value parsing.
//!
//! Timestamp, currency and email checks run on every imported cell, so
//! they must not panic on anything.

#![no_main]

use libfuzzer_sys::fuzz_target;
use stitch::validation::{is_valid_email, parse_currency, parse_timestamp};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(value) = std::str::from_utf8(data) {
        let _ = parse_timestamp(value);
        let _ = is_valid_email(value);
        if let Some(amount) = parse_currency(value) {
            assert!(amount.is_finite());
        }
    }
});
