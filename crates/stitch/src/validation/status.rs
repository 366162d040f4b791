//! Canonicalization of source-specific status spellings.
//!
//! Runs before validation. Values with no table entry pass through
//! lower-cased so the enum check can still reject them.

use crate::schema::{FieldType, SourceKind, SourceSchema};

use super::apply::MappedRow;

const PAYMENTS: &[(&str, &str)] = &[
    ("paid", "succeeded"),
    ("success", "succeeded"),
    ("successful", "succeeded"),
    ("complete", "succeeded"),
    ("completed", "succeeded"),
    ("captured", "succeeded"),
    ("declined", "failed"),
    ("failure", "failed"),
    ("partially refunded", "refunded"),
    ("partially_refunded", "refunded"),
    ("processing", "pending"),
    ("requires_action", "pending"),
    ("chargeback", "disputed"),
    ("disputed_lost", "disputed"),
];

const SCHEDULING: &[(&str, &str)] = &[
    ("active", "scheduled"),
    ("upcoming", "scheduled"),
    ("confirmed", "scheduled"),
    ("booked", "scheduled"),
    ("cancelled", "canceled"),
    ("past", "completed"),
    ("attended", "completed"),
    ("no show", "no_show"),
    ("no-show", "no_show"),
    ("noshow", "no_show"),
];

const TICKETING: &[(&str, &str)] = &[
    ("on hold", "on_hold"),
    ("on-hold", "on_hold"),
    ("hold", "on_hold"),
    ("resolved", "solved"),
    ("done", "solved"),
    ("in progress", "open"),
    ("reopened", "open"),
    ("archived", "closed"),
];

fn table(source: SourceKind) -> &'static [(&'static str, &'static str)] {
    match source {
        SourceKind::Payments => PAYMENTS,
        SourceKind::Scheduling => SCHEDULING,
        SourceKind::Ticketing => TICKETING,
    }
}

/// Canonical status for a raw value from `source`.
pub fn normalize_status(source: SourceKind, raw: &str) -> String {
    let value = raw.trim().to_lowercase();
    table(source)
        .iter()
        .find(|(from, _)| *from == value)
        .map_or(value, |(_, to)| (*to).to_string())
}

/// Canonicalize the `status` field of a mapped row in place.
pub fn normalize_row_status(row: &mut MappedRow, schema: &SourceSchema) {
    let is_status_enum = schema
        .field("status")
        .is_some_and(|f| f.field_type == FieldType::Enum);
    if !is_status_enum {
        return;
    }

    if let Some(raw) = row.get("status") {
        let canonical = normalize_status(schema.source, raw);
        row.set("status", Some(canonical));
    }
}
