//! Built-in schemas for the supported export sources.

use once_cell::sync::Lazy;
use regex::Regex;

use super::field::SchemaField;
use super::source::SourceSchema;
use super::types::{FieldType, SourceKind};

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("built-in sample pattern must compile")
}

static EMAIL: Lazy<Regex> = Lazy::new(|| pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));

static SCHEMAS: Lazy<Vec<SourceSchema>> =
    Lazy::new(|| vec![payments_schema(), scheduling_schema(), ticketing_schema()]);

/// All built-in schemas, in [`SourceKind::ALL`] order.
pub fn builtin_schemas() -> &'static [SourceSchema] {
    &SCHEMAS
}

/// The built-in schema for a source.
pub fn schema_for(source: SourceKind) -> &'static SourceSchema {
    let index = SourceKind::ALL
        .iter()
        .position(|s| *s == source)
        .unwrap_or_default();
    &SCHEMAS[index]
}

fn payments_schema() -> SourceSchema {
    SourceSchema {
        source: SourceKind::Payments,
        label: "Payments".to_string(),
        table: "payments".to_string(),
        fields: vec![
            SchemaField::new("payment_id", "Payment ID", FieldType::Text)
                .required()
                .with_aliases([
                    "id",
                    "charge id",
                    "transaction id",
                    "payment intent id",
                    "invoice id",
                ])
                .with_pattern(pattern(r"^(ch|py|pi|in|txn)_[A-Za-z0-9]{6,}$")),
            SchemaField::new("email", "Email", FieldType::Email)
                .required()
                .with_aliases([
                    "email address",
                    "customer email",
                    "receipt email",
                    "billing email",
                ])
                .with_pattern(EMAIL.clone()),
            SchemaField::new("name", "Customer Name", FieldType::Text).with_aliases([
                "full_name",
                "full name",
                "customer",
                "billing name",
                "cardholder name",
            ]),
            SchemaField::new("amount", "Amount", FieldType::Currency)
                .required()
                .with_aliases(["total", "charge amount", "amount charged", "gross amount"])
                .with_pattern(pattern(r"^-?[$€£]\s?\d[\d,]*(\.\d{1,2})?$")),
            SchemaField::new("currency", "Currency", FieldType::Text)
                .with_aliases(["currency code", "ccy"])
                .with_pattern(pattern(
                    r"^(?i:usd|eur|gbp|cad|aud|jpy|chf|sek|nok|dkk|nzd|mxn|brl|inr)$",
                )),
            SchemaField::new("status", "Status", FieldType::Enum)
                .with_aliases(["payment status", "charge status", "state"])
                .with_enum_values(["succeeded", "pending", "failed", "refunded", "disputed"]),
            SchemaField::new("created_at", "Created", FieldType::Timestamp)
                .required()
                .with_aliases([
                    "created at",
                    "created (utc)",
                    "date",
                    "payment date",
                    "charge date",
                ]),
            SchemaField::new("description", "Description", FieldType::Text)
                .with_aliases(["memo", "statement descriptor", "note"]),
        ],
        id_field: "payment_id".to_string(),
        email_field: "email".to_string(),
        name_field: "name".to_string(),
    }
}

fn scheduling_schema() -> SourceSchema {
    SourceSchema {
        source: SourceKind::Scheduling,
        label: "Scheduling".to_string(),
        table: "bookings".to_string(),
        fields: vec![
            SchemaField::new("booking_id", "Booking ID", FieldType::Text)
                .required()
                .with_aliases(["invitee uuid", "event uuid", "booking uuid", "meeting id", "id"])
                .with_pattern(pattern(
                    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
                )),
            SchemaField::new("invitee_email", "Invitee Email", FieldType::Email)
                .required()
                .with_aliases(["email", "email address", "attendee email", "guest email"])
                .with_pattern(EMAIL.clone()),
            SchemaField::new("invitee_name", "Invitee Name", FieldType::Text).with_aliases([
                "name",
                "full name",
                "attendee name",
                "guest name",
                "invitee",
            ]),
            SchemaField::new("event_type", "Event Type", FieldType::Text).with_aliases([
                "event type name",
                "meeting type",
                "event name",
            ]),
            SchemaField::new("start_time", "Start Time", FieldType::Timestamp)
                .required()
                .with_aliases([
                    "start date & time",
                    "start date",
                    "start",
                    "scheduled for",
                    "meeting time",
                ]),
            SchemaField::new("end_time", "End Time", FieldType::Timestamp).with_aliases([
                "end date & time",
                "end date",
                "end",
            ]),
            SchemaField::new("status", "Status", FieldType::Enum)
                .with_aliases(["event status", "booking status", "meeting status"])
                .with_enum_values(["scheduled", "completed", "canceled", "no_show"]),
            SchemaField::new("created_at", "Booked At", FieldType::Timestamp).with_aliases([
                "created",
                "created at",
                "booked on",
                "invitee created",
            ]),
        ],
        id_field: "booking_id".to_string(),
        email_field: "invitee_email".to_string(),
        name_field: "invitee_name".to_string(),
    }
}

fn ticketing_schema() -> SourceSchema {
    SourceSchema {
        source: SourceKind::Ticketing,
        label: "Ticketing".to_string(),
        table: "tickets".to_string(),
        fields: vec![
            SchemaField::new("ticket_id", "Ticket ID", FieldType::Text)
                .required()
                .with_aliases(["id", "ticket #", "ticket number", "ticket no", "case number"])
                .with_pattern(pattern(r"^#\d{1,10}$")),
            SchemaField::new("requester_email", "Requester Email", FieldType::Email)
                .required()
                .with_aliases([
                    "requester",
                    "email",
                    "email address",
                    "submitter email",
                    "customer email",
                ])
                .with_pattern(EMAIL.clone()),
            SchemaField::new("requester_name", "Requester Name", FieldType::Text).with_aliases([
                "name",
                "customer name",
                "submitter",
                "full name",
            ]),
            SchemaField::new("subject", "Subject", FieldType::Text)
                .required()
                .with_aliases(["title", "summary", "ticket subject"]),
            SchemaField::new("status", "Status", FieldType::Enum)
                .with_aliases(["ticket status", "state"])
                .with_enum_values(["new", "open", "pending", "on_hold", "solved", "closed"]),
            SchemaField::new("priority", "Priority", FieldType::Enum)
                .with_aliases(["urgency", "severity"])
                .with_enum_values(["low", "normal", "high", "urgent"]),
            SchemaField::new("created_at", "Created At", FieldType::Timestamp)
                .required()
                .with_aliases(["created", "requested", "opened at", "date created", "created date"]),
            SchemaField::new("assignee", "Assignee", FieldType::Text).with_aliases([
                "assigned to",
                "agent",
                "owner",
            ]),
        ],
        id_field: "ticket_id".to_string(),
        email_field: "requester_email".to_string(),
        name_field: "requester_name".to_string(),
    }
}
