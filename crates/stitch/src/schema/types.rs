//! Core type definitions for source schemas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StitchError;

/// Value type a schema field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    Text,
    /// Email address.
    Email,
    /// Plain number.
    Number,
    /// Monetary amount, possibly with a symbol and thousands separators.
    Currency,
    /// Calendar date.
    Date,
    /// Date with an optional time component.
    Timestamp,
    /// One of a closed set of normalized values.
    Enum,
}

impl FieldType {
    /// Returns true if values of this type are parsed as numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Currency)
    }

    /// Returns true if values of this type are parsed as dates.
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::Timestamp)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Date => "date",
            FieldType::Timestamp => "timestamp",
            FieldType::Enum => "enum",
        }
    }
}

/// The external systems records can be imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Payment processor exports (charges, invoices).
    Payments,
    /// Scheduling tool exports (booked meetings).
    Scheduling,
    /// Ticketing tool exports (support tickets).
    Ticketing,
}

impl SourceKind {
    /// Every supported source, in registry order.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Payments,
        SourceKind::Scheduling,
        SourceKind::Ticketing,
    ];

    /// Stable identifier used in stored records and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Payments => "payments",
            SourceKind::Scheduling => "scheduling",
            SourceKind::Ticketing => "ticketing",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payments" | "payment" => Ok(SourceKind::Payments),
            "scheduling" | "bookings" | "booking" => Ok(SourceKind::Scheduling),
            "ticketing" | "tickets" | "ticket" => Ok(SourceKind::Ticketing),
            _ => Err(StitchError::UnknownSource(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_round_trips_through_str() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_source_kind_accepts_singular_and_case() {
        assert_eq!("Payment".parse::<SourceKind>().unwrap(), SourceKind::Payments);
        assert_eq!(" tickets ".parse::<SourceKind>().unwrap(), SourceKind::Ticketing);
        assert!("crm".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_field_type_groups() {
        assert!(FieldType::Currency.is_numeric());
        assert!(!FieldType::Enum.is_numeric());
        assert!(FieldType::Timestamp.is_temporal());
    }
}
