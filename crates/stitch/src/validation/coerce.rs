//! Typed values for rows that passed validation.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{FieldType, SchemaField, SourceSchema};

use super::apply::MappedRow;
use super::values::{parse_currency, parse_timestamp};

/// A validated, typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Text(String),
    Email(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
    Enum(String),
}

impl FieldValue {
    /// The value as text, if it is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Email(s) | FieldValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// Typed values keyed by field, in schema order.
pub type TypedRow = IndexMap<String, FieldValue>;

/// Convert every schema field of a row to its typed value.
///
/// Meant for rows that already validated. A value that still fails to
/// parse is kept as [`FieldValue::Text`] rather than dropped.
pub fn coerce_row(row: &MappedRow, schema: &SourceSchema) -> TypedRow {
    schema
        .fields
        .iter()
        .map(|field| (field.key.clone(), coerce_value(field, row.get(&field.key))))
        .collect()
}

fn coerce_value(field: &SchemaField, value: Option<&str>) -> FieldValue {
    let Some(value) = value else {
        return FieldValue::Null;
    };

    match field.field_type {
        FieldType::Text => FieldValue::Text(value.to_string()),
        FieldType::Email => FieldValue::Email(value.to_lowercase()),
        FieldType::Number | FieldType::Currency => parse_currency(value)
            .map_or_else(|| FieldValue::Text(value.to_string()), FieldValue::Number),
        FieldType::Date | FieldType::Timestamp => parse_timestamp(value)
            .map_or_else(|| FieldValue::Text(value.to_string()), FieldValue::Timestamp),
        FieldType::Enum => FieldValue::Enum(value.to_lowercase()),
    }
}
