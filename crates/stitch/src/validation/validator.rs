//! Row validation against a source schema.

use serde::{Deserialize, Serialize};

use crate::schema::{FieldType, SchemaField, SourceSchema};

use super::apply::MappedRow;
use super::coerce::{coerce_row, TypedRow};
use super::values::{is_valid_email, parse_currency, parse_timestamp};

/// One problem with one field of one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field key.
    pub field: String,
    /// Zero-based data row index.
    pub row: usize,
    /// Offending value; empty for missing values.
    pub value: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &SchemaField, row: usize, value: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.key.clone(),
            row,
            value: value.to_string(),
            message: message.into(),
        }
    }
}

/// Check every schema field of a mapped row.
///
/// All problems are reported, not just the first. Blank optional fields
/// are skipped.
pub fn validate_mapped_row(row: &MappedRow, schema: &SourceSchema, row_index: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for field in &schema.fields {
        let Some(value) = row.get(&field.key) else {
            if field.required {
                errors.push(ValidationError::new(field, row_index, "", "Required field missing"));
            }
            continue;
        };

        if let Some(message) = check_value(field, value) {
            errors.push(ValidationError::new(field, row_index, value, message));
        }
    }

    errors
}

fn check_value(field: &SchemaField, value: &str) -> Option<String> {
    match field.field_type {
        FieldType::Text => None,
        FieldType::Email => (!is_valid_email(value)).then(|| "Invalid email address".to_string()),
        FieldType::Number | FieldType::Currency => {
            parse_currency(value).is_none().then(|| "Invalid number".to_string())
        }
        FieldType::Date | FieldType::Timestamp => {
            parse_timestamp(value).is_none().then(|| "Invalid date".to_string())
        }
        FieldType::Enum => {
            let lowered = value.to_lowercase();
            (!field.allows(&lowered)).then(|| {
                format!(
                    "Invalid value, expected one of: {}",
                    field.enum_values.join(", ")
                )
            })
        }
    }
}

/// Validate a mapped row and, if it is clean, convert it to typed values.
pub fn validate_and_coerce(
    row: &MappedRow,
    schema: &SourceSchema,
    row_index: usize,
) -> Result<TypedRow, Vec<ValidationError>> {
    let errors = validate_mapped_row(row, schema, row_index);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(coerce_row(row, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{schema_for, SourceKind};

    fn payments() -> &'static SourceSchema {
        schema_for(SourceKind::Payments)
    }

    fn valid_row() -> MappedRow {
        [
            ("payment_id", "ch_123456"),
            ("email", "Jane@A.com"),
            ("amount", "$1,234.56"),
            ("created_at", "2024-01-15 10:00:00"),
            ("status", "succeeded"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_valid_row_has_no_errors() {
        assert!(validate_mapped_row(&valid_row(), payments(), 0).is_empty());
    }

    #[test]
    fn test_invalid_amount_yields_one_error() {
        let mut row = valid_row();
        row.set("amount", Some("abc".to_string()));

        let errors = validate_mapped_row(&row, payments(), 7);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "amount");
        assert_eq!(errors[0].row, 7);
        assert_eq!(errors[0].value, "abc");
    }

    #[test]
    fn test_errors_are_exhaustive() {
        let row: MappedRow = [("email", "not-an-email"), ("status", "paid")]
            .into_iter()
            .collect();

        let errors = validate_mapped_row(&row, payments(), 0);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["payment_id", "email", "amount", "status", "created_at"]);

        let missing = errors.iter().find(|e| e.field == "payment_id").unwrap();
        assert_eq!(missing.message, "Required field missing");
        assert_eq!(missing.value, "");
    }

    #[test]
    fn test_blank_optional_is_skipped() {
        let mut row = valid_row();
        row.set("currency", Some("   ".to_string()));
        row.set("status", None);
        assert!(validate_mapped_row(&row, payments(), 0).is_empty());
    }

    #[test]
    fn test_enum_is_case_insensitive() {
        let mut row = valid_row();
        row.set("status", Some("Refunded".to_string()));
        assert!(validate_mapped_row(&row, payments(), 0).is_empty());
    }

    #[test]
    fn test_valid_row_is_coerced() {
        let typed = validate_and_coerce(&valid_row(), payments(), 0).unwrap();
        assert_eq!(typed.len(), payments().fields.len());
    }

    #[test]
    fn test_coerce_refuses_invalid_rows() {
        let mut row = valid_row();
        row.set("created_at", Some("someday".to_string()));
        let errors = validate_and_coerce(&row, payments(), 3).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid date");
    }
}
