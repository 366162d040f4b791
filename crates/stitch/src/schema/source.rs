//! Per-source schema definition.

use serde::{Deserialize, Serialize};

use super::field::SchemaField;
use super::types::SourceKind;

/// The canonical shape of one source's export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSchema {
    pub source: SourceKind,
    /// Display name.
    pub label: String,
    /// Table that validated records of this source are written to.
    pub table: String,
    /// Fields in declaration order.
    pub fields: Vec<SchemaField>,
    /// Key of the field holding the source system's record identifier.
    pub id_field: String,
    /// Key of the field holding the customer's email.
    pub email_field: String,
    /// Key of the field holding the customer's name.
    pub name_field: String,
}

impl SourceSchema {
    /// Get a field by key.
    pub fn field(&self, key: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Whether a field with this key exists.
    pub fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// All required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Number of required fields.
    pub fn required_count(&self) -> usize {
        self.required_fields().count()
    }

    /// Fields with required ones first, otherwise in declaration order.
    ///
    /// A display hint only; matching always walks [`SourceSchema::fields`].
    pub fn fields_required_first(&self) -> Vec<&SchemaField> {
        let mut fields: Vec<&SchemaField> = self.fields.iter().collect();
        fields.sort_by_key(|f| !f.required);
        fields
    }
}
