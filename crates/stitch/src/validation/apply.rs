//! Reshape raw CSV rows into schema-keyed rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::RawRow;
use crate::mapping::FieldMapping;

/// A row keyed by schema field, holding raw trimmed strings.
///
/// Nothing here is validated or parsed yet; blank values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappedRow {
    values: IndexMap<String, Option<String>>,
}

impl MappedRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field, if present and non-blank.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(|v| v.as_deref())
    }

    /// Set a field, storing blank values as `None`.
    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        self.values.insert(field.into(), value);
    }

    /// Whether the field was mapped at all (even if blank).
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MappedRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = MappedRow::new();
        for (k, v) in iter {
            row.set(k, Some(v.into()));
        }
        row
    }
}

/// Move each mapped header's trimmed value under its field key.
///
/// Headers outside the mapping are dropped; a mapped header missing from
/// the row yields `None`.
pub fn apply_mapping(raw_row: &RawRow, mapping: &FieldMapping) -> MappedRow {
    let mut row = MappedRow::new();
    for (header, field) in mapping {
        row.set(field.clone(), raw_row.get(header).cloned());
    }
    row
}
