//! Schema field definition.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::FieldType;

/// One canonical field of a source schema.
///
/// Fields are static configuration: built once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    /// Canonical field id, unique within a schema.
    pub key: String,
    /// Display name.
    pub label: String,
    /// Expected value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether every row must carry a value.
    pub required: bool,
    /// Known alternate header spellings, in priority order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// What values in this field look like.
    #[serde(default, with = "pattern_serde", skip_serializing_if = "Option::is_none")]
    pub sample_pattern: Option<Regex>,
    /// Allowed normalized values when the type is [`FieldType::Enum`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl SchemaField {
    /// Create an optional field with no aliases or pattern.
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            required: false,
            aliases: Vec::new(),
            sample_pattern: None,
            enum_values: Vec::new(),
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the alternate header spellings.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sample-value pattern.
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.sample_pattern = Some(pattern);
        self
    }

    /// Set the allowed enum values.
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `value` (already lower-cased) is an allowed enum value.
    pub fn allows(&self, value: &str) -> bool {
        self.enum_values.iter().any(|v| v == value)
    }
}

mod pattern_serde {
    use regex::Regex;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pattern: &Option<Regex>, serializer: S) -> Result<S::Ok, S::Error> {
        match pattern {
            Some(re) => serializer.serialize_some(re.as_str()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Regex>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| Regex::new(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
