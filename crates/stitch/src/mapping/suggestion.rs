//! Mapping suggestion types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How a header was matched to a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Header equals the field key or label.
    Exact,
    /// Header equals a declared alias.
    Alias,
    /// Header is textually close to the key, label or an alias.
    Similarity,
    /// Sample values look like the field's values.
    Pattern,
    /// No confident match.
    None,
}

impl MatchType {
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Alias => "alias",
            MatchType::Similarity => "similarity",
            MatchType::Pattern => "pattern",
            MatchType::None => "none",
        }
    }
}

/// Best-effort mapping of one CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSuggestion {
    /// Header as written in the file.
    pub csv_header: String,
    /// Matched field key; `None` means the header needs review.
    pub schema_field: Option<String>,
    /// Confidence in [0, 1]; 0 when unmapped.
    pub confidence: f64,
    pub match_type: MatchType,
}

impl MappingSuggestion {
    /// A suggestion for a header with no confident match.
    pub fn unmapped(csv_header: impl Into<String>) -> Self {
        Self {
            csv_header: csv_header.into(),
            schema_field: None,
            confidence: 0.0,
            match_type: MatchType::None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.schema_field.is_some()
    }
}

/// Finalized header → field key mapping, in file column order.
pub type FieldMapping = IndexMap<String, String>;

/// Keep only mapped suggestions as a header → field key map.
pub fn suggestions_to_mapping(suggestions: &[MappingSuggestion]) -> FieldMapping {
    suggestions
        .iter()
        .filter_map(|s| {
            s.schema_field
                .as_ref()
                .map(|field| (s.csv_header.clone(), field.clone()))
        })
        .collect()
}
