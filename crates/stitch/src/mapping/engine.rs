//! Mapping suggestion engine: CSV headers → schema fields.
//!
//! Runs in two pure steps. [`MappingEngine::score_headers`] finds the best
//! field for every header independently; [`resolve_conflicts`] then keeps
//! only the strongest header per field so the final mapping is injective.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::config::MappingConfig;
use crate::error::{Result, StitchError};
use crate::input::RawRow;
use crate::schema::{SchemaField, SourceSchema};

use super::matcher::{best_for_field, Candidate, HeaderEvidence, NormalizedField};
use super::suggestion::{FieldMapping, MappingSuggestion};

/// Best field found for one header before conflict resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHeader {
    pub csv_header: String,
    /// Winning field key and its candidate, if any field matched.
    pub best: Option<(String, Candidate)>,
}

/// Scores headers against one schema.
pub struct MappingEngine<'s> {
    schema: &'s SourceSchema,
    fields: Vec<NormalizedField<'s>>,
    config: MappingConfig,
}

impl<'s> MappingEngine<'s> {
    /// Create an engine with default thresholds.
    pub fn new(schema: &'s SourceSchema) -> Self {
        Self::with_config(schema, MappingConfig::default())
    }

    /// Create an engine with custom thresholds.
    pub fn with_config(schema: &'s SourceSchema, config: MappingConfig) -> Self {
        let fields = schema.fields.iter().map(NormalizedField::new).collect();
        Self {
            schema,
            fields,
            config,
        }
    }

    pub fn schema(&self) -> &'s SourceSchema {
        self.schema
    }

    /// One suggestion per header, in input order, with no field claimed twice.
    pub fn suggest<S: AsRef<str>>(&self, headers: &[S], sample_rows: &[RawRow]) -> Vec<MappingSuggestion> {
        resolve_conflicts(self.score_headers(headers, sample_rows))
    }

    /// Best field for every header, evaluated independently.
    ///
    /// Only the first `sample_rows` rows of the sample are consulted.
    pub fn score_headers<S: AsRef<str>>(&self, headers: &[S], sample_rows: &[RawRow]) -> Vec<ScoredHeader> {
        let samples = &sample_rows[..sample_rows.len().min(self.config.sample_rows)];

        headers
            .iter()
            .map(|header| {
                let evidence = HeaderEvidence::new(header.as_ref(), samples);
                let mut best: Option<(String, Candidate)> = None;

                for field in &self.fields {
                    if let Some(candidate) = best_for_field(&evidence, field, &self.config) {
                        let better = best
                            .as_ref()
                            .is_none_or(|(_, b)| candidate.confidence > b.confidence);
                        if better {
                            best = Some((field.field.key.clone(), candidate));
                        }
                    }
                }

                tracing::debug!(
                    schema = %self.schema.source,
                    header = evidence.raw,
                    field = best.as_ref().map(|(k, _)| k.as_str()),
                    confidence = best.as_ref().map(|(_, c)| c.confidence),
                    "scored header"
                );

                ScoredHeader {
                    csv_header: evidence.raw.to_string(),
                    best,
                }
            })
            .collect()
    }
}

/// Unmap every header that lost its field to a stronger header.
///
/// For each field the highest-confidence header wins; on a tie the header
/// that comes first in the file wins. Output order matches input order.
pub fn resolve_conflicts(scored: Vec<ScoredHeader>) -> Vec<MappingSuggestion> {
    let mut winners: HashMap<&str, (usize, f64)> = HashMap::new();
    for (index, header) in scored.iter().enumerate() {
        if let Some((field, candidate)) = &header.best {
            let entry = winners
                .entry(field.as_str())
                .or_insert((index, candidate.confidence));
            if candidate.confidence > entry.1 {
                *entry = (index, candidate.confidence);
            }
        }
    }

    let keep: Vec<bool> = scored
        .iter()
        .enumerate()
        .map(|(index, header)| match &header.best {
            Some((field, _)) => winners.get(field.as_str()).is_some_and(|(w, _)| *w == index),
            None => false,
        })
        .collect();

    scored
        .into_iter()
        .zip(keep)
        .map(|(header, keep)| match header.best {
            Some((field, candidate)) if keep => MappingSuggestion {
                csv_header: header.csv_header,
                schema_field: Some(field),
                confidence: candidate.confidence,
                match_type: candidate.match_type,
            },
            Some((field, _)) => {
                tracing::debug!(header = %header.csv_header, field = %field, "header lost field to a stronger match");
                MappingSuggestion::unmapped(header.csv_header)
            }
            None => MappingSuggestion::unmapped(header.csv_header),
        })
        .collect()
}

/// Suggest a mapping for `headers` against `schema` with default thresholds.
pub fn generate_mapping_suggestions<S: AsRef<str>>(
    headers: &[S],
    schema: &SourceSchema,
    sample_rows: &[RawRow],
) -> Vec<MappingSuggestion> {
    MappingEngine::new(schema).suggest(headers, sample_rows)
}

/// Required fields with no header mapped to them.
pub fn unmapped_required_fields<'s>(mapping: &FieldMapping, schema: &'s SourceSchema) -> Vec<&'s SchemaField> {
    schema
        .required_fields()
        .filter(|f| !mapping.values().any(|mapped| mapped == &f.key))
        .collect()
}

/// Manual corrections: header → field key, or `None` to unmap the header.
pub type MappingOverrides = IndexMap<String, Option<String>>;

/// Apply manual corrections on top of a suggested mapping.
///
/// Mapping a header to a field evicts any other header that held that
/// field, so the result stays injective.
pub fn apply_overrides(
    mapping: &FieldMapping,
    overrides: &MappingOverrides,
    schema: &SourceSchema,
) -> Result<FieldMapping> {
    let mut result = mapping.clone();

    for (header, target) in overrides {
        match target {
            Some(field) => {
                if !schema.has_field(field) {
                    return Err(StitchError::UnknownField {
                        schema: schema.source.to_string(),
                        field: field.clone(),
                    });
                }
                result.retain(|h, f| h == header || f != field);
                result.insert(header.clone(), field.clone());
            }
            None => {
                result.shift_remove(header);
            }
        }
    }

    Ok(result)
}
