//! Scores every registered schema as an explanation of a CSV's headers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{DetectionConfig, MappingConfig};
use crate::input::RawRow;
use crate::mapping::{MappingEngine, MappingSuggestion};
use crate::schema::{builtin_schemas, SourceKind, SourceSchema};

/// How well one schema explains a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub source: SourceKind,
    /// Weighted composite score in [0, 1].
    pub confidence: f64,
    /// Headers mapped to some field of this schema.
    pub mapped_count: usize,
    /// Required fields that received a header.
    pub required_mapped: usize,
    /// Required fields in the schema.
    pub required_total: usize,
    /// Mean confidence of the mapped suggestions.
    pub avg_confidence: f64,
    /// Mapped headers over schema fields.
    pub coverage: f64,
}

impl DetectionResult {
    /// Whether every required field of the schema is mapped.
    pub fn all_required_mapped(&self) -> bool {
        self.required_mapped == self.required_total
    }
}

/// Runs the mapping engine against each candidate schema.
pub struct SourceDetector<'s> {
    schemas: Vec<&'s SourceSchema>,
    mapping: MappingConfig,
    config: DetectionConfig,
}

impl SourceDetector<'static> {
    /// Detector over the built-in schemas with default thresholds.
    pub fn new() -> Self {
        Self::with_schemas(builtin_schemas().iter().collect())
    }
}

impl Default for SourceDetector<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> SourceDetector<'s> {
    /// Detector over an explicit set of schemas.
    pub fn with_schemas(schemas: Vec<&'s SourceSchema>) -> Self {
        Self {
            schemas,
            mapping: MappingConfig::default(),
            config: DetectionConfig::default(),
        }
    }

    /// Override the mapping and detection thresholds.
    pub fn with_config(mut self, mapping: MappingConfig, config: DetectionConfig) -> Self {
        self.mapping = mapping;
        self.config = config;
        self
    }

    /// One result per schema, best first.
    ///
    /// Ties keep schema registration order.
    pub fn detect<S: AsRef<str>>(&self, headers: &[S], sample_rows: &[RawRow]) -> Vec<DetectionResult> {
        let mut results: Vec<DetectionResult> = self
            .schemas
            .iter()
            .map(|schema| {
                let engine = MappingEngine::with_config(schema, self.mapping.clone());
                let suggestions = engine.suggest(headers, sample_rows);
                self.score(schema, &suggestions)
            })
            .collect();

        results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        for result in &results {
            tracing::debug!(
                source = %result.source,
                confidence = result.confidence,
                mapped = result.mapped_count,
                required_mapped = result.required_mapped,
                required_total = result.required_total,
                "detection candidate"
            );
        }

        results
    }

    /// Composite score of one schema's suggestions.
    pub fn score(&self, schema: &SourceSchema, suggestions: &[MappingSuggestion]) -> DetectionResult {
        let mapped: Vec<&MappingSuggestion> = suggestions.iter().filter(|s| s.is_mapped()).collect();
        let mapped_fields: HashSet<&str> = mapped
            .iter()
            .filter_map(|s| s.schema_field.as_deref())
            .collect();

        let mapped_count = mapped.len();
        let avg_confidence = if mapped.is_empty() {
            0.0
        } else {
            mapped.iter().map(|s| s.confidence).sum::<f64>() / mapped_count as f64
        };

        let coverage = if schema.fields.is_empty() {
            0.0
        } else {
            mapped_count as f64 / schema.fields.len() as f64
        };

        let required_total = schema.required_count();
        let required_mapped = schema
            .required_fields()
            .filter(|f| mapped_fields.contains(f.key.as_str()))
            .count();
        let required_coverage = if required_total == 0 {
            1.0
        } else {
            required_mapped as f64 / required_total as f64
        };

        let weights = &self.config.weights;
        let confidence = weights.avg_confidence * avg_confidence
            + weights.coverage * coverage
            + weights.required_coverage * required_coverage;

        DetectionResult {
            source: schema.source,
            confidence,
            mapped_count,
            required_mapped,
            required_total,
            avg_confidence,
            coverage,
        }
    }

    /// Whether the top result can be used without asking a human.
    ///
    /// Requires a strong enough top score, every required field of the top
    /// schema mapped, and a clear gap to the runner-up.
    pub fn is_confident(&self, results: &[DetectionResult]) -> bool {
        let Some(top) = results.first() else {
            return false;
        };

        if top.confidence < self.config.min_confidence || !top.all_required_mapped() {
            return false;
        }

        match results.get(1) {
            Some(runner_up) => top.confidence - runner_up.confidence >= self.config.min_margin,
            None => true,
        }
    }
}

/// Rank the built-in schemas for a file, best first.
pub fn detect_source<S: AsRef<str>>(headers: &[S], sample_rows: &[RawRow]) -> Vec<DetectionResult> {
    SourceDetector::new().detect(headers, sample_rows)
}

/// Default confident-detection gate.
pub fn is_confident_detection(results: &[DetectionResult]) -> bool {
    SourceDetector::new().is_confident(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(source: SourceKind, confidence: f64, required_mapped: usize) -> DetectionResult {
        DetectionResult {
            source,
            confidence,
            mapped_count: 3,
            required_mapped,
            required_total: 3,
            avg_confidence: confidence,
            coverage: 0.5,
        }
    }

    #[test]
    fn test_gate_empty() {
        assert!(!is_confident_detection(&[]));
    }

    #[test]
    fn test_gate_single_candidate() {
        assert!(is_confident_detection(&[result(SourceKind::Payments, 0.5, 3)]));
        assert!(!is_confident_detection(&[result(SourceKind::Payments, 0.49, 3)]));
    }

    #[test]
    fn test_gate_requires_all_required_fields() {
        let results = [
            result(SourceKind::Payments, 0.99, 2),
            result(SourceKind::Ticketing, 0.1, 0),
        ];
        assert!(!is_confident_detection(&results));
    }

    #[test]
    fn test_gate_requires_margin() {
        let close = [
            result(SourceKind::Payments, 0.90, 3),
            result(SourceKind::Ticketing, 0.80, 3),
        ];
        assert!(!is_confident_detection(&close));

        let clear = [
            result(SourceKind::Payments, 0.90, 3),
            result(SourceKind::Ticketing, 0.70, 3),
        ];
        assert!(is_confident_detection(&clear));
    }

    #[test]
    fn test_score_weights() {
        let schema = crate::schema::schema_for(SourceKind::Payments);
        let suggestions = vec![
            MappingSuggestion {
                csv_header: "Email".into(),
                schema_field: Some("email".into()),
                confidence: 1.0,
                match_type: crate::mapping::MatchType::Exact,
            },
            MappingSuggestion {
                csv_header: "Total".into(),
                schema_field: Some("amount".into()),
                confidence: 0.5,
                match_type: crate::mapping::MatchType::Similarity,
            },
            MappingSuggestion::unmapped("Notes"),
        ];

        let r = SourceDetector::new().score(schema, &suggestions);
        assert_eq!(r.mapped_count, 2);
        assert_eq!(r.required_mapped, 2);
        assert_eq!(r.required_total, 4);
        // 0.4 * 0.75 + 0.2 * (2/8) + 0.4 * (2/4)
        assert!((r.confidence - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_schema_without_required_fields_has_full_required_coverage() {
        let mut schema = crate::schema::schema_for(SourceKind::Payments).clone();
        for field in &mut schema.fields {
            field.required = false;
        }
        let r = SourceDetector::new().score(&schema, &[MappingSuggestion::unmapped("x")]);
        assert_eq!(r.required_total, 0);
        assert!((r.confidence - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_detect_is_sorted() {
        let results = detect_source(&["Ticket ID", "Subject", "Requester Email", "Created At"], &[]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source, SourceKind::Ticketing);
        assert!(results.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }
}
