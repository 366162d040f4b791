//! Matcher strategies scoring one header against one schema field.
//!
//! The strategies run in [`MatchStrategy::ORDER`]. Each returns an optional
//! candidate; the engine keeps a candidate only when it is strictly better
//! than the best seen so far, so ties go to the earlier field and the
//! earlier strategy.

use crate::config::MappingConfig;
use crate::input::RawRow;
use crate::schema::SchemaField;

use super::normalize::normalize_header;
use super::similarity::{check_sample_pattern, dice_coefficient};
use super::suggestion::MatchType;

/// A header prepared for matching.
#[derive(Debug, Clone)]
pub struct HeaderEvidence<'a> {
    /// Header as written in the file.
    pub raw: &'a str,
    /// Normalized header.
    pub normalized: String,
    /// Sample rows for pattern evidence.
    pub samples: &'a [RawRow],
}

impl<'a> HeaderEvidence<'a> {
    pub fn new(raw: &'a str, samples: &'a [RawRow]) -> Self {
        Self {
            raw,
            normalized: normalize_header(raw),
            samples,
        }
    }
}

/// A schema field with its names normalized once.
#[derive(Debug, Clone)]
pub struct NormalizedField<'s> {
    pub field: &'s SchemaField,
    pub key: String,
    pub label: String,
    pub aliases: Vec<String>,
}

impl<'s> NormalizedField<'s> {
    pub fn new(field: &'s SchemaField) -> Self {
        Self {
            field,
            key: normalize_header(&field.key),
            label: normalize_header(&field.label),
            aliases: field.aliases.iter().map(|a| normalize_header(a)).collect(),
        }
    }
}

/// A scored (header, field) pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub confidence: f64,
    pub match_type: MatchType,
}

/// One way of matching a header to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Exact,
    Alias,
    Similarity,
    Pattern,
}

impl MatchStrategy {
    /// Evaluation order.
    pub const ORDER: [MatchStrategy; 4] = [
        MatchStrategy::Exact,
        MatchStrategy::Alias,
        MatchStrategy::Similarity,
        MatchStrategy::Pattern,
    ];

    /// Score `header` against `field`, or `None` if this strategy does not apply.
    pub fn evaluate(
        self,
        header: &HeaderEvidence<'_>,
        field: &NormalizedField<'_>,
        config: &MappingConfig,
    ) -> Option<Candidate> {
        let h = header.normalized.as_str();
        if h.is_empty() && self != MatchStrategy::Pattern {
            return None;
        }

        match self {
            MatchStrategy::Exact => (h == field.key || h == field.label).then_some(Candidate {
                confidence: 1.0,
                match_type: MatchType::Exact,
            }),
            MatchStrategy::Alias => field.aliases.iter().any(|a| a == h).then_some(Candidate {
                confidence: config.alias_confidence,
                match_type: MatchType::Alias,
            }),
            MatchStrategy::Similarity => {
                let best = field
                    .aliases
                    .iter()
                    .map(|a| dice_coefficient(h, a))
                    .fold(
                        dice_coefficient(h, &field.key).max(dice_coefficient(h, &field.label)),
                        f64::max,
                    );
                (best > config.similarity_floor).then(|| Candidate {
                    confidence: best.min(config.similarity_cap),
                    match_type: MatchType::Similarity,
                })
            }
            MatchStrategy::Pattern => {
                let pattern = field.field.sample_pattern.as_ref()?;
                let score =
                    check_sample_pattern(header.samples, header.raw, pattern, config.pattern_weight);
                (score > config.pattern_floor).then_some(Candidate {
                    confidence: score,
                    match_type: MatchType::Pattern,
                })
            }
        }
    }
}

/// Best candidate for `header` against a single field.
///
/// An exact match ends the evaluation for this field.
pub fn best_for_field(
    header: &HeaderEvidence<'_>,
    field: &NormalizedField<'_>,
    config: &MappingConfig,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for strategy in MatchStrategy::ORDER {
        if let Some(candidate) = strategy.evaluate(header, field, config) {
            if best.is_none_or(|b| candidate.confidence > b.confidence) {
                best = Some(candidate);
            }
            if candidate.match_type == MatchType::Exact {
                break;
            }
        }
    }
    best
}
