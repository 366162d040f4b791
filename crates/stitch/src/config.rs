//! Tunable thresholds for mapping, detection and stitching.
//!
//! Every default reproduces the constants the engine was calibrated with.
//! Loading a partial JSON file only overrides the keys it names.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StitchError};
use crate::input::ParserConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
    /// CSV parser configuration.
    pub parser: ParserConfig,
    /// Header-to-field mapping thresholds.
    pub mapping: MappingConfig,
    /// Source detection weights and gate.
    pub detection: DetectionConfig,
    /// Identity stitching behaviour.
    pub stitching: StitchingConfig,
}

impl StitchConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| StitchError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: StitchConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make scores leave [0, 1].
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("mapping.alias_confidence", self.mapping.alias_confidence),
            ("mapping.similarity_floor", self.mapping.similarity_floor),
            ("mapping.similarity_cap", self.mapping.similarity_cap),
            ("mapping.pattern_floor", self.mapping.pattern_floor),
            ("mapping.pattern_weight", self.mapping.pattern_weight),
            ("detection.min_confidence", self.detection.min_confidence),
            ("detection.min_margin", self.detection.min_margin),
            (
                "stitching.inline_conflict_confidence",
                self.stitching.inline_conflict_confidence,
            ),
            (
                "stitching.scan_conflict_confidence",
                self.stitching.scan_conflict_confidence,
            ),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(StitchError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        let weights = &self.detection.weights;
        let total = weights.avg_confidence + weights.coverage + weights.required_coverage;
        if (total - 1.0).abs() > 1e-9 {
            return Err(StitchError::Config(format!(
                "detection weights must sum to 1, got {}",
                total
            )));
        }

        if self.mapping.sample_rows == 0 {
            return Err(StitchError::Config(
                "mapping.sample_rows must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Thresholds used by the mapping suggestion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Number of parsed rows inspected for sample-pattern evidence.
    pub sample_rows: usize,
    /// Confidence assigned to an alias match.
    pub alias_confidence: f64,
    /// Similarity must exceed this to count as a match.
    pub similarity_floor: f64,
    /// Upper bound for similarity matches, kept below alias confidence.
    pub similarity_cap: f64,
    /// Pattern score must exceed this to count as a match.
    pub pattern_floor: f64,
    /// Multiplier applied to the fraction of sample values matching a pattern.
    pub pattern_weight: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            sample_rows: 5,
            alias_confidence: 0.95,
            similarity_floor: 0.6,
            similarity_cap: 0.9,
            pattern_floor: 0.3,
            pattern_weight: 0.85,
        }
    }
}

/// Weights of the composite detection score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionWeights {
    pub avg_confidence: f64,
    pub coverage: f64,
    pub required_coverage: f64,
}

impl Default for DetectionWeights {
    fn default() -> Self {
        Self {
            avg_confidence: 0.4,
            coverage: 0.2,
            required_coverage: 0.4,
        }
    }
}

/// Source detection scoring and the confident-detection gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub weights: DetectionWeights,
    /// Minimum composite confidence of the top candidate.
    pub min_confidence: f64,
    /// Minimum gap between the top candidate and the runner-up.
    pub min_margin: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            weights: DetectionWeights::default(),
            min_confidence: 0.5,
            min_margin: 0.15,
        }
    }
}

/// Identity stitching behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchingConfig {
    /// Maximum number of same-name customers fetched per lookup.
    pub name_match_limit: usize,
    /// Confidence recorded on conflicts flagged while stitching a row.
    pub inline_conflict_confidence: f64,
    /// Confidence recorded on conflicts flagged by the post-import scan.
    pub scan_conflict_confidence: f64,
    /// Flag every same-name customer with a different email, not only
    /// when the name lookup returns exactly one customer.
    pub flag_all_name_matches: bool,
}

impl Default for StitchingConfig {
    fn default() -> Self {
        Self {
            name_match_limit: 5,
            inline_conflict_confidence: 0.6,
            scan_conflict_confidence: 0.5,
            flag_all_name_matches: true,
        }
    }
}
