//! Column-mapping inference: which CSV header holds which schema field.

mod engine;
mod matcher;
mod normalize;
mod similarity;
mod suggestion;

pub use engine::{
    apply_overrides, generate_mapping_suggestions, resolve_conflicts, unmapped_required_fields,
    MappingEngine, MappingOverrides, ScoredHeader,
};
pub use matcher::{best_for_field, Candidate, HeaderEvidence, MatchStrategy, NormalizedField};
pub use normalize::normalize_header;
pub use similarity::{check_sample_pattern, dice_coefficient};
pub use suggestion::{suggestions_to_mapping, FieldMapping, MappingSuggestion, MatchType};
