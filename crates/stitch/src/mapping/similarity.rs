//! Bigram similarity and sample-value pattern evidence.

use std::collections::HashMap;

use regex::Regex;

use crate::input::RawRow;

/// Dice coefficient over character bigrams of two normalized strings.
///
/// Each bigram occurrence in `a` can be matched at most once, so repeated
/// bigrams are counted as a multiset. Identical strings score 1; otherwise
/// a string too short to form a bigram scores 0.
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.len() < 2 || b_chars.len() < 2 {
        return 0.0;
    }

    let mut remaining: HashMap<(char, char), usize> = HashMap::new();
    for pair in a_chars.windows(2) {
        *remaining.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut matched = 0usize;
    for pair in b_chars.windows(2) {
        if let Some(count) = remaining.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                matched += 1;
            }
        }
    }

    let total = (a_chars.len() - 1) + (b_chars.len() - 1);
    (2 * matched) as f64 / total as f64
}

/// Fraction of non-empty sample values under `header` matching `pattern`,
/// scaled by `weight`.
///
/// Returns 0 when the header is absent from every sample row or all its
/// values are blank.
pub fn check_sample_pattern(sample_rows: &[RawRow], header: &str, pattern: &Regex, weight: f64) -> f64 {
    let values: Vec<&str> = sample_rows
        .iter()
        .filter_map(|row| row.get(header))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();

    if values.is_empty() {
        return 0.0;
    }

    let matches = values.iter().filter(|v| pattern.is_match(v)).count();
    (matches as f64 / values.len() as f64) * weight
}
