//! Indel-based string similarity on a 0-100 scale, backed by `rapidfuzz`.
//!
//! `ratio` is `100 * (1 - indel_distance / (len_a + len_b))`, where the Indel
//! distance counts insertions and deletions only. Lengths are in `char`s.

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;

#[allow(clippy::cast_precision_loss)]
fn normalized_similarity(distance: usize, total_len: usize) -> f64 {
    if total_len == 0 {
        return 100.0;
    }
    100.0 * (1.0 - distance as f64 / total_len as f64)
}

/// Normalized Indel similarity of two strings. Two empty strings score 100.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Order-independent token-set similarity.
///
/// Splits both inputs on whitespace into token sets, then compares the sorted
/// intersection against each side's intersection-plus-remainder string and
/// the two remainders against each other, returning the best score. Shared
/// tokens with nothing left over on one side score 100; an empty input
/// scores 0.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab_joined = diff_ab.join(" ");
    let diff_ba_joined = diff_ba.join(" ");
    let ab_len = diff_ab_joined.chars().count();
    let ba_len = diff_ba_joined.chars().count();
    let sect_len = intersection.join(" ").chars().count();
    let separator = usize::from(sect_len > 0);

    let sect_ab_len = sect_len + separator + ab_len;
    let sect_ba_len = sect_len + separator + ba_len;

    let remainder_distance = indel::distance(diff_ab_joined.chars(), diff_ba_joined.chars());
    let remainder_score = normalized_similarity(remainder_distance, sect_ab_len + sect_ba_len);
    if sect_len == 0 {
        return remainder_score;
    }

    // The intersection is a prefix of both combined strings, so their Indel
    // distance from it is just the appended remainder.
    let sect_ab_score = normalized_similarity(separator + ab_len, sect_len + sect_ab_len);
    let sect_ba_score = normalized_similarity(separator + ba_len, sect_len + sect_ba_len);

    remainder_score.max(sect_ab_score).max(sect_ba_score)
}
