//! Spec-similarity grouping: partition products by pack weight, pack count,
//! and a fuzzy comparison of the remaining descriptive words.

use std::sync::LazyLock;

use basketiq_core::{BaseUnit, Product};
use regex::Regex;

use crate::fuzz::ratio;

/// Minimum (inclusive) match score for two products to share a group.
pub const SPEC_MATCH_THRESHOLD: f64 = 0.7;

static WEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kg|g|ml|l)\b").expect("valid weight regex")
});

static COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:pack|pk|x)\b|\bpack\s+of\s+(\d+)").expect("valid count regex")
});

/// Scaled weights are compared exactly, so `1.1kg` must land on `1100.0`.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Comparable attributes pulled out of a product name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSpecs {
    /// Pack weight or volume, scaled to grams or milliliters.
    pub weight: Option<(f64, BaseUnit)>,
    pub count: Option<u32>,
    /// Lower-cased alphabetic words left after removing weight and count.
    pub variety: String,
}

impl ProductSpecs {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let weight = WEIGHT.captures(name).and_then(|caps| {
            let amount = caps[1].parse::<f64>().ok()?;
            Some(match caps[2].to_lowercase().as_str() {
                "kg" => (round3(amount * 1000.0), BaseUnit::Grams),
                "g" => (round3(amount), BaseUnit::Grams),
                "l" => (round3(amount * 1000.0), BaseUnit::Milliliters),
                _ => (round3(amount), BaseUnit::Milliliters),
            })
        });

        let count = COUNT.captures(name).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        });

        let stripped = WEIGHT.replace_all(name, " ");
        let stripped = COUNT.replace_all(&stripped, " ");
        let variety = stripped
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().all(char::is_alphabetic))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            weight,
            count,
            variety,
        }
    }

    /// `0.4 * (weight equal) + 0.4 * (count equal) + 0.2 * variety ratio`.
    /// Two missing values count as equal.
    #[must_use]
    pub fn match_score(&self, other: &Self) -> f64 {
        let weight_score = if self.weight == other.weight { 1.0 } else { 0.0 };
        let count_score = if self.count == other.count { 1.0 } else { 0.0 };
        let variety_score = ratio(&self.variety, &other.variety) / 100.0;
        0.4 * weight_score + 0.4 * count_score + 0.2 * variety_score
    }
}

/// Greedy single-pass partition. Each unplaced product seeds a group and
/// pulls in every later unplaced product scoring at least
/// [`SPEC_MATCH_THRESHOLD`] against it.
#[must_use]
pub fn group_by_specs(products: &[Product]) -> Vec<Vec<&Product>> {
    let specs: Vec<ProductSpecs> = products
        .iter()
        .map(|p| ProductSpecs::from_name(&p.name))
        .collect();
    let mut placed = vec![false; products.len()];
    let mut groups = Vec::new();

    for seed in 0..products.len() {
        if placed[seed] {
            continue;
        }
        placed[seed] = true;
        let mut group = vec![&products[seed]];

        for candidate in (seed + 1)..products.len() {
            if placed[candidate] {
                continue;
            }
            if specs[seed].match_score(&specs[candidate]) >= SPEC_MATCH_THRESHOLD {
                placed[candidate] = true;
                group.push(&products[candidate]);
            }
        }
        groups.push(group);
    }

    groups
}
