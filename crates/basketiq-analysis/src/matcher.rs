//! Search-intent matching: does a listing name mean what the shopper typed?

use basketiq_core::catalog::{SEARCH_SYNONYMS, STOP_WORDS};
use basketiq_core::Product;

use crate::fuzz::token_set_ratio;

/// Minimum (exclusive) token-set score for a fuzzy match.
pub const FUZZY_MATCH_THRESHOLD: f64 = 65.0;

/// Lower-cases a name and drops stop words and purely numeric tokens.
#[must_use]
pub fn preprocess_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word) && !is_numeric(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_numeric(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_numeric)
}

/// True when the cleaned search term is a whole token of the cleaned name,
/// or when a catalog synonym for the term appears in the cleaned name.
#[must_use]
pub fn is_main_product(name: &str, search_term: &str) -> bool {
    let clean_name = preprocess_name(name);
    let clean_search = preprocess_name(search_term);
    if clean_search.is_empty() {
        return false;
    }

    if clean_name.split_whitespace().any(|token| token == clean_search) {
        return true;
    }

    SEARCH_SYNONYMS
        .iter()
        .find(|(key, _)| preprocess_name(key) == clean_search)
        .is_some_and(|(_, synonyms)| {
            synonyms
                .iter()
                .map(|s| preprocess_name(s))
                .any(|s| !s.is_empty() && clean_name.contains(&s))
        })
}

fn score(product: &Product, clean_search: &str) -> f64 {
    token_set_ratio(&preprocess_name(&product.name), clean_search)
}

fn sort_by_score_desc(matches: &mut [(&Product, f64)]) {
    matches.sort_by(|a, b| b.1.total_cmp(&a.1));
}

/// Products whose token-set score against the search term is strictly above
/// [`FUZZY_MATCH_THRESHOLD`], best first. Ties keep input order.
#[must_use]
pub fn best_match<'a>(products: &'a [Product], search_term: &str) -> Vec<(&'a Product, f64)> {
    let clean_search = preprocess_name(search_term);
    let mut matches: Vec<(&Product, f64)> = products
        .iter()
        .map(|p| (p, score(p, &clean_search)))
        .filter(|(_, s)| *s > FUZZY_MATCH_THRESHOLD)
        .collect();
    sort_by_score_desc(&mut matches);
    matches
}

/// Union of fuzzy matches and main-product hits, best score first.
#[must_use]
pub fn select_candidates<'a>(
    products: &'a [Product],
    search_term: &str,
) -> Vec<(&'a Product, f64)> {
    let clean_search = preprocess_name(search_term);
    let mut matches: Vec<(&Product, f64)> = products
        .iter()
        .map(|p| (p, score(p, &clean_search)))
        .filter(|(p, s)| *s > FUZZY_MATCH_THRESHOLD || is_main_product(&p.name, search_term))
        .collect();
    sort_by_score_desc(&mut matches);
    matches
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
