use super::*;
use crate::test_support::product;

// -----------------------------------------------------------------------
// preprocess_name
// -----------------------------------------------------------------------

#[test]
fn preprocess_drops_stop_words_and_numbers() {
    assert_eq!(
        preprocess_name("Muller Corner Banana Yogurt with Chocolate Flakes 4 x 124g"),
        "muller banana chocolate x 124g"
    );
}

#[test]
fn preprocess_keeps_mixed_alphanumeric_tokens() {
    assert_eq!(preprocess_name("Whole Milk 2L"), "whole milk 2l");
}

// -----------------------------------------------------------------------
// is_main_product
// -----------------------------------------------------------------------

#[test]
fn whole_token_match() {
    assert!(is_main_product("Red Pepper Each", "pepper"));
    assert!(is_main_product("Semi-Skimmed Milk 2L", "Milk"));
}

#[test]
fn synonym_substring_match() {
    assert!(is_main_product("Brown Onions 1kg", "onion"));
    assert!(is_main_product("Yellow Peppers", "pepper"));
    assert!(is_main_product("Chicken Breast Fillets 300g", "Chicken Breast"));
}

#[test]
fn derived_products_are_not_main_products() {
    assert!(!is_main_product("Banana Milkshake", "milk"));
    assert!(!is_main_product("Orange Juice 1L", "banana"));
}

#[test]
fn blank_search_term_matches_nothing() {
    assert!(!is_main_product("Bananas", "   "));
    assert!(!is_main_product("Bananas", "yogurt"));
}

// -----------------------------------------------------------------------
// best_match / select_candidates
// -----------------------------------------------------------------------

#[test]
fn best_match_applies_strict_threshold() {
    let products = vec![
        product(1, "Organic Bananas 5 Pack", 1.49),
        product(2, "Banana Bread", 2.00),
        product(3, "Whole Milk 2L", 1.55),
    ];

    let matches = best_match(&products, "banana");
    let ids: Vec<i64> = matches.iter().map(|(p, _)| p.id).collect();
    assert_eq!(ids, vec![2]);
    assert!((matches[0].1 - 100.0).abs() < f64::EPSILON);
}

#[test]
fn best_match_sorts_descending_and_keeps_ties_stable() {
    let products = vec![
        product(1, "Carrots Loose", 0.50),
        product(2, "Carrots", 0.45),
        product(3, "Carrots 1kg", 0.60),
    ];

    let matches = best_match(&products, "carrots");
    let ids: Vec<i64> = matches.iter().map(|(p, _)| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn select_candidates_adds_main_product_hits() {
    let products = vec![
        product(1, "Organic Bananas 5 Pack", 1.49),
        product(2, "Banana Bread", 2.00),
        product(3, "Whole Milk 2L", 1.55),
    ];

    let candidates = select_candidates(&products, "banana");
    let ids: Vec<i64> = candidates.iter().map(|(p, _)| p.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(candidates[1].1 <= FUZZY_MATCH_THRESHOLD);
}
