//! Keyword grouping: one cheapest pick per staple item across retailers.

use basketiq_core::{GroupRule, Product};
use serde::Serialize;

/// Products matching one keyword rule, cheapest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductGroup {
    pub keyword: String,
    pub recommended: Product,
    pub others: Vec<Product>,
}

fn rule_matches(rule: &GroupRule, lower_name: &str) -> bool {
    lower_name.contains(&rule.keyword.to_lowercase())
        && !rule
            .exclude
            .iter()
            .any(|ex| lower_name.contains(&ex.to_lowercase()))
}

/// Applies each rule in order and returns one group per rule that matched at
/// least one product. A product may land in several groups.
#[must_use]
pub fn group_by_keyword(products: &[Product], rules: &[GroupRule]) -> Vec<ProductGroup> {
    let lower_names: Vec<String> = products.iter().map(|p| p.name.to_lowercase()).collect();

    rules
        .iter()
        .filter_map(|rule| {
            let mut matched: Vec<&Product> = products
                .iter()
                .zip(&lower_names)
                .filter(|(_, name)| rule_matches(rule, name))
                .map(|(p, _)| p)
                .collect();
            matched.sort_by(|a, b| a.current_price.total_cmp(&b.current_price));

            let mut matched = matched.into_iter().cloned();
            let recommended = matched.next()?;
            Some(ProductGroup {
                keyword: rule.keyword.clone(),
                recommended,
                others: matched.collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use basketiq_core::catalog::default_group_rules;

    use super::*;
    use crate::test_support::product;

    #[test]
    fn banana_and_onion_products_form_their_own_groups() {
        let products = vec![
            product(1, "Test Banana Product", 1.00),
            product(2, "Test Onion Product", 0.80),
        ];

        let groups = group_by_keyword(&products, &default_group_rules());

        let banana = groups.iter().find(|g| g.keyword == "banana").expect("banana group");
        assert_eq!(banana.recommended.id, 1);
        assert!(banana.others.is_empty());

        let onion = groups.iter().find(|g| g.keyword == "onion").expect("onion group");
        assert_eq!(onion.recommended.id, 2);
    }

    #[test]
    fn cheapest_is_recommended_and_others_ascend() {
        let products = vec![
            product(1, "Fairtrade Bananas", 1.20),
            product(2, "Bananas Loose", 0.90),
            product(3, "Organic Bananas", 1.50),
        ];
        let rules = vec![GroupRule::new("banana", &[])];

        let groups = group_by_keyword(&products, &rules);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].recommended.id, 2);
        let others: Vec<i64> = groups[0].others.iter().map(|p| p.id).collect();
        assert_eq!(others, vec![1, 3]);
    }

    #[test]
    fn exclusions_filter_derived_products() {
        let products = vec![
            product(1, "Bananas", 1.00),
            product(2, "Banana Yogurt", 0.50),
        ];
        let rules = vec![GroupRule::new("banana", &["yogurt"])];

        let groups = group_by_keyword(&products, &rules);
        assert_eq!(groups[0].recommended.id, 1);
        assert!(groups[0].others.is_empty());
    }

    #[test]
    fn rules_without_matches_produce_no_group() {
        let products = vec![product(1, "Bananas", 1.00)];
        let rules = vec![GroupRule::new("rice", &[]), GroupRule::new("banana", &[])];

        let groups = group_by_keyword(&products, &rules);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keyword, "banana");
    }

    #[test]
    fn product_may_appear_in_several_groups() {
        let products = vec![product(1, "Carrot and Onion Mix", 1.10)];
        let rules = vec![GroupRule::new("onion", &[]), GroupRule::new("carrot", &[])];

        let groups = group_by_keyword(&products, &rules);
        let keywords: Vec<&str> = groups.iter().map(|g| g.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["onion", "carrot"]);
    }
}
