//! Read-side reports: best deals for a search term and keyword groups.

use basketiq_analysis::{
    analyze_product, best_deals, group_by_keyword, select_candidates, ProductAnalysis,
    ProductGroup,
};
use basketiq_core::{Category, GroupRule, PriceStore, ProductFilter};

const HISTORY_WINDOW: usize = 30;

/// Candidates for `term`, analyzed and ordered best deal first.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub(crate) async fn find_deals<S>(
    store: &S,
    term: &str,
    limit: usize,
) -> anyhow::Result<Vec<ProductAnalysis>>
where
    S: PriceStore + ?Sized,
{
    let products = store.list_products(&ProductFilter::default()).await?;

    let mut analyses = Vec::new();
    for (product, score) in select_candidates(&products, term) {
        tracing::debug!(product = %product.name, score, "candidate");
        let history = store
            .recent_price_history(product.id, HISTORY_WINDOW)
            .await?;
        analyses.push(analyze_product(product, &history));
    }

    let mut deals = best_deals(analyses);
    deals.truncate(limit);
    Ok(deals)
}

/// Keyword groups over the whole catalog, or one category of it.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub(crate) async fn keyword_groups<S>(
    store: &S,
    rules: &[GroupRule],
    category: Option<Category>,
) -> anyhow::Result<Vec<ProductGroup>>
where
    S: PriceStore + ?Sized,
{
    let filter = ProductFilter {
        category,
        ..ProductFilter::default()
    };
    let products = store.list_products(&filter).await?;
    Ok(group_by_keyword(&products, rules))
}

pub(crate) fn print_deals(term: &str, deals: &[ProductAnalysis]) {
    if deals.is_empty() {
        println!("no products match \"{term}\"");
        return;
    }

    println!(
        "{:<40} {:<12} {:>8} {:>9} {:>6}  recommendation",
        "product", "retailer", "price", "forecast", "value"
    );
    for deal in deals {
        println!(
            "{:<40} {:<12} {:>8.2} {:>9.2} {:>6.2}  {}",
            truncate(&deal.name, 40),
            deal.retailer,
            deal.current_price,
            deal.predicted_price,
            deal.value_score,
            deal.recommendation
        );
    }
}

pub(crate) fn print_groups(groups: &[ProductGroup]) {
    if groups.is_empty() {
        println!("no keyword groups matched");
        return;
    }

    for group in groups {
        println!(
            "{}: {} ({}) £{:.2}, {} other(s)",
            group.keyword,
            group.recommended.name,
            group.recommended.retailer_name,
            group.recommended.current_price,
            group.others.len()
        );
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
