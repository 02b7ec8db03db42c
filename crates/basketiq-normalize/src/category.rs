use basketiq_core::catalog::CATEGORY_KEYWORDS;
use basketiq_core::Category;

/// Assigns the first category whose keyword appears in the lower-cased name,
/// checking categories in catalog order. Falls back to [`Category::Others`].
#[must_use]
pub fn classify_category(name: &str) -> Category {
    let lower = name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(Category::Others, |(category, _)| *category)
}
