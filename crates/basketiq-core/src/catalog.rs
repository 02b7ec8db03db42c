//! Static catalog tables consumed by the normalizer and the matchers.
//!
//! These are data, not behavior: extending a table never requires touching
//! the matching algorithms. Keyword-group rules can additionally be replaced
//! at runtime from a YAML file (see [`load_group_rules`]).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::Category;
use crate::ConfigError;

/// Descriptor noise words dropped from names before search-intent matching.
pub const STOP_WORDS: &[&str] = &["corner", "with", "flakes", "yogurt", "juice"];

/// Search term -> synonyms that also count as a main-product hit.
///
/// Keys and synonyms are lower-case; matching is substring-based against a
/// preprocessed (lower-cased, stop-word-free) product name.
pub const SEARCH_SYNONYMS: &[(&str, &[&str])] = &[
    ("onion", &["onion", "bulb", "allium"]),
    ("banana", &["banana"]),
    ("oranges", &["oranges"]),
    ("milk", &["skimmed milk", "semi-skimmed milk", "whole milk"]),
    ("butter", &["butter"]),
    ("carrot", &["carrot"]),
    ("cucumber", &["cucumber"]),
    ("pepper", &["yellow", "red"]),
    ("potatoes", &["baking potatoes", "white potatoes"]),
    ("bread", &["bread"]),
    ("chicken breast", &["chicken breast"]),
    ("granulated sugar", &["granulated sugar"]),
    ("rice", &["rice"]),
    ("avocado", &["avocado"]),
    ("baked beans", &["baked beans"]),
    (
        "muller corner",
        &[
            "muller corner vanilla yogurt with chocolate balls",
            "muller corner banana yogurt with chocolate flakes",
        ],
    ),
];

/// Category keyword table, in classification priority order.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Fruit,
        &[
            "banana", "apple", "orange", "grape", "strawberr", "raspberr", "blueberr",
            "pear", "lemon", "lime", "melon", "mango", "pineapple", "avocado", "kiwi",
            "plum", "cherr", "peach", "nectarine", "clementine", "satsuma",
        ],
    ),
    (
        Category::Vegetable,
        &[
            "onion", "carrot", "potato", "cucumber", "pepper", "broccoli", "tomato",
            "lettuce", "cabbage", "spinach", "courgette", "mushroom", "parsnip",
            "cauliflower", "leek", "celery", "sweetcorn", "garlic", "beans",
        ],
    ),
    (
        Category::Dairy,
        &[
            "milk", "butter", "cheese", "yogurt", "yoghurt", "cream", "creme fraiche",
            "egg",
        ],
    ),
    (
        Category::Bakery,
        &[
            "bread", "loaf", "roll", "bagel", "croissant", "muffin", "crumpet", "baguette",
            "brioche", "wrap", "pitta", "naan",
        ],
    ),
    (
        Category::Poultry,
        &["chicken", "turkey", "duck", "poultry"],
    ),
];

/// One cross-retailer grouping rule: products whose name contains `keyword`
/// and none of `exclude` land in the keyword's group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRule {
    pub keyword: String,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl GroupRule {
    #[must_use]
    pub fn new(keyword: &str, exclude: &[&str]) -> Self {
        Self {
            keyword: keyword.to_string(),
            exclude: exclude.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

const DEFAULT_GROUP_RULES: &[(&str, &[&str])] = &[
    ("banana", &["yogurt", "bread", "milkshake", "chips", "cake"]),
    ("onion", &["rings", "gravy", "crisps", "chutney", "bhaji"]),
    ("orange", &["juice", "squash", "marmalade", "chocolate"]),
    ("milk", &["chocolate", "milkshake", "coconut", "oat", "almond"]),
    ("butter", &["peanut", "buttermilk", "biscuit", "croissant"]),
    ("carrot", &["cake", "soup"]),
    ("cucumber", &["pickle", "relish"]),
    ("pepper", &["peppercorn", "black pepper", "sauce"]),
    ("potatoes", &["crisps", "wedges", "salad"]),
    ("bread", &["breadcrumbs", "sauce", "garlic bread"]),
    ("chicken breast", &["sandwich", "soup", "pie"]),
    ("sugar", &["free", "icing"]),
    ("rice", &["pudding", "cakes", "crispies", "noodles"]),
    ("avocado", &["oil", "guacamole"]),
    ("baked beans", &["sausages"]),
    ("eggs", &["chocolate", "easter", "noodles"]),
];

/// Built-in keyword-group rules, in presentation order.
#[must_use]
pub fn default_group_rules() -> Vec<GroupRule> {
    DEFAULT_GROUP_RULES
        .iter()
        .map(|(keyword, exclude)| GroupRule::new(keyword, exclude))
        .collect()
}

#[derive(Debug, Deserialize)]
struct GroupRulesFile {
    rules: Vec<GroupRule>,
}

/// Load and validate keyword-group rules from a YAML file of the form
/// `rules: [{keyword: banana, exclude: [yogurt]}]`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_group_rules(path: &Path) -> Result<Vec<GroupRule>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_group_rules(&content)
}

/// Parse and validate keyword-group rules from YAML text.
///
/// Keywords and exclusions are lower-cased so matching stays case-insensitive.
///
/// # Errors
///
/// Returns `ConfigError` on malformed YAML, an empty rule list, blank
/// keywords, or duplicate keywords.
pub fn parse_group_rules(content: &str) -> Result<Vec<GroupRule>, ConfigError> {
    let file: GroupRulesFile = serde_yaml::from_str(content)?;
    if file.rules.is_empty() {
        return Err(ConfigError::RulesValidation(
            "at least one rule is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(file.rules.len());
    for rule in file.rules {
        let keyword = rule.keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(ConfigError::RulesValidation(
                "rule keyword must be non-empty".to_string(),
            ));
        }
        if !seen.insert(keyword.clone()) {
            return Err(ConfigError::RulesValidation(format!(
                "duplicate rule keyword: '{keyword}'"
            )));
        }
        let exclude = rule
            .exclude
            .iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        rules.push(GroupRule { keyword, exclude });
    }
    Ok(rules)
}
