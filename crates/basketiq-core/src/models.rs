//! Domain records shared by normalization, ingestion, analysis and storage.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Canonical unit a pack size is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseUnit {
    Grams,
    Kilograms,
    Liters,
    Milliliters,
    Units,
}

impl BaseUnit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BaseUnit::Grams => "grams",
            BaseUnit::Kilograms => "kilograms",
            BaseUnit::Liters => "liters",
            BaseUnit::Milliliters => "milliliters",
            BaseUnit::Units => "units",
        }
    }
}

impl std::fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grams" => Ok(BaseUnit::Grams),
            "kilograms" => Ok(BaseUnit::Kilograms),
            "liters" => Ok(BaseUnit::Liters),
            "milliliters" => Ok(BaseUnit::Milliliters),
            "units" => Ok(BaseUnit::Units),
            other => Err(CoreError::InvalidBaseUnit(other.to_string())),
        }
    }
}

/// Coarse product category assigned at first ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fruit,
    Vegetable,
    Dairy,
    Bakery,
    Poultry,
    Others,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Fruit => "fruit",
            Category::Vegetable => "vegetable",
            Category::Dairy => "dairy",
            Category::Bakery => "bakery",
            Category::Poultry => "poultry",
            Category::Others => "others",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fruit" => Ok(Category::Fruit),
            "vegetable" => Ok(Category::Vegetable),
            "dairy" => Ok(Category::Dairy),
            "bakery" => Ok(Category::Bakery),
            "poultry" => Ok(Category::Poultry),
            "others" => Ok(Category::Others),
            other => Err(CoreError::InvalidCategory(other.to_string())),
        }
    }
}

/// A parsed pack size. Both fields are populated together or not at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSize {
    pub base_quantity: Option<f64>,
    pub base_unit: Option<BaseUnit>,
}

impl NormalizedSize {
    #[must_use]
    pub fn new(base_quantity: f64, base_unit: BaseUnit) -> Self {
        Self {
            base_quantity: Some(base_quantity),
            base_unit: Some(base_unit),
        }
    }

    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// A parsed "price per unit" figure, always in pounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPrice {
    pub amount: f64,
    /// Lower-cased unit token with whitespace removed, e.g. `"100ml"`.
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retailer {
    pub id: i64,
    pub name: String,
    pub base_url: Option<String>,
    pub provides_rating: bool,
}

/// One retailer's offering of an item, keyed by `(retailer_id, url)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub retailer_id: i64,
    pub retailer_name: String,
    pub external_id: Option<String>,
    pub url: String,
    pub name: String,
    /// Always the most recently accepted observation.
    pub current_price: f64,
    pub currency: String,
    pub category: Category,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub base_quantity: Option<f64>,
    pub base_unit: Option<BaseUnit>,
    pub rating: Option<f64>,
    pub badges: Option<String>,
}

/// One immutable price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub id: i64,
    pub product_id: i64,
    pub price: f64,
    pub unit_price: Option<f64>,
    pub unit_price_unit: Option<String>,
    pub is_offer: bool,
    pub offer_description: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRetailer {
    pub name: String,
    pub base_url: Option<String>,
    pub provides_rating: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub retailer_id: i64,
    pub external_id: Option<String>,
    pub url: String,
    pub name: String,
    pub current_price: f64,
    pub currency: String,
    pub category: Category,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub size: NormalizedSize,
    pub rating: Option<f64>,
    pub badges: Option<String>,
}

/// The fields a repeat observation is allowed to overwrite on an existing product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductObservation {
    pub current_price: f64,
    pub size: NormalizedSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPriceHistory {
    pub product_id: i64,
    pub price: f64,
    pub unit_price: Option<UnitPrice>,
    pub is_offer: bool,
    pub offer_description: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
}

/// Read-side product filter. Every `None` field matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive exact retailer name.
    pub retailer: Option<String>,
    /// Case-insensitive substring of the product name.
    pub name_contains: Option<String>,
    pub category: Option<Category>,
    /// Products without a rating never pass a minimum-rating filter.
    pub min_rating: Option<f64>,
}

impl ProductFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(retailer) = &self.retailer {
            if !product.retailer_name.eq_ignore_ascii_case(retailer) {
                return false;
            }
        }
        if let Some(needle) = &self.name_contains {
            if !product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if product.rating.is_none_or(|r| r < min_rating) {
                return false;
            }
        }
        true
    }
}
