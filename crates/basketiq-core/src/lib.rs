//! Shared domain types, catalog tables, configuration, and the storage seam
//! for the basketiq price intelligence pipeline.

mod app_config;
pub mod catalog;
mod config;
pub mod listing;
pub mod models;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, RetailerFeed};
pub use catalog::{load_group_rules, GroupRule};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::RawListing;
pub use models::{
    BaseUnit, Category, NewPriceHistory, NewProduct, NewRetailer, NormalizedSize,
    PriceHistoryEntry, Product, ProductFilter, ProductObservation, Retailer, UnitPrice,
};
pub use store::{memory::InMemoryStore, PriceStore, StoreError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid base unit: {0}")]
    InvalidBaseUnit(String),
    #[error("invalid category: {0}")]
    InvalidCategory(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read group rules file {path}: {source}")]
    RulesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse group rules file: {0}")]
    RulesFileParse(#[from] serde_yaml::Error),

    #[error("invalid group rules: {0}")]
    RulesValidation(String),
}
