use crate::app_config::{AppConfig, Environment, RetailerFeed};
use crate::ConfigError;

/// Feeds served by the scraping service's fresh-groceries browse endpoints.
const DEFAULT_RETAILER_FEEDS: &str =
    "sainsbury=http://scraping-service:5001/browse/sainsbury/freshgroceries,\
     aldi=http://scraping-service:5001/browse/aldi/freshgroceries,\
     morrison=http://scraping-service:5001/browse/morrison/freshgroceries,\
     iceland=http://scraping-service:5001/browse/iceland/freshgroceries";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("BASKETIQ_ENV", "development"))?;

    let bind_addr = or_default("BASKETIQ_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("BASKETIQ_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("BASKETIQ_LOG_LEVEL", "info");
    let group_rules_path = lookup("BASKETIQ_GROUP_RULES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let db_max_connections = parse_u32("BASKETIQ_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BASKETIQ_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BASKETIQ_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let feed_timeout_secs = parse_u64("BASKETIQ_FEED_TIMEOUT_SECS", "70")?;
    let feed_user_agent =
        or_default("BASKETIQ_FEED_USER_AGENT", "basketiq/0.1 (price-intelligence)");
    let retailer_feeds = parse_retailer_feeds(&or_default(
        "BASKETIQ_RETAILER_FEEDS",
        DEFAULT_RETAILER_FEEDS,
    ))?;
    let sync_enabled = parse_bool(&or_default("BASKETIQ_SYNC_ENABLED", "false"))
        .ok_or_else(|| invalid("BASKETIQ_SYNC_ENABLED", "expected true or false".to_string()))?;
    let sync_cron = or_default("BASKETIQ_SYNC_CRON", "0 0 * * * *");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        group_rules_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        feed_timeout_secs,
        feed_user_agent,
        retailer_feeds,
        sync_enabled,
        sync_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BASKETIQ_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Parse `name=url` pairs separated by commas, preserving order.
fn parse_retailer_feeds(raw: &str) -> Result<Vec<RetailerFeed>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, url) = entry
                .split_once('=')
                .map(|(n, u)| (n.trim(), u.trim()))
                .filter(|(n, u)| !n.is_empty() && !u.is_empty())
                .ok_or_else(|| ConfigError::InvalidEnvVar {
                    var: "BASKETIQ_RETAILER_FEEDS".to_string(),
                    reason: format!("expected name=url, got \"{entry}\""),
                })?;
            Ok(RetailerFeed {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
