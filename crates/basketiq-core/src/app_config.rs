use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// One retailer's scraped listing feed: a URL returning a JSON array of
/// [`crate::RawListing`] records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetailerFeed {
    pub name: String,
    pub url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML file replacing the built-in keyword-group rules.
    pub group_rules_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub feed_timeout_secs: u64,
    pub feed_user_agent: String,
    /// Feeds are synced in this order, one retailer at a time.
    pub retailer_feeds: Vec<RetailerFeed>,
    pub sync_enabled: bool,
    /// Six-field cron expression (seconds first) for the scheduled sync.
    pub sync_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("group_rules_path", &self.group_rules_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("feed_timeout_secs", &self.feed_timeout_secs)
            .field("feed_user_agent", &self.feed_user_agent)
            .field("retailer_feeds", &self.retailer_feeds)
            .field("sync_enabled", &self.sync_enabled)
            .field("sync_cron", &self.sync_cron)
            .finish()
    }
}
