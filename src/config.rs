/// Configuration management for gameshelf
use crate::error::{ShelfError, ShelfResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub backend: StoreBackend,
    /// Optional JSON fixture loaded into the store at startup
    pub seed_file: Option<PathBuf>,
}

/// Which data store backs the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreBackend {
    Sqlite { location: PathBuf },
    Memory,
}

/// Feed construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Timeout applied to each store call made while gathering events
    pub fetch_timeout_ms: u64,
    /// Upper bound for caller-supplied limits
    pub max_limit: usize,
    /// Whether a user's own events appear in their feed
    pub include_self: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 5000,
            max_limit: 50,
            include_self: true,
        }
    }
}

impl FeedConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

const DEFAULT_LOG_FILTER: &str = "gameshelf=debug,tower_http=debug";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. "info" or "gameshelf=debug"
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Filter built from `level`, falling back to the default directives
    /// when they do not parse
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|e| {
            eprintln!("Invalid log filter {:?}: {}", self.level, e);
            EnvFilter::new(DEFAULT_LOG_FILTER)
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ShelfResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("SHELF_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("SHELF_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ShelfError::Validation("Invalid port number".to_string()))?;

        let data_directory: PathBuf = env::var("SHELF_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let backend = match env::var("SHELF_STORE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "sqlite" => StoreBackend::Sqlite {
                location: env::var("SHELF_DATABASE_LOCATION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("gameshelf.sqlite")),
            },
            other => {
                return Err(ShelfError::Validation(format!(
                    "Unknown store backend: {}",
                    other
                )))
            }
        };
        let seed_file = env::var("SHELF_SEED_FILE").ok().map(PathBuf::from);

        let defaults = FeedConfig::default();
        let fetch_timeout_ms = env::var("SHELF_FEED_FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.fetch_timeout_ms);
        let max_limit = env::var("SHELF_FEED_MAX_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_limit);
        let include_self = env::var("SHELF_FEED_INCLUDE_SELF")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
        let format = env::var("SHELF_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

        Ok(ServerConfig {
            service: ServiceConfig { hostname, port },
            storage: StorageConfig {
                data_directory,
                backend,
                seed_file,
            },
            feed: FeedConfig {
                fetch_timeout_ms,
                max_limit,
                include_self,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ShelfResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ShelfError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.feed.fetch_timeout_ms == 0 {
            return Err(ShelfError::Validation(
                "Feed fetch timeout must be greater than zero".to_string(),
            ));
        }

        if self.feed.max_limit == 0 {
            return Err(ShelfError::Validation(
                "Feed max limit must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
