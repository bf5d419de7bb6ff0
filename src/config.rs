//! Configuration for models and pagination.
//!
//! [`ModelConfig::load`] reads `config/config.toml` (optional) and then
//! `ROWGUARD__*` environment variables, e.g.
//! `ROWGUARD__PAGINATION__MAX_LIMIT=500`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "ROWGUARD";

/// Top-level settings
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ModelConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Settings read by [`Pagination::from_args`](crate::pagination::Pagination::from_args)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PaginationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
    /// Column used when no valid order is requested
    #[serde(default = "default_order")]
    pub default_order: String,
    #[serde(default = "default_limit_key")]
    pub limit_key: String,
    #[serde(default = "default_page_key")]
    pub page_key: String,
    #[serde(default = "default_offset_key")]
    pub offset_key: String,
    #[serde(default = "default_order_key")]
    pub order_key: String,
    #[serde(default = "default_no_limit_key")]
    pub no_limit_key: String,
    #[serde(default = "default_count_key")]
    pub count_key: String,
}

fn default_limit() -> u64 {
    20
}

fn default_max_limit() -> u64 {
    100
}

fn default_order() -> String {
    "id".to_string()
}

fn default_limit_key() -> String {
    "limit".to_string()
}

fn default_page_key() -> String {
    "page".to_string()
}

fn default_offset_key() -> String {
    "offset".to_string()
}

fn default_order_key() -> String {
    "order".to_string()
}

fn default_no_limit_key() -> String {
    "no_limit".to_string()
}

fn default_count_key() -> String {
    "count".to_string()
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_order: default_order(),
            limit_key: default_limit_key(),
            page_key: default_page_key(),
            offset_key: default_offset_key(),
            order_key: default_order_key(),
            no_limit_key: default_no_limit_key(),
            count_key: default_count_key(),
        }
    }
}

impl PaginationConfig {
    /// Argument names that drive pagination rather than carry column values
    #[must_use]
    pub fn reserved_keys(&self) -> [&str; 6] {
        [
            self.limit_key.as_str(),
            self.page_key.as_str(),
            self.offset_key.as_str(),
            self.order_key.as_str(),
            self.no_limit_key.as_str(),
            self.count_key.as_str(),
        ]
    }
}

impl ModelConfig {
    /// Load the configuration from `config/config.toml`, falling back to env vars.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when neither source yields a valid configuration.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // An unreadable file should not hide the environment
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("failed to load {CONFIG_FILE}, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };

        settings.try_deserialize::<ModelConfig>().map_err(|e| {
            ConfigError::Message(format!("Model configuration could not be loaded: {e}"))
        })
    }
}
