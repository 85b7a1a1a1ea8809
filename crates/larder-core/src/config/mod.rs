mod defaults;
mod notifications;


pub use notifications::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::LarderError;
use defaults::*;

/// Environment variable that supplies the Spoonacular key when the config leaves it empty.
pub const API_KEY_ENV: &str = "SPOONACULAR_API_KEY";

/// Top-level Larder configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub larder: LarderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub recipes: RecipesConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    #[serde(default)]
    pub push: PushConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LarderConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LarderConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Key-value store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Recipe API config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipesConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Upper bound on a single recipe lookup.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            lookup_timeout_secs: default_lookup_timeout(),
        }
    }
}

impl RecipesConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Create the `data/` and `logs/` subdirectories under the data dir.
pub fn ensure_layout(data_dir: &str) -> Result<(), LarderError> {
    let dir = shellexpand(data_dir);
    let base = Path::new(&dir);
    for sub in &["data", "logs"] {
        std::fs::create_dir_all(base.join(sub))?;
    }
    Ok(())
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, LarderError> {
    let path = Path::new(path);
    let mut config = if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LarderError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        parse(&content)?
    };

    if config.recipes.api_key.is_empty() {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.recipes.api_key = key;
        }
    }

    validate(&config)?;
    Ok(config)
}

/// Parse configuration from TOML text.
pub fn parse(content: &str) -> Result<Config, LarderError> {
    toml::from_str(content)
        .map_err(|e| LarderError::Config(format!("failed to parse config: {}", e)))
}

/// Reject values no component can work with.
pub fn validate(config: &Config) -> Result<(), LarderError> {
    let n = &config.notifications;
    if n.daily_hour > 23 || n.daily_minute > 59 {
        return Err(LarderError::Config(format!(
            "invalid daily reminder time {:02}:{:02}",
            n.daily_hour, n.daily_minute
        )));
    }
    if n.poll_interval_secs == 0 {
        return Err(LarderError::Config(
            "notifications.poll_interval_secs must be positive".to_string(),
        ));
    }
    if config.recipes.lookup_timeout_secs == 0 {
        return Err(LarderError::Config(
            "recipes.lookup_timeout_secs must be positive".to_string(),
        ));
    }
    Ok(())
}
