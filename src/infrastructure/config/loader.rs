use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;

use crate::domain::errors::ConfigError;
use crate::domain::models::config::Config;

/// Project config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "coalesce.yaml";

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "COALESCE_";

/// Upper bound for the simulated directory latency.
const MAX_LATENCY_MS: u64 = 60_000;

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `coalesce.yaml` in the working directory (optional)
    /// 3. Environment variables (`COALESCE_*` prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Self::figment(path).extract().with_context(|| {
            format!("Failed to load config from {}", path.display())
        })?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Provider chain used by the loaders; missing files are skipped.
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    ///
    /// Capacity is validated while deserializing, so an invalid capacity
    /// never reaches this point.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.directory.size == 0 {
            return Err(ConfigError::InvalidDirectorySize(config.directory.size));
        }

        if config.directory.latency_ms > MAX_LATENCY_MS {
            return Err(ConfigError::InvalidLatency(config.directory.latency_ms));
        }

        Ok(())
    }
}
