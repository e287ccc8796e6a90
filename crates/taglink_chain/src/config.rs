//! Worker configuration.
//!
//! Sources, lowest precedence first:
//! - bundled defaults (`taglink.toml`, compiled in)
//! - `~/.config/taglink/taglink.toml`
//! - `./taglink.toml`

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taglink_error::{ConfigError, TaglinkResult};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../taglink.toml");

/// Execution engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct EngineConfig {
    /// Timeout for one prompt-execution call, in seconds
    step_timeout_secs: u64,
    /// Accepted task `api_version` values
    supported_api_versions: Vec<f64>,
}

impl EngineConfig {
    /// Step timeout as a [`Duration`].
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: 60,
            supported_api_versions: vec![1.4],
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum tasks executing at once
    max_concurrent_tasks: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 4,
        }
    }
}

/// Complete worker configuration.
///
/// # Examples
///
/// ```
/// use taglink_chain::TaglinkConfig;
///
/// let config = TaglinkConfig::default();
/// assert_eq!(*config.engine().step_timeout_secs(), 60);
/// assert_eq!(*config.pool().max_concurrent_tasks(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct TaglinkConfig {
    /// Engine section
    engine: EngineConfig,
    /// Pool section
    pool: PoolConfig,
}

impl TaglinkConfig {
    /// Load configuration from a single file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// out-of-range values.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> TaglinkResult<Self> {
        debug!("Loading configuration from file");

        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to load config file: {}", e)))?;
        Self::finish(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file is invalid or a value is out of
    /// range.
    #[instrument]
    pub fn load() -> TaglinkResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/taglink/taglink.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("taglink").required(false));

        let config = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?;
        Self::finish(config)
    }

    fn finish(config: Config) -> TaglinkResult<Self> {
        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        loaded.validate()?;

        debug!(
            step_timeout_secs = loaded.engine.step_timeout_secs,
            max_concurrent_tasks = loaded.pool.max_concurrent_tasks,
            "Configuration loaded"
        );
        Ok(loaded)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero timeout, an empty version list, or a zero
    /// concurrency bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.step_timeout_secs == 0 {
            return Err(ConfigError::new("engine.step_timeout_secs must be positive"));
        }
        if self.engine.supported_api_versions.is_empty() {
            return Err(ConfigError::new(
                "engine.supported_api_versions must list at least one version",
            ));
        }
        if self.pool.max_concurrent_tasks == 0 {
            return Err(ConfigError::new("pool.max_concurrent_tasks must be positive"));
        }
        Ok(())
    }
}
