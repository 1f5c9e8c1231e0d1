//! Configuration for the `settle` demo binary.
//!
//! ```toml
//! [runtime]
//! worker_threads = 4
//!
//! [logging]
//! filter = "settle_core=debug"
//! file = "/tmp/settle.log"
//!
//! [demo]
//! fast_ms = 100
//! slow_ms = 300
//! ```
//!
//! Every section and key is optional.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SETTLE_CONFIG";

const fn default_fast_ms() -> u64 {
    100
}

const fn default_slow_ms() -> u64 {
    300
}

#[derive(Debug, Default, Deserialize)]
pub struct SettleConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Tokio runtime settings.
#[derive(Debug, Default, Deserialize)]
pub struct RuntimeConfig {
    /// Worker threads for the multi-thread runtime. `0` selects the
    /// current-thread runtime; omitted uses tokio's default.
    pub worker_threads: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeFlavor {
    CurrentThread,
    MultiThread { worker_threads: Option<usize> },
}

impl RuntimeConfig {
    #[must_use]
    pub fn flavor(&self) -> RuntimeFlavor {
        match self.worker_threads {
            Some(0) => RuntimeFlavor::CurrentThread,
            worker_threads => RuntimeFlavor::MultiThread { worker_threads },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: Option<String>,
    /// Append logs here instead of writing them to stderr.
    pub file: Option<PathBuf>,
}

/// Delays used by the timing-dependent demo scenarios.
#[derive(Debug, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_fast_ms")]
    pub fast_ms: u64,
    #[serde(default = "default_slow_ms")]
    pub slow_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fast_ms: default_fast_ms(),
            slow_ms: default_slow_ms(),
        }
    }
}

impl DemoConfig {
    #[must_use]
    pub fn fast(&self) -> Duration {
        Duration::from_millis(self.fast_ms)
    }

    #[must_use]
    pub fn slow(&self) -> Duration {
        Duration::from_millis(self.slow_ms)
    }
}

impl SettleConfig {
    /// Load from `$SETTLE_CONFIG` if set, else from `~/.settle/config.toml`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The file [`SettleConfig::load`] would read, if one can be determined.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path)
    }
}

#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".settle").join("config.toml"))
}
