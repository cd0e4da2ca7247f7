// Reconciler settings
// Loaded from ~/.config/megaverse/config.toml (or an explicit --config path)

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use megaverse_core::{DedupGranularity, RetryPolicy};
use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE: &str = "https://challenge.crossmint.io/api";

#[derive(Debug)]
pub enum ConfigError {
    /// Config file exists but could not be read.
    Io { path: PathBuf, message: String },
    /// Config file is not valid TOML for [`Settings`].
    Parse { path: Option<PathBuf>, message: String },
    /// No candidate identifier from file, env or flags.
    MissingCandidate,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path: Some(path), message } => {
                write!(f, "invalid config {}: {message}", path.display())
            }
            Self::Parse { path: None, message } => write!(f, "invalid config: {message}"),
            Self::MissingCandidate => write!(f, "missing candidate id"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Per-request socket timeout. Must be at least 1.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per request while rate limited. 0 = retry indefinitely.
    pub max_attempts: u32,
    /// Ceiling for computed exponential backoff.
    pub max_backoff_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            max_backoff_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearSettings {
    /// Fixed pause after every delete, on top of 429 backoff.
    pub delay_ms: u64,
}

impl Default for ClearSettings {
    fn default() -> Self {
        Self { delay_ms: 500 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSettings {
    /// Route the goal fetch through the rate-limited executor.
    pub retry: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    pub granularity: DedupGranularity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub candidate_id: Option<String>,
    pub api: ApiSettings,
    pub retry: RetrySettings,
    pub clear: ClearSettings,
    pub goal: GoalSettings,
    pub dedup: DedupSettings,
}

impl Settings {
    /// Default settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("megaverse")
            .join("config.toml")
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Parse {
                path: None,
                message: "api.timeout_secs must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Load settings.
    ///
    /// An explicit path must exist. The default path is optional: when it
    /// is absent, built-in defaults are returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let settings = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: Some(path.clone()),
                message,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    /// Candidate id, rejecting blank values.
    pub fn candidate_id(&self) -> Result<&str, ConfigError> {
        self.candidate_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingCandidate)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = match self.retry.max_attempts {
            0 => RetryPolicy::uncapped(),
            n => RetryPolicy::capped(n),
        };
        policy.with_max_backoff(Duration::from_secs(self.retry.max_backoff_secs))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear.delay_ms)
    }
}
