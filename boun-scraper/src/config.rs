use std::path::{Path, PathBuf};
use std::time::Duration;

use boun_common::{Catalog, Department};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://registration.bogazici.edu.tr/scripts/sch.asp";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// What to do when one department page cannot be fetched or parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Log the failure and continue with the next page
    #[default]
    Skip,
    /// Stop the run; nothing is written
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Minimum gap between the starts of two requests
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Used when the response carries no charset
    #[serde(default = "default_charset")]
    pub default_charset: String,

    #[serde(default)]
    pub on_error: OnError,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Also write daily log files here when set
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u64,

    /// Replaces the built-in department table when non-empty
    #[serde(default)]
    pub departments: Vec<Department>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_charset() -> String {
    "windows-1254".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_retention_days() -> u64 {
    3
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            default_charset: default_charset(),
            on_error: OnError::default(),
            log_level: default_log_level(),
            log_dir: None,
            log_retention_days: default_log_retention_days(),
            departments: Vec::new(),
        }
    }
}

impl ScraperConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn catalog(&self) -> Catalog {
        if self.departments.is_empty() {
            Catalog::builtin()
        } else {
            Catalog::new(self.departments.clone())
        }
    }
}
