use crate::error::{Result, TrendingError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_AI_API_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_AI_MODEL: &str = "deepseek-chat";

/// Largest page the search endpoint returns
pub const MAX_LIMIT: u32 = 100;

/// Longest lookback window accepted, in days
pub const MAX_DAYS: u32 = 3650;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GitHub token (overridden by GITHUB_TOKEN)
    pub github_token: Option<String>,

    /// Chat completion API key (overridden by DEEPSEEK_API_KEY)
    pub ai_api_key: Option<String>,

    /// Lookback window in days (default: 7)
    #[serde(default = "default_days")]
    pub default_days: u32,

    /// Number of repositories to report (default: 10)
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Base URL of the GitHub REST API
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Base URL of the OpenAI-compatible chat completion API
    #[serde(default = "default_ai_api_url")]
    pub ai_api_url: String,

    /// Model used for summaries
    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    /// Pause between consecutive summary requests in milliseconds
    #[serde(default = "default_ai_interval")]
    pub ai_request_interval_ms: u64,

    /// README cache directory (None = ~/.cache/trending-digest/readme)
    pub cache_dir: Option<PathBuf>,

    /// Directory holding one dataset JSON per run
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding the Markdown reports
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

impl Config {
    /// Load configuration from the default location (~/.config/trending-digest/config.toml)
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TrendingError::config(format!(
                "Config file not found at: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrendingError::config("Could not determine home directory"))?;
        Ok(home.join(".config").join("trending-digest").join("config.toml"))
    }

    /// Get the default README cache directory
    pub fn default_cache_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrendingError::config("Could not determine home directory"))?;
        Ok(home.join(".cache").join("trending-digest").join("readme"))
    }

    /// README cache directory, falling back to the default location
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_cache_dir(),
        }
    }

    /// Create a default configuration file at the default location
    pub fn create_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Self::default();
        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(&config_path, toml_string)?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_days == 0 || self.default_days > MAX_DAYS {
            return Err(TrendingError::config(format!(
                "default_days must be between 1 and {}",
                MAX_DAYS
            )));
        }

        if self.default_limit == 0 || self.default_limit > MAX_LIMIT {
            return Err(TrendingError::config(format!(
                "default_limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        if self.github_api_url.trim().is_empty() {
            return Err(TrendingError::MissingConfig(
                "github_api_url is required".to_string(),
            ));
        }

        if self.ai_api_url.trim().is_empty() {
            return Err(TrendingError::MissingConfig(
                "ai_api_url is required".to_string(),
            ));
        }

        Ok(())
    }

    /// GitHub token; the search stage cannot run without one
    pub fn github_token(&self) -> Result<&str> {
        match self.github_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(TrendingError::auth(
                "no GitHub token configured (set GITHUB_TOKEN)",
            )),
        }
    }

    /// Chat completion key, if summaries are enabled
    pub fn ai_api_key(&self) -> Option<&str> {
        self.ai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Load config from file, or create default if it doesn't exist
    pub fn load_or_create_default() -> Result<Self> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(TrendingError::Config(_)) if !Self::default_config_path()?.exists() => {
                tracing::info!("Config file not found, creating default config");
                Self::create_default()
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            ai_api_key: None,
            default_days: default_days(),
            default_limit: default_limit(),
            github_api_url: default_github_api_url(),
            ai_api_url: default_ai_api_url(),
            ai_model: default_ai_model(),
            ai_request_interval_ms: default_ai_interval(),
            cache_dir: None,
            data_dir: default_data_dir(),
            reports_dir: default_reports_dir(),
        }
    }
}

// Serde default functions
fn default_days() -> u32 {
    7
}

fn default_limit() -> u32 {
    10
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_ai_api_url() -> String {
    DEFAULT_AI_API_URL.to_string()
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

fn default_ai_interval() -> u64 {
    1200
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}
