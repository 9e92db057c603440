use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ClientConfig;
use crate::dashboard::DEFAULT_RANDOM_RANGE;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "PM_API_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL, e.g. "http://localhost:8000"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (unset = wait indefinitely)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Colour ANOMALY/NORMAL labels
    pub use_colors: bool,

    /// Decimal places shown for scores
    pub score_precision: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Lower bound for \randomize
    pub random_min: f64,

    /// Upper bound (exclusive) for \randomize
    pub random_max: f64,

    /// Keep shell history between sessions
    pub enable_history: bool,

    /// Maximum history entries
    pub max_history_entries: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            score_precision: 3,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            random_min: DEFAULT_RANDOM_RANGE.start,
            random_max: DEFAULT_RANDOM_RANGE.end,
            enable_history: true,
            max_history_entries: 500,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("pm-dash").join("config.toml"))
    }

    /// Pick the base URL: command line, then `PM_API_URL`, then the file.
    pub fn resolve_base_url(&self, cli_url: Option<&str>) -> Option<String> {
        self.resolve_base_url_with(cli_url, std::env::var(API_URL_ENV).ok())
    }

    pub fn resolve_base_url_with(
        &self,
        cli_url: Option<&str>,
        env_url: Option<String>,
    ) -> Option<String> {
        let present = |url: &String| !url.trim().is_empty();
        cli_url
            .map(str::to_string)
            .filter(present)
            .or_else(|| env_url.filter(present))
            .or_else(|| self.api.base_url.clone().filter(present))
    }

    pub fn client_config(&self, base_url: String) -> ClientConfig {
        ClientConfig {
            base_url,
            timeout: self.api.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn random_range(&self) -> std::ops::Range<f64> {
        self.behavior.random_min..self.behavior.random_max
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# pm-dash Configuration File
# Location: ~/.config/pm-dash/config.toml (Linux)
#           ~/Library/Application Support/pm-dash/config.toml (macOS)
#           %APPDATA%\pm-dash\config.toml (Windows)

[api]
# Base URL of the prediction backend. PM_API_URL and --api-url take precedence.
# base_url = "http://localhost:8000"

# Request timeout in seconds. Leave commented to wait as long as the backend needs.
# timeout_secs = 30

[display]
# Colour ANOMALY (red) and NORMAL (green) labels
use_colors = true

# Decimal places shown for scores
score_precision = 3

[behavior]
# Range used by \randomize (upper bound exclusive)
random_min = 0.0
random_max = 100.0

# Keep shell history between sessions
enable_history = true

# Maximum number of history entries to keep
max_history_entries = 500
"#
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("pm-dash Configuration Setup");
        println!("===========================");

        print!("Backend base URL [http://localhost:8000]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let base_url = match input.trim() {
            "" => "http://localhost:8000".to_string(),
            url => url.to_string(),
        };

        let mut config = Config::default();
        config.api.base_url = Some(base_url);

        print!("Does your terminal support colours? (y/n) [y]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        config.display.use_colors = !input.trim().eq_ignore_ascii_case("n");

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}
