use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";
const DEFAULT_IP_LOCATE_URL: &str = "http://ip-api.com/json";

/// Base URLs of the remote services. Overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub weather: String,
    pub geo: String,
    pub ip_locate: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: DEFAULT_WEATHER_URL.to_string(),
            geo: DEFAULT_GEO_URL.to_string(),
            ip_locate: DEFAULT_IP_LOCATE_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Moscow"
/// lang = "en"
/// quick_picks = ["Moscow", "London"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// City shown on startup.
    pub default_city: String,

    /// Language code passed to OpenWeather for condition descriptions.
    pub lang: String,

    /// Cities offered as one-key shortcuts in the interactive dashboard.
    pub quick_picks: Vec<String>,

    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: "Moscow".to_string(),
            lang: "en".to_string(),
            quick_picks: ["Moscow", "Saint Petersburg", "London", "New York", "Tokyo"]
                .into_iter()
                .map(String::from)
                .collect(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherboard", "weatherboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// Resolve the API key, preferring `env_override` (the value of [`API_KEY_ENV`]).
    pub fn resolve_api_key(&self, env_override: Option<String>) -> Result<String> {
        env_override
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weatherboard configure` or set {API_KEY_ENV}."
                )
            })
    }

    /// Resolve the API key from the process environment and this config.
    pub fn api_key_from_env(&self) -> Result<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }
}
