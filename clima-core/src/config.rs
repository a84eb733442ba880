use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{client::WEATHER_URL, model::Coordinates};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Lisbon"
///
/// [location]
/// latitude = 38.72
/// longitude = -9.14
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Overrides the current-weather endpoint, mostly useful for testing.
    pub endpoint: Option<String>,

    pub default_city: Option<String>,

    /// Fixed coordinates used instead of IP-based lookup.
    pub location: Option<Coordinates>,
}

impl Config {
    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Result<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(WEATHER_URL)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Blank names clear the default city.
    pub fn set_default_city(&mut self, city: &str) {
        let city = city.trim();
        self.default_city = (!city.is_empty()).then(|| city.to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        if let Some(location) = cfg.location
            && !location.is_valid()
        {
            return Err(anyhow!(
                "Configured location {},{} is out of range",
                location.latitude,
                location.longitude
            ));
        }
        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "clima", "clima")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn resolve_api_key(from_env: Option<String>, from_file: Option<&str>) -> Result<String> {
    from_env
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .or_else(|| from_file.map(str::trim).filter(|key| !key.is_empty()))
        .map(str::to_owned)
        .ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `clima configure` or set {API_KEY_ENV}."
            )
        })
}
