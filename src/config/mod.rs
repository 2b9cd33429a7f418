use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::farm::{default_seeds, Seed, STARTING_MONEY};

fn default_initial_health() -> f64 {
    12.5
}

fn default_max_health() -> f64 {
    16.0
}

fn default_starting_money() -> u32 {
    STARTING_MONEY
}

fn default_asset_dir() -> String {
    "assets".to_string()
}

/// Optional hex color overrides (`#RRGGBB` or `#RGB`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_full: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_half: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_empty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Health shown when the deck starts
    #[serde(default = "default_initial_health")]
    pub initial_health: f64,

    /// Upper bound for restoring stamina (the bar itself always has 16 slots)
    #[serde(default = "default_max_health")]
    pub max_health: f64,

    #[serde(default = "default_starting_money")]
    pub starting_money: u32,

    /// Directory the heart icon sources are resolved against
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    /// Seeds offered in the plant menu
    #[serde(default = "default_seeds")]
    pub seeds: Vec<Seed>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_health: default_initial_health(),
            max_health: default_max_health(),
            starting_money: default_starting_money(),
            asset_dir: default_asset_dir(),
            seeds: default_seeds(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("farmdeck");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub async fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            return Ok(Self::read_from(&path).await);
        }

        let config = AppConfig::default();
        if let Err(e) = config.save().await {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Read the config without creating anything on disk
    pub async fn read() -> Self {
        let Some(dir) = dirs::config_dir() else {
            return AppConfig::default();
        };
        Self::read_from(&dir.join("farmdeck").join("config.toml")).await
    }

    async fn read_from(path: &Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Failed to parse config: {}", e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to read config: {}", e),
        }
        AppConfig::default()
    }

    /// Parse and sanitize a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content)?;

        if !config.max_health.is_finite() || config.max_health < 0.0 {
            tracing::warn!("Ignoring invalid max_health {}", config.max_health);
            config.max_health = default_max_health();
        }
        if !config.initial_health.is_finite() {
            tracing::warn!("Ignoring invalid initial_health {}", config.initial_health);
            config.initial_health = default_initial_health();
        }

        // Seeds need a name to be bound in the plant menu
        config.seeds.retain(|s| !s.name.trim().is_empty() && s.stamina_cost >= 0.0);
        if config.seeds.is_empty() {
            config.seeds = default_seeds();
        }

        Ok(config)
    }

    /// Save config to file
    pub async fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
