use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fetch::cache::DEFAULT_CACHE_DIR;

pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api";
pub const DEFAULT_DATABASE: &str = "holoload.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HololoadConfig {
    pub database: Option<String>,
    pub base_url: Option<String>,
    pub cache_dir: Option<String>,
    pub cache: Option<bool>,
}

/// Settings for one import run after defaults are applied
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub database: PathBuf,
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub cache: bool,
}

impl HololoadConfig {
    /// Config with every key set to its built-in default
    pub fn defaults() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            cache_dir: Some(DEFAULT_CACHE_DIR.to_string()),
            cache: Some(true),
        }
    }

    /// Layer `overrides` on top of this config; set keys in `overrides` win
    pub fn merge(self, overrides: HololoadConfig) -> Self {
        Self {
            database: overrides.database.or(self.database),
            base_url: overrides.base_url.or(self.base_url),
            cache_dir: overrides.cache_dir.or(self.cache_dir),
            cache: overrides.cache.or(self.cache),
        }
    }

    /// Fill unset keys with built-in defaults
    pub fn resolve(self) -> ImportSettings {
        let merged = Self::defaults().merge(self);
        ImportSettings {
            database: PathBuf::from(merged.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string())),
            base_url: merged.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            cache_dir: PathBuf::from(merged.cache_dir.unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string())),
            cache: merged.cache.unwrap_or(true),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("holoload.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<HololoadConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: HololoadConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &HololoadConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
