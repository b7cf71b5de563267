use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CatalogError, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Serialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| CatalogError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| CatalogError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_dir() -> Result<PathBuf> {
        ProjectDirs::from("", "", "catalog-admin")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(CatalogError::NoConfigDir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn tokens_path() -> Result<PathBuf> {
        Self::config_dir().map(|dir| dir.join("tokens.json"))
    }

    pub fn cache_path() -> Result<PathBuf> {
        Self::config_dir().map(|dir| dir.join("cache.json"))
    }

    /// API base URL with env var taking precedence over config file
    pub fn api_url(&self) -> Result<Url> {
        let raw = std::env::var("CATALOG_API_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        parse_base_url(&raw)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// Parse a base URL, forcing a trailing slash so relative joins append
/// instead of replacing the last segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    Url::parse(&normalized).map_err(|source| CatalogError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("http://localhost:8000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            url.join("projects/").unwrap().as_str(),
            "http://localhost:8000/api/projects/"
        );
    }

    #[test]
    fn base_url_keeps_existing_slash() {
        let url = parse_base_url("https://example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = parse_base_url("not a url").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl { .. }));
    }

    #[test]
    fn timeout_defaults_to_thirty_seconds() {
        assert_eq!(Config::default().timeout(), Duration::from_secs(30));
    }
}
