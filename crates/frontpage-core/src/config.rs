//! Site configuration management.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Environment variable holding the content store read token.
pub const READ_TOKEN_ENV: &str = "SANITY_API_READ_TOKEN";

/// Main configuration structure for Frontpage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Content store connection settings.
    pub store: StoreConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Site presentation settings.
    #[serde(default)]
    pub site: SiteConfig,
}

/// Content store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project identifier assigned by the content store.
    pub project_id: String,

    /// Dataset to query.
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Dated API version (e.g., "2024-01-01").
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Override for the direct API host (e.g., a local proxy).
    #[serde(default)]
    pub api_host: Option<String>,

    /// Override for the CDN API host.
    #[serde(default)]
    pub cdn_host: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Shared secret required to enter draft mode over HTTP.
    #[serde(default)]
    pub draft_secret: Option<String>,

    /// Shared secret required to revalidate cache tags over HTTP.
    #[serde(default)]
    pub revalidate_secret: Option<String>,

    /// Timeout applied by the HTTP transport to each store request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Site presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Fallback document title.
    #[serde(default = "default_site_title")]
    pub title: String,

    /// Language code for the `<html>` element.
    #[serde(default = "default_lang")]
    pub lang: String,
}

// Default value functions
fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "2024-01-01".to_string()
}

fn default_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_site_title() -> String {
    "Frontpage".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            draft_secret: None,
            revalidate_secret: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            lang: default_lang(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `FRONTPAGE__SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("FRONTPAGE").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let store = &self.store;

        if store.project_id.is_empty() {
            return Err(CoreError::config("store.project_id cannot be empty"));
        }

        if !store
            .project_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(CoreError::config(format!(
                "store.project_id may only contain a-z, 0-9 and dashes: {}",
                store.project_id
            )));
        }

        if store.dataset.is_empty() {
            return Err(CoreError::config("store.dataset cannot be empty"));
        }

        if !is_valid_api_version(&store.api_version) {
            return Err(CoreError::config(format!(
                "store.api_version must be `X`, `1` or a date like `2024-01-01`: {}",
                store.api_version
            )));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(CoreError::config(
                "server.request_timeout_secs must be greater than zero",
            ));
        }

        if matches!(self.server.draft_secret.as_deref(), Some("")) {
            tracing::warn!("server.draft_secret is empty; draft mode can not be entered over HTTP");
        }

        Ok(())
    }

    /// API version as used in request paths, without a leading `v`.
    pub fn api_version(&self) -> &str {
        self.store
            .api_version
            .strip_prefix('v')
            .unwrap_or(&self.store.api_version)
    }

    /// Base URL for the direct (uncached) API.
    pub fn api_base_url(&self) -> String {
        match &self.store.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.store.project_id),
        }
    }

    /// Base URL for the CDN-backed API.
    pub fn cdn_base_url(&self) -> String {
        match &self.store.cdn_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.apicdn.sanity.io", self.store.project_id),
        }
    }

    /// Read the store token from the process environment.
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn read_token() -> Option<String> {
        std::env::var(READ_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

fn is_valid_api_version(version: &str) -> bool {
    let version = version.strip_prefix('v').unwrap_or(version);
    if version == "X" || version == "1" {
        return true;
    }

    let parts: Vec<&str> = version.split('-').collect();
    matches!(parts.as_slice(), [y, m, d]
        if y.len() == 4 && m.len() == 2 && d.len() == 2
            && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())))
}
