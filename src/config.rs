//! TOML configuration for the client.

use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client configuration, usually read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_app_url")]
    pub app_base_url: String,
    #[serde(default = "default_backend_url")]
    pub backend_base_url: String,
    /// Bearer credential. The only field the host writes back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub listing: Listing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Http {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app_base_url: default_app_url(),
            backend_base_url: default_backend_url(),
            token: None,
            log_level: default_log_level(),
            http: Http::default(),
            listing: Listing::default(),
        }
    }
}

impl Default for Http {
    fn default() -> Self {
        Http {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        }
    }
}

impl Default for Listing {
    fn default() -> Self {
        Listing {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.http.timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.http.backoff_base_ms)
    }

    pub fn app_url(&self, path: &str) -> String {
        format!("{}{}", self.app_base_url, path)
    }

    pub fn backend_url(&self, path: &str) -> String {
        format!("{}{}", self.backend_base_url, path)
    }
}

fn default_app_url() -> String {
    DEFAULT_APP_URL.to_string()
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_backoff_base_ms() -> u64 {
    DEFAULT_BACKOFF_BASE_MS
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

pub fn load(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path).map_err(|err| Error::ReadConfig {
        path: path.to_path_buf(),
        source: err,
    })?;

    let mut cfg: Config = toml::from_str(&raw).map_err(|err| Error::ParseConfig {
        path: path.to_path_buf(),
        source: err,
    })?;

    normalize(&mut cfg);

    validate(&cfg)?;

    Ok(cfg)
}

pub fn normalize(cfg: &mut Config) {
    cfg.app_base_url = cfg.app_base_url.trim().trim_end_matches('/').to_string();
    cfg.backend_base_url = cfg.backend_base_url.trim().trim_end_matches('/').to_string();
    if cfg.token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        cfg.token = None;
    }
}

pub fn validate(cfg: &Config) -> Result<()> {
    for (field, value) in [
        ("app_base_url", &cfg.app_base_url),
        ("backend_base_url", &cfg.backend_base_url),
    ] {
        let parsed = reqwest::Url::parse(value).map_err(|_| Error::Validation {
            message: format!("{field} must be an absolute URL."),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Validation {
                message: format!("{field} must use http or https."),
            });
        }
    }
    if cfg.http.timeout_ms == 0 {
        return Err(Error::Validation {
            message: "http.timeout_ms must be greater than zero.".to_string(),
        });
    }
    if cfg.listing.page_size == 0 || cfg.listing.page_size > MAX_PAGE_SIZE {
        return Err(Error::Validation {
            message: format!("listing.page_size must be between 1 and {MAX_PAGE_SIZE}."),
        });
    }
    Ok(())
}

/// Persisted home of the credential.
pub trait CredentialStore {
    fn load_token(&self) -> Result<Option<String>>;
    fn store_token(&self, token: &str) -> Result<()>;
}

/// Credential store backed by the `token` field of a TOML config file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigFile { path: path.into() }
    }

    pub fn load(&self) -> Result<Config> {
        load(&self.path)
    }

    fn read_or_default(&self) -> Result<Config> {
        if self.path.exists() {
            self.load()
        } else {
            Ok(Config::default())
        }
    }
}

impl CredentialStore for ConfigFile {
    fn load_token(&self) -> Result<Option<String>> {
        Ok(self.read_or_default()?.token)
    }

    fn store_token(&self, token: &str) -> Result<()> {
        let mut cfg = self.read_or_default()?;
        let token = token.trim();
        cfg.token = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
        let rendered = toml::to_string(&cfg).map_err(|err| Error::WriteConfig {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        fs::write(&self.path, rendered).map_err(|err| Error::WriteConfig {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }
}
