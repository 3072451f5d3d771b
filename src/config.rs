use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEVELOPMENT_API_URL: &str = "http://localhost:5000/api";
pub const PRODUCTION_API_URL: &str = "https://api.rentloop.example/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    pub fn is_development(self) -> bool {
        matches!(self, RuntimeMode::Development)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub mode: RuntimeMode,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub cache_ttl: Duration,
    pub featured_limit: u32,
    pub storage_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEVELOPMENT_API_URL.to_string(),
            mode: RuntimeMode::Development,
            request_timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(120),
            cache_ttl: Duration::from_secs(300),
            featured_limit: 12,
            storage_path: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("RENTLOOP_ENV").as_deref().map(str::trim) {
            None | Some("") | Some("development") | Some("dev") => RuntimeMode::Development,
            Some("production") | Some("prod") => RuntimeMode::Production,
            Some(other) => bail!("RENTLOOP_ENV must be development or production, got {other}"),
        };

        let base_url = match lookup("RENTLOOP_API_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None if mode.is_development() => DEVELOPMENT_API_URL.to_string(),
            None => PRODUCTION_API_URL.to_string(),
        };

        let request_timeout = parse_duration(&lookup, "RENTLOOP_REQUEST_TIMEOUT_SECS", 60)?;
        let upload_timeout = parse_duration(&lookup, "RENTLOOP_UPLOAD_TIMEOUT_SECS", 120)?;
        let cache_ttl = parse_duration(&lookup, "RENTLOOP_CACHE_TTL_SECS", 300)?;

        let featured_limit = match lookup("RENTLOOP_FEATURED_LIMIT") {
            Some(raw) => raw
                .parse()
                .context("RENTLOOP_FEATURED_LIMIT must be a positive integer")?,
            None => 12,
        };

        let storage_path = lookup("RENTLOOP_STORAGE_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            base_url,
            mode,
            request_timeout,
            upload_timeout,
            cache_ttl,
            featured_limit,
            storage_path,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn parse_duration<F>(lookup: &F, env_key: &str, default_secs: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(env_key).unwrap_or_else(|| default_secs.to_string());
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("{env_key} must be an integer number of seconds"))?;

    Ok(Duration::from_secs(secs))
}
