//! Runtime configuration from the environment (and an optional `.env` file)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::controller::BrowseConfig;
use crate::sync::SyncConfig;

/// Where a previously stored API key is looked up when none is configured.
pub const API_KEY_CACHE: &str = ".cache/api_key";
pub const FALLBACK_API_KEY: &str = "secret";

#[derive(Clone, Debug, PartialEq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub tick_interval: Duration,
    pub filter_debounce: Duration,
    pub page_size: u32,
    pub log_dir: PathBuf,
    /// Tracing filter directives; `RUST_LOG` applies when unset.
    pub log_filter: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            api_key: None,
            request_timeout: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(1000),
            tick_interval: Duration::from_millis(250),
            filter_debounce: Duration::from_millis(300),
            page_size: 50,
            log_dir: PathBuf::from(".logs"),
            log_filter: None,
        }
    }
}

fn parse_number<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{} must be a number, got {:?}", key, raw))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    match parse_number::<u64>(lookup, key)? {
        Some(0) => anyhow::bail!("{} must be greater than zero", key),
        Some(ms) => Ok(Some(Duration::from_millis(ms))),
        None => Ok(None),
    }
}

impl RemoteConfig {
    /// Load `.env` if present, then read `TOUNE_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("TOUNE_URL").filter(|url| !url.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        config.api_key = lookup("TOUNE_API_KEY").filter(|key| !key.is_empty());

        if let Some(timeout) = parse_millis(&lookup, "TOUNE_TIMEOUT_MS")? {
            config.request_timeout = timeout;
        }
        if let Some(poll) = parse_millis(&lookup, "TOUNE_POLL_MS")? {
            config.poll_interval = poll;
        }
        if let Some(tick) = parse_millis(&lookup, "TOUNE_TICK_MS")? {
            config.tick_interval = tick;
        }
        if let Some(debounce) = parse_millis(&lookup, "TOUNE_DEBOUNCE_MS")? {
            config.filter_debounce = debounce;
        }
        if let Some(page_size) = parse_number::<u32>(&lookup, "TOUNE_PAGE_SIZE")? {
            if page_size == 0 {
                anyhow::bail!("TOUNE_PAGE_SIZE must be greater than zero");
            }
            config.page_size = page_size;
        }
        if let Some(dir) = lookup("TOUNE_LOG_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.log_dir = PathBuf::from(dir.trim());
        }
        config.log_filter = lookup("TOUNE_LOG").filter(|filter| !filter.trim().is_empty());

        Ok(config)
    }

    /// Configured key, else the cached one, else the backend's stock key.
    pub fn resolve_api_key(&self) -> String {
        self.resolve_api_key_from(Path::new(API_KEY_CACHE))
    }

    fn resolve_api_key_from(&self, cache: &Path) -> String {
        if let Some(key) = &self.api_key {
            return key.clone();
        }
        match std::fs::read_to_string(cache) {
            Ok(contents) if !contents.trim().is_empty() => {
                tracing::debug!(path = %cache.display(), "Using cached API key");
                contents.trim().to_string()
            }
            _ => {
                tracing::warn!("No API key configured, using the default key");
                FALLBACK_API_KEY.to_string()
            }
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            poll_interval: self.poll_interval,
            tick_interval: self.tick_interval,
            poll_timeout: None,
        }
    }

    pub fn browse_config(&self) -> BrowseConfig {
        BrowseConfig {
            page_size: self.page_size,
            filter_debounce: self.filter_debounce,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RemoteConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RemoteConfig::default());
        assert_eq!(config.sync_config().poll_interval, Duration::from_secs(1));
        assert_eq!(config.browse_config().filter_debounce, Duration::from_millis(300));
    }

    #[test]
    fn test_overrides() {
        let config = RemoteConfig::from_lookup(lookup(&[
            ("TOUNE_URL", "http://pi.local:5000/"),
            ("TOUNE_API_KEY", "k3y"),
            ("TOUNE_POLL_MS", "2000"),
            ("TOUNE_PAGE_SIZE", " 100 "),
            ("TOUNE_LOG_DIR", "/var/log/toune"),
            ("TOUNE_LOG", "toune_remote=trace"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://pi.local:5000");
        assert_eq!(config.resolve_api_key(), "k3y");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.page_size, 100);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/toune"));
        assert_eq!(config.log_filter.as_deref(), Some("toune_remote=trace"));
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        let err = RemoteConfig::from_lookup(lookup(&[("TOUNE_TICK_MS", "fast")])).unwrap_err();
        assert!(err.to_string().contains("TOUNE_TICK_MS"));
        assert!(RemoteConfig::from_lookup(lookup(&[("TOUNE_POLL_MS", "0")])).is_err());
        assert!(RemoteConfig::from_lookup(lookup(&[("TOUNE_PAGE_SIZE", "-1")])).is_err());
    }

    #[test]
    fn test_api_key_falls_back_to_default() {
        let config = RemoteConfig::default();
        let missing = Path::new("/nonexistent/toune/api_key");
        assert_eq!(config.resolve_api_key_from(missing), FALLBACK_API_KEY);
    }
}
