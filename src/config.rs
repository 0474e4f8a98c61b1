//! Client configuration from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_API_URL;
use crate::error::{Result, StoreError};
use crate::http::DEFAULT_TIMEOUT;

/// Settings for reaching the storage service and saving downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the HTTP adapter, e.g. `http://127.0.0.1:8080/api`
    pub api_url: String,
    /// Optional HTTP or SOCKS proxy
    pub proxy: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Directory downloads are written into
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            download_dir: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    /// Load from `NETSTORE_*` variables, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("NETSTORE_API_URL").unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "invalid NETSTORE_API_URL: {api_url}"
            )));
        }

        let proxy = lookup("NETSTORE_PROXY").filter(|p| !p.is_empty());

        let timeout = match lookup("NETSTORE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|err| {
                    StoreError::Config(format!("invalid NETSTORE_TIMEOUT_SECS: {err}"))
                })?;
                if secs == 0 {
                    return Err(StoreError::Config(
                        "invalid NETSTORE_TIMEOUT_SECS: must be positive".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        let download_dir = lookup("NETSTORE_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.download_dir);

        Ok(Self {
            api_url,
            proxy,
            timeout,
            download_dir,
        })
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
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://127.0.0.1:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("NETSTORE_API_URL", "https://files.example.com/api"),
            ("NETSTORE_PROXY", "socks5://127.0.0.1:1080"),
            ("NETSTORE_TIMEOUT_SECS", "5"),
            ("NETSTORE_DOWNLOAD_DIR", "/tmp/downloads"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://files.example.com/api");
        assert_eq!(config.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.download_dir, PathBuf::from("/tmp/downloads"));
    }

    #[test]
    fn test_empty_proxy_is_none() {
        let config = ClientConfig::from_lookup(lookup(&[("NETSTORE_PROXY", "")])).unwrap();
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("NETSTORE_TIMEOUT_SECS", "soon")])),
            Err(StoreError::Config(_))
        ));
        assert!(ClientConfig::from_lookup(lookup(&[("NETSTORE_TIMEOUT_SECS", "0")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("NETSTORE_API_URL", "ftp://x")])).is_err());
    }
}
