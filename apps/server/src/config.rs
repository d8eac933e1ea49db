//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.
//! Remote-control settings (port, tokens, DNS host) live in the settings
//! store under `data_dir`; this file only says how to reach the outside world.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ifttt_remote_core::protocol_constants::{DEFAULT_DNS_UPDATE_URL, DEFAULT_IP_CHECK_URL};
use ifttt_remote_core::DnsEndpoints;
use serde::Deserialize;

/// Default Kodi JSON-RPC endpoint.
const DEFAULT_KODI_URL: &str = "http://127.0.0.1:8080/jsonrpc";

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Kodi JSON-RPC endpoint.
    /// Override: `IFTTT_REMOTE_KODI_URL`
    pub kodi_url: String,

    /// Kodi web server user, if authentication is enabled.
    /// Override: `IFTTT_REMOTE_KODI_USERNAME`
    pub kodi_username: Option<String>,

    /// Kodi web server password.
    /// Override: `IFTTT_REMOTE_KODI_PASSWORD`
    pub kodi_password: Option<String>,

    /// Directory holding `settings.json`.
    /// Override: `IFTTT_REMOTE_DATA_DIR` (handled by clap in main.rs)
    pub data_dir: PathBuf,

    /// Public IP discovery endpoint.
    /// Override: `IFTTT_REMOTE_IP_CHECK_URL`
    pub ip_check_url: String,

    /// Dynamic-DNS update endpoint.
    /// Override: `IFTTT_REMOTE_DNS_UPDATE_URL`
    pub dns_update_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            kodi_url: DEFAULT_KODI_URL.to_string(),
            kodi_username: None,
            kodi_password: None,
            data_dir: PathBuf::from("."),
            ip_check_url: DEFAULT_IP_CHECK_URL.to_string(),
            dns_update_url: DEFAULT_DNS_UPDATE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides from `lookup` (the process environment in production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("IFTTT_REMOTE_KODI_URL") {
            self.kodi_url = val;
        }

        if let Some(val) = lookup("IFTTT_REMOTE_KODI_USERNAME") {
            self.kodi_username = Some(val);
        }

        if let Some(val) = lookup("IFTTT_REMOTE_KODI_PASSWORD") {
            self.kodi_password = Some(val);
        }

        if let Some(val) = lookup("IFTTT_REMOTE_IP_CHECK_URL") {
            self.ip_check_url = val;
        }

        if let Some(val) = lookup("IFTTT_REMOTE_DNS_UPDATE_URL") {
            self.dns_update_url = val;
        }
    }

    /// Endpoints for the dynamic-DNS provider.
    pub fn dns_endpoints(&self) -> DnsEndpoints {
        DnsEndpoints {
            ip_check_url: self.ip_check_url.clone(),
            update_url: self.dns_update_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let config = ServerConfig::default();
        assert_eq!(config.kodi_url, DEFAULT_KODI_URL);
        assert_eq!(config.dns_update_url, "https://update.spdyn.de/nic/update");
        assert!(config.kodi_username.is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "kodi_url: http://tv.local:8080/jsonrpc").unwrap();
        writeln!(file, "kodi_username: kodi").unwrap();
        writeln!(file, "data_dir: /var/lib/ifttt-remote").unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.kodi_url, "http://tv.local:8080/jsonrpc");
        assert_eq!(config.kodi_username.as_deref(), Some("kodi"));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/ifttt-remote"));
        assert_eq!(config.ip_check_url, DEFAULT_IP_CHECK_URL);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "kodi_url: [unterminated").unwrap();
        assert!(ServerConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerConfig::load(Some(&dir.path().join("absent.yaml"))).is_err());
    }

    #[test]
    fn overrides_replace_values() {
        let env: HashMap<&str, &str> = [
            ("IFTTT_REMOTE_KODI_URL", "http://override/jsonrpc"),
            ("IFTTT_REMOTE_KODI_PASSWORD", "hunter2"),
            ("IFTTT_REMOTE_DNS_UPDATE_URL", "http://127.0.0.1:9/update"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.kodi_url, "http://override/jsonrpc");
        assert_eq!(config.kodi_password.as_deref(), Some("hunter2"));
        assert!(config.kodi_username.is_none());

        let endpoints = config.dns_endpoints();
        assert_eq!(endpoints.update_url, "http://127.0.0.1:9/update");
        assert_eq!(endpoints.ip_check_url, DEFAULT_IP_CHECK_URL);
    }
}
