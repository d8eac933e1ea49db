//! Core configuration types.
//!
//! [`Config`] is the immutable snapshot of the add-on settings for one run.
//! It is loaded once at startup and shared by reference; nothing reloads it.

use crate::error::{RemoteError, RemoteResult};
use crate::settings::SettingsStore;

/// Settings keys read at startup.
pub mod keys {
    /// Port the HTTP listener binds to.
    pub const SERVICE_PORT: &str = "servicePort";
    /// Shared-secret token IFTTT sends as `__authorization`.
    pub const USER_TOKEN: &str = "userToken";
    /// Dynamic-DNS hostname (also the Basic auth user name).
    pub const SPDYN_HOST: &str = "spdynHost";
    /// Dynamic-DNS update token (Basic auth password).
    pub const SPDYN_TOKEN: &str = "spdynToken";
    /// Minimum minutes between two IP updates.
    pub const SPDYN_UPDATE_INTERVAL: &str = "spdynUpdateIntervalLimit";
}

/// Configuration for the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // Server
    /// Port the HTTP listener binds to on all interfaces.
    pub listen_port: u16,

    /// Token every request must carry in `__authorization`.
    pub auth_token: String,

    // Dynamic DNS
    /// Hostname registered with the dynamic-DNS provider.
    pub dns_hostname: String,

    /// Update token for the dynamic-DNS provider.
    pub dns_token: String,

    /// Minimum interval between two provider updates (minutes).
    pub min_update_interval_minutes: u64,
}

impl Config {
    /// Loads the configuration from a settings store.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::MissingConfiguration`] naming the first key that
    /// is absent, empty or not a valid number.
    pub fn from_settings(settings: &dyn SettingsStore) -> RemoteResult<Self> {
        let listen_port = required(settings, keys::SERVICE_PORT)?;
        let listen_port = parse_number(keys::SERVICE_PORT, &listen_port)?;
        let auth_token = required(settings, keys::USER_TOKEN)?;
        let dns_hostname = required(settings, keys::SPDYN_HOST)?;
        let dns_token = required(settings, keys::SPDYN_TOKEN)?;
        let interval = required(settings, keys::SPDYN_UPDATE_INTERVAL)?;
        let min_update_interval_minutes = parse_number(keys::SPDYN_UPDATE_INTERVAL, &interval)?;

        Ok(Self {
            listen_port,
            auth_token,
            dns_hostname,
            dns_token,
            min_update_interval_minutes,
        })
    }
}

fn required(settings: &dyn SettingsStore, key: &str) -> RemoteResult<String> {
    settings
        .get(key)
        .ok_or_else(|| RemoteError::MissingConfiguration(key.to_string()))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> RemoteResult<T> {
    value.trim().parse().map_err(|_| {
        RemoteError::MissingConfiguration(format!("{} is not a valid number: {:?}", key, value))
    })
}
