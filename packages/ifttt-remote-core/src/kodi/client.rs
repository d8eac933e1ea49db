//! High-level Kodi client.
//!
//! [`KodiClient`] implements the player, host lifecycle and notification
//! traits on top of Kodi's JSON-RPC web API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{RemoteError, RemoteResult};
use crate::kodi::jsonrpc::{self, Credentials};
use crate::lifecycle::Lifecycle;
use crate::notify::Notifier;
use crate::player::MediaPlayer;
use crate::protocol_constants::{APP_NAME, NOTIFICATION_DISPLAY_MS};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Entry of `Player.GetActivePlayers`.
#[derive(Debug, Deserialize)]
struct ActivePlayer {
    playerid: i64,
}

/// Kodi's `Global.Time` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KodiTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
}

impl KodiTime {
    /// Converts seconds (clamped at zero) to a Kodi time object.
    pub fn from_secs(secs: f64) -> Self {
        let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
        Self {
            hours: (total_ms / 3_600_000) as u32,
            minutes: ((total_ms / 60_000) % 60) as u32,
            seconds: ((total_ms / 1000) % 60) as u32,
            milliseconds: (total_ms % 1000) as u32,
        }
    }

    /// Total seconds represented by this time.
    pub fn as_secs(&self) -> f64 {
        f64::from(self.hours) * 3600.0
            + f64::from(self.minutes) * 60.0
            + f64::from(self.seconds)
            + f64::from(self.milliseconds) / 1000.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Kodi JSON-RPC client.
pub struct KodiClient {
    http: Client,
    url: String,
    credentials: Option<Credentials>,
}

impl KodiClient {
    /// Creates a client for the JSON-RPC endpoint at `url`.
    #[must_use]
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            credentials: None,
        }
    }

    /// Sets Basic auth credentials for the Kodi web server.
    #[must_use]
    pub fn with_credentials(mut self, username: String, password: Option<String>) -> Self {
        self.credentials = Some(Credentials { username, password });
        self
    }

    async fn call(&self, method: &str, params: Value) -> RemoteResult<Value> {
        jsonrpc::call(
            &self.http,
            &self.url,
            self.credentials.as_ref(),
            method,
            &params,
        )
        .await
        .map_err(RemoteError::from)
    }

    /// Returns the id of the first active player, if any.
    async fn active_player(&self) -> RemoteResult<Option<i64>> {
        let result = self.call("Player.GetActivePlayers", json!({})).await?;
        let players: Vec<ActivePlayer> = serde_json::from_value(result)
            .map_err(|e| RemoteError::Player(format!("GetActivePlayers: {}", e)))?;
        Ok(players.first().map(|p| p.playerid))
    }

    async fn require_player(&self) -> RemoteResult<i64> {
        self.active_player()
            .await?
            .ok_or_else(|| RemoteError::Player("no active player".into()))
    }

    /// Reads one property of the active player.
    async fn property(&self, player_id: i64, name: &str) -> RemoteResult<Value> {
        let mut result = self
            .call(
                "Player.GetProperties",
                json!({ "playerid": player_id, "properties": [name] }),
            )
            .await?;
        result
            .get_mut(name)
            .map(Value::take)
            .ok_or_else(|| RemoteError::Player(format!("property {} missing", name)))
    }

    /// Playback speed of the active player, or `None` with no media loaded.
    async fn speed(&self) -> RemoteResult<Option<f64>> {
        let Some(player_id) = self.active_player().await? else {
            return Ok(None);
        };
        let speed = self.property(player_id, "speed").await?;
        speed
            .as_f64()
            .map(Some)
            .ok_or_else(|| RemoteError::Player(format!("invalid speed: {}", speed)))
    }

    async fn time_property(&self, name: &str) -> RemoteResult<f64> {
        let player_id = self.require_player().await?;
        let value = self.property(player_id, name).await?;
        let time: KodiTime = serde_json::from_value(value)
            .map_err(|e| RemoteError::Player(format!("invalid {}: {}", name, e)))?;
        Ok(time.as_secs())
    }
}

#[async_trait]
impl MediaPlayer for KodiClient {
    async fn has_media(&self) -> RemoteResult<bool> {
        Ok(self.active_player().await?.is_some())
    }

    async fn is_playing(&self) -> RemoteResult<bool> {
        Ok(matches!(self.speed().await?, Some(speed) if speed != 0.0))
    }

    async fn is_paused(&self) -> RemoteResult<bool> {
        Ok(matches!(self.speed().await?, Some(speed) if speed == 0.0))
    }

    async fn toggle_pause(&self) -> RemoteResult<()> {
        let player_id = self.require_player().await?;
        self.call(
            "Player.PlayPause",
            json!({ "playerid": player_id, "play": "toggle" }),
        )
        .await?;
        Ok(())
    }

    async fn stop(&self) -> RemoteResult<()> {
        let player_id = self.require_player().await?;
        self.call("Player.Stop", json!({ "playerid": player_id }))
            .await?;
        Ok(())
    }

    async fn position(&self) -> RemoteResult<f64> {
        self.time_property("time").await
    }

    async fn duration(&self) -> RemoteResult<f64> {
        self.time_property("totaltime").await
    }

    async fn seek(&self, position: f64) -> RemoteResult<()> {
        let player_id = self.require_player().await?;
        self.call(
            "Player.Seek",
            json!({ "playerid": player_id, "value": { "time": KodiTime::from_secs(position) } }),
        )
        .await?;
        Ok(())
    }

    async fn send_player_command(&self, method: &str, params: Value) -> RemoteResult<()> {
        self.call(method, params).await?;
        Ok(())
    }
}

#[async_trait]
impl Lifecycle for KodiClient {
    async fn request_shutdown(&self) -> RemoteResult<()> {
        log::info!("[Kodi] Requesting application quit");
        self.call("Application.Quit", json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for KodiClient {
    async fn show(&self, message: &str) {
        let params = json!({
            "title": APP_NAME,
            "message": message,
            "displaytime": NOTIFICATION_DISPLAY_MS,
        });
        if let Err(e) = self.call("GUI.ShowNotification", params).await {
            log::warn!("[Kodi] Failed to show notification {:?}: {}", message, e);
        }
    }
}
