//! Trait abstraction for the media host's player.
//!
//! Commands depend on [`MediaPlayer`] rather than on a concrete host so that
//! they can be exercised against an in-memory player in tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RemoteResult;

/// Trait for media playback predicates and primitives.
///
/// Used by `CommandRegistry` to check preconditions and to act on the player.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Returns `true` if any media (video or audio) is loaded.
    async fn has_media(&self) -> RemoteResult<bool>;

    /// Returns `true` if loaded media is playing right now.
    async fn is_playing(&self) -> RemoteResult<bool>;

    /// Returns `true` if loaded media is paused right now.
    async fn is_paused(&self) -> RemoteResult<bool>;

    /// Toggles between playing and paused.
    ///
    /// The host exposes a single toggle primitive, so this both pauses
    /// playing media and resumes paused media.
    async fn toggle_pause(&self) -> RemoteResult<()>;

    /// Stops playback.
    async fn stop(&self) -> RemoteResult<()>;

    /// Current playback position in seconds.
    async fn position(&self) -> RemoteResult<f64>;

    /// Total duration of the loaded media in seconds.
    async fn duration(&self) -> RemoteResult<f64>;

    /// Seeks to an absolute position in seconds.
    async fn seek(&self, position: f64) -> RemoteResult<()>;

    /// Sends a raw player-control command to the host.
    ///
    /// # Arguments
    /// * `method` - Host method name (e.g., "Player.SetSubtitle")
    /// * `params` - Method parameters as a JSON object
    async fn send_player_command(&self, method: &str, params: Value) -> RemoteResult<()>;
}
