//! Remote command registry.
//!
//! Every command IFTTT can trigger is a variant of [`Command`]. A command first
//! checks its precondition against the player, then parses its parameters,
//! and only then acts; nothing touches the player if either step fails.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;

use crate::error::{RemoteError, RemoteResult};
use crate::lifecycle::Lifecycle;
use crate::params::ParamMap;
use crate::player::MediaPlayer;
use crate::protocol_constants::{
    FORWARD_END_MARGIN_SECS, MODE_PARAM, SET_AUDIO_STREAM_METHOD, SET_SUBTITLE_METHOD,
    TIME_PARAM, UNIT_PARAM, VIDEO_PLAYER_ID,
};

// ─────────────────────────────────────────────────────────────────────────────
// Command Set
// ─────────────────────────────────────────────────────────────────────────────

/// The fixed set of remote commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Pause,
    Resume,
    Stop,
    Rewind,
    Forward,
    Exit,
    Subtitle,
    Audio,
}

impl Command {
    /// Every command, in registry order.
    pub const ALL: [Command; 8] = [
        Command::Pause,
        Command::Resume,
        Command::Stop,
        Command::Rewind,
        Command::Forward,
        Command::Exit,
        Command::Subtitle,
        Command::Audio,
    ];

    /// Wire name used in the request path.
    pub fn name(self) -> &'static str {
        match self {
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Stop => "stop",
            Command::Rewind => "rewind",
            Command::Forward => "forward",
            Command::Exit => "exit",
            Command::Subtitle => "subtitle",
            Command::Audio => "audio",
        }
    }

    /// Looks a command up by exact, case-sensitive name.
    pub fn from_name(name: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| RemoteError::UnknownCommand(s.to_string()))
    }
}

/// What a successful command did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    Paused,
    Resumed,
    Stopped,
    Seeked { position: f64 },
    ShutdownRequested,
    SubtitleSwitched,
    AudioSwitched,
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Paused => f.write_str("paused"),
            CommandOutcome::Resumed => f.write_str("resumed"),
            CommandOutcome::Stopped => f.write_str("stopped"),
            CommandOutcome::Seeked { position } => write!(f, "seeked to {:.1}s", position),
            CommandOutcome::ShutdownRequested => f.write_str("shutdown requested"),
            CommandOutcome::SubtitleSwitched => f.write_str("subtitle switched"),
            CommandOutcome::AudioSwitched => f.write_str("audio switched"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameter Types
// ─────────────────────────────────────────────────────────────────────────────

/// Unit of the `__time` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekUnit {
    Secs,
    Mins,
}

impl SeekUnit {
    /// Converts an amount in this unit to seconds.
    pub fn to_secs(self, amount: f64) -> f64 {
        match self {
            SeekUnit::Secs => amount,
            SeekUnit::Mins => amount * 60.0,
        }
    }
}

impl FromStr for SeekUnit {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secs" => Ok(SeekUnit::Secs),
            "mins" => Ok(SeekUnit::Mins),
            other => Err(RemoteError::InvalidParameter(format!(
                "invalid unit: {}",
                other
            ))),
        }
    }
}

/// Track selection mode of the `__mode` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    Previous,
    Next,
    On,
    Off,
}

impl TrackMode {
    fn as_str(self) -> &'static str {
        match self {
            TrackMode::Previous => "previous",
            TrackMode::Next => "next",
            TrackMode::On => "on",
            TrackMode::Off => "off",
        }
    }

    /// Parses a mode, allowing `on`/`off` only when `allow_toggle` is set.
    fn parse(value: &str, allow_toggle: bool) -> RemoteResult<Self> {
        match (value, allow_toggle) {
            ("previous", _) => Ok(TrackMode::Previous),
            ("next", _) => Ok(TrackMode::Next),
            ("on", true) => Ok(TrackMode::On),
            ("off", true) => Ok(TrackMode::Off),
            (other, _) => Err(RemoteError::InvalidParameter(format!(
                "invalid mode: {}",
                other
            ))),
        }
    }
}

/// Reads `__time` and `__unit` and returns the seek delta in seconds.
///
/// The amount must be a finite, non-negative number; the command name gives
/// the direction.
fn seek_delta(params: &ParamMap) -> RemoteResult<f64> {
    let raw = params.single(TIME_PARAM)?;
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| RemoteError::InvalidParameter(format!("invalid time: {}", raw)))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(RemoteError::InvalidParameter(format!(
            "invalid time: {}",
            raw
        )));
    }
    let unit: SeekUnit = params.single(UNIT_PARAM)?.parse()?;
    Ok(unit.to_secs(amount))
}

/// Position after rewinding `delta` seconds; never before the start.
pub fn rewind_target(position: f64, delta: f64) -> f64 {
    (position - delta).max(0.0)
}

/// Position after forwarding `delta` seconds.
///
/// Never lands within [`FORWARD_END_MARGIN_SECS`] of the end, and never
/// before the start when the media is shorter than the margin.
pub fn forward_target(position: f64, delta: f64, duration: f64) -> f64 {
    let ceiling = (duration - FORWARD_END_MARGIN_SECS).max(0.0);
    (position + delta).min(ceiling)
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Executes commands against the player and the media host.
#[derive(Clone)]
pub struct CommandRegistry {
    player: Arc<dyn MediaPlayer>,
    host: Arc<dyn Lifecycle>,
}

impl CommandRegistry {
    /// Creates a registry acting on `player` and `host`.
    pub fn new(player: Arc<dyn MediaPlayer>, host: Arc<dyn Lifecycle>) -> Self {
        Self { player, host }
    }

    /// Looks `name` up and executes it.
    ///
    /// # Errors
    ///
    /// [`RemoteError::UnknownCommand`] if `name` is not a command, otherwise
    /// whatever the command itself fails with.
    pub async fn dispatch(&self, name: &str, params: &ParamMap) -> RemoteResult<CommandOutcome> {
        let command: Command = name.parse()?;
        self.execute(command, params).await
    }

    /// Executes `command` with `params`.
    pub async fn execute(
        &self,
        command: Command,
        params: &ParamMap,
    ) -> RemoteResult<CommandOutcome> {
        match command {
            Command::Pause => self.pause().await,
            Command::Resume => self.resume().await,
            Command::Stop => self.stop().await,
            Command::Rewind => self.rewind(params).await,
            Command::Forward => self.forward(params).await,
            Command::Exit => self.exit().await,
            Command::Subtitle => self.subtitle(params).await,
            Command::Audio => self.audio(params).await,
        }
    }

    async fn require_media(&self) -> RemoteResult<()> {
        if !self.player.has_media().await? {
            return Err(RemoteError::PreconditionFailed("no media loaded".into()));
        }
        Ok(())
    }

    async fn pause(&self) -> RemoteResult<CommandOutcome> {
        if !self.player.has_media().await? || !self.player.is_playing().await? {
            return Err(RemoteError::PreconditionFailed("not playing".into()));
        }
        self.player.toggle_pause().await?;
        Ok(CommandOutcome::Paused)
    }

    async fn resume(&self) -> RemoteResult<CommandOutcome> {
        if !self.player.has_media().await? || !self.player.is_paused().await? {
            return Err(RemoteError::PreconditionFailed("not paused".into()));
        }
        // Toggling a paused stream resumes it.
        self.player.toggle_pause().await?;
        Ok(CommandOutcome::Resumed)
    }

    async fn stop(&self) -> RemoteResult<CommandOutcome> {
        self.require_media().await?;
        self.player.stop().await?;
        Ok(CommandOutcome::Stopped)
    }

    async fn rewind(&self, params: &ParamMap) -> RemoteResult<CommandOutcome> {
        self.require_media().await?;
        let delta = seek_delta(params)?;
        let position = rewind_target(self.player.position().await?, delta);
        self.player.seek(position).await?;
        Ok(CommandOutcome::Seeked { position })
    }

    async fn forward(&self, params: &ParamMap) -> RemoteResult<CommandOutcome> {
        self.require_media().await?;
        let delta = seek_delta(params)?;
        let current = self.player.position().await?;
        let duration = self.player.duration().await?;
        let position = forward_target(current, delta, duration);
        self.player.seek(position).await?;
        Ok(CommandOutcome::Seeked { position })
    }

    async fn exit(&self) -> RemoteResult<CommandOutcome> {
        self.host.request_shutdown().await?;
        Ok(CommandOutcome::ShutdownRequested)
    }

    async fn subtitle(&self, params: &ParamMap) -> RemoteResult<CommandOutcome> {
        self.require_media().await?;
        let mode = TrackMode::parse(params.single(MODE_PARAM)?, true)?;
        self.player
            .send_player_command(
                SET_SUBTITLE_METHOD,
                json!({ "playerid": VIDEO_PLAYER_ID, "subtitle": mode.as_str() }),
            )
            .await?;
        Ok(CommandOutcome::SubtitleSwitched)
    }

    async fn audio(&self, params: &ParamMap) -> RemoteResult<CommandOutcome> {
        self.require_media().await?;
        let mode = TrackMode::parse(params.single(MODE_PARAM)?, false)?;
        self.player
            .send_player_command(
                SET_AUDIO_STREAM_METHOD,
                json!({ "playerid": VIDEO_PLAYER_ID, "stream": mode.as_str() }),
            )
            .await?;
        Ok(CommandOutcome::AudioSwitched)
    }
}
