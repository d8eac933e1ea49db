//! Fixed protocol constants that should NOT be changed.
//!
//! These values are baked into IFTTT applets, the dynamic-DNS provider API and
//! the Kodi JSON-RPC API. Changing them breaks existing integrations.

// ─────────────────────────────────────────────────────────────────────────────
// Inbound URL Grammar
// ─────────────────────────────────────────────────────────────────────────────

/// Path prefix every remote command lives under.
pub const REMOTE_PATH_PREFIX: &str = "/ifttt/remote/";

/// Query parameter carrying the shared-secret token.
pub const AUTH_PARAM: &str = "__authorization";

/// Query parameter carrying the seek amount for `rewind` / `forward`.
pub const TIME_PARAM: &str = "__time";

/// Query parameter carrying the seek unit (`secs` or `mins`).
pub const UNIT_PARAM: &str = "__unit";

/// Query parameter carrying the track selection mode for `subtitle` / `audio`.
pub const MODE_PARAM: &str = "__mode";

// ─────────────────────────────────────────────────────────────────────────────
// Playback
// ─────────────────────────────────────────────────────────────────────────────

/// `forward` never seeks closer than this to the end of the media (seconds).
///
/// Seeking to the very end makes Kodi stop playback and drop the media.
pub const FORWARD_END_MARGIN_SECS: f64 = 5.0;

/// Kodi's player id for the video player.
pub const VIDEO_PLAYER_ID: u8 = 1;

/// JSON-RPC method for subtitle selection.
pub const SET_SUBTITLE_METHOD: &str = "Player.SetSubtitle";

/// JSON-RPC method for audio stream selection.
pub const SET_AUDIO_STREAM_METHOD: &str = "Player.SetAudioStream";

// ─────────────────────────────────────────────────────────────────────────────
// Dynamic DNS
// ─────────────────────────────────────────────────────────────────────────────

/// Plain-text "what is my IP" endpoint.
pub const DEFAULT_IP_CHECK_URL: &str = "http://checkip4.spdns.de/";

/// SPDYN update endpoint (dyndns2 protocol).
pub const DEFAULT_DNS_UPDATE_URL: &str = "https://update.spdyn.de/nic/update";

/// Settings key of the persisted last-update marker.
pub const PREV_IP_UPDATE_KEY: &str = "__prev_ip_update";

/// Text format of the persisted last-update marker (local naive time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

/// Interval between abort-signal checks (seconds).
pub const ABORT_POLL_INTERVAL_SECS: u64 = 10;

/// How long on-screen notifications stay visible (milliseconds).
pub const NOTIFICATION_DISPLAY_MS: u32 = 3000;

/// Timeout for Kodi JSON-RPC HTTP requests (seconds).
///
/// Kodi runs on the LAN or on the same host; 10 seconds is generous.
pub const JSONRPC_TIMEOUT_SECS: u64 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Application Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Application name shown as the notification title.
pub const APP_NAME: &str = "IFTTT Remote";
