//! IFTTT Remote Core - remote control of a media host over HTTP.
//!
//! This crate turns authenticated `GET /ifttt/remote/<command>` requests (as
//! sent by IFTTT webhooks) into player actions, keeps a dynamic-DNS record
//! pointed at the host, and runs both under a start/stop lifecycle.
//!
//! # Architecture
//!
//! - [`api`]: HTTP listener, authorization and request routing
//! - [`commands`]: Command table and per-command handlers
//! - [`params`]: Multi-valued query parameter access
//! - [`dns`]: Throttled dynamic-DNS synchronization
//! - [`service`]: Startup, abort polling and shutdown
//! - [`kodi`]: Kodi JSON-RPC adapter for the host traits
//! - [`settings`] / [`state`]: Persistent settings and the run configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! The media host is reached only through traits, so the core logic can be
//! driven by test doubles:
//!
//! - [`MediaPlayer`](player::MediaPlayer): Playback queries and control
//! - [`Lifecycle`](lifecycle::Lifecycle): Host shutdown requests
//! - [`AbortSignal`](lifecycle::AbortSignal): Service stop indicator
//! - [`Notifier`](notify::Notifier): Operator notifications
//! - [`SettingsStore`](settings::SettingsStore): Key/value settings
//! - [`DnsProvider`](dns::DnsProvider): IP discovery and record updates

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod commands;
pub mod dns;
pub mod error;
pub mod kodi;
pub mod lifecycle;
pub mod notify;
pub mod params;
pub mod player;
pub mod protocol_constants;
pub mod service;
pub mod settings;
pub mod state;

// Re-export commonly used types at the crate root
pub use commands::{Command, CommandOutcome, CommandRegistry, SeekUnit, TrackMode};
pub use error::{ErrorCode, RemoteError, RemoteResult};
pub use lifecycle::{AbortSignal, Lifecycle, TokenAbortSignal};
pub use notify::Notifier;
pub use params::{ParamLookupError, ParamMap};
pub use player::MediaPlayer;
pub use service::{Collaborators, RemoteService, ServiceState};
pub use settings::{JsonSettingsStore, MemorySettingsStore, SettingsStore};
pub use state::Config;

// Re-export adapter types
pub use dns::{DnsEndpoints, DnsProvider, DnsSynchronizer, SpdynProvider, SyncOutcome};
pub use kodi::{Credentials, KodiClient, KodiTime};

// Re-export API types
pub use api::{start_server, AppState, ServerError};
