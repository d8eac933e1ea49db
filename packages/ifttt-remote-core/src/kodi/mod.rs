//! Kodi media host integration.
//!
//! # Module Structure
//!
//! - `jsonrpc` - Low-level JSON-RPC envelope and transport
//! - `client` - `KodiClient` implementing player, lifecycle and notifier traits

pub mod client;
pub mod jsonrpc;

pub use client::{KodiClient, KodiTime};
pub use jsonrpc::{Credentials, JsonRpcError};
