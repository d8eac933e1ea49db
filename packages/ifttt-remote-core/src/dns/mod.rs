//! Dynamic-DNS synchronization.
//!
//! - `provider` - `DnsProvider` trait and the SPDYN HTTP implementation
//! - `synchronizer` - throttled one-shot update driven by the persisted marker

pub mod provider;
pub mod synchronizer;

pub use provider::{DnsEndpoints, DnsProvider, SpdynProvider};
pub use synchronizer::{DnsSynchronizer, SyncOutcome};
