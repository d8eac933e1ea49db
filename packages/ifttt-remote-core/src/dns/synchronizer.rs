//! Throttled public-IP synchronization.
//!
//! The last successful update is persisted in the settings store as local
//! naive time with one-second resolution. Timestamps are always round-tripped
//! through that text format so comparisons never see sub-second or timezone
//! information.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::dns::provider::DnsProvider;
use crate::error::{RemoteError, RemoteResult};
use crate::protocol_constants::{PREV_IP_UPDATE_KEY, TIMESTAMP_FORMAT};
use crate::settings::SettingsStore;
use crate::state::Config;

/// Result of a successful [`DnsSynchronizer::sync_if_due`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The previous update is recent enough; nothing was sent.
    Skipped { last_update: NaiveDateTime },
    /// The provider accepted (or already had) this address.
    Updated { ip: String },
}

/// Formats a timestamp the way it is persisted.
pub fn format_timestamp(time: NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a persisted timestamp.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

/// Current local time truncated to the persisted resolution.
pub fn current_time() -> NaiveDateTime {
    let now = Local::now().naive_local();
    parse_timestamp(&format_timestamp(now)).unwrap_or(now)
}

/// Returns `true` if the provider reply confirms `ip`.
pub fn is_accepted_reply(reply: &str, ip: &str) -> bool {
    reply == format!("nochg {}", ip) || reply == format!("good {}", ip)
}

/// Source of the current local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Keeps the dynamic-DNS record pointed at the host's public IP.
pub struct DnsSynchronizer {
    provider: Arc<dyn DnsProvider>,
    settings: Arc<dyn SettingsStore>,
    hostname: String,
    token: String,
    min_interval_secs: i64,
    clock: Clock,
}

impl DnsSynchronizer {
    /// Creates a synchronizer from the run configuration.
    pub fn new(
        config: &Config,
        provider: Arc<dyn DnsProvider>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        let min_interval_secs = config
            .min_update_interval_minutes
            .saturating_mul(60)
            .try_into()
            .unwrap_or(i64::MAX);
        Self {
            provider,
            settings,
            hostname: config.dns_hostname.clone(),
            token: config.dns_token.clone(),
            min_interval_secs,
            clock: Arc::new(current_time),
        }
    }

    /// Replaces the wall clock.
    #[must_use]
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Updates the record unless the last update is too recent.
    ///
    /// The persisted marker is the time the provider confirmed the update,
    /// read after both network calls.
    pub async fn sync_if_due(&self) -> RemoteResult<SyncOutcome> {
        let now = (self.clock)();
        if let Some(last_update) = self.last_update() {
            if (now - last_update).num_seconds() < self.min_interval_secs {
                log::info!(
                    "[Dns] Not updating the IP address this time (last update {})",
                    format_timestamp(last_update)
                );
                return Ok(SyncOutcome::Skipped { last_update });
            }
        }

        log::info!("[Dns] Updating the IP address for {}", self.hostname);

        let ip = self.provider.discover_ip().await?;
        log::debug!("[Dns] Discovered public IP {}", ip);

        let reply = self
            .provider
            .update(&self.hostname, &self.token, &ip)
            .await?;

        if !is_accepted_reply(&reply, &ip) {
            log::error!("[Dns] Invalid IP address update response: {}", reply);
            return Err(RemoteError::DnsUpdateFailed(reply));
        }

        log::info!("[Dns] Successfully updated the IP address to {}", ip);
        let completed = (self.clock)();
        self.settings
            .set(PREV_IP_UPDATE_KEY, &format_timestamp(completed))?;

        Ok(SyncOutcome::Updated { ip })
    }

    fn last_update(&self) -> Option<NaiveDateTime> {
        let text = self.settings.get(PREV_IP_UPDATE_KEY)?;
        let parsed = parse_timestamp(&text);
        if parsed.is_none() {
            log::warn!(
                "[Dns] Ignoring unparsable {} value {:?}",
                PREV_IP_UPDATE_KEY,
                text
            );
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::settings::MemorySettingsStore;

    /// Manually driven clock shared by the synchronizer and the provider.
    #[derive(Clone)]
    struct TestClock(Arc<Mutex<NaiveDateTime>>);

    impl TestClock {
        fn at(text: &str) -> Self {
            Self(Arc::new(Mutex::new(at(text))))
        }

        fn now(&self) -> NaiveDateTime {
            *self.0.lock()
        }

        fn advance(&self, secs: i64) {
            *self.0.lock() += chrono::Duration::seconds(secs);
        }
    }

    /// Mock provider returning canned replies and counting calls.
    struct MockProvider {
        ip: String,
        reply: String,
        calls: AtomicUsize,
        updates: Mutex<Vec<(String, String, String)>>,
        /// Advanced by `update_secs` during each update call.
        clock: Option<(TestClock, i64)>,
    }

    impl MockProvider {
        fn new(ip: &str, reply: &str) -> Self {
            Self {
                ip: ip.to_string(),
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                updates: Mutex::new(Vec::new()),
                clock: None,
            }
        }

        fn taking(mut self, clock: &TestClock, update_secs: i64) -> Self {
            self.clock = Some((clock.clone(), update_secs));
            self
        }
    }

    #[async_trait]
    impl DnsProvider for MockProvider {
        async fn discover_ip(&self) -> RemoteResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.ip.clone())
        }

        async fn update(&self, hostname: &str, token: &str, ip: &str) -> RemoteResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.updates
                .lock()
                .push((hostname.to_string(), token.to_string(), ip.to_string()));
            if let Some((clock, secs)) = &self.clock {
                clock.advance(*secs);
            }
            Ok(self.reply.clone())
        }
    }

    /// Provider whose IP lookup fails.
    struct UnreachableProvider;

    #[async_trait]
    impl DnsProvider for UnreachableProvider {
        async fn discover_ip(&self) -> RemoteResult<String> {
            Err(RemoteError::Network("connection refused".into()))
        }

        async fn update(&self, _hostname: &str, _token: &str, _ip: &str) -> RemoteResult<String> {
            unreachable!("update must not run after a failed lookup")
        }
    }

    fn config(interval_minutes: u64) -> Config {
        Config {
            listen_port: 8090,
            auth_token: "s3cret".into(),
            dns_hostname: "home.spdns.de".into(),
            dns_token: "abcd-efgh".into(),
            min_update_interval_minutes: interval_minutes,
        }
    }

    fn at(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    fn synchronizer(
        provider: Arc<dyn DnsProvider>,
        settings: Arc<MemorySettingsStore>,
        interval_minutes: u64,
        clock: &TestClock,
    ) -> DnsSynchronizer {
        let clock = clock.clone();
        DnsSynchronizer::new(
            &config(interval_minutes),
            provider,
            settings as Arc<dyn SettingsStore>,
        )
        .with_clock(move || clock.now())
    }

    #[tokio::test]
    async fn skips_when_updated_recently() {
        let provider = Arc::new(MockProvider::new("1.2.3.4", "good 1.2.3.4"));
        let settings = Arc::new(MemorySettingsStore::with_values([(
            PREV_IP_UPDATE_KEY,
            "2024-03-01 12:00:00",
        )]));
        let clock = TestClock::at("2024-03-01 12:03:00");
        let sync = synchronizer(provider.clone(), settings, 10, &clock);

        let outcome = sync.sync_if_due().await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Skipped {
                last_update: at("2024-03-01 12:00:00")
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn updates_when_interval_elapsed() {
        let provider = Arc::new(MockProvider::new("1.2.3.4", "good 1.2.3.4"));
        let settings = Arc::new(MemorySettingsStore::with_values([(
            PREV_IP_UPDATE_KEY,
            "2024-03-01 12:00:00",
        )]));
        let clock = TestClock::at("2024-03-01 12:10:00");
        let sync = synchronizer(provider.clone(), settings.clone(), 10, &clock);

        let outcome = sync.sync_if_due().await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Updated {
                ip: "1.2.3.4".into()
            }
        );
        assert_eq!(
            *provider.updates.lock(),
            vec![(
                "home.spdns.de".to_string(),
                "abcd-efgh".to_string(),
                "1.2.3.4".to_string()
            )]
        );
        assert_eq!(
            settings.get(PREV_IP_UPDATE_KEY).as_deref(),
            Some("2024-03-01 12:10:00")
        );
    }

    #[tokio::test]
    async fn marker_records_completion_time() {
        let clock = TestClock::at("2024-03-01 08:00:00");
        let provider = Arc::new(MockProvider::new("1.2.3.4", "good 1.2.3.4").taking(&clock, 45));
        let settings = Arc::new(MemorySettingsStore::new());
        let sync = synchronizer(provider, settings.clone(), 10, &clock);

        sync.sync_if_due().await.unwrap();

        assert_eq!(
            settings.get(PREV_IP_UPDATE_KEY).as_deref(),
            Some("2024-03-01 08:00:45")
        );
    }

    #[tokio::test]
    async fn first_run_always_updates() {
        let provider = Arc::new(MockProvider::new("5.6.7.8", "nochg 5.6.7.8"));
        let settings = Arc::new(MemorySettingsStore::new());
        let clock = TestClock::at("2024-03-01 08:00:00");
        let sync = synchronizer(provider.clone(), settings.clone(), 60, &clock);

        sync.sync_if_due().await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(settings.get(PREV_IP_UPDATE_KEY).is_some());
    }

    #[tokio::test]
    async fn rejected_reply_keeps_marker_and_reports_text() {
        let provider = Arc::new(MockProvider::new("1.2.3.4", "badauth"));
        let settings = Arc::new(MemorySettingsStore::new());
        let clock = TestClock::at("2024-03-01 08:00:00");
        let sync = synchronizer(provider, settings.clone(), 10, &clock);

        match sync.sync_if_due().await {
            Err(RemoteError::DnsUpdateFailed(reply)) => assert_eq!(reply, "badauth"),
            other => panic!("Expected DnsUpdateFailed, got {:?}", other),
        }
        assert_eq!(settings.get(PREV_IP_UPDATE_KEY), None);
    }

    #[tokio::test]
    async fn reply_for_other_ip_is_rejected() {
        let provider = Arc::new(MockProvider::new("1.2.3.4", "good 9.9.9.9"));
        let clock = TestClock::at("2024-03-01 08:00:00");
        let sync = synchronizer(provider, Arc::new(MemorySettingsStore::new()), 10, &clock);
        assert!(matches!(
            sync.sync_if_due().await,
            Err(RemoteError::DnsUpdateFailed(_))
        ));
    }

    #[tokio::test]
    async fn unparsable_marker_is_ignored() {
        let provider = Arc::new(MockProvider::new("1.2.3.4", "good 1.2.3.4"));
        let settings = Arc::new(MemorySettingsStore::with_values([(
            PREV_IP_UPDATE_KEY,
            "yesterday",
        )]));
        let clock = TestClock::at("2024-03-01 08:00:00");
        let sync = synchronizer(provider.clone(), settings, 10, &clock);

        let outcome = sync.sync_if_due().await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Updated { .. }));
    }

    #[tokio::test]
    async fn network_failure_propagates() {
        let clock = TestClock::at("2024-03-01 08:00:00");
        let sync = synchronizer(
            Arc::new(UnreachableProvider),
            Arc::new(MemorySettingsStore::new()),
            10,
            &clock,
        );
        assert!(matches!(
            sync.sync_if_due().await,
            Err(RemoteError::Network(_))
        ));
    }

    #[test]
    fn accepted_replies() {
        assert!(is_accepted_reply("good 1.2.3.4", "1.2.3.4"));
        assert!(is_accepted_reply("nochg 1.2.3.4", "1.2.3.4"));
        assert!(!is_accepted_reply("badauth", "1.2.3.4"));
        assert!(!is_accepted_reply("good  1.2.3.4", "1.2.3.4"));
    }

    #[test]
    fn current_time_has_whole_seconds() {
        use chrono::Timelike;
        assert_eq!(current_time().nanosecond(), 0);
    }
}
