//! Service lifecycle.
//!
//! [`RemoteService`] owns one run of the service:
//!
//! 1. Load the configuration (missing settings end the run before anything starts)
//! 2. Spawn the one-shot dynamic-DNS sync as its own task
//! 3. Announce the start and spawn the HTTP listener task
//! 4. Poll the abort signal until it fires
//! 5. Announce the stop, drop an unfinished DNS sync and shut the listener
//!    down gracefully
//!
//! The DNS calls carry no timeout, so they never run on the controlling task:
//! a hung provider delays only its own task.
//!
//! A run moves `NotStarted → Running → Stopped` and never re-enters a state.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{start_server, AppState};
use crate::commands::CommandRegistry;
use crate::dns::{DnsProvider, DnsSynchronizer};
use crate::lifecycle::{AbortSignal, Lifecycle};
use crate::notify::Notifier;
use crate::player::MediaPlayer;
use crate::protocol_constants::ABORT_POLL_INTERVAL_SECS;
use crate::settings::SettingsStore;
use crate::state::Config;

/// Notification shown when the listener starts.
pub const START_MESSAGE: &str = "Starting the IFTTT remote service";

/// Notification shown when the service stops.
pub const STOP_MESSAGE: &str = "Stopping the IFTTT remote service";

/// Lifecycle state of a [`RemoteService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    NotStarted,
    Running,
    Stopped,
}

/// External collaborators the service is wired with.
#[derive(Clone)]
pub struct Collaborators {
    /// Source of the configuration and store of the DNS update marker.
    pub settings: Arc<dyn SettingsStore>,
    /// Player the commands act on.
    pub player: Arc<dyn MediaPlayer>,
    /// Media host receiving the `exit` command.
    pub host: Arc<dyn Lifecycle>,
    /// Operator notification sink.
    pub notifier: Arc<dyn Notifier>,
    /// Dynamic-DNS provider.
    pub dns_provider: Arc<dyn DnsProvider>,
    /// Stop indicator polled while running.
    pub abort: Arc<dyn AbortSignal>,
}

/// One run of the remote service.
pub struct RemoteService {
    deps: Collaborators,
    poll_interval: Duration,
    state: ServiceState,
}

impl RemoteService {
    /// Creates a service that has not started yet.
    pub fn new(deps: Collaborators) -> Self {
        Self {
            deps,
            poll_interval: Duration::from_secs(ABORT_POLL_INTERVAL_SECS),
            state: ServiceState::NotStarted,
        }
    }

    /// Overrides the abort polling cadence.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Runs the service until the abort signal fires.
    ///
    /// Returns the final state: `NotStarted` if the configuration was
    /// incomplete, `Stopped` otherwise. Calling `run` again after it has
    /// returned does nothing.
    pub async fn run(&mut self) -> ServiceState {
        if self.state != ServiceState::NotStarted {
            log::warn!("[Service] run() called in state {:?}, ignoring", self.state);
            return self.state;
        }

        let config = match Config::from_settings(self.deps.settings.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("[Service] Missing settings, not starting: {}", e);
                return self.state;
            }
        };

        self.state = ServiceState::Running;
        let tasks = self.start(&config).await;

        self.wait_for_abort().await;

        self.deps.notifier.show(STOP_MESSAGE).await;
        if !tasks.dns_sync.is_finished() {
            log::warn!("[Service] DNS sync still pending at shutdown, abandoning it");
            tasks.dns_sync.abort();
        }
        tasks.shutdown.cancel();
        if let Err(e) = tasks.listener.await {
            log::error!("[Service] Listener task failed: {}", e);
        }

        self.state = ServiceState::Stopped;
        log::info!("[Service] Stopped");
        self.state
    }

    /// Startup work on entering `Running`.
    async fn start(&self, config: &Config) -> RunningTasks {
        let dns = DnsSynchronizer::new(
            config,
            Arc::clone(&self.deps.dns_provider),
            Arc::clone(&self.deps.settings),
        );
        let dns_sync = tokio::spawn(async move {
            match dns.sync_if_due().await {
                Ok(outcome) => log::info!("[Service] DNS sync: {:?}", outcome),
                Err(e) => log::error!("[Service] DNS sync failed: {}", e),
            }
        });

        self.deps.notifier.show(START_MESSAGE).await;

        let registry = CommandRegistry::new(
            Arc::clone(&self.deps.player),
            Arc::clone(&self.deps.host),
        );
        let app_state = AppState::new(registry, config.auth_token.as_str());
        let port = config.listen_port;
        let shutdown = CancellationToken::new();

        log::info!(
            "[Service] Starting the IFTTT remote service on port {}",
            port
        );
        let token = shutdown.clone();
        let listener = tokio::spawn(async move {
            if let Err(e) = start_server(app_state, port, token).await {
                log::error!("[Service] Server error on port {}: {:?}", port, e);
            }
        });

        RunningTasks {
            shutdown,
            listener,
            dns_sync,
        }
    }

    async fn wait_for_abort(&self) {
        let abort = &self.deps.abort;
        while !abort.is_abort_requested() {
            if abort.wait_for_abort(self.poll_interval).await {
                break;
            }
        }
        log::info!("[Service] Abort requested");
    }
}

/// Tasks spawned on entering `Running`.
struct RunningTasks {
    /// Stops the HTTP listener.
    shutdown: CancellationToken,
    listener: JoinHandle<()>,
    dns_sync: JoinHandle<()>,
}
