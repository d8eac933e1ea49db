//! Host lifecycle and abort-signal abstractions.
//!
//! [`Lifecycle`] lets the `exit` command ask the media host to shut down
//! without knowing which host it is. [`AbortSignal`] is the cooperative stop
//! indicator the service polls while it is running.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RemoteResult;

/// Trait for media host lifecycle operations.
///
/// # Example
///
/// ```ignore
/// struct ExitHandler {
///     host: Arc<dyn Lifecycle>,
/// }
///
/// impl ExitHandler {
///     async fn run(&self) -> RemoteResult<()> {
///         self.host.request_shutdown().await
///     }
/// }
/// ```
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Requests a shutdown of the media host.
    ///
    /// Returns once the request has been delivered; the host shuts down on
    /// its own schedule.
    async fn request_shutdown(&self) -> RemoteResult<()>;
}

/// External cooperative stop indicator.
#[async_trait]
pub trait AbortSignal: Send + Sync {
    /// Returns `true` once an abort has been requested.
    fn is_abort_requested(&self) -> bool;

    /// Waits up to `timeout` for an abort.
    ///
    /// Returns `true` if the abort was requested before the timeout elapsed.
    async fn wait_for_abort(&self, timeout: Duration) -> bool;
}

/// [`AbortSignal`] backed by a cancellation token.
///
/// The standalone server cancels the token from its OS signal handler.
#[derive(Clone, Default)]
pub struct TokenAbortSignal {
    token: CancellationToken,
}

impl TokenAbortSignal {
    /// Creates a signal that has not been triggered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests an abort. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }
}

#[async_trait]
impl AbortSignal for TokenAbortSignal {
    fn is_abort_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    async fn wait_for_abort(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.token.cancelled())
            .await
            .is_ok()
    }
}
