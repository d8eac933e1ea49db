//! Operator notifications.

use async_trait::async_trait;

/// Sink for short operator-facing messages (start/stop announcements).
///
/// Notifications are best effort: implementations log delivery failures
/// instead of returning them.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Shows `message` to the operator.
    async fn show(&self, message: &str);
}
