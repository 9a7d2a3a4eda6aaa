use async_trait::async_trait;
use tracing::info;

/// A user-facing message handed to the external multi-channel delivery
/// service. Delivery is fire-and-forget; the workflows log failures and
/// never roll back on them.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient_id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Default sink: writes the notification as a structured log line. Useful
/// for development and as the stand-in when no delivery service is wired.
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            recipient_id = notification.recipient_id,
            title = %notification.title,
            body = %notification.body,
            "notification"
        );
        Ok(())
    }
}
