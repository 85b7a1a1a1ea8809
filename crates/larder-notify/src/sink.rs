//! Delivery sinks: where a due notification ends up.

use async_trait::async_trait;
use larder_core::{error::LarderError, notification::DisplayPolicy};
use tracing::info;

use crate::local::ScheduledNotification;

/// Puts a due notification in front of the user.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Human-readable sink name.
    fn name(&self) -> &str;

    /// Present one notification according to the display policy.
    async fn deliver(
        &self,
        notification: &ScheduledNotification,
        policy: &DisplayPolicy,
    ) -> Result<(), LarderError>;
}

/// Writes notifications to the log. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(
        &self,
        notification: &ScheduledNotification,
        policy: &DisplayPolicy,
    ) -> Result<(), LarderError> {
        if policy.show_alert {
            info!(
                notification_id = %notification.id,
                screen = ?notification.content.data.screen,
                sound = policy.play_sound,
                badge = policy.set_badge,
                "🔔 {}: {}",
                notification.content.title,
                notification.content.body
            );
        } else {
            info!(notification_id = %notification.id, "notification delivered silently");
        }
        Ok(())
    }
}
