//! Daily reminder lifecycle and diagnostic notifications.

use larder_core::{
    error::LarderError,
    keys,
    notification::{NotificationContent, Trigger},
    traits::{KeyValueStore, NotificationDispatcher},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the single daily reminder handle.
pub struct Reminders {
    store: Arc<dyn KeyValueStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    hour: u32,
    minute: u32,
}

impl Reminders {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        hour: u32,
        minute: u32,
    ) -> Self {
        Self {
            store,
            dispatcher,
            hour,
            minute,
        }
    }

    /// Replace any existing daily reminder with a fresh one and return its id.
    ///
    /// Safe to call repeatedly: at most one daily reminder is ever live.
    /// If the current handle cannot be read, nothing is scheduled.
    pub async fn schedule_daily(&self) -> Result<String, LarderError> {
        self.cancel_daily().await?;

        let id = self
            .dispatcher
            .schedule(
                NotificationContent::daily_suggestion(),
                Trigger::Daily {
                    hour: self.hour,
                    minute: self.minute,
                },
            )
            .await?;

        if let Err(e) = self.store.set(keys::DAILY_NOTIFICATION_ID, &id).await {
            // An untracked reminder could never be cancelled; drop it.
            if let Err(cancel_err) = self.dispatcher.cancel(&id).await {
                warn!("failed to roll back daily reminder {id}: {cancel_err}");
            }
            return Err(e);
        }

        info!(
            notification_id = %id,
            "daily reminder scheduled for {:02}:{:02}",
            self.hour,
            self.minute
        );
        Ok(id)
    }

    /// Cancel and forget the daily reminder, returning the cancelled id.
    ///
    /// A dispatcher failure is logged and the handle is cleared anyway.
    pub async fn cancel_daily(&self) -> Result<Option<String>, LarderError> {
        let Some(existing) = self.store.get(keys::DAILY_NOTIFICATION_ID).await? else {
            return Ok(None);
        };
        if let Err(e) = self.dispatcher.cancel(&existing).await {
            warn!("cancel daily reminder {existing} failed: {e}");
        }
        self.store.remove(keys::DAILY_NOTIFICATION_ID).await?;
        Ok(Some(existing))
    }

    /// Currently stored daily reminder id.
    pub async fn daily_handle(&self) -> Result<Option<String>, LarderError> {
        self.store.get(keys::DAILY_NOTIFICATION_ID).await
    }

    /// Fire a test notification right away.
    pub async fn test_immediate(&self) -> Result<String, LarderError> {
        self.dispatcher
            .notify_now(NotificationContent::test_immediate())
            .await
    }

    /// Fire a test notification after `seconds`.
    pub async fn test_scheduled(&self, seconds: u64) -> Result<String, LarderError> {
        self.dispatcher
            .schedule(
                NotificationContent::test_scheduled(seconds),
                Trigger::AfterSeconds { seconds },
            )
            .await
    }
}
