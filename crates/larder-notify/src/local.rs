//! SQLite-backed local notification scheduler.
//!
//! Notifications are rows in `scheduled_notifications`; the delivery loop
//! polls [`LocalDispatcher::due`] and hands each row to the configured sinks.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use larder_core::{
    error::LarderError,
    notification::{DisplayPolicy, NotificationContent, NotificationData, Trigger},
    traits::NotificationDispatcher,
};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Same layout as SQLite's `datetime('now')`, always UTC.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Recurrence of a scheduled notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Daily,
}

impl Repeat {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

/// A pending notification row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNotification {
    pub id: String,
    pub content: NotificationContent,
    pub due_at: DateTime<Utc>,
    pub repeat: Option<Repeat>,
}

type Row = (String, String, String, String, String, Option<String>);

impl ScheduledNotification {
    fn from_row((id, title, body, data, due_at, repeat): Row) -> Result<Self, LarderError> {
        let data: NotificationData = serde_json::from_str(&data)?;
        let due_at = NaiveDateTime::parse_from_str(&due_at, TIMESTAMP_FORMAT)
            .map_err(|e| LarderError::Persistence(format!("bad due_at {due_at}: {e}")))?
            .and_utc();
        Ok(Self {
            id,
            content: NotificationContent { title, body, data },
            due_at,
            repeat: repeat.as_deref().and_then(Repeat::parse),
        })
    }
}

/// Next instant strictly after `now` whose wall-clock time in `now`'s zone is
/// `hour:minute`. Days where that time falls into a DST gap are skipped.
pub fn next_daily<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let tz = now.timezone();
    let mut date = now.date_naive();
    for _ in 0..3 {
        if let Some(candidate) = tz.from_local_datetime(&date.and_time(time)).earliest() {
            if candidate > *now {
                return Some(candidate.with_timezone(&Utc));
            }
        }
        date = date.succ_opt()?;
    }
    None
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Local notification dispatcher.
///
/// Built once at startup with the display policy every sink receives on delivery.
#[derive(Clone)]
pub struct LocalDispatcher {
    pool: SqlitePool,
    policy: DisplayPolicy,
}

impl LocalDispatcher {
    /// Create a dispatcher sharing the given pool. The store must already
    /// have run its migrations.
    pub fn new(pool: SqlitePool, policy: DisplayPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn policy(&self) -> DisplayPolicy {
        self.policy
    }

    /// Resolve a trigger to its first due instant.
    fn resolve(trigger: Trigger, now: DateTime<Utc>) -> Result<DateTime<Utc>, LarderError> {
        match trigger {
            Trigger::Immediate => Ok(now),
            Trigger::AfterSeconds { seconds } => {
                let secs = i64::try_from(seconds)
                    .map_err(|_| LarderError::Dispatch(format!("delay too large: {seconds}s")))?;
                Ok(now + chrono::Duration::seconds(secs))
            }
            Trigger::Daily { hour, minute } => next_daily(&now.with_timezone(&Local), hour, minute)
                .ok_or_else(|| {
                    LarderError::Dispatch(format!("invalid daily time {hour:02}:{minute:02}"))
                }),
        }
    }

    /// Schedule relative to an explicit clock.
    pub async fn schedule_at(
        &self,
        content: NotificationContent,
        trigger: Trigger,
        now: DateTime<Utc>,
    ) -> Result<String, LarderError> {
        let due_at = Self::resolve(trigger, now)?;
        let repeat = trigger.repeats().then_some(Repeat::Daily);
        let data = serde_json::to_string(&content.data)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO scheduled_notifications (id, title, body, data, due_at, repeat) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(&data)
        .bind(format_ts(&due_at))
        .bind(repeat.map(|r| r.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| LarderError::Dispatch(format!("schedule notification failed: {e}")))?;

        debug!(notification_id = %id, due_at = %due_at, "notification scheduled");
        Ok(id)
    }

    /// Pending notifications due at or before now.
    pub async fn due(&self) -> Result<Vec<ScheduledNotification>, LarderError> {
        self.due_as_of(Utc::now()).await
    }

    /// Pending notifications due at or before `now`.
    pub async fn due_as_of(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledNotification>, LarderError> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT id, title, body, data, due_at, repeat FROM scheduled_notifications \
             WHERE status = 'pending' AND due_at <= ? ORDER BY due_at",
        )
        .bind(format_ts(&now))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LarderError::Dispatch(format!("get due notifications failed: {e}")))?;

        rows.into_iter().map(ScheduledNotification::from_row).collect()
    }

    /// All pending notifications, soonest first.
    pub async fn pending(&self) -> Result<Vec<ScheduledNotification>, LarderError> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT id, title, body, data, due_at, repeat FROM scheduled_notifications \
             WHERE status = 'pending' ORDER BY due_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LarderError::Dispatch(format!("list pending notifications failed: {e}")))?;

        rows.into_iter().map(ScheduledNotification::from_row).collect()
    }

    /// Mark a delivered notification done: one-shot rows become `delivered`,
    /// daily rows move to their next occurrence after `now`.
    pub async fn complete(
        &self,
        notification: &ScheduledNotification,
        now: DateTime<Utc>,
    ) -> Result<(), LarderError> {
        match notification.repeat {
            None => {
                sqlx::query(
                    "UPDATE scheduled_notifications \
                     SET status = 'delivered', delivered_at = datetime('now') WHERE id = ?",
                )
                .bind(&notification.id)
                .execute(&self.pool)
                .await
                .map_err(|e| LarderError::Dispatch(format!("complete notification failed: {e}")))?;
            }
            Some(Repeat::Daily) => {
                let local = notification.due_at.with_timezone(&Local);
                let next = next_daily(&now.with_timezone(&Local), local.hour(), local.minute())
                    .ok_or_else(|| {
                        LarderError::Dispatch(format!(
                            "no next occurrence for notification {}",
                            notification.id
                        ))
                    })?;
                sqlx::query(
                    "UPDATE scheduled_notifications \
                     SET due_at = ?, delivered_at = datetime('now') WHERE id = ?",
                )
                .bind(format_ts(&next))
                .bind(&notification.id)
                .execute(&self.pool)
                .await
                .map_err(|e| LarderError::Dispatch(format!("advance notification failed: {e}")))?;
                debug!(notification_id = %notification.id, next = %next, "daily notification advanced");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for LocalDispatcher {
    fn name(&self) -> &str {
        "local"
    }

    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: Trigger,
    ) -> Result<String, LarderError> {
        self.schedule_at(content, trigger, Utc::now()).await
    }

    async fn cancel(&self, id: &str) -> Result<(), LarderError> {
        let result = sqlx::query(
            "UPDATE scheduled_notifications SET status = 'cancelled' \
             WHERE id = ? AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| LarderError::Dispatch(format!("cancel notification failed: {e}")))?;

        if result.rows_affected() > 0 {
            info!(notification_id = %id, "notification cancelled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use larder_store::Store;

    async fn dispatcher() -> (Store, LocalDispatcher) {
        let store = Store::in_memory().await.unwrap();
        let dispatcher = LocalDispatcher::new(store.pool().clone(), DisplayPolicy::default());
        (store, dispatcher)
    }

    #[test]
    fn test_next_daily_later_today() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 10, 9, 15, 0).unwrap();
        let next = next_daily(&now, 12, 0).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_next_daily_rolls_to_tomorrow() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let next = next_daily(&now, 12, 0).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_next_daily_rejects_invalid_time() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert!(next_daily(&now, 24, 0).is_none());
    }

    #[tokio::test]
    async fn test_immediate_is_due_now() {
        let (_store, dispatcher) = dispatcher().await;
        let now = Utc::now();
        let id = dispatcher
            .schedule_at(NotificationContent::test_immediate(), Trigger::Immediate, now)
            .await
            .unwrap();

        let due = dispatcher.due_as_of(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, id);
        assert_eq!(due[0].content.title, "Test Notification");
        assert!(due[0].repeat.is_none());
    }

    #[tokio::test]
    async fn test_delayed_is_not_due_early() {
        let (_store, dispatcher) = dispatcher().await;
        let now = Utc::now();
        dispatcher
            .schedule_at(
                NotificationContent::test_scheduled(5),
                Trigger::AfterSeconds { seconds: 5 },
                now,
            )
            .await
            .unwrap();

        assert!(dispatcher.due_as_of(now).await.unwrap().is_empty());
        assert_eq!(
            dispatcher
                .due_as_of(now + Duration::seconds(6))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_complete_one_shot_removes_from_pending() {
        let (_store, dispatcher) = dispatcher().await;
        let now = Utc::now();
        dispatcher
            .schedule_at(NotificationContent::test_immediate(), Trigger::Immediate, now)
            .await
            .unwrap();

        let due = dispatcher.due_as_of(now).await.unwrap();
        dispatcher.complete(&due[0], now).await.unwrap();

        assert!(dispatcher.pending().await.unwrap().is_empty());
        assert!(dispatcher.due_as_of(now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_daily_advances_due_at() {
        let (_store, dispatcher) = dispatcher().await;
        let now = Utc::now();
        dispatcher
            .schedule_at(
                NotificationContent::daily_suggestion(),
                Trigger::Daily { hour: 12, minute: 0 },
                now,
            )
            .await
            .unwrap();

        let pending = dispatcher.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].repeat, Some(Repeat::Daily));
        let first_due = pending[0].due_at;
        assert!(first_due > now);

        dispatcher.complete(&pending[0], first_due).await.unwrap();

        let pending = dispatcher.pending().await.unwrap();
        assert_eq!(pending.len(), 1, "daily notification stays pending");
        assert!(pending[0].due_at > first_due);
        let local = pending[0].due_at.with_timezone(&Local);
        assert_eq!((local.hour(), local.minute()), (12, 0));
    }

    #[tokio::test]
    async fn test_cancel_removes_pending_and_ignores_unknown() {
        let (_store, dispatcher) = dispatcher().await;
        let id = dispatcher
            .schedule(
                NotificationContent::daily_suggestion(),
                Trigger::Daily { hour: 12, minute: 0 },
            )
            .await
            .unwrap();

        dispatcher.cancel(&id).await.unwrap();
        dispatcher.cancel(&id).await.unwrap();
        dispatcher.cancel("no-such-id").await.unwrap();

        assert!(dispatcher.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_now_round_trips_data() {
        let (_store, dispatcher) = dispatcher().await;
        dispatcher
            .notify_now(NotificationContent::recipe_saved("Ramen"))
            .await
            .unwrap();

        let pending = dispatcher.pending().await.unwrap();
        assert_eq!(pending[0].content, NotificationContent::recipe_saved("Ramen"));
    }
}
