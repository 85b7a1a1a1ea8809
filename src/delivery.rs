//! Background delivery of due local notifications.

use chrono::{DateTime, Utc};
use larder_core::error::LarderError;
use larder_notify::{LocalDispatcher, NotificationSink};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Hand every due notification to every sink, then mark it done.
///
/// A sink failure is logged and the notification is still completed, so a
/// broken sink cannot cause the same notification to fire on every poll.
pub async fn deliver_due(
    dispatcher: &LocalDispatcher,
    sinks: &[Arc<dyn NotificationSink>],
    now: DateTime<Utc>,
) -> Result<usize, LarderError> {
    let due = dispatcher.due_as_of(now).await?;
    let policy = dispatcher.policy();

    for notification in &due {
        for sink in sinks {
            if let Err(e) = sink.deliver(notification, &policy).await {
                warn!(
                    notification_id = %notification.id,
                    "delivery via {} failed: {e}",
                    sink.name()
                );
            }
        }
        if let Err(e) = dispatcher.complete(notification, now).await {
            error!(notification_id = %notification.id, "failed to complete notification: {e}");
        }
    }
    Ok(due.len())
}

/// Poll for due notifications forever.
pub async fn delivery_loop(
    dispatcher: LocalDispatcher,
    sinks: Vec<Arc<dyn NotificationSink>>,
    poll: Duration,
) {
    let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
    info!(sinks = ?names, "notification delivery loop started");
    let mut ticker = tokio::time::interval(poll);
    loop {
        ticker.tick().await;
        match deliver_due(&dispatcher, &sinks, Utc::now()).await {
            Ok(0) => {}
            Ok(n) => info!("delivered {n} notification(s)"),
            Err(e) => error!("delivery poll failed: {e}"),
        }
    }
}
