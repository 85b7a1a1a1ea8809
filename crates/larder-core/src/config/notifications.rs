use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults::*;
use crate::notification::DisplayPolicy;

/// Local notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub show_alert: bool,
    #[serde(default = "default_true")]
    pub play_sound: bool,
    #[serde(default = "default_true")]
    pub set_badge: bool,
    /// Local hour of the daily reminder (0-23).
    #[serde(default = "default_daily_hour")]
    pub daily_hour: u32,
    #[serde(default)]
    pub daily_minute: u32,
    /// How often the delivery loop looks for due notifications.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: true,
            daily_hour: default_daily_hour(),
            daily_minute: 0,
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl NotificationsConfig {
    pub fn display_policy(&self) -> DisplayPolicy {
        DisplayPolicy {
            show_alert: self.show_alert,
            play_sound: self.play_sound,
            set_badge: self.set_badge,
        }
    }
}

/// Push registration settings.
///
/// Push is optional: local scheduling works without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Expo project identifier. Required when push is enabled.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Device push token handed over by the host platform.
    #[serde(default)]
    pub device_token: Option<String>,
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project_id: None,
            device_token: None,
            endpoint: default_push_endpoint(),
        }
    }
}

/// Favorite reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Leave ids whose lookup or dispatch failed out of the notified set so
    /// the next pass retries them. Off by default: every favorite read at the
    /// start of a pass is recorded as notified.
    #[serde(default)]
    pub retry_failed: bool,
    /// Seconds between passes while `run` is active. 0 reconciles at startup only.
    #[serde(default = "default_reconcile_interval")]
    pub interval_secs: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            retry_failed: false,
            interval_secs: default_reconcile_interval(),
        }
    }
}

impl ReconcilerConfig {
    /// Periodic pass interval, `None` when periodic passes are off.
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}
