//! Expo push delivery and push registration.

use async_trait::async_trait;
use larder_core::{
    config::PushConfig, error::LarderError, keys, notification::DisplayPolicy,
    traits::KeyValueStore,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{local::ScheduledNotification, sink::NotificationSink};

/// Validate push configuration and persist the device token.
///
/// Returns `Ok(None)` when push is disabled. Missing project id or device
/// token is a configuration error; callers treat it as fatal to push only.
pub async fn register_for_push(
    config: &PushConfig,
    store: &dyn KeyValueStore,
) -> Result<Option<String>, LarderError> {
    if !config.enabled {
        return Ok(None);
    }

    let project_id = config
        .project_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| LarderError::Config("push.project_id is not configured".to_string()))?;

    let token = config
        .device_token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| LarderError::Config("push.device_token is not configured".to_string()))?;

    store.set(keys::PUSH_TOKEN, token).await?;
    info!(project_id, "registered for push notifications");
    Ok(Some(token.to_string()))
}

#[derive(Serialize)]
struct ExpoPushMessage<'a> {
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    data: &'a larder_core::notification::NotificationData,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<u32>,
    priority: &'a str,
}

#[derive(Deserialize)]
struct ExpoPushResponse {
    data: ExpoPushTicket,
}

#[derive(Deserialize)]
struct ExpoPushTicket {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Sends notifications through the Expo push service.
pub struct ExpoPushSink {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ExpoPushSink {
    pub fn new(endpoint: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            token,
        }
    }
}

#[async_trait]
impl NotificationSink for ExpoPushSink {
    fn name(&self) -> &str {
        "expo-push"
    }

    async fn deliver(
        &self,
        notification: &ScheduledNotification,
        policy: &DisplayPolicy,
    ) -> Result<(), LarderError> {
        let content = &notification.content;
        let message = ExpoPushMessage {
            to: &self.token,
            title: policy.show_alert.then_some(content.title.as_str()),
            body: policy.show_alert.then_some(content.body.as_str()),
            data: &content.data,
            sound: policy.play_sound.then_some("default"),
            badge: policy.set_badge.then_some(1),
            priority: "high",
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .map_err(|e| LarderError::Dispatch(format!("expo push send failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(LarderError::Dispatch(format!(
                "expo push got {status}: {error_text}"
            )));
        }

        let ticket: ExpoPushResponse = resp
            .json()
            .await
            .map_err(|e| LarderError::Dispatch(format!("expo push response unreadable: {e}")))?;
        if ticket.data.status != "ok" {
            let reason = ticket.data.message.unwrap_or_default();
            warn!(notification_id = %notification.id, "expo push rejected: {reason}");
            return Err(LarderError::Dispatch(format!("expo push rejected: {reason}")));
        }
        Ok(())
    }
}
