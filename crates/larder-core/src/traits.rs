use crate::{
    error::LarderError,
    notification::{NotificationContent, Trigger},
    recipe::{Recipe, RecipeId},
};
use async_trait::async_trait;

/// Persistent key-value store.
///
/// One string value per key, durable across restarts, last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written or was removed.
    async fn get(&self, key: &str) -> Result<Option<String>, LarderError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), LarderError>;

    /// Delete a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), LarderError>;
}

/// Notification dispatcher.
///
/// Local schedulers and test doubles implement this to schedule and cancel
/// notifications by opaque identifier.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Human-readable dispatcher name.
    fn name(&self) -> &str;

    /// Schedule a notification and return its identifier.
    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: Trigger,
    ) -> Result<String, LarderError>;

    /// Cancel a scheduled notification. Unknown identifiers are ignored.
    async fn cancel(&self, id: &str) -> Result<(), LarderError>;

    /// Deliver a notification right away.
    async fn notify_now(&self, content: NotificationContent) -> Result<String, LarderError> {
        self.schedule(content, Trigger::Immediate).await
    }
}

/// Recipe lookup client.
#[async_trait]
pub trait RecipeLookup: Send + Sync {
    /// Resolve a full recipe by id. Network and payload failures are
    /// reported as [`LarderError::Lookup`].
    async fn fetch_recipe_by_id(&self, id: RecipeId) -> Result<Recipe, LarderError>;
}
