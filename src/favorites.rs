//! Favorite and notified recipe sets, persisted as JSON arrays.

use larder_core::{error::LarderError, keys, recipe::RecipeId, traits::KeyValueStore};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Unique recipe ids. Ordered so persisted arrays are stable.
pub type RecipeIdSet = BTreeSet<RecipeId>;

/// Reads and writes the favorite and notified sets.
#[derive(Clone)]
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
}

impl Favorites {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current favorites. Absent or unreadable data is an empty set.
    pub async fn load(&self) -> RecipeIdSet {
        self.read_set(keys::FAVORITE_RECIPES).await
    }

    /// Ids that already produced a "Recipe Saved" notification.
    pub async fn load_notified(&self) -> RecipeIdSet {
        self.read_set(keys::LAST_NOTIFIED_RECIPES).await
    }

    pub async fn save_notified(&self, ids: &RecipeIdSet) -> Result<(), LarderError> {
        self.write_set(keys::LAST_NOTIFIED_RECIPES, ids).await
    }

    /// Add `id` if absent, remove it if present, and persist before returning.
    ///
    /// Returns whether `id` is a favorite afterwards. A failed write is
    /// returned so the caller can roll back any optimistic view state. A
    /// failed read is returned too: toggling against an assumed-empty set
    /// would overwrite every other favorite.
    pub async fn toggle(&self, id: RecipeId) -> Result<bool, LarderError> {
        let mut favorites = self.try_read_set(keys::FAVORITE_RECIPES).await?;
        let now_favorite = if favorites.remove(&id) {
            false
        } else {
            favorites.insert(id);
            true
        };
        self.write_set(keys::FAVORITE_RECIPES, &favorites).await?;
        debug!(recipe_id = id, now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    async fn read_set(&self, key: &str) -> RecipeIdSet {
        self.try_read_set(key).await.unwrap_or_else(|e| {
            warn!("failed to read {key}, treating as empty: {e}");
            RecipeIdSet::new()
        })
    }

    /// Store errors propagate; a corrupt value reads as empty.
    async fn try_read_set(&self, key: &str) -> Result<RecipeIdSet, LarderError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(RecipeIdSet::new());
        };
        match serde_json::from_str::<Vec<RecipeId>>(&raw) {
            Ok(ids) => Ok(ids.into_iter().collect()),
            Err(e) => {
                warn!("corrupt {key} value, treating as empty: {e}");
                Ok(RecipeIdSet::new())
            }
        }
    }

    async fn write_set(&self, key: &str, ids: &RecipeIdSet) -> Result<(), LarderError> {
        let encoded = serde_json::to_string(&ids.iter().collect::<Vec<_>>())?;
        self.store.set(key, &encoded).await
    }
}
