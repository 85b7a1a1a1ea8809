//! Hand-written collaborator doubles shared by the binary's unit tests.

use async_trait::async_trait;
use larder_core::{
    error::LarderError,
    notification::{NotificationContent, Trigger},
    recipe::{Recipe, RecipeId},
    traits::{KeyValueStore, NotificationDispatcher, RecipeLookup},
};
use larder_store::MemoryStore;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Memory store whose reads and writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LarderError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LarderError::Persistence(format!("read {key} unavailable")));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LarderError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LarderError::Persistence(format!("write {key} unavailable")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), LarderError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LarderError::Persistence(format!("remove {key} unavailable")));
        }
        self.inner.remove(key).await
    }
}

/// Dispatcher that records every call and tracks which schedules are live.
#[derive(Default)]
pub struct RecordingDispatcher {
    scheduled: Mutex<Vec<(String, NotificationContent, Trigger)>>,
    cancelled: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    failing_bodies: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
    fail_cancel: AtomicBool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail dispatches whose body contains `needle`.
    pub fn fail_when_body_contains(&self, needle: &str) {
        self.failing_bodies
            .lock()
            .unwrap()
            .insert(needle.to_string());
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn fail_cancel(&self, fail: bool) {
        self.fail_cancel.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(String, NotificationContent, Trigger)> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, c, _)| c.body).collect()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    /// Scheduled ids that were never cancelled.
    pub fn active(&self) -> Vec<(String, Trigger)> {
        let cancelled = self.cancelled();
        self.sent()
            .into_iter()
            .filter(|(id, _, _)| !cancelled.contains(id))
            .map(|(id, _, trigger)| (id, trigger))
            .collect()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: Trigger,
    ) -> Result<String, LarderError> {
        let failing = self
            .failing_bodies
            .lock()
            .unwrap()
            .iter()
            .any(|needle| content.body.contains(needle.as_str()));
        if failing || self.fail_all.load(Ordering::SeqCst) {
            return Err(LarderError::Dispatch("permission revoked".to_string()));
        }
        let id = format!("n-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.scheduled
            .lock()
            .unwrap()
            .push((id.clone(), content, trigger));
        Ok(id)
    }

    async fn cancel(&self, id: &str) -> Result<(), LarderError> {
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(LarderError::Dispatch("cancel unavailable".to_string()));
        }
        self.cancelled.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

/// Lookup client answering from a fixed table.
#[derive(Default)]
pub struct FakeLookup {
    titles: HashMap<RecipeId, String>,
    hanging: HashSet<RecipeId>,
    calls: AtomicUsize,
}

impl FakeLookup {
    /// Every id in `titles` resolves; anything else is "not found".
    pub fn new(titles: &[(RecipeId, &str)]) -> Self {
        Self {
            titles: titles
                .iter()
                .map(|(id, title)| (*id, title.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    /// Lookups for `id` never complete.
    pub fn hang_on(mut self, id: RecipeId) -> Self {
        self.hanging.insert(id);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipeLookup for FakeLookup {
    async fn fetch_recipe_by_id(&self, id: RecipeId) -> Result<Recipe, LarderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging.contains(&id) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let title = self
            .titles
            .get(&id)
            .ok_or_else(|| LarderError::Lookup(format!("recipe {id} got 404 Not Found")))?;
        Ok(Recipe {
            id,
            title: title.clone(),
            image: String::new(),
            ready_in_minutes: 30,
            servings: 2,
            summary: None,
            instructions: None,
            extended_ingredients: Vec::new(),
            cuisines: Vec::new(),
            diets: Vec::new(),
            dish_types: Vec::new(),
            nutrition: None,
        })
    }
}
