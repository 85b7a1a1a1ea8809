//! Favorite-notification reconciliation.
//!
//! One pass compares the favorite set against the notified set, sends a
//! "Recipe Saved" notification for every favorite not yet notified, and
//! records the outcome. Collaborator failures are logged and skipped; they
//! never abort a pass.

use futures_util::future::join_all;
use larder_core::{
    error::LarderError,
    notification::NotificationContent,
    recipe::{Recipe, RecipeId},
    traits::{NotificationDispatcher, RecipeLookup},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::favorites::{Favorites, RecipeIdSet};

/// Outcome of one reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Size of the favorite set read at the start of the pass.
    pub favorites: usize,
    /// Recipes notified in this pass, with the dispatcher's identifier.
    pub dispatched: Vec<(RecipeId, String)>,
    pub failed_lookups: Vec<RecipeId>,
    pub failed_dispatches: Vec<RecipeId>,
    /// Whether the notified set was written (or already up to date).
    pub persisted: bool,
}

pub struct Reconciler {
    favorites: Favorites,
    dispatcher: Arc<dyn NotificationDispatcher>,
    lookup: Arc<dyn RecipeLookup>,
    lookup_timeout: Duration,
    retry_failed: bool,
}

impl Reconciler {
    pub fn new(
        favorites: Favorites,
        dispatcher: Arc<dyn NotificationDispatcher>,
        lookup: Arc<dyn RecipeLookup>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            favorites,
            dispatcher,
            lookup,
            lookup_timeout,
            retry_failed: false,
        }
    }

    /// Keep ids whose lookup or dispatch failed out of the notified set so the
    /// next pass tries them again.
    pub fn retry_failed(mut self, retry: bool) -> Self {
        self.retry_failed = retry;
        self
    }

    /// Run one pass.
    pub async fn reconcile(&self) -> ReconcileReport {
        let favorites = self.favorites.load().await;
        let mut report = ReconcileReport {
            favorites: favorites.len(),
            ..Default::default()
        };
        if favorites.is_empty() {
            debug!("no favorites, nothing to reconcile");
            report.persisted = true;
            return report;
        }

        // Every lookup settles (resolves, fails, or times out) before anything is written.
        let resolved = self.resolve_all(&favorites, &mut report).await;
        let notified = self.favorites.load_notified().await;

        for recipe in resolved.iter().filter(|r| !notified.contains(&r.id)) {
            match self
                .dispatcher
                .notify_now(NotificationContent::recipe_saved(&recipe.title))
                .await
            {
                Ok(notification_id) => {
                    debug!(recipe_id = recipe.id, %notification_id, "recipe saved notification sent");
                    report.dispatched.push((recipe.id, notification_id));
                }
                Err(e) => {
                    warn!(recipe_id = recipe.id, "recipe saved notification failed: {e}");
                    report.failed_dispatches.push(recipe.id);
                }
            }
        }

        let next: RecipeIdSet = if self.retry_failed {
            notified
                .intersection(&favorites)
                .copied()
                .chain(report.dispatched.iter().map(|(id, _)| *id))
                .collect()
        } else {
            favorites
        };

        report.persisted = if next == notified {
            true
        } else {
            match self.favorites.save_notified(&next).await {
                Ok(()) => true,
                Err(e) => {
                    error!("failed to record notified recipes: {e}");
                    false
                }
            }
        };

        info!(
            favorites = report.favorites,
            dispatched = report.dispatched.len(),
            failed_lookups = report.failed_lookups.len(),
            failed_dispatches = report.failed_dispatches.len(),
            "reconciliation pass complete"
        );
        report
    }

    /// Run a pass every `interval`, starting one interval from now.
    ///
    /// Picks up favorites toggled by other processes while `run` is active.
    pub async fn reconcile_loop(&self, interval: Duration) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = self.reconcile().await;
            if !report.persisted {
                warn!("notified recipes not saved; next pass may repeat notifications");
            }
        }
    }

    /// Look up every id concurrently, each bounded by the lookup timeout.
    async fn resolve_all(&self, ids: &RecipeIdSet, report: &mut ReconcileReport) -> Vec<Recipe> {
        let lookups = ids.iter().map(|&id| async move { (id, self.resolve(id).await) });

        let mut resolved = Vec::with_capacity(ids.len());
        for (id, result) in join_all(lookups).await {
            match result {
                Ok(recipe) => resolved.push(recipe),
                Err(e) => {
                    warn!(recipe_id = id, "skipping favorite this pass: {e}");
                    report.failed_lookups.push(id);
                }
            }
        }
        resolved
    }

    async fn resolve(&self, id: RecipeId) -> Result<Recipe, LarderError> {
        match tokio::time::timeout(self.lookup_timeout, self.lookup.fetch_recipe_by_id(id)).await {
            Ok(result) => result,
            Err(_) => Err(LarderError::Lookup(format!(
                "recipe {id} timed out after {:?}",
                self.lookup_timeout
            ))),
        }
    }
}
