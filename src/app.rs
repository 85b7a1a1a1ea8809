//! Wiring: build every component from configuration.

use larder_core::{
    config::Config,
    traits::{KeyValueStore, NotificationDispatcher, RecipeLookup},
};
use larder_notify::{register_for_push, ExpoPushSink, LocalDispatcher, LogSink, NotificationSink};
use larder_recipes::SpoonacularClient;
use larder_store::Store;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{favorites::Favorites, reconciler::Reconciler, reminders::Reminders};

/// Every component, sharing one store and one dispatcher.
pub struct App {
    pub store: Store,
    pub dispatcher: LocalDispatcher,
    pub recipes: Arc<SpoonacularClient>,
    pub favorites: Favorites,
    pub reconciler: Reconciler,
    pub reminders: Reminders,
}

impl App {
    pub async fn build(cfg: &Config) -> anyhow::Result<Self> {
        let store = Store::new(&cfg.store).await?;
        let kv: Arc<dyn KeyValueStore> = Arc::new(store.clone());

        let dispatcher = LocalDispatcher::new(
            store.pool().clone(),
            cfg.notifications.display_policy(),
        );
        let shared_dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(dispatcher.clone());

        let recipes = Arc::new(SpoonacularClient::from_config(&cfg.recipes)?);
        let lookup: Arc<dyn RecipeLookup> = recipes.clone();

        let favorites = Favorites::new(kv.clone());
        let reconciler = Reconciler::new(
            favorites.clone(),
            shared_dispatcher.clone(),
            lookup,
            cfg.recipes.lookup_timeout(),
        )
        .retry_failed(cfg.reconciler.retry_failed);
        let reminders = Reminders::new(
            kv,
            shared_dispatcher,
            cfg.notifications.daily_hour,
            cfg.notifications.daily_minute,
        );

        Ok(Self {
            store,
            dispatcher,
            recipes,
            favorites,
            reconciler,
            reminders,
        })
    }

    /// Delivery sinks: the log always, Expo push when registration succeeds.
    ///
    /// Push problems are reported and skipped; local delivery keeps working.
    pub async fn sinks(&self, cfg: &Config) -> Vec<Arc<dyn NotificationSink>> {
        let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(LogSink)];
        match register_for_push(&cfg.push, &self.store).await {
            Ok(Some(token)) => {
                info!("push delivery enabled");
                sinks.push(Arc::new(ExpoPushSink::new(cfg.push.endpoint.clone(), token)));
            }
            Ok(None) => {}
            Err(e) => warn!("push registration failed, continuing with local notifications: {e}"),
        }
        sinks
    }
}
