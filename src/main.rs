mod app;
mod delivery;
mod favorites;
mod logging;
mod reconciler;
mod reminders;

#[cfg(test)]
mod testing;

use clap::{Parser, Subcommand};
use larder_core::{
    config, keys,
    traits::{KeyValueStore, RecipeLookup},
};
use larder_recipes::SearchParams;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use app::App;

#[derive(Parser)]
#[command(
    name = "larder",
    version,
    about = "Larder: recipe favorites with saved-recipe and daily notifications"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule the daily reminder, then reconcile favorites and deliver notifications until Ctrl-C.
    Run,
    /// Show configuration and stored state.
    Status,
    /// Run one favorite-notification reconciliation pass.
    Reconcile,
    /// Toggle a recipe in or out of favorites.
    Favorite {
        /// Recipe id.
        id: i64,
    },
    /// List favorite recipe ids.
    Favorites,
    /// (Re)schedule the daily recipe reminder.
    Daily,
    /// Cancel the daily recipe reminder.
    CancelDaily,
    /// Send a test notification, now or after a delay.
    TestNotify {
        /// Delay in seconds; omit for immediate delivery.
        #[arg(short, long)]
        delay: Option<u64>,
    },
    /// List pending local notifications.
    Pending,
    /// Show one recipe.
    Recipe {
        /// Recipe id.
        id: i64,
    },
    /// Search recipes.
    Search {
        /// Search terms.
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = 10)]
        number: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    let _log_guard = if matches!(cli.command, Commands::Run) {
        config::ensure_layout(&cfg.larder.data_dir)?;
        let log_dir = PathBuf::from(config::shellexpand(&cfg.larder.data_dir)).join("logs");
        logging::init(&cfg.larder.log_level, Some(&log_dir))
    } else {
        logging::init(&cfg.larder.log_level, None)
    };

    let app = App::build(&cfg).await?;

    match cli.command {
        Commands::Run => {
            println!("{}: starting", cfg.larder.name);
            let sinks = app.sinks(&cfg).await;

            // Local scheduling works with or without push.
            if let Err(e) = app.reminders.schedule_daily().await {
                warn!("daily reminder not scheduled: {e}");
            }
            app.reconciler.reconcile().await;

            let poll = Duration::from_secs(cfg.notifications.poll_interval_secs);
            let reconcile = async {
                match cfg.reconciler.interval() {
                    Some(interval) => app.reconciler.reconcile_loop(interval).await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                _ = delivery::delivery_loop(app.dispatcher.clone(), sinks, poll) => {}
                _ = reconcile => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                }
            }
            app.store.close().await;
        }
        Commands::Status => {
            println!("{} status\n", cfg.larder.name);
            println!("Config: {}", cli.config);
            println!("Database: {}", config::shellexpand(&cfg.store.db_path));
            println!("Recipe API: {}", cfg.recipes.base_url);
            println!(
                "  api key: {}",
                if cfg.recipes.api_key.is_empty() {
                    "missing"
                } else {
                    "configured"
                }
            );
            println!(
                "Daily reminder time: {:02}:{:02}",
                cfg.notifications.daily_hour, cfg.notifications.daily_minute
            );
            println!("Retry failed notifications: {}", cfg.reconciler.retry_failed);
            println!();

            let favorites = app.favorites.load().await;
            let notified = app.favorites.load_notified().await;
            println!("Favorites: {}", favorites.len());
            println!("Already notified: {}", notified.len());
            match app.reminders.daily_handle().await? {
                Some(id) => println!("Daily reminder: {id}"),
                None => println!("Daily reminder: not scheduled"),
            }
            println!(
                "Push: {}",
                match (cfg.push.enabled, app.store.get(keys::PUSH_TOKEN).await?) {
                    (false, _) => "disabled",
                    (true, Some(_)) => "registered",
                    (true, None) => "enabled but not registered",
                }
            );
            println!("Pending notifications: {}", app.dispatcher.pending().await?.len());
        }
        Commands::Reconcile => {
            let report = app.reconciler.reconcile().await;
            println!(
                "Favorites: {}, notified: {}, lookup failures: {}, dispatch failures: {}",
                report.favorites,
                report.dispatched.len(),
                report.failed_lookups.len(),
                report.failed_dispatches.len()
            );
            for (id, notification_id) in &report.dispatched {
                println!("  recipe {id} → notification {notification_id}");
            }
            if !report.persisted {
                anyhow::bail!("notified recipes could not be saved");
            }
        }
        Commands::Favorite { id } => {
            if app.favorites.toggle(id).await? {
                println!("Recipe {id} added to favorites");
            } else {
                println!("Recipe {id} removed from favorites");
            }
        }
        Commands::Favorites => {
            let favorites = app.favorites.load().await;
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for id in favorites {
                println!("{id}");
            }
        }
        Commands::Daily => {
            let id = app.reminders.schedule_daily().await?;
            println!("Daily notification scheduled ({id})");
        }
        Commands::CancelDaily => match app.reminders.cancel_daily().await? {
            Some(id) => println!("Daily notification {id} cancelled"),
            None => println!("No daily notification scheduled"),
        },
        Commands::TestNotify { delay } => match delay {
            Some(seconds) => {
                let id = app.reminders.test_scheduled(seconds).await?;
                println!("Notification scheduled for {seconds} seconds from now ({id})");
            }
            None => {
                let id = app.reminders.test_immediate().await?;
                println!("Test notification sent ({id})");
            }
        },
        Commands::Pending => {
            let pending = app.dispatcher.pending().await?;
            if pending.is_empty() {
                println!("No pending notifications.");
            }
            for n in pending {
                let repeat = if n.repeat.is_some() { " (daily)" } else { "" };
                println!(
                    "{}  {}{}  {}",
                    n.id,
                    n.due_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                    repeat,
                    n.content.title
                );
            }
        }
        Commands::Recipe { id } => {
            let recipe = app.recipes.fetch_recipe_by_id(id).await?;
            println!("{}", serde_json::to_string_pretty(&recipe)?);
        }
        Commands::Search {
            query,
            offset,
            number,
        } => {
            if query.is_empty() {
                anyhow::bail!("no query provided. Usage: larder search <terms>");
            }
            let params = SearchParams {
                query: query.join(" "),
                offset,
                number,
            };
            let page = app.recipes.search_recipes(&params).await?;
            println!(
                "{} result(s), showing {}-{}",
                page.total_results,
                page.offset + 1,
                page.offset as usize + page.results.len()
            );
            for r in page.results {
                println!("{:>8}  {}", r.id, r.title);
            }
        }
    }

    Ok(())
}
