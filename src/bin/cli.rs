//! Stella Sora News Cache CLI
//!
//! Local execution entry point. For AWS Lambda, use `stella-news-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stella_news::{
    NewsApp,
    config::load_config,
    error::{AppError, Result},
    models::ErrorResponse,
    pipeline::SyncReport,
    storage::LocalStorage,
    utils::log as console,
};

/// Stella Sora multi-region news cache
#[derive(Parser, Debug)]
#[command(name = "stella-news", version, about = "Multi-region news cache with hero thumbnails")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Snapshot storage directory (overrides config and NEWS_STORAGE_DIR)
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the half-hourly scheduler until Ctrl-C
    Run {
        /// Run one full cycle before waiting for the first boundary
        #[arg(long)]
        sync_now: bool,
    },

    /// Run one sync cycle now
    Sync {
        /// Region code or language tag
        #[arg(long)]
        region: Option<String>,

        /// Category name
        #[arg(long)]
        category: Option<String>,
    },

    /// Query a category page and print the JSON response
    Query {
        /// Category name (updates, notices, news, events)
        category: String,

        /// Language tag or region code
        #[arg(long)]
        lang: Option<String>,

        /// 1-based page index
        #[arg(long)]
        index: Option<String>,

        /// Page size
        #[arg(long)]
        size: Option<String>,
    },

    /// Validate configuration
    Validate,

    /// Show stored snapshots
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_report(report: &SyncReport) {
    console::header("Sync cycle");
    for pair in &report.refreshed {
        console::sub_item(&format!(
            "{}: {} rows (+{} -{} ~{})",
            pair.key,
            pair.rows,
            pair.diff.added.len(),
            pair.diff.removed.len(),
            pair.diff.rethumbnailed.len()
        ));
    }
    for failure in &report.failures {
        console::failure(&format!("{}: {}", failure.key, failure.error));
    }
    console::summary(
        "Sync",
        &[
            ("refreshed", report.refreshed.len().to_string()),
            ("failed", report.failures.len().to_string()),
            ("rows", report.total_rows().to_string()),
            ("duration_ms", report.duration_ms().to_string()),
        ],
    );
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(&cli.config)?;
    if let Some(dir) = &cli.storage_dir {
        config.storage.root_dir = dir.display().to_string();
    }
    log::info!("Loaded configuration from {}", cli.config.display());

    if let Command::Validate = cli.command {
        // load_config already validated; report what was loaded.
        console::success(&format!(
            "Config OK: {} regions, {} categories, {} language aliases",
            config.regions.len(),
            config.categories.len(),
            config.languages.len()
        ));
        return Ok(());
    }

    let storage = Arc::new(LocalStorage::new(&config.storage.root_dir));
    let app = NewsApp::new(config, storage)?;

    match cli.command {
        Command::Run { sync_now } => {
            if sync_now {
                let report = app.synchronizer().run_cycle().await;
                print_report(&report);
            }

            let Some(handle) = app.start_scheduler() else {
                return Err(AppError::config("scheduler.enabled is false; nothing to run"));
            };

            tokio::signal::ctrl_c().await?;
            log::info!("Shutdown requested");
            handle.stop().await;
        }

        Command::Sync { region, category } => {
            let report = app
                .synchronizer()
                .run_selected(region.as_deref(), category.as_deref())
                .await?;
            print_report(&report);
            if !report.is_success() {
                return Err(AppError::validation(format!(
                    "{} pairs failed to refresh",
                    report.failures.len()
                )));
            }
        }

        Command::Query {
            category,
            lang,
            index,
            size,
        } => {
            let result = app
                .query()
                .respond(&category, lang.as_deref(), index.as_deref(), size.as_deref())
                .await;
            match result {
                Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                Err(e) => {
                    println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&e))?);
                    log::error!("Query failed with status {}", e.status_code());
                    return Err(e);
                }
            }
        }

        Command::Info => {
            let store = app.store();
            console::header(&format!("Snapshots in {}", store.location()));
            let keys = store.keys().await?;
            if keys.is_empty() {
                console::sub_item("No snapshot found yet.");
            }
            for key in keys {
                match store.load(&key).await? {
                    Some(snapshot) => console::sub_item(&format!(
                        "{}: {} rows, updated {}",
                        key,
                        snapshot.len(),
                        snapshot.updated_at.to_rfc3339()
                    )),
                    None => console::sub_item(&format!("{}: missing", key)),
                }
            }
        }

        Command::Validate => {}
    }

    Ok(())
}
