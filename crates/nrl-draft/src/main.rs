// NRL draft assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open local store, mirrored to the backend when remote sync is on
// 4. Forget saved state if `--reset` was passed
// 5. Fetch the player catalog (empty on failure)
// 6. Start the draft session
// 7. Log the summary and print the recommendation board
// 8. Shut down, flushing pending saves

use std::sync::Arc;

use nrl_draft::catalog::source::CatalogSource;
use nrl_draft::config;
use nrl_draft::persistence::{self, LocalStore, MirroredStore, RemoteStore, StateStore};
use nrl_draft::session::DraftSession;
use nrl_draft::valuation::recommend::RecommendationBoard;

use anyhow::Context;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let reset = std::env::args().skip(1).any(|a| a == "--reset");

    // 1. Initialize tracing
    init_tracing()?;
    info!("NRL draft assistant starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams",
        config.league.name,
        config.league.teams.len()
    );

    // 3. Open local store
    let local = LocalStore::open(&config.storage.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.storage.db_path);
    log_last_save(&local, &config.storage.keys());

    let store: Arc<dyn StateStore> = if config.api.remote_sync {
        match RemoteStore::new(&config.api.base_url, config.api.timeout()) {
            Ok(remote) => {
                info!("Mirroring saved state to {}", config.api.base_url);
                Arc::new(MirroredStore::new(Box::new(local), Box::new(remote)))
            }
            Err(e) => {
                warn!("Remote sync disabled: {e:#}");
                Arc::new(local)
            }
        }
    } else {
        Arc::new(local)
    };

    // 4. Reset
    if reset {
        for key in config.storage.keys() {
            if let Err(e) = persistence::forget(store.as_ref(), key).await {
                warn!("Failed to clear '{key}': {e:#}");
            }
        }
    }

    // 5. Fetch catalog
    let source = CatalogSource::from_location(&config.api.base_url, config.api.timeout());
    let catalog = source.fetch_or_empty().await;

    // 6. Start session
    let session = DraftSession::start(&config, catalog, store).await;

    // 7. Report
    let summary = session.summary();
    info!(
        "Draft summary: {} players, {} drafted, {} prioritized, {} available",
        summary.total_players, summary.drafted, summary.prioritized, summary.available
    );
    println!("{}", render_board(&session.recommend()));

    // 8. Shutdown
    session.shutdown().await;
    info!("NRL draft assistant shut down cleanly");
    Ok(())
}

/// Plain-text recommendation board, one block per position.
fn render_board(board: &RecommendationBoard<'_>) -> String {
    let mut out = String::new();
    for (pos, entries) in board {
        out.push_str(&format!("== {pos} ==\n"));
        if entries.is_empty() {
            out.push_str("  (no candidates)\n");
        }
        for (i, entry) in entries.iter().enumerate() {
            let stats = &entry.player.stats;
            let adp = stats
                .adp
                .map_or_else(|| "-".to_string(), |adp| format!("{adp:.1}"));
            out.push_str(&format!(
                "  {:>2}. {:<28} avg {:>6.1}  adp {:>6}  [{}]\n",
                i + 1,
                entry.player.full_name(),
                stats.avg_points,
                adp,
                entry.tags.join(", ")
            ));
        }
    }
    out
}

/// Log when the previous session last saved any document.
fn log_last_save(local: &LocalStore, keys: &[&str]) {
    let mut latest = None;
    for key in keys {
        match local.saved_at(key) {
            Ok(at) => latest = latest.max(at),
            Err(e) => warn!("Failed to read save time of '{key}': {e:#}"),
        }
    }
    match latest {
        Some(at) => info!("Resuming draft state last saved at {}", at.to_rfc3339()),
        None => info!("No saved draft state found"),
    }
}

/// Initialize tracing to log to a file, keeping stdout for the board.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("nrl-draft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nrl_draft=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
