// Barrage setup assistant entry point.
//
// Startup sequence:
// 1. Load config (copying defaults on first run)
// 2. Initialize tracing (log to file, not terminal)
// 3. Load catalogs as of today
// 4. Open database, look for a session still waiting for scores
// 5. Sample the first session
// 6. Spawn app logic task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use barrage_app::app;
use barrage_core::config;
use barrage_core::db;
use barrage_tui::tui;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_dir = std::env::current_dir().context("failed to resolve working directory")?;

    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&config.log_filter)?;
    info!("Barrage setup assistant starting up");
    info!(
        "Config loaded: {} players, {} extra candidates, board '{}'",
        config.session.players.len(),
        config.session.extra_candidates,
        config.session.board_variant
    );

    // 3. Load catalogs
    let catalog = app::load_catalog_for_today(&base_dir, &config).context("failed to load catalogs")?;
    info!(
        "Catalogs loaded: {} factions, {} roles, {} contracts",
        catalog.factions.len(),
        catalog.roles.len(),
        catalog.contracts.len()
    );

    // 4. Open database
    let db_path = config.resolve_db_path(&base_dir);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let db_path = db_path.to_string_lossy().into_owned();
    let db = db::Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path);

    let mut app_state = app::AppState::new(
        config.clone(),
        catalog,
        Box::new(db),
        StdRng::from_entropy(),
    );

    match app_state.recover_unscored() {
        Ok(true) => info!("Offering the last unscored session for score entry"),
        Ok(false) => {}
        Err(e) => {
            error!("Could not check for unscored sessions: {}", e);
            return Err(e.context("startup recovery failed"));
        }
    }

    // 5. Sample the first session. A failure here is shown on the setup
    //    screen rather than aborting.
    if let Err(e) = app_state.start_new_session() {
        warn!("Initial sampling failed: {}", e);
    }

    // 6. Channels and app task
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. Run the TUI (blocks until the user quits)
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 8. Cleanup: give the app task a moment to finish
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Barrage setup assistant shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the TUI).
/// `RUST_LOG` overrides the configured filter.
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("barrage.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
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
