use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use goaltrack::config::Config;
use goaltrack::AppState;

#[derive(Parser, Debug)]
#[command(name = "goaltrack")]
#[command(author, version, about = "A small goal-tracking web application", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "GOALTRACK_CONFIG", default_value = "goaltrack.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Wipe the database, load test data, and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting goaltrack v{}", env!("CARGO_PKG_VERSION"));

    // Initialize database
    let db = goaltrack::db::init(&config.database).await?;

    if cli.init {
        goaltrack::db::seed_test_data(&db, &config.auth.password).await?;
        tracing::info!(
            "Log in as {} / {}",
            goaltrack::db::TEST_USER_EMAIL,
            goaltrack::db::TEST_USER_PASSWORD
        );
        goaltrack::db::close(db).await;
        return Ok(());
    }

    let state = Arc::new(AppState::new(config.clone(), db.clone()));
    let app = goaltrack::web::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    goaltrack::db::close(db).await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
