use std::net::SocketAddr;
use std::sync::Arc;

use survey_intake_api::api;
use survey_intake_api::config::Config;
use survey_intake_api::db::Database;
use survey_intake_api::handlers::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resolves on SIGTERM or Ctrl-C.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Could not register SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Main entry point for the application.
///
/// Initializes tracing, configuration and the SQLite store, then serves the
/// API until a shutdown signal arrives and closes the store afterwards.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survey_intake_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Open the store (creates the data directory and table when missing)
    let db = Database::new(&config.db_path).await?;
    tracing::info!("Survey store ready at {}", config.db_path.display());

    // Build application state
    let app_state = Arc::new(AppState {
        db: db.pool.clone(),
        config: config.clone(),
    });

    let app = api::router(app_state)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutting down, closing survey store");
    db.close().await;

    Ok(())
}
