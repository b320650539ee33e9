use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use assetdesk_api::bootstrap::{ensure_bootstrap_admin, BootstrapAdmin, BootstrapError};
use assetdesk_api::config::{ConfigError, ServerConfig};
use assetdesk_api::router::build_app_router;
use assetdesk_api::state::AppState;
use assetdesk_api::storage::{DocumentStorage, LocalDiskStorage};
use assetdesk_core::permissions::PermissionStoreState;
use assetdesk_events::{EmailConfig, EmailDelivery, WelcomeDelivery, WelcomeNotifier, WelcomeWorker};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Anything that stops the server from starting or serving.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to run database migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` filters; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "assetdesk_api=debug,assetdesk_events=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<(), StartupError> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
    let pool = assetdesk_db::create_pool(&database_url).await?;
    tracing::info!("Database connection pool created");

    assetdesk_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    if config.run_migrations {
        assetdesk_db::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let permission_store = if assetdesk_db::permissions_provisioned(&pool).await? {
        PermissionStoreState::Ready
    } else {
        tracing::warn!("Permission tables missing or empty, permission checks will deny");
        PermissionStoreState::Unprovisioned
    };

    // --- Bootstrap admin ---
    if let Some(admin) = BootstrapAdmin::from_env() {
        if let Some(user) = ensure_bootstrap_admin(&pool, permission_store, &admin).await? {
            tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
        }
    }

    // --- Welcome notifications ---
    let (notifier, receiver) = WelcomeNotifier::channel();
    let delivery = EmailConfig::from_env(&config.app_url)
        .map(|cfg| Arc::new(EmailDelivery::new(cfg)) as Arc<dyn WelcomeDelivery>);
    if delivery.is_none() {
        tracing::info!("SMTP_HOST not set, welcome emails are disabled");
    }
    let worker_handle = tokio::spawn(WelcomeWorker::run(receiver, delivery));

    // --- Document storage ---
    tokio::fs::create_dir_all(&config.document_storage_dir).await?;
    let storage: Arc<dyn DocumentStorage> =
        Arc::new(LocalDiskStorage::new(config.document_storage_dir.clone()));
    tracing::info!(dir = %config.document_storage_dir.display(), "Document storage ready");

    // --- App state + router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        permission_store,
        notifier,
        storage,
    };
    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let host: IpAddr = config.host.parse().map_err(|_| ConfigError::Invalid {
        name: "HOST",
        value: config.host.clone(),
    })?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    // The router (and with it the last notifier clone) is gone, so the queue
    // closes once it drains.
    tracing::info!("Server stopped accepting connections, draining welcome queue");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, worker_handle).await.is_err() {
        tracing::warn!(timeout_secs = config.shutdown_timeout_secs, "Welcome worker did not finish in time");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
