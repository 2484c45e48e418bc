//! Trainer Backend - personal-training site server
//!
//! Serves the public site and the JSON API for clients, programs,
//! support tickets and recipes. All state is kept in one JSON document.

use std::process::ExitCode;
use std::sync::Arc;
use trainer_backend::{build_router, models::AdminCredential, AppState, Config, Store};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize structured logging
    init_tracing();

    // Load configuration
    let config = Config::from_env();
    log_startup_info(&config);

    let admin = AdminCredential {
        username: config.admin_username.clone(),
        password: config.admin_password.clone(),
    };
    let store = match Store::open(&config.data_file, admin).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, path = %config.data_file.display(), "Failed to open data file");
            return ExitCode::FAILURE;
        }
    };

    let bind_addr = format!("{}:{}", config.bind_addr, config.port);
    let app = build_router(AppState::new(store, config));

    match serve(app, &bind_addr).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, addr = %bind_addr, "Server error");
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with environment-based log levels.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trainer_backend=debug,tower_http=info")),
        )
        .init();
}

/// Log startup configuration (no secrets).
fn log_startup_info(config: &Config) {
    info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        data_file = %config.data_file.display(),
        public_dir = %config.public_dir.display(),
        uploads_dir = %config.uploads_dir.display(),
        max_body_size = config.max_body_size,
        "Starting trainer backend"
    );
}

/// Bind to address and serve the application.
async fn serve(app: axum::Router, bind_addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    info!(addr = %bind_addr, "Server listening");

    axum::serve(listener, app).await
}
