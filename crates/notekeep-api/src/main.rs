//! notekeep server binary.
//!
//! `notekeep [PORT]` serves the notes API and, unless disabled, runs the
//! operator console on stdin/stdout. Console `exit` and Ctrl-C both shut
//! the server down gracefully.

use clap::Parser;
use tracing::{info, warn};

use notekeep_api::config::{CliArgs, Config};
use notekeep_api::logging::{init_tracing, LogConfig};
use notekeep_api::{build_router, console, serve, AppState, Shutdown};
use notekeep_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let log_config = LogConfig::from_env();
    let _file_guard = init_tracing(&log_config);
    info!(
        log_format = ?log_config.format,
        log_file = %log_config.destination(),
        "Logging initialized"
    );

    let cli = CliArgs::parse();
    let config = Config::from_env(cli)?;

    let store = Store::open(&config.data_dir, &config.tokens_file).await?;
    info!(
        data_dir = %config.data_dir.display(),
        tokens_file = %config.tokens_file,
        "store opened"
    );

    let shutdown = Shutdown::new();

    // Ctrl-C takes the same path as console `exit`.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("interrupt received");
                    shutdown.trigger();
                }
                Err(e) => warn!(error = %e, "could not listen for Ctrl-C"),
            }
        });
    }

    if config.console_enabled {
        console::spawn(store.clone(), shutdown.clone(), tokio::runtime::Handle::current())?;
    } else {
        info!("operator console disabled");
    }

    let app = build_router(AppState::new(store));

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve(listener, app, shutdown).await?;

    info!("server stopped");
    Ok(())
}
