//! Server entry point.
//!
//! # Responsibility
//! - Load configuration, start logging, migrate storage once, then serve.
//! - Shut down gracefully on Ctrl-C.

mod config;

use classroom_api::{router, AppState};
use classroom_core::db::open_db;
use classroom_core::init_logging;
use config::ServerConfig;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=server_exit module=server status=error error={message}");
            eprintln!("classroom_server: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("CLASSROOM_CONFIG").map(PathBuf::from));
    let cfg = ServerConfig::load(config_path.as_deref()).map_err(|err| err.to_string())?;

    init_logging(&cfg.log_level, cfg.log_dir.as_deref())?;
    info!(
        "event=config_load module=server status=ok addr={} db_path={}",
        cfg.addr,
        cfg.db_path.display()
    );

    // Migrate up front so request-time opens only check the version.
    drop(open_db(&cfg.db_path).map_err(|err| format!("unable to open database: {err}"))?);

    let listener = tokio::net::TcpListener::bind(cfg.addr)
        .await
        .map_err(|err| format!("unable to bind {}: {err}", cfg.addr))?;
    info!("event=server_listen module=server status=ok addr={}", cfg.addr);

    axum::serve(listener, router(AppState::new(cfg.db_path)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| format!("server error: {err}"))?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
}
