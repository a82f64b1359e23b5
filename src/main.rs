//! CORS forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 CORS PROXY                   │
//!                     │                                              │
//!   Browser request   │  ┌─────────┐   ┌─────────┐   ┌───────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│  audit  │──▶│  OPTIONS? │───┼──▶ preflight (200)
//!                     │  │ server  │   │ filter  │   └─────┬─────┘   │
//!                     │  └─────────┘   └────┬────┘         │         │
//!                     │                     ▼              ▼         │
//!                     │               ┌──────────┐  ┌────────────┐   │
//!                     │               │ log file │  │ forwarder  │───┼──▶ Backend
//!                     │               └──────────┘  └─────┬──────┘   │
//!   Browser response  │                                   ▼          │
//!   ◀─────────────────┼──────────── CORS + content headers, 8 KiB ◀──┼─── Backend
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_proxy::config::resolve_config;
use cors_proxy::lifecycle::signals::wait_for_signal;
use cors_proxy::observability::logging;
use cors_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "cors-proxy")]
#[command(about = "Forwarding proxy adding CORS headers and an audit trail", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.origin,
        allowed_origin = %config.cors.allowed_origin,
        audit_enabled = config.audit.enabled,
        audit_log = %config.audit.log_path,
        "Configuration loaded"
    );

    if cli.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = wait_for_signal() => shutdown.trigger(),
    }

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
