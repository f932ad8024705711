//! API gateway binary.
//!
//! ```text
//!     Client ──▶ tower-http layers ──▶ Dispatcher ──▶ auth gate ──▶ handler ──▶ store
//!                (request id, trace,    (preflight,    (bearer       (users,
//!                 timeout, body limit)   route match)   token)        products, auth)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::{load_config, validate_config, GatewayConfig};
use api_gateway::lifecycle::{self, Shutdown};
use api_gateway::observability::{init_logging, init_metrics};
use api_gateway::{build_dispatcher, AppServices, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "api-gateway", version, about = "JSON API gateway")]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener port.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Override the log level.
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.set_port(port);
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    init_logging(&config.observability);
    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(field = error.field, message = %error.message, "Invalid configuration");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.security.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let services = AppServices::in_memory(&config.auth);
    let dispatcher = Arc::new(build_dispatcher(&config, &services)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(lifecycle::ctrl_c(shutdown));

    HttpServer::new(config, dispatcher).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
