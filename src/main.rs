//! # Telemetry Dashboard
//!
//! Live sensor dashboard fed by an MQTT broker.
//!
//! Subscribes to the configured temperature and rotation topics and renders
//! every dashboard update as JSON Lines on stdout. Logs go to stderr, or to a
//! daily rolling file with `--log-file`.
//!
//! Operator commands are read from stdin, one per line: `refresh`,
//! `range <range>` and `logout`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use telemetry_dashboard::config::Config;
use telemetry_dashboard::controller::{forward_commands, SessionController};
use telemetry_dashboard::sink::JsonlRenderer;
use telemetry_dashboard::transport::MqttTransport;

/// Default configuration file location
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Operator commands waiting for the session loop
const COMMAND_QUEUE: usize = 16;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "telemetry-dashboard", version, about)]
struct Args {
    /// Path to the TOML configuration file (defaults apply if it does not exist)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Feed simulated readings while the broker is unreachable
    #[arg(long)]
    simulate: bool,

    /// Write logs to a daily rolling file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Set up tracing; the returned guard must live until exit when logging to a file
fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "telemetry-dashboard.log".into());

            let appender = tracing_appender::rolling::daily(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

/// Main entry point for the telemetry dashboard
///
/// # Control Flow
///
/// 1. Parse arguments, set up logging, load configuration
/// 2. Connect to the broker and subscribe to both topics
/// 3. Render updates and apply operator commands from stdin, retrying the
///    broker every `reconnect.interval_ms` while it is unreachable
/// 4. On Ctrl+C or `logout`, disconnect and cancel any pending reconnect
///
/// # Errors
///
/// Returns error if the configuration file exists but is invalid.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_file.as_deref());

    info!("Telemetry Dashboard v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if args.simulate {
        config.simulation.enabled = true;
    }

    let transport = MqttTransport::new(&config.broker);
    info!("MQTT client id: {}", transport.client_id());

    let renderer = JsonlRenderer::new(std::io::stdout());
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE);
    tokio::spawn(async move {
        if let Err(e) = forward_commands(BufReader::new(tokio::io::stdin()), commands_tx).await {
            warn!("Stopped reading commands: {}", e);
        }
    });

    let mut controller =
        SessionController::new(&config, transport, renderer).with_commands(commands_rx);

    info!("Press Ctrl+C or type 'logout' to exit");
    controller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!(
        "Session ended: {} temperature samples, {} rotations today",
        controller.state().temperatures().len(),
        controller.state().daily_rotations()
    );

    Ok(())
}
