//! Serve a serial scale over HTTP.
//!
//! Usage:
//!   serial-scale-server                       # platform default port
//!   serial-scale-server COM3
//!   serial-scale-server /dev/ttyUSB0 --bind 0.0.0.0:5000
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug serial-scale-server /dev/ttyUSB0

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use serial_scale::constants::{DEFAULT_PORT, MAX_WAIT_TIME_MS, WAIT_INTERVAL_MS};
use serial_scale::server::{self, AppState};
use serial_scale::{PollTiming, PortSettings, ScaleReader};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Expose a serial-port scale over HTTP")]
struct Cli {
    /// Serial device the scale is attached to
    #[arg(default_value = DEFAULT_PORT)]
    port: String,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Initial baud rate
    #[arg(long)]
    baud_rate: Option<u32>,

    /// Delay between buffer polls, in milliseconds
    #[arg(long, default_value_t = WAIT_INTERVAL_MS)]
    wait_interval_ms: u64,

    /// Wait before a read is reported as timed out, in milliseconds
    #[arg(long, default_value_t = MAX_WAIT_TIME_MS)]
    max_wait_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger with default info level if RUST_LOG is not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut reader = ScaleReader::new(&cli.port).with_timing(PollTiming {
        wait_interval: Duration::from_millis(cli.wait_interval_ms),
        max_wait: Duration::from_millis(cli.max_wait_ms),
    });
    if let Some(baud_rate) = cli.baud_rate {
        let settings = PortSettings {
            baud_rate,
            ..reader.get_settings()
        };
        reader = reader.with_settings(settings);
    }

    match reader.list_ports() {
        Ok(ports) => info!("Detected ports: {}", ports.join(", ")),
        Err(e) => warn!("Could not list serial ports: {}", e),
    }
    info!("Scale settings: {:?}", reader.get_settings());

    let app = server::router(AppState::new(reader));
    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("binding {}", cli.bind))?;

    info!("Listening on http://{}", cli.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
