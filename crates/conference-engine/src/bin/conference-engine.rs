//! Conference service
//!
//! Connects to the configured Asterisk instances, keeps conference state in step with
//! their events and serves the conference RPC surface.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use rvoip_conference_engine::config::ServiceConfig;
use rvoip_conference_engine::logging::{log_welcome, setup_logging};
use rvoip_conference_engine::server::ConferenceServerBuilder;

#[derive(Parser, Debug)]
#[command(name = "conference-engine")]
#[command(about = "ARI event ingestion and conference state machine")]
struct Args {
    /// Configuration file (TOML); `CONFERENCE__*` environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overrides the configured one
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.json = true;
    }

    setup_logging(&config.logging)?;
    log_welcome("conference-engine", env!("CARGO_PKG_VERSION"));

    let mut server = ConferenceServerBuilder::new()
        .with_config(config)
        .build()
        .await?;
    server.start().await?;

    tokio::select! {
        res = server.run() => {
            if let Err(e) = res {
                error!("❌ Server error: {}", e);
            }
        }
        _ = signal::ctrl_c() => {
            info!("🛑 Received Ctrl+C");
        }
    }

    server.stop().await?;
    Ok(())
}
