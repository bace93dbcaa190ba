//! Motion flash CLI
//!
//! Command-line interface for the motion flash monitor.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use motion_flash::{build_actuator, load_config, Config, MotionFlashError};
use tracing::Level;

#[derive(Parser)]
#[command(name = "motion-flash")]
#[command(about = "Flash the screen when a room's motion sensor triggers")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Room status endpoint (overrides config file)
    #[arg(long)]
    url: Option<String>,

    /// Time between polls, e.g. "2s" (overrides config file)
    #[arg(long, value_parser = humantime::parse_duration)]
    poll_interval: Option<Duration>,

    /// How long the flash stays on, e.g. "200ms" (overrides config file)
    #[arg(long, value_parser = humantime::parse_duration)]
    flash_duration: Option<Duration>,

    /// Timeout for each status request, e.g. "5s" (overrides config file)
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Log flashes instead of running the flash command
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, url={:?}, dry_run={}, log_level={:?}",
        args.config,
        args.url,
        args.dry_run,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(url) = args.url {
        config.status.url = url;
    }
    if let Some(interval) = args.poll_interval {
        config.polling.interval = interval;
    }
    if let Some(duration) = args.flash_duration {
        config.flash.duration = duration;
    }
    if let Some(timeout) = args.timeout {
        config.status.timeout = timeout;
    }

    let actuator = build_actuator(&config, args.dry_run);

    // One logical thread of control: fetch, detect and flash never overlap
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(MotionFlashError::from)?;
    runtime.block_on(motion_flash::run(config, actuator))?;

    Ok(())
}
