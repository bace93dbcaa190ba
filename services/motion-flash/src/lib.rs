//! Motion flash - screen flash notifications for smart-home motion events
//!
//! Polls a room status API, detects rooms whose motion sensor just switched
//! on, and produces a short visible flash for each poll that saw new motion.

pub mod actuator;
pub mod config;
pub mod detector;
pub mod error;
pub mod io;
pub mod monitor;
pub mod state;
pub mod status;

pub use config::{load_config, Config};
pub use error::{MotionFlashError, PollError, Result};

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::actuator::{AlertActuator, CommandActuator, Flasher, LogActuator};
use crate::io::ReqwestHttpClient;
use crate::monitor::Monitor;
use crate::status::HttpStatusSource;

/// Pick the actuator for this run
pub fn build_actuator(config: &Config, dry_run: bool) -> Arc<dyn AlertActuator> {
    if dry_run {
        Arc::new(LogActuator)
    } else {
        Arc::new(CommandActuator::from_config(&config.flash))
    }
}

/// Assemble a monitor from configuration
pub fn build_monitor(config: &Config, actuator: Arc<dyn AlertActuator>) -> Result<Monitor> {
    config.validate()?;

    let http = Arc::new(ReqwestHttpClient::new(config.status.timeout)?);
    let source = Arc::new(HttpStatusSource::new(config.status.url.clone(), http));
    let flasher = Flasher::new(
        actuator,
        config.flash.duration,
        config.flash.command_timeout,
    );

    Ok(Monitor::new(source, flasher, config.polling.interval))
}

/// Run the monitor until Ctrl+C
pub async fn run(config: Config, actuator: Arc<dyn AlertActuator>) -> Result<()> {
    let monitor = build_monitor(&config, actuator)?;
    run_until(monitor, tokio::signal::ctrl_c()).await
}

/// Run the monitor until `shutdown` resolves.
///
/// A shutdown future that fails (e.g. the signal handler could not be
/// installed) still stops the monitor, and the error is returned.
pub async fn run_until<F>(mut monitor: Monitor, shutdown: F) -> Result<()>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    let cancel = CancellationToken::new();

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    let signal = tokio::spawn(async move {
        let result = shutdown.await;
        match &result {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
        cancel_for_signal.cancel();
        result
    });

    monitor.run(cancel).await;
    tracing::info!("Motion flash monitor stopped");

    signal
        .await
        .map_err(|e| MotionFlashError::Io(std::io::Error::other(e.to_string())))??;

    Ok(())
}
