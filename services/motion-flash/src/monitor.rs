//! Monitor: the poll, detect and flash loop

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;

use crate::actuator::Flasher;
use crate::detector::MotionEdgeDetector;
use crate::state::{Diagnostic, MonitorSession};
use crate::status::StatusSource;

/// Lifecycle of a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for MonitorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorPhase::Starting => write!(f, "Starting"),
            MonitorPhase::Running => write!(f, "Running"),
            MonitorPhase::Stopping => write!(f, "Stopping"),
            MonitorPhase::Stopped => write!(f, "Stopped"),
        }
    }
}

/// What happened during one poll cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Display names of rooms whose motion just switched on
    pub triggered: Vec<String>,
    /// A complete on/off pulse was produced
    pub flashed: bool,
    pub diagnostic: Option<Diagnostic>,
}

/// Polls a status source on a fixed interval and flashes on new motion
pub struct Monitor {
    source: Arc<dyn StatusSource>,
    detector: MotionEdgeDetector,
    flasher: Flasher,
    interval: Duration,
    session: MonitorSession,
    phase: MonitorPhase,
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("endpoint", &self.source.endpoint())
            .field("interval", &self.interval)
            .field("phase", &self.phase)
            .finish()
    }
}

impl Monitor {
    pub fn new(source: Arc<dyn StatusSource>, flasher: Flasher, interval: Duration) -> Self {
        Self {
            source,
            detector: MotionEdgeDetector::new(),
            flasher,
            interval,
            session: MonitorSession::new(),
            phase: MonitorPhase::Starting,
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    pub fn session(&self) -> &MonitorSession {
        &self.session
    }

    pub fn detector(&self) -> &MotionEdgeDetector {
        &self.detector
    }

    /// Run one fetch, detect and (maybe) flash cycle
    pub async fn poll_once(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.source.fetch().await {
            Ok(rooms) => {
                report.triggered = self
                    .detector
                    .observe(&rooms)
                    .into_iter()
                    .map(|room| {
                        if room.name.is_empty() {
                            room.id.to_string()
                        } else {
                            room.name.clone()
                        }
                    })
                    .collect();

                tracing::debug!(
                    "Poll returned {} rooms, {} new motion",
                    rooms.len(),
                    report.triggered.len()
                );

                if !report.triggered.is_empty() {
                    tracing::info!("MOTION DETECTED: {}", report.triggered.join(", "));
                    report.flashed = self.flasher.flash().await;
                    if report.flashed {
                        self.session.record_flash();
                    }
                }

                self.session.record_success(Local::now());
            }
            Err(e) => {
                report.diagnostic = self.session.record_failure(&e, self.source.endpoint());
                match &report.diagnostic {
                    Some(d @ Diagnostic::Unknown(_)) => tracing::error!("{}", d),
                    Some(d) => tracing::warn!("{}", d),
                    None => tracing::debug!(
                        "Suppressed repeated connection error ({} in a row): {}",
                        self.session.consecutive_errors(),
                        e
                    ),
                }
            }
        }

        report
    }

    /// Poll until `cancel` fires. The cycle in flight always completes; only
    /// the sleep between cycles is cut short.
    pub async fn run(&mut self, cancel: CancellationToken) {
        self.log_banner();
        self.phase = MonitorPhase::Running;

        while !cancel.is_cancelled() {
            self.poll_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = cancel.cancelled() => {}
            }
        }

        self.phase = MonitorPhase::Stopping;
        tracing::info!(
            "Stopping monitor after {} polls and {} flashes",
            self.session.polls(),
            self.session.flashes()
        );
        self.phase = MonitorPhase::Stopped;
    }

    fn log_banner(&self) {
        tracing::info!("Motion flash monitor");
        tracing::info!("API endpoint: {}", self.source.endpoint());
        tracing::info!("Poll interval: {:?}", self.interval);
        tracing::info!("Flash duration: {:?}", self.flasher.duration());
        tracing::info!("Flash method: {}", self.flasher.actuator_description());
        tracing::info!("Monitoring for motion... (press Ctrl+C to stop)");
    }
}
