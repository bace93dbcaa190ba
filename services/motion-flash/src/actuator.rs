//! Alert actuation: the on/off pulse that makes a motion event visible

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::FlashConfig;
use crate::error::ActuatorError;

/// A visual alert mechanism that can be switched on and off
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AlertActuator: Send + Sync {
    /// Short description for the startup banner
    fn description(&self) -> String;

    /// Switch the alert on
    async fn assert_alert(&self) -> Result<(), ActuatorError>;

    /// Switch the alert off
    async fn deassert_alert(&self) -> Result<(), ActuatorError>;
}

/// Runs an external program for each edge of the pulse
#[derive(Debug, Clone)]
pub struct CommandActuator {
    assert_command: Vec<String>,
    deassert_command: Vec<String>,
}

impl CommandActuator {
    pub fn new(assert_command: Vec<String>, deassert_command: Vec<String>) -> Self {
        Self {
            assert_command,
            deassert_command,
        }
    }

    pub fn from_config(config: &FlashConfig) -> Self {
        Self::new(
            config.assert_command.clone(),
            config.deassert_command().to_vec(),
        )
    }

    async fn run(command: &[String]) -> Result<(), ActuatorError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ActuatorError::Other("empty actuator command".to_string()))?;

        tracing::debug!("Running actuator command {}", program);
        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ActuatorError::Spawn {
                command: program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = match stderr.trim() {
                "" => output.status.to_string(),
                detail => format!("{} ({})", output.status, detail),
            };
            Err(ActuatorError::ExitStatus {
                command: program.clone(),
                status,
            })
        }
    }
}

#[async_trait]
impl AlertActuator for CommandActuator {
    fn description(&self) -> String {
        let program = self.assert_command.first().map(String::as_str).unwrap_or("");
        if self.assert_command == self.deassert_command {
            format!("toggle via {}", program)
        } else {
            let off = self
                .deassert_command
                .first()
                .map(String::as_str)
                .unwrap_or("");
            format!("{} / {}", program, off)
        }
    }

    async fn assert_alert(&self) -> Result<(), ActuatorError> {
        Self::run(&self.assert_command).await
    }

    async fn deassert_alert(&self) -> Result<(), ActuatorError> {
        Self::run(&self.deassert_command).await
    }
}

/// Logs the pulse instead of producing it. Used for dry runs.
#[derive(Debug, Default)]
pub struct LogActuator;

#[async_trait]
impl AlertActuator for LogActuator {
    fn description(&self) -> String {
        "log only (dry run)".to_string()
    }

    async fn assert_alert(&self) -> Result<(), ActuatorError> {
        tracing::info!("Flash on");
        Ok(())
    }

    async fn deassert_alert(&self) -> Result<(), ActuatorError> {
        tracing::info!("Flash off");
        Ok(())
    }
}

/// Drives an actuator through one bounded on/off pulse
pub struct Flasher {
    actuator: Arc<dyn AlertActuator>,
    duration: Duration,
    command_timeout: Duration,
}

impl fmt::Debug for Flasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flasher")
            .field("actuator", &self.actuator.description())
            .field("duration", &self.duration)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl Flasher {
    pub fn new(
        actuator: Arc<dyn AlertActuator>,
        duration: Duration,
        command_timeout: Duration,
    ) -> Self {
        Self {
            actuator,
            duration,
            command_timeout,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn actuator_description(&self) -> String {
        self.actuator.description()
    }

    /// Produce one pulse. Failures are logged and swallowed; returns whether
    /// both edges succeeded.
    pub async fn flash(&self) -> bool {
        if let Err(e) = self.bounded("assert", self.actuator.assert_alert()).await {
            tracing::warn!("Flash error: {}", e);
            return false;
        }

        tokio::time::sleep(self.duration).await;

        match self.bounded("deassert", self.actuator.deassert_alert()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Flash error: {}", e);
                false
            }
        }
    }

    async fn bounded<F>(&self, step: &str, call: F) -> Result<(), ActuatorError>
    where
        F: std::future::Future<Output = Result<(), ActuatorError>>,
    {
        match tokio::time::timeout(self.command_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ActuatorError::Timeout {
                command: step.to_string(),
                timeout: self.command_timeout,
            }),
        }
    }
}
