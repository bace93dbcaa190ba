//! Configuration types for the motion-flash service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// AppleScript that toggles macOS display inversion (Ctrl+Opt+Cmd+8)
const INVERT_DISPLAY_SCRIPT: &str = "tell application \"System Events\"\n\
key code 28 using {control down, option down, command down}\n\
end tell";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub flash: FlashConfig,
}

/// Where and how the room status is fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_fetch_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
        }
    }
}

/// Shape of the on/off pulse and the command that produces it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashConfig {
    #[serde(default = "default_flash_duration", with = "humantime_serde")]
    pub duration: Duration,
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
    #[serde(default = "default_assert_command")]
    pub assert_command: Vec<String>,
    /// Falls back to `assert_command` when unset, for toggle-style mechanisms
    #[serde(default)]
    pub deassert_command: Option<Vec<String>>,
}

impl FlashConfig {
    pub fn deassert_command(&self) -> &[String] {
        self.deassert_command
            .as_deref()
            .unwrap_or(&self.assert_command)
    }
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            duration: default_flash_duration(),
            command_timeout: default_command_timeout(),
            assert_command: default_assert_command(),
            deassert_command: None,
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:3000/api/rooms".to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_flash_duration() -> Duration {
    Duration::from_millis(200)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(1)
}

fn default_assert_command() -> Vec<String> {
    vec![
        "osascript".to_string(),
        "-e".to_string(),
        INVERT_DISPLAY_SCRIPT.to_string(),
    ]
}

impl Config {
    /// Reject settings the monitor loop cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.status.url.trim().is_empty() {
            return Err(crate::MotionFlashError::Config(
                "status.url must not be empty".to_string(),
            ));
        }
        if self.polling.interval.is_zero() {
            return Err(crate::MotionFlashError::Config(
                "polling.interval must be greater than zero".to_string(),
            ));
        }
        if self.flash.assert_command.is_empty() {
            return Err(crate::MotionFlashError::Config(
                "flash.assert_command must name a program".to_string(),
            ));
        }
        if self.flash.deassert_command().is_empty() {
            return Err(crate::MotionFlashError::Config(
                "flash.deassert_command must name a program".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::MotionFlashError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
