//! Configuration management for the tracket application.
//!
//! Settings are stored as JSON in the platform data directory and loaded with
//! defaults when no file exists. `tracket init` runs an interactive wizard
//! over the configurable modules.

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Foreground timer controller settings.
///
/// The debounce window bounds how quickly repeated start calls collapse into
/// one; the refresh interval drives the elapsed-time display loop.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimerConfig {
    /// Window in milliseconds within which a burst of start calls collapses
    /// to the effect of the last call only.
    pub debounce_ms: u64,

    /// Interval in milliseconds between display refreshes while a timer is
    /// active. Each tick recomputes elapsed time from the absolute start.
    pub refresh_interval_ms: u64,
}

/// Background keeper settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct KeeperConfig {
    /// Interval in milliseconds between heartbeat rewrites of the active
    /// timer's `last_update` field.
    pub heartbeat_interval_ms: u64,
}

impl Default for TimerConfig {
    /// 100 ms debounce absorbs double-clicks without being perceptible;
    /// 1 s refresh matches a whole-seconds elapsed display.
    fn default() -> Self {
        TimerConfig {
            debounce_ms: 100,
            refresh_interval_ms: 1000,
        }
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        KeeperConfig {
            heartbeat_interval_ms: 30_000,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub keeper: Option<KeeperConfig>,
}

impl Config {
    /// Reads configuration from the filesystem, falling back to defaults
    /// when no file exists.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME).map_err(|e| anyhow::anyhow!(e.to_string()))?;

        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str).map_err(|_| crate::msg_error_anyhow!(Message::ConfigParseError))?;
        Ok(config)
    }

    /// Saves the current configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME).map_err(|e| anyhow::anyhow!(e.to_string()))?;

        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Runs the interactive configuration wizard.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = ["Timer", "Keeper"];
        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules)
            .interact()?;

        for &selection in &selected {
            match modules[selection] {
                "Timer" => {
                    let default = config.timer.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleTimer);
                    config.timer = Some(TimerConfig {
                        debounce_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptDebounceWindow.to_string())
                            .default(default.debounce_ms)
                            .interact_text()?,
                        refresh_interval_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptRefreshInterval.to_string())
                            .default(default.refresh_interval_ms)
                            .interact_text()?,
                    });
                }
                "Keeper" => {
                    let default = config.keeper.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleKeeper);
                    config.keeper = Some(KeeperConfig {
                        heartbeat_interval_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptHeartbeatInterval.to_string())
                            .default(default.heartbeat_interval_ms)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
