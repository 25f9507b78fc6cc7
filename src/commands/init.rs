//! Application configuration initialization command.
//!
//! Interactive setup wizard for first-time use: timer debounce/refresh
//! settings and keeper heartbeat interval.

use crate::{
    libs::{config::Config, data_storage::DataStorage, messages::Message},
    msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Remove existing configuration instead of creating new one
    #[arg(short, long)]
    delete: bool,
}

pub fn cmd(init_args: InitArgs) -> Result<()> {
    // Handle deletion mode - exit early after cleanup
    if init_args.delete {
        let config_path = DataStorage::new()
            .get_path(crate::libs::config::CONFIG_FILE_NAME)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if config_path.exists() {
            std::fs::remove_file(config_path)?;
        }
        return Ok(());
    }

    // Run interactive configuration wizard
    Config::init()?.save()?;

    msg_success!(Message::ConfigSaved);
    Ok(())
}
