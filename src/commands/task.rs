//! Registers a task id with the minimal task registry.
//!
//! Task management proper lives outside the timer core; this just seeds the
//! ids that `tracket start` validates against.

use crate::db::tasks::Tasks;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Task identifier used by start/stop
    pub id: String,
    /// Human-readable task name
    #[arg(default_value = "")]
    pub name: String,
}

pub fn cmd(args: TaskArgs) -> Result<()> {
    Tasks::new()?.insert(&args.id, &args.name)?;
    msg_success!(Message::TaskRegistered(args.id));
    Ok(())
}
