//! Starts (or switches) the timer for a task.
//!
//! If another task's timer is running it is stopped first and its time entry
//! recorded; the two steps are one compound transaction, so exactly one
//! timer is active afterwards.

use crate::libs::error::TimerError;
use crate::libs::messages::Message;
use crate::{msg_error, msg_success};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Task identifier to start tracking
    pub task_id: String,
}

pub async fn cmd(args: StartArgs) -> Result<()> {
    let controller = super::connect_session().await?;
    let previous = controller.active_task_id();

    match controller.start_timer(&args.task_id).await {
        Ok(()) => match previous {
            Some(previous) if previous != args.task_id => {
                msg_success!(Message::TimerSwitched(previous, args.task_id));
            }
            _ => {
                msg_success!(Message::TimerStarted(args.task_id));
            }
        },
        Err(TimerError::Validation(task_id)) => {
            msg_error!(Message::TaskUnknown(task_id.clone()));
            anyhow::bail!(TimerError::Validation(task_id));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
