//! Stops the active timer and records its time entry.
//!
//! Stopping an idle system is a no-op, not an error.

use crate::libs::messages::Message;
use crate::{msg_error, msg_info, msg_success};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let controller = super::connect_session().await?;

    match controller.stop_timer().await {
        Ok(Some(entry)) => {
            msg_success!(Message::TimerStopped(entry.task_id, entry.duration_minutes));
        }
        Ok(None) => {
            msg_info!(Message::TimerAlreadyIdle);
        }
        Err(e) => {
            msg_error!(Message::StopNotPersisted(e.to_string()));
            return Err(e.into());
        }
    }
    Ok(())
}
