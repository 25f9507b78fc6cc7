//! Shows the active timer, its elapsed time, and heartbeat freshness.

use crate::db::timer_state::TimerStateStore;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::msg_print;
use anyhow::Result;
use chrono::Utc;

pub async fn cmd() -> Result<()> {
    // Read the durable record directly: the store is authoritative whether
    // or not a keeper or another foreground session is around.
    let store = TimerStateStore::new()?;

    match store.get()? {
        Some(state) => {
            let elapsed = state.elapsed_seconds(Utc::now());
            msg_print!(Message::TimerStatusActive {
                task_id: state.task_id.clone(),
                elapsed_seconds: elapsed
            });
            View::active_timer(&state, elapsed);
        }
        None => {
            msg_print!(Message::TimerStatusIdle);
        }
    }
    Ok(())
}
