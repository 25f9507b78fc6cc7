//! Synchronization protocol between foreground sessions and the keeper.
//!
//! The message set is fixed and small: start, stop, state request, state
//! response. Delivery is at-most-once and every handler is idempotent, so a
//! dropped or duplicated message never corrupts the timer record. Timestamps
//! cross the boundary as RFC 3339 UTC strings to rule out clock-skew and
//! timezone misreads.
//!
//! On every foreground (re)connect the controller issues a state request and
//! adopts whatever the durable truth reports, discarding any stale local
//! assumption. That reconciliation is the sole recovery path for closed
//! sessions, slept devices, and multiple concurrent foregrounds.

use crate::libs::error::TimerError;
use crate::libs::timer::TimerState;
use serde::{Deserialize, Serialize};

/// The fixed message contract connecting the two execution contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
    #[serde(rename = "TIMER_START")]
    TimerStart {
        task_id: String,
        start_time: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "TIMER_STOP")]
    TimerStop { task_id: String },
    #[serde(rename = "TIMER_STATE_REQUEST")]
    StateRequest,
    #[serde(rename = "TIMER_STATE_RESPONSE")]
    StateResponse { state: Option<TimerState> },
}

impl SyncMessage {
    /// Parses a raw wire payload.
    ///
    /// Anything that does not deserialize into the fixed message set (an
    /// unknown tag, a START missing its task id or start time) is a
    /// [`TimerError::Protocol`] and the caller drops it without touching
    /// the store.
    pub fn parse(raw: &str) -> Result<SyncMessage, TimerError> {
        let message: SyncMessage = serde_json::from_str(raw).map_err(|e| TimerError::Protocol(e.to_string()))?;
        if let SyncMessage::TimerStart { task_id, .. } = &message {
            if task_id.trim().is_empty() {
                return Err(TimerError::Protocol("TIMER_START with empty task_id".to_string()));
            }
        }
        Ok(message)
    }

    pub fn to_json(&self) -> String {
        // The fixed message set always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}
