//! Task existence check consumed by the timer controller.
//!
//! Owned by task management, which is outside the timer core; the controller
//! only needs to know whether a task id resolves before starting a timer.

use crate::libs::error::Result;

pub trait TaskLookup: Send + Sync {
    fn has_task(&self, task_id: &str) -> Result<bool>;
}
