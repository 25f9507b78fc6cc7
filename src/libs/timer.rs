//! Core domain types for timer tracking.
//!
//! [`TimerState`] is the single active-timer record: at most one exists
//! system-wide at any instant, and its absence means the system is idle.
//! [`TimeEntry`] is an immutable ledger record of a completed span.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The one record representing an in-progress measurement for one task.
///
/// Created on start, deleted on stop. `last_update` is rewritten only by the
/// background keeper's heartbeat; `start` never changes once written, which is
/// what makes elapsed time re-derivable after any interruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub task_id: String,
    pub start: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl TimerState {
    pub fn new(task_id: &str, start: DateTime<Utc>) -> Self {
        TimerState {
            task_id: task_id.to_string(),
            start,
            last_update: start,
        }
    }

    /// Whole seconds elapsed since the persisted start. Recomputed from the
    /// absolute start on every call, never accumulated, so a suspended or
    /// reopened foreground can not drift.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start).num_seconds().max(0)
    }
}

/// Derived foreground status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Active,
}

impl std::fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerStatus::Idle => write!(f, "idle"),
            TimerStatus::Active => write!(f, "active"),
        }
    }
}

/// A completed (or manually entered) span of tracked time.
///
/// Immutable once appended to the ledger. Downstream aggregation only reads
/// these records.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: Option<i64>,
    pub task_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
    pub is_manual: bool,
    pub description: Option<String>,
}

impl TimeEntry {
    /// Builds a ledger entry for a span completed by stopping a timer.
    pub fn from_span(task_id: &str, start: DateTime<Utc>, end: DateTime<Utc>, description: Option<String>) -> Self {
        TimeEntry {
            id: None,
            task_id: task_id.to_string(),
            start,
            end,
            duration_minutes: round_minutes(end - start),
            is_manual: false,
            description,
        }
    }
}

/// Converts a span to whole minutes, rounding half up.
///
/// This is the pinned policy for the ledger's `duration_minutes` field:
/// 2.5 minutes rounds to 3, 2.49 rounds to 2, and negative spans clamp to 0.
pub fn round_minutes(span: chrono::Duration) -> i64 {
    let millis = span.num_milliseconds().max(0);
    (millis + 30_000) / 60_000
}
