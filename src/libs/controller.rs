//! Foreground timer controller.
//!
//! One of these exists per interactive session. It validates and debounces
//! start/stop calls, keeps an in-memory projection of the durable timer
//! record for cheap queries, drives the display refresh loop, and reconciles
//! with the background keeper whenever a session (re)connects.
//!
//! The controller enforces the single-active-timer invariant with
//! stop-before-start semantics: starting a timer for task B while task A is
//! running is one compound transaction: append A's ledger entry, replace the
//! timer record, notify the keeper. Elapsed time is always recomputed from
//! the persisted absolute start, never accumulated, so a session that was
//! suspended for hours resumes with the correct value on its first tick.

use crate::db::time_entries::TimeEntries;
use crate::db::timer_state::TimerStateStore;
use crate::libs::clock::Clock;
use crate::libs::config::TimerConfig;
use crate::libs::error::{Result, TimerError};
use crate::libs::keeper::KeeperHandle;
use crate::libs::protocol::SyncMessage;
use crate::libs::task_lookup::TaskLookup;
use crate::libs::timer::{TimeEntry, TimerState, TimerStatus};
use crate::msg_debug;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, Duration};

/// Single-slot debounce holder: only the most recent start call within the
/// window executes, superseding any earlier queued call.
#[derive(Default)]
struct PendingStart {
    generation: u64,
    task_id: Option<String>,
}

struct RefreshLoop {
    handle: tokio::task::JoinHandle<()>,
}

struct Inner {
    config: TimerConfig,
    state_store: TimerStateStore,
    entries: TimeEntries,
    tasks: Arc<dyn TaskLookup>,
    clock: Arc<dyn Clock>,
    keeper: KeeperHandle,
    /// In-memory projection of the durable record. Every foreground instance
    /// is a disposable projection; the store plus keeper is authoritative.
    projection: Mutex<Option<TimerState>>,
    pending: Mutex<PendingStart>,
    refresh: Mutex<Option<RefreshLoop>>,
    elapsed_tx: watch::Sender<i64>,
}

#[derive(Clone)]
pub struct TimerController {
    inner: Arc<Inner>,
}

impl TimerController {
    /// Builds a controller and reconciles it with the durable truth.
    ///
    /// This is the (re)connect path for every scenario: fresh session,
    /// reopened session, resumed device: ask the keeper for the current
    /// state (falling back to the store when the keeper is unreachable) and
    /// adopt whatever it reports, discarding any local assumption. If a
    /// timer is active, ticking resumes from the persisted start no matter
    /// how long the foreground was away; there is no clamping.
    pub async fn connect(
        config: TimerConfig,
        state_store: TimerStateStore,
        entries: TimeEntries,
        tasks: Arc<dyn TaskLookup>,
        clock: Arc<dyn Clock>,
        keeper: KeeperHandle,
    ) -> Result<Self> {
        let (elapsed_tx, _) = watch::channel(0);
        let controller = TimerController {
            inner: Arc::new(Inner {
                config,
                state_store,
                entries,
                tasks,
                clock,
                keeper,
                projection: Mutex::new(None),
                pending: Mutex::new(PendingStart::default()),
                refresh: Mutex::new(None),
                elapsed_tx,
            }),
        };
        controller.reconcile().await?;
        Ok(controller)
    }

    /// Discards the local projection and adopts the keeper/durable truth.
    pub async fn reconcile(&self) -> Result<()> {
        let state = match self.inner.keeper.request_state().await {
            Some(state) => state,
            // Keeper unreachable: the durable record is still authoritative.
            None => self.inner.state_store.get()?,
        };

        let active = state.is_some();
        *self.inner.projection.lock() = state;
        if active {
            Inner::start_refresh(&self.inner);
        } else {
            Inner::stop_refresh(&self.inner);
        }
        Ok(())
    }

    /// Requests a timer start for `task_id`.
    ///
    /// The task must resolve through the task registry. The actual commit is
    /// debounced: bursts of calls within the configured window collapse to
    /// the effect of the last call only, so a double-click cannot produce
    /// duplicate writes. With a zero window the commit happens inline.
    pub async fn start_timer(&self, task_id: &str) -> Result<()> {
        if !self.inner.tasks.has_task(task_id)? {
            return Err(TimerError::Validation(task_id.to_string()));
        }

        if self.inner.config.debounce_ms == 0 {
            return Inner::commit_start(&self.inner, task_id).await;
        }

        let generation = {
            let mut pending = self.inner.pending.lock();
            pending.generation += 1;
            pending.task_id = Some(task_id.to_string());
            pending.generation
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(inner.config.debounce_ms)).await;
            let task_id = {
                let mut pending = inner.pending.lock();
                if pending.generation != generation {
                    // Superseded by a later call within the window.
                    return;
                }
                pending.task_id.take()
            };
            if let Some(task_id) = task_id {
                if let Err(e) = Inner::commit_start(&inner, &task_id).await {
                    msg_debug!(format!("debounced start failed: {e}"));
                }
            }
        });
        Ok(())
    }

    /// Stops the active timer and returns its ledger entry.
    ///
    /// A stop on an idle system is not an error: it returns `Ok(None)` and
    /// leaves the slot absent. On a persistence failure the projection rolls
    /// back to the durable truth before the error surfaces, so the display
    /// never keeps showing a timer state the store does not hold.
    pub async fn stop_timer(&self) -> Result<Option<TimeEntry>> {
        // The persisted record, not the local projection, decides whether
        // anything is running.
        let state = match self.inner.state_store.get()? {
            Some(state) => state,
            None => {
                *self.inner.projection.lock() = None;
                Inner::stop_refresh(&self.inner);
                return Ok(None);
            }
        };

        match Inner::persist_stop(&self.inner, &state) {
            Ok(entry) => {
                *self.inner.projection.lock() = None;
                Inner::stop_refresh(&self.inner);
                self.inner
                    .keeper
                    .send(SyncMessage::TimerStop {
                        task_id: state.task_id.clone(),
                    })
                    .await;
                Ok(Some(entry))
            }
            Err(e) => {
                // Roll the displayed state back to the last known-good
                // durable value within this tick.
                let durable = self.inner.state_store.get().unwrap_or(None);
                *self.inner.projection.lock() = durable;
                Err(e)
            }
        }
    }

    /// Whole seconds elapsed for `task_id`, 0 unless it is the active task.
    pub fn elapsed_seconds(&self, task_id: &str) -> i64 {
        let projection = self.inner.projection.lock();
        match projection.as_ref() {
            Some(state) if state.task_id == task_id => state.elapsed_seconds(self.inner.clock.now()),
            _ => 0,
        }
    }

    pub fn is_active(&self, task_id: &str) -> bool {
        let projection = self.inner.projection.lock();
        matches!(projection.as_ref(), Some(state) if state.task_id == task_id)
    }

    pub fn active_task_id(&self) -> Option<String> {
        self.inner.projection.lock().as_ref().map(|state| state.task_id.clone())
    }

    pub fn status(&self) -> TimerStatus {
        if self.inner.projection.lock().is_some() {
            TimerStatus::Active
        } else {
            TimerStatus::Idle
        }
    }

    /// Subscribes to the display refresh loop. While a timer is active the
    /// channel receives the recomputed elapsed seconds once per refresh
    /// interval.
    pub fn subscribe_elapsed(&self) -> watch::Receiver<i64> {
        self.inner.elapsed_tx.subscribe()
    }
}

impl Inner {
    /// The debounced commit path for a start request.
    ///
    /// Compound transaction: if a different task is active its entry is
    /// appended and the record replaced, never leaving two simultaneously
    /// active. Re-starting the already-active task is a no-op.
    async fn commit_start(inner: &Arc<Inner>, task_id: &str) -> Result<()> {
        let previous = inner.state_store.get()?;

        if let Some(previous) = previous {
            if previous.task_id == task_id {
                msg_debug!(format!("start for already-active task '{task_id}' ignored"));
                return Ok(());
            }
            let entry = Inner::persist_stop(inner, &previous)?;
            msg_debug!(format!(
                "implicit stop of '{}' recorded {} min",
                previous.task_id, entry.duration_minutes
            ));
            inner
                .keeper
                .send(SyncMessage::TimerStop {
                    task_id: previous.task_id.clone(),
                })
                .await;
        }

        let now = inner.clock.now();
        let state = TimerState::new(task_id, now);
        inner.state_store.put(&state)?;
        *inner.projection.lock() = Some(state);
        inner
            .keeper
            .send(SyncMessage::TimerStart {
                task_id: task_id.to_string(),
                start_time: now,
            })
            .await;
        Inner::start_refresh(inner);
        Ok(())
    }

    /// Durable half of a stop: append the ledger entry and clear the slot in
    /// one transaction. If it fails, neither table changed and the stop can
    /// be retried without double-counting the span.
    fn persist_stop(inner: &Arc<Inner>, state: &TimerState) -> Result<TimeEntry> {
        let now = inner.clock.now();
        let entry = TimeEntry::from_span(&state.task_id, state.start, now, None);
        inner.entries.record_stop(&entry)
    }

    /// Starts the display refresh loop if it is not already running. Each
    /// tick recomputes elapsed time from the absolute start and publishes it
    /// on the watch channel; the loop ends itself when the projection goes
    /// idle.
    fn start_refresh(inner: &Arc<Inner>) {
        let mut refresh = inner.refresh.lock();
        if refresh.is_some() {
            return;
        }

        let loop_inner = Arc::clone(inner);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(Duration::from_millis(loop_inner.config.refresh_interval_ms.max(1)));
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let elapsed = {
                    let projection = loop_inner.projection.lock();
                    match projection.as_ref() {
                        Some(state) => state.elapsed_seconds(loop_inner.clock.now()),
                        None => break,
                    }
                };
                let _ = loop_inner.elapsed_tx.send(elapsed);
            }
            *loop_inner.refresh.lock() = None;
        });
        *refresh = Some(RefreshLoop { handle });
    }

    fn stop_refresh(inner: &Arc<Inner>) {
        if let Some(refresh) = inner.refresh.lock().take() {
            refresh.handle.abort();
        }
        let _ = inner.elapsed_tx.send(0);
    }
}
