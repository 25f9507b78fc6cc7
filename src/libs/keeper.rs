//! Background tick keeper: the durable source of truth for the active timer.
//!
//! The keeper is a long-lived message-driven task that owns heartbeat
//! ticking. It answers state queries from foreground sessions and, while a
//! timer is active, periodically rewrites the record's `last_update` so
//! staleness is detectable without any foreground present. Because the
//! timer's start is immutable and every heartbeat re-reads the durable slot,
//! the keeper self-recovers after being restarted by its host: if the store
//! already holds an active record on activation, ticking resumes without
//! waiting for a new START.
//!
//! Failure semantics: a persistence error during the heartbeat is logged and
//! retried on the next tick, never fatal. Losing one heartbeat write only
//! risks detecting staleness a cycle late. Malformed wire messages are
//! dropped before they can touch the store.

use crate::libs::clock::Clock;
use crate::libs::config::KeeperConfig;
use crate::libs::messages::Message;
use crate::libs::protocol::SyncMessage;
use crate::libs::timer::TimerState;
use crate::{msg_debug, msg_error, msg_info, msg_warning};
use crate::db::timer_state::TimerStateStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Duration};

const CHANNEL_CAPACITY: usize = 32;

/// One unit of work for the keeper: a protocol message, plus a reply slot
/// when the sender expects a `TIMER_STATE_RESPONSE`.
pub struct KeeperRequest {
    message: SyncMessage,
    reply: Option<oneshot::Sender<Option<TimerState>>>,
}

/// Clonable sending side of the keeper's message channel.
///
/// Every foreground session holds one of these; the keeper itself is the
/// single receiver. Delivery is at-most-once and all keeper handlers are
/// idempotent, so senders fire and forget.
#[derive(Clone)]
pub struct KeeperHandle {
    tx: mpsc::Sender<KeeperRequest>,
}

impl KeeperHandle {
    /// Sends a typed protocol message. Returns false when the keeper is gone.
    pub async fn send(&self, message: SyncMessage) -> bool {
        self.tx.send(KeeperRequest { message, reply: None }).await.is_ok()
    }

    /// Parses and forwards a raw wire payload. Malformed payloads are
    /// dropped here, before the keeper can see them.
    pub async fn send_raw(&self, raw: &str) {
        match SyncMessage::parse(raw) {
            Ok(message) => {
                self.send(message).await;
            }
            Err(e) => {
                msg_warning!(Message::KeeperMessageDropped(e.to_string()));
            }
        }
    }

    /// Issues a `TIMER_STATE_REQUEST` and waits for the response.
    ///
    /// The outer `None` means the keeper is unreachable; callers fall back
    /// to reading the durable store directly.
    pub async fn request_state(&self) -> Option<Option<TimerState>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = KeeperRequest {
            message: SyncMessage::StateRequest,
            reply: Some(reply_tx),
        };
        if self.tx.send(request).await.is_err() {
            return None;
        }
        reply_rx.await.ok()
    }
}

/// The background keeper context.
pub struct Keeper {
    config: KeeperConfig,
    store: TimerStateStore,
    clock: Arc<dyn Clock>,
    rx: mpsc::Receiver<KeeperRequest>,
}

impl Keeper {
    pub fn new(config: KeeperConfig, store: TimerStateStore, clock: Arc<dyn Clock>) -> (Self, KeeperHandle) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Keeper { config, store, clock, rx }, KeeperHandle { tx })
    }

    /// Spawns the keeper onto the runtime and returns its handle.
    pub fn spawn(config: KeeperConfig, store: TimerStateStore, clock: Arc<dyn Clock>) -> (KeeperHandle, tokio::task::JoinHandle<()>) {
        let (keeper, handle) = Keeper::new(config, store, clock);
        let join = tokio::spawn(keeper.run());
        (handle, join)
    }

    /// Runs the keeper loop until every handle is dropped.
    pub async fn run(mut self) {
        // Self-recovery: an active record in the store means a previous
        // incarnation was interrupted mid-timer. Resume ticking for it.
        match self.store.get() {
            Ok(Some(state)) => {
                msg_info!(Message::KeeperResumedActiveTimer(state.task_id.clone()));
            }
            Ok(None) => {}
            Err(e) => {
                msg_error!(Message::KeeperError(e.to_string()));
            }
        }

        let mut heartbeat = time::interval(Duration::from_millis(self.config.heartbeat_interval_ms.max(1)));
        heartbeat.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        // The first interval tick fires immediately; skip it so a fresh START
        // is not heartbeaten at age zero.
        heartbeat.tick().await;

        loop {
            tokio::select! {
                request = self.rx.recv() => {
                    match request {
                        Some(request) => self.handle(request),
                        None => break,
                    }
                }
                _ = heartbeat.tick() => self.heartbeat(),
            }
        }
    }

    fn handle(&mut self, request: KeeperRequest) {
        match request.message {
            SyncMessage::TimerStart { task_id, start_time } => {
                // Idempotent upsert: re-applying the same values is a no-op,
                // a different record replaces the old one atomically.
                let state = TimerState::new(&task_id, start_time);
                if let Err(e) = self.store.put(&state) {
                    msg_error!(Message::KeeperError(e.to_string()));
                }
            }
            SyncMessage::TimerStop { task_id } => {
                msg_debug!(format!("keeper: stop for task '{}'", task_id));
                // Deleting an absent record is a no-op, not an error.
                if let Err(e) = self.store.delete() {
                    msg_error!(Message::KeeperError(e.to_string()));
                }
            }
            SyncMessage::StateRequest => {
                let state = match self.store.get() {
                    Ok(state) => state,
                    Err(e) => {
                        msg_error!(Message::KeeperError(e.to_string()));
                        None
                    }
                };
                if let Some(reply) = request.reply {
                    let _ = reply.send(state);
                }
            }
            SyncMessage::StateResponse { .. } => {
                // Keeper-to-foreground only; arriving here means a confused
                // sender. Drop it.
                msg_debug!("keeper: ignoring TIMER_STATE_RESPONSE");
            }
        }
    }

    /// One heartbeat: rewrite `last_update` if a timer is active. A write
    /// failure is logged and retried on the next tick.
    fn heartbeat(&mut self) {
        match self.store.touch(self.clock.now()) {
            Ok(true) => {
                msg_debug!("keeper: heartbeat written");
            }
            Ok(false) => {
                // Idle; nothing to touch.
            }
            Err(e) => {
                msg_warning!(Message::KeeperHeartbeatFailed(e.to_string()));
            }
        }
    }
}
