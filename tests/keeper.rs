#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rusqlite::Connection;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tracket::db::timer_state::TimerStateStore;
    use tracket::libs::clock::{Clock, ManualClock};
    use tracket::libs::config::KeeperConfig;
    use tracket::libs::keeper::{Keeper, KeeperHandle};
    use tracket::libs::protocol::SyncMessage;
    use tracket::libs::timer::TimerState;

    struct KeeperTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
        clock: ManualClock,
    }

    impl AsyncTestContext for KeeperTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("tracket.db");
            let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
            KeeperTestContext {
                _temp_dir: temp_dir,
                db_path,
                clock,
            }
        }
    }

    impl KeeperTestContext {
        fn store(&self) -> TimerStateStore {
            TimerStateStore::open(&self.db_path).unwrap()
        }

        fn spawn_keeper(&self, heartbeat_interval_ms: u64) -> KeeperHandle {
            let config = KeeperConfig { heartbeat_interval_ms };
            let (handle, _join) = Keeper::spawn(config, self.store(), Arc::new(self.clock.clone()));
            handle
        }
    }

    #[test_context(KeeperTestContext)]
    #[tokio::test]
    async fn start_message_upserts_the_timer_record(ctx: &mut KeeperTestContext) {
        let handle = ctx.spawn_keeper(3_600_000);
        let start_time = ctx.clock.now();

        handle
            .send(SyncMessage::TimerStart {
                task_id: "t1".to_string(),
                start_time,
            })
            .await;

        let state = handle.request_state().await.unwrap().unwrap();
        assert_eq!(state.task_id, "t1");
        assert_eq!(state.start, start_time);

        // Re-applying the same START is a no-op.
        handle
            .send(SyncMessage::TimerStart {
                task_id: "t1".to_string(),
                start_time,
            })
            .await;
        assert_eq!(handle.request_state().await.unwrap().unwrap().start, start_time);
    }

    #[test_context(KeeperTestContext)]
    #[tokio::test]
    async fn stop_message_is_idempotent(ctx: &mut KeeperTestContext) {
        let handle = ctx.spawn_keeper(3_600_000);

        // Stopping with nothing active is a no-op, not an error.
        handle.send(SyncMessage::TimerStop { task_id: "t1".to_string() }).await;
        assert_eq!(handle.request_state().await.unwrap(), None);

        handle
            .send(SyncMessage::TimerStart {
                task_id: "t1".to_string(),
                start_time: ctx.clock.now(),
            })
            .await;
        handle.send(SyncMessage::TimerStop { task_id: "t1".to_string() }).await;
        assert_eq!(handle.request_state().await.unwrap(), None);

        // A duplicate STOP delivery changes nothing.
        handle.send(SyncMessage::TimerStop { task_id: "t1".to_string() }).await;
        assert_eq!(handle.request_state().await.unwrap(), None);
    }

    #[test_context(KeeperTestContext)]
    #[tokio::test]
    async fn malformed_messages_are_dropped_without_store_mutation(ctx: &mut KeeperTestContext) {
        let handle = ctx.spawn_keeper(3_600_000);

        handle.send_raw(r#"{"type":"TIMER_START","start_time":"2025-06-01T09:00:00Z"}"#).await;
        handle.send_raw(r#"{"type":"TIMER_START","task_id":"t1"}"#).await;
        handle.send_raw("not json at all").await;

        assert_eq!(handle.request_state().await.unwrap(), None);
        assert_eq!(ctx.store().get().unwrap(), None);
    }

    #[test_context(KeeperTestContext)]
    #[tokio::test]
    async fn heartbeat_rewrites_last_update_while_active(ctx: &mut KeeperTestContext) {
        let start = ctx.clock.now();
        ctx.store().put(&TimerState::new("t1", start)).unwrap();

        let _handle = ctx.spawn_keeper(20);
        ctx.clock.advance(Duration::seconds(30));
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;

        let state = ctx.store().get().unwrap().unwrap();
        // The start never moves; only the heartbeat field does.
        assert_eq!(state.start, start);
        assert_eq!(state.last_update, start + Duration::seconds(30));
    }

    #[test_context(KeeperTestContext)]
    #[tokio::test]
    async fn keeper_restart_resumes_heartbeat_from_durable_state(ctx: &mut KeeperTestContext) {
        // Simulate a keeper that died mid-timer: the record is durable but
        // no keeper is running. A fresh keeper must resume ticking without
        // waiting for a new START.
        let start = ctx.clock.now();
        ctx.store().put(&TimerState::new("t1", start)).unwrap();

        let handle = ctx.spawn_keeper(20);
        ctx.clock.advance(Duration::minutes(5));
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;

        let state = handle.request_state().await.unwrap().unwrap();
        assert_eq!(state.task_id, "t1");
        assert_eq!(state.last_update, start + Duration::minutes(5));
    }

    #[test_context(KeeperTestContext)]
    #[tokio::test]
    async fn heartbeat_write_failure_is_retried_next_tick(ctx: &mut KeeperTestContext) {
        let start = ctx.clock.now();
        ctx.store().put(&TimerState::new("t1", start)).unwrap();

        let _handle = ctx.spawn_keeper(20);

        // Break the store under the keeper's feet.
        let saboteur = Connection::open(&ctx.db_path).unwrap();
        saboteur.execute("ALTER TABLE timer_state RENAME TO timer_state_hidden", []).unwrap();

        ctx.clock.advance(Duration::seconds(30));
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;

        // Heal it; the keeper should pick up again on a later tick.
        saboteur.execute("ALTER TABLE timer_state_hidden RENAME TO timer_state", []).unwrap();
        ctx.clock.advance(Duration::seconds(30));
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;

        let state = ctx.store().get().unwrap().unwrap();
        assert_eq!(state.last_update, start + Duration::seconds(60));
    }

    #[test_context(KeeperTestContext)]
    #[tokio::test]
    async fn heartbeat_on_idle_store_writes_nothing(ctx: &mut KeeperTestContext) {
        let _handle = ctx.spawn_keeper(20);
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        assert_eq!(ctx.store().get().unwrap(), None);
    }
}
