#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rusqlite::Connection;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tracket::db::tasks::Tasks;
    use tracket::db::time_entries::TimeEntries;
    use tracket::db::timer_state::TimerStateStore;
    use tracket::libs::clock::{Clock, ManualClock};
    use tracket::libs::config::{KeeperConfig, TimerConfig};
    use tracket::libs::controller::TimerController;
    use tracket::libs::error::TimerError;
    use tracket::libs::keeper::{Keeper, KeeperHandle};
    use tracket::libs::timer::{TimerState, TimerStatus};

    struct ControllerTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
        clock: ManualClock,
    }

    impl AsyncTestContext for ControllerTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("tracket.db");
            let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
            ControllerTestContext {
                _temp_dir: temp_dir,
                db_path,
                clock,
            }
        }
    }

    impl ControllerTestContext {
        fn stores(&self) -> (TimerStateStore, TimeEntries, Tasks) {
            let store = TimerStateStore::open(&self.db_path).unwrap();
            let entries = TimeEntries::open(&self.db_path).unwrap();
            let tasks = Tasks::open(&self.db_path).unwrap();
            tasks.insert("t1", "First task").unwrap();
            tasks.insert("t2", "Second task").unwrap();
            (store, entries, tasks)
        }

        async fn session(&self, debounce_ms: u64) -> (TimerController, KeeperHandle) {
            let (store, entries, tasks) = self.stores();
            let keeper_config = KeeperConfig {
                // Effectively disabled; heartbeat behavior has its own tests.
                heartbeat_interval_ms: 3_600_000,
            };
            let (handle, _join) = Keeper::spawn(keeper_config, store.clone(), Arc::new(self.clock.clone()));
            let config = TimerConfig {
                debounce_ms,
                refresh_interval_ms: 1000,
            };
            let controller = TimerController::connect(config, store, entries, tasks_arc(tasks), Arc::new(self.clock.clone()), handle.clone())
                .await
                .unwrap();
            (controller, handle)
        }
    }

    fn tasks_arc(tasks: Tasks) -> Arc<dyn tracket::libs::task_lookup::TaskLookup> {
        Arc::new(tasks)
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn start_then_stop_records_rounded_entry(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;

        controller.start_timer("t1").await.unwrap();
        assert!(controller.is_active("t1"));
        assert_eq!(controller.status(), TimerStatus::Active);

        ctx.clock.advance(Duration::milliseconds(150_000));
        assert_eq!(controller.elapsed_seconds("t1"), 150);

        let entry = controller.stop_timer().await.unwrap().unwrap();
        assert_eq!(entry.task_id, "t1");
        assert_eq!(entry.end - entry.start, Duration::milliseconds(150_000));
        // 2.5 minutes rounds half up to 3.
        assert_eq!(entry.duration_minutes, 3);

        assert!(!controller.is_active("t1"));
        assert_eq!(controller.status(), TimerStatus::Idle);
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn stop_when_idle_returns_none(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;

        assert_eq!(controller.stop_timer().await.unwrap(), None);

        let (store, _, _) = ctx.stores();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn inactive_task_reports_zero_elapsed(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;

        assert_eq!(controller.elapsed_seconds("t1"), 0);

        controller.start_timer("t1").await.unwrap();
        ctx.clock.advance(Duration::seconds(42));

        // Only the active task accumulates; everything else stays at zero.
        assert!(!controller.is_active("t2"));
        assert_eq!(controller.elapsed_seconds("t2"), 0);
        assert_eq!(controller.elapsed_seconds("t1"), 42);
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn switching_tasks_is_a_compound_transaction(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;
        let (store, entries, _) = ctx.stores();

        controller.start_timer("t1").await.unwrap();
        ctx.clock.advance(Duration::minutes(10));
        controller.start_timer("t2").await.unwrap();

        // Exactly one entry exists, for t1, covering its interval.
        let recorded = entries.fetch_all().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].task_id, "t1");
        assert_eq!(recorded[0].duration_minutes, 10);

        assert!(!controller.is_active("t1"));
        assert!(controller.is_active("t2"));

        // At most one timer record in the durable slot.
        assert_eq!(store.get().unwrap().unwrap().task_id, "t2");
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn restarting_the_active_task_is_a_noop(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;
        let (_, entries, _) = ctx.stores();

        controller.start_timer("t1").await.unwrap();
        ctx.clock.advance(Duration::seconds(30));
        controller.start_timer("t1").await.unwrap();

        // The original start survives and no entry was recorded.
        assert_eq!(controller.elapsed_seconds("t1"), 30);
        assert!(entries.fetch_all().unwrap().is_empty());
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn unknown_task_fails_validation(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;

        let err = controller.start_timer("ghost").await.unwrap_err();
        assert!(matches!(err, TimerError::Validation(id) if id == "ghost"));
        assert_eq!(controller.status(), TimerStatus::Idle);
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn rapid_starts_collapse_to_the_last_call(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(50).await;
        let (store, entries, _) = ctx.stores();

        controller.start_timer("t1").await.unwrap();
        controller.start_timer("t2").await.unwrap();

        // Let the debounce window elapse and the committed task settle.
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;

        // Only the last call took effect: no write, no entry for t1.
        assert_eq!(store.get().unwrap().unwrap().task_id, "t2");
        assert!(entries.fetch_all().unwrap().is_empty());
        assert!(controller.is_active("t2"));
        assert!(!controller.is_active("t1"));
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn reconnect_resumes_from_persisted_start(ctx: &mut ControllerTestContext) {
        // An active record is already durable, 5 seconds old, before any
        // controller exists, the "tab was closed and reopened" scenario.
        let (store, _, _) = ctx.stores();
        let start = ctx.clock.now() - Duration::milliseconds(5000);
        store.put(&TimerState::new("t1", start)).unwrap();

        let (controller, _handle) = ctx.session(0).await;

        assert!(controller.is_active("t1"));
        assert_eq!(controller.elapsed_seconds("t1"), 5);
        assert_eq!(controller.active_task_id(), Some("t1".to_string()));
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn reconnect_after_long_absence_has_no_clamping(ctx: &mut ControllerTestContext) {
        let (store, _, _) = ctx.stores();
        let start = ctx.clock.now() - Duration::hours(49);
        store.put(&TimerState::new("t1", start)).unwrap();

        let (controller, _handle) = ctx.session(0).await;

        assert_eq!(controller.elapsed_seconds("t1"), 49 * 3600);
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn refresh_loop_publishes_recomputed_elapsed(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;
        let mut elapsed_rx = controller.subscribe_elapsed();

        controller.start_timer("t1").await.unwrap();
        ctx.clock.advance(Duration::seconds(7));

        elapsed_rx.changed().await.unwrap();
        assert_eq!(*elapsed_rx.borrow(), 7);

        controller.stop_timer().await.unwrap();
        elapsed_rx.changed().await.unwrap();
        assert_eq!(*elapsed_rx.borrow(), 0);
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn failed_stop_changes_neither_ledger_nor_slot(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;
        let (store, entries, _) = ctx.stores();

        controller.start_timer("t1").await.unwrap();
        ctx.clock.advance(Duration::minutes(10));

        // Block the slot delete so the stop's durable write fails mid-way.
        let saboteur = Connection::open(&ctx.db_path).unwrap();
        saboteur
            .execute_batch("CREATE TRIGGER hold_slot BEFORE DELETE ON timer_state BEGIN SELECT RAISE(ABORT, 'slot held'); END")
            .unwrap();

        assert!(controller.stop_timer().await.is_err());

        // The entry insert rolled back together with the failed delete.
        assert!(entries.fetch_all().unwrap().is_empty());
        assert_eq!(store.get().unwrap().unwrap().task_id, "t1");

        // A retried stop records the span exactly once.
        saboteur.execute_batch("DROP TRIGGER hold_slot").unwrap();
        let entry = controller.stop_timer().await.unwrap().unwrap();
        assert_eq!(entry.duration_minutes, 10);
        assert_eq!(entries.fetch_all().unwrap().len(), 1);
        assert_eq!(store.get().unwrap(), None);
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn failed_stop_rolls_projection_back_to_durable_truth(ctx: &mut ControllerTestContext) {
        let (controller, _handle) = ctx.session(0).await;

        controller.start_timer("t1").await.unwrap();
        ctx.clock.advance(Duration::seconds(30));

        let saboteur = Connection::open(&ctx.db_path).unwrap();
        saboteur
            .execute_batch("CREATE TRIGGER hold_slot BEFORE DELETE ON timer_state BEGIN SELECT RAISE(ABORT, 'slot held'); END")
            .unwrap();

        assert!(controller.stop_timer().await.is_err());

        // The display keeps tracking the durable record, not the attempted
        // stop: still active, still accumulating from the original start.
        assert!(controller.is_active("t1"));
        assert_eq!(controller.active_task_id(), Some("t1".to_string()));
        assert_eq!(controller.status(), TimerStatus::Active);
        ctx.clock.advance(Duration::seconds(5));
        assert_eq!(controller.elapsed_seconds("t1"), 35);
    }

    #[test_context(ControllerTestContext)]
    #[tokio::test]
    async fn two_sessions_converge_on_the_durable_winner(ctx: &mut ControllerTestContext) {
        // Two independent foreground instances race their starts; the last
        // durable write wins and both converge on it after reconciliation.
        let (first, _handle_a) = ctx.session(0).await;
        let (second, _handle_b) = ctx.session(0).await;

        first.start_timer("t1").await.unwrap();
        second.start_timer("t2").await.unwrap();

        first.reconcile().await.unwrap();
        second.reconcile().await.unwrap();

        assert_eq!(first.active_task_id(), Some("t2".to_string()));
        assert_eq!(second.active_task_id(), Some("t2".to_string()));
    }
}
