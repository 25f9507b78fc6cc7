#[derive(Debug, Clone)]
pub enum Message {
    // === TIMER MESSAGES ===
    TimerStarted(String),          // task id
    TimerSwitched(String, String), // previous task id, new task id
    TimerStopped(String, i64),     // task id, recorded minutes
    TimerAlreadyIdle,
    TimerStatusIdle,
    TimerStatusActive {
        task_id: String,
        elapsed_seconds: i64,
    },
    TaskUnknown(String), // task id
    TaskRegistered(String),
    StopNotPersisted(String), // error detail

    // === KEEPER MESSAGES ===
    KeeperStarted {
        heartbeat_interval_ms: u64,
    },
    KeeperResumedActiveTimer(String), // task id
    KeeperHeartbeatFailed(String),    // error detail, retried next tick
    KeeperMessageDropped(String),     // protocol error detail
    KeeperExitedNormally,
    KeeperShuttingDown,
    KeeperError(String),
    KeeperTaskPanicked(String),
    KeeperReceivedSigterm,
    KeeperReceivedSigint,
    KeeperReceivedCtrlC,
    KeeperCtrlCListenFailed(String),
    KeeperSignalHandlingNotSupported,
    KeeperStartedDaemon(u32), // pid
    KeeperStoppedDaemon(u32), // pid
    KeeperNotRunning,
    KeeperNotRunningPidNotFound,
    KeeperStoppingExisting(String), // pid
    KeeperFailedToStopExisting(String),
    KeeperFailedToStop(u32),

    // === ENTRY MESSAGES ===
    EntriesHeader(String), // scope description
    EntriesEmpty,
    EntriesTotal(String, i64), // task id, total minutes

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigParseError,
    ConfigModuleTimer,
    ConfigModuleKeeper,
    PromptSelectModules,
    PromptDebounceWindow,
    PromptRefreshInterval,
    PromptHeartbeatInterval,

    // === DAEMON / SYSTEM MESSAGES ===
    DaemonModeNotSupported,
    ProcessTerminationNotSupported,
    InvalidPidFileContent,
    FailedToGetCurrentExecutable,
    FailedToCreateSigtermHandler,
    FailedToCreateSigintHandler,
    FailedToOpenProcess(u32),      // last error code
    FailedToTerminateProcess(u32), // last error code
}
