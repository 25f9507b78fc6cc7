//! Display implementation for tracket application messages.
//!
//! Central text formatting for every user-facing message: all wording lives
//! here, keyed by the structured [`Message`] enum, so the rest of the code
//! never carries raw strings.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // === TIMER MESSAGES ===
            Message::TimerStarted(task_id) => format!("Timer started for task '{}'", task_id),
            Message::TimerSwitched(previous, next) => {
                format!("Stopped timer for task '{}', started timer for task '{}'", previous, next)
            }
            Message::TimerStopped(task_id, minutes) => format!("Timer stopped for task '{}': {} min recorded", task_id, minutes),
            Message::TimerAlreadyIdle => "No timer is running".to_string(),
            Message::TimerStatusIdle => "Status: idle".to_string(),
            Message::TimerStatusActive { task_id, elapsed_seconds } => {
                format!("Status: active, task '{}', {}s elapsed", task_id, elapsed_seconds)
            }
            Message::TaskUnknown(task_id) => format!("Unknown task id '{}'", task_id),
            Message::TaskRegistered(task_id) => format!("Task '{}' registered", task_id),
            Message::StopNotPersisted(detail) => format!("Stop was not persisted, timer still running: {}", detail),

            // === KEEPER MESSAGES ===
            Message::KeeperStarted { heartbeat_interval_ms } => {
                format!("Keeper started (heartbeat every {} ms)", heartbeat_interval_ms)
            }
            Message::KeeperResumedActiveTimer(task_id) => format!("Keeper resumed heartbeat for active task '{}'", task_id),
            Message::KeeperHeartbeatFailed(detail) => format!("Heartbeat write failed, retrying next tick: {}", detail),
            Message::KeeperMessageDropped(detail) => format!("Dropped malformed sync message: {}", detail),
            Message::KeeperExitedNormally => "Keeper exited normally".to_string(),
            Message::KeeperShuttingDown => "Shutting down keeper...".to_string(),
            Message::KeeperError(detail) => format!("Keeper error: {}", detail),
            Message::KeeperTaskPanicked(detail) => format!("Keeper task panicked: {}", detail),
            Message::KeeperReceivedSigterm => "Keeper received SIGTERM".to_string(),
            Message::KeeperReceivedSigint => "Keeper received SIGINT".to_string(),
            Message::KeeperReceivedCtrlC => "Keeper received Ctrl+C".to_string(),
            Message::KeeperCtrlCListenFailed(detail) => format!("Failed to listen for Ctrl+C: {}", detail),
            Message::KeeperSignalHandlingNotSupported => "Signal handling not supported on this platform".to_string(),
            Message::KeeperStartedDaemon(pid) => format!("Keeper started with PID: {}", pid),
            Message::KeeperStoppedDaemon(pid) => format!("Keeper stopped (PID: {})", pid),
            Message::KeeperNotRunning => "Keeper is not running".to_string(),
            Message::KeeperNotRunningPidNotFound => "Keeper is not running (PID file not found)".to_string(),
            Message::KeeperStoppingExisting(pid) => format!("Stopping existing keeper (PID: {})", pid),
            Message::KeeperFailedToStopExisting(detail) => format!("Failed to stop existing keeper: {}", detail),
            Message::KeeperFailedToStop(pid) => format!("Failed to stop keeper process {}", pid),

            // === ENTRY MESSAGES ===
            Message::EntriesHeader(scope) => format!("Time entries ({})", scope),
            Message::EntriesEmpty => "No time entries recorded".to_string(),
            Message::EntriesTotal(task_id, minutes) => format!("Total for task '{}': {} min", task_id, minutes),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigParseError => "Failed to parse configuration".to_string(),
            Message::ConfigModuleTimer => "Timer configuration".to_string(),
            Message::ConfigModuleKeeper => "Keeper configuration".to_string(),
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptDebounceWindow => "Debounce window for start calls (ms)".to_string(),
            Message::PromptRefreshInterval => "Display refresh interval (ms)".to_string(),
            Message::PromptHeartbeatInterval => "Keeper heartbeat interval (ms)".to_string(),

            // === DAEMON / SYSTEM MESSAGES ===
            Message::DaemonModeNotSupported => "Daemon mode is not supported on this platform".to_string(),
            Message::ProcessTerminationNotSupported => "Process termination is not supported on this platform".to_string(),
            Message::InvalidPidFileContent => "Invalid PID file content".to_string(),
            Message::FailedToGetCurrentExecutable => "Failed to get current executable path".to_string(),
            Message::FailedToCreateSigtermHandler => "Failed to create SIGTERM handler".to_string(),
            Message::FailedToCreateSigintHandler => "Failed to create SIGINT handler".to_string(),
            Message::FailedToOpenProcess(code) => format!("Failed to open process (error code: {})", code),
            Message::FailedToTerminateProcess(code) => format!("Failed to terminate process (error code: {})", code),
        };
        write!(f, "{}", text)
    }
}
