//! Runs or stops the background keeper.
//!
//! Without flags the keeper is spawned as a detached daemon process; an
//! already-running keeper is replaced. `--foreground` keeps it attached to
//! the terminal, which is what the hidden `--daemon-run` re-entry flag uses.

use crate::libs::daemon;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct KeeperArgs {
    /// Stop the running keeper
    #[arg(long)]
    pub stop: bool,
    /// Run in the foreground instead of daemonizing
    #[arg(long)]
    pub foreground: bool,
    /// Internal: entry point for the daemonized child process
    #[arg(long, hide = true)]
    pub daemon_run: bool,
}

pub async fn cmd(args: KeeperArgs) -> Result<()> {
    if args.stop {
        return daemon::stop();
    }

    if args.foreground || args.daemon_run {
        return daemon::run_with_signal_handling().await;
    }

    daemon::spawn()
}
