pub mod entries;
pub mod init;
pub mod keeper;
pub mod start;
pub mod status;
pub mod stop;
pub mod task;

use crate::db::tasks::Tasks;
use crate::db::time_entries::TimeEntries;
use crate::db::timer_state::TimerStateStore;
use crate::libs::clock::SystemClock;
use crate::libs::config::Config;
use crate::libs::controller::TimerController;
use crate::libs::keeper::Keeper;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Register a task id for timer tracking")]
    Task(task::TaskArgs),
    #[command(about = "Start (or switch) the timer for a task")]
    Start(start::StartArgs),
    #[command(about = "Stop the active timer and record a time entry")]
    Stop,
    #[command(about = "Show the active timer and heartbeat freshness")]
    Status,
    #[command(about = "List recorded time entries and totals")]
    Entries(entries::EntriesArgs),
    #[command(about = "Run or stop the background keeper")]
    Keeper(keeper::KeeperArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        if crate::libs::messages::macros::is_debug_mode() {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }

        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Task(args) => task::cmd(args),
            Commands::Start(args) => start::cmd(args).await,
            Commands::Stop => stop::cmd().await,
            Commands::Status => status::cmd().await,
            Commands::Entries(args) => entries::cmd(args),
            Commands::Keeper(args) => keeper::cmd(args).await,
        }
    }
}

/// Builds a foreground controller for a one-shot CLI invocation, with an
/// in-process keeper attached over the message channel.
///
/// The debounce window is forced to zero here: debouncing exists to collapse
/// bursts from interactive surfaces, and a single CLI call is its own burst.
pub(crate) async fn connect_session() -> Result<TimerController> {
    let config = Config::read()?;
    let mut timer_config = config.timer.unwrap_or_default();
    timer_config.debounce_ms = 0;
    let keeper_config = config.keeper.unwrap_or_default();

    let state_store = TimerStateStore::new()?;
    let entries = TimeEntries::new()?;
    let tasks = Arc::new(Tasks::new()?);
    let clock = Arc::new(SystemClock);

    let (keeper_handle, _join) = Keeper::spawn(keeper_config, state_store.clone(), clock.clone());
    let controller = TimerController::connect(timer_config, state_store, entries, tasks, clock, keeper_handle).await?;
    Ok(controller)
}
