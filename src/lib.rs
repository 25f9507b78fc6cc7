//! # Tracket - Freelance Time Tracking
//!
//! A command-line time tracker built around a crash-safe timer
//! synchronization core: at most one timer is ever active, its state is
//! durable, and a background keeper keeps it heartbeating even while no
//! foreground session is open.
//!
//! ## Features
//!
//! - **Single Active Timer**: Starting a timer for one task implicitly stops
//!   any other, never leaving two running
//! - **Durable State**: The active timer survives process restarts; elapsed
//!   time is always recomputed from the persisted start
//! - **Background Keeper**: A daemonized keeper heartbeats the timer record
//!   so staleness is detectable without any foreground present
//! - **Time Entry Ledger**: Completed spans land in an append-only ledger
//!   with per-task totals
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tracket::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
