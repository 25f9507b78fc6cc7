//! Lists recorded time entries and per-task totals.

use crate::db::time_entries::TimeEntries;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

#[derive(Debug, Args)]
pub struct EntriesArgs {
    /// Only show entries for this task id
    #[arg(short, long)]
    pub task: Option<String>,
    /// Only show entries started on this date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,
}

pub fn cmd(args: EntriesArgs) -> Result<()> {
    let ledger = TimeEntries::new()?;

    let (entries, scope) = match (&args.task, &args.date) {
        (Some(task), _) => (ledger.fetch_by_task(task)?, format!("task '{}'", task)),
        (None, Some(date)) => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
            (ledger.fetch_by_date(date)?, date.to_string())
        }
        (None, None) => (ledger.fetch_all()?, "all".to_string()),
    };

    if entries.is_empty() {
        msg_info!(Message::EntriesEmpty);
        return Ok(());
    }

    msg_print!(Message::EntriesHeader(scope), true);
    View::entries(&entries);

    if let Some(task) = &args.task {
        let total = ledger.total_minutes(task)?;
        msg_print!(Message::EntriesTotal(task.clone(), total));
    }
    Ok(())
}
