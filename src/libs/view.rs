use crate::libs::timer::{TimeEntry, TimerState};
use chrono::{DateTime, Local, Utc};
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn entries(entries: &[TimeEntry]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "TASK", "START", "END", "MINUTES", "MANUAL", "DESCRIPTION"]);
        for entry in entries {
            table.add_row(row![
                entry.id.unwrap_or(0),
                entry.task_id,
                local(entry.start),
                local(entry.end),
                entry.duration_minutes,
                if entry.is_manual { "yes" } else { "no" },
                entry.description.clone().unwrap_or_default()
            ]);
        }
        table.printstd();
    }

    pub fn active_timer(state: &TimerState, elapsed_seconds: i64) {
        let mut table = Table::new();

        table.add_row(row!["TASK", "STARTED", "ELAPSED", "LAST HEARTBEAT"]);
        table.add_row(row![
            state.task_id,
            local(state.start),
            format_elapsed(elapsed_seconds),
            local(state.last_update)
        ]);
        table.printstd();
    }
}

fn local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_elapsed(seconds: i64) -> String {
    format!("{:02}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formats_as_hms() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(75), "00:01:15");
        assert_eq!(format_elapsed(3661), "01:01:01");
    }
}
