pub mod db;
pub mod tasks;
pub mod time_entries;
pub mod timer_state;
