pub mod clock;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod data_storage;
pub mod error;
pub mod keeper;
pub mod messages;
pub mod protocol;
pub mod task_lookup;
pub mod timer;
pub mod view;
