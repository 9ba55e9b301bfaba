pub mod async_task;

pub mod file_io;

mod log_pattern;
pub use log_pattern::*;

pub mod net;
