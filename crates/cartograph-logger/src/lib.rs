pub mod log;
pub mod severity;
pub mod systime;

pub use log::{log, set_max_severity};
pub use severity::LogSeverity;
