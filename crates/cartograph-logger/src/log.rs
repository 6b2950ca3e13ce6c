use crate::severity::LogSeverity;
use crate::systime::now;
use once_cell::sync::OnceCell;

static MAX_SEVERITY: OnceCell<u8> = OnceCell::new();

/// Sets the lowest severity that is still printed. Only the first call has an effect.
///
/// Returns `false` if a level had already been set.
pub fn set_max_severity(severity: LogSeverity) -> bool {
    MAX_SEVERITY.set(severity.as_u8()).is_ok()
}

pub fn enabled(severity: LogSeverity) -> bool {
    let threshold = MAX_SEVERITY
        .get()
        .copied()
        .map(LogSeverity::from_u8)
        .unwrap_or(LogSeverity::Info);
    severity >= threshold
}

pub fn log(msg: String, log_severity: LogSeverity) {
    if !enabled(log_severity) {
        return;
    }
    let line = format!("[{}] {} {}", log_severity, now(), msg);
    if log_severity >= LogSeverity::Warning {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}
