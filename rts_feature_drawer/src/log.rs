//! Internal logging system for the feature drawer
//!
//! - Customizable logger via the Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error) with a global minimum
//! - Colored console output by default
//! - File and line information for ERROR logs
//!
//! The logger is process-wide: it is the only global in the crate. Every
//! rendering collaborator is injected explicitly.

use colored::*;
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use rts_feature_drawer::rts::log::{Logger, LogEntry};
///
/// struct FileLogger;
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source component (e.g., "rts::FeatureDrawer", "rts::DrawQuadGrid")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-feature and per-pass chatter
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Recoverable anomalies
    Warn,

    /// Errors returned to the caller
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by the console logger.
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Default logger: colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl DefaultLogger {
    /// Render an entry without colors (the text that ends up on the console).
    pub fn format_plain(entry: &LogEntry) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");

        match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, entry.severity.label(), entry.source, entry.message, file, line
            ),
            _ => format!(
                "[{}] [{}] [{}] {}",
                timestamp, entry.severity.label(), entry.source, entry.message
            ),
        }
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let label = entry.severity.label();
        let severity_str = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        };
        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!("[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line);
        } else {
            println!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message);
        }
    }
}

// ===== GLOBAL DISPATCH =====

struct LogState {
    logger: Box<dyn Logger>,
    min_severity: LogSeverity,
}

static LOGGER: OnceLock<RwLock<LogState>> = OnceLock::new();

fn state() -> &'static RwLock<LogState> {
    LOGGER.get_or_init(|| RwLock::new(LogState {
        logger: Box::new(DefaultLogger),
        min_severity: LogSeverity::Info,
    }))
}

/// Replace the global logger.
pub fn set_logger<L: Logger + 'static>(logger: L) {
    if let Ok(mut lock) = state().write() {
        lock.logger = Box::new(logger);
        lock.min_severity = LogSeverity::Trace;
    }
}

/// Restore the DefaultLogger and its Info threshold.
pub fn reset_logger() {
    if let Ok(mut lock) = state().write() {
        lock.logger = Box::new(DefaultLogger);
        lock.min_severity = LogSeverity::Info;
    }
}

/// Drop every entry below `severity`.
///
/// `set_logger` lowers the threshold to Trace so custom loggers see
/// everything; call this afterwards to filter.
pub fn set_min_severity(severity: LogSeverity) {
    if let Ok(mut lock) = state().write() {
        lock.min_severity = severity;
    }
}

/// Current minimum severity.
pub fn min_severity() -> LogSeverity {
    state().read().map(|lock| lock.min_severity).unwrap_or(LogSeverity::Info)
}

/// Log without file:line (used by the fd_* macros).
pub fn log(severity: LogSeverity, source: &str, message: String) {
    dispatch(severity, source, message, None, None);
}

/// Log with file:line (used by fd_error!).
pub fn log_detailed(
    severity: LogSeverity,
    source: &str,
    message: String,
    file: &'static str,
    line: u32,
) {
    dispatch(severity, source, message, Some(file), Some(line));
}

fn dispatch(
    severity: LogSeverity,
    source: &str,
    message: String,
    file: Option<&'static str>,
    line: Option<u32>,
) {
    if let Ok(lock) = state().read() {
        if severity < lock.min_severity {
            return;
        }
        lock.logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file,
            line,
        });
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! fd_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Trace, $source, format!($($arg)*))
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! fd_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Debug, $source, format!($($arg)*))
    };
}

/// Log an INFO message
///
/// ```no_run
/// rts_feature_drawer::fd_info!("rts::FeatureDrawer", "{} draw quads", 64 * 64);
/// ```
#[macro_export]
macro_rules! fd_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Info, $source, format!($($arg)*))
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! fd_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Warn, $source, format!($($arg)*))
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! fd_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
