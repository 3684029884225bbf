//! Pipeline progress logging.
//!
//! Entries go to stderr, filtered by a process-wide minimum level. The
//! transform core never logs; only the file pipeline and the CLI do, and
//! never with cell values.

use once_cell::sync::OnceCell;

/// Log level, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth under the previous entry
    pub indent: u8,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// The line written to stderr
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠",
            LogLevel::Error => "   ✗",
        };
        format!("{}{} {}", "   ".repeat(self.indent as usize), prefix, self.message)
    }
}

/// Minimum level written, fixed by the first call to [`init`].
static MIN_LEVEL: OnceCell<LogLevel> = OnceCell::new();

/// Set the minimum level written to stderr.
///
/// Only the first call has an effect; it returns `false` when logging was
/// already initialized. Without a call, every level is written.
pub fn init(min_level: LogLevel) -> bool {
    MIN_LEVEL.set(min_level).is_ok()
}

fn min_level() -> LogLevel {
    MIN_LEVEL.get().copied().unwrap_or(LogLevel::Info)
}

/// Whether entries at `level` are currently written
pub fn enabled(level: LogLevel) -> bool {
    level >= min_level()
}

/// Write an entry to stderr if its level is enabled
pub fn log(entry: LogEntry) {
    if enabled(entry.level) {
        eprintln!("{}", entry.render());
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    log(LogEntry::new(LogLevel::Error, msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    log(LogEntry::new(LogLevel::Info, msg).with_indent(indent));
}
