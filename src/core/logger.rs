//! Main logger implementation
//!
//! A [`Logger`] is a cheap, cloneable front end over a [`Core`]. It stamps each
//! record with time, logger name and call site, asks the core who will write it,
//! captures a stack trace when the level calls for one and hands the record over.
//! Faults while writing are reported to the error output, never to the caller.

use super::cores::{CheckedCores, Core, NopCore};
use super::entry::{Caller, Entry};
use super::error::{LoggerError, Result};
use super::field::Field;
use super::log_level::LogLevel;
use crate::sinks::{ConsoleSink, WriteSyncer};
use chrono::{DateTime, Utc};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Source of record timestamps
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Transformation applied to a logger's core
pub type CoreWrapper = Arc<dyn Fn(Arc<dyn Core>) -> Arc<dyn Core> + Send + Sync>;

/// One step of the option pipeline applied when a logger is built
#[derive(Clone)]
pub enum LoggerOption {
    /// Where faults while writing records are reported
    ErrorOutput(Arc<dyn WriteSyncer>),
    /// DPanic records panic after they are written
    Development,
    /// Annotate records with their call site
    AddCaller,
    /// Capture a stack trace for records at or above the level
    AddStacktrace(LogLevel),
    /// Replace the core with a wrapped one
    WrapCore(CoreWrapper),
}

/// Discriminant of a [`LoggerOption`], comparable across assemblies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    ErrorOutput,
    Development,
    AddCaller,
    AddStacktrace(LogLevel),
    WrapCore,
}

impl LoggerOption {
    pub fn kind(&self) -> OptionKind {
        match self {
            LoggerOption::ErrorOutput(_) => OptionKind::ErrorOutput,
            LoggerOption::Development => OptionKind::Development,
            LoggerOption::AddCaller => OptionKind::AddCaller,
            LoggerOption::AddStacktrace(level) => OptionKind::AddStacktrace(*level),
            LoggerOption::WrapCore(_) => OptionKind::WrapCore,
        }
    }

    /// Wrap the core with `wrapper`
    pub fn wrap_core(
        wrapper: impl Fn(Arc<dyn Core>) -> Arc<dyn Core> + Send + Sync + 'static,
    ) -> Self {
        LoggerOption::WrapCore(Arc::new(wrapper))
    }
}

impl fmt::Debug for LoggerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerOption::ErrorOutput(sink) => {
                f.debug_tuple("ErrorOutput").field(&sink.name()).finish()
            }
            LoggerOption::Development => f.write_str("Development"),
            LoggerOption::AddCaller => f.write_str("AddCaller"),
            LoggerOption::AddStacktrace(level) => {
                f.debug_tuple("AddStacktrace").field(level).finish()
            }
            LoggerOption::WrapCore(_) => f.write_str("WrapCore(..)"),
        }
    }
}

#[derive(Clone)]
pub struct Logger {
    core: Arc<dyn Core>,
    name: String,
    development: bool,
    add_caller: bool,
    stack_level: Option<LogLevel>,
    error_output: Arc<dyn WriteSyncer>,
    clock: Option<Clock>,
}

impl Logger {
    /// Build a logger over `core`, applying `options` in order
    #[must_use]
    pub fn new(core: Arc<dyn Core>, options: Vec<LoggerOption>) -> Self {
        let logger = Self {
            core,
            name: String::new(),
            development: false,
            add_caller: false,
            stack_level: None,
            error_output: Arc::new(ConsoleSink::stderr()),
            clock: None,
        };
        logger.with_options(options)
    }

    /// A logger that writes nothing
    #[must_use]
    pub fn nop() -> Self {
        Self::new(Arc::new(NopCore), Vec::new())
    }

    /// Apply further options to a copy of this logger
    #[must_use]
    pub fn with_options(mut self, options: Vec<LoggerOption>) -> Self {
        for option in options {
            match option {
                LoggerOption::ErrorOutput(sink) => self.error_output = sink,
                LoggerOption::Development => self.development = true,
                LoggerOption::AddCaller => self.add_caller = true,
                LoggerOption::AddStacktrace(level) => self.stack_level = Some(level),
                LoggerOption::WrapCore(wrap) => self.core = wrap(Arc::clone(&self.core)),
            }
        }
        self
    }

    /// Stamp records from `clock` instead of the system time
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn core(&self) -> Arc<dyn Core> {
        Arc::clone(&self.core)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_development(&self) -> bool {
        self.development
    }

    pub fn stacktrace_level(&self) -> Option<LogLevel> {
        self.stack_level
    }

    pub fn adds_caller(&self) -> bool {
        self.add_caller
    }

    /// A child logger whose name is joined to this one with a dot
    #[must_use]
    pub fn named(&self, name: &str) -> Self {
        let mut child = self.clone();
        if name.is_empty() {
            return child;
        }
        child.name = if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.name, name)
        };
        child
    }

    /// A child logger that adds `fields` to every record
    #[must_use]
    pub fn with(&self, fields: &[Field]) -> Self {
        let mut child = self.clone();
        if !fields.is_empty() {
            child.core = self.core.with(fields);
        }
        child
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.core.enabled(level)
    }

    /// The lowest level the core currently accepts
    pub fn level(&self) -> Option<LogLevel> {
        LogLevel::ALL
            .iter()
            .copied()
            .find(|level| self.core.enabled(*level))
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>, fields: &[Field]) {
        self.log_at(
            level,
            message.into(),
            fields,
            Caller::from_location(Location::caller()),
        );
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(LogLevel::Debug, message, fields);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(LogLevel::Info, message, fields);
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(LogLevel::Warn, message, fields);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(LogLevel::Error, message, fields);
    }

    /// Panics after writing when the logger is in development mode
    #[track_caller]
    pub fn dpanic(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(LogLevel::DPanic, message, fields);
    }

    /// Panics after writing
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(LogLevel::Panic, message, fields);
    }

    /// Exits the process with status 1 after writing
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(LogLevel::Fatal, message, fields);
    }

    /// Log with an explicit call site
    pub fn log_at(&self, level: LogLevel, message: String, fields: &[Field], caller: Caller) {
        // Terminal levels run their side effects even when nothing writes them
        if level < LogLevel::DPanic && !self.core.enabled(level) {
            return;
        }

        let time = match &self.clock {
            Some(clock) => clock(),
            None => Utc::now(),
        };
        let mut entry = Entry::new(level, message)
            .with_time(time)
            .with_name(self.name.clone());
        if self.add_caller {
            entry.caller = Some(caller);
        }

        let mut checked = CheckedCores::new();
        Arc::clone(&self.core).check(&entry, &mut checked);

        if !checked.is_empty() {
            if self.stack_level.is_some_and(|threshold| level >= threshold) {
                entry.stack = Some(Backtrace::force_capture().to_string());
            }
            if let Err(err) = checked.write(&entry, fields) {
                self.report_error(&err);
            }
        }

        match level {
            LogLevel::DPanic if self.development => panic!("{}", entry.message),
            LogLevel::Panic => panic!("{}", entry.message),
            LogLevel::Fatal => {
                if let Err(err) = self.core.sync() {
                    self.report_error(&err);
                }
                std::process::exit(1);
            }
            _ => {}
        }
    }

    /// Flush the core's buffered output
    pub fn sync(&self) -> Result<()> {
        self.core.sync()
    }

    fn report_error(&self, err: &LoggerError) {
        let line = format!("{} write error: {}\n", Utc::now().to_rfc3339(), err);
        if self.error_output.write(line.as_bytes()).is_err() {
            eprintln!("[LOGGER ERROR] {}", line.trim_end());
            return;
        }
        let _ = self.error_output.sync();
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::nop()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("development", &self.development)
            .field("add_caller", &self.add_caller)
            .field("stack_level", &self.stack_level)
            .field("error_output", &self.error_output.name())
            .finish()
    }
}
