//! In-memory core for asserting on produced records

use super::atomic_level::AtomicLevel;
use super::cores::{CheckedCores, Core};
use super::entry::Entry;
use super::error::Result;
use super::field::{Field, FieldValue};
use super::log_level::LogLevel;
use parking_lot::Mutex;
use std::sync::Arc;

/// A record captured by an [`ObservedCore`], with the core's context fields first
#[derive(Debug, Clone)]
pub struct LoggedEntry {
    pub entry: Entry,
    pub context: Vec<Field>,
}

impl LoggedEntry {
    /// The last value recorded under `key`
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.context
            .iter()
            .rev()
            .find(|f| f.key == key)
            .map(|f| &f.value)
    }
}

/// Shared view of everything an [`ObservedCore`] wrote
#[derive(Debug, Clone, Default)]
pub struct ObservedLogs {
    logs: Arc<Mutex<Vec<LoggedEntry>>>,
}

impl ObservedLogs {
    pub fn len(&self) -> usize {
        self.logs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.lock().is_empty()
    }

    pub fn all(&self) -> Vec<LoggedEntry> {
        self.logs.lock().clone()
    }

    pub fn take_all(&self) -> Vec<LoggedEntry> {
        std::mem::take(&mut *self.logs.lock())
    }

    pub fn messages(&self) -> Vec<String> {
        self.logs
            .lock()
            .iter()
            .map(|logged| logged.entry.message.clone())
            .collect()
    }

    pub fn filter_message(&self, message: &str) -> Vec<LoggedEntry> {
        self.filter(|logged| logged.entry.message == message)
    }

    pub fn filter_level(&self, level: LogLevel) -> Vec<LoggedEntry> {
        self.filter(|logged| logged.entry.level == level)
    }

    fn filter(&self, predicate: impl Fn(&LoggedEntry) -> bool) -> Vec<LoggedEntry> {
        self.logs
            .lock()
            .iter()
            .filter(|logged| predicate(logged))
            .cloned()
            .collect()
    }

    fn push(&self, logged: LoggedEntry) {
        self.logs.lock().push(logged);
    }
}

/// Records entries in memory instead of encoding them
pub struct ObservedCore {
    level: AtomicLevel,
    context: Vec<Field>,
    logs: ObservedLogs,
}

impl ObservedCore {
    pub fn new(level: LogLevel) -> (Self, ObservedLogs) {
        Self::with_level(AtomicLevel::new(level))
    }

    /// Observe through an existing, possibly shared, level gate
    pub fn with_level(level: AtomicLevel) -> (Self, ObservedLogs) {
        let logs = ObservedLogs::default();
        let core = Self {
            level,
            context: Vec::new(),
            logs: logs.clone(),
        };
        (core, logs)
    }
}

impl Core for ObservedCore {
    fn enabled(&self, level: LogLevel) -> bool {
        self.level.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Core> {
        let mut context = self.context.clone();
        context.extend_from_slice(fields);
        Arc::new(Self {
            level: self.level.clone(),
            context,
            logs: self.logs.clone(),
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, checked: &mut CheckedCores) {
        if self.enabled(entry.level) {
            checked.add(self);
        }
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let mut context = Vec::with_capacity(self.context.len() + fields.len());
        context.extend_from_slice(&self.context);
        context.extend_from_slice(fields);
        self.logs.push(LoggedEntry {
            entry: entry.clone(),
            context,
        });
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
