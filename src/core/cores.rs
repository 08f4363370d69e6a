//! Write cores
//!
//! A [`Core`] decides whether a record is written and writes it. Cores compose:
//! wrappers such as the sampler or [`IncreaseLevelCore`] delegate the decision to an
//! inner core, and [`TeeCore`] fans one record out to several cores.
//!
//! Checking is separate from writing. During [`Core::check`] every core that accepts
//! the entry registers itself in a [`CheckedCores`]; the logger then captures the
//! expensive parts of the record (stack traces) only when something will write it.

use super::atomic_level::AtomicLevel;
use super::entry::Entry;
use super::error::{LoggerError, Result};
use super::field::Field;
use super::log_level::LogLevel;
use crate::encoder::Encoder;
use crate::sinks::WriteSyncer;
use std::fmt;
use std::sync::Arc;

pub trait Core: Send + Sync {
    /// Whether records at `level` may be written
    fn enabled(&self, level: LogLevel) -> bool;

    /// A core that adds `fields` to every record it writes
    fn with(&self, fields: &[Field]) -> Arc<dyn Core>;

    /// Register the cores that will write `entry`
    fn check(self: Arc<Self>, entry: &Entry, checked: &mut CheckedCores);

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()>;

    fn sync(&self) -> Result<()>;
}

/// Cores that accepted an entry during [`Core::check`]
#[derive(Default)]
pub struct CheckedCores {
    cores: Vec<Arc<dyn Core>>,
}

impl CheckedCores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, core: Arc<dyn Core>) {
        self.cores.push(core);
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// Write to every accepting core; failures are reported together
    pub fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let errors = self
            .cores
            .iter()
            .filter_map(|core| core.write(entry, fields).err())
            .collect();
        LoggerError::combine(errors)
    }
}

impl fmt::Debug for CheckedCores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckedCores")
            .field("cores", &self.cores.len())
            .finish()
    }
}

/// Encodes records and writes them to a [`WriteSyncer`], gated by an [`AtomicLevel`]
pub struct IoCore {
    encoder: Arc<dyn Encoder>,
    syncer: Arc<dyn WriteSyncer>,
    level: AtomicLevel,
    context: Vec<Field>,
}

impl IoCore {
    pub fn new(
        encoder: Arc<dyn Encoder>,
        syncer: Arc<dyn WriteSyncer>,
        level: AtomicLevel,
    ) -> Self {
        Self {
            encoder,
            syncer,
            level,
            context: Vec::new(),
        }
    }

    pub fn level(&self) -> &AtomicLevel {
        &self.level
    }

    pub fn syncer(&self) -> &Arc<dyn WriteSyncer> {
        &self.syncer
    }
}

impl Core for IoCore {
    fn enabled(&self, level: LogLevel) -> bool {
        self.level.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Core> {
        let mut context = self.context.clone();
        context.extend_from_slice(fields);
        Arc::new(Self {
            encoder: Arc::clone(&self.encoder),
            syncer: Arc::clone(&self.syncer),
            level: self.level.clone(),
            context,
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, checked: &mut CheckedCores) {
        if self.enabled(entry.level) {
            checked.add(self);
        }
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let bytes = if self.context.is_empty() {
            self.encoder.encode_entry(entry, fields)?
        } else {
            let mut all = Vec::with_capacity(self.context.len() + fields.len());
            all.extend_from_slice(&self.context);
            all.extend_from_slice(fields);
            self.encoder.encode_entry(entry, &all)?
        };
        self.syncer.write(&bytes)?;

        // Records above error may end the process; flush them right away
        if entry.level > LogLevel::Error {
            self.syncer.sync()?;
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.syncer.sync()
    }
}

/// Duplicates records across several cores
pub struct TeeCore {
    cores: Vec<Arc<dyn Core>>,
}

impl TeeCore {
    /// Combine cores; a single core is returned as is
    pub fn new_tee(mut cores: Vec<Arc<dyn Core>>) -> Arc<dyn Core> {
        match cores.len() {
            0 => Arc::new(NopCore),
            1 => cores.remove(0),
            _ => Arc::new(TeeCore { cores }),
        }
    }
}

impl Core for TeeCore {
    fn enabled(&self, level: LogLevel) -> bool {
        self.cores.iter().any(|core| core.enabled(level))
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Core> {
        Arc::new(TeeCore {
            cores: self.cores.iter().map(|core| core.with(fields)).collect(),
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, checked: &mut CheckedCores) {
        for core in &self.cores {
            Arc::clone(core).check(entry, checked);
        }
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let errors = self
            .cores
            .iter()
            .filter_map(|core| core.write(entry, fields).err())
            .collect();
        LoggerError::combine(errors)
    }

    fn sync(&self) -> Result<()> {
        let errors = self.cores.iter().filter_map(|core| core.sync().err()).collect();
        LoggerError::combine(errors)
    }
}

/// Raises the effective threshold of an inner core
pub struct IncreaseLevelCore {
    inner: Arc<dyn Core>,
    level: LogLevel,
}

impl IncreaseLevelCore {
    /// Fails when `level` would enable records the inner core rejects
    pub fn new(inner: Arc<dyn Core>, level: LogLevel) -> Result<Self> {
        if let Some(lowered) = LogLevel::ALL
            .iter()
            .find(|l| level.enables(**l) && !inner.enabled(**l))
        {
            return Err(LoggerError::config(
                "increase-level",
                format!(
                    "level '{}' is allowed by the increased level '{}' but not by the existing core",
                    lowered, level
                ),
            ));
        }
        Ok(Self::raise(inner, level))
    }

    /// Raise without comparing against the inner core's current level
    pub(crate) fn raise(inner: Arc<dyn Core>, level: LogLevel) -> Self {
        Self { inner, level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl Core for IncreaseLevelCore {
    fn enabled(&self, level: LogLevel) -> bool {
        self.level.enables(level) && self.inner.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Core> {
        Arc::new(Self {
            inner: self.inner.with(fields),
            level: self.level,
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, checked: &mut CheckedCores) {
        if self.level.enables(entry.level) {
            Arc::clone(&self.inner).check(entry, checked);
        }
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        self.inner.write(entry, fields)
    }

    fn sync(&self) -> Result<()> {
        self.inner.sync()
    }
}

/// Accepts nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NopCore;

impl Core for NopCore {
    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }

    fn with(&self, _fields: &[Field]) -> Arc<dyn Core> {
        Arc::new(NopCore)
    }

    fn check(self: Arc<Self>, _entry: &Entry, _checked: &mut CheckedCores) {}

    fn write(&self, _entry: &Entry, _fields: &[Field]) -> Result<()> {
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
