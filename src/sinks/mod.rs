//! Write targets for encoded records
//!
//! A [`WriteSyncer`] receives whole encoded records. Implementations serialize
//! concurrent writers internally so that records never interleave.

pub mod console;
pub mod memory;
pub mod rotating_file;

pub use console::ConsoleSink;
pub use memory::MemorySink;
pub use rotating_file::{RotatingFileSink, RotationPolicy};

use crate::core::error::{LoggerError, Result};
use std::sync::Arc;

pub trait WriteSyncer: Send + Sync {
    /// Write one encoded record
    fn write(&self, buf: &[u8]) -> Result<()>;

    /// Flush buffered data to the underlying target
    fn sync(&self) -> Result<()>;

    /// Flush and release the target; later writes fail
    fn close(&self) -> Result<()> {
        self.sync()
    }

    fn name(&self) -> &str;
}

/// Fans each write out to several syncers
///
/// Every syncer receives every write even when an earlier one fails; the
/// failures are reported together.
pub struct MultiSyncer {
    syncers: Vec<Arc<dyn WriteSyncer>>,
    name: String,
}

impl MultiSyncer {
    pub fn new(syncers: Vec<Arc<dyn WriteSyncer>>) -> Self {
        let name = syncers
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>()
            .join("+");
        Self { syncers, name }
    }

    pub fn syncers(&self) -> &[Arc<dyn WriteSyncer>] {
        &self.syncers
    }

    fn for_each(&self, op: impl Fn(&dyn WriteSyncer) -> Result<()>) -> Result<()> {
        let errors = self
            .syncers
            .iter()
            .filter_map(|s| op(s.as_ref()).err())
            .collect();
        LoggerError::combine(errors)
    }
}

impl WriteSyncer for MultiSyncer {
    fn write(&self, buf: &[u8]) -> Result<()> {
        self.for_each(|s| s.write(buf))
    }

    fn sync(&self) -> Result<()> {
        self.for_each(|s| s.sync())
    }

    fn close(&self) -> Result<()> {
        self.for_each(|s| s.close())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Combine syncers, avoiding the fan-out wrapper for a single target
pub fn combine_syncers(mut syncers: Vec<Arc<dyn WriteSyncer>>) -> Arc<dyn WriteSyncer> {
    if syncers.len() == 1 {
        syncers.remove(0)
    } else {
        Arc::new(MultiSyncer::new(syncers))
    }
}
