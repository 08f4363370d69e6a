//! Dynamically adjustable level gate
//!
//! Every logging call reads the gate; reconfiguration code may write it at any
//! time from any thread. Clones share the same underlying value.

use super::error::Result;
use super::log_level::LogLevel;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct AtomicLevel {
    level: Arc<AtomicU8>,
}

impl AtomicLevel {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    /// Parse a textual level into a fresh gate
    pub fn from_str_level(level: &str) -> Result<Self> {
        Ok(Self::new(level.parse()?))
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Acquire))
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.level().enables(level)
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Release);
    }

    /// Set the level from its textual form, leaving it unchanged on error
    pub fn set_level_str(&self, level: &str) -> Result<()> {
        self.set_level(level.parse()?);
        Ok(())
    }

    /// Whether two handles share the same underlying gate
    pub fn same_gate(&self, other: &AtomicLevel) -> bool {
        Arc::ptr_eq(&self.level, &other.level)
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl fmt::Debug for AtomicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicLevel").field(&self.level()).finish()
    }
}

impl fmt::Display for AtomicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}
