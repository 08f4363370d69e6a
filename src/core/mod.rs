//! Core logger types and traits

pub mod atomic_level;
pub mod cores;
pub mod entry;
pub mod error;
pub mod field;
pub mod log_level;
pub mod logger;
pub mod observer;
pub mod sampling;

pub use atomic_level::AtomicLevel;
pub use cores::{CheckedCores, Core, IncreaseLevelCore, IoCore, NopCore, TeeCore};
pub use entry::{Caller, Entry};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use log_level::LogLevel;
pub use logger::{Clock, CoreWrapper, Logger, LoggerOption, OptionKind};
pub use observer::{LoggedEntry, ObservedCore, ObservedLogs};
pub use sampling::{SamplerCore, SamplerMetrics, SamplingDecision, SamplingHook};
