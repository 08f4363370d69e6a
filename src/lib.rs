//! # Rust Logger Config
//!
//! Turns a declarative logging configuration into a ready-to-use structured
//! logger, plus the handles needed to reconfigure or flush it at runtime.
//!
//! ## Features
//!
//! - **Declarative**: level, format, file rotation, field naming and sampling
//!   from one TOML or JSON document
//! - **Three Encoders**: JSON, bracketed text and console output
//! - **Rotating Files**: size-based rotation with retention and gzip compression
//! - **Live Reconfiguration**: the level gate can change from any thread
//! - **Composable Cores**: sampling, level raising and fan-out as core wrappers
//!
//! ## Example
//!
//! ```
//! use rust_logger_config::prelude::*;
//! use std::sync::Arc;
//!
//! let config = Config::from_toml_str(
//!     r#"
//!     level = "info"
//!     format = "json"
//!     "#,
//! )?;
//!
//! let sink = MemorySink::new();
//! let (logger, props) =
//!     build_logger_with_syncer(&config, Arc::new(sink.clone()), Arc::new(MemorySink::new()))?;
//!
//! logger.info("server started", &[Field::int("port", 8080)]);
//! props.set_level(LogLevel::Warn);
//! logger.info("not written", &[]);
//!
//! assert_eq!(sink.lines().len(), 1);
//! # Ok::<(), LoggerError>(())
//! ```

pub mod assembler;
pub mod config;
pub mod core;
pub mod encoder;
pub mod global;
pub mod macros;
pub mod options;
pub mod sinks;

pub mod prelude {
    pub use crate::assembler::{
        build_grpc_logger, build_logger, build_logger_with_syncer, LogProperties,
    };
    pub use crate::config::{Config, FileLogConfig, SamplingConfig};
    pub use crate::core::{
        AtomicLevel, Caller, Core, Entry, Field, FieldValue, LogLevel, Logger, LoggerError,
        LoggerOption, Result, SamplingDecision,
    };
    pub use crate::encoder::{EncoderConfig, KeyPolicy, LogFormat};
    pub use crate::sinks::{ConsoleSink, MemorySink, RotatingFileSink, RotationPolicy, WriteSyncer};
}

pub use assembler::{build_grpc_logger, build_logger, build_logger_with_syncer, LogProperties};
pub use config::{Config, FileLogConfig, SamplingConfig};
pub use core::{
    AtomicLevel, Caller, Core, Entry, Field, FieldValue, LogLevel, Logger, LoggerError,
    LoggerOption, OptionKind, Result, SamplerMetrics, SamplingDecision,
};
pub use encoder::{new_encoder, Encoder, EncoderConfig, EncoderSettings, KeyPolicy, LogFormat};
pub use options::build_options;
pub use sinks::{ConsoleSink, MemorySink, RotatingFileSink, RotationPolicy, WriteSyncer};
