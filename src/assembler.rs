//! Turns a [`Config`] into a ready logger plus its runtime handles
//!
//! Assembly is deterministic and touches no global state: the level and format are
//! validated, sinks are opened, the encoder is selected, an [`IoCore`] is built and
//! the option pipeline wraps it. Installing the result process-wide is the job of
//! [`crate::global`].

use crate::config::Config;
use crate::core::atomic_level::AtomicLevel;
use crate::core::cores::{Core, IncreaseLevelCore, IoCore};
use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::logger::{Logger, LoggerOption};
use crate::encoder::{new_encoder, LogFormat};
use crate::options::build_options;
use crate::sinks::{combine_syncers, ConsoleSink, RotatingFileSink, WriteSyncer};
use std::fmt;
use std::sync::Arc;

/// Name of the logger handed to the gRPC/library layer
pub const GRPC_LOGGER_NAME: &str = "grpc";

/// Live objects behind an assembled logger
///
/// Mutating `level` changes what the logger writes immediately, from any thread.
#[derive(Clone)]
pub struct LogProperties {
    /// The core before options wrapped it
    pub core: Arc<dyn Core>,
    pub syncer: Arc<dyn WriteSyncer>,
    pub level: AtomicLevel,
}

impl LogProperties {
    pub fn level(&self) -> LogLevel {
        self.level.level()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.set_level(level);
    }

    /// Parse and apply a textual level; an invalid one leaves the level unchanged
    pub fn set_level_str(&self, level: &str) -> Result<()> {
        self.level.set_level_str(level)
    }

    pub fn sync(&self) -> Result<()> {
        self.syncer.sync()
    }

    /// Flush and release the sinks
    pub fn close(&self) -> Result<()> {
        self.syncer.close()
    }
}

impl fmt::Debug for LogProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogProperties")
            .field("syncer", &self.syncer.name())
            .field("level", &self.level)
            .finish()
    }
}

/// The gRPC threshold, checked against the configured main level
fn grpc_threshold(config: &Config, level: LogLevel) -> Result<Option<LogLevel>> {
    let grpc_level = config.parsed_grpc_level()?;
    if let Some(grpc_level) = grpc_level {
        if grpc_level < level {
            return Err(LoggerError::config(
                "grpc-level",
                format!(
                    "grpc level '{}' is below the main level '{}'",
                    grpc_level, level
                ),
            ));
        }
    }
    Ok(grpc_level)
}

/// Check every textual setting before any sink is opened
fn validate(config: &Config) -> Result<LogLevel> {
    let level = config.parsed_level()?;
    grpc_threshold(config, level)?;
    config.format.parse::<LogFormat>()?;
    config.encoder.validate()?;
    if config.file.is_enabled() {
        config.file.rotation_policy()?;
    }
    if let Some(sampling) = &config.sampling {
        sampling.validated()?;
    }
    Ok(level)
}

/// Open the configured write targets
///
/// The rotating file when a filename is set, standard output when `stdout` is set
/// or when no file is configured.
pub fn open_sinks(config: &Config) -> Result<Arc<dyn WriteSyncer>> {
    let mut syncers: Vec<Arc<dyn WriteSyncer>> = Vec::new();

    if let Some(path) = config.file.log_path() {
        let policy = config.file.rotation_policy()?;
        syncers.push(Arc::new(RotatingFileSink::open(path, policy)?));
    }
    if config.stdout || syncers.is_empty() {
        syncers.push(Arc::new(ConsoleSink::stdout()));
    }

    Ok(combine_syncers(syncers))
}

/// Assemble a logger writing to the sinks `config` describes
///
/// Errors go to standard error. Nothing is returned, and no file is created, when
/// any setting is invalid.
pub fn build_logger(config: &Config) -> Result<(Logger, LogProperties)> {
    let level = validate(config)?;
    let syncer = open_sinks(config)?;
    assemble(config, level, syncer, Arc::new(ConsoleSink::stderr()))
}

/// Assemble a logger writing to a caller-supplied sink
pub fn build_logger_with_syncer(
    config: &Config,
    syncer: Arc<dyn WriteSyncer>,
    err_syncer: Arc<dyn WriteSyncer>,
) -> Result<(Logger, LogProperties)> {
    let level = validate(config)?;
    assemble(config, level, syncer, err_syncer)
}

/// Build the core and option pipeline for an already validated `config`
fn assemble(
    config: &Config,
    level: LogLevel,
    syncer: Arc<dyn WriteSyncer>,
    err_syncer: Arc<dyn WriteSyncer>,
) -> Result<(Logger, LogProperties)> {
    let level = AtomicLevel::new(level);
    let encoder = new_encoder(&config.format, &config.encoder, &config.encoder_settings())?;
    let core: Arc<dyn Core> = Arc::new(IoCore::new(
        encoder,
        Arc::clone(&syncer),
        level.clone(),
    ));

    let options = build_options(config, err_syncer)?;
    let logger = Logger::new(Arc::clone(&core), options);

    Ok((
        logger,
        LogProperties {
            core,
            syncer,
            level,
        },
    ))
}

/// A child of `logger` for the gRPC/library layer
///
/// It is named [`GRPC_LOGGER_NAME`] and only writes records at or above
/// `config.grpc_level`; an empty `grpc_level` keeps the parent's threshold. The
/// grpc level is checked against the configured `level`, not the live one, so
/// raising the main level at runtime never makes this fail. The parent's live
/// level still gates every record.
pub fn build_grpc_logger(logger: &Logger, config: &Config) -> Result<Logger> {
    let grpc = logger.named(GRPC_LOGGER_NAME);
    match grpc_threshold(config, config.parsed_level()?)? {
        None => Ok(grpc),
        Some(level) => {
            let raised: Arc<dyn Core> =
                Arc::new(IncreaseLevelCore::raise(logger.core(), level));
            Ok(grpc.with_options(vec![LoggerOption::wrap_core(move |_| {
                Arc::clone(&raised)
            })]))
        }
    }
}
