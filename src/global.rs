//! Process-wide logger
//!
//! Assembly never touches this module; a process opts in with [`install`] or
//! [`init_logger`]. Until then [`logger`] hands out a logger that writes nothing.

use crate::assembler::{build_logger, LogProperties};
use crate::config::Config;
use crate::core::error::{LoggerError, Result};
use crate::core::logger::Logger;
use parking_lot::{const_mutex, Mutex};

struct Installed {
    logger: Logger,
    properties: LogProperties,
}

static GLOBAL: Mutex<Option<Installed>> = const_mutex(None);

/// Replace the global logger, returning the previous one
pub fn install(logger: Logger, properties: LogProperties) -> Option<(Logger, LogProperties)> {
    GLOBAL
        .lock()
        .replace(Installed { logger, properties })
        .map(|previous| (previous.logger, previous.properties))
}

/// The global logger, or a no-op logger when none is installed
pub fn logger() -> Logger {
    GLOBAL
        .lock()
        .as_ref()
        .map(|installed| installed.logger.clone())
        .unwrap_or_else(Logger::nop)
}

pub fn properties() -> Option<LogProperties> {
    GLOBAL
        .lock()
        .as_ref()
        .map(|installed| installed.properties.clone())
}

pub fn is_installed() -> bool {
    GLOBAL.lock().is_some()
}

/// Assemble a logger from `config` and install it globally
pub fn init_logger(config: &Config) -> Result<Logger> {
    let (logger, properties) = build_logger(config)?;
    install(logger.clone(), properties);
    Ok(logger)
}

/// Uninstall the global logger, then flush and close its sinks
pub fn teardown() -> Result<()> {
    let Some(installed) = GLOBAL.lock().take() else {
        return Ok(());
    };

    let errors = [installed.logger.sync(), installed.properties.close()]
        .into_iter()
        .filter_map(|result| result.err())
        .collect();
    LoggerError::combine(errors)
}
