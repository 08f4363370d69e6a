//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. Structured fields go
//! in brackets before the message. The message is only formatted when the
//! logger would write the record.
//!
//! # Examples
//!
//! ```
//! use rust_logger_config::prelude::*;
//! use rust_logger_config::info;
//!
//! let logger = Logger::nop();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With structured fields
//! info!(logger, [Field::int("port", 8080), Field::string("proto", "h2")], "listening");
//! ```

/// Log a message with automatic formatting.
///
/// The record's caller carries the enclosing module path as its function.
///
/// # Examples
///
/// ```
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::nop();
/// use rust_logger_config::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, [Field::bool("retry", true)], "Slow response");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {{
        let level: $crate::LogLevel = $level;
        let logger = &$logger;
        if level >= $crate::LogLevel::DPanic || logger.enabled(level) {
            logger.log_at(
                level,
                format!($($arg)+),
                &[$($field),*],
                $crate::Caller::new(file!(), line!()).with_function(module_path!()),
            );
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $crate::log!($logger, $level, [], $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::nop();
/// use rust_logger_config::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::nop();
/// use rust_logger_config::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::nop();
/// use rust_logger_config::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::nop();
/// use rust_logger_config::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
