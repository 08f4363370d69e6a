//! Declarative logger configuration
//!
//! [`Config`] is plain data, usually read from a TOML or JSON document:
//!
//! ```toml
//! level = "warn"
//! format = "json"
//! stdout = true
//!
//! [file]
//! filename = "logs/server.log"
//! max-size = 64
//! max-backups = 7
//! compress = "gzip"
//!
//! [sampling]
//! initial = 100
//! thereafter = 10
//! ```
//!
//! Textual fields are validated when a logger is assembled, not when the document
//! is parsed, so a config can be loaded, inspected and amended first.

use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::sampling::SamplingHook;
use crate::encoder::{EncoderConfig, EncoderSettings};
use crate::sinks::RotationPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Size of one log file, in MB, when none is configured
pub const DEFAULT_LOG_MAX_SIZE: u64 = 300;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// File sink policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileLogConfig {
    /// Directory a relative `filename` is resolved under
    #[serde(rename = "rootpath", alias = "root-path")]
    pub root_path: String,
    /// Leave empty to disable the file sink
    pub filename: String,
    /// Maximum size of one file in MB; zero or less means 300
    pub max_size: i64,
    /// Days to keep rotated files; zero keeps them forever
    pub max_days: u64,
    /// Rotated files to keep; zero keeps them all
    pub max_backups: u64,
    /// `""` or `"gzip"`
    pub compress: String,
}

impl FileLogConfig {
    pub fn is_enabled(&self) -> bool {
        !self.filename.is_empty()
    }

    /// Where the active log file lives, if file logging is enabled
    pub fn log_path(&self) -> Option<PathBuf> {
        if !self.is_enabled() {
            return None;
        }
        let filename = PathBuf::from(&self.filename);
        if filename.is_relative() && !self.root_path.is_empty() {
            Some(PathBuf::from(&self.root_path).join(filename))
        } else {
            Some(filename)
        }
    }

    pub fn max_size_mb(&self) -> u64 {
        if self.max_size <= 0 {
            DEFAULT_LOG_MAX_SIZE
        } else {
            self.max_size as u64
        }
    }

    pub fn rotation_policy(&self) -> Result<RotationPolicy> {
        let compress = match self.compress.trim() {
            "" => false,
            c if c.eq_ignore_ascii_case("gzip") => true,
            other => return Err(LoggerError::InvalidCompression(other.to_string())),
        };

        let mut policy = RotationPolicy::new()
            .with_max_size_mb(self.max_size_mb())
            .with_max_backups(usize::try_from(self.max_backups).unwrap_or(usize::MAX))
            .with_compression(compress);
        if self.max_days > 0 {
            policy = policy
                .with_max_age(Duration::from_secs(self.max_days.saturating_mul(SECONDS_PER_DAY)));
        }
        Ok(policy)
    }
}

/// Sampling policy, applied per call site and per second
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub initial: i64,
    pub thereafter: i64,
    /// Observes every sampling decision; never serialised
    #[serde(skip)]
    pub hook: Option<SamplingHook>,
}

impl SamplingConfig {
    pub fn new(initial: i64, thereafter: i64) -> Self {
        Self {
            initial,
            thereafter,
            hook: None,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_hook(mut self, hook: SamplingHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Both counts as unsigned values; negative counts are rejected
    pub fn validated(&self) -> Result<(u64, u64)> {
        let initial = u64::try_from(self.initial).map_err(|_| {
            LoggerError::InvalidSampling(format!(
                "initial must not be negative, got {}",
                self.initial
            ))
        })?;
        let thereafter = u64::try_from(self.thereafter).map_err(|_| {
            LoggerError::InvalidSampling(format!(
                "thereafter must not be negative, got {}",
                self.thereafter
            ))
        })?;
        Ok((initial, thereafter))
    }
}

impl fmt::Debug for SamplingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplingConfig")
            .field("initial", &self.initial)
            .field("thereafter", &self.thereafter)
            .field("hook", &self.hook.as_ref().map(|_| ".."))
            .finish()
    }
}

impl PartialEq for SamplingConfig {
    fn eq(&self, other: &Self) -> bool {
        self.initial == other.initial && self.thereafter == other.thereafter
    }
}

/// Aggregate logging policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub level: String,
    /// Threshold for the gRPC/library logger; empty inherits `level`
    pub grpc_level: String,
    /// `json`, `text` or `console`
    pub format: String,
    pub disable_timestamp: bool,
    /// Also write to standard output when a file sink is configured
    pub stdout: bool,
    pub file: FileLogConfig,
    pub encoder: EncoderConfig,
    /// DPanic panics and stack traces start at warn
    pub development: bool,
    pub disable_caller: bool,
    pub disable_stacktrace: bool,
    pub disable_error_verbose: bool,
    pub sampling: Option<SamplingConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            grpc_level: String::new(),
            format: "text".to_string(),
            disable_timestamp: false,
            stdout: false,
            file: FileLogConfig::default(),
            encoder: EncoderConfig::default(),
            development: false,
            disable_caller: false,
            disable_stacktrace: false,
            disable_error_verbose: false,
            sampling: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(document: &str) -> Result<Self> {
        toml::from_str(document).map_err(|e| LoggerError::config_parse("toml", e.to_string()))
    }

    pub fn from_json_str(document: &str) -> Result<Self> {
        serde_json::from_str(document)
            .map_err(|e| LoggerError::config_parse("json", e.to_string()))
    }

    pub fn parsed_level(&self) -> Result<LogLevel> {
        self.level.parse()
    }

    /// The gRPC threshold, or `None` when it inherits the main level
    pub fn parsed_grpc_level(&self) -> Result<Option<LogLevel>> {
        if self.grpc_level.trim().is_empty() {
            Ok(None)
        } else {
            self.grpc_level.parse().map(Some)
        }
    }

    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings {
            disable_timestamp: self.disable_timestamp,
            disable_error_verbose: self.disable_error_verbose,
        }
    }

    /// Stack traces start here unless disabled
    pub fn stacktrace_level(&self) -> LogLevel {
        if self.development {
            LogLevel::Warn
        } else {
            LogLevel::Error
        }
    }
}
