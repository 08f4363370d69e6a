//! Field naming and per-type render strategies shared by every encoder

use crate::core::entry::Caller;
use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;

/// Whether a record role is emitted, and under which key
///
/// In configuration documents an empty string means [`KeyPolicy::Omit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyPolicy {
    Include(String),
    Omit,
}

impl KeyPolicy {
    pub fn include(key: impl Into<String>) -> Self {
        KeyPolicy::from(key.into())
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            KeyPolicy::Include(key) => Some(key),
            KeyPolicy::Omit => None,
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, KeyPolicy::Omit)
    }
}

impl From<String> for KeyPolicy {
    fn from(key: String) -> Self {
        if key.is_empty() {
            KeyPolicy::Omit
        } else {
            KeyPolicy::Include(key)
        }
    }
}

impl From<&str> for KeyPolicy {
    fn from(key: &str) -> Self {
        KeyPolicy::from(key.to_string())
    }
}

impl From<KeyPolicy> for String {
    fn from(policy: KeyPolicy) -> Self {
        match policy {
            KeyPolicy::Include(key) => key,
            KeyPolicy::Omit => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelEncoding {
    /// `INFO`
    #[default]
    Capital,
    /// `INFO` in the level's colour
    CapitalColor,
    /// `info`
    Lowercase,
    /// `info` in the level's colour
    #[serde(alias = "color")]
    LowercaseColor,
}

impl LevelEncoding {
    pub fn render(&self, level: LogLevel) -> String {
        match self {
            LevelEncoding::Capital => level.capital_str().to_string(),
            LevelEncoding::Lowercase => level.as_str().to_string(),
            LevelEncoding::CapitalColor => level
                .capital_str()
                .color(level.color_code())
                .to_string(),
            LevelEncoding::LowercaseColor => {
                level.as_str().color(level.color_code()).to_string()
            }
        }
    }
}

/// Standardized timestamp format options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeEncoding {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// RFC 3339 with nanoseconds: `2025-01-08T10:30:45.123456789Z`
    Rfc3339Nano,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format, e.g. `%Y/%m/%d %H:%M:%S%.3f %:z`
    Custom(String),
}

impl TimeEncoding {
    #[must_use]
    pub fn render(&self, time: &DateTime<Utc>) -> String {
        match self {
            TimeEncoding::Iso8601 => time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimeEncoding::Iso8601Micros => time.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimeEncoding::Rfc3339 => time.to_rfc3339(),
            TimeEncoding::Rfc3339Nano => time.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string(),
            TimeEncoding::Unix => time.timestamp().to_string(),
            TimeEncoding::UnixMillis => time.timestamp_millis().to_string(),
            TimeEncoding::UnixMicros => time.timestamp_micros().to_string(),
            TimeEncoding::Custom(format) => {
                let mut out = String::new();
                if write!(out, "{}", time.format(format)).is_err() {
                    return time.to_rfc3339();
                }
                out
            }
        }
    }

    /// Reject custom formats containing unknown specifiers
    pub fn validate(&self) -> Result<()> {
        if let TimeEncoding::Custom(format) = self {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "time-encoder",
                    format!("invalid time format '{}'", format),
                ));
            }
        }
        Ok(())
    }

    /// JSON form: numbers for the Unix variants, strings otherwise
    pub fn to_json(&self, time: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimeEncoding::Unix => time.timestamp().into(),
            TimeEncoding::UnixMillis => time.timestamp_millis().into(),
            TimeEncoding::UnixMicros => time.timestamp_micros().into(),
            _ => self.render(time).into(),
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimeEncoding::Unix | TimeEncoding::UnixMillis | TimeEncoding::UnixMicros
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationEncoding {
    /// Floating-point seconds
    Seconds,
    /// Floating-point milliseconds
    #[serde(alias = "ms")]
    Millis,
    /// Integer nanoseconds
    Nanos,
    /// Human form such as `1.5s`
    #[default]
    String,
}

impl DurationEncoding {
    pub fn to_json(&self, duration: &Duration) -> serde_json::Value {
        match self {
            DurationEncoding::Seconds => float_to_json(duration.as_secs_f64()),
            DurationEncoding::Millis => float_to_json(duration.as_secs_f64() * 1000.0),
            DurationEncoding::Nanos => {
                serde_json::Value::from(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
            }
            DurationEncoding::String => format!("{:?}", duration).into(),
        }
    }

    pub fn render(&self, duration: &Duration) -> String {
        match self.to_json(duration) {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallerEncoding {
    /// `dir/file.rs:42`
    #[default]
    Short,
    /// Full path and line
    Full,
}

impl CallerEncoding {
    pub fn render(&self, caller: &Caller) -> String {
        match self {
            CallerEncoding::Short => caller.trimmed_path(),
            CallerEncoding::Full => caller.full_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameEncoding {
    /// The full dotted logger name
    #[default]
    Full,
    /// Only the segment after the last dot
    Last,
}

impl NameEncoding {
    pub fn render(&self, name: &str) -> String {
        match self {
            NameEncoding::Full => name.to_string(),
            NameEncoding::Last => name.rsplit('.').next().unwrap_or(name).to_string(),
        }
    }
}

/// JSON numbers cannot carry NaN or infinities; render those as strings
pub(crate) fn float_to_json(value: f64) -> serde_json::Value {
    if value.is_nan() {
        "NaN".into()
    } else if value.is_infinite() {
        (if value > 0.0 { "+Inf" } else { "-Inf" }).into()
    } else {
        serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Field naming and representation scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncoderConfig {
    pub message_key: KeyPolicy,
    pub level_key: KeyPolicy,
    pub time_key: KeyPolicy,
    pub name_key: KeyPolicy,
    pub caller_key: KeyPolicy,
    /// Only records logged through the crate macros carry a function name;
    /// direct `Logger` calls leave this key out. Omitted by default.
    pub function_key: KeyPolicy,
    pub stacktrace_key: KeyPolicy,
    pub skip_line_ending: bool,
    pub line_ending: String,
    pub level_encoder: LevelEncoding,
    pub time_encoder: TimeEncoding,
    pub duration_encoder: DurationEncoding,
    pub caller_encoder: CallerEncoding,
    /// Unset falls back to [`NameEncoding::Full`]
    pub name_encoder: Option<NameEncoding>,
    pub console_separator: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            message_key: KeyPolicy::include("message"),
            level_key: KeyPolicy::include("level"),
            time_key: KeyPolicy::include("time"),
            name_key: KeyPolicy::include("name"),
            caller_key: KeyPolicy::include("caller"),
            function_key: KeyPolicy::Omit,
            stacktrace_key: KeyPolicy::include("stack"),
            skip_line_ending: false,
            line_ending: "\n".to_string(),
            level_encoder: LevelEncoding::default(),
            time_encoder: TimeEncoding::default(),
            duration_encoder: DurationEncoding::default(),
            caller_encoder: CallerEncoding::default(),
            name_encoder: None,
            console_separator: "\t".to_string(),
        }
    }
}

impl EncoderConfig {
    pub fn effective_name_encoder(&self) -> NameEncoding {
        self.name_encoder.unwrap_or(NameEncoding::Full)
    }

    pub fn effective_line_ending(&self) -> &str {
        if self.skip_line_ending {
            ""
        } else if self.line_ending.is_empty() {
            "\n"
        } else {
            &self.line_ending
        }
    }

    pub fn effective_separator(&self) -> &str {
        if self.console_separator.is_empty() {
            "\t"
        } else {
            &self.console_separator
        }
    }

    /// Check the settings that can only fail once a record is rendered
    pub fn validate(&self) -> Result<()> {
        self.time_encoder.validate()
    }

    /// Omit every role, leaving only context fields
    #[must_use]
    pub fn omit_all(mut self) -> Self {
        for key in [
            &mut self.message_key,
            &mut self.level_key,
            &mut self.time_key,
            &mut self.name_key,
            &mut self.caller_key,
            &mut self.function_key,
            &mut self.stacktrace_key,
        ] {
            *key = KeyPolicy::Omit;
        }
        self
    }
}
