//! Bracketed single-line text encoder
//!
//! ```text
//! [2024-03-01T12:00:00.000Z] [INFO] [server] [server/handler.rs:42] ["request served"] [status=200]
//! ```
//!
//! Roles are written without keys in a fixed order; context fields follow as
//! `[key=value]`. Strings are quoted (JSON-escaped) only when they contain
//! whitespace, control characters, brackets, `=` or `"`, so every record stays on
//! one line.

use super::{Encoder, EncoderConfig, LogFormat};
use crate::core::entry::Entry;
use crate::core::error::{LoggerError, Result};
use crate::core::field::{Field, FieldValue};

#[derive(Debug, Clone)]
pub struct TextEncoder {
    config: EncoderConfig,
    error_verbose: bool,
}

impl TextEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            error_verbose: true,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_error_verbose(mut self, enabled: bool) -> Self {
        self.error_verbose = enabled;
        self
    }

    fn render_value(&self, value: &FieldValue) -> Result<String> {
        let config = &self.config;
        Ok(match value {
            FieldValue::String(s) => quote_if_needed(s),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) if f.is_nan() => "NaN".to_string(),
            FieldValue::Float(f) if f.is_infinite() => {
                (if *f > 0.0 { "+Inf" } else { "-Inf" }).to_string()
            }
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Duration(d) => quote_if_needed(&config.duration_encoder.render(d)),
            FieldValue::Time(t) => quote_if_needed(&config.time_encoder.render(t)),
            FieldValue::Error { message, .. } => quote_if_needed(message),
            FieldValue::Reflected(Ok(serde_json::Value::String(s))) => quote_if_needed(s),
            FieldValue::Reflected(Ok(value)) => quote_if_needed(&value.to_string()),
            FieldValue::Reflected(Err(e)) => return Err(LoggerError::encode("text", e.clone())),
            FieldValue::Null => "null".to_string(),
        })
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.chars().any(|c| {
            c <= ' ' || c.is_control() || matches!(c, '=' | '"' | '[' | ']')
        })
}

fn quote_if_needed(s: &str) -> String {
    if needs_quotes(s) {
        serde_json::to_string(s).unwrap_or_else(|_| format!("{:?}", s))
    } else {
        s.to_string()
    }
}

fn push_bracketed(out: &mut String, content: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push('[');
    out.push_str(content);
    out.push(']');
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    push_bracketed(out, &format!("{}={}", quote_if_needed(key), value));
}

impl Encoder for TextEncoder {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>> {
        let config = &self.config;
        let mut out = String::with_capacity(256);

        if !config.time_key.is_omitted() {
            push_bracketed(&mut out, &config.time_encoder.render(&entry.time));
        }
        if !config.level_key.is_omitted() {
            push_bracketed(&mut out, &config.level_encoder.render(entry.level));
        }
        if !config.name_key.is_omitted() && !entry.logger_name.is_empty() {
            let name = config.effective_name_encoder().render(&entry.logger_name);
            push_bracketed(&mut out, &quote_if_needed(&name));
        }
        if let Some(caller) = &entry.caller {
            if !config.caller_key.is_omitted() {
                push_bracketed(&mut out, &quote_if_needed(&config.caller_encoder.render(caller)));
            }
            if let Some(function) = caller
                .function
                .as_ref()
                .filter(|_| !config.function_key.is_omitted())
            {
                push_bracketed(&mut out, &quote_if_needed(function));
            }
        }
        if !config.message_key.is_omitted() {
            push_bracketed(&mut out, &quote_if_needed(&entry.message));
        }

        for field in fields {
            push_pair(&mut out, &field.key, &self.render_value(&field.value)?);
            if let FieldValue::Error {
                verbose: Some(verbose),
                ..
            } = &field.value
            {
                if self.error_verbose {
                    push_pair(
                        &mut out,
                        &format!("{}Verbose", field.key),
                        &quote_if_needed(verbose),
                    );
                }
            }
        }

        if let (Some(key), Some(stack)) = (config.stacktrace_key.key(), &entry.stack) {
            push_pair(&mut out, key, &quote_if_needed(stack));
        }

        out.push_str(config.effective_line_ending());
        Ok(out.into_bytes())
    }

    fn format(&self) -> LogFormat {
        LogFormat::Text
    }
}
