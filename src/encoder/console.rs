//! Human-oriented console encoder

use super::{fields_to_json_object, Encoder, EncoderConfig, LogFormat};
use crate::core::entry::Entry;
use crate::core::error::Result;
use crate::core::field::Field;

/// Separator-joined record: time, level, name, caller, function, message, then the
/// context fields as one JSON object. A stacktrace goes on the following line.
#[derive(Debug, Clone)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
    error_verbose: bool,
}

impl ConsoleEncoder {
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
}

impl Encoder for ConsoleEncoder {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>> {
        let config = &self.config;
        let mut elements: Vec<String> = Vec::with_capacity(7);

        // Console output carries no keys; a role is shown unless it is omitted
        if !config.time_key.is_omitted() {
            elements.push(config.time_encoder.render(&entry.time));
        }
        if !config.level_key.is_omitted() {
            elements.push(config.level_encoder.render(entry.level));
        }
        if !config.name_key.is_omitted() && !entry.logger_name.is_empty() {
            elements.push(config.effective_name_encoder().render(&entry.logger_name));
        }
        if let Some(caller) = &entry.caller {
            if !config.caller_key.is_omitted() {
                elements.push(config.caller_encoder.render(caller));
            }
            if let Some(function) = caller
                .function
                .as_ref()
                .filter(|_| !config.function_key.is_omitted())
            {
                elements.push(function.clone());
            }
        }
        if !config.message_key.is_omitted() {
            elements.push(entry.message.clone());
        }
        if !fields.is_empty() {
            elements.push(fields_to_json_object(
                "console",
                fields,
                config,
                self.error_verbose,
            )?);
        }

        let mut out = elements.join(config.effective_separator());
        if let Some(stack) = entry
            .stack
            .as_ref()
            .filter(|_| !config.stacktrace_key.is_omitted())
        {
            out.push('\n');
            out.push_str(stack);
        }
        out.push_str(config.effective_line_ending());
        Ok(out.into_bytes())
    }

    fn format(&self) -> LogFormat {
        LogFormat::Console
    }
}
