//! One JSON object per record

use super::{field_value_to_json, push_json_pair, Encoder, EncoderConfig, LogFormat};
use crate::core::entry::Entry;
use crate::core::error::Result;
use crate::core::field::{Field, FieldValue};

/// JSON encoder
///
/// Keys appear in a fixed order: level, time, name, caller, function, message,
/// context fields, stacktrace. Omitted roles leave no key behind.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    config: EncoderConfig,
    error_verbose: bool,
}

impl JsonEncoder {
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

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl Encoder for JsonEncoder {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>> {
        let config = &self.config;
        let mut out = String::with_capacity(256);
        let mut first = true;
        out.push('{');

        if let Some(key) = config.level_key.key() {
            push_json_pair(
                &mut out,
                &mut first,
                key,
                &config.level_encoder.render(entry.level).into(),
            )?;
        }
        if let Some(key) = config.time_key.key() {
            push_json_pair(
                &mut out,
                &mut first,
                key,
                &config.time_encoder.to_json(&entry.time),
            )?;
        }
        if let Some(key) = config.name_key.key() {
            if !entry.logger_name.is_empty() {
                let name = config.effective_name_encoder().render(&entry.logger_name);
                push_json_pair(&mut out, &mut first, key, &name.into())?;
            }
        }
        if let Some(caller) = &entry.caller {
            if let Some(key) = config.caller_key.key() {
                let rendered = config.caller_encoder.render(caller);
                push_json_pair(&mut out, &mut first, key, &rendered.into())?;
            }
            if let (Some(key), Some(function)) = (config.function_key.key(), &caller.function) {
                push_json_pair(&mut out, &mut first, key, &function.clone().into())?;
            }
        }
        if let Some(key) = config.message_key.key() {
            push_json_pair(&mut out, &mut first, key, &entry.message.clone().into())?;
        }

        for field in fields {
            let value = field_value_to_json("json", &field.value, config)?;
            push_json_pair(&mut out, &mut first, &field.key, &value)?;
            if let FieldValue::Error {
                verbose: Some(verbose),
                ..
            } = &field.value
            {
                if self.error_verbose {
                    push_json_pair(
                        &mut out,
                        &mut first,
                        &format!("{}Verbose", field.key),
                        &verbose.clone().into(),
                    )?;
                }
            }
        }

        if let (Some(key), Some(stack)) = (config.stacktrace_key.key(), &entry.stack) {
            push_json_pair(&mut out, &mut first, key, &stack.clone().into())?;
        }

        out.push('}');
        out.push_str(config.effective_line_ending());
        Ok(out.into_bytes())
    }

    fn format(&self) -> LogFormat {
        LogFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_entry;
    use super::super::KeyPolicy;
    use super::*;
    use crate::core::log_level::LogLevel;
    use std::fmt;
    use std::time::Duration;

    #[derive(Debug)]
    struct ConnectError(std::io::Error);

    impl fmt::Display for ConnectError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connect failed")
        }
    }

    impl std::error::Error for ConnectError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    fn encode(encoder: &JsonEncoder, entry: &Entry, fields: &[Field]) -> serde_json::Value {
        let bytes = encoder.encode_entry(entry, fields).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_default_keys() {
        let encoder = JsonEncoder::new(EncoderConfig::default());
        let value = encode(&encoder, &sample_entry(), &[Field::int("status", 200)]);

        assert_eq!(value["level"], "INFO");
        assert_eq!(value["time"], "2024-03-01T12:00:00.000Z");
        assert_eq!(value["name"], "server");
        assert_eq!(value["caller"], "server/handler.rs:42");
        assert_eq!(value["message"], "request served");
        assert_eq!(value["status"], 200);
        assert!(value.get("function").is_none());
    }

    #[test]
    fn test_key_order() {
        let config = EncoderConfig {
            function_key: KeyPolicy::include("func"),
            ..EncoderConfig::default()
        };
        let encoder = JsonEncoder::new(config);
        let entry = sample_entry().with_stack("frame 0");
        let bytes = encoder
            .encode_entry(&entry, &[Field::string("user", "ada")])
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let order: Vec<usize> = [
            "\"level\"", "\"time\"", "\"name\"", "\"caller\"", "\"func\"", "\"message\"",
            "\"user\"", "\"stack\"",
        ]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_renamed_keys() {
        let config = EncoderConfig {
            message_key: KeyPolicy::include("msg"),
            level_key: KeyPolicy::include("severity"),
            ..EncoderConfig::default()
        };
        let value = encode(&JsonEncoder::new(config), &sample_entry(), &[]);
        assert_eq!(value["msg"], "request served");
        assert_eq!(value["severity"], "INFO");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_omitted_roles_leave_no_key() {
        let config = EncoderConfig::default().omit_all();
        let entry = sample_entry().with_stack("frame 0");
        let value = encode(&JsonEncoder::new(config), &entry, &[Field::bool("ok", true)]);
        assert_eq!(value, serde_json::json!({"ok": true}));
    }

    #[test]
    fn test_error_verbose() {
        let err = ConnectError(std::io::Error::new(std::io::ErrorKind::Other, "refused"));
        let fields = [Field::error(&err)];

        let value = encode(&JsonEncoder::new(EncoderConfig::default()), &sample_entry(), &fields);
        assert_eq!(value["error"], "connect failed");
        assert_eq!(value["errorVerbose"], "connect failed\ncaused by: refused");

        let quiet = JsonEncoder::new(EncoderConfig::default()).with_error_verbose(false);
        let value = encode(&quiet, &sample_entry(), &fields);
        assert_eq!(value["error"], "connect failed");
        assert!(value.get("errorVerbose").is_none());
    }

    #[test]
    fn test_field_values() {
        let entry = Entry::new(LogLevel::Warn, "slow").with_time(sample_entry().time);
        let fields = [
            Field::duration("elapsed", Duration::from_millis(250)),
            Field::float("ratio", f64::NAN),
            Field::any("tags", &vec!["a", "b"]),
        ];
        let value = encode(&JsonEncoder::new(EncoderConfig::default()), &entry, &fields);

        assert_eq!(value["elapsed"], "250ms");
        assert_eq!(value["ratio"], "NaN");
        assert_eq!(value["tags"], serde_json::json!(["a", "b"]));
        assert!(value.get("name").is_none());
        assert!(value.get("caller").is_none());
    }

    #[test]
    fn test_message_escaping() {
        let entry = Entry::new(LogLevel::Info, "quote \" and\nnewline");
        let value = encode(&JsonEncoder::new(EncoderConfig::default()), &entry, &[]);
        assert_eq!(value["message"], "quote \" and\nnewline");
    }
}
