//! Record encoders
//!
//! An [`Encoder`] turns one [`Entry`] plus its context fields into the bytes of one
//! record. Which roles appear, and under which keys, is fixed when the encoder is
//! built from an [`EncoderConfig`].

pub mod config;
pub mod console;
pub mod json;
pub mod text;

pub use config::{
    CallerEncoding, DurationEncoding, EncoderConfig, KeyPolicy, LevelEncoding, NameEncoding,
    TimeEncoding,
};
pub use console::ConsoleEncoder;
pub use json::JsonEncoder;
pub use text::TextEncoder;

use crate::core::entry::Entry;
use crate::core::error::{LoggerError, Result};
use crate::core::field::{Field, FieldValue};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub trait Encoder: Send + Sync {
    /// Encode one record, line ending included
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>>;

    fn format(&self) -> LogFormat;
}

/// Output shape of encoded records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFormat {
    Json,
    Text,
    Console,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Text => "text",
            LogFormat::Console => "console",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            "console" => Ok(LogFormat::Console),
            _ => Err(LoggerError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Flags from the logger configuration that shape every encoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderSettings {
    pub disable_timestamp: bool,
    pub disable_error_verbose: bool,
}

/// Select and parameterise an encoder for `format`
pub fn new_encoder(
    format: &str,
    config: &EncoderConfig,
    settings: &EncoderSettings,
) -> Result<Arc<dyn Encoder>> {
    let format: LogFormat = format.parse()?;
    config.validate()?;
    let mut config = config.clone();
    if settings.disable_timestamp {
        config.time_key = KeyPolicy::Omit;
    }
    let error_verbose = !settings.disable_error_verbose;

    let encoder: Arc<dyn Encoder> = match format {
        LogFormat::Json => Arc::new(JsonEncoder::new(config).with_error_verbose(error_verbose)),
        LogFormat::Text => Arc::new(TextEncoder::new(config).with_error_verbose(error_verbose)),
        LogFormat::Console => {
            Arc::new(ConsoleEncoder::new(config).with_error_verbose(error_verbose))
        }
    };
    Ok(encoder)
}

/// JSON form of a field value under the configured render strategies
pub(crate) fn field_value_to_json(
    encoder: &str,
    value: &FieldValue,
    config: &EncoderConfig,
) -> Result<serde_json::Value> {
    Ok(match value {
        FieldValue::String(s) => s.clone().into(),
        FieldValue::Int(i) => (*i).into(),
        FieldValue::Float(f) => config::float_to_json(*f),
        FieldValue::Bool(b) => (*b).into(),
        FieldValue::Duration(d) => config.duration_encoder.to_json(d),
        FieldValue::Time(t) => config.time_encoder.to_json(t),
        FieldValue::Error { message, .. } => message.clone().into(),
        FieldValue::Reflected(Ok(value)) => value.clone(),
        FieldValue::Reflected(Err(e)) => return Err(LoggerError::encode(encoder, e.clone())),
        FieldValue::Null => serde_json::Value::Null,
    })
}

/// Context fields as one JSON object, keeping insertion order
pub(crate) fn fields_to_json_object(
    encoder: &str,
    fields: &[Field],
    config: &EncoderConfig,
    error_verbose: bool,
) -> Result<String> {
    let mut out = String::from("{");
    let mut first = true;
    for field in fields {
        push_json_pair(
            &mut out,
            &mut first,
            &field.key,
            &field_value_to_json(encoder, &field.value, config)?,
        )?;
        if let FieldValue::Error {
            verbose: Some(verbose),
            ..
        } = &field.value
        {
            if error_verbose {
                push_json_pair(
                    &mut out,
                    &mut first,
                    &format!("{}Verbose", field.key),
                    &verbose.clone().into(),
                )?;
            }
        }
    }
    out.push('}');
    Ok(out)
}

/// Append `"key":value`, comma-separated from the previous pair
pub(crate) fn push_json_pair(
    out: &mut String,
    first: &mut bool,
    key: &str,
    value: &serde_json::Value,
) -> Result<()> {
    if !*first {
        out.push(',');
    }
    *first = false;
    out.push_str(&serde_json::to_string(key)?);
    out.push(':');
    out.push_str(&serde_json::to_string(value)?);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_entry;
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("console".parse::<LogFormat>().unwrap(), LogFormat::Console);

        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(matches!(err, LoggerError::UnsupportedFormat(ref f) if f == "xml"));
        assert!(err.to_string().contains("unsupported log format"));
    }

    #[test]
    fn test_new_encoder_selects_format() {
        let config = EncoderConfig::default();
        let settings = EncoderSettings::default();
        for format in [LogFormat::Json, LogFormat::Text, LogFormat::Console] {
            let encoder = new_encoder(format.as_str(), &config, &settings).unwrap();
            assert_eq!(encoder.format(), format);
        }
        assert!(new_encoder("yaml", &config, &settings).is_err());
    }

    #[test]
    fn test_new_encoder_rejects_bad_time_format() {
        let config = EncoderConfig {
            time_encoder: TimeEncoding::Custom("%Q".into()),
            ..EncoderConfig::default()
        };
        let err = new_encoder("json", &config, &EncoderSettings::default()).err().expect("expected config error");
        assert!(err.is_config_error());
        assert!(err.to_string().contains("%Q"));
    }

    #[test]
    fn test_formats_produce_distinct_shapes() {
        let config = EncoderConfig::default();
        let settings = EncoderSettings::default();
        let entry = sample_entry();
        let fields = [Field::int("status", 200)];

        let outputs: Vec<String> = ["json", "text", "console"]
            .iter()
            .map(|format| {
                let encoder = new_encoder(format, &config, &settings).unwrap();
                String::from_utf8(encoder.encode_entry(&entry, &fields).unwrap()).unwrap()
            })
            .collect();

        assert!(outputs[0].starts_with('{'));
        assert!(outputs[1].starts_with('['));
        assert!(outputs[2].contains('\t'));
        assert_ne!(outputs[0], outputs[1]);
        assert_ne!(outputs[1], outputs[2]);
        assert_ne!(outputs[0], outputs[2]);
    }

    #[test]
    fn test_disable_timestamp_applies_to_every_encoder() {
        let config = EncoderConfig::default();
        let settings = EncoderSettings {
            disable_timestamp: true,
            ..EncoderSettings::default()
        };
        let entry = sample_entry();

        for format in ["json", "text", "console"] {
            let encoder = new_encoder(format, &config, &settings).unwrap();
            let out = String::from_utf8(encoder.encode_entry(&entry, &[]).unwrap()).unwrap();
            assert!(!out.contains("2024"), "{} output kept timestamp: {}", format, out);
        }
    }

    #[test]
    fn test_failed_reflection_is_encode_error() {
        let value = FieldValue::Reflected(Err("key must be a string".into()));
        let err = field_value_to_json("json", &value, &EncoderConfig::default()).unwrap_err();
        assert!(matches!(err, LoggerError::Encode { .. }));
    }
}
