//! Property-based tests for rust_logger_config using proptest

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_logger_config::core::{ObservedCore, SamplerCore};
use rust_logger_config::prelude::*;
use rust_logger_config::{new_encoder, EncoderSettings};
use std::sync::Arc;
use std::time::Duration;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::DPanic),
        Just(LogLevel::Panic),
        Just(LogLevel::Fatal),
    ]
}

fn any_format() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("json"), Just("text"), Just("console")]
}

fn sample_entry(message: &str) -> Entry {
    let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().unwrap();
    Entry::new(LogLevel::Warn, message)
        .with_time(time)
        .with_name("svc")
        .with_caller(Caller::new("src/svc/worker.rs", 17))
        .with_stack("frame-0\nframe-1")
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Level names parse regardless of case and surrounding whitespace
    #[test]
    fn test_level_parse_ignores_case(level in any_level(), mask in any::<u32>()) {
        let mixed: String = level
            .as_str()
            .chars()
            .enumerate()
            .map(|(i, c)| if mask & (1 << (i % 32)) != 0 { c.to_ascii_uppercase() } else { c })
            .collect();
        let parsed: LogLevel = format!(" {} ", mixed).parse().unwrap();
        prop_assert_eq!(parsed, level);
    }

    /// Anything outside the seven names is rejected
    #[test]
    fn test_unknown_level_rejected(name in "[a-z]{1,10}") {
        let known = ["debug", "info", "warn", "warning", "error", "dpanic", "panic", "fatal"];
        prop_assume!(!known.contains(&name.as_str()));
        prop_assert!(matches!(name.parse::<LogLevel>(), Err(LoggerError::InvalidLevel(_))));
    }

    /// The gate admits exactly the levels at or above it
    #[test]
    fn test_gate_matches_ordering(gate in any_level(), level in any_level()) {
        let atomic = AtomicLevel::new(gate);
        prop_assert_eq!(atomic.enabled(level), level >= gate);
    }
}

// ============================================================================
// Sampling Tests
// ============================================================================

proptest! {
    /// Within one tick, N identical records pass as I + ceil((N - I) / T)
    #[test]
    fn test_sampling_count(initial in 0u64..20, thereafter in 0u64..10, n in 0u64..200) {
        let (observed, logs) = ObservedCore::new(LogLevel::Debug);
        let sampler = SamplerCore::new(
            Arc::new(observed),
            Duration::from_secs(1),
            initial,
            thereafter,
        );
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().unwrap();
        let logger = Logger::new(Arc::new(sampler), vec![]).with_clock(Arc::new(move || time));

        for _ in 0..n {
            logger.info("repeated", &[]);
        }

        let expected = if n <= initial {
            n
        } else if thereafter == 0 {
            initial
        } else {
            initial + (n - initial).div_ceil(thereafter)
        };
        prop_assert_eq!(logs.len() as u64, expected);
    }
}

// ============================================================================
// Encoder Tests
// ============================================================================

proptest! {
    /// An omitted role never appears in the JSON object
    #[test]
    fn test_json_omits_roles(
        omit_message in any::<bool>(),
        omit_level in any::<bool>(),
        omit_time in any::<bool>(),
        omit_name in any::<bool>(),
        omit_caller in any::<bool>(),
        omit_stack in any::<bool>(),
    ) {
        let mut config = EncoderConfig::default();
        let roles = [
            (omit_message, &mut config.message_key, "message"),
            (omit_level, &mut config.level_key, "level"),
            (omit_time, &mut config.time_key, "time"),
            (omit_name, &mut config.name_key, "name"),
            (omit_caller, &mut config.caller_key, "caller"),
            (omit_stack, &mut config.stacktrace_key, "stack"),
        ];
        let mut expected = Vec::new();
        for (omit, key, name) in roles {
            if omit {
                *key = KeyPolicy::Omit;
            } else {
                expected.push(name);
            }
        }

        let encoder = new_encoder("json", &config, &EncoderSettings::default()).unwrap();
        let bytes = encoder.encode_entry(&sample_entry("hello"), &[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(keys, expected);
    }

    /// With every role omitted, no encoder renders the entry's own data
    #[test]
    fn test_omit_all_leaves_fields_only(format in any_format(), message in "[a-z]{8,16}") {
        let config = EncoderConfig::default().omit_all();
        let encoder = new_encoder(format, &config, &EncoderSettings::default()).unwrap();
        let bytes = encoder
            .encode_entry(&sample_entry(&message), &[Field::int("attempt", 3)])
            .unwrap();
        let output = String::from_utf8(bytes).unwrap();

        prop_assert!(!output.contains(&message));
        prop_assert!(!output.contains("WARN"));
        prop_assert!(!output.contains("worker.rs"));
        prop_assert!(!output.contains("frame-0"));
        prop_assert!(output.contains("attempt"));
    }

    /// Arbitrary messages and values never break a text record across lines
    #[test]
    fn test_text_record_is_one_line(message in ".*", value in ".*") {
        let encoder =
            new_encoder("text", &EncoderConfig::default(), &EncoderSettings::default()).unwrap();
        let entry = Entry::new(LogLevel::Info, message.as_str());
        let bytes = encoder
            .encode_entry(&entry, &[Field::string("detail", value.as_str())])
            .unwrap();
        let output = String::from_utf8(bytes).unwrap();

        prop_assert!(output.ends_with('\n'));
        prop_assert_eq!(output.matches('\n').count(), 1);
        prop_assert!(!output.contains('\r'));
    }

    /// JSON records stay parseable whatever the message contains
    #[test]
    fn test_json_record_parses(message in ".*", level in any_level()) {
        let encoder =
            new_encoder("json", &EncoderConfig::default(), &EncoderSettings::default()).unwrap();
        let bytes = encoder.encode_entry(&Entry::new(level, message.as_str()), &[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        prop_assert_eq!(value["message"].as_str(), Some(message.as_str()));
    }
}
