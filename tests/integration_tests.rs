//! Integration tests for logger assembly
//!
//! These tests verify:
//! - Level and format validation
//! - Deterministic assembly
//! - Console output with stack traces
//! - File rotation driven by configuration
//! - Runtime reconfiguration through the returned handles
//! - The process-wide logger

use chrono::{TimeZone, Utc};
use rust_logger_config::assembler::open_sinks;
use rust_logger_config::core::Clock;
use rust_logger_config::global;
use rust_logger_config::prelude::*;
use rust_logger_config::{build_options, OptionKind};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn assemble(config: &Config) -> (Logger, LogProperties, MemorySink) {
    let sink = MemorySink::new();
    let (logger, props) =
        build_logger_with_syncer(config, Arc::new(sink.clone()), Arc::new(MemorySink::new()))
            .expect("Failed to assemble logger");
    (logger, props, sink)
}

fn fixed_clock() -> Clock {
    let time = Utc
        .with_ymd_and_hms(2024, 5, 17, 8, 30, 0)
        .single()
        .expect("valid datetime");
    Arc::new(move || time)
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read log dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_level_strings() {
    for level in LogLevel::ALL {
        let config = Config {
            level: level.as_str().to_uppercase(),
            ..Config::default()
        };
        let (_logger, props, _sink) = assemble(&config);
        assert_eq!(props.level(), level);
    }

    let config = Config {
        level: "trace".into(),
        ..Config::default()
    };
    let err = build_logger(&config).unwrap_err();
    assert!(matches!(err, LoggerError::InvalidLevel(ref l) if l == "trace"));
}

#[test]
fn test_formats_have_distinct_shapes() {
    let mut outputs = Vec::new();
    for format in ["json", "text", "console"] {
        let config = Config {
            format: format.into(),
            ..Config::default()
        };
        let (logger, _props, sink) = assemble(&config);
        logger.info("hello", &[Field::string("user", "ada")]);
        outputs.push(sink.contents());
    }

    let value: serde_json::Value = serde_json::from_str(outputs[0].trim()).unwrap();
    assert_eq!(value["message"], "hello");
    assert_eq!(value["user"], "ada");
    assert!(outputs[1].starts_with('[') && outputs[1].contains("[user=ada]"));
    assert!(outputs[2].contains("\thello\t{\"user\":\"ada\"}"));

    let config = Config {
        format: "logfmt".into(),
        ..Config::default()
    };
    assert!(matches!(
        build_logger(&config).unwrap_err(),
        LoggerError::UnsupportedFormat(_)
    ));
}

fn emit_sample(logger: &Logger) {
    logger.info("request served", &[Field::int("status", 200)]);
    logger.warn("slow request", &[Field::float("seconds", 1.25)]);
}

#[test]
fn test_assembly_is_deterministic() {
    let config = Config::from_toml_str(
        r#"
        level = "debug"
        format = "json"
        development = true
        disable-stacktrace = true

        [sampling]
        initial = 10
        thereafter = 5
        "#,
    )
    .unwrap();

    let kinds = |config: &Config| -> Vec<OptionKind> {
        build_options(config, Arc::new(MemorySink::new()))
            .unwrap()
            .iter()
            .map(LoggerOption::kind)
            .collect()
    };
    assert_eq!(kinds(&config), kinds(&config));

    let (first, first_props, first_sink) = assemble(&config);
    let (second, second_props, second_sink) = assemble(&config);
    assert_eq!(first_props.level(), second_props.level());

    emit_sample(&first.with_clock(fixed_clock()));
    emit_sample(&second.with_clock(fixed_clock()));

    assert_eq!(first_sink.lines().len(), 2);
    assert_eq!(first_sink.bytes(), second_sink.bytes());
}

#[test]
fn test_warn_console_scenario() {
    let config = Config {
        level: "warn".into(),
        format: "console".into(),
        stdout: true,
        ..Config::default()
    };
    assert_eq!(open_sinks(&config).unwrap().name(), "stdout");

    let (logger, _props, sink) = assemble(&config);
    logger.info("cache warm", &[]);
    logger.error("disk full", &[]);

    let output = sink.contents();
    assert!(!output.contains("cache warm"));

    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].contains("disk full"));
    assert!(lines[0].contains("integration_tests.rs:"));
    assert!(lines.len() > 1, "expected a stack trace after the record");
}

#[test]
fn test_small_max_size_rotates() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        format: "json".into(),
        file: FileLogConfig {
            root_path: dir.path().to_string_lossy().into_owned(),
            filename: "rotating.log".into(),
            max_size: 1,
            ..FileLogConfig::default()
        },
        ..Config::default()
    };

    let (logger, props) = build_logger(&config).expect("Failed to assemble logger");
    let payload = "x".repeat(1024);
    for i in 0..1200 {
        logger.info("filler", &[Field::int("seq", i), Field::string("payload", payload.as_str())]);
    }
    props.close().unwrap();

    let files = files_in(dir.path());
    assert!(files.len() > 1, "expected rotation, found {:?}", files);
    assert!(files.contains(&"rotating.log".to_string()));

    let records: usize = files
        .iter()
        .map(|name| fs::read_to_string(dir.path().join(name)).unwrap().lines().count())
        .sum();
    assert_eq!(records, 1200);
}

#[test]
fn test_compressed_rotation_with_retention() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config::from_json_str(&format!(
        r#"{{
            "format": "text",
            "file": {{
                "rootpath": {},
                "filename": "app.log",
                "max-size": 1,
                "max-backups": 2,
                "compress": "gzip"
            }}
        }}"#,
        serde_json::to_string(&dir.path().to_string_lossy()).unwrap()
    ))
    .unwrap();

    let (logger, props) = build_logger(&config).unwrap();
    let payload = "y".repeat(2048);
    for _ in 0..2000 {
        logger.info("bulk", &[Field::string("payload", payload.as_str())]);
    }
    props.close().unwrap();

    let files = files_in(dir.path());
    let backups: Vec<&String> = files.iter().filter(|f| f.ends_with(".gz")).collect();
    assert_eq!(backups.len(), 2, "found {:?}", files);
    assert_eq!(files.len(), 3);
}

#[test]
fn test_runtime_reconfiguration() {
    let config = Config {
        level: "error".into(),
        format: "json".into(),
        disable_stacktrace: true,
        ..Config::default()
    };
    let (logger, props, sink) = assemble(&config);
    let child = logger.named("worker").with(&[Field::string("job", "sync")]);

    child.info("skipped", &[]);
    props.set_level_str("debug").unwrap();
    child.debug("now visible", &[]);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["name"], "worker");
    assert_eq!(value["job"], "sync");
    assert_eq!(value["level"], "DEBUG");

    assert!(props.set_level_str("chatty").is_err());
    assert_eq!(props.level(), LogLevel::Debug);
}

#[test]
fn test_error_fields_and_verbose_switch() {
    let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such table");
    let err = LoggerError::io_operation("query", "lookup failed", source);

    for (disable, expect_verbose) in [(false, true), (true, false)] {
        let config = Config {
            format: "json".into(),
            disable_error_verbose: disable,
            disable_stacktrace: true,
            ..Config::default()
        };
        let (logger, _props, sink) = assemble(&config);
        logger.error("query failed", &[Field::error(&err)]);

        let value: serde_json::Value = serde_json::from_str(sink.lines()[0].as_str()).unwrap();
        assert!(value["error"].as_str().unwrap().contains("lookup failed"));
        assert_eq!(value.get("errorVerbose").is_some(), expect_verbose);
    }
}

#[test]
fn test_grpc_logger_threshold() {
    let config = Config {
        grpc_level: "warn".into(),
        format: "text".into(),
        ..Config::default()
    };
    let (logger, _props, sink) = assemble(&config);
    let grpc = build_grpc_logger(&logger, &config).unwrap();

    grpc.info("picked subchannel", &[]);
    grpc.warn("subchannel failed", &[]);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("[grpc]"));
    assert!(lines[0].contains("[\"subchannel failed\"]"));
}

#[test]
fn test_global_logger() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        format: "json".into(),
        file: FileLogConfig {
            filename: dir.path().join("global.log").to_string_lossy().into_owned(),
            ..FileLogConfig::default()
        },
        ..Config::default()
    };

    let logger = global::init_logger(&config).unwrap();
    logger.info("direct", &[]);
    global::logger().info("through global", &[]);
    global::properties().unwrap().set_level(LogLevel::Error);
    global::logger().info("filtered", &[]);
    global::teardown().unwrap();

    let content = fs::read_to_string(dir.path().join("global.log")).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(!global::is_installed());
}
