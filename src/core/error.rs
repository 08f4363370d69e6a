//! Error types for logger assembly and runtime writes

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Level string outside debug/info/warn/error/dpanic/panic/fatal
    #[error("invalid log level: '{0}'")]
    InvalidLevel(String),

    /// Format string outside json/text/console
    #[error("unsupported log format: '{0}'")]
    UnsupportedFormat(String),

    /// Sampling policy with negative values
    #[error("invalid sampling policy: {0}")]
    InvalidSampling(String),

    /// Compression other than "" or "gzip"
    #[error("unsupported compression for rotated files: '{0}'")]
    InvalidCompression(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Configuration document could not be parsed
    #[error("failed to parse {format} configuration: {message}")]
    ConfigParse { format: String, message: String },

    /// Sink could not be created or opened at assembly time
    #[error("failed to open log sink '{path}': {source}")]
    SinkOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A single record failed to encode
    #[error("Encoder error ({encoder}): {message}")]
    Encode { encoder: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Sink already closed
    #[error("sink '{0}' is closed")]
    SinkClosed(String),

    /// Several sinks failed in one operation
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<LoggerError>),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn config_parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ConfigParse {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn sink_open(path: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::SinkOpen {
            path: path.into(),
            source,
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an encoder error
    pub fn encode(encoder: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Encode {
            encoder: encoder.into(),
            message: message.into(),
        }
    }

    /// Fold a list of errors: none is `Ok`, one is itself, more become `Multiple`
    pub fn combine(mut errors: Vec<LoggerError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(LoggerError::Multiple(errors)),
        }
    }

    /// Whether this error belongs to the configuration-time taxonomy
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidLevel(_)
                | LoggerError::UnsupportedFormat(_)
                | LoggerError::InvalidSampling(_)
                | LoggerError::InvalidCompression(_)
                | LoggerError::InvalidConfiguration { .. }
                | LoggerError::ConfigParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("grpc-level", "below main level");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.is_config_error());

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = LoggerError::sink_open("/var/log/app.log", io_err);
        assert!(matches!(err, LoggerError::SinkOpen { .. }));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LoggerError::UnsupportedFormat("xml".into()).to_string(),
            "unsupported log format: 'xml'"
        );
        assert_eq!(
            LoggerError::InvalidLevel("loud".into()).to_string(),
            "invalid log level: 'loud'"
        );
        assert_eq!(
            LoggerError::file_rotation("/var/log/app.log", "Disk full").to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );
        assert_eq!(
            LoggerError::encode("json", "bad float").to_string(),
            "Encoder error (json): bad float"
        );
    }

    #[test]
    fn test_combine() {
        assert!(LoggerError::combine(Vec::new()).is_ok());

        let one = LoggerError::combine(vec![LoggerError::SinkClosed("a".into())]);
        assert!(matches!(one, Err(LoggerError::SinkClosed(_))));

        let many = LoggerError::combine(vec![
            LoggerError::SinkClosed("a".into()),
            LoggerError::SinkClosed("b".into()),
        ])
        .unwrap_err();
        assert_eq!(many.to_string(), "sink 'a' is closed; sink 'b' is closed");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }
}
