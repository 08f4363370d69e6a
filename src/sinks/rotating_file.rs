//! Size-rotated file sink with retention and optional gzip compression
//!
//! The active file keeps its configured name. When a write would push it past
//! `max_bytes`, it is renamed to `<stem>-<timestamp>.<ext>` (optionally gzipped
//! to `<stem>-<timestamp>.<ext>.gz`) and a fresh file is opened. Backups beyond
//! `max_backups` or older than `max_age` are removed after each rotation.

use super::WriteSyncer;
use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const MEGABYTE: u64 = 1024 * 1024;

/// When to rotate and what to keep
///
/// # Examples
///
/// ```
/// use rust_logger_config::sinks::RotationPolicy;
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_max_size_mb(100)
///     .with_max_backups(7)
///     .with_max_age(Duration::from_secs(7 * 24 * 3600))
///     .with_compression(true);
/// assert_eq!(policy.max_bytes, 100 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RotationPolicy {
    /// Rotate before a write would exceed this size
    pub max_bytes: u64,
    /// Backups to keep; 0 keeps every backup
    pub max_backups: usize,
    /// Backups older than this are removed; `None` keeps them forever
    pub max_age: Option<Duration>,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 300 * MEGABYTE,
            max_backups: 0,
            max_age: None,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_bytes = megabytes.saturating_mul(MEGABYTE);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, age: Duration) -> Self {
        self.max_age = Some(age);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// Records go straight to the file; the sink mutex already serialises writers
struct ActiveFile {
    file: File,
    size: u64,
}

pub struct RotatingFileSink {
    path: PathBuf,
    policy: RotationPolicy,
    active: Mutex<Option<ActiveFile>>,
    last_backup: Mutex<Option<DateTime<Utc>>>,
}

impl RotatingFileSink {
    /// Open (or create) the log file, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::SinkOpen`] if the directory or file cannot be created.
    pub fn open<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| LoggerError::sink_open(parent.display().to_string(), e))?;
        }

        let active = Self::open_active(&path)
            .map_err(|e| LoggerError::sink_open(path.display().to_string(), e))?;

        Ok(Self {
            path,
            policy,
            active: Mutex::new(Some(active)),
            last_backup: Mutex::new(None),
        })
    }

    fn open_active(path: &Path) -> std::io::Result<ActiveFile> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(ActiveFile { file, size })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the active file so far
    pub fn current_size(&self) -> u64 {
        self.active.lock().as_ref().map_or(0, |a| a.size)
    }

    fn path_display(&self) -> String {
        self.path.display().to_string()
    }

    fn stem_and_ext(&self) -> (String, String) {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            _ => (file_name.to_string(), String::new()),
        }
    }

    fn backup_name(&self, time: DateTime<Utc>) -> String {
        let (stem, ext) = self.stem_and_ext();
        let stamp = time.format(BACKUP_TIME_FORMAT);
        if ext.is_empty() {
            format!("{}-{}", stem, stamp)
        } else {
            format!("{}-{}.{}", stem, stamp, ext)
        }
    }

    /// Pick a backup path newer than every earlier backup and colliding with none
    fn next_backup_path(&self) -> PathBuf {
        let mut last_backup = self.last_backup.lock();
        let mut time = Utc::now();
        if let Some(last) = *last_backup {
            time = time.max(last + ChronoDuration::milliseconds(1));
        }
        loop {
            let candidate = self.path.with_file_name(self.backup_name(time));
            if !candidate.exists() && !gz_path(&candidate).exists() {
                *last_backup = Some(time);
                return candidate;
            }
            time += ChronoDuration::milliseconds(1);
        }
    }

    /// Parse the rotation time out of a backup file name
    fn backup_time(&self, file_name: &str) -> Option<NaiveDateTime> {
        let (stem, ext) = self.stem_and_ext();
        let rest = file_name.strip_suffix(".gz").unwrap_or(file_name);
        let rest = rest.strip_prefix(&format!("{}-", stem))?;
        let stamp = if ext.is_empty() {
            rest
        } else {
            rest.strip_suffix(&format!(".{}", ext))?
        };
        NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()
    }

    /// Existing backups, newest first
    pub fn backups(&self) -> Vec<PathBuf> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut backups: Vec<(NaiveDateTime, PathBuf)> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_str()?.to_string();
                let time = self.backup_time(&name)?;
                Some((time, e.path()))
            })
            .collect();
        backups.sort_by(|a, b| b.0.cmp(&a.0));
        backups.into_iter().map(|(_, p)| p).collect()
    }

    fn rotate(&self, active: &mut Option<ActiveFile>) -> Result<()> {
        // Close the active file before it is renamed
        drop(active.take());

        let backup = self.next_backup_path();
        if self.path.exists() {
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.path_display(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                compress_file(&backup)?;
            }
        }

        let fresh = Self::open_active(&self.path).map_err(|e| {
            LoggerError::file_rotation(
                self.path_display(),
                format!("Failed to create new log file: {}", e),
            )
        })?;
        *active = Some(fresh);

        self.remove_expired_backups();
        Ok(())
    }

    fn remove_expired_backups(&self) {
        let now = SystemTime::now();
        for (index, backup) in self.backups().into_iter().enumerate() {
            let over_count = self.policy.max_backups > 0 && index >= self.policy.max_backups;
            let too_old = self.policy.max_age.is_some_and(|max_age| {
                fs::metadata(&backup)
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age > max_age)
            });

            if over_count || too_old {
                if let Err(e) = fs::remove_file(&backup) {
                    eprintln!(
                        "[WARN] Failed to remove expired log backup {}: {}",
                        backup.display(),
                        e
                    );
                }
            }
        }
    }
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

/// Gzip `path` into `path.gz`, removing the original only once compression succeeded
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let gz = gz_path(path);
    let mut tmp_name = gz.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&tmp).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", tmp.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let read = reader.read(&mut buffer).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            LoggerError::io_operation(
                "compress log file",
                format!("Failed to read from file: {}", path.display()),
                e,
            )
        })?;
        if read == 0 {
            break;
        }
        encoder.write_all(&buffer[..read]).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            LoggerError::io_operation("compress log file", "Failed to compress data chunk", e)
        })?;
    }

    encoder
        .finish()
        .and_then(|mut w| w.flush())
        .map_err(|e| {
            let _ = fs::remove_file(&tmp);
            LoggerError::io_operation("compress log file", "Failed to finish compression", e)
        })?;

    fs::rename(&tmp, &gz).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(())
}

impl WriteSyncer for RotatingFileSink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        let mut active = self.active.lock();
        let Some(current) = active.as_ref() else {
            return Err(LoggerError::SinkClosed(self.path_display()));
        };

        let len = buf.len() as u64;
        if current.size > 0 && current.size + len > self.policy.max_bytes {
            if let Err(e) = self.rotate(&mut active) {
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);
                if active.is_none() {
                    let reopened = Self::open_active(&self.path).map_err(|reopen| {
                        LoggerError::io_operation(
                            "reopen log file",
                            format!("Failed to reopen {} after rotation failure", self.path_display()),
                            reopen,
                        )
                    })?;
                    *active = Some(reopened);
                }
            }
        }

        let current = active
            .as_mut()
            .ok_or_else(|| LoggerError::SinkClosed(self.path_display()))?;
        current.file.write_all(buf).map_err(|e| {
            LoggerError::io_operation(
                "write log record",
                format!("Failed to write to {}", self.path.display()),
                e,
            )
        })?;
        current.size += len;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        if let Some(current) = self.active.lock().as_mut() {
            current.file.sync_data()?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if let Some(mut current) = self.active.lock().take() {
            current.file.sync_all()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
