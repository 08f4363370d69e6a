//! In-memory sink, handy for capturing output

use super::WriteSyncer;
use crate::core::error::{LoggerError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Clones share the same buffer
#[derive(Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
    syncs: Arc<AtomicUsize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl WriteSyncer for MemorySink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(LoggerError::SinkClosed(self.name().to_string()));
        }
        self.buffer.lock().extend_from_slice(buf);
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.syncs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        let sink = MemorySink::new();
        let mut handles = Vec::new();

        for t in 0..4 {
            let sink = sink.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    let record = format!("thread-{}-record-{}-{}\n", t, i, "x".repeat(64));
                    sink.write(record.as_bytes()).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert!(line.starts_with("thread-"));
            assert!(line.ends_with(&"x".repeat(64)));
        }
    }

    #[test]
    fn test_write_after_close_fails() {
        let sink = MemorySink::new();
        sink.write(b"before\n").unwrap();
        sink.close().unwrap();
        assert!(sink.write(b"after\n").is_err());
        assert_eq!(sink.contents(), "before\n");
    }
}
