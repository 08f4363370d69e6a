//! Standard output / standard error sinks

use super::WriteSyncer;
use crate::core::error::Result;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self {
            stream: ConsoleStream::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl WriteSyncer for ConsoleSink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        // The std handle lock keeps one record in one piece
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().lock().write_all(buf)?,
            ConsoleStream::Stderr => std::io::stderr().lock().write_all(buf)?,
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    // Closing the process streams is never ours to do
    fn close(&self) -> Result<()> {
        self.sync()
    }

    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}
