//! Destinations for report text.

use crate::error::{Result, ResultExt};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Somewhere report text can be written or appended.
pub trait ReportSink {
    /// Replace any previous content with `text`.
    fn overwrite(&mut self, text: &str) -> Result<()>;

    /// Add `text` after the existing content.
    fn append(&mut self, text: &str) -> Result<()>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn overwrite(&mut self, text: &str) -> Result<()> {
        (**self).overwrite(text)
    }

    fn append(&mut self, text: &str) -> Result<()> {
        (**self).append(text)
    }
}

/// Writes to a file, creating parent directories on demand.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
        }
        Ok(())
    }
}

impl ReportSink for FileSink {
    fn overwrite(&mut self, text: &str) -> Result<()> {
        self.ensure_parent()?;
        fs::write(&self.path, text).context(format!("Writing {}", self.path.display()))?;
        debug!(path = %self.path.display(), bytes = text.len(), "report written");
        Ok(())
    }

    fn append(&mut self, text: &str) -> Result<()> {
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("Opening {}", self.path.display()))?;
        file.write_all(text.as_bytes())
            .context(format!("Appending to {}", self.path.display()))?;
        debug!(path = %self.path.display(), bytes = text.len(), "report appended");
        Ok(())
    }
}

/// Keeps the report in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: String,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl ReportSink for MemorySink {
    fn overwrite(&mut self, text: &str) -> Result<()> {
        self.buffer.clear();
        self.buffer.push_str(text);
        Ok(())
    }

    fn append(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_overwrite_then_append() {
        let mut sink = MemorySink::new();
        sink.append("stale").unwrap();
        sink.overwrite("first\n").unwrap();
        sink.append("second\n").unwrap();
        assert_eq!(sink.contents(), "first\nsecond\n");
    }

    #[test]
    fn test_file_sink_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/report.txt");
        let mut sink = FileSink::new(&path);

        sink.overwrite("one\n").unwrap();
        sink.append("two\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");

        sink.overwrite("fresh\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_file_sink_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file.
        let mut sink = FileSink::new(dir.path());
        let err = sink.overwrite("x").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
