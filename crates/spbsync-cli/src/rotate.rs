//! Size-rotated log file writer
//!
//! Rolls `spbsync.log` once it would exceed a byte threshold, keeping a
//! bounded set of numbered backups (`spbsync.log.1` is the most recent).
//! Implements `io::Write` so it can feed `tracing_appender::non_blocking`,
//! which already serializes writes onto one worker thread.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct SizeRotatingWriter {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    file: File,
    written: u64,
}

impl SizeRotatingWriter {
    /// Opens (or creates) the log file in append mode.
    pub fn new(
        dir: impl AsRef<Path>,
        file_name: &str,
        max_bytes: u64,
        max_backups: usize,
    ) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let file = Self::open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            max_backups,
            file,
            written,
        })
    }

    fn open(path: &Path) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn backup_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    /// Shifts backups up by one, dropping the oldest, and reopens a
    /// fresh base file.
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = self.backup_path(self.max_backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.max_backups).rev() {
            let from = self.backup_path(n);
            if from.exists() {
                fs::rename(&from, self.backup_path(n + 1))?;
            }
        }
        if self.max_backups > 0 {
            fs::rename(&self.path, self.backup_path(1))?;
        } else {
            fs::remove_file(&self.path)?;
        }

        self.file = Self::open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for SizeRotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Roll before the write that would cross the threshold. A single
        // record larger than the threshold still goes into an empty file
        // rather than rotating forever.
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            // A failed rotation (e.g. permissions changed underneath us)
            // must not lose the record; keep appending to the open file.
            let _ = self.rotate();
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
