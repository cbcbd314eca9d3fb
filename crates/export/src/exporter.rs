//! Export sinks for formatted lines.
//!
//! Standard output receives one line per record. The file sink appends to
//! its path and rotates once the next write would take the file past the
//! size limit: `path` becomes `path.1`, `path.1` becomes `path.2` and so on,
//! keeping a fixed number of rotated files.

use crate::error::ExportResult;
use meshdump_core::{MAX_FILE_BYTES, ROTATED_FILE_COUNT};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination of formatted records.
pub trait Exporter: Send {
    /// Write one record line. The line must not carry its own terminator.
    fn export(&mut self, line: &str) -> ExportResult<()>;

    /// Flush buffered output before shutdown.
    fn quit(&mut self) -> ExportResult<()>;

    /// Whether the destination already held records when it was opened.
    fn resumes_existing(&self) -> bool {
        false
    }
}

/// Writes records to standard output.
#[derive(Debug, Default)]
pub struct StdoutExporter;

impl StdoutExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for StdoutExporter {
    fn export(&mut self, line: &str) -> ExportResult<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }

    fn quit(&mut self) -> ExportResult<()> {
        io::stdout().flush()?;
        Ok(())
    }
}

/// Appends records to a file with size-based rotation.
#[derive(Debug)]
pub struct FileExporter {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    writer: BufWriter<File>,
    written: u64,
    resumed: bool,
}

impl FileExporter {
    /// Open `path` for appending with the default limits.
    pub fn open(path: impl Into<PathBuf>) -> ExportResult<Self> {
        Self::with_limits(path, MAX_FILE_BYTES, ROTATED_FILE_COUNT)
    }

    pub fn with_limits(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> ExportResult<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        info!(path = %path.display(), size = written, "Exporting to file");

        Ok(Self {
            path,
            max_bytes,
            backups,
            writer: BufWriter::new(file),
            written,
            resumed: written > 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> ExportResult<()> {
        self.writer.flush()?;

        if self.backups == 0 {
            self.writer = BufWriter::new(File::create(&self.path)?);
            self.written = 0;
            return Ok(());
        }

        let oldest = self.rotated_path(self.backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.backups).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.rotated_path(1))?;

        self.writer = BufWriter::new(File::create(&self.path)?);
        self.written = 0;
        debug!(path = %self.path.display(), "Rotated export file");
        Ok(())
    }
}

impl Exporter for FileExporter {
    fn export(&mut self, line: &str) -> ExportResult<()> {
        let len = line.len() as u64 + 1;
        if self.written > 0 && self.written + len > self.max_bytes {
            self.rotate()?;
        }
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        self.written += len;
        Ok(())
    }

    fn quit(&mut self) -> ExportResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn resumes_existing(&self) -> bool {
        self.resumed
    }
}

/// Exporter for an optional output file; standard output when absent.
pub fn open_exporter(output_file: Option<&Path>) -> ExportResult<Box<dyn Exporter>> {
    match output_file {
        Some(path) => Ok(Box::new(FileExporter::open(path)?)),
        None => Ok(Box::new(StdoutExporter::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "meshdump-export-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = scratch_dir();
        let path = dir.join("packets.log");
        fs::write(&path, "earlier\n").unwrap();

        let mut exporter = FileExporter::open(&path).unwrap();
        exporter.export("later").unwrap();
        exporter.quit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
        assert!(exporter.resumes_existing());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn fresh_file_is_not_resumed() {
        let dir = scratch_dir();
        let exporter = FileExporter::open(dir.join("packets.log")).unwrap();
        assert!(!exporter.resumes_existing());
        assert!(!StdoutExporter::new().resumes_existing());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn rotates_and_keeps_bounded_backups() {
        let dir = scratch_dir();
        let path = dir.join("packets.log");
        let mut exporter = FileExporter::with_limits(&path, 10, 2).unwrap();

        for line in ["aaaa", "bbbb", "cccc", "dddd", "eeee"] {
            exporter.export(line).unwrap();
        }
        exporter.quit().unwrap();

        // two five-byte lines fit in ten bytes
        assert_eq!(fs::read_to_string(&path).unwrap(), "eeee\n");
        assert_eq!(
            fs::read_to_string(exporter.rotated_path(1)).unwrap(),
            "cccc\ndddd\n"
        );
        assert_eq!(
            fs::read_to_string(exporter.rotated_path(2)).unwrap(),
            "aaaa\nbbbb\n"
        );
        assert!(!exporter.rotated_path(3).exists());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn oversized_line_is_written_to_empty_file() {
        let dir = scratch_dir();
        let path = dir.join("packets.log");
        let mut exporter = FileExporter::with_limits(&path, 4, 1).unwrap();

        exporter.export("longer than the limit").unwrap();
        exporter.quit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "longer than the limit\n");
        assert!(!exporter.rotated_path(1).exists());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn rotated_names_append_index() {
        let dir = scratch_dir();
        let exporter = FileExporter::open(dir.join("out.csv")).unwrap();
        assert_eq!(exporter.rotated_path(3), dir.join("out.csv.3"));
        assert_eq!(exporter.path(), dir.join("out.csv"));
        fs::remove_dir_all(dir).unwrap();
    }
}
