//! Tab-separated edge list writer
//!
//! One edge per line: `source<TAB>dest`.

use crate::output::traits::{EdgeSink, OutputError, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Stdout, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Edge sink writing TSV lines through a shared buffered writer
pub struct TsvSink<W: Write + Send> {
    writer: Mutex<BufWriter<W>>,
}

impl<W: Write + Send> TsvSink<W> {
    /// Wraps any writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
        }
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .into_inner()
            .map_err(|e| OutputError::Write(e.to_string()))
    }

    fn lock(&self) -> MutexGuard<'_, BufWriter<W>> {
        self.writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TsvSink<Stdout> {
    /// Writes edges to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl TsvSink<File> {
    /// Creates (or truncates) a file and writes edges to it
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write + Send> EdgeSink for TsvSink<W> {
    fn emit(&self, source: &Url, dest: &Url) -> OutputResult<()> {
        writeln!(self.lock(), "{}\t{}", source, dest)?;
        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        self.lock().flush()?;
        Ok(())
    }
}
