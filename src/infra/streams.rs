//! Output stream handles
//!
//! Loggers receive cloned [`OutputStream`] handles; the orchestrator owns
//! the [`Streams`] pair and is the only party that closes it. With
//! `-logfile` both handles share one file.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::ConfigError;

type Sink = Rc<RefCell<Option<Box<dyn Write>>>>;

/// Shared, closable writer handle
///
/// Writes after [`OutputStream::close`] are discarded.
#[derive(Clone)]
pub struct OutputStream {
    sink: Sink,
}

impl OutputStream {
    pub fn new(writer: impl Write + 'static) -> Self {
        Self {
            sink: Rc::new(RefCell::new(Some(Box::new(writer)))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// In-memory stream plus a handle to read back what was written
    pub fn memory() -> (Self, MemoryBuffer) {
        let buffer = MemoryBuffer::default();
        (Self::new(buffer.clone()), buffer)
    }

    /// Whether two handles write to the same sink
    pub fn same_sink(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.sink, &other.sink)
    }

    /// Write one line followed by `\n`
    pub fn line(&self, text: &str) -> io::Result<()> {
        let mut guard = self.sink.borrow_mut();
        match guard.as_mut() {
            Some(writer) => {
                writer.write_all(text.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()
            }
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sink.borrow().is_none()
    }

    /// Flush and drop the underlying writer; returns whether it was open
    pub fn close(&self) -> io::Result<bool> {
        match self.sink.borrow_mut().take() {
            Some(mut writer) => {
                writer.flush()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        match self.sink.borrow_mut().as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputStream")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.sink.borrow_mut().as_mut() {
            Some(writer) => writer.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        OutputStream::flush(self)
    }
}

/// Growable byte buffer shared between a writer and its reader
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl MemoryBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }
}

impl Write for MemoryBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The standard/error stream pair of one run
#[derive(Debug)]
pub struct Streams {
    out: OutputStream,
    err: OutputStream,
    log_file: Option<PathBuf>,
    closed: bool,
}

impl Streams {
    pub fn new(out: OutputStream, err: OutputStream) -> Self {
        Self {
            out,
            err,
            log_file: None,
            closed: false,
        }
    }

    /// Both channels redirected into `path`, truncating it
    pub fn log_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::create(path).map_err(|e| ConfigError::LogFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        let shared = OutputStream::new(BufWriter::new(file));
        Ok(Self {
            out: shared.clone(),
            err: shared,
            log_file: Some(path.to_path_buf()),
            closed: false,
        })
    }

    pub fn out(&self) -> &OutputStream {
        &self.out
    }

    pub fn err(&self) -> &OutputStream {
        &self.err
    }

    /// Log file in use, if output is redirected
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Close the log file, or flush the console; effective only once
    ///
    /// Returns `true` on the call that actually released the streams.
    pub fn close(&mut self) -> io::Result<bool> {
        if self.closed {
            return Ok(false);
        }
        self.closed = true;
        if self.log_file.is_some() {
            self.out.close()?;
            if !self.err.same_sink(&self.out) {
                self.err.close()?;
            }
        } else {
            self.out.flush()?;
            self.err.flush()?;
        }
        Ok(true)
    }
}
