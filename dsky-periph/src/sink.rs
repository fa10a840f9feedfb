use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use log::warn;

use crate::error::Result;

///
/// Destination for serialized telemetry. A sink receives one JSON payload
/// per call and owns its framing.
///
pub trait TelemetrySink: Send {
    fn emit(&mut self, payload: &str) -> Result<()>;
}

/// Drops every payload.
#[derive(Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn emit(&mut self, _payload: &str) -> Result<()> {
        Ok(())
    }
}

///
/// ## WriterSink
///
/// Writes each payload as one newline terminated line and flushes, so a
/// microcontroller on the other end of a serial line sees whole frames.
///
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<std::fs::File> {
    ///
    /// # Description
    ///
    /// Opens an existing character device (a serial port already configured
    /// by the OS, e.g. `/dev/ttyACM0`) for writing. The path is never
    /// created, so a mistyped device name fails instead of filling a new
    /// regular file. Existing regular files are accepted with a warning.
    ///
    pub fn open_device<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().write(true).append(true).open(path)?;

        if !is_char_device(&file)? {
            warn!("Serial: {} is not a character device", path.display());
        }
        Ok(WriterSink::new(file))
    }
}

#[cfg(unix)]
fn is_char_device(file: &std::fs::File) -> Result<bool> {
    use std::os::unix::fs::FileTypeExt;
    Ok(file.metadata()?.file_type().is_char_device())
}

// COM ports cannot be told apart from files through std metadata.
#[cfg(not(unix))]
fn is_char_device(_file: &std::fs::File) -> Result<bool> {
    Ok(true)
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        WriterSink::new(io::stdout())
    }
}

impl<W: Write + Send> TelemetrySink for WriterSink<W> {
    fn emit(&mut self, payload: &str) -> Result<()> {
        writeln!(self.writer, "{}", payload)?;
        self.writer.flush()?;
        Ok(())
    }
}
