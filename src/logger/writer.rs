//! Log sinks
//!
//! Two line-oriented streams: access/info and error/warning. Each goes to the
//! console or to a file opened in append mode.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::config::{AccessLogFormat, LogLevel};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Where one stream's lines end up
enum Sink {
    Stdout,
    Stderr,
    File(Mutex<LineWriter<File>>),
}

impl Sink {
    /// File sink when a path is configured, `console` otherwise
    fn open(path: Option<&str>, console: Self) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(console);
        };

        if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::File(Mutex::new(LineWriter::new(file))))
    }

    /// Write errors are dropped; there is nowhere left to report them.
    fn write_line(&self, line: &str) {
        let _ = match self {
            Self::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Self::Stderr => writeln!(io::stderr().lock(), "{line}"),
            Self::File(file) => {
                writeln!(file.lock().unwrap_or_else(PoisonError::into_inner), "{line}")
            }
        };
    }
}

pub struct LogWriter {
    access: Sink,
    error: Sink,
    level: LogLevel,
    access_format: AccessLogFormat,
}

impl LogWriter {
    fn new(
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
        level: LogLevel,
        access_format: AccessLogFormat,
    ) -> io::Result<Self> {
        Ok(Self {
            access: Sink::open(access_log_file, Sink::Stdout)?,
            error: Sink::open(error_log_file, Sink::Stderr)?,
            level,
            access_format,
        })
    }

    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }

    pub const fn level(&self) -> LogLevel {
        self.level
    }

    pub const fn access_format(&self) -> AccessLogFormat {
        self.access_format
    }
}

/// Install the process-wide writer. Fails if a log file cannot be opened or
/// the writer is already installed.
pub fn init(
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
    level: LogLevel,
    access_format: AccessLogFormat,
) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file, level, access_format)?;
    LOG_WRITER
        .set(writer)
        .map_err(|_| io::Error::other("logger initialized twice"))
}

pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_appends_lines() {
        let dir = std::env::temp_dir().join(format!("reaction-badge-writer-{}", std::process::id()));
        let path = dir.join("nested/access.log");
        let _ = std::fs::remove_dir_all(&dir);

        let writer = LogWriter::new(
            Some(path.to_str().unwrap()),
            None,
            LogLevel::Warn,
            AccessLogFormat::Json,
        )
        .unwrap();
        writer.write_access("first");
        writer.write_access("second");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        assert_eq!(writer.level(), LogLevel::Warn);
        assert_eq!(writer.access_format(), AccessLogFormat::Json);
    }

    #[test]
    fn test_console_sink_without_path() {
        assert!(matches!(Sink::open(None, Sink::Stderr).unwrap(), Sink::Stderr));
    }
}
