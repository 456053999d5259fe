//! Output path resolution
//!
//! `stdout` and `stderr` map to the process streams; anything else is a file
//! opened in append mode through `tracing-appender`. Several paths are teed.

use crate::error::{LogError, LogResult};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::Metadata;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;

/// A logger's writer, shared between its fmt layer and the logger itself so
/// the logger can flush before the process goes away.
#[derive(Clone)]
pub(crate) struct SharedWriter(Arc<BoxMakeWriter>);

impl SharedWriter {
    pub(crate) fn new(writer: BoxMakeWriter) -> Self {
        Self(Arc::new(writer))
    }

    pub(crate) fn flush(&self) {
        let _ = self.0.as_ref().make_writer().flush();
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        self.0.as_ref().make_writer()
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.0.as_ref().make_writer_for(meta)
    }
}

pub(crate) fn open(paths: &[String]) -> LogResult<BoxMakeWriter> {
    let mut combined: Option<BoxMakeWriter> = None;
    for path in paths {
        let next = open_path(path)?;
        combined = Some(match combined {
            Some(previous) => BoxMakeWriter::new(previous.and(next)),
            None => next,
        });
    }
    Ok(combined.unwrap_or_else(|| BoxMakeWriter::new(io::sink)))
}

fn open_path(path: &str) -> LogResult<BoxMakeWriter> {
    match path.trim() {
        "" => Err(LogError::InvalidOutput(path.to_string())),
        "stdout" => Ok(BoxMakeWriter::new(io::stdout)),
        "stderr" => Ok(BoxMakeWriter::new(io::stderr)),
        other => open_file(other.strip_prefix("file://").unwrap_or(other)),
    }
}

fn open_file(path: &str) -> LogResult<BoxMakeWriter> {
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LogError::InvalidOutput(path.display().to_string()))?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|e| LogError::OutputInit {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    Ok(BoxMakeWriter::new(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_streams() {
        assert!(open(&["stdout".to_string(), "stderr".to_string()]).is_ok());
        assert!(open(&[]).is_ok());
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let result = open(&["stdout".to_string(), "  ".to_string()]);
        assert!(matches!(result, Err(LogError::InvalidOutput(_))));
    }

    #[test]
    fn test_file_under_regular_file_fails() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let path = blocker.path().join("app.log");
        let result = open(&[path.display().to_string()]);
        assert!(matches!(result, Err(LogError::OutputInit { .. })));
    }

    /// Holds writes back until flushed.
    #[derive(Clone, Default)]
    struct Buffered(Arc<parking_lot::Mutex<(Vec<u8>, Vec<u8>)>>);

    impl Write for Buffered {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            let mut state = self.0.lock();
            let pending = std::mem::take(&mut state.0);
            state.1.extend(pending);
            Ok(())
        }
    }

    #[test]
    fn test_shared_writer_flushes_underlying_writer() {
        let buffered = Buffered::default();
        let handle = buffered.clone();
        let shared = SharedWriter::new(BoxMakeWriter::new(move || handle.clone()));

        shared.make_writer().write_all(b"record").unwrap();
        assert!(buffered.0.lock().1.is_empty());

        shared.flush();
        assert_eq!(buffered.0.lock().1, b"record");
    }

    #[test]
    fn test_file_url_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        open(&[format!("file://{}", path.display())]).unwrap();
        assert!(path.exists());
    }
}
