//! Construction options
//!
//! Options are applied in order to a [`Builder`] before the sink is built.
//! Options touching the same setting follow last-writer-wins, except
//! [`add_caller_skip`], which accumulates.

use crate::config::{Format, LogConfig};
use crate::hasher::Hasher;
use crate::level::Level;
use crate::logger::FatalAction;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

/// A configuration mutation applied while building a [`Logger`](crate::Logger)
pub struct LoggerOption(Box<dyn FnOnce(&mut Builder) + Send>);

impl LoggerOption {
    fn new(apply: impl FnOnce(&mut Builder) + Send + 'static) -> Self {
        Self(Box::new(apply))
    }

    pub(crate) fn apply(self, builder: &mut Builder) {
        (self.0)(builder)
    }
}

impl std::fmt::Debug for LoggerOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LoggerOption")
    }
}

/// Mutable state the options are reduced into
#[derive(Default)]
pub(crate) struct Builder {
    pub format: Option<Format>,
    pub caller_skip: usize,
    pub hasher: Option<Arc<dyn Hasher>>,
    pub config: Option<LogConfig>,
    pub replace_globals: bool,
    pub level: Option<Level>,
    pub name: Option<String>,
    pub writer: Option<BoxMakeWriter>,
    pub fatal_action: FatalAction,
}

/// Encode records as JSON objects (the default).
pub fn format_json() -> LoggerOption {
    LoggerOption::new(|builder| builder.format = Some(Format::Json))
}

/// Encode records as tab-separated console lines.
pub fn format_console() -> LoggerOption {
    LoggerOption::new(|builder| builder.format = Some(Format::Console))
}

/// Skip `skip` more stack frames when reporting the call site.
///
/// Each frame is one non-inlined function above the facade, so a wrapper
/// that should be skipped needs `#[inline(never)]`. Resolving frames needs
/// line tables: in a build without debug info (the default release profile)
/// the call site handed to the facade is reported unchanged.
pub fn add_caller_skip(skip: usize) -> LoggerOption {
    LoggerOption::new(move |builder| builder.caller_skip += skip)
}

/// Hasher used by [`Logger::with_hash`](crate::Logger::with_hash) ahead of the global one.
pub fn add_hasher(hasher: impl Hasher + 'static) -> LoggerOption {
    let hasher: Arc<dyn Hasher> = Arc::new(hasher);
    LoggerOption::new(move |builder| builder.hasher = Some(hasher))
}

/// Replace the whole default configuration. Format options are then ignored.
pub fn with_config(config: LogConfig) -> LoggerOption {
    LoggerOption::new(move |builder| builder.config = Some(config))
}

/// Install the built logger as the process-wide default.
pub fn replace_globals() -> LoggerOption {
    LoggerOption::new(|builder| builder.replace_globals = true)
}

/// Override the minimum level, whichever configuration is in effect.
pub fn with_level(level: Level) -> LoggerOption {
    LoggerOption::new(move |builder| builder.level = Some(level))
}

pub fn with_name(name: impl Into<String>) -> LoggerOption {
    let name = name.into();
    LoggerOption::new(move |builder| builder.name = Some(name))
}

/// Write records to `writer` instead of the configured output paths.
pub fn with_writer<W>(writer: W) -> LoggerOption
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let writer = BoxMakeWriter::new(writer);
    LoggerOption::new(move |builder| builder.writer = Some(writer))
}

/// What `fatal*` calls do once the record is written.
pub fn on_fatal(action: FatalAction) -> LoggerOption {
    LoggerOption::new(move |builder| builder.fatal_action = action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce(options: Vec<LoggerOption>) -> Builder {
        let mut builder = Builder::default();
        for option in options {
            option.apply(&mut builder);
        }
        builder
    }

    #[test]
    fn test_caller_skip_accumulates() {
        let builder = reduce(vec![add_caller_skip(1), add_caller_skip(2), add_caller_skip(0)]);
        assert_eq!(builder.caller_skip, 3);
    }

    #[test]
    fn test_last_writer_wins() {
        let builder = reduce(vec![
            format_console(),
            with_config(LogConfig::default().with_level(Level::Debug)),
            format_json(),
            with_config(LogConfig::default().with_level(Level::Error)),
            with_name("first"),
            with_name("second"),
        ]);

        assert_eq!(builder.format, Some(Format::Json));
        assert_eq!(builder.config.map(|c| c.level), Some(Level::Error));
        assert_eq!(builder.name.as_deref(), Some("second"));
        assert!(!builder.replace_globals);
    }

    #[test]
    fn test_hasher_and_flags() {
        let builder = reduce(vec![
            add_hasher(|_: &serde_json::Value| "x".to_string()),
            replace_globals(),
            on_fatal(FatalAction::Panic),
        ]);
        assert!(builder.hasher.is_some());
        assert!(builder.replace_globals);
        assert_eq!(builder.fatal_action, FatalAction::Panic);
    }
}
