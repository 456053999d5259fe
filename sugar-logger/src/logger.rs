use crate::caller;
use crate::config::{Format, LogConfig};
use crate::encoder::{self, Record};
use crate::error::LogResult;
use crate::field::{self, Field};
use crate::global;
use crate::hasher::Hasher;
use crate::level::{AtomicLevel, Level};
use crate::options::{Builder, LoggerOption};
use crate::sink::{self, SharedWriter};
use backtrace::Backtrace;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::iter;
use std::panic::Location;
use std::sync::Arc;
use tracing::Dispatch;

/// What happens after a fatal record has been written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalAction {
    /// Exit the process with the given status
    Exit(i32),
    /// Panic with the record's message, unwinding the calling thread
    Panic,
}

impl Default for FatalAction {
    fn default() -> Self {
        FatalAction::Exit(1)
    }
}

impl FatalAction {
    /// Flush `writer` so the fatal record is out, then terminate.
    fn terminate(self, writer: &SharedWriter, message: &dyn fmt::Display) -> ! {
        writer.flush();
        match self {
            FatalAction::Exit(code) => std::process::exit(code),
            FatalAction::Panic => panic!("fatal: {}", message),
        }
    }
}

/// State shared by a built logger and every copy derived from it
struct Core {
    dispatch: Dispatch,
    writer: SharedWriter,
    level: AtomicLevel,
    config: LogConfig,
    fatal_action: FatalAction,
}

/// Structured logger delegating every write to a `tracing` dispatcher.
///
/// Loggers are cheap to clone. [`with`](Logger::with), [`with_hash`](Logger::with_hash)
/// and [`named`](Logger::named) return new values sharing the same sink; the
/// receiver never changes.
#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    name: Option<String>,
    fields: Vec<Field>,
    hasher: Option<Arc<dyn Hasher>>,
    caller_skip: usize,
    replace_globals: bool,
}

macro_rules! level_methods {
    ($level:expr, $plain:ident, $format:ident, $structured:ident) => {
        #[track_caller]
        pub fn $plain(&self, message: impl fmt::Display) {
            self.log($level, Location::caller(), &message, iter::empty::<Field>());
        }

        #[track_caller]
        pub fn $format(&self, args: fmt::Arguments<'_>) {
            self.log($level, Location::caller(), &args, iter::empty::<Field>());
        }

        #[track_caller]
        pub fn $structured<I, F>(&self, message: impl fmt::Display, fields: I)
        where
            I: IntoIterator<Item = F>,
            F: Into<Field>,
        {
            self.log($level, Location::caller(), &message, fields);
        }
    };
}

impl Logger {
    /// Build a logger from `options`, applied left to right over the defaults.
    ///
    /// A logger that cannot be built is an unrecoverable startup fault: the
    /// error goes to stderr and the process exits with status 1. Use
    /// [`try_with_options`](Logger::try_with_options) to handle it instead.
    pub fn with_options<I>(options: I) -> Logger
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        match Self::try_with_options(options) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("sugar_logger: failed to build logger: {}", e);
                std::process::exit(1)
            }
        }
    }

    pub fn try_with_options<I>(options: I) -> LogResult<Logger>
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        let mut builder = Builder::default();
        for option in options {
            option.apply(&mut builder);
        }

        let logger = Self::build(builder)?;
        if logger.replace_globals {
            global::install(logger.clone());
        }
        Ok(logger)
    }

    fn build(builder: Builder) -> LogResult<Logger> {
        let mut config = match builder.config {
            Some(config) => config,
            None => {
                let mut config = LogConfig::default();
                if let Some(format) = builder.format {
                    config.encoding = format;
                }
                config
            }
        };
        if let Some(level) = builder.level {
            config.level = level;
        }

        let writer = SharedWriter::new(match builder.writer {
            Some(writer) => writer,
            None => sink::open(&config.output_paths)?,
        });
        let level = AtomicLevel::new(config.level);
        let dispatch = encoder::build_dispatch(&config, writer.clone(), level.clone());
        let fields = config
            .initial_fields
            .iter()
            .map(|(key, value)| Field::new(key.clone(), value))
            .collect();

        Ok(Logger {
            core: Arc::new(Core {
                dispatch,
                writer,
                level,
                config,
                fatal_action: builder.fatal_action,
            }),
            name: builder.name,
            fields,
            hasher: builder.hasher,
            caller_skip: builder.caller_skip,
            replace_globals: builder.replace_globals,
        })
    }

    /// A copy with one more bound field.
    pub fn with(&self, key: impl Into<String>, value: impl Serialize) -> Logger {
        self.with_fields(iter::once(Field::new(key, value)))
    }

    pub fn with_fields<I, F>(&self, fields: I) -> Logger
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        let mut derived = self.clone();
        derived.fields.extend(fields.into_iter().map(Into::into));
        derived
    }

    /// A copy binding the redacted form of `value` under `key`.
    ///
    /// The logger's own hasher is used, else the global one. With neither,
    /// the field is dropped and an unchanged copy is returned.
    pub fn with_hash(&self, key: impl Into<String>, value: impl Serialize) -> Logger {
        let hasher = match self.hasher.clone().or_else(global::global_hasher) {
            Some(hasher) => hasher,
            None => return self.clone(),
        };
        let field = Field::new(key, value);
        let redacted = hasher.hash(field.value());
        self.with(field.key(), redacted)
    }

    /// A copy with `name` appended to the logger name, dot-separated.
    /// An empty segment leaves the name as it is.
    pub fn named(&self, name: impl AsRef<str>) -> Logger {
        let name = name.as_ref();
        let mut derived = self.clone();
        if name.is_empty() {
            return derived;
        }
        derived.name = Some(match &self.name {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.to_string(),
        });
        derived
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn format(&self) -> Format {
        self.core.config.encoding
    }

    pub fn caller_skip(&self) -> usize {
        self.caller_skip
    }

    pub fn replaces_globals(&self) -> bool {
        self.replace_globals
    }

    pub fn has_hasher(&self) -> bool {
        self.hasher.is_some()
    }

    /// Configuration the sink was built from
    pub fn config(&self) -> &LogConfig {
        &self.core.config
    }

    pub fn level(&self) -> Level {
        self.core.level.level()
    }

    /// Change the minimum level for this logger and every copy sharing its sink.
    pub fn set_level(&self, level: Level) {
        self.core.level.set_level(level);
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.core.level.enabled(level)
    }

    pub(crate) fn dispatch(&self) -> &Dispatch {
        &self.core.dispatch
    }

    level_methods!(Level::Debug, debug, debugf, debugw);
    level_methods!(Level::Info, info, infof, infow);
    level_methods!(Level::Warn, warn, warnf, warnw);
    level_methods!(Level::Error, error, errorf, errorw);

    /// Log at fatal level, then terminate (see [`FatalAction`]).
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.log(Level::Fatal, Location::caller(), &message, iter::empty::<Field>());
        self.core.fatal_action.terminate(&self.core.writer, &message)
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.log(Level::Fatal, Location::caller(), &args, iter::empty::<Field>());
        self.core.fatal_action.terminate(&self.core.writer, &args)
    }

    #[track_caller]
    pub fn fatalw<I, F>(&self, message: impl fmt::Display, fields: I) -> !
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        self.log(Level::Fatal, Location::caller(), &message, fields);
        self.core.fatal_action.terminate(&self.core.writer, &message)
    }

    fn log<I, F>(
        &self,
        level: Level,
        location: &'static Location<'static>,
        message: &dyn fmt::Display,
        fields: I,
    ) where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        if !self.enabled(level) {
            return;
        }

        let call_fields: Vec<Field> = fields.into_iter().map(Into::into).collect();
        let config = &self.core.config;

        let caller = if config.disable_caller {
            None
        } else {
            Some(caller::resolve(location, self.caller_skip))
        };
        let stacktrace = match config.stacktrace_level {
            Some(threshold) if level >= threshold => Some(format!("{:?}", Backtrace::new())),
            _ => None,
        };
        let fields = Value::Object(field::to_object(self.fields.iter().chain(call_fields.iter())))
            .to_string();
        let message = message.to_string();

        let record = Record {
            level,
            message: &message,
            name: self.name.as_deref(),
            caller: caller.as_deref(),
            fields: &fields,
            stacktrace: stacktrace.as_deref(),
        };
        tracing::dispatcher::with_default(&self.core.dispatch, || record.dispatch());
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("format", &self.format())
            .field("level", &self.level())
            .field("caller_skip", &self.caller_skip)
            .field("has_hasher", &self.has_hasher())
            .field("replace_globals", &self.replace_globals)
            .finish()
    }
}
