//! Record encoding on top of `tracing_subscriber`'s fmt layer.
//!
//! Facade records travel as ordinary `tracing` events whose fields carry the
//! level, caller, bound fields and stack trace. [`EventEncoder`] is the
//! `FormatEvent` that turns them back into JSON or console lines. Events from
//! plain `tracing` macros that reach the same subscriber are encoded the same
//! way, with their fields as structured fields.

use crate::caller;
use crate::config::{CallerEncoding, EncoderConfig, Format, LevelEncoding, LogConfig, TimeEncoding};
use crate::level::{AtomicLevel, Level};
use crate::sink::SharedWriter;
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field as TracingField, Visit};
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Target of every event emitted by the facade
pub(crate) const TARGET: &str = "sugar_logger";

const FIELD_MESSAGE: &str = "message";
const FIELD_LEVEL: &str = "sugar.level";
const FIELD_NAME: &str = "sugar.logger";
const FIELD_CALLER: &str = "sugar.caller";
const FIELD_FIELDS: &str = "sugar.fields";
const FIELD_STACKTRACE: &str = "sugar.stacktrace";

/// One facade record, ready to hand to the dispatcher
pub(crate) struct Record<'a> {
    pub level: Level,
    pub message: &'a str,
    pub name: Option<&'a str>,
    pub caller: Option<&'a str>,
    /// Bound and call-site fields as a JSON object
    pub fields: &'a str,
    pub stacktrace: Option<&'a str>,
}

macro_rules! record_event {
    ($level:expr, $record:expr) => {
        tracing::event!(
            target: TARGET,
            $level,
            message = $record.message,
            sugar.level = $record.level.as_str(),
            sugar.logger = $record.name,
            sugar.caller = $record.caller,
            sugar.fields = $record.fields,
            sugar.stacktrace = $record.stacktrace
        )
    };
}

impl Record<'_> {
    /// Emit through the current default dispatcher.
    pub(crate) fn dispatch(&self) {
        // event! needs a constant level for its static callsite
        match self.level {
            Level::Debug => record_event!(tracing::Level::DEBUG, self),
            Level::Info => record_event!(tracing::Level::INFO, self),
            Level::Warn => record_event!(tracing::Level::WARN, self),
            Level::Error | Level::Fatal => record_event!(tracing::Level::ERROR, self),
        }
    }
}

/// Build the subscriber stack for one logger: a registry with a fmt layer
/// using [`EventEncoder`], filtered by the shared atomic level.
pub(crate) fn build_dispatch(config: &LogConfig, writer: SharedWriter, level: AtomicLevel) -> Dispatch {
    let filter = filter_fn(move |metadata| {
        metadata.target() == TARGET || level.enabled(Level::from_tracing(metadata.level()))
    });

    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .event_format(EventEncoder::new(config))
        .with_filter(filter);

    Dispatch::new(tracing_subscriber::registry().with(layer))
}

pub(crate) struct EventEncoder {
    format: Format,
    encoder: EncoderConfig,
}

impl EventEncoder {
    pub(crate) fn new(config: &LogConfig) -> Self {
        Self {
            format: config.encoding,
            encoder: config.encoder.clone(),
        }
    }

    fn encode_level(&self, level: Level) -> &'static str {
        match self.encoder.level_encoding {
            LevelEncoding::Lowercase => level.as_str(),
            LevelEncoding::Capital => level.as_capital_str(),
        }
    }

    fn encode_time(&self, now: DateTime<Local>) -> Value {
        match self.encoder.time_encoding {
            TimeEncoding::Iso8601 => Value::String(now.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()),
            TimeEncoding::Rfc3339 => Value::String(now.to_rfc3339()),
            TimeEncoding::Epoch => Value::from(now.timestamp_millis() as f64 / 1000.0),
            TimeEncoding::EpochMillis => Value::from(now.timestamp_millis()),
        }
    }

    fn encode_caller<'a>(&self, caller: &'a str) -> &'a str {
        match self.encoder.caller_encoding {
            CallerEncoding::Short => caller::trim_path(caller),
            CallerEncoding::Full => caller,
        }
    }

    /// Field keys the record header owns. A user field with one of these
    /// names is moved under `fields.<key>` so the header value survives.
    fn is_reserved(&self, key: &str) -> bool {
        let encoder = &self.encoder;
        [
            &encoder.message_key,
            &encoder.level_key,
            &encoder.time_key,
            &encoder.name_key,
            &encoder.caller_key,
            &encoder.stacktrace_key,
        ]
        .iter()
        .any(|reserved| !reserved.is_empty() && reserved.as_str() == key)
    }

    fn encode_json(&self, entry: Entry) -> Result<String, fmt::Error> {
        let encoder = &self.encoder;
        let mut object = Map::new();

        put(&mut object, &encoder.level_key, Value::from(self.encode_level(entry.level)));
        put(&mut object, &encoder.time_key, self.encode_time(Local::now()));
        if let Some(name) = entry.name {
            put(&mut object, &encoder.name_key, Value::String(name));
        }
        if let Some(caller) = entry.caller.as_deref() {
            put(&mut object, &encoder.caller_key, Value::from(self.encode_caller(caller)));
        }
        put(&mut object, &encoder.message_key, Value::String(entry.message));
        for (key, value) in entry.fields {
            let key = if self.is_reserved(&key) {
                format!("fields.{}", key)
            } else {
                key
            };
            object.insert(key, value);
        }
        if let Some(stacktrace) = entry.stacktrace {
            put(&mut object, &encoder.stacktrace_key, Value::String(stacktrace));
        }

        let mut line = serde_json::to_string(&Value::Object(object)).map_err(|_| fmt::Error)?;
        line.push_str(&encoder.line_ending);
        Ok(line)
    }

    fn encode_console(&self, entry: Entry) -> String {
        let encoder = &self.encoder;
        let mut parts: Vec<String> = Vec::with_capacity(5);

        if !encoder.time_key.is_empty() {
            match self.encode_time(Local::now()) {
                Value::String(time) => parts.push(time),
                other => parts.push(other.to_string()),
            }
        }
        if !encoder.level_key.is_empty() {
            parts.push(self.encode_level(entry.level).to_string());
        }
        if let Some(name) = entry.name.filter(|_| !encoder.name_key.is_empty()) {
            parts.push(name);
        }
        if let Some(caller) = entry.caller.as_deref().filter(|_| !encoder.caller_key.is_empty()) {
            parts.push(self.encode_caller(caller).to_string());
        }
        if !encoder.message_key.is_empty() {
            parts.push(entry.message);
        }

        let mut line = parts.join(&encoder.console_separator);
        if !entry.fields.is_empty() {
            line.push_str(&encoder.console_separator);
            line.push_str(&Value::Object(entry.fields).to_string());
        }
        if let Some(stacktrace) = entry.stacktrace.filter(|_| !encoder.stacktrace_key.is_empty()) {
            line.push('\n');
            line.push_str(&stacktrace);
        }
        line.push_str(&encoder.line_ending);
        line
    }
}

fn put(object: &mut Map<String, Value>, key: &str, value: Value) {
    if !key.is_empty() {
        object.insert(key.to_string(), value);
    }
}

impl<S, N> FormatEvent<S, N> for EventEncoder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let from_facade = metadata.target() == TARGET;
        let caller = if from_facade {
            visitor.caller
        } else {
            match (metadata.file(), metadata.line()) {
                (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
                _ => None,
            }
        };

        let entry = Entry {
            level: visitor
                .level
                .unwrap_or_else(|| Level::from_tracing(metadata.level())),
            message: visitor.message.unwrap_or_default(),
            name: visitor.name,
            caller,
            fields: visitor.fields,
            stacktrace: visitor.stacktrace,
        };

        let line = match self.format {
            Format::Json => self.encode_json(entry)?,
            Format::Console => self.encode_console(entry),
        };
        writer.write_str(&line)
    }
}

/// A decoded event, owned so the encoders can move pieces into the output.
struct Entry {
    level: Level,
    message: String,
    name: Option<String>,
    caller: Option<String>,
    fields: Map<String, Value>,
    stacktrace: Option<String>,
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    level: Option<Level>,
    name: Option<String>,
    caller: Option<String>,
    fields: Map<String, Value>,
    stacktrace: Option<String>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        match field.name() {
            FIELD_MESSAGE => self.message = Some(value.to_string()),
            FIELD_LEVEL => self.level = value.parse().ok(),
            FIELD_NAME => self.name = Some(value.to_string()),
            FIELD_CALLER => self.caller = Some(value.to_string()),
            FIELD_STACKTRACE => self.stacktrace = Some(value.to_string()),
            FIELD_FIELDS => {
                if let Ok(Value::Object(fields)) = serde_json::from_str(value) {
                    self.fields.extend(fields);
                }
            }
            other => {
                self.fields.insert(other.to_string(), Value::from(value));
            }
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == FIELD_MESSAGE {
            self.message = Some(text);
        } else {
            self.fields.insert(field.name().to_string(), Value::String(text));
        }
    }
}
