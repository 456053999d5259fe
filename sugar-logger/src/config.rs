//! Logger configuration
//!
//! [`LogConfig`] is the full encoder and output configuration handed to the
//! sink builder. Every field has a default, so partial documents load fine:
//!
//! ```yaml
//! level: debug
//! encoding: console
//! output_paths: ["stderr", "/var/log/app/app.log"]
//! encoder:
//!   time_encoding: rfc3339
//!   caller_encoding: full
//! initial_fields:
//!   service: billing
//! ```

use crate::error::{LogError, LogResult};
use crate::level::Level;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Output encoding
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Console,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => f.write_str("json"),
            Format::Console => f.write_str("console"),
        }
    }
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> LogResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "console" | "text" => Ok(Format::Console),
            _ => Err(LogError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelEncoding {
    /// `info`
    Lowercase,
    /// `INFO`
    Capital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEncoding {
    /// `2024-03-01T12:30:45.123+0100`
    Iso8601,
    /// `2024-03-01T12:30:45+01:00`
    Rfc3339,
    /// Floating-point seconds since the Unix epoch
    Epoch,
    /// Integer milliseconds since the Unix epoch
    EpochMillis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerEncoding {
    /// Last directory plus file name, e.g. `src/main.rs:42`
    Short,
    /// Path exactly as the compiler recorded it
    Full,
}

/// Keys and value encoders for a record. An empty key omits that element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,
    pub console_separator: String,
    pub level_encoding: LevelEncoding,
    pub time_encoding: TimeEncoding,
    pub caller_encoding: CallerEncoding,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            message_key: "msg".to_string(),
            level_key: "level".to_string(),
            time_key: "time".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: "\n".to_string(),
            console_separator: "\t".to_string(),
            level_encoding: LevelEncoding::Lowercase,
            time_encoding: TimeEncoding::Iso8601,
            caller_encoding: CallerEncoding::Short,
        }
    }
}

/// Full logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum enabled level
    pub level: Level,
    pub encoding: Format,
    /// `stdout`, `stderr`, a file path or a `file://` URL
    pub output_paths: Vec<String>,
    pub disable_caller: bool,
    /// Records at or above this level carry a stack trace
    pub stacktrace_level: Option<Level>,
    pub encoder: EncoderConfig,
    /// Fields bound to every record
    pub initial_fields: Map<String, Value>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::default(),
            encoding: Format::default(),
            output_paths: vec!["stdout".to_string()],
            disable_caller: false,
            stacktrace_level: Some(Level::Fatal),
            encoder: EncoderConfig::default(),
            initial_fields: Map::new(),
        }
    }
}

impl LogConfig {
    pub fn from_json(document: &str) -> LogResult<Self> {
        serde_json::from_str(document).map_err(|e| LogError::Configuration(e.to_string()))
    }

    pub fn from_yaml(document: &str) -> LogResult<Self> {
        serde_yaml::from_str(document).map_err(|e| LogError::Configuration(e.to_string()))
    }

    pub fn with_encoding(mut self, encoding: Format) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_output_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_initial_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.initial_fields.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.encoding, Format::Json);
        assert_eq!(config.output_paths, vec!["stdout".to_string()]);
        assert_eq!(config.stacktrace_level, Some(Level::Fatal));
        assert_eq!(config.encoder.time_encoding, TimeEncoding::Iso8601);
        assert_eq!(config.encoder.level_encoding, LevelEncoding::Lowercase);
        assert_eq!(config.encoder.caller_encoding, CallerEncoding::Short);
    }

    #[test]
    fn test_partial_json_document() {
        let config = LogConfig::from_json(
            r#"{"level": "debug", "encoding": "console", "encoder": {"message_key": "message"}}"#,
        )
        .unwrap();

        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.encoding, Format::Console);
        assert_eq!(config.encoder.message_key, "message");
        assert_eq!(config.encoder.level_key, "level");
        assert_eq!(config.output_paths, vec!["stdout".to_string()]);
    }

    #[test]
    fn test_yaml_document() {
        let config = LogConfig::from_yaml(
            "level: warn\noutput_paths: [stderr]\nstacktrace_level: error\ninitial_fields:\n  service: billing\n",
        )
        .unwrap();

        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.output_paths, vec!["stderr".to_string()]);
        assert_eq!(config.stacktrace_level, Some(Level::Error));
        assert_eq!(config.initial_fields["service"], "billing");
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let result = LogConfig::from_json(r#"{"level": "loud"}"#);
        assert!(matches!(result, Err(LogError::Configuration(_))));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(Format::default(), Format::Json);
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("console".parse::<Format>().unwrap(), Format::Console);
        assert!("xml".parse::<Format>().is_err());
    }
}
