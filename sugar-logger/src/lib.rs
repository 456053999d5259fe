//! Options-driven structured logging facade over `tracing`
//!
//! This crate wraps a `tracing_subscriber` stack behind a small, sugared API:
//!
//! - **Functional options**: a logger is built from an ordered list of
//!   [`LoggerOption`]s applied over sensible defaults (JSON to stdout, info
//!   level, ISO-8601 timestamps, short caller locations).
//! - **Process-wide default**: free functions such as [`info`] and
//!   [`errorw`] log through a global logger that can be replaced atomically.
//! - **Hashed fields**: [`Logger::with_hash`] binds a redacted token instead
//!   of a sensitive value, so records stay correlatable without leaking it.
//! - **Three call shapes per level**: plain (`info`), format (`infof`) and
//!   structured key/value (`infow`).
//!
//! Encoding, output management and level filtering stay with `tracing`;
//! the facade only decides what a record contains.
//!
//! # Example
//!
//! ```rust,no_run
//! use sugar_logger::options::{add_hasher, format_console, replace_globals};
//! use sugar_logger::{fields, infof, Logger, Sha256Hasher};
//!
//! let logger = Logger::with_options(vec![
//!     format_console(),
//!     add_hasher(Sha256Hasher::with_salt("ward-7")),
//!     replace_globals(),
//! ]);
//!
//! logger
//!     .with("request_id", "r-1024")
//!     .with_hash("patient_mrn", "MRN123456")
//!     .infow("record opened", fields!["section" => "allergies"]);
//!
//! // Global mirrors use the logger installed above
//! sugar_logger::info("ready");
//! infof!("{} beds free", 12);
//! ```
//!
//! # Configuration
//!
//! A full [`LogConfig`] can replace the defaults, typically loaded from a
//! document:
//!
//! ```rust
//! use sugar_logger::{LogConfig, Level};
//!
//! let config = LogConfig::from_yaml("level: debug\nencoding: console\n").unwrap();
//! assert_eq!(config.level, Level::Debug);
//! ```

mod caller;
pub mod config;
mod encoder;
pub mod error;
pub mod field;
pub mod global;
pub mod hasher;
pub mod level;
pub mod logger;
pub mod macros;
pub mod options;
mod sink;

pub use config::*;
pub use error::*;
pub use field::Field;
pub use global::*;
pub use hasher::*;
pub use level::*;
pub use logger::*;
pub use options::LoggerOption;
