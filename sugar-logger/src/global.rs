//! Process-wide default logger and hasher
//!
//! The default logger is created lazily on first use with default options
//! (JSON to stdout at info level). It can be replaced at any time, either by
//! building a logger with [`replace_globals`](crate::options::replace_globals)
//! or through [`replace_global`]. Replacement is an atomic pointer swap:
//!
//! - a call that already loaded the old logger finishes on it,
//! - every later global call sees the new one,
//! - loggers derived before the swap keep writing to their original sink.
//!
//! The free functions here are `#[track_caller]`, so records report the
//! caller's location without any caller skip.
//!
//! The first install also registers `tracing`'s global default: a dispatcher
//! that forwards every plain `tracing` event to whichever logger is the
//! default at that moment.

use crate::field::Field;
use crate::hasher::Hasher;
use crate::logger::Logger;
use crate::options::{format_console, format_json, replace_globals};
use arc_swap::ArcSwap;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Once};
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

lazy_static! {
    static ref GLOBAL_LOGGER: ArcSwap<Logger> =
        ArcSwap::from_pointee(Logger::with_options(Vec::new()));
    static ref GLOBAL_HASHER: RwLock<Option<Arc<dyn Hasher>>> = RwLock::new(None);
}

static FORWARD_TRACING: Once = Once::new();

/// Hands plain `tracing` events to the current default logger's dispatcher.
struct ForwardToGlobal;

impl<S: Subscriber> Layer<S> for ForwardToGlobal {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let logger = GLOBAL_LOGGER.load();
        let dispatch = logger.dispatch();
        // the level filter records its decision in `enabled`, so ask first
        if dispatch.enabled(event.metadata()) {
            dispatch.event(event);
        }
    }
}

/// Install `logger` as the process-wide default.
///
/// The first install registers [`ForwardToGlobal`] as `tracing`'s global
/// default. tracing accepts one global default per process, so the forwarder
/// resolves the current logger per event instead of pinning the first one.
pub(crate) fn install(logger: Logger) {
    GLOBAL_LOGGER.store(Arc::new(logger));
    FORWARD_TRACING.call_once(|| {
        let forwarder = Dispatch::new(tracing_subscriber::registry().with(ForwardToGlobal));
        // another subscriber may own the global default already
        let _ = tracing::dispatcher::set_global_default(forwarder);
    });
}

/// The current process-wide default logger.
pub fn global() -> Logger {
    Logger::clone(&GLOBAL_LOGGER.load())
}

pub fn replace_global(logger: Logger) {
    install(logger);
}

/// Rebuild the default logger with JSON encoding.
pub fn json_global_logger() {
    Logger::with_options(vec![replace_globals(), format_json()]);
}

/// Rebuild the default logger with console encoding.
pub fn console_global_logger() {
    Logger::with_options(vec![replace_globals(), format_console()]);
}

/// Hasher used by `with_hash` when a logger has none of its own.
pub fn set_global_hasher(hasher: impl Hasher + 'static) {
    *GLOBAL_HASHER.write() = Some(Arc::new(hasher));
}

pub fn clear_global_hasher() {
    *GLOBAL_HASHER.write() = None;
}

pub(crate) fn global_hasher() -> Option<Arc<dyn Hasher>> {
    GLOBAL_HASHER.read().clone()
}

/// Build a logger from options; see [`Logger::with_options`].
pub fn with_options<I>(options: I) -> Logger
where
    I: IntoIterator<Item = crate::options::LoggerOption>,
{
    Logger::with_options(options)
}

/// Derive from the default logger; the stored default is not changed.
pub fn with(key: impl Into<String>, value: impl Serialize) -> Logger {
    GLOBAL_LOGGER.load().with(key, value)
}

pub fn with_hash(key: impl Into<String>, value: impl Serialize) -> Logger {
    GLOBAL_LOGGER.load().with_hash(key, value)
}

pub fn named(name: impl AsRef<str>) -> Logger {
    GLOBAL_LOGGER.load().named(name)
}

macro_rules! global_level_fns {
    ($plain:ident, $format:ident, $structured:ident) => {
        #[track_caller]
        pub fn $plain(message: impl fmt::Display) {
            GLOBAL_LOGGER.load().$plain(message)
        }

        #[track_caller]
        pub fn $format(args: fmt::Arguments<'_>) {
            GLOBAL_LOGGER.load().$format(args)
        }

        #[track_caller]
        pub fn $structured<I, F>(message: impl fmt::Display, fields: I)
        where
            I: IntoIterator<Item = F>,
            F: Into<Field>,
        {
            GLOBAL_LOGGER.load().$structured(message, fields)
        }
    };
}

global_level_fns!(debug, debugf, debugw);
global_level_fns!(info, infof, infow);
global_level_fns!(warn, warnf, warnw);
global_level_fns!(error, errorf, errorw);

#[track_caller]
pub fn fatal(message: impl fmt::Display) -> ! {
    GLOBAL_LOGGER.load_full().fatal(message)
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    GLOBAL_LOGGER.load_full().fatalf(args)
}

#[track_caller]
pub fn fatalw<I, F>(message: impl fmt::Display, fields: I) -> !
where
    I: IntoIterator<Item = F>,
    F: Into<Field>,
{
    GLOBAL_LOGGER.load_full().fatalw(message, fields)
}
