//! Process-wide default logger and hasher.
//!
//! Every test here swaps global state, so they run one at a time.

mod common;

use common::Capture;
use parking_lot::{const_mutex, Mutex};
use serde_json::Value;
use sugar_logger::options::{add_hasher, format_console, replace_globals};
use sugar_logger::{Format, Logger, Sha256Hasher};

static GLOBAL_STATE: Mutex<()> = const_mutex(());

fn install_capture() -> Capture {
    let capture = Capture::default();
    Logger::with_options(vec![replace_globals(), capture.option()]);
    capture
}

#[test]
fn test_replacement_redirects_global_calls() {
    let _guard = GLOBAL_STATE.lock();
    let first = install_capture();
    sugar_logger::info("to first");
    let derived_before = sugar_logger::with("phase", "before");

    let second = install_capture();
    sugar_logger::infow("to second", [("k", "v")]);
    derived_before.info("still first");

    let first_records = first.records();
    assert_eq!(first_records.len(), 2);
    assert_eq!(first_records[0]["msg"], "to first");
    assert_eq!(first_records[1]["msg"], "still first");
    assert_eq!(first_records[1]["phase"], "before");

    let second_records = second.records();
    assert_eq!(second_records.len(), 1);
    assert_eq!(second_records[0]["msg"], "to second");
    assert_eq!(second_records[0]["k"], "v");
}

#[test]
fn test_global_with_leaves_default_untouched() {
    let _guard = GLOBAL_STATE.lock();
    let capture = install_capture();

    let derived = sugar_logger::with("order", 17);
    derived.info("derived");
    sugar_logger::warn("plain");

    let records = capture.records();
    assert_eq!(records[0]["order"], 17);
    assert!(!records[1].contains_key("order"));
    assert!(sugar_logger::global().fields().is_empty());
}

#[test]
fn test_global_calls_report_caller_site() {
    let _guard = GLOBAL_STATE.lock();
    let capture = install_capture();

    let line = line!() + 1;
    sugar_logger::error("where");
    sugar_logger::errorf!("at {}", "macro");

    let records = capture.records();
    assert_eq!(
        records[0]["caller"],
        format!("tests/global_tests.rs:{}", line)
    );
    assert_eq!(records[1]["msg"], "at macro");
    assert_eq!(
        records[1]["caller"],
        format!("tests/global_tests.rs:{}", line + 1)
    );
}

#[test]
fn test_global_hasher_fallback() {
    let _guard = GLOBAL_STATE.lock();
    let capture = install_capture();

    sugar_logger::set_global_hasher(Sha256Hasher::new());
    let from_global = sugar_logger::with_hash("email", "a@b.io");
    from_global.info("global hasher");

    let own = Logger::with_options(vec![
        add_hasher(|_: &Value| "instance".to_string()),
        capture.option(),
    ]);
    own.with_hash("email", "a@b.io").info("own hasher");

    sugar_logger::clear_global_hasher();
    let unhashed = sugar_logger::with_hash("email", "a@b.io");
    unhashed.info("no hasher");

    let records = capture.records();
    let expected = sugar_logger::Hasher::hash(&Sha256Hasher::new(), &Value::from("a@b.io"));
    assert_eq!(records[0]["email"], expected);
    assert_eq!(records[1]["email"], "instance");
    assert!(!records[2].contains_key("email"));
    assert!(!capture.text().contains("a@b.io"));
}

#[test]
fn test_format_rebuilds() {
    let _guard = GLOBAL_STATE.lock();

    sugar_logger::console_global_logger();
    assert_eq!(sugar_logger::global().format(), Format::Console);
    assert!(sugar_logger::global().replaces_globals());

    sugar_logger::json_global_logger();
    assert_eq!(sugar_logger::global().format(), Format::Json);

    let capture = Capture::default();
    let console = Logger::with_options(vec![format_console(), capture.option()]);
    sugar_logger::replace_global(console);
    sugar_logger::named("jobs").debug("hidden");
    sugar_logger::named("jobs").info("visible");

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("\tjobs\t"));
}
