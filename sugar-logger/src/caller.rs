//! Call-site resolution
//!
//! Public logging entry points are `#[track_caller]`, so the location handed
//! in already points at user code. A non-zero caller skip walks the real stack
//! instead, for wrappers around the facade that do not propagate the caller.

use backtrace::SymbolName;
use std::panic::Location;

/// Symbol prefixes belonging to the facade itself or to the unwinder.
const INTERNAL_PREFIXES: &[&str] = &[
    "backtrace::",
    "sugar_logger::caller::",
    "sugar_logger::logger::Logger",
    "sugar_logger::global::",
];

/// `file:line` of the caller, `skip` frames above the first non-facade frame.
pub(crate) fn resolve(location: &'static Location<'static>, skip: usize) -> String {
    if skip == 0 {
        return format_location(location.file(), location.line());
    }
    walk_stack(skip).unwrap_or_else(|| format_location(location.file(), location.line()))
}

/// Walk physical frames. Inlined functions share their caller's frame, so
/// each frame is judged by its outermost symbol, whose line is the call site
/// inside that frame's function. An unresolvable target frame yields `None`.
fn walk_stack(skip: usize) -> Option<String> {
    let mut remaining = skip;
    let mut found = None;

    backtrace::trace(|frame| {
        let mut outermost = None;
        backtrace::resolve_frame(frame, |symbol| {
            let internal = symbol.name().map(is_internal).unwrap_or(false);
            let location = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => Some(format_location(&file.display().to_string(), line)),
                _ => None,
            };
            outermost = Some((internal, location));
        });

        let (internal, location) = outermost.unwrap_or((false, None));
        if internal {
            return true;
        }
        if remaining > 0 {
            remaining -= 1;
            return true;
        }
        found = location;
        false
    });

    found
}

fn is_internal(name: SymbolName<'_>) -> bool {
    let name = name.to_string();
    let name = name.trim_start_matches('<');
    INTERNAL_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn format_location(file: &str, line: u32) -> String {
    format!("{}:{}", file, line)
}

/// Keep the last directory and the file name: `a/b/src/main.rs:7` -> `src/main.rs:7`.
pub(crate) fn trim_path(caller: &str) -> &str {
    let separators: &[char] = &['/', '\\'];
    match caller.rfind(separators) {
        Some(last) => match caller[..last].rfind(separators) {
            Some(previous) => &caller[previous + 1..],
            None => caller,
        },
        None => caller,
    }
}
