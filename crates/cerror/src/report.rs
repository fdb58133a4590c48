//! Human-readable chain output.
//!
//! The core only formats: each node of a chain becomes one
//! `(location prefix, message)` pair, outermost first, and a [`LogSink`]
//! decides where it goes.
//!
//! ```text
//! src/profile.rs:31: loading profile
//! src/users.rs:12: user 7 missing
//! ```
//!
//! Foreign errors in a `source()` chain are reported with their display
//! text and an empty prefix.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::Write as _;

use tracing::Level;

use crate::CError;

/// Receives one `(location prefix, message)` pair per chain node.
///
/// Any `FnMut(&str, &str)` closure is a sink.
pub trait LogSink {
    fn log(&mut self, location: &str, message: &str);
}

impl<F> LogSink for F
where
    F: FnMut(&str, &str),
{
    #[inline]
    fn log(&mut self, location: &str, message: &str) {
        self(location, message)
    }
}

/// One reported node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// `"<file>:<line>: "`, or empty when the node has no frame.
    pub location: String,
    /// The node's own message.
    pub message: Cow<'a, str>,
}

/// Iterator over the report lines of an error's `source()` chain.
pub struct Lines<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let err = self.next?;
        self.next = err.source();
        Some(match err.downcast_ref::<CError>() {
            Some(node) => Line {
                location: node
                    .location()
                    .map(|frame| format!("{}: ", frame))
                    .unwrap_or_default(),
                message: Cow::Borrowed(node.message()),
            },
            None => Line {
                location: String::new(),
                message: Cow::Owned(err.to_string()),
            },
        })
    }
}

/// Report lines for `err`, outermost first.
pub fn lines<'a>(err: &'a (dyn Error + 'static)) -> Lines<'a> {
    Lines { next: Some(err) }
}

/// Feed every node of `err` to `sink`, outermost first.
pub fn log_error<S: LogSink>(err: &(dyn Error + 'static), mut sink: S) {
    for line in lines(err) {
        sink.log(&line.location, &line.message);
    }
}

/// Render the chain, one line per node, each terminated by `\n`.
///
/// ```
/// use cerror::{sprint, CError};
/// let err = CError::not_found("user 7 missing").wrap("loading profile");
/// let text = sprint(&err);
/// let lines: Vec<_> = text.lines().collect();
/// assert!(lines[0].ends_with("loading profile"));
/// assert!(lines[1].ends_with("user 7 missing"));
/// ```
pub fn sprint(err: &(dyn Error + 'static)) -> String {
    let mut out = String::new();
    log_error(err, |location: &str, message: &str| {
        let _ = writeln!(out, "{}{}", location, message);
    });
    out
}

// ── tracing ───────────────────────────────────────────────────────

/// A [`LogSink`] that emits one `tracing` event per chain node.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    pub const fn error() -> Self {
        Self::new(Level::ERROR)
    }

    pub const fn warn() -> Self {
        Self::new(Level::WARN)
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::error()
    }
}

impl LogSink for TracingSink {
    fn log(&mut self, location: &str, message: &str) {
        let location = location.trim_end_matches(": ");
        // Event levels must be constants, hence the ladder.
        if self.level == Level::ERROR {
            tracing::error!(location, "{}", message);
        } else if self.level == Level::WARN {
            tracing::warn!(location, "{}", message);
        } else if self.level == Level::INFO {
            tracing::info!(location, "{}", message);
        } else if self.level == Level::DEBUG {
            tracing::debug!(location, "{}", message);
        } else {
            tracing::trace!(location, "{}", message);
        }
    }
}

/// Log every node of `err` at `ERROR` through `tracing`.
pub fn trace_error(err: &(dyn Error + 'static)) {
    log_error(err, TracingSink::error());
}

/// Emit a single structured `ERROR` event describing `err`:
/// `status`, `code`, `error` (head message), `error_cause` (rest of the
/// chain) and `dev_message`.
pub fn record_error(err: &CError) {
    let cause = err.cause().map(ToString::to_string);
    tracing::error!(
        status = err.http_status(),
        code = err.code(),
        error = err.message(),
        error_cause = cause.as_deref(),
        dev_message = err.dev_message(),
        location = err.location().map(tracing::field::display),
        "request failed"
    );
}
