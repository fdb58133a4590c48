use std::error::Error;
use std::io;

use crate::stack::Stack;
use crate::{CError, CResult, HttpStatus};

// ── io::ErrorKind classification ──────────────────────────────────

/// Maps `io::ErrorKind` to a status. Kinds with no obvious HTTP meaning
/// stay unclassified.
fn io_status(kind: io::ErrorKind) -> Option<HttpStatus> {
    match kind {
        io::ErrorKind::NotFound          => Some(HttpStatus::NotFound),
        io::ErrorKind::PermissionDenied  => Some(HttpStatus::Forbidden),
        io::ErrorKind::InvalidInput      => Some(HttpStatus::BadRequest),
        io::ErrorKind::InvalidData       => Some(HttpStatus::BadRequest),
        io::ErrorKind::TimedOut          => Some(HttpStatus::Timeout),
        io::ErrorKind::WouldBlock        => Some(HttpStatus::Unavailable),
        io::ErrorKind::ConnectionRefused => Some(HttpStatus::Unavailable),
        io::ErrorKind::ConnectionReset   => Some(HttpStatus::Unavailable),
        io::ErrorKind::ConnectionAborted => Some(HttpStatus::Unavailable),
        io::ErrorKind::NotConnected      => Some(HttpStatus::Unavailable),
        io::ErrorKind::AddrNotAvailable  => Some(HttpStatus::Unavailable),
        io::ErrorKind::BrokenPipe        => Some(HttpStatus::Unavailable),
        io::ErrorKind::Unsupported       => Some(HttpStatus::NotImplemented),
        _                                => None,
    }
}

// ── Foreign errors ────────────────────────────────────────────────

impl CError {
    /// Convert any `std::error::Error` into a chain.
    ///
    /// A `CError` (possibly boxed) is returned unchanged. Anything else
    /// becomes an unclassified head carrying its display text and the
    /// caller's stack, followed by one frameless unclassified node per
    /// `source()` link.
    #[track_caller]
    pub fn from_std<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::from_boxed(Box::new(err))
    }

    /// Same as [`from_std`](CError::from_std) for an already boxed error.
    #[track_caller]
    pub fn from_boxed(err: Box<dyn Error + Send + Sync + 'static>) -> Self {
        let foreign = match err.downcast::<CError>() {
            Ok(cerr) => return *cerr,
            Err(foreign) => foreign,
        };
        match foreign.downcast::<io::Error>() {
            Ok(io_err) => CError::from(*io_err),
            Err(other) => fold_foreign(&*other, Stack::capture()),
        }
    }
}

fn fold_foreign(err: &(dyn Error + 'static), stack: Stack) -> CError {
    let mut messages = Vec::new();
    let mut next = Some(err);
    while let Some(mut e) = next {
        // io::Error displays and sources through its payload.
        if let Some(inner) = e.downcast_ref::<io::Error>().and_then(io::Error::get_ref) {
            e = inner as &(dyn Error + 'static);
        }
        if let Some(cerr) = e.downcast_ref::<CError>() {
            return attach(messages, stack, Some(cerr.clone()));
        }
        messages.push(e.to_string());
        next = e.source();
    }
    attach(messages, stack, None)
}

/// Build the foreign part of a chain bottom-up so each node owns the
/// one below it. Only the head gets `head_stack`.
fn attach(messages: Vec<String>, head_stack: Stack, tail: Option<CError>) -> CError {
    let mut head_stack = Some(head_stack);
    let mut below = tail;
    for (i, message) in messages.into_iter().enumerate().rev() {
        let stack = if i == 0 { head_stack.take().unwrap_or_default() } else { Stack::empty() };
        let mut node = CError::build(None, message, stack);
        node.cause = below.map(Box::new);
        below = Some(node);
    }
    below.unwrap_or_else(|| CError::build(None, String::new(), head_stack.unwrap_or_default()))
}

impl From<io::Error> for CError {
    /// Classify an `io::Error` by its kind. The error's own text becomes
    /// the message and its payload's source chain follows as unclassified
    /// nodes. A `CError` payload is returned as is.
    #[track_caller]
    fn from(err: io::Error) -> Self {
        let status = io_status(err.kind());
        let stack = Stack::capture();
        let message = err.to_string();
        let Some(payload) = err.into_inner() else {
            return CError::build(status, message, stack);
        };
        match payload.downcast::<CError>() {
            Ok(cerr) => *cerr,
            Err(other) => {
                let mut head = CError::build(status, message, stack);
                head.cause = other
                    .source()
                    .map(|source| Box::new(fold_foreign(source, Stack::empty())));
                head
            }
        }
    }
}

impl From<CError> for io::Error {
    fn from(err: CError) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

// ── ResultExt ─────────────────────────────────────────────────────

/// Extension trait for wrapping the error of any `Result` in a `CError`.
///
/// ```
/// use cerror::{HttpStatus, ResultExt};
///
/// fn read_config() -> cerror::CResult<String> {
///     std::fs::read_to_string("/definitely/missing.toml").wrap_err("reading config")
/// }
///
/// let err = read_config().unwrap_err();
/// assert_eq!(err.message(), "reading config");
/// assert_eq!(err.classify(), HttpStatus::NotFound);
/// ```
pub trait ResultExt<T> {
    /// Wrap the error with a context message.
    fn wrap_err(self, message: impl Into<String>) -> CResult<T>;

    /// Wrap the error with a lazily built context message.
    fn wrap_err_with<M, F>(self, f: F) -> CResult<T>
    where
        M: Into<String>,
        F: FnOnce() -> M;

    /// Wrap the error in a node classified as `status`.
    fn or_status(self, status: HttpStatus, message: impl Into<String>) -> CResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn wrap_err(self, message: impl Into<String>) -> CResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(CError::from_std(e).wrap(message)),
        }
    }

    #[track_caller]
    fn wrap_err_with<M, F>(self, f: F) -> CResult<T>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(CError::from_std(e).wrap(f())),
        }
    }

    #[track_caller]
    fn or_status(self, status: HttpStatus, message: impl Into<String>) -> CResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => {
                let cause = CError::from_std(e);
                Err(CError::new(status, message).with_cause(cause))
            }
        }
    }
}
