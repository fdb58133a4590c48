//! RPC boundary: translate a chain into an RPC status and back.
//!
//! Outgoing messages follow one format:
//!
//! ```text
//! error=<app code> error_description=<message>    when an app code exists
//! <message>                                       otherwise
//! ```
//!
//! Dev messages and stack frames never leave through this path.

use std::error::Error;
use std::fmt;

use crate::stack::Stack;
use crate::{CError, HttpStatus, RpcCode};

const CODE_PREFIX: &str = "error=";
const DESCRIPTION_SEP: &str = " error_description=";

/// An RPC status: code plus message, as carried by an RPC response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcStatus {
    code: RpcCode,
    message: String,
}

impl RpcStatus {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    #[inline]
    pub fn code(&self) -> RpcCode {
        self.code
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Split a message of the form `error=<code> error_description=<msg>`
    /// into its parts. Any other shape is returned as a bare message.
    pub fn parts(&self) -> (Option<&str>, &str) {
        split_message(&self.message)
    }
}

impl fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc error: code = {} desc = {}", self.code, self.message)
    }
}

impl CError {
    /// Translate this chain to an RPC status.
    ///
    /// A chain with no explicit status anywhere is unclassified: it maps
    /// to `UNKNOWN` carrying the aggregated chain text. Otherwise the
    /// classification picks the code from the table and the head message
    /// (with the chain's app code, when present) becomes the description.
    pub fn to_grpc(&self) -> RpcStatus {
        let Some(status) = self.explicit_status() else {
            return RpcStatus::new(RpcCode::Unknown, self.to_string());
        };
        let message = match self.code() {
            Some(code) => format!("{CODE_PREFIX}{code}{DESCRIPTION_SEP}{}", self.message()),
            None => self.message().to_string(),
        };
        RpcStatus::new(status.rpc_code(), message)
    }
}

impl From<&CError> for RpcStatus {
    fn from(err: &CError) -> Self {
        err.to_grpc()
    }
}

/// Translate an optional error of any type to an RPC status.
///
/// - absent → `None`
/// - a [`CError`] → [`CError::to_grpc`]
/// - any other error → `UNKNOWN` carrying its display text
pub fn to_grpc(err: Option<&(dyn Error + 'static)>) -> Option<RpcStatus> {
    let err = err?;
    Some(match err.downcast_ref::<CError>() {
        Some(cerr) => cerr.to_grpc(),
        None => RpcStatus::new(RpcCode::Unknown, err.to_string()),
    })
}

/// Rebuild an error from a received RPC status.
///
/// `OK` carries no error and yields `None`. The stack is captured here:
/// its provenance is the receiving side, not the remote raiser.
#[track_caller]
pub fn from_grpc(status: &RpcStatus) -> Option<CError> {
    if status.code == RpcCode::Ok {
        return None;
    }
    let (code, message) = status.parts();
    let err = CError::build(
        Some(HttpStatus::from_rpc_code(status.code)),
        message.to_string(),
        Stack::capture(),
    );
    Some(match code {
        Some(code) => err.with_code(code),
        None => err,
    })
}

fn split_message(message: &str) -> (Option<&str>, &str) {
    let parsed = message
        .strip_prefix(CODE_PREFIX)
        .and_then(|rest| rest.split_once(DESCRIPTION_SEP))
        .filter(|(code, _)| !code.is_empty() && !code.contains(char::is_whitespace));
    match parsed {
        Some((code, description)) => (Some(code), description),
        None => (None, message),
    }
}

// ── tonic bridge ──────────────────────────────────────────────────

#[cfg(feature = "tonic")]
impl From<RpcStatus> for tonic::Status {
    fn from(status: RpcStatus) -> Self {
        tonic::Status::new(tonic::Code::from_i32(status.code.as_i32()), status.message)
    }
}

#[cfg(feature = "tonic")]
impl From<&tonic::Status> for RpcStatus {
    fn from(status: &tonic::Status) -> Self {
        RpcStatus::new(RpcCode::from_i32(status.code() as i32), status.message())
    }
}

#[cfg(feature = "tonic")]
impl From<CError> for tonic::Status {
    fn from(err: CError) -> Self {
        err.to_grpc().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    #[test]
    fn table_codes_for_every_status() {
        let expected = [
            (HttpStatus::BadRequest, 3),
            (HttpStatus::Unauthorized, 16),
            (HttpStatus::Forbidden, 7),
            (HttpStatus::NotFound, 5),
            (HttpStatus::Timeout, 4),
            (HttpStatus::Internal, 13),
            (HttpStatus::NotImplemented, 12),
            (HttpStatus::Unavailable, 14),
            (HttpStatus::Unknown, 2),
        ];
        for (status, code) in expected {
            let rpc = CError::new(status, "m").to_grpc();
            assert_eq!(rpc.code().as_i32(), code, "{:?}", status);
            assert_eq!(rpc.message(), "m");
        }
    }

    #[test]
    fn unclassified_maps_to_unknown_with_raw_text() {
        let rpc = CError::msg("disk on fire").wrap("saving").to_grpc();
        assert_eq!(rpc.code(), RpcCode::Unknown);
        assert_eq!(rpc.message(), "saving: disk on fire");
    }

    #[test]
    fn code_and_description_format() {
        let err = CError::coded(HttpStatus::NotFound, "USER_NOT_FOUND", "user 7 missing");
        let rpc = err.to_grpc();
        assert_eq!(rpc.code(), RpcCode::NotFound);
        assert_eq!(rpc.message(), "error=USER_NOT_FOUND error_description=user 7 missing");
        assert_eq!(rpc.parts(), (Some("USER_NOT_FOUND"), "user 7 missing"));
    }

    #[test]
    fn dev_message_never_leaves() {
        let rpc = CError::internal("oops").with_dev_message("db password wrong").to_grpc();
        assert!(!rpc.message().contains("password"));
    }

    #[test]
    fn optional_dyn_translation() {
        assert_eq!(to_grpc(None), None);

        let foreign = io::Error::new(io::ErrorKind::Other, "socket closed");
        let rpc = to_grpc(Some(&foreign)).expect("status");
        assert_eq!(rpc.code(), RpcCode::Unknown);
        assert_eq!(rpc.message(), "socket closed");

        let err = CError::unavailable("down");
        let rpc = to_grpc(Some(&err)).expect("status");
        assert_eq!(rpc.code(), RpcCode::Unavailable);
    }

    #[test]
    fn from_grpc_restores_classification() {
        let sent = CError::coded(HttpStatus::Forbidden, "NO_ACCESS", "denied").to_grpc();
        let received = from_grpc(&sent).expect("error");
        assert_eq!(received.classify(), HttpStatus::Forbidden);
        assert_eq!(received.app_code(), Some("NO_ACCESS"));
        assert_eq!(received.message(), "denied");
        assert!(received.cause().is_none());
    }

    #[test]
    fn from_grpc_ok_and_unmapped() {
        assert!(from_grpc(&RpcStatus::new(RpcCode::Ok, "")).is_none());
        let err = from_grpc(&RpcStatus::new(RpcCode::Aborted, "retry later")).expect("error");
        assert_eq!(err.classify(), HttpStatus::Unknown);
        assert_eq!(err.app_code(), None);
        assert_eq!(err.message(), "retry later");
    }

    #[test]
    fn split_rejects_malformed_prefix() {
        assert_eq!(split_message("error= error_description=x"), (None, "error= error_description=x"));
        assert_eq!(split_message("error=A B error_description=x"), (None, "error=A B error_description=x"));
        assert_eq!(split_message("plain"), (None, "plain"));
    }

    #[cfg(feature = "tonic")]
    #[test]
    fn tonic_bridge() {
        let status: tonic::Status = CError::not_found("gone").into();
        assert_eq!(status.code(), tonic::Code::NotFound);
        let back = RpcStatus::from(&status);
        assert_eq!(back.code(), RpcCode::NotFound);
        assert_eq!(back.message(), "gone");
    }
}
