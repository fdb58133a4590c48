//! # cerror — Classified Error
//!
//! A structured error crate for services that sit behind HTTP and RPC
//! boundaries. Every error carries a user message, an optional dev message
//! and app code, an optional HTTP classification and a call-site stack
//! snapshot, and may wrap a cause.
//!
//! ## Design
//!
//! A `CError` is a singly linked chain, outermost first:
//!
//! ```text
//! "loading profile"   status: none   <- wrap node, transparent
//!        │
//!        ▼
//! "user 7 missing"    status: 404    <- root cause
//! ```
//!
//! Wrap nodes carry no status of their own. The chain classifies as the
//! first explicit status found walking inward, or `500` when there is none.
//!
//! At a boundary the chain is flattened to its head: [`encode`] produces a
//! JSON object, [`CError::to_grpc`] an RPC code and message. [`decode`] never
//! fails; malformed payloads become an `Internal` error coded
//! [`DECODE_ERROR`].
//!
//! ## Quick Start
//!
//! ```rust
//! use cerror::{cerr, decode, encode, sprint, CResult, HttpStatus, RpcCode};
//!
//! fn find_user(id: u32) -> CResult<String> {
//!     Err(cerr!(NotFound, code = "USER_NOT_FOUND", "user {} missing", id))
//! }
//!
//! fn load_profile(id: u32) -> CResult<String> {
//!     find_user(id).map_err(|e| e.wrap("loading profile"))
//! }
//!
//! let err = load_profile(7).unwrap_err();
//! assert_eq!(err.classify(), HttpStatus::NotFound);
//! assert_eq!(err.root_cause().message(), "user 7 missing");
//! assert_eq!(sprint(&err).lines().count(), 2);
//!
//! // HTTP boundary
//! let received = decode(&encode(&err));
//! assert_eq!(received.http_status(), 404);
//! assert_eq!(received.app_code(), Some("USER_NOT_FOUND"));
//!
//! // RPC boundary
//! assert_eq!(err.to_grpc().code(), RpcCode::NotFound);
//! assert!(cerror::is_not_found(&err));
//! ```
//!
//! ## Feature Flags
//!
//! | Flag         | Effect |
//! |--------------|--------|
//! | `backtrace`  | (default) Walk the live stack outward from the call site |
//! | `production` | Record no frames at all; overrides `backtrace` |
//! | `http`       | Conversions to and from `http::StatusCode` |
//! | `tonic`      | Conversions to and from `tonic::Status` |
//!
//! Capture is also tunable at runtime through `CERROR_CAPTURE` and
//! `CERROR_STACK_DEPTH`; see [`config`].

pub mod config;
mod status;
mod stack;
mod error;
mod chain;
mod classify;
mod rpc;
mod codec;
mod report;
mod convert;
#[macro_use]
mod macros;

// ── Public API ────────────────────────────────────────────────────

pub use status::{to_transport_status, HttpStatus, RpcCode, UnknownStatus};
pub use stack::{Frame, Stack};
pub use error::CError;
pub use chain::{cause, classify, root_cause, wrap, Chain};
pub use classify::{
    is_bad_request, is_forbidden, is_internal, is_not_found, is_not_implemented, is_status,
    is_timeout, is_unauthorized, is_unavailable, is_unknown, status_of, AsCError,
};
pub use rpc::{from_grpc, to_grpc, RpcStatus};
pub use codec::{decode, encode, encode_public, try_decode, CodecError, DECODE_ERROR};
pub use report::{
    lines, log_error, record_error, sprint, trace_error, Line, Lines, LogSink, TracingSink,
};
pub use convert::ResultExt;

/// Convenience Result alias.
pub type CResult<T> = Result<T, CError>;
