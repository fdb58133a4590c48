//! The closed status taxonomy and the HTTP ↔ RPC translation table.
//!
//! | HTTP | Variant          | RPC code | RPC name            |
//! |------|------------------|----------|---------------------|
//! | 400  | `BadRequest`     | 3        | `INVALID_ARGUMENT`  |
//! | 401  | `Unauthorized`   | 16       | `UNAUTHENTICATED`   |
//! | 403  | `Forbidden`      | 7        | `PERMISSION_DENIED` |
//! | 404  | `NotFound`       | 5        | `NOT_FOUND`         |
//! | 441  | `Timeout`        | 4        | `DEADLINE_EXCEEDED` |
//! | 500  | `Internal`       | 13       | `INTERNAL`          |
//! | 501  | `NotImplemented` | 12       | `UNIMPLEMENTED`     |
//! | 503  | `Unavailable`    | 14       | `UNAVAILABLE`       |
//! | 520  | `Unknown`        | 2        | `UNKNOWN`           |
//!
//! The table is a `const` array: nothing here is mutable at runtime.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP status of a classified error.
///
/// Only the nine statuses below are representable. Raw integers outside
/// the set are rejected by [`HttpStatus::try_from`] and normalized to
/// [`HttpStatus::Internal`] by [`HttpStatus::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum HttpStatus {
    BadRequest     = 400,
    Unauthorized   = 401,
    Forbidden      = 403,
    NotFound       = 404,
    /// Reserved, non-standard status used for timeouts.
    Timeout        = 441,
    /// Default when nothing more specific applies.
    Internal       = 500,
    NotImplemented = 501,
    Unavailable    = 503,
    /// Used for foreign errors that carry no classification.
    Unknown        = 520,
}

/// A raw status integer that is not part of the fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown http status {0}")]
pub struct UnknownStatus(pub u16);

impl HttpStatus {
    /// Every status, in ascending numeric order.
    pub const ALL: [HttpStatus; 9] = [
        HttpStatus::BadRequest,
        HttpStatus::Unauthorized,
        HttpStatus::Forbidden,
        HttpStatus::NotFound,
        HttpStatus::Timeout,
        HttpStatus::Internal,
        HttpStatus::NotImplemented,
        HttpStatus::Unavailable,
        HttpStatus::Unknown,
    ];

    /// Numeric HTTP status.
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Normalizing conversion: anything outside the fixed set becomes
    /// `Internal`.
    pub fn from_code(code: u16) -> Self {
        Self::try_from(code).unwrap_or(HttpStatus::Internal)
    }

    /// Short lowercase reason text, used when a message would be empty.
    pub const fn reason(self) -> &'static str {
        match self {
            HttpStatus::BadRequest     => "bad request",
            HttpStatus::Unauthorized   => "unauthorized",
            HttpStatus::Forbidden      => "forbidden",
            HttpStatus::NotFound       => "not found",
            HttpStatus::Timeout        => "timeout",
            HttpStatus::Internal       => "internal error",
            HttpStatus::NotImplemented => "not implemented",
            HttpStatus::Unavailable    => "unavailable",
            HttpStatus::Unknown        => "unknown error",
        }
    }

    /// The RPC code this status translates to.
    pub const fn rpc_code(self) -> RpcCode {
        match self {
            HttpStatus::BadRequest     => RpcCode::InvalidArgument,
            HttpStatus::Unauthorized   => RpcCode::Unauthenticated,
            HttpStatus::Forbidden      => RpcCode::PermissionDenied,
            HttpStatus::NotFound       => RpcCode::NotFound,
            HttpStatus::Timeout        => RpcCode::DeadlineExceeded,
            HttpStatus::Internal       => RpcCode::Internal,
            HttpStatus::NotImplemented => RpcCode::Unimplemented,
            HttpStatus::Unavailable    => RpcCode::Unavailable,
            HttpStatus::Unknown        => RpcCode::Unknown,
        }
    }

    /// Reverse translation. RPC codes with no HTTP counterpart in the
    /// table (including `Ok`) map to `Unknown`.
    pub fn from_rpc_code(code: RpcCode) -> Self {
        Self::ALL
            .into_iter()
            .find(|status| status.rpc_code() == code)
            .unwrap_or(HttpStatus::Unknown)
    }
}

impl TryFrom<u16> for HttpStatus {
    type Error = UnknownStatus;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(UnknownStatus(code))
    }
}

impl From<HttpStatus> for u16 {
    #[inline]
    fn from(status: HttpStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// Looks up the RPC code for a raw HTTP status integer.
///
/// Integers outside the fixed set map to [`RpcCode::Unknown`].
///
/// ```
/// use cerror::{to_transport_status, RpcCode};
/// assert_eq!(to_transport_status(404), RpcCode::NotFound);
/// assert_eq!(to_transport_status(418), RpcCode::Unknown);
/// ```
pub fn to_transport_status(http_status: u16) -> RpcCode {
    HttpStatus::try_from(http_status)
        .map(HttpStatus::rpc_code)
        .unwrap_or(RpcCode::Unknown)
}

// ── RPC status codes ──────────────────────────────────────────────

/// gRPC status code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RpcCode {
    Ok                 = 0,
    Cancelled          = 1,
    Unknown            = 2,
    InvalidArgument    = 3,
    DeadlineExceeded   = 4,
    NotFound           = 5,
    AlreadyExists      = 6,
    PermissionDenied   = 7,
    ResourceExhausted  = 8,
    FailedPrecondition = 9,
    Aborted            = 10,
    OutOfRange         = 11,
    Unimplemented      = 12,
    Internal           = 13,
    Unavailable        = 14,
    DataLoss           = 15,
    Unauthenticated    = 16,
}

impl RpcCode {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Integers outside `0..=16` are `Unknown`.
    pub const fn from_i32(code: i32) -> Self {
        match code {
            0  => RpcCode::Ok,
            1  => RpcCode::Cancelled,
            3  => RpcCode::InvalidArgument,
            4  => RpcCode::DeadlineExceeded,
            5  => RpcCode::NotFound,
            6  => RpcCode::AlreadyExists,
            7  => RpcCode::PermissionDenied,
            8  => RpcCode::ResourceExhausted,
            9  => RpcCode::FailedPrecondition,
            10 => RpcCode::Aborted,
            11 => RpcCode::OutOfRange,
            12 => RpcCode::Unimplemented,
            13 => RpcCode::Internal,
            14 => RpcCode::Unavailable,
            15 => RpcCode::DataLoss,
            16 => RpcCode::Unauthenticated,
            _  => RpcCode::Unknown,
        }
    }

    /// Canonical upper-snake name.
    pub const fn name(self) -> &'static str {
        match self {
            RpcCode::Ok                 => "OK",
            RpcCode::Cancelled          => "CANCELLED",
            RpcCode::Unknown            => "UNKNOWN",
            RpcCode::InvalidArgument    => "INVALID_ARGUMENT",
            RpcCode::DeadlineExceeded   => "DEADLINE_EXCEEDED",
            RpcCode::NotFound           => "NOT_FOUND",
            RpcCode::AlreadyExists      => "ALREADY_EXISTS",
            RpcCode::PermissionDenied   => "PERMISSION_DENIED",
            RpcCode::ResourceExhausted  => "RESOURCE_EXHAUSTED",
            RpcCode::FailedPrecondition => "FAILED_PRECONDITION",
            RpcCode::Aborted            => "ABORTED",
            RpcCode::OutOfRange         => "OUT_OF_RANGE",
            RpcCode::Unimplemented      => "UNIMPLEMENTED",
            RpcCode::Internal           => "INTERNAL",
            RpcCode::Unavailable        => "UNAVAILABLE",
            RpcCode::DataLoss           => "DATA_LOSS",
            RpcCode::Unauthenticated    => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for RpcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── http crate bridge ─────────────────────────────────────────────

#[cfg(feature = "http")]
impl From<HttpStatus> for http::StatusCode {
    fn from(status: HttpStatus) -> Self {
        // 441 and 520 are non-standard but inside the 100..=999 range.
        http::StatusCode::from_u16(status.code())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(feature = "http")]
impl TryFrom<http::StatusCode> for HttpStatus {
    type Error = UnknownStatus;

    fn try_from(code: http::StatusCode) -> Result<Self, Self::Error> {
        HttpStatus::try_from(code.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [(u16, i32); 9] = [
        (400, 3),
        (401, 16),
        (403, 7),
        (404, 5),
        (441, 4),
        (500, 13),
        (501, 12),
        (503, 14),
        (520, 2),
    ];

    #[test]
    fn transport_table() {
        for (http, rpc) in TABLE {
            assert_eq!(to_transport_status(http).as_i32(), rpc, "http {}", http);
        }
    }

    #[test]
    fn unknown_http_maps_to_unknown_rpc() {
        assert_eq!(to_transport_status(0), RpcCode::Unknown);
        assert_eq!(to_transport_status(200), RpcCode::Unknown);
        assert_eq!(to_transport_status(418), RpcCode::Unknown);
    }

    #[test]
    fn reverse_translation() {
        for status in HttpStatus::ALL {
            assert_eq!(HttpStatus::from_rpc_code(status.rpc_code()), status);
        }
        assert_eq!(HttpStatus::from_rpc_code(RpcCode::Aborted), HttpStatus::Unknown);
        assert_eq!(HttpStatus::from_rpc_code(RpcCode::Ok), HttpStatus::Unknown);
    }

    #[test]
    fn strict_and_normalizing_conversion() {
        assert_eq!(HttpStatus::try_from(441), Ok(HttpStatus::Timeout));
        assert_eq!(HttpStatus::try_from(418), Err(UnknownStatus(418)));
        assert_eq!(HttpStatus::from_code(418), HttpStatus::Internal);
        assert_eq!(HttpStatus::from_code(520), HttpStatus::Unknown);
    }

    #[test]
    fn rpc_code_from_i32() {
        for code in 0..=16 {
            assert_eq!(RpcCode::from_i32(code).as_i32(), code);
        }
        assert_eq!(RpcCode::from_i32(-1), RpcCode::Unknown);
        assert_eq!(RpcCode::from_i32(17), RpcCode::Unknown);
    }

    #[test]
    fn serde_as_integer() {
        let json = serde_json::to_string(&HttpStatus::NotFound).unwrap();
        assert_eq!(json, "404");
        let back: HttpStatus = serde_json::from_str("503").unwrap();
        assert_eq!(back, HttpStatus::Unavailable);
        assert!(serde_json::from_str::<HttpStatus>("418").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(HttpStatus::Timeout.to_string(), "441 timeout");
        assert_eq!(RpcCode::DeadlineExceeded.to_string(), "DEADLINE_EXCEEDED");
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_status_code_bridge() {
        let code: http::StatusCode = HttpStatus::Timeout.into();
        assert_eq!(code.as_u16(), 441);
        assert_eq!(HttpStatus::try_from(http::StatusCode::NOT_FOUND), Ok(HttpStatus::NotFound));
    }
}
