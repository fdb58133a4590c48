//! Classification predicates.
//!
//! [`AsCError`] is the single capability query in the crate: it answers
//! "is this a classified error, and if so which one?" for `CError`,
//! references, boxes, `Option`s, `Result`s and `dyn Error` trait objects.
//! Everything else is built on it, so a predicate can be handed an absent
//! error or a foreign error and simply answer `false`.
//!
//! ```
//! use cerror::{is_not_found, is_bad_request, CError};
//!
//! let err = CError::not_found("user 7 missing");
//! assert!(is_not_found(&err));
//! assert!(!is_bad_request(&err));
//! assert!(!is_not_found(&None::<CError>));
//! ```

use std::error::Error;

use crate::{CError, HttpStatus};

/// Capability query: view a value as a classified error, if it is one.
pub trait AsCError {
    fn as_cerror(&self) -> Option<&CError>;
}

impl AsCError for CError {
    #[inline]
    fn as_cerror(&self) -> Option<&CError> {
        Some(self)
    }
}

impl<E: AsCError + ?Sized> AsCError for &E {
    #[inline]
    fn as_cerror(&self) -> Option<&CError> {
        (**self).as_cerror()
    }
}

impl<E: AsCError + ?Sized> AsCError for Box<E> {
    #[inline]
    fn as_cerror(&self) -> Option<&CError> {
        (**self).as_cerror()
    }
}

impl<E: AsCError> AsCError for Option<E> {
    #[inline]
    fn as_cerror(&self) -> Option<&CError> {
        self.as_ref().and_then(AsCError::as_cerror)
    }
}

impl<T, E: AsCError> AsCError for Result<T, E> {
    #[inline]
    fn as_cerror(&self) -> Option<&CError> {
        self.as_ref().err().and_then(AsCError::as_cerror)
    }
}

impl AsCError for dyn Error + 'static {
    #[inline]
    fn as_cerror(&self) -> Option<&CError> {
        self.downcast_ref::<CError>()
    }
}

impl AsCError for dyn Error + Send + Sync + 'static {
    #[inline]
    fn as_cerror(&self) -> Option<&CError> {
        self.downcast_ref::<CError>()
    }
}

/// Classification of `err`, or `None` when it is absent or not a
/// classified error.
pub fn status_of<E: AsCError + ?Sized>(err: &E) -> Option<HttpStatus> {
    err.as_cerror().map(CError::classify)
}

/// True iff `err` classifies as `status`.
pub fn is_status<E: AsCError + ?Sized>(status: HttpStatus, err: &E) -> bool {
    status_of(err) == Some(status)
}

macro_rules! predicates {
    ($( $(#[$doc:meta])* $name:ident => $status:ident ),* $(,)?) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $name<E: AsCError + ?Sized>(err: &E) -> bool {
                is_status(HttpStatus::$status, err)
            }
        )*
    };
}

predicates! {
    /// Classifies as `400`.
    is_bad_request     => BadRequest,
    /// Classifies as `401`.
    is_unauthorized    => Unauthorized,
    /// Classifies as `403`.
    is_forbidden       => Forbidden,
    /// Classifies as `404`.
    is_not_found       => NotFound,
    /// Classifies as `441`.
    is_timeout         => Timeout,
    /// Classifies as `500`, including unclassified chains.
    is_internal        => Internal,
    /// Classifies as `501`.
    is_not_implemented => NotImplemented,
    /// Classifies as `503`.
    is_unavailable     => Unavailable,
    /// Classifies as `520`.
    is_unknown         => Unknown,
}
