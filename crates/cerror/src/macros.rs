/// Construct a classified `CError` from format arguments, recording the
/// call site.
///
/// # Forms
///
/// ```
/// use cerror::{cerr, HttpStatus};
///
/// let id = 7;
///
/// // Status + message:
/// let e = cerr!(NotFound, "user {} missing", id);
/// assert_eq!(e.message(), "user 7 missing");
///
/// // With an application code:
/// let e = cerr!(NotFound, code = "USER_NOT_FOUND", "user {} missing", id);
/// assert_eq!(e.app_code(), Some("USER_NOT_FOUND"));
/// assert_eq!(e.classify(), HttpStatus::NotFound);
/// ```
#[macro_export]
macro_rules! cerr {
    // ── With application code ─────────────────────────────────
    ($status:ident, code = $code:expr, $($arg:tt)+) => {
        $crate::CError::from_args(
            $crate::HttpStatus::$status,
            ::core::format_args!($($arg)+),
        )
        .with_code($code)
    };

    // ── Basic ─────────────────────────────────────────────────
    ($status:ident, $($arg:tt)+) => {
        $crate::CError::from_args(
            $crate::HttpStatus::$status,
            ::core::format_args!($($arg)+),
        )
    };
}

/// Wrap a `CError` with a formatted message.
///
/// ```
/// use cerror::{wrapf, CError};
///
/// let e = wrapf!(CError::not_found("user 7 missing"), "loading profile {}", 7);
/// assert_eq!(e.message(), "loading profile 7");
/// ```
#[macro_export]
macro_rules! wrapf {
    ($err:expr, $($arg:tt)+) => {
        $crate::CError::wrap_args($err, ::core::format_args!($($arg)+))
    };
}

/// Early-return a classified error if a condition is false.
///
/// ```
/// use cerror::{ensure, CResult};
///
/// fn page_size(n: u32) -> CResult<u32> {
///     ensure!(n <= 100, BadRequest, code = "PAGE_TOO_LARGE", "page size {} over limit", n);
///     Ok(n)
/// }
///
/// assert!(page_size(10).is_ok());
/// assert!(cerror::is_bad_request(&page_size(500)));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $status:ident, $($arg:tt)+) => {
        if !$cond {
            return ::core::result::Result::Err($crate::cerr!($status, $($arg)+).into());
        }
    };
}
