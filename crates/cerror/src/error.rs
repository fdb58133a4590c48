use std::error::Error;
use std::fmt;

use crate::stack::{Frame, Stack};
use crate::HttpStatus;

/// Classified Error: a structured error value with an HTTP status,
/// an optional application code, and an owned cause chain.
///
/// ```text
/// CError ("loading profile", status: -)            <- head
///   └── cause: CError ("user 7 missing", 404, USER_NOT_FOUND)   <- root
/// ```
///
/// - `message` is always present and never empty.
/// - `status` is `None` on nodes that did not classify themselves
///   (plain wraps, converted foreign errors). Such nodes are transparent
///   to [`classify`](CError::classify).
/// - `dev_message` and the stack are for logs only. They never appear
///   in [`encode_public`](crate::encode_public) or [`RpcStatus`](crate::RpcStatus).
///
/// Values are immutable once built. The `with_*` builders consume the
/// value and are meant for the construction expression only.
pub struct CError {
    pub(crate) message:     String,
    pub(crate) dev_message: Option<String>,
    pub(crate) app_code:    Option<String>,
    pub(crate) status:      Option<HttpStatus>,
    pub(crate) stack:       Stack,
    pub(crate) cause:       Option<Box<CError>>,
}

// ── Constructors ──────────────────────────────────────────────────

impl CError {
    /// Create a classified error. Captures the caller's stack.
    ///
    /// ```
    /// use cerror::{CError, HttpStatus};
    /// let err = CError::new(HttpStatus::NotFound, "user 7 missing");
    /// assert_eq!(err.classify(), HttpStatus::NotFound);
    /// ```
    #[track_caller]
    pub fn new(status: HttpStatus, message: impl Into<String>) -> Self {
        Self::build(Some(status), message.into(), Stack::capture())
    }

    /// Create a classified error carrying an application code.
    #[track_caller]
    pub fn coded(status: HttpStatus, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::build(Some(status), message.into(), Stack::capture()).with_code(code)
    }

    /// Create an error from a raw HTTP status integer. Integers outside
    /// the fixed set are normalized to `500`.
    #[track_caller]
    pub fn from_status_code(status: u16, message: impl Into<String>) -> Self {
        Self::build(Some(HttpStatus::from_code(status)), message.into(), Stack::capture())
    }

    /// Create an unclassified error. It classifies as `500` and
    /// translates to RPC `UNKNOWN`.
    #[track_caller]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::build(None, message.into(), Stack::capture())
    }

    /// Create a classified error from format arguments.
    ///
    /// Formatting failures do not propagate: whatever was rendered is
    /// kept and a literal marker is appended. Prefer the
    /// [`cerr!`](crate::cerr) macro over calling this directly.
    #[track_caller]
    pub fn from_args(status: HttpStatus, args: fmt::Arguments<'_>) -> Self {
        Self::build(Some(status), render(args), Stack::capture())
    }

    pub(crate) fn build(status: Option<HttpStatus>, message: String, stack: Stack) -> Self {
        let message = if message.is_empty() {
            status.unwrap_or(HttpStatus::Unknown).reason().to_string()
        } else {
            message
        };
        Self {
            message,
            dev_message: None,
            app_code: None,
            status,
            stack,
            cause: None,
        }
    }
}

macro_rules! status_constructors {
    ($( $(#[$doc:meta])* $name:ident => $status:ident ),* $(,)?) => {
        impl CError {
            $(
                $(#[$doc])*
                #[track_caller]
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(HttpStatus::$status, message)
                }
            )*
        }
    };
}

status_constructors! {
    /// `400 Bad Request`.
    bad_request     => BadRequest,
    /// `401 Unauthorized`.
    unauthorized    => Unauthorized,
    /// `403 Forbidden`.
    forbidden       => Forbidden,
    /// `404 Not Found`.
    not_found       => NotFound,
    /// `441`, the reserved timeout status.
    timeout         => Timeout,
    /// `500 Internal Server Error`.
    internal        => Internal,
    /// `501 Not Implemented`.
    not_implemented => NotImplemented,
    /// `503 Service Unavailable`.
    unavailable     => Unavailable,
    /// `520`, unknown / unclassified.
    unknown         => Unknown,
}

// ── Builders ──────────────────────────────────────────────────────

impl CError {
    /// Attach an application code. Empty codes are ignored.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.app_code = non_empty(code.into());
        self
    }

    /// Attach an internal-only diagnostic message. Empty messages are ignored.
    pub fn with_dev_message(mut self, dev_message: impl Into<String>) -> Self {
        self.dev_message = non_empty(dev_message.into());
        self
    }

    /// Set the status from a raw integer, normalizing unknown values to `500`.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(HttpStatus::from_code(status));
        self
    }

    /// Attach `cause` beneath this value's chain.
    ///
    /// On a fresh value this sets the direct cause. If a cause is already
    /// present, `cause` is appended below the current root, so the chain
    /// stays linear and acyclic.
    pub fn with_cause(mut self, cause: CError) -> Self {
        let mut slot = &mut self.cause;
        while let Some(node) = slot {
            slot = &mut node.cause;
        }
        *slot = Some(Box::new(cause));
        self
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl CError {
    /// This node's own message, without any cause text.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn dev_message(&self) -> Option<&str> {
        self.dev_message.as_deref()
    }

    /// This node's own application code.
    #[inline]
    pub fn app_code(&self) -> Option<&str> {
        self.app_code.as_deref()
    }

    /// This node's own explicit status, if it set one.
    #[inline]
    pub fn status(&self) -> Option<HttpStatus> {
        self.status
    }

    #[inline]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The creation site of this node.
    #[inline]
    pub fn location(&self) -> Option<&Frame> {
        self.stack.location()
    }

    /// Numeric HTTP status of the whole chain (see [`classify`](CError::classify)).
    #[inline]
    pub fn http_status(&self) -> u16 {
        self.classify().code()
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl Error for CError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

// ── Display ───────────────────────────────────────────────────────

impl fmt::Display for CError {
    /// The aggregated text of the chain: `outer: inner: root`.
    ///
    /// Use [`sprint`](crate::sprint) for one line per node with locations.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        let mut next = self.cause.as_deref();
        while let Some(node) = next {
            write!(f, ": {}", node.message)?;
            next = node.cause.as_deref();
        }
        Ok(())
    }
}

// ── Debug ─────────────────────────────────────────────────────────

impl fmt::Debug for CError {
    /// Head fields, then the rest of the chain as a flat list.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("CError");
        self.debug_fields(&mut d);
        if self.cause.is_some() {
            d.field("causes", &Causes(self));
        }
        d.finish()
    }
}

impl CError {
    fn debug_fields(&self, d: &mut fmt::DebugStruct<'_, '_>) {
        d.field("message", &self.message);
        if let Some(status) = self.status {
            d.field("status", &status.code());
        }
        if let Some(code) = &self.app_code {
            d.field("code", code);
        }
        if let Some(dev) = &self.dev_message {
            d.field("dev_message", dev);
        }
        if let Some(frame) = self.stack.location() {
            d.field("location", &format_args!("{}", frame));
        }
    }
}

struct Causes<'a>(&'a CError);

impl fmt::Debug for Causes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.chain().skip(1).map(Node)).finish()
    }
}

struct Node<'a>(&'a CError);

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("CError");
        self.0.debug_fields(&mut d);
        d.finish()
    }
}

// ── Clone / Drop ──────────────────────────────────────────────────

// Chains can be arbitrarily deep; neither copying nor dropping one may
// recurse through the boxes.

impl Clone for CError {
    fn clone(&self) -> Self {
        let mut head = self.detached();
        let mut rest: Vec<CError> = self.chain().skip(1).map(CError::detached).collect();
        let mut below = None;
        while let Some(mut node) = rest.pop() {
            node.cause = below;
            below = Some(Box::new(node));
        }
        head.cause = below;
        head
    }
}

impl Drop for CError {
    fn drop(&mut self) {
        let mut next = self.cause.take();
        while let Some(mut node) = next {
            next = node.cause.take();
        }
    }
}

impl CError {
    /// This node alone, without its cause.
    fn detached(&self) -> CError {
        CError {
            message: self.message.clone(),
            dev_message: self.dev_message.clone(),
            app_code: self.app_code.clone(),
            status: self.status,
            stack: self.stack.clone(),
            cause: None,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Render format arguments without panicking on a failing `Display` impl.
pub(crate) fn render(args: fmt::Arguments<'_>) -> String {
    if let Some(s) = args.as_str() {
        return s.to_owned();
    }
    let mut out = String::new();
    if fmt::write(&mut out, args).is_err() {
        out.push_str("%!(FORMAT_ERROR)");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn constructor_per_status() {
        let cases: [(fn(&'static str) -> CError, HttpStatus); 9] = [
            (|m| CError::bad_request(m), HttpStatus::BadRequest),
            (|m| CError::unauthorized(m), HttpStatus::Unauthorized),
            (|m| CError::forbidden(m), HttpStatus::Forbidden),
            (|m| CError::not_found(m), HttpStatus::NotFound),
            (|m| CError::timeout(m), HttpStatus::Timeout),
            (|m| CError::internal(m), HttpStatus::Internal),
            (|m| CError::not_implemented(m), HttpStatus::NotImplemented),
            (|m| CError::unavailable(m), HttpStatus::Unavailable),
            (|m| CError::unknown(m), HttpStatus::Unknown),
        ];
        for (ctor, status) in cases {
            let err = ctor("boom");
            assert_eq!(err.status(), Some(status));
            assert_eq!(err.classify(), status);
            assert_eq!(err.message(), "boom");
            assert!(err.cause().is_none());
        }
    }

    #[test]
    fn unknown_integer_normalized() {
        let err = CError::from_status_code(418, "teapot");
        assert_eq!(err.status(), Some(HttpStatus::Internal));
        let err = CError::internal("x").with_status(441);
        assert_eq!(err.status(), Some(HttpStatus::Timeout));
        let err = CError::internal("x").with_status(9999);
        assert_eq!(err.status(), Some(HttpStatus::Internal));
    }

    #[test]
    fn empty_message_replaced_by_reason() {
        assert_eq!(CError::not_found("").message(), "not found");
        assert_eq!(CError::msg("").message(), "unknown error");
    }

    #[test]
    fn coded_and_dev_message() {
        let err = CError::coded(HttpStatus::NotFound, "USER_NOT_FOUND", "user 7 missing")
            .with_dev_message("select returned 0 rows");
        assert_eq!(err.app_code(), Some("USER_NOT_FOUND"));
        assert_eq!(err.dev_message(), Some("select returned 0 rows"));

        let err = CError::bad_request("x").with_code("").with_dev_message("");
        assert_eq!(err.app_code(), None);
        assert_eq!(err.dev_message(), None);
    }

    #[test]
    fn format_errors_are_swallowed() {
        let err = CError::from_args(HttpStatus::BadRequest, format_args!("bad {}", Broken));
        assert!(err.message().starts_with("bad "));
        assert!(err.message().contains("FORMAT_ERROR"));

        let err = CError::from_args(HttpStatus::BadRequest, format_args!("id {}", 7));
        assert_eq!(err.message(), "id 7");
    }

    #[test]
    #[cfg(not(feature = "production"))]
    fn stack_points_at_constructor_call() {
        let line = line!() + 1;
        let err = CError::not_found("missing");
        if let Some(frame) = err.location() {
            assert_eq!(frame.line(), line);
            assert!(frame.file().ends_with("error.rs"));
        }
    }

    #[test]
    fn display_aggregates_chain() {
        let err = CError::not_found("user 7 missing")
            .wrap("loading profile")
            .wrap("GET /profile");
        assert_eq!(err.to_string(), "GET /profile: loading profile: user 7 missing");
    }

    #[test]
    fn source_follows_cause() {
        let err = CError::not_found("root").wrap("outer");
        let source = err.source().expect("cause");
        assert_eq!(source.to_string(), "root");
        assert!(source.source().is_none());
    }

    #[test]
    fn with_cause_appends_below_root() {
        let err = CError::internal("a")
            .with_cause(CError::msg("b"))
            .with_cause(CError::msg("c"));
        let messages: Vec<_> = err.chain().map(CError::message).collect();
        assert_eq!(messages, ["a", "b", "c"]);
    }

    fn bare(status: Option<HttpStatus>, message: &str) -> CError {
        CError::build(status, message.to_string(), Stack::empty())
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        const DEPTH: usize = 200_000;
        let mut err = bare(None, "root");
        for _ in 0..DEPTH {
            let mut outer = bare(None, "layer");
            outer.cause = Some(Box::new(err));
            err = outer;
        }
        let err = err.with_cause(bare(Some(HttpStatus::NotFound), "tail"));
        assert_eq!(err.depth(), DEPTH + 2);
        assert_eq!(err.classify(), HttpStatus::NotFound);

        let copy = err.clone();
        assert_eq!(copy.depth(), DEPTH + 2);
        assert_eq!(copy.root_cause().message(), "tail");

        let debug = format!("{:?}", copy);
        assert!(debug.ends_with("status: 404 }] }"), "tail of debug: {}", &debug[debug.len() - 40..]);
        drop(copy);
        drop(err);
    }

    #[test]
    fn debug_lists_causes_flat() {
        let err = bare(Some(HttpStatus::NotFound), "root").with_code("U");
        let mut outer = bare(None, "outer");
        outer.cause = Some(Box::new(err));
        assert_eq!(
            format!("{:?}", outer),
            r#"CError { message: "outer", causes: [CError { message: "root", status: 404, code: "U" }] }"#
        );
    }

    #[test]
    fn debug_omits_absent_fields() {
        let s = format!("{:?}", CError::msg("plain"));
        assert!(s.contains("plain"));
        assert!(!s.contains("status"));
        assert!(!s.contains("code"));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<CError>();
    }
}
