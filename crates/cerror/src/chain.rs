//! Cause-chain operations: wrap, unwrap, traverse, classify.
//!
//! A chain is a singly linked list of owned nodes. Wrapping always builds
//! a new head whose cause is the old head, so no node ever points back
//! up the chain and every traversal ends at the root.

use crate::stack::Stack;
use crate::{CError, HttpStatus};

/// Iterator over a chain, head first, root last.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a CError>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a CError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause.as_deref();
        Some(current)
    }
}

impl std::iter::FusedIterator for Chain<'_> {}

impl CError {
    /// Wrap this error in a new, unclassified node carrying `message`
    /// and a fresh stack snapshot.
    ///
    /// ```
    /// use cerror::{CError, HttpStatus};
    /// let err = CError::not_found("user 7 missing").wrap("loading profile");
    /// assert_eq!(err.message(), "loading profile");
    /// assert_eq!(err.classify(), HttpStatus::NotFound);
    /// ```
    #[track_caller]
    pub fn wrap(self, message: impl Into<String>) -> CError {
        let mut outer = CError::build(None, message.into(), Stack::capture());
        outer.cause = Some(Box::new(self));
        outer
    }

    /// Wrap with a formatted message. Prefer [`wrapf!`](crate::wrapf).
    #[track_caller]
    pub fn wrap_args(self, args: std::fmt::Arguments<'_>) -> CError {
        let mut outer = CError::build(None, crate::error::render(args), Stack::capture());
        outer.cause = Some(Box::new(self));
        outer
    }

    /// The immediately wrapped error.
    #[inline]
    pub fn cause(&self) -> Option<&CError> {
        self.cause.as_deref()
    }

    /// The terminal node of the chain (`self` when there is no cause).
    pub fn root_cause(&self) -> &CError {
        let mut node = self;
        while let Some(next) = node.cause.as_deref() {
            node = next;
        }
        node
    }

    /// Iterate the chain from this node down to the root.
    #[inline]
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Number of nodes in the chain, including this one.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// The first explicit status found walking down the chain, if any.
    pub fn explicit_status(&self) -> Option<HttpStatus> {
        self.chain().find_map(CError::status)
    }

    /// Resolve the chain to one status: the first explicit status from
    /// the head down, or `Internal` when no node set one.
    pub fn classify(&self) -> HttpStatus {
        self.explicit_status().unwrap_or(HttpStatus::Internal)
    }

    /// The first application code found walking down the chain.
    pub fn code(&self) -> Option<&str> {
        self.chain().find_map(CError::app_code)
    }

    /// Consume the head and return its cause.
    pub fn into_cause(mut self) -> Option<CError> {
        self.cause.take().map(|boxed| *boxed)
    }
}

// ── Free functions over optional errors ───────────────────────────

/// Wrap an optional error. Wrapping nothing yields nothing.
///
/// ```
/// use cerror::{wrap, CError};
/// assert!(wrap(None, "context").is_none());
/// assert!(wrap(Some(CError::msg("x")), "context").is_some());
/// ```
#[track_caller]
pub fn wrap(err: Option<CError>, message: impl Into<String>) -> Option<CError> {
    match err {
        Some(err) => Some(err.wrap(message)),
        None => None,
    }
}

/// The immediate cause of an optional error.
pub fn cause(err: Option<&CError>) -> Option<&CError> {
    err.and_then(CError::cause)
}

/// The root of an optional error's chain.
pub fn root_cause(err: Option<&CError>) -> Option<&CError> {
    err.map(CError::root_cause)
}

/// Classify an optional error. Absent errors have no classification.
pub fn classify(err: Option<&CError>) -> Option<HttpStatus> {
    err.map(CError::classify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn build_chain(root: CError, wraps: &[Option<u16>]) -> CError {
        wraps.iter().fold(root, |err, status| match status {
            Some(code) => err.wrap("layer").with_status(*code),
            None => err.wrap("layer"),
        })
    }

    #[test]
    fn wrap_none_is_none() {
        assert!(wrap(None, "x").is_none());
    }

    #[test]
    fn wrapped_node_is_unclassified() {
        let err = CError::not_found("root").wrap("outer");
        assert_eq!(err.status(), None);
        assert_eq!(err.explicit_status(), Some(HttpStatus::NotFound));
        assert_eq!(err.cause().map(CError::message), Some("root"));
    }

    #[test]
    fn classify_first_explicit_wins() {
        let err = CError::not_found("root")
            .wrap("middle")
            .with_status(503)
            .wrap("outer");
        assert_eq!(err.classify(), HttpStatus::Unavailable);
    }

    #[test]
    fn classify_defaults_to_internal() {
        let err = CError::msg("root").wrap("outer");
        assert_eq!(err.explicit_status(), None);
        assert_eq!(err.classify(), HttpStatus::Internal);
        assert_eq!(classify(None), None);
    }

    #[test]
    fn code_comes_from_first_coded_node() {
        let err = CError::coded(HttpStatus::NotFound, "USER_NOT_FOUND", "missing")
            .wrap("outer");
        assert_eq!(err.app_code(), None);
        assert_eq!(err.code(), Some("USER_NOT_FOUND"));
    }

    #[test]
    fn chain_order_and_depth() {
        let err = CError::msg("a").wrap("b").wrap("c");
        let messages: Vec<_> = err.chain().map(CError::message).collect();
        assert_eq!(messages, ["c", "b", "a"]);
        assert_eq!(err.depth(), 3);
        assert_eq!(err.root_cause().message(), "a");
    }

    #[test]
    fn optional_helpers() {
        let err = CError::msg("a").wrap("b");
        assert_eq!(cause(Some(&err)).map(CError::message), Some("a"));
        assert_eq!(root_cause(Some(&err)).map(CError::message), Some("a"));
        assert!(cause(None).is_none());
        assert!(root_cause(None).is_none());
    }

    #[test]
    fn into_cause_unwraps_one_level() {
        let err = CError::msg("a").wrap("b");
        let inner = err.into_cause().expect("cause");
        assert_eq!(inner.message(), "a");
        assert!(inner.into_cause().is_none());
    }

    #[test]
    fn wrap_args_formats() {
        let err = CError::msg("a").wrap_args(format_args!("step {}", 2));
        assert_eq!(err.message(), "step 2");
    }

    proptest! {
        #[test]
        fn root_cause_survives_wrapping(
            root_status in prop::sample::select(HttpStatus::ALL.to_vec()),
            wraps in prop::collection::vec(prop::option::of(prop::sample::select(vec![400u16, 404, 503, 999])), 0..16),
        ) {
            let root = CError::new(root_status, "root");
            let chain = build_chain(root, &wraps);
            prop_assert_eq!(chain.root_cause().message(), "root");
            prop_assert_eq!(chain.root_cause().status(), Some(root_status));
            prop_assert_eq!(chain.depth(), wraps.len() + 1);

            let expected = wraps
                .iter()
                .rev()
                .find_map(|s| s.map(HttpStatus::from_code))
                .unwrap_or(root_status);
            prop_assert_eq!(chain.classify(), expected);
        }
    }
}
