//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use kql_core::StateId;
use rowan::GreenNode;

use super::session::ParseSession;

impl ParseSession<'_> {
    #[inline]
    pub(super) fn ensure_bottom(&self) {
        assert!(
            self.stack.first().is_some_and(|entry| entry.state == StateId::START),
            "parse stack lost its bottom entry"
        );
    }

    #[inline]
    pub(super) fn ensure_covers(&self, green: &GreenNode) {
        assert_eq!(
            usize::from(green.text_len()),
            self.text.len(),
            "finished tree does not cover the input"
        );
    }
}
