//! Fragments of a previous tree, offered back to the parser.

use std::ops::Range;

use kql_core::StateId;

use crate::lexer::LexMode;
use crate::tree::{Fragment, Kind, first_leaf};

/// Fragments sorted by start offset, longest first.
#[derive(Debug, Default)]
pub(super) struct ReusePool {
    fragments: Vec<Fragment>,
}

impl ReusePool {
    pub fn new(mut fragments: Vec<Fragment>) -> Self {
        fragments.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then_with(|| b.len().cmp(&a.len()))
        });
        Self { fragments }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Longest fragment at `start` that was built from `state` in `mode` and
    /// begins with the token `first` (kind and length).
    pub fn find(
        &self,
        start: usize,
        state: StateId,
        mode: LexMode,
        first: (Kind, usize),
    ) -> Option<&Fragment> {
        let from = self.fragments.partition_point(|f| f.range.start < start);
        self.fragments[from..]
            .iter()
            .take_while(|f| f.range.start == start)
            .find(|f| {
                f.start_state == state
                    && f.start_mode == mode
                    && first_leaf(&f.elements) == Some(first)
            })
    }

    /// Fragments lying entirely inside `range`.
    pub fn within(&self, range: Range<usize>) -> impl Iterator<Item = &Fragment> {
        let end = range.end;
        let from = self.fragments.partition_point(|f| f.range.start < range.start);
        self.fragments[from..]
            .iter()
            .take_while(move |f| f.range.start < end)
            .filter(move |f| f.range.end <= end)
    }
}
