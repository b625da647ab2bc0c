//! Parse stack entries.

use std::ops::Range;

use kql_core::StateId;

use crate::lexer::LexMode;
use crate::tree::Element;

/// One shifted token or reduced symbol.
///
/// `elements` starts with `leading_extras` trivia/error elements that precede
/// the content; a reduction hoists them out of the node it builds.
#[derive(Debug, Clone)]
pub(super) struct StackEntry {
    pub state: StateId,
    pub elements: Vec<Element>,
    pub leading_extras: usize,
    /// An error node sits among the leading extras.
    pub extras_error: bool,
    /// An error node sits in the content.
    pub content_error: bool,
    /// Content span, leading extras excluded.
    pub span: Range<usize>,
    pub start_mode: LexMode,
    pub end_mode: LexMode,
}

impl StackEntry {
    /// Stack bottom: the start state, owning nothing.
    pub fn bottom() -> Self {
        Self {
            state: StateId::START,
            elements: Vec::new(),
            leading_extras: 0,
            extras_error: false,
            content_error: false,
            span: 0..0,
            start_mode: LexMode::Normal,
            end_mode: LexMode::Normal,
        }
    }

    pub fn content(&self) -> &[Element] {
        &self.elements[self.leading_extras..]
    }
}
