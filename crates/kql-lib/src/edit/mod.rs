//! Text edits and their effect on a parsed tree.
//!
//! Editing never touches the old [`Tree`]. [`Tree::edit`] produces an
//! [`EditedTree`]: the new text plus the fragments of the old parse that the
//! edit cannot have affected, shifted to their new offsets. Hand it to
//! [`crate::Parser::reparse`] to get the new tree.
//!
//! A fragment survives when the edited range stays clear of everything the
//! lexer looked at while building it: its span, the bytes it examined past
//! its end, and a [`LEXER_LOOKAHEAD`] margin. Touching counts as overlapping,
//! so an insertion right at a fragment boundary invalidates it.


use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use crate::language::Language;
use crate::parser::LEXER_LOOKAHEAD;
use crate::tree::{Fragment, Tree};

/// Replace `start..old_end` with `new_text`, which ends at `new_end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edit range {start}..{end} is outside the text (length {len})")]
    OutOfRange { start: usize, end: usize, len: usize },

    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("edit ends {expected} bytes after its start but carries {actual} bytes of text")]
    LengthMismatch { expected: usize, actual: usize },
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self::replace(range, "")
    }

    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        let new_text = text.into();
        Self {
            start: range.start,
            old_end: range.end,
            new_end: range.start + new_text.len(),
            new_text,
        }
    }

    pub fn old_len(&self) -> usize {
        self.old_end.saturating_sub(self.start)
    }

    pub fn new_len(&self) -> usize {
        self.new_end.saturating_sub(self.start)
    }

    pub fn old_range(&self) -> Range<usize> {
        self.start..self.old_end
    }

    /// The edited text.
    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        self.validate(text)?;
        let mut out = String::with_capacity(text.len() - self.old_len() + self.new_len());
        out.push_str(&text[..self.start]);
        out.push_str(&self.new_text);
        out.push_str(&text[self.old_end..]);
        Ok(out)
    }

    fn validate(&self, text: &str) -> Result<(), EditError> {
        if self.start > self.old_end || self.old_end > text.len() {
            return Err(EditError::OutOfRange {
                start: self.start,
                end: self.old_end,
                len: text.len(),
            });
        }
        for offset in [self.start, self.old_end] {
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        if self.new_end < self.start || self.new_len() != self.new_text.len() {
            return Err(EditError::LengthMismatch {
                expected: self.new_end.wrapping_sub(self.start),
                actual: self.new_text.len(),
            });
        }
        Ok(())
    }

    /// Whether `fragment` may have depended on the replaced bytes.
    fn invalidates(&self, fragment: &Fragment) -> bool {
        let reach = fragment.examined_end() + LEXER_LOOKAHEAD;
        fragment.range.start <= self.old_end && self.start <= reach
    }

    /// Move a fragment that lies after the edit to its new position.
    fn shift(&self, fragment: &Fragment) -> Fragment {
        let start = fragment.range.start - self.old_end + self.new_end;
        Fragment {
            range: start..start + fragment.len(),
            ..fragment.clone()
        }
    }
}

/// A tree's text after one or more edits, with the fragments that survived.
#[derive(Debug, Clone)]
pub struct EditedTree {
    text: Arc<str>,
    language: Language,
    fragments: Vec<Fragment>,
}

impl Tree {
    /// Apply `edit` to this tree's text. The tree itself is unchanged.
    pub fn edit(&self, edit: &Edit) -> Result<EditedTree, EditError> {
        let text = edit.apply(self.text())?;
        Ok(EditedTree {
            text: text.into(),
            language: self.language().clone(),
            fragments: surviving(self.fragments(), edit),
        })
    }
}

impl EditedTree {
    /// Apply another edit, expressed in offsets of [`Self::text`].
    pub fn edit(&self, edit: &Edit) -> Result<EditedTree, EditError> {
        let text = edit.apply(&self.text)?;
        Ok(EditedTree {
            text: text.into(),
            language: self.language.clone(),
            fragments: surviving(&self.fragments, edit),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub(crate) fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

fn surviving(fragments: &[Fragment], edit: &Edit) -> Vec<Fragment> {
    let kept: Vec<Fragment> = fragments
        .iter()
        .filter(|fragment| !edit.invalidates(fragment))
        .map(|fragment| {
            if fragment.range.start > edit.old_end {
                edit.shift(fragment)
            } else {
                fragment.clone()
            }
        })
        .collect();
    debug!(
        before = fragments.len(),
        after = kept.len(),
        start = edit.start,
        old_end = edit.old_end,
        new_end = edit.new_end,
        "edit filtered fragments"
    );
    kept
}
