//! The step-wise parse driver.

use std::ops::Range;
use std::sync::Arc;

use kql_core::{Action, ProductionId, StateId, SymbolId};
use rowan::{GreenNode, NodeOrToken};
use tracing::{debug, trace};

use super::reuse::ReusePool;
use super::stack::StackEntry;
use super::tokens::{Lookahead, resolve};
use super::{Interrupted, Parser};
use crate::language::Language;
use crate::lexer::LexMode;
use crate::tree::{
    Element, Fragment, Kind, ReuseStats, Tree, green_children, green_node, green_token,
};

/// Reductions allowed between two shifts. A well-formed table never gets
/// close; a malformed one with a reduce cycle is cut off here.
const REDUCE_FUEL: u32 = 1 << 16;

/// Outcome of one [`ParseSession::step`].
#[derive(Debug, Clone)]
pub enum Step {
    Continue,
    Done(Tree),
}

/// An in-progress parse.
///
/// Each [`step`](Self::step) performs one shift, reduce, reuse or recovery
/// action. Between steps the session can be dropped (cancellation) or
/// inspected.
pub struct ParseSession<'p> {
    pub(super) parser: &'p Parser,
    pub(super) language: Language,
    pub(super) text: Arc<str>,
    /// Never empty: `stack[0]` is the bottom entry.
    pub(super) stack: Vec<StackEntry>,
    /// Trivia and skipped input waiting for the next shift.
    pub(super) pending: Vec<Element>,
    pub(super) pending_error: bool,
    /// Lexer cursor: where the next token is lexed from.
    pub(super) offset: usize,
    pub(super) mode: LexMode,
    pub(super) lookahead: Option<Lookahead>,
    /// Missing terminal chosen by recovery, shifted before the lookahead.
    pub(super) inserted: Option<SymbolId>,
    /// Furthest byte the lexer or external scanner looked at so far.
    pub(super) examined_end: usize,
    /// Recoveries since input last moved forward.
    pub(super) stalled: u32,
    /// Lookahead offset of the latest recovery.
    pub(super) last_recovery: Option<usize>,
    fragments: Vec<Fragment>,
    pool: ReusePool,
    reuse: ReuseStats,
    reduce_fuel: u32,
    steps: u32,
    done: Option<Tree>,
}

impl<'p> ParseSession<'p> {
    pub(super) fn new(parser: &'p Parser, text: Arc<str>, fragments: Vec<Fragment>) -> Self {
        Self {
            parser,
            language: parser.language().clone(),
            text,
            stack: vec![StackEntry::bottom()],
            pending: Vec::new(),
            pending_error: false,
            offset: 0,
            mode: LexMode::Normal,
            lookahead: None,
            inserted: None,
            examined_end: 0,
            stalled: 0,
            last_recovery: None,
            fragments: Vec::new(),
            pool: ReusePool::new(fragments),
            reuse: ReuseStats::default(),
            reduce_fuel: REDUCE_FUEL,
            steps: 0,
            done: None,
        }
    }

    /// Parse actions performed so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Byte offset the lexer has reached.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_done(&self) -> bool {
        self.done.is_some()
    }

    /// Perform one parse action. Once the parse is complete every call
    /// returns the same tree.
    pub fn step(&mut self) -> Step {
        if self.done.is_none() {
            self.steps = self.steps.saturating_add(1);
            self.advance();
        }
        match &self.done {
            Some(tree) => Step::Done(tree.clone()),
            None => Step::Continue,
        }
    }

    /// Step until the tree is complete.
    pub fn run(mut self) -> Tree {
        loop {
            if let Step::Done(tree) = self.step() {
                return tree;
            }
        }
    }

    /// Step until done, `cancel` returns true, or the configured step limit
    /// is reached. The session stays resumable after an interruption.
    pub fn run_until(&mut self, cancel: impl Fn() -> bool) -> Result<Tree, Interrupted> {
        let limit = self.parser.config().step_limit;
        loop {
            if let Some(tree) = &self.done {
                return Ok(tree.clone());
            }
            if cancel() {
                debug!(steps = self.steps, offset = self.offset, "parse cancelled");
                return Err(Interrupted::Cancelled);
            }
            if limit.is_some_and(|limit| self.steps >= limit) {
                debug!(steps = self.steps, offset = self.offset, "parse step limit reached");
                return Err(Interrupted::StepLimit);
            }
            self.step();
        }
    }

    fn advance(&mut self) {
        let la = self.fill_lookahead();
        let top = self.top_state();
        let (terminal, action) = match self.inserted {
            Some(terminal) => (Some(terminal), self.language.table().action(top, terminal)),
            None => resolve(&self.language, top, la.terminal),
        };

        match (action, terminal) {
            (Action::Shift(next), Some(terminal)) => {
                if self.inserted.is_none() && self.try_reuse(top, la, terminal) {
                    return;
                }
                self.shift(next, la, terminal);
            }
            (Action::Reduce(production), _) if self.reduce_fuel > 0 => {
                self.reduce_fuel -= 1;
                self.reduce(production, la);
            }
            (Action::Reduce(_), _) => {
                trace!(offset = la.start, "reduce fuel exhausted");
                self.give_up(la);
            }
            (Action::Accept, _) => self.accept(),
            _ => {
                if self.inserted.take().is_some() {
                    trace!(offset = la.start, "inserted terminal rejected");
                }
                self.recover(la);
            }
        }
    }

    fn shift(&mut self, next: StateId, la: Lookahead, terminal: SymbolId) {
        let (token, span, end_mode, missing) = if self.inserted.take().is_some() {
            let missing = green_token(Kind::Symbol(terminal), "");
            let token = green_node(Kind::Error, vec![missing]);
            (token, la.start..la.start, la.start_mode, true)
        } else {
            let token = green_token(Kind::Symbol(terminal), &self.text[la.start..la.end]);
            self.consume_lookahead();
            self.stalled = 0;
            (token, la.start..la.end, la.end_mode, false)
        };

        let leading_extras = self.pending.len();
        let mut elements = std::mem::take(&mut self.pending);
        elements.push(token);
        self.stack.push(StackEntry {
            state: next,
            elements,
            leading_extras,
            extras_error: std::mem::take(&mut self.pending_error),
            content_error: missing,
            span,
            start_mode: la.start_mode,
            end_mode,
        });
        self.reduce_fuel = REDUCE_FUEL;
    }

    fn reduce(&mut self, production: ProductionId, la: Lookahead) {
        let table = self.language.table();
        let rule = table.production(production);
        let (lhs, arity) = (rule.lhs, rule.rhs.len());

        if arity >= self.stack.len() {
            trace!(production = production.0, "reduction deeper than the stack");
            self.give_up(la);
            return;
        }
        let base = self.stack.len() - arity;
        let uncovered = self.stack[base - 1].state;
        let Some(next) = table.goto(uncovered, lhs) else {
            trace!(production = production.0, state = uncovered.0, "missing goto");
            self.give_up(la);
            return;
        };

        let popped: Vec<StackEntry> = self.stack.drain(base..).collect();
        let entry = if popped.is_empty() {
            let cursor = self.stack.last().map_or(0, |entry| entry.span.end);
            Reduced::empty(cursor, la.start_mode)
        } else {
            Reduced::from_entries(popped)
        };

        let leading_extras = entry.lead.len();
        let mut elements = entry.lead;
        if table.symbol(lhs).is_hidden() {
            elements.extend(entry.content);
        } else {
            elements.push(green_node(Kind::Symbol(lhs), entry.content));
        }

        // Recovery past the first token ran against the unreduced entries;
        // pushing this subtree whole would not reproduce that.
        let recovered_inside = self
            .last_recovery
            .is_some_and(|at| at > entry.span.start);
        if self.parser.config().reuse
            && lhs != self.language.start_symbol()
            && !entry.content_error
            && !entry.span.is_empty()
            && !recovered_inside
        {
            self.fragments.push(Fragment {
                symbol: lhs,
                range: entry.span.clone(),
                lookahead: self.examined_end.saturating_sub(entry.span.end),
                start_state: uncovered,
                start_mode: entry.start_mode,
                end_mode: entry.end_mode,
                elements: Arc::from(&elements[leading_extras..]),
            });
        }

        self.stack.push(StackEntry {
            state: next,
            elements,
            leading_extras,
            extras_error: entry.extras_error,
            content_error: entry.content_error,
            span: entry.span,
            start_mode: entry.start_mode,
            end_mode: entry.end_mode,
        });
    }

    fn accept(&mut self) {
        let start = self.language.start_symbol();
        let start_kind: rowan::SyntaxKind = Kind::Symbol(start).into();
        let entries: Vec<StackEntry> = self.stack.drain(1..).collect();
        let pending = std::mem::take(&mut self.pending);

        let unwrapped = match entries.as_slice() {
            [entry] => match entry.content() {
                [NodeOrToken::Node(node)] if node.kind() == start_kind => {
                    let mut children = entry.elements[..entry.leading_extras].to_vec();
                    children.extend(green_children(node));
                    Some(children)
                }
                _ => None,
            },
            _ => None,
        };
        let mut children = unwrapped.unwrap_or_else(|| {
            entries
                .into_iter()
                .flat_map(|entry| entry.elements)
                .collect()
        });
        children.extend(pending);

        self.finish(GreenNode::new(start_kind, children));
    }

    pub(super) fn finish(&mut self, green: GreenNode) {
        self.ensure_covers(&green);
        let mut fragments = std::mem::take(&mut self.fragments);
        fragments.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then_with(|| b.len().cmp(&a.len()))
        });
        debug!(
            steps = self.steps,
            fragments = fragments.len(),
            reused = self.reuse.fragments,
            reused_bytes = self.reuse.bytes,
            "parse finished"
        );
        self.done = Some(Tree::new(
            green,
            Arc::clone(&self.text),
            self.language.clone(),
            fragments,
            self.reuse,
        ));
    }

    /// Push a fragment of the previous tree in place of re-parsing it.
    fn try_reuse(&mut self, top: StateId, la: Lookahead, terminal: SymbolId) -> bool {
        if self.pool.is_empty() {
            return false;
        }
        let first = (Kind::Symbol(terminal), la.len());
        let Some(fragment) = self.pool.find(la.start, top, la.start_mode, first) else {
            return false;
        };
        if fragment.range.end > self.text.len() {
            return false;
        }
        let Some(next) = self.language.table().goto(top, fragment.symbol) else {
            return false;
        };
        let fragment = fragment.clone();

        let leading_extras = self.pending.len();
        let mut elements = std::mem::take(&mut self.pending);
        elements.extend(fragment.elements.iter().cloned());
        self.stack.push(StackEntry {
            state: next,
            elements,
            leading_extras,
            extras_error: std::mem::take(&mut self.pending_error),
            content_error: false,
            span: fragment.range.clone(),
            start_mode: fragment.start_mode,
            end_mode: fragment.end_mode,
        });

        self.lookahead = None;
        self.offset = fragment.range.end;
        self.mode = fragment.end_mode;
        self.examined_end = self.examined_end.max(fragment.examined_end());
        self.stalled = 0;
        self.reduce_fuel = REDUCE_FUEL;
        self.fragments.extend(self.pool.within(fragment.range.clone()).cloned());
        self.reuse.fragments += 1;
        self.reuse.bytes += fragment.len();
        trace!(
            symbol = %self.language.kind_name(Kind::Symbol(fragment.symbol)),
            start = fragment.range.start,
            end = fragment.range.end,
            "reused fragment"
        );
        true
    }
}

/// Popped stack entries merged into the parts of a new entry.
struct Reduced {
    lead: Vec<Element>,
    content: Vec<Element>,
    extras_error: bool,
    content_error: bool,
    span: Range<usize>,
    start_mode: LexMode,
    end_mode: LexMode,
}

impl Reduced {
    fn empty(cursor: usize, mode: LexMode) -> Self {
        Self {
            lead: Vec::new(),
            content: Vec::new(),
            extras_error: false,
            content_error: false,
            span: cursor..cursor,
            start_mode: mode,
            end_mode: mode,
        }
    }

    /// `entries` must be non-empty. The first entry's leading extras are
    /// hoisted out in front of the new node.
    fn from_entries(entries: Vec<StackEntry>) -> Self {
        let mut reduced = Self::empty(0, LexMode::Normal);
        let count = entries.len();
        for (i, entry) in entries.into_iter().enumerate() {
            let mut elements = entry.elements;
            if i == 0 {
                reduced.content = elements.split_off(entry.leading_extras);
                reduced.lead = elements;
                reduced.extras_error = entry.extras_error;
                reduced.content_error = entry.content_error;
                reduced.span = entry.span.clone();
                reduced.start_mode = entry.start_mode;
            } else {
                reduced.content.extend(elements);
                reduced.content_error |= entry.extras_error || entry.content_error;
            }
            if i + 1 == count {
                reduced.span.end = entry.span.end;
                reduced.end_mode = entry.end_mode;
            }
        }
        reduced
    }
}
