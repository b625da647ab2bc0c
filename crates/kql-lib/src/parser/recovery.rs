//! Error recovery.
//!
//! When the lookahead has no action, recovery tries in order:
//!
//! 1. Insert one missing terminal in front of the lookahead.
//! 2. Delete up to `window` tokens.
//! 3. Pop up to `window` stack entries, abandoning what they built.
//!
//! A candidate is accepted when a dry run of the automaton shifts the next
//! `window` tokens after it (or accepts the input). If nothing works the
//! lookahead is deleted; at end of input the stack is wrapped up as is.
//!
//! Every recovery is remembered by offset: subtrees reduced afterwards that
//! start before it are not offered for reuse.
//!
//! Skipped input lands in `ERROR` nodes in the pending buffer, so it ends up
//! in front of whatever is shifted next. A missing terminal is an `ERROR`
//! node holding a zero-width token of that terminal.

use kql_core::{Action, StateId, SymbolId};
use rowan::{GreenNode, NodeOrToken};
use tracing::trace;

use super::session::ParseSession;
use super::stack::StackEntry;
use super::tokens::{Lookahead, resolve};
use crate::language::Language;
use crate::tree::{Element, Kind, element_kind, green_children, green_node, green_token};

/// Reductions a dry run may perform before it is considered failed.
const SIMULATION_FUEL: u32 = 4096;

impl ParseSession<'_> {
    pub(super) fn recover(&mut self, la: Lookahead) {
        let window = self.parser.config().recovery_window;
        self.last_recovery = Some(la.start);
        self.stalled += 1;
        if self.stalled as usize > 2 * window + 2 {
            trace!(offset = la.start, "recovery stalled");
            self.give_up(la);
            return;
        }

        if self.try_insert(la, window) || self.try_delete(la, window) || self.try_pop(la, window)
        {
            return;
        }
        self.give_up(la);
    }

    /// Last resort: skip the lookahead, or wrap up the parse at end of input.
    pub(super) fn give_up(&mut self, la: Lookahead) {
        self.inserted = None;
        self.last_recovery = Some(la.start);
        if la.is_end() {
            trace!(depth = self.stack.len() - 1, "closing the tree at end of input");
            self.close_with_error();
        } else {
            trace!(offset = la.start, "skipping token");
            self.delete_lookahead(la);
        }
    }

    fn stack_states(&self) -> Vec<StateId> {
        self.stack.iter().map(|entry| entry.state).collect()
    }

    fn try_insert(&mut self, la: Lookahead, window: usize) -> bool {
        let ahead = self.upcoming(la, window);
        let states = self.stack_states();
        let candidates: Vec<SymbolId> = self
            .language
            .table()
            .valid_terminals(self.top_state())
            .filter(|&terminal| terminal != SymbolId::END)
            .collect();

        let mut tokens = Vec::with_capacity(ahead.len() + 1);
        for terminal in candidates {
            tokens.clear();
            tokens.push(Some(terminal));
            tokens.extend_from_slice(&ahead);
            if simulate(&self.language, &states, &tokens) {
                trace!(
                    offset = la.start,
                    terminal = %self.language.kind_name(Kind::Symbol(terminal)),
                    "inserting missing terminal"
                );
                self.inserted = Some(terminal);
                return true;
            }
        }
        false
    }

    fn try_delete(&mut self, la: Lookahead, window: usize) -> bool {
        let ahead = self.upcoming(la, 2 * window);
        let states = self.stack_states();

        for count in 1..=window {
            if count >= ahead.len() || ahead[count - 1] == Some(SymbolId::END) {
                break;
            }
            let rest = &ahead[count..ahead.len().min(count + window)];
            if simulate(&self.language, &states, rest) {
                trace!(offset = la.start, count, "deleting tokens");
                for _ in 0..count {
                    let next = self.fill_lookahead();
                    if next.is_end() {
                        break;
                    }
                    self.delete_lookahead(next);
                }
                return true;
            }
        }
        false
    }

    fn try_pop(&mut self, la: Lookahead, window: usize) -> bool {
        let ahead = self.upcoming(la, window);
        let states = self.stack_states();

        for count in 1..=window {
            if count >= states.len() {
                break;
            }
            if simulate(&self.language, &states[..states.len() - count], &ahead) {
                trace!(offset = la.start, count, "popping stack entries");
                self.pop_entries(count);
                return true;
            }
        }
        false
    }

    /// Consume the lookahead into an error node in the pending buffer.
    pub(super) fn delete_lookahead(&mut self, la: Lookahead) {
        let kind = la.kind(la.terminal);
        let token = green_token(kind, &self.text[la.start..la.end]);
        self.consume_lookahead();
        self.stalled = 0;
        self.pending_error = true;

        // Only trivia since the last error node: extend it.
        let last = self
            .pending
            .iter()
            .rposition(|element| !element_kind(element).is_trivia());
        if let Some(index) = last
            && let NodeOrToken::Node(error) = &self.pending[index]
            && element_kind(&self.pending[index]).is_error()
        {
            let mut children = green_children(error);
            children.extend(self.pending.drain(index + 1..));
            children.push(token);
            self.pending[index] = green_node(Kind::Error, children);
            return;
        }
        self.pending.push(green_node(Kind::Error, vec![token]));
    }

    /// Move the top `count` entries into the pending buffer as an error node.
    fn pop_entries(&mut self, count: usize) {
        let base = self.stack.len() - count;
        let popped: Vec<StackEntry> = self.stack.drain(base..).collect();
        let (lead, abandoned) = split_lead(popped);

        let mut pending = lead;
        if !abandoned.is_empty() {
            pending.push(green_node(Kind::Error, abandoned));
        }
        pending.append(&mut self.pending);
        self.pending = pending;
        self.pending_error = true;
        self.ensure_bottom();
    }

    /// Finish at end of input with whatever the stack holds.
    fn close_with_error(&mut self) {
        let start = self.language.start_symbol();
        let popped: Vec<StackEntry> = self.stack.drain(1..).collect();
        let (mut children, abandoned) = split_lead(popped);
        children.push(green_node(Kind::Error, abandoned));
        children.append(&mut self.pending);
        self.finish(GreenNode::new(Kind::Symbol(start).into(), children));
    }
}

/// The first entry's leading extras, and everything after them.
fn split_lead(entries: Vec<StackEntry>) -> (Vec<Element>, Vec<Element>) {
    let mut lead = Vec::new();
    let mut rest = Vec::new();
    for (i, entry) in entries.into_iter().enumerate() {
        let mut elements = entry.elements;
        if i == 0 {
            rest = elements.split_off(entry.leading_extras);
            lead = elements;
        } else {
            rest.extend(elements);
        }
    }
    (lead, rest)
}

/// Dry-run `tokens` from a stack of `states`. True when every token shifts,
/// or the input is accepted on the way.
fn simulate(language: &Language, states: &[StateId], tokens: &[Option<SymbolId>]) -> bool {
    let table = language.table();
    let mut stack = states.to_vec();
    let mut fuel = SIMULATION_FUEL;

    for &terminal in tokens {
        loop {
            let Some(&top) = stack.last() else {
                return false;
            };
            match resolve(language, top, terminal).1 {
                Action::Shift(next) => {
                    stack.push(next);
                    break;
                }
                Action::Reduce(production) => {
                    if fuel == 0 {
                        return false;
                    }
                    fuel -= 1;
                    let rule = table.production(production);
                    if rule.rhs.len() >= stack.len() {
                        return false;
                    }
                    stack.truncate(stack.len() - rule.rhs.len());
                    let Some(next) = stack.last().and_then(|&s| table.goto(s, rule.lhs)) else {
                        return false;
                    };
                    stack.push(next);
                }
                Action::Accept => return true,
                Action::Error => return false,
            }
        }
    }
    true
}
