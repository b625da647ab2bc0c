//! Item sets → action table.
//!
//! Each (state, terminal) cell collects its candidate actions, then keeps one:
//! - reduce/reduce: higher precedence, then the earlier production
//! - shift/reduce: the reducing production's precedence against the highest
//!   precedence among items that shift; on a tie `Left` reduces, `Right`
//!   shifts, and anything else is a conflict that shifts

use super::lalr::Automaton;
use super::lower::Lowered;
use super::{Conflict, ConflictKind};
use crate::Grammar;
use crate::ids::{ProductionId, StateId, SymbolId};
use crate::table::{Action, Assoc};

#[derive(Default, Clone)]
struct Candidates {
    shift: Option<(StateId, i32)>,
    reduces: Vec<ProductionId>,
    accept: bool,
}

pub(crate) fn resolve(
    lowered: &Lowered,
    automaton: &Automaton,
    grammar: &Grammar,
) -> (Vec<Action>, Vec<Conflict>) {
    let terminal_count = lowered.terminal_count as usize;
    let mut actions = Vec::with_capacity(automaton.states.len() * terminal_count);
    let mut conflicts = Vec::new();

    for (s, state) in automaton.states.iter().enumerate() {
        let state_id = StateId(s as u32);
        let mut row = vec![Candidates::default(); terminal_count];

        for (item, lookahead) in &state.items {
            let production = &lowered.productions[item.production.index()];
            match production.rhs.get(item.dot as usize) {
                Some(&next) if lowered.is_terminal(next) => {
                    let Some(&target) = state.transitions.get(&next) else {
                        continue;
                    };
                    let cell = &mut row[next.index()];
                    let precedence = match cell.shift {
                        Some((_, existing)) => existing.max(production.precedence),
                        None => production.precedence,
                    };
                    cell.shift = Some((target, precedence));
                }
                Some(_) => {}
                None if item.production.index() == 0 => row[SymbolId::END.index()].accept = true,
                None => {
                    for terminal in lookahead.iter() {
                        lowered.ensure_terminal(terminal);
                        row[terminal.index()].reduces.push(item.production);
                    }
                }
            }
        }

        for (t, cell) in row.into_iter().enumerate() {
            let lookahead = SymbolId(t as u16);
            let mut record = |kind: ConflictKind| {
                conflicts.push(Conflict {
                    state: state_id,
                    lookahead,
                    declared: is_declared(lowered, grammar, kind),
                    kind,
                });
            };
            actions.push(decide(lowered, cell, &mut record));
        }
    }

    (actions, conflicts)
}

fn decide(lowered: &Lowered, mut cell: Candidates, record: &mut impl FnMut(ConflictKind)) -> Action {
    if cell.accept {
        return Action::Accept;
    }

    cell.reduces.sort_unstable();
    cell.reduces.dedup();

    let precedence = |p: ProductionId| lowered.productions[p.index()].precedence;
    let reduce = cell
        .reduces
        .iter()
        .copied()
        .max_by(|&a, &b| precedence(a).cmp(&precedence(b)).then(b.cmp(&a)));

    if let Some(kept) = reduce {
        for &dropped in &cell.reduces {
            if dropped != kept && precedence(dropped) == precedence(kept) {
                record(ConflictKind::ReduceReduce { kept, dropped });
            }
        }
    }

    match (cell.shift, reduce) {
        (None, None) => Action::Error,
        (Some((target, _)), None) => Action::Shift(target),
        (None, Some(production)) => Action::Reduce(production),
        (Some((target, shift_prec)), Some(production)) => {
            let reduce_prec = precedence(production);
            if reduce_prec > shift_prec {
                return Action::Reduce(production);
            }
            if reduce_prec < shift_prec {
                return Action::Shift(target);
            }
            match lowered.productions[production.index()].assoc {
                Assoc::Left => Action::Reduce(production),
                Assoc::Right => Action::Shift(target),
                Assoc::None => {
                    record(ConflictKind::ShiftReduce { reduce: production });
                    Action::Shift(target)
                }
            }
        }
    }
}

/// A conflict is expected when some `conflicts` group names every rule it involves.
fn is_declared(lowered: &Lowered, grammar: &Grammar, kind: ConflictKind) -> bool {
    let involved: Vec<&str> = match kind {
        ConflictKind::ShiftReduce { reduce } => vec![lowered.origin(reduce)],
        ConflictKind::ReduceReduce { kept, dropped } => {
            vec![lowered.origin(kept), lowered.origin(dropped)]
        }
    };
    grammar
        .conflicts
        .iter()
        .any(|group| involved.iter().all(|name| group.iter().any(|g| g == name)))
}
