//! LALR(1) automaton.
//!
//! LR(1) item sets are built from the augmented start item; a successor whose
//! core (items without lookaheads) matches an existing state is merged into it.
//! A merge that grows any lookahead set re-queues the state so the new
//! lookaheads propagate to its successors.

use std::collections::{BTreeMap, HashMap, VecDeque};

use indexmap::IndexMap;

use super::lower::Lowered;
use super::sets::{FirstSets, TerminalSet};
use crate::ids::{ProductionId, StateId, SymbolId};

/// Production with a dot position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Item {
    pub production: ProductionId,
    pub dot: u32,
}

impl Item {
    fn advance(self) -> Self {
        Self {
            production: self.production,
            dot: self.dot + 1,
        }
    }
}

pub(crate) struct State {
    /// Sorted by item.
    pub kernel: Vec<(Item, TerminalSet)>,
    pub transitions: BTreeMap<SymbolId, StateId>,
    /// Kernel plus closure, filled once lookaheads are final.
    pub items: Vec<(Item, TerminalSet)>,
}

pub(crate) struct Automaton {
    pub states: Vec<State>,
}

impl Automaton {
    pub fn goto_table(&self, terminal_count: usize, symbol_count: usize) -> Vec<Option<StateId>> {
        let width = symbol_count - terminal_count;
        let mut gotos = vec![None; self.states.len() * width];
        for (s, state) in self.states.iter().enumerate() {
            for (&symbol, &target) in state.transitions.range(SymbolId(terminal_count as u16)..) {
                gotos[s * width + symbol.index() - terminal_count] = Some(target);
            }
        }
        gotos
    }
}

struct Context<'a> {
    lowered: &'a Lowered,
    first: FirstSets,
    by_lhs: Vec<Vec<ProductionId>>,
}

impl Context<'_> {
    fn next_symbol(&self, item: Item) -> Option<SymbolId> {
        self.lowered.productions[item.production.index()]
            .rhs
            .get(item.dot as usize)
            .copied()
    }

    fn closure(&self, kernel: &[(Item, TerminalSet)]) -> Vec<(Item, TerminalSet)> {
        let mut items: IndexMap<Item, TerminalSet> = kernel.iter().cloned().collect();
        let mut pending: Vec<usize> = (0..items.len()).collect();

        while let Some(i) = pending.pop() {
            let Some((&item, lookahead)) = items.get_index(i) else {
                continue;
            };
            let rhs = &self.lowered.productions[item.production.index()].rhs;
            let dot = item.dot as usize;
            let Some(&next) = rhs.get(dot) else {
                continue;
            };
            if self.lowered.is_terminal(next) {
                continue;
            }

            let follow = self.first.first_of(self.lowered, &rhs[dot + 1..], lookahead);
            for &production in &self.by_lhs[self.lowered.nonterminal_column(next)] {
                let derived = Item { production, dot: 0 };
                match items.get_index_of(&derived) {
                    Some(j) => {
                        if let Some((_, existing)) = items.get_index_mut(j)
                            && existing.union_with(&follow)
                        {
                            pending.push(j);
                        }
                    }
                    None => {
                        let (j, _) = items.insert_full(derived, follow.clone());
                        pending.push(j);
                    }
                }
            }
        }

        items.into_iter().collect()
    }
}

pub(crate) fn build(lowered: &Lowered) -> Automaton {
    let terminal_count = lowered.terminal_count as usize;
    let cx = Context {
        lowered,
        first: FirstSets::compute(lowered),
        by_lhs: lowered.productions_by_lhs(),
    };

    let start = Item {
        production: ProductionId(0),
        dot: 0,
    };
    let mut states = vec![State {
        kernel: vec![(start, TerminalSet::singleton(terminal_count, SymbolId::END))],
        transitions: BTreeMap::new(),
        items: Vec::new(),
    }];
    let mut by_core: HashMap<Vec<Item>, usize> = HashMap::new();
    by_core.insert(vec![start], 0);

    let mut queue = VecDeque::from([0usize]);
    let mut queued = vec![true];

    while let Some(s) = queue.pop_front() {
        queued[s] = false;
        let closure = cx.closure(&states[s].kernel);

        let mut successors: BTreeMap<SymbolId, IndexMap<Item, TerminalSet>> = BTreeMap::new();
        for (item, lookahead) in closure {
            let Some(next) = cx.next_symbol(item) else {
                continue;
            };
            successors
                .entry(next)
                .or_default()
                .entry(item.advance())
                .and_modify(|existing| {
                    existing.union_with(&lookahead);
                })
                .or_insert(lookahead);
        }

        for (symbol, kernel) in successors {
            let mut kernel: Vec<(Item, TerminalSet)> = kernel.into_iter().collect();
            kernel.sort_by_key(|(item, _)| *item);
            let core: Vec<Item> = kernel.iter().map(|(item, _)| *item).collect();

            let target = match by_core.get(&core) {
                Some(&t) => {
                    let mut grew = false;
                    for ((_, mine), (_, theirs)) in states[t].kernel.iter_mut().zip(&kernel) {
                        grew |= mine.union_with(theirs);
                    }
                    if grew && !queued[t] {
                        queued[t] = true;
                        queue.push_back(t);
                    }
                    t
                }
                None => {
                    let t = states.len();
                    states.push(State {
                        kernel,
                        transitions: BTreeMap::new(),
                        items: Vec::new(),
                    });
                    by_core.insert(core, t);
                    queued.push(true);
                    queue.push_back(t);
                    t
                }
            };
            states[s].transitions.insert(symbol, StateId(target as u32));
        }
    }

    for state in &mut states {
        state.items = cx.closure(&state.kernel);
    }

    tracing::trace!(states = states.len(), "built LALR(1) automaton");

    Automaton { states }
}
