//! Terminal bitsets and FIRST/nullable computation.

use super::lower::Lowered;
use crate::ids::SymbolId;

/// Fixed-width bitset over terminal ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TerminalSet {
    words: Vec<u64>,
}

impl TerminalSet {
    pub fn new(terminal_count: usize) -> Self {
        Self {
            words: vec![0; terminal_count.div_ceil(64)],
        }
    }

    pub fn singleton(terminal_count: usize, terminal: SymbolId) -> Self {
        let mut set = Self::new(terminal_count);
        set.insert(terminal);
        set
    }

    /// Returns `true` if the terminal was not present.
    pub fn insert(&mut self, terminal: SymbolId) -> bool {
        let (word, bit) = (terminal.index() / 64, terminal.index() % 64);
        let before = self.words[word];
        self.words[word] |= 1 << bit;
        before != self.words[word]
    }

    /// Returns `true` if `self` grew.
    pub fn union_with(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &bits)| {
            (0..64)
                .filter(move |bit| bits & (1 << bit) != 0)
                .map(move |bit| SymbolId((w * 64 + bit) as u16))
        })
    }
}

/// FIRST sets and nullability per nonterminal column.
pub(crate) struct FirstSets {
    terminal_count: usize,
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
}

impl FirstSets {
    pub fn compute(lowered: &Lowered) -> Self {
        let terminal_count = lowered.terminal_count as usize;
        let columns = lowered.origins.len();
        let mut sets = Self {
            terminal_count,
            first: vec![TerminalSet::new(terminal_count); columns],
            nullable: vec![false; columns],
        };

        let mut changed = true;
        while changed {
            changed = false;
            for production in &lowered.productions {
                let lhs = lowered.nonterminal_column(production.lhs);
                let mut all_nullable = true;
                for &symbol in &production.rhs {
                    if lowered.is_terminal(symbol) {
                        changed |= sets.first[lhs].insert(symbol);
                        all_nullable = false;
                        break;
                    }
                    let column = lowered.nonterminal_column(symbol);
                    if column != lhs {
                        let (src, dst) = pick(&mut sets.first, column, lhs);
                        changed |= dst.union_with(src);
                    }
                    if !sets.nullable[column] {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable && !sets.nullable[lhs] {
                    sets.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
        sets
    }

    /// FIRST(`symbols` `follow`): terminals that can start `symbols`, plus
    /// `follow` if all of `symbols` can be empty.
    pub fn first_of(&self, lowered: &Lowered, symbols: &[SymbolId], follow: &TerminalSet) -> TerminalSet {
        let mut result = TerminalSet::new(self.terminal_count);
        for &symbol in symbols {
            if lowered.is_terminal(symbol) {
                result.insert(symbol);
                return result;
            }
            let column = lowered.nonterminal_column(symbol);
            result.union_with(&self.first[column]);
            if !self.nullable[column] {
                return result;
            }
        }
        result.union_with(follow);
        result
    }
}

/// Borrow `sets[src]` shared and `sets[dst]` mutably.
fn pick(sets: &mut [TerminalSet], src: usize, dst: usize) -> (&TerminalSet, &mut TerminalSet) {
    debug_assert_ne!(src, dst);
    if src < dst {
        let (left, right) = sets.split_at_mut(dst);
        (&left[src], &mut right[0])
    } else {
        let (left, right) = sets.split_at_mut(src);
        (&right[0], &mut left[dst])
    }
}
