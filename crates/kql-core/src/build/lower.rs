//! Rule trees → flat productions.
//!
//! Every rule expands to a list of alternatives (plain symbol sequences).
//! `repeat`/`repeat1` become hidden left-recursive auxiliary rules named
//! `{rule}_repeat{n}`. Precedence attaches to every alternative under a `prec`
//! wrapper; the innermost wrapper wins.

use indexmap::IndexMap;

use super::{CompileError, MAX_ALTERNATIVES};
use crate::grammar::{Grammar, Rule};
use crate::ids::{ProductionId, SymbolId};
use crate::table::{Assoc, Production, Symbol, SymbolKind, Visibility};

pub(crate) const END_NAME: &str = "end";
pub(crate) const AUGMENTED_NAME: &str = "__start";

/// Flattened grammar with final symbol numbering.
#[derive(Debug)]
pub(crate) struct Lowered {
    pub symbols: Vec<Symbol>,
    pub terminal_count: u16,
    /// Production 0 is `__start → start_symbol`.
    pub productions: Vec<Production>,
    /// Source rule name per nonterminal, indexed by `symbol - terminal_count`.
    pub origins: Vec<String>,
    pub start_symbol: SymbolId,
    pub word: Option<SymbolId>,
    pub keywords: Vec<SymbolId>,
    pub externals: Vec<SymbolId>,
}

impl Lowered {
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        id.0 < self.terminal_count
    }

    pub fn nonterminal_column(&self, id: SymbolId) -> usize {
        self.ensure_nonterminal(id);
        id.index() - self.terminal_count as usize
    }

    pub fn origin(&self, production: ProductionId) -> &str {
        let lhs = self.productions[production.index()].lhs;
        &self.origins[self.nonterminal_column(lhs)]
    }

    /// Productions grouped by left-hand side, indexed by nonterminal column.
    pub fn productions_by_lhs(&self) -> Vec<Vec<ProductionId>> {
        let mut by_lhs = vec![Vec::new(); self.origins.len()];
        for (i, production) in self.productions.iter().enumerate() {
            by_lhs[self.nonterminal_column(production.lhs)].push(ProductionId(i as u32));
        }
        by_lhs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TerminalKey {
    Named(String),
    Literal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Sym {
    Terminal(usize),
    NonTerminal(usize),
}

#[derive(Debug, Clone)]
struct Alt {
    symbols: Vec<Sym>,
    prec: Option<(i32, Assoc)>,
}

impl Alt {
    fn empty() -> Self {
        Self {
            symbols: Vec::new(),
            prec: None,
        }
    }
}

struct NonTerminal {
    name: String,
    origin: String,
    hidden: bool,
    alts: Vec<Alt>,
}

struct Expander<'g> {
    rule_index: IndexMap<&'g str, usize>,
    terminals: IndexMap<TerminalKey, ()>,
    nonterminals: Vec<NonTerminal>,
    repeat_counts: IndexMap<String, usize>,
}

pub(crate) fn lower(grammar: &Grammar) -> Result<Lowered, CompileError> {
    if grammar.rules.is_empty() {
        return Err(CompileError::EmptyGrammar);
    }

    let mut rule_index = IndexMap::new();
    for (name, _) in &grammar.rules {
        let next = rule_index.len();
        rule_index.entry(name.as_str()).or_insert(next);
    }

    if let Some(word) = &grammar.word
        && rule_index.contains_key(word.as_str())
    {
        return Err(CompileError::InvalidWord(word.clone()));
    }

    let mut expander = Expander {
        nonterminals: rule_index
            .keys()
            .map(|name| NonTerminal {
                name: (*name).to_owned(),
                origin: (*name).to_owned(),
                hidden: name.starts_with('_'),
                alts: Vec::new(),
            })
            .collect(),
        rule_index,
        terminals: IndexMap::new(),
        repeat_counts: IndexMap::new(),
    };

    for name in &grammar.externals {
        expander.terminals.insert(TerminalKey::Named(name.clone()), ());
    }
    if let Some(word) = &grammar.word {
        expander.terminals.insert(TerminalKey::Named(word.clone()), ());
    }

    for (name, rule) in &grammar.rules {
        let index = expander.rule_index[name.as_str()];
        if !expander.nonterminals[index].alts.is_empty() {
            // Duplicate definition: the first one wins.
            continue;
        }
        let alts = expander.expand(rule, name)?;
        let alts = dedupe(alts);
        if alts.is_empty() {
            return Err(CompileError::EmptyRule(name.clone()));
        }
        expander.nonterminals[index].alts = alts;
    }

    expander.finish(grammar)
}

impl Expander<'_> {
    fn expand(&mut self, rule: &Rule, owner: &str) -> Result<Vec<Alt>, CompileError> {
        let alts = match rule {
            Rule::Blank => vec![Alt::empty()],
            Rule::String(text) if text.is_empty() => vec![Alt::empty()],
            Rule::String(text) => vec![single(self.terminal(TerminalKey::Literal(text.clone())))],
            Rule::Symbol(name) => {
                let sym = match self.rule_index.get(name.as_str()) {
                    Some(&index) => Sym::NonTerminal(index),
                    None => self.terminal(TerminalKey::Named(name.clone())),
                };
                vec![single(sym)]
            }
            Rule::Seq(items) => {
                let mut acc = vec![Alt::empty()];
                for item in items {
                    let tails = self.expand(item, owner)?;
                    let mut next = Vec::with_capacity(acc.len() * tails.len());
                    for head in &acc {
                        for tail in &tails {
                            let mut symbols = head.symbols.clone();
                            symbols.extend_from_slice(&tail.symbols);
                            next.push(Alt {
                                symbols,
                                prec: head.prec.or(tail.prec),
                            });
                        }
                    }
                    check_size(next.len(), owner)?;
                    acc = next;
                }
                acc
            }
            Rule::Choice(members) => {
                let mut alts = Vec::new();
                for member in members {
                    alts.extend(self.expand(member, owner)?);
                    check_size(alts.len(), owner)?;
                }
                alts
            }
            Rule::Repeat(content) => {
                let (aux, _) = self.repetition(content, owner)?;
                vec![single(aux), Alt::empty()]
            }
            Rule::Repeat1(content) => {
                let (aux, nullable) = self.repetition(content, owner)?;
                if nullable {
                    vec![single(aux), Alt::empty()]
                } else {
                    vec![single(aux)]
                }
            }
            Rule::Prec { value, content } => with_prec(self.expand(content, owner)?, *value, Assoc::None),
            Rule::PrecLeft { value, content } => {
                with_prec(self.expand(content, owner)?, *value, Assoc::Left)
            }
            Rule::PrecRight { value, content } => {
                with_prec(self.expand(content, owner)?, *value, Assoc::Right)
            }
        };
        Ok(alts)
    }

    fn terminal(&mut self, key: TerminalKey) -> Sym {
        let (index, _) = self.terminals.insert_full(key, ());
        Sym::Terminal(index)
    }

    /// `aux → aux content | content`, with empty alternatives of `content`
    /// removed. Returns the aux symbol and whether `content` was nullable.
    fn repetition(&mut self, content: &Rule, owner: &str) -> Result<(Sym, bool), CompileError> {
        let count = self.repeat_counts.entry(owner.to_owned()).or_insert(0);
        *count += 1;
        let name = format!("{owner}_repeat{count}");

        let index = self.nonterminals.len();
        self.nonterminals.push(NonTerminal {
            name,
            origin: owner.to_owned(),
            hidden: true,
            alts: Vec::new(),
        });

        let expanded = self.expand(content, owner)?;
        let nullable = expanded.iter().any(|alt| alt.symbols.is_empty());
        let items: Vec<Alt> = expanded
            .into_iter()
            .filter(|alt| !alt.symbols.is_empty())
            .collect();
        if items.is_empty() {
            return Err(CompileError::EmptyRule(owner.to_owned()));
        }

        let mut alts = Vec::with_capacity(items.len() * 2);
        for item in &items {
            let mut symbols = vec![Sym::NonTerminal(index)];
            symbols.extend_from_slice(&item.symbols);
            alts.push(Alt {
                symbols,
                prec: item.prec,
            });
        }
        alts.extend(items);
        check_size(alts.len(), owner)?;

        self.nonterminals[index].alts = dedupe(alts);
        Ok((Sym::NonTerminal(index), nullable))
    }

    fn finish(self, grammar: &Grammar) -> Result<Lowered, CompileError> {
        let terminal_count = self.terminals.len() + 1;
        let symbol_count = terminal_count + self.nonterminals.len() + 1;
        if symbol_count > u16::MAX as usize {
            return Err(CompileError::TooManySymbols(symbol_count));
        }

        let to_id = |sym: Sym| match sym {
            Sym::Terminal(i) => SymbolId((i + 1) as u16),
            Sym::NonTerminal(i) => SymbolId((terminal_count + i) as u16),
        };

        let mut symbols = Vec::with_capacity(symbol_count);
        symbols.push(Symbol {
            name: END_NAME.to_owned(),
            kind: SymbolKind::Terminal,
            visibility: Visibility::Hidden,
        });
        for key in self.terminals.keys() {
            let (name, visibility) = match key {
                TerminalKey::Named(name) if name.starts_with('_') => (name, Visibility::Hidden),
                TerminalKey::Named(name) => (name, Visibility::Named),
                TerminalKey::Literal(text) => (text, Visibility::Anonymous),
            };
            symbols.push(Symbol {
                name: name.clone(),
                kind: SymbolKind::Terminal,
                visibility,
            });
        }
        for nt in &self.nonterminals {
            symbols.push(Symbol {
                name: nt.name.clone(),
                kind: SymbolKind::NonTerminal,
                visibility: if nt.hidden {
                    Visibility::Hidden
                } else {
                    Visibility::Named
                },
            });
        }
        symbols.push(Symbol {
            name: AUGMENTED_NAME.to_owned(),
            kind: SymbolKind::NonTerminal,
            visibility: Visibility::Hidden,
        });

        let start_symbol = to_id(Sym::NonTerminal(0));
        let augmented = SymbolId((symbol_count - 1) as u16);

        let mut productions = vec![Production {
            lhs: augmented,
            rhs: vec![start_symbol],
            precedence: 0,
            assoc: Assoc::None,
        }];
        for (i, nt) in self.nonterminals.iter().enumerate() {
            let lhs = to_id(Sym::NonTerminal(i));
            for alt in &nt.alts {
                let (precedence, assoc) = alt.prec.unwrap_or((0, Assoc::None));
                productions.push(Production {
                    lhs,
                    rhs: alt.symbols.iter().copied().map(to_id).collect(),
                    precedence,
                    assoc,
                });
            }
        }

        let mut origins: Vec<String> = self.nonterminals.iter().map(|nt| nt.origin.clone()).collect();
        origins.push(AUGMENTED_NAME.to_owned());

        let lookup = |key: &TerminalKey| self.terminals.get_index_of(key).map(|i| SymbolId((i + 1) as u16));

        let word = grammar
            .word
            .as_ref()
            .and_then(|w| lookup(&TerminalKey::Named(w.clone())));

        let mut keywords: Vec<SymbolId> = if word.is_some() {
            self.terminals
                .keys()
                .enumerate()
                .filter(|(_, key)| matches!(key, TerminalKey::Literal(text) if is_identifier_like(text)))
                .map(|(i, _)| SymbolId((i + 1) as u16))
                .collect()
        } else {
            Vec::new()
        };
        keywords.sort_unstable();

        let mut externals: Vec<SymbolId> = grammar
            .externals
            .iter()
            .filter_map(|name| lookup(&TerminalKey::Named(name.clone())))
            .collect();
        externals.sort_unstable();
        externals.dedup();

        Ok(Lowered {
            symbols,
            terminal_count: terminal_count as u16,
            productions,
            origins,
            start_symbol,
            word,
            keywords,
            externals,
        })
    }
}

fn single(sym: Sym) -> Alt {
    Alt {
        symbols: vec![sym],
        prec: None,
    }
}

fn with_prec(mut alts: Vec<Alt>, value: i32, assoc: Assoc) -> Vec<Alt> {
    for alt in &mut alts {
        alt.prec.get_or_insert((value, assoc));
    }
    alts
}

fn check_size(len: usize, owner: &str) -> Result<(), CompileError> {
    if len > MAX_ALTERNATIVES {
        return Err(CompileError::TooManyAlternatives(owner.to_owned()));
    }
    Ok(())
}

fn dedupe(alts: Vec<Alt>) -> Vec<Alt> {
    let mut seen = IndexMap::new();
    for alt in alts {
        seen.entry(alt.symbols.clone()).or_insert(alt);
    }
    seen.into_values().collect()
}

/// Literal text that the word token's pattern could also match.
pub(crate) fn is_identifier_like(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
