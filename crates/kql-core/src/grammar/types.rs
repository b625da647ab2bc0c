//! Grammar type definitions.

use serde::{Deserialize, Serialize};

/// Complete grammar definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar name (e.g., "kql").
    pub name: String,
    /// Production rules, preserving definition order. The first rule is the start symbol.
    pub rules: Vec<(String, Rule)>,
    /// Expected conflicts, as groups of rule names.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    /// Terminals produced by an external scanner instead of the lexer.
    #[serde(default)]
    pub externals: Vec<String>,
    /// Identifier-like terminal that keywords fall back to.
    #[serde(default)]
    pub word: Option<String>,
}

/// Grammar rule variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// Epsilon (empty match).
    Blank,
    /// Literal token, e.g. `"where"` or `"|"`.
    String(String),
    /// Reference to another rule, or to a named terminal when no rule has that name.
    Symbol(String),
    /// Sequence of rules (must match in order).
    Seq(Vec<Rule>),
    /// Alternation.
    Choice(Vec<Rule>),
    /// Zero or more repetitions.
    Repeat(Box<Rule>),
    /// One or more repetitions.
    Repeat1(Box<Rule>),
    /// Precedence without associativity.
    Prec { value: i32, content: Box<Rule> },
    /// Left-associative precedence.
    PrecLeft { value: i32, content: Box<Rule> },
    /// Right-associative precedence.
    PrecRight { value: i32, content: Box<Rule> },
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            conflicts: Vec::new(),
            externals: Vec::new(),
            word: None,
        }
    }

    /// Append a rule. The first rule added becomes the start symbol.
    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.push((name.into(), rule));
        self
    }

    /// Declare an expected conflict between the named rules.
    pub fn conflict(mut self, rules: &[&str]) -> Self {
        self.conflicts
            .push(rules.iter().map(|r| (*r).to_owned()).collect());
        self
    }

    pub fn external(mut self, name: impl Into<String>) -> Self {
        self.externals.push(name.into());
        self
    }

    pub fn word(mut self, name: impl Into<String>) -> Self {
        self.word = Some(name.into());
        self
    }

    pub fn start_rule(&self) -> Option<&str> {
        self.rules.first().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find_map(|(n, rule)| (n == name).then_some(rule))
    }
}
