//! Rule constructors mirroring tree-sitter's `grammar.js` helpers.
//!
//! ```
//! use kql_core::grammar::dsl::*;
//!
//! let rule = seq([lit("take"), sym("number_literal")]);
//! assert!(matches!(rule, kql_core::Rule::Seq(_)));
//! ```

use super::Rule;

pub fn lit(text: &str) -> Rule {
    Rule::String(text.to_owned())
}

pub fn sym(name: &str) -> Rule {
    Rule::Symbol(name.to_owned())
}

pub fn blank() -> Rule {
    Rule::Blank
}

pub fn seq(items: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Seq(items.into_iter().collect())
}

pub fn choice(items: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Choice(items.into_iter().collect())
}

pub fn optional(rule: Rule) -> Rule {
    Rule::Choice(vec![rule, Rule::Blank])
}

pub fn repeat(rule: Rule) -> Rule {
    Rule::Repeat(Box::new(rule))
}

pub fn repeat1(rule: Rule) -> Rule {
    Rule::Repeat1(Box::new(rule))
}

pub fn prec(value: i32, rule: Rule) -> Rule {
    Rule::Prec {
        value,
        content: Box::new(rule),
    }
}

pub fn prec_left(value: i32, rule: Rule) -> Rule {
    Rule::PrecLeft {
        value,
        content: Box::new(rule),
    }
}

pub fn prec_right(value: i32, rule: Rule) -> Rule {
    Rule::PrecRight {
        value,
        content: Box::new(rule),
    }
}

/// `item ("," item)*`
pub fn comma_sep1(item: Rule) -> Rule {
    seq([item.clone(), repeat(seq([lit(","), item]))])
}

/// Choice over literal keywords or operators.
pub fn one_of(texts: &[&str]) -> Rule {
    choice(texts.iter().map(|t| lit(t)))
}
