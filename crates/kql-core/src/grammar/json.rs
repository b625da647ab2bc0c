//! JSON deserialization for grammar.json files.
//!
//! Tree-sitter's grammar.json uses internally-tagged enums with a `type` field.
//! Only the syntactic subset is kept: rules whose body contains a `PATTERN` or
//! `TOKEN` are lexical, so they are dropped and their name becomes a named
//! terminal that the lexer has to provide. `FIELD` and `PREC_DYNAMIC` are
//! unwrapped; `ALIAS` has no table representation and is rejected.

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{Grammar, Rule};
use crate::GrammarError;

impl Grammar {
    /// Parse grammar from JSON string.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw: RawGrammar = serde_json::from_str(json)?;
        raw.try_into()
    }
}

/// Raw grammar structure matching tree-sitter's JSON format.
///
/// Unknown keys (`extras`, `inline`, `supertypes`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct RawGrammar {
    name: String,
    rules: IndexMap<String, RawRule>,
    #[serde(default)]
    conflicts: Vec<Vec<String>>,
    #[serde(default)]
    externals: Vec<RawRule>,
    #[serde(default)]
    word: Option<String>,
}

impl TryFrom<RawGrammar> for Grammar {
    type Error = GrammarError;

    fn try_from(raw: RawGrammar) -> Result<Self, Self::Error> {
        let mut rules = Vec::with_capacity(raw.rules.len());
        // IndexMap preserves insertion order, which matches tree-sitter's definition order.
        // The entry rule is always first.
        for (name, rule) in raw.rules {
            if rule.is_lexical() {
                continue;
            }
            let rule = rule.into_rule(&name)?;
            rules.push((name, rule));
        }

        let mut externals = Vec::with_capacity(raw.externals.len());
        for external in raw.externals {
            match external {
                RawRule::SYMBOL { name } | RawRule::STRING { value: name } => externals.push(name),
                _ => {
                    return Err(GrammarError::Unsupported {
                        rule: "externals".to_owned(),
                        kind: external.kind(),
                    });
                }
            }
        }

        Ok(Self {
            name: raw.name,
            rules,
            conflicts: raw.conflicts,
            externals,
            word: raw.word,
        })
    }
}

/// Raw rule matching tree-sitter's JSON format.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
enum RawRule {
    BLANK,
    STRING {
        value: String,
    },
    PATTERN {
        #[allow(dead_code)]
        value: String,
    },
    SYMBOL {
        name: String,
    },
    SEQ {
        members: Vec<RawRule>,
    },
    CHOICE {
        members: Vec<RawRule>,
    },
    REPEAT {
        content: Box<RawRule>,
    },
    REPEAT1 {
        content: Box<RawRule>,
    },
    FIELD {
        #[allow(dead_code)]
        name: String,
        content: Box<RawRule>,
    },
    ALIAS {
        content: Box<RawRule>,
    },
    /// Content is lexical and never read.
    TOKEN {},
    IMMEDIATE_TOKEN {},
    PREC {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_LEFT {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_RIGHT {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_DYNAMIC {
        #[allow(dead_code)]
        value: i32,
        content: Box<RawRule>,
    },
}

/// Raw precedence value. Named precedences are ordered by tree-sitter's
/// `precedences` list, which the table builder does not model; they count as 0.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrecedence {
    Integer(i32),
    Name(#[allow(dead_code)] String),
}

impl RawPrecedence {
    fn value(&self) -> i32 {
        match self {
            RawPrecedence::Integer(n) => *n,
            RawPrecedence::Name(_) => 0,
        }
    }
}

impl RawRule {
    fn kind(&self) -> &'static str {
        match self {
            RawRule::BLANK => "BLANK",
            RawRule::STRING { .. } => "STRING",
            RawRule::PATTERN { .. } => "PATTERN",
            RawRule::SYMBOL { .. } => "SYMBOL",
            RawRule::SEQ { .. } => "SEQ",
            RawRule::CHOICE { .. } => "CHOICE",
            RawRule::REPEAT { .. } => "REPEAT",
            RawRule::REPEAT1 { .. } => "REPEAT1",
            RawRule::FIELD { .. } => "FIELD",
            RawRule::ALIAS { .. } => "ALIAS",
            RawRule::TOKEN { .. } => "TOKEN",
            RawRule::IMMEDIATE_TOKEN { .. } => "IMMEDIATE_TOKEN",
            RawRule::PREC { .. } => "PREC",
            RawRule::PREC_LEFT { .. } => "PREC_LEFT",
            RawRule::PREC_RIGHT { .. } => "PREC_RIGHT",
            RawRule::PREC_DYNAMIC { .. } => "PREC_DYNAMIC",
        }
    }

    /// True if the rule describes characters rather than tokens.
    fn is_lexical(&self) -> bool {
        match self {
            RawRule::PATTERN { .. } | RawRule::TOKEN { .. } | RawRule::IMMEDIATE_TOKEN { .. } => {
                true
            }
            RawRule::SEQ { members } | RawRule::CHOICE { members } => {
                members.iter().any(RawRule::is_lexical)
            }
            RawRule::REPEAT { content }
            | RawRule::REPEAT1 { content }
            | RawRule::FIELD { content, .. }
            | RawRule::ALIAS { content }
            | RawRule::PREC { content, .. }
            | RawRule::PREC_LEFT { content, .. }
            | RawRule::PREC_RIGHT { content, .. }
            | RawRule::PREC_DYNAMIC { content, .. } => content.is_lexical(),
            RawRule::BLANK | RawRule::STRING { .. } | RawRule::SYMBOL { .. } => false,
        }
    }

    fn into_rule(self, owner: &str) -> Result<Rule, GrammarError> {
        let conv = |content: Box<RawRule>| content.into_rule(owner).map(Box::new);
        let members = |members: Vec<RawRule>| {
            members
                .into_iter()
                .map(|m| m.into_rule(owner))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(match self {
            RawRule::BLANK => Rule::Blank,
            RawRule::STRING { value } => Rule::String(value),
            RawRule::SYMBOL { name } => Rule::Symbol(name),
            RawRule::SEQ { members: m } => Rule::Seq(members(m)?),
            RawRule::CHOICE { members: m } => Rule::Choice(members(m)?),
            RawRule::REPEAT { content } => Rule::Repeat(conv(content)?),
            RawRule::REPEAT1 { content } => Rule::Repeat1(conv(content)?),
            RawRule::FIELD { content, .. } | RawRule::PREC_DYNAMIC { content, .. } => {
                content.into_rule(owner)?
            }
            RawRule::PREC { value, content } => Rule::Prec {
                value: value.value(),
                content: conv(content)?,
            },
            RawRule::PREC_LEFT { value, content } => Rule::PrecLeft {
                value: value.value(),
                content: conv(content)?,
            },
            RawRule::PREC_RIGHT { value, content } => Rule::PrecRight {
                value: value.value(),
                content: conv(content)?,
            },
            other @ (RawRule::ALIAS { .. }
            | RawRule::PATTERN { .. }
            | RawRule::TOKEN { .. }
            | RawRule::IMMEDIATE_TOKEN { .. }) => {
                return Err(GrammarError::Unsupported {
                    rule: owner.to_owned(),
                    kind: other.kind(),
                });
            }
        })
    }
}
