//! The Kusto Query Language grammar.
//!
//! Precedence, loosest first: `and`/`or` (1); comparisons, string operators,
//! `in` and `between` (2); `+ -` (3); `* / %` (4); unary minus (5); `::` (6).

use kql_core::Grammar;
use kql_core::Rule;
use kql_core::grammar::dsl::*;

const PREC_LOGICAL: i32 = 1;
const PREC_COMPARE: i32 = 2;
const PREC_ADDITIVE: i32 = 3;
const PREC_MULTIPLICATIVE: i32 = 4;
const PREC_UNARY: i32 = 5;
const PREC_CAST: i32 = 6;

pub fn grammar() -> Grammar {
    Grammar::new("kql")
        .word("identifier")
        .conflict(&["distinct_clause"])
        .conflict(&["parse_pattern"])
        // Statements
        .rule("source_file", repeat(sym("_statement")))
        .rule(
            "_statement",
            choice([sym("let_statement"), sym("query_statement"), sym("_search_term")]),
        )
        .rule(
            "let_statement",
            seq([
                lit("let"),
                sym("identifier"),
                lit("="),
                sym("_expression"),
                lit(";"),
            ]),
        )
        .rule(
            "query_statement",
            seq([sym("table_name"), repeat(sym("pipe_expression"))]),
        )
        .rule(
            "_search_term",
            seq([sym("identifier"), lit(":"), sym("_search_value")]),
        )
        .rule(
            "_search_value",
            choice([
                sym("identifier"),
                sym("number_literal"),
                sym("timespan_literal"),
                sym("string_literal"),
            ]),
        )
        .rule("pipe_expression", seq([lit("|"), sym("_operator")]))
        .rule("table_name", sym("identifier"))
        // Tabular operators
        .rule(
            "_operator",
            choice([
                sym("where_clause"),
                sym("project_clause"),
                sym("extend_clause"),
                sym("summarize_clause"),
                sym("join_clause"),
                sym("union_clause"),
                sym("parse_clause"),
                sym("mv_expand_clause"),
                sym("take_clause"),
                sym("limit_clause"),
                sym("sort_clause"),
                sym("order_clause"),
                sym("distinct_clause"),
                sym("count_clause"),
                sym("top_clause"),
                sym("search_clause"),
            ]),
        )
        .rule("where_clause", seq([lit("where"), sym("_expression")]))
        .rule("project_clause", seq([lit("project"), sym("column_list")]))
        .rule("extend_clause", seq([lit("extend"), sym("column_list")]))
        .rule(
            "summarize_clause",
            seq([
                lit("summarize"),
                sym("aggregation_list"),
                optional(seq([lit("by"), sym("expression_list")])),
            ]),
        )
        .rule("aggregation_list", comma_sep1(sym("aggregation_expression")))
        .rule("aggregation_expression", assignment_or_expression())
        .rule("expression_list", comma_sep1(sym("_expression")))
        .rule(
            "join_clause",
            seq([
                lit("join"),
                optional(seq([lit("kind"), lit("="), sym("join_kind")])),
                choice([
                    seq([lit("("), sym("table_name"), lit(")")]),
                    sym("table_name"),
                ]),
                lit("on"),
                sym("join_conditions"),
            ]),
        )
        .rule(
            "join_kind",
            one_of(&[
                "inner",
                "leftouter",
                "rightouter",
                "leftanti",
                "rightanti",
                "leftsemi",
                "rightsemi",
                "fullouter",
            ]),
        )
        .rule("join_conditions", comma_sep1(sym("join_condition")))
        .rule(
            "join_condition",
            choice([
                seq([
                    optional(lit("$left.")),
                    sym("identifier"),
                    lit("=="),
                    optional(lit("$right.")),
                    sym("identifier"),
                ]),
                sym("identifier"),
            ]),
        )
        .rule(
            "union_clause",
            seq([
                lit("union"),
                optional(seq([lit("kind"), lit("="), sym("union_kind")])),
                optional(seq([lit("isfuzzy"), lit("="), one_of(&["true", "false"])])),
                sym("table_list"),
            ]),
        )
        .rule("union_kind", one_of(&["inner", "outer"]))
        .rule("table_list", comma_sep1(sym("table_name")))
        .rule(
            "parse_clause",
            seq([
                lit("parse"),
                optional(seq([lit("kind"), lit("="), sym("parse_kind")])),
                optional(seq([lit("flags"), lit("="), sym("string_literal")])),
                sym("_expression"),
                lit("with"),
                sym("parse_pattern"),
            ]),
        )
        .rule("parse_kind", one_of(&["simple", "regex", "relaxed"]))
        // A column name after the pattern is always taken as another column.
        .rule(
            "parse_pattern",
            seq([
                optional(lit("*")),
                sym("string_literal"),
                repeat(seq([
                    sym("identifier"),
                    optional(seq([lit(":"), sym("identifier")])),
                    optional(sym("string_literal")),
                ])),
                optional(lit("*")),
            ]),
        )
        .rule(
            "mv_expand_clause",
            seq([
                one_of(&["mv-expand", "mvexpand"]),
                sym("_expression"),
                optional(seq([
                    lit("to"),
                    lit("typeof"),
                    lit("("),
                    sym("identifier"),
                    lit(")"),
                ])),
                optional(seq([lit("limit"), sym("number_literal")])),
            ]),
        )
        .rule("take_clause", seq([lit("take"), sym("number_literal")]))
        .rule("limit_clause", seq([lit("limit"), sym("number_literal")]))
        .rule(
            "top_clause",
            seq([
                lit("top"),
                sym("number_literal"),
                optional(seq([
                    lit("by"),
                    sym("identifier"),
                    optional(one_of(&["asc", "desc"])),
                ])),
            ]),
        )
        .rule(
            "search_clause",
            seq([
                lit("search"),
                optional(seq([
                    lit("in"),
                    lit("("),
                    sym("column_list"),
                    lit(")"),
                ])),
                sym("string_literal"),
            ]),
        )
        .rule(
            "sort_clause",
            seq([
                lit("sort"),
                optional(lit("by")),
                sym("sort_expression_list"),
            ]),
        )
        .rule(
            "order_clause",
            seq([lit("order"), lit("by"), sym("sort_expression_list")]),
        )
        .rule("sort_expression_list", comma_sep1(sym("sort_expression")))
        .rule(
            "sort_expression",
            seq([sym("identifier"), optional(one_of(&["asc", "desc"]))]),
        )
        .rule(
            "distinct_clause",
            choice([seq([lit("distinct"), sym("column_list")]), lit("distinct")]),
        )
        .rule("count_clause", lit("count"))
        .rule("column_list", comma_sep1(sym("_column_expression")))
        .rule(
            "_column_expression",
            choice([sym("column_assignment"), sym("_expression")]),
        )
        .rule(
            "column_assignment",
            seq([sym("identifier"), lit("="), sym("_expression")]),
        )
        // Expressions
        .rule(
            "_expression",
            choice([
                sym("binary_expression"),
                sym("comparison_expression"),
                sym("arithmetic_expression"),
                sym("string_expression"),
                sym("in_expression"),
                sym("between_expression"),
                sym("unary_expression"),
                sym("parenthesized_expression"),
                sym("conditional_expression"),
                sym("type_cast_expression"),
                sym("function_call"),
                sym("_literal"),
                sym("qualified_identifier"),
                sym("identifier"),
            ]),
        )
        .rule(
            "binary_expression",
            infix(PREC_LOGICAL, &["and", "or"]),
        )
        .rule(
            "comparison_expression",
            infix(PREC_COMPARE, &["==", "!=", ">", "<", ">=", "<="]),
        )
        .rule(
            "arithmetic_expression",
            choice([
                infix(PREC_MULTIPLICATIVE, &["*", "/", "%"]),
                infix(PREC_ADDITIVE, &["+", "-"]),
            ]),
        )
        .rule(
            "string_expression",
            prec_left(
                PREC_COMPARE,
                seq([
                    sym("_expression"),
                    one_of(&["contains", "startswith", "endswith", "matches", "has"]),
                    sym("string_literal"),
                ]),
            ),
        )
        .rule(
            "in_expression",
            prec_left(
                PREC_COMPARE,
                seq([
                    sym("_expression"),
                    lit("in"),
                    lit("("),
                    sym("literal_list"),
                    lit(")"),
                ]),
            ),
        )
        .rule(
            "between_expression",
            prec_left(
                PREC_COMPARE,
                seq([
                    sym("_expression"),
                    lit("between"),
                    lit("("),
                    sym("_between_value"),
                    lit(".."),
                    sym("_between_value"),
                    lit(")"),
                ]),
            ),
        )
        .rule(
            "_between_value",
            choice([sym("_literal"), sym("function_call")]),
        )
        .rule("literal_list", comma_sep1(sym("_literal")))
        .rule(
            "unary_expression",
            prec(PREC_UNARY, seq([lit("-"), sym("_expression")])),
        )
        .rule(
            "parenthesized_expression",
            seq([lit("("), sym("_expression"), lit(")")]),
        )
        .rule(
            "conditional_expression",
            choice([
                seq([
                    lit("iff"),
                    lit("("),
                    sym("_expression"),
                    lit(","),
                    sym("_expression"),
                    lit(","),
                    sym("_expression"),
                    lit(")"),
                ]),
                seq([
                    lit("case"),
                    lit("("),
                    comma_sep1(sym("_expression")),
                    lit(")"),
                ]),
            ]),
        )
        .rule(
            "type_cast_expression",
            choice([
                prec_left(
                    PREC_CAST,
                    seq([sym("_expression"), lit("::"), sym("identifier")]),
                ),
                seq([
                    lit("to"),
                    sym("identifier"),
                    lit("("),
                    sym("_expression"),
                    lit(")"),
                ]),
            ]),
        )
        .rule(
            "function_call",
            seq([
                sym("identifier"),
                lit("("),
                optional(sym("argument_list")),
                lit(")"),
            ]),
        )
        .rule("argument_list", comma_sep1(sym("_argument")))
        .rule(
            "_argument",
            choice([sym("named_argument"), sym("_expression")]),
        )
        .rule(
            "named_argument",
            seq([sym("identifier"), lit("="), sym("_expression")]),
        )
        .rule(
            "qualified_identifier",
            seq([sym("identifier"), lit("."), sym("identifier")]),
        )
        // Literals
        .rule(
            "_literal",
            choice([
                sym("string_literal"),
                sym("number_literal"),
                sym("boolean_literal"),
                sym("null_literal"),
                sym("timespan_literal"),
                sym("array_literal"),
                sym("dynamic_literal"),
            ]),
        )
        .rule(
            "string_literal",
            choice([quoted("\""), quoted("'")]),
        )
        .rule("boolean_literal", one_of(&["true", "false"]))
        .rule("null_literal", lit("null"))
        .rule(
            "array_literal",
            seq([
                lit("["),
                optional(comma_sep1(sym("_expression"))),
                lit("]"),
            ]),
        )
        .rule(
            "dynamic_literal",
            seq([
                lit("dynamic"),
                lit("("),
                choice([
                    sym("string_literal"),
                    sym("array_literal"),
                    sym("number_literal"),
                ]),
                lit(")"),
            ]),
        )
}

/// `identifier = expr` or a bare expression.
fn assignment_or_expression() -> Rule {
    choice([
        seq([sym("identifier"), lit("="), sym("_expression")]),
        sym("_expression"),
    ])
}

/// Left-associative `expr op expr` for each operator.
fn infix(precedence: i32, operators: &[&str]) -> Rule {
    prec_left(
        precedence,
        seq([sym("_expression"), one_of(operators), sym("_expression")]),
    )
}

fn quoted(quote: &str) -> Rule {
    seq([
        lit(quote),
        repeat(choice([sym("string_content"), sym("escape_sequence")])),
        lit(quote),
    ])
}
