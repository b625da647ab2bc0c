//! Typed views over KQL syntax trees.
//!
//! Each struct wraps a [`Node`] and offers accessors for its parts. Casting
//! checks the node's kind name, so the wrappers work with any table built
//! from the KQL grammar. Accessors return `None` where recovery left an
//! error node or a part is absent.
//!
//! ```
//! use kql_lib::ast::{Operator, SourceFile, Statement};
//! use kql_lib::{Language, Parser};
//!
//! let tree = Parser::new(Language::kql()).parse("StormEvents | take 10");
//! let file = SourceFile::cast(tree.root()).unwrap();
//! let Some(Statement::Query(query)) = file.statements().next() else {
//!     unreachable!()
//! };
//! assert!(matches!(query.operators().next(), Some(Operator::Take(take)) if take.count() == Some(10)));
//! ```

#[cfg(test)]
mod ast_tests;

use crate::tree::Node;

macro_rules! ast_node {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name<'t>(Node<'t>);

        impl<'t> $name<'t> {
            pub fn can_cast(node: &Node<'_>) -> bool {
                node.kind_name() == $kind
            }

            pub fn cast(node: Node<'t>) -> Option<Self> {
                Self::can_cast(&node).then(|| Self(node))
            }

            pub fn as_node(&self) -> &Node<'t> {
                &self.0
            }
        }
    };
}

macro_rules! ast_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident($ty:ident)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub enum $name<'t> {
            $($variant($ty<'t>)),+
        }

        impl<'t> $name<'t> {
            pub fn can_cast(node: &Node<'_>) -> bool {
                $($ty::can_cast(node))||+
            }

            pub fn cast(node: Node<'t>) -> Option<Self> {
                $(
                    if $ty::can_cast(&node) {
                        return $ty::cast(node).map(Self::$variant);
                    }
                )+
                None
            }

            pub fn as_node(&self) -> &Node<'t> {
                match self {
                    $(Self::$variant(inner) => inner.as_node()),+
                }
            }
        }
    };
}

ast_node!(SourceFile, "source_file");
ast_node!(LetStatement, "let_statement");
ast_node!(QueryStatement, "query_statement");
ast_node!(TableName, "table_name");
ast_node!(PipeExpression, "pipe_expression");

ast_node!(WhereClause, "where_clause");
ast_node!(ProjectClause, "project_clause");
ast_node!(ExtendClause, "extend_clause");
ast_node!(SummarizeClause, "summarize_clause");
ast_node!(AggregationExpression, "aggregation_expression");
ast_node!(JoinClause, "join_clause");
ast_node!(JoinCondition, "join_condition");
ast_node!(UnionClause, "union_clause");
ast_node!(ParseClause, "parse_clause");
ast_node!(ParsePattern, "parse_pattern");
ast_node!(MvExpandClause, "mv_expand_clause");
ast_node!(TakeClause, "take_clause");
ast_node!(LimitClause, "limit_clause");
ast_node!(SortClause, "sort_clause");
ast_node!(OrderClause, "order_clause");
ast_node!(SortExpression, "sort_expression");
ast_node!(DistinctClause, "distinct_clause");
ast_node!(CountClause, "count_clause");
ast_node!(TopClause, "top_clause");
ast_node!(SearchClause, "search_clause");
ast_node!(ColumnAssignment, "column_assignment");

ast_node!(BinaryExpression, "binary_expression");
ast_node!(ComparisonExpression, "comparison_expression");
ast_node!(ArithmeticExpression, "arithmetic_expression");
ast_node!(StringExpression, "string_expression");
ast_node!(InExpression, "in_expression");
ast_node!(BetweenExpression, "between_expression");
ast_node!(UnaryExpression, "unary_expression");
ast_node!(ParenthesizedExpression, "parenthesized_expression");
ast_node!(ConditionalExpression, "conditional_expression");
ast_node!(TypeCastExpression, "type_cast_expression");
ast_node!(FunctionCall, "function_call");
ast_node!(NamedArgument, "named_argument");
ast_node!(QualifiedIdentifier, "qualified_identifier");
ast_node!(Identifier, "identifier");

ast_node!(StringLiteral, "string_literal");
ast_node!(NumberLiteral, "number_literal");
ast_node!(BooleanLiteral, "boolean_literal");
ast_node!(NullLiteral, "null_literal");
ast_node!(TimespanLiteral, "timespan_literal");
ast_node!(ArrayLiteral, "array_literal");
ast_node!(DynamicLiteral, "dynamic_literal");

ast_enum!(Statement {
    Let(LetStatement),
    Query(QueryStatement),
});

ast_enum!(
    /// A tabular operator after `|`.
    Operator {
        Where(WhereClause),
        Project(ProjectClause),
        Extend(ExtendClause),
        Summarize(SummarizeClause),
        Join(JoinClause),
        Union(UnionClause),
        Parse(ParseClause),
        MvExpand(MvExpandClause),
        Take(TakeClause),
        Limit(LimitClause),
        Sort(SortClause),
        Order(OrderClause),
        Distinct(DistinctClause),
        Count(CountClause),
        Top(TopClause),
        Search(SearchClause),
    }
);

ast_enum!(Expr {
    Binary(BinaryExpression),
    Comparison(ComparisonExpression),
    Arithmetic(ArithmeticExpression),
    String(StringExpression),
    In(InExpression),
    Between(BetweenExpression),
    Unary(UnaryExpression),
    Parenthesized(ParenthesizedExpression),
    Conditional(ConditionalExpression),
    TypeCast(TypeCastExpression),
    Call(FunctionCall),
    Literal(Literal),
    Qualified(QualifiedIdentifier),
    Identifier(Identifier),
});

ast_enum!(Literal {
    String(StringLiteral),
    Number(NumberLiteral),
    Boolean(BooleanLiteral),
    Null(NullLiteral),
    Timespan(TimespanLiteral),
    Array(ArrayLiteral),
    Dynamic(DynamicLiteral),
});

ast_enum!(
    /// An entry of `project`, `extend`, `distinct` or `search in (...)`.
    Column {
        Assignment(ColumnAssignment),
        Expr(Expr),
    }
);

ast_enum!(Argument {
    Named(NamedArgument),
    Positional(Expr),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    Simple,
    Regex,
    Relaxed,
}

/// `field:value` at statement level. The grammar splices these into the
/// source file, so they have no node of their own.
#[derive(Debug, Clone)]
pub struct SearchTerm<'t> {
    pub field: Identifier<'t>,
    pub value: Expr<'t>,
}

/// A column captured by a `parse` pattern: `Name`, `Name:type`, optionally
/// followed by the text that separates it from the next column.
#[derive(Debug, Clone)]
pub struct PatternColumn<'t> {
    pub name: Identifier<'t>,
    pub ty: Option<Identifier<'t>>,
    pub separator: Option<StringLiteral<'t>>,
}

/// Children that are not trivia.
fn significant<'t>(node: &Node<'t>) -> impl Iterator<Item = Node<'t>> + use<'t> {
    node.children().filter(|child| !child.is_extra())
}

fn is_token(node: &Node<'_>, text: &str) -> bool {
    node.is_token() && !node.is_named() && node.kind_name() == text
}

/// First named child after the anonymous token `text`.
fn named_after<'t>(node: &Node<'t>, text: &str) -> Option<Node<'t>> {
    significant(node)
        .skip_while(|child| !is_token(child, text))
        .skip(1)
        .find(Node::is_named)
}

/// The first anonymous token, e.g. the operator of an infix expression.
fn first_token_text(node: &Node<'_>) -> Option<String> {
    significant(node)
        .find(|child| !child.is_named())
        .map(|token| token.text())
}

fn direction(node: &Node<'_>) -> Option<SortDirection> {
    significant(node).find_map(|child| {
        if is_token(&child, "asc") {
            Some(SortDirection::Asc)
        } else if is_token(&child, "desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    })
}

/// Items of the `kind` list child, e.g. `column_list`.
fn list_items<'t, T>(
    node: &Node<'t>,
    kind: &'static str,
    cast: fn(Node<'t>) -> Option<T>,
) -> impl Iterator<Item = T> + use<'t, T> {
    node.children()
        .filter(move |child| child.kind_name() == kind)
        .flat_map(|list| list.children())
        .filter_map(cast)
}

fn count_literal(node: Option<Node<'_>>) -> Option<u64> {
    node.and_then(NumberLiteral::cast)?.0.text().parse().ok()
}

impl<'t> SourceFile<'t> {
    pub fn statements(&self) -> impl Iterator<Item = Statement<'t>> + use<'t> {
        self.0.children().filter_map(Statement::cast)
    }

    pub fn search_terms(&self) -> Vec<SearchTerm<'t>> {
        let children: Vec<Node<'t>> = significant(&self.0).collect();
        children
            .windows(3)
            .filter_map(|window| {
                let field = Identifier::cast(window[0].clone())?;
                if !is_token(&window[1], ":") {
                    return None;
                }
                let value = Expr::cast(window[2].clone())?;
                Some(SearchTerm { field, value })
            })
            .collect()
    }
}

impl<'t> LetStatement<'t> {
    pub fn name(&self) -> Option<Identifier<'t>> {
        self.0.children().find_map(Identifier::cast)
    }

    pub fn value(&self) -> Option<Expr<'t>> {
        named_after(&self.0, "=").and_then(Expr::cast)
    }
}

impl<'t> QueryStatement<'t> {
    pub fn table(&self) -> Option<TableName<'t>> {
        self.0.children().find_map(TableName::cast)
    }

    pub fn pipes(&self) -> impl Iterator<Item = PipeExpression<'t>> + use<'t> {
        self.0.children().filter_map(PipeExpression::cast)
    }

    /// Operators of the pipes that parsed.
    pub fn operators(&self) -> impl Iterator<Item = Operator<'t>> + use<'t> {
        self.pipes().filter_map(|pipe| pipe.operator())
    }
}

impl<'t> TableName<'t> {
    pub fn name(&self) -> Option<Identifier<'t>> {
        self.0.children().find_map(Identifier::cast)
    }
}

impl<'t> PipeExpression<'t> {
    pub fn operator(&self) -> Option<Operator<'t>> {
        self.0.children().find_map(Operator::cast)
    }
}

impl<'t> WhereClause<'t> {
    pub fn predicate(&self) -> Option<Expr<'t>> {
        self.0.children().find_map(Expr::cast)
    }
}

impl<'t> ProjectClause<'t> {
    pub fn columns(&self) -> impl Iterator<Item = Column<'t>> + use<'t> {
        list_items(&self.0, "column_list", Column::cast)
    }
}

impl<'t> ExtendClause<'t> {
    pub fn columns(&self) -> impl Iterator<Item = Column<'t>> + use<'t> {
        list_items(&self.0, "column_list", Column::cast)
    }
}

impl<'t> DistinctClause<'t> {
    /// Empty for a bare `distinct`.
    pub fn columns(&self) -> impl Iterator<Item = Column<'t>> + use<'t> {
        list_items(&self.0, "column_list", Column::cast)
    }
}

impl<'t> ColumnAssignment<'t> {
    pub fn name(&self) -> Option<Identifier<'t>> {
        self.0.children().find_map(Identifier::cast)
    }

    pub fn value(&self) -> Option<Expr<'t>> {
        named_after(&self.0, "=").and_then(Expr::cast)
    }
}

impl<'t> SummarizeClause<'t> {
    pub fn aggregations(&self) -> impl Iterator<Item = AggregationExpression<'t>> + use<'t> {
        list_items(&self.0, "aggregation_list", AggregationExpression::cast)
    }

    /// Grouping expressions after `by`.
    pub fn by(&self) -> impl Iterator<Item = Expr<'t>> + use<'t> {
        list_items(&self.0, "expression_list", Expr::cast)
    }
}

impl<'t> AggregationExpression<'t> {
    fn is_named(&self) -> bool {
        significant(&self.0).any(|child| is_token(&child, "="))
    }

    /// The result column in `name = expr`.
    pub fn name(&self) -> Option<Identifier<'t>> {
        self.is_named()
            .then(|| self.0.children().find_map(Identifier::cast))
            .flatten()
    }

    pub fn value(&self) -> Option<Expr<'t>> {
        if self.is_named() {
            named_after(&self.0, "=").and_then(Expr::cast)
        } else {
            self.0.children().find_map(Expr::cast)
        }
    }
}

impl<'t> JoinClause<'t> {
    pub fn kind(&self) -> Option<String> {
        self.0
            .children()
            .find(|child| child.kind_name() == "join_kind")
            .map(|kind| kind.text())
    }

    pub fn table(&self) -> Option<TableName<'t>> {
        self.0.children().find_map(TableName::cast)
    }

    pub fn conditions(&self) -> impl Iterator<Item = JoinCondition<'t>> + use<'t> {
        list_items(&self.0, "join_conditions", JoinCondition::cast)
    }
}

impl<'t> JoinCondition<'t> {
    /// Column of the left table; the only column for `on Id`.
    pub fn left(&self) -> Option<Identifier<'t>> {
        self.0.children().find_map(Identifier::cast)
    }

    pub fn right(&self) -> Option<Identifier<'t>> {
        self.0.children().filter_map(Identifier::cast).last()
    }
}

impl<'t> UnionClause<'t> {
    pub fn kind(&self) -> Option<String> {
        self.0
            .children()
            .find(|child| child.kind_name() == "union_kind")
            .map(|kind| kind.text())
    }

    pub fn is_fuzzy(&self) -> Option<bool> {
        significant(&self.0).find_map(|child| {
            if is_token(&child, "true") {
                Some(true)
            } else if is_token(&child, "false") {
                Some(false)
            } else {
                None
            }
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = TableName<'t>> + use<'t> {
        list_items(&self.0, "table_list", TableName::cast)
    }
}

impl<'t> ParseClause<'t> {
    pub fn kind(&self) -> Option<ParseKind> {
        let kind = self
            .0
            .children()
            .find(|child| child.kind_name() == "parse_kind")?;
        match kind.text().as_str() {
            "simple" => Some(ParseKind::Simple),
            "regex" => Some(ParseKind::Regex),
            "relaxed" => Some(ParseKind::Relaxed),
            _ => None,
        }
    }

    pub fn flags(&self) -> Option<StringLiteral<'t>> {
        named_after(&self.0, "flags").and_then(StringLiteral::cast)
    }

    /// The expression being parsed, in front of `with`.
    pub fn source(&self) -> Option<Expr<'t>> {
        significant(&self.0)
            .take_while(|child| !is_token(child, "with"))
            .filter_map(Expr::cast)
            .last()
    }

    pub fn pattern(&self) -> Option<ParsePattern<'t>> {
        self.0.children().find_map(ParsePattern::cast)
    }
}

impl<'t> ParsePattern<'t> {
    pub fn leading_wildcard(&self) -> bool {
        significant(&self.0)
            .next()
            .is_some_and(|first| is_token(&first, "*"))
    }

    pub fn trailing_wildcard(&self) -> bool {
        significant(&self.0)
            .last()
            .is_some_and(|last| is_token(&last, "*"))
    }

    /// The text that must precede the first column.
    pub fn prefix(&self) -> Option<StringLiteral<'t>> {
        self.0.children().find_map(StringLiteral::cast)
    }

    pub fn columns(&self) -> Vec<PatternColumn<'t>> {
        let mut columns: Vec<PatternColumn<'t>> = Vec::new();
        let mut typed = false;
        let rest = significant(&self.0)
            .skip_while(|child| !StringLiteral::can_cast(child))
            .skip(1);
        for child in rest {
            if is_token(&child, ":") {
                typed = true;
            } else if let Some(identifier) = Identifier::cast(child.clone()) {
                match columns.last_mut() {
                    Some(column) if typed => column.ty = Some(identifier),
                    _ => columns.push(PatternColumn {
                        name: identifier,
                        ty: None,
                        separator: None,
                    }),
                }
                typed = false;
            } else if let Some(literal) = StringLiteral::cast(child)
                && let Some(column) = columns.last_mut()
            {
                column.separator = Some(literal);
            }
        }
        columns
    }
}

impl<'t> MvExpandClause<'t> {
    pub fn expression(&self) -> Option<Expr<'t>> {
        self.0.children().find_map(Expr::cast)
    }

    /// Type in `to typeof(type)`.
    pub fn target_type(&self) -> Option<Identifier<'t>> {
        named_after(&self.0, "typeof").and_then(Identifier::cast)
    }

    pub fn limit(&self) -> Option<u64> {
        count_literal(named_after(&self.0, "limit"))
    }
}

impl TakeClause<'_> {
    pub fn count(&self) -> Option<u64> {
        count_literal(self.0.named_children().next())
    }
}

impl LimitClause<'_> {
    pub fn count(&self) -> Option<u64> {
        count_literal(self.0.named_children().next())
    }
}

impl<'t> TopClause<'t> {
    pub fn count(&self) -> Option<u64> {
        count_literal(self.0.named_children().next())
    }

    pub fn by(&self) -> Option<Identifier<'t>> {
        named_after(&self.0, "by").and_then(Identifier::cast)
    }

    pub fn direction(&self) -> Option<SortDirection> {
        direction(&self.0)
    }
}

impl<'t> SortClause<'t> {
    pub fn keys(&self) -> impl Iterator<Item = SortExpression<'t>> + use<'t> {
        list_items(&self.0, "sort_expression_list", SortExpression::cast)
    }
}

impl<'t> OrderClause<'t> {
    pub fn keys(&self) -> impl Iterator<Item = SortExpression<'t>> + use<'t> {
        list_items(&self.0, "sort_expression_list", SortExpression::cast)
    }
}

impl<'t> SortExpression<'t> {
    pub fn column(&self) -> Option<Identifier<'t>> {
        self.0.children().find_map(Identifier::cast)
    }

    /// `None` when no direction is written.
    pub fn direction(&self) -> Option<SortDirection> {
        direction(&self.0)
    }
}

impl<'t> SearchClause<'t> {
    pub fn pattern(&self) -> Option<StringLiteral<'t>> {
        self.0.children().filter_map(StringLiteral::cast).last()
    }

    /// Columns in `search in (...)`.
    pub fn columns(&self) -> impl Iterator<Item = Column<'t>> + use<'t> {
        list_items(&self.0, "column_list", Column::cast)
    }
}

macro_rules! infix_accessors {
    ($($name:ident),+) => {
        $(
            impl<'t> $name<'t> {
                pub fn lhs(&self) -> Option<Expr<'t>> {
                    significant(&self.0).next().and_then(Expr::cast)
                }

                pub fn operator(&self) -> Option<String> {
                    first_token_text(&self.0)
                }

                pub fn rhs(&self) -> Option<Expr<'t>> {
                    significant(&self.0)
                        .skip_while(Node::is_named)
                        .nth(1)
                        .and_then(Expr::cast)
                }
            }
        )+
    };
}

infix_accessors!(BinaryExpression, ComparisonExpression, ArithmeticExpression);

impl<'t> StringExpression<'t> {
    pub fn lhs(&self) -> Option<Expr<'t>> {
        significant(&self.0).next().and_then(Expr::cast)
    }

    /// `contains`, `has`, `startswith`, ...
    pub fn operator(&self) -> Option<String> {
        first_token_text(&self.0)
    }

    pub fn pattern(&self) -> Option<StringLiteral<'t>> {
        significant(&self.0).skip(1).find_map(StringLiteral::cast)
    }
}

impl<'t> InExpression<'t> {
    pub fn lhs(&self) -> Option<Expr<'t>> {
        significant(&self.0).next().and_then(Expr::cast)
    }

    pub fn values(&self) -> impl Iterator<Item = Literal<'t>> + use<'t> {
        list_items(&self.0, "literal_list", Literal::cast)
    }
}

impl<'t> BetweenExpression<'t> {
    pub fn lhs(&self) -> Option<Expr<'t>> {
        significant(&self.0).next().and_then(Expr::cast)
    }

    fn bounds(&self) -> impl Iterator<Item = Expr<'t>> + use<'t> {
        significant(&self.0)
            .skip_while(|child| !is_token(child, "between"))
            .filter_map(Expr::cast)
    }

    pub fn low(&self) -> Option<Expr<'t>> {
        self.bounds().next()
    }

    pub fn high(&self) -> Option<Expr<'t>> {
        self.bounds().nth(1)
    }
}

impl<'t> UnaryExpression<'t> {
    pub fn operand(&self) -> Option<Expr<'t>> {
        self.0.children().find_map(Expr::cast)
    }
}

impl<'t> ParenthesizedExpression<'t> {
    pub fn inner(&self) -> Option<Expr<'t>> {
        self.0.children().find_map(Expr::cast)
    }
}

impl<'t> ConditionalExpression<'t> {
    /// `iff` or `case`.
    pub fn function(&self) -> Option<String> {
        first_token_text(&self.0)
    }

    pub fn arguments(&self) -> impl Iterator<Item = Expr<'t>> + use<'t> {
        self.0.children().filter_map(Expr::cast)
    }
}

impl<'t> TypeCastExpression<'t> {
    /// `to type(expr)` rather than `expr::type`.
    fn is_prefix(&self) -> bool {
        significant(&self.0)
            .next()
            .is_some_and(|first| is_token(&first, "to"))
    }

    pub fn value(&self) -> Option<Expr<'t>> {
        if self.is_prefix() {
            named_after(&self.0, "(").and_then(Expr::cast)
        } else {
            significant(&self.0).next().and_then(Expr::cast)
        }
    }

    pub fn target(&self) -> Option<Identifier<'t>> {
        if self.is_prefix() {
            named_after(&self.0, "to").and_then(Identifier::cast)
        } else {
            named_after(&self.0, "::").and_then(Identifier::cast)
        }
    }
}

impl<'t> FunctionCall<'t> {
    pub fn name(&self) -> Option<Identifier<'t>> {
        self.0.children().find_map(Identifier::cast)
    }

    pub fn arguments(&self) -> impl Iterator<Item = Argument<'t>> + use<'t> {
        list_items(&self.0, "argument_list", Argument::cast)
    }
}

impl<'t> NamedArgument<'t> {
    pub fn name(&self) -> Option<Identifier<'t>> {
        self.0.children().find_map(Identifier::cast)
    }

    pub fn value(&self) -> Option<Expr<'t>> {
        named_after(&self.0, "=").and_then(Expr::cast)
    }
}

impl<'t> QualifiedIdentifier<'t> {
    pub fn table(&self) -> Option<Identifier<'t>> {
        self.0.children().find_map(Identifier::cast)
    }

    pub fn column(&self) -> Option<Identifier<'t>> {
        self.0.children().filter_map(Identifier::cast).nth(1)
    }
}

impl Identifier<'_> {
    pub fn name(&self) -> String {
        self.0.text()
    }
}

impl StringLiteral<'_> {
    /// Text between the quotes, escapes left as written.
    pub fn value(&self) -> String {
        self.0
            .children()
            .filter(|child| matches!(child.kind_name(), "string_content" | "escape_sequence"))
            .map(|child| child.text())
            .collect()
    }
}

impl NumberLiteral<'_> {
    pub fn value(&self) -> Option<f64> {
        self.0.text().parse().ok()
    }
}

impl BooleanLiteral<'_> {
    pub fn value(&self) -> bool {
        self.0.text() == "true"
    }
}

impl TimespanLiteral<'_> {
    fn split(&self) -> (String, String) {
        let text = self.0.text();
        let at = text
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let unit = text[at..].to_owned();
        let mut magnitude = text;
        magnitude.truncate(at);
        (magnitude, unit)
    }

    /// `1.5` in `1.5h`.
    pub fn magnitude(&self) -> Option<f64> {
        self.split().0.parse().ok()
    }

    /// `h` in `1.5h`.
    pub fn unit(&self) -> String {
        self.split().1
    }
}

impl<'t> ArrayLiteral<'t> {
    pub fn elements(&self) -> impl Iterator<Item = Expr<'t>> + use<'t> {
        self.0.children().filter_map(Expr::cast)
    }
}

impl<'t> DynamicLiteral<'t> {
    pub fn value(&self) -> Option<Literal<'t>> {
        self.0.children().find_map(Literal::cast)
    }
}
