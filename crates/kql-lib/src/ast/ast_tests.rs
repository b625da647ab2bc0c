use super::*;
use crate::{Language, Parser, Tree};

fn parse(text: &str) -> Tree {
    Parser::new(Language::kql()).parse(text)
}

fn source(tree: &Tree) -> SourceFile<'_> {
    SourceFile::cast(tree.root()).unwrap()
}

fn query<'t>(file: &SourceFile<'t>) -> QueryStatement<'t> {
    match file.statements().next() {
        Some(Statement::Query(query)) => query,
        other => panic!("expected a query, got {other:?}"),
    }
}

fn operators<'t>(file: &SourceFile<'t>) -> Vec<Operator<'t>> {
    query(file).operators().collect()
}

/// Columns of the first `extend`, as `(name, value)`.
fn extended<'t>(file: &SourceFile<'t>) -> Vec<(String, Expr<'t>)> {
    let Some(Operator::Extend(extend)) = operators(file).into_iter().next() else {
        panic!("expected extend");
    };
    extend
        .columns()
        .map(|column| match column {
            Column::Assignment(assignment) => (
                assignment.name().unwrap().name(),
                assignment.value().unwrap(),
            ),
            Column::Expr(expr) => (expr.as_node().text(), expr),
        })
        .collect()
}

fn name(expr: Option<Expr<'_>>) -> String {
    match expr {
        Some(Expr::Identifier(identifier)) => identifier.name(),
        other => panic!("expected an identifier, got {other:?}"),
    }
}

fn number(expr: Option<Expr<'_>>) -> f64 {
    match expr {
        Some(Expr::Literal(Literal::Number(number))) => number.value().unwrap(),
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn query_pipeline() {
    let tree = parse("StormEvents | where State == 'TEXAS' | take 10");
    let file = source(&tree);

    let query = query(&file);
    assert_eq!(query.table().unwrap().name().unwrap().name(), "StormEvents");
    assert_eq!(query.pipes().count(), 2);

    let operators = operators(&file);
    let Operator::Where(filter) = &operators[0] else {
        panic!("{operators:?}");
    };
    let Some(Expr::Comparison(comparison)) = filter.predicate() else {
        panic!("{filter:?}");
    };
    assert_eq!(comparison.operator().as_deref(), Some("=="));
    assert_eq!(name(comparison.lhs()), "State");
    assert!(matches!(
        comparison.rhs(),
        Some(Expr::Literal(Literal::String(s))) if s.value() == "TEXAS"
    ));

    let Operator::Take(take) = &operators[1] else {
        panic!("{operators:?}");
    };
    assert_eq!(take.count(), Some(10));
}

#[test]
fn let_statement_then_query() {
    let tree = parse("let n = 1 + 2 * 3;\nT | count");
    let file = source(&tree);

    let statements: Vec<_> = file.statements().collect();
    assert_eq!(statements.len(), 2);

    let Statement::Let(binding) = &statements[0] else {
        panic!("{statements:?}");
    };
    assert_eq!(binding.name().unwrap().name(), "n");
    let Some(Expr::Arithmetic(sum)) = binding.value() else {
        panic!("{binding:?}");
    };
    assert_eq!(sum.operator().as_deref(), Some("+"));
    assert_eq!(number(sum.lhs()), 1.0);
    let Some(Expr::Arithmetic(product)) = sum.rhs() else {
        panic!("{sum:?}");
    };
    assert_eq!(product.operator().as_deref(), Some("*"));
    assert_eq!(number(product.rhs()), 3.0);

    let Statement::Query(query) = &statements[1] else {
        panic!("{statements:?}");
    };
    assert!(matches!(query.operators().next(), Some(Operator::Count(_))));
}

#[test]
fn search_terms() {
    let tree = parse("a:1 b:'x'");
    let file = source(&tree);

    assert_eq!(file.statements().count(), 0);
    let terms = file.search_terms();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].field.name(), "a");
    assert_eq!(number(Some(terms[0].value.clone())), 1.0);
    assert_eq!(terms[1].field.name(), "b");
    assert!(matches!(
        &terms[1].value,
        Expr::Literal(Literal::String(s)) if s.value() == "x"
    ));
}

#[test]
fn extend_and_project_columns() {
    let tree = parse("T | extend y = a + 1, z | project y");
    let file = source(&tree);

    let columns = extended(&file);
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].0, "y");
    assert!(matches!(columns[0].1, Expr::Arithmetic(_)));
    assert_eq!(columns[1].0, "z");
    assert!(matches!(columns[1].1, Expr::Identifier(_)));

    let operators = operators(&file);
    let Operator::Project(project) = &operators[1] else {
        panic!("{operators:?}");
    };
    let projected: Vec<_> = project.columns().collect();
    assert_eq!(projected.len(), 1);
    assert!(matches!(&projected[0], Column::Expr(Expr::Identifier(id)) if id.name() == "y"));
}

#[test]
fn summarize_by() {
    let tree = parse("T | summarize total = count(), max(x) by State, bin(ts, 1h)");
    let file = source(&tree);

    let Some(Operator::Summarize(summarize)) = operators(&file).into_iter().next() else {
        panic!("expected summarize");
    };

    let aggregations: Vec<_> = summarize.aggregations().collect();
    assert_eq!(aggregations.len(), 2);
    assert_eq!(aggregations[0].name().unwrap().name(), "total");
    let Some(Expr::Call(count)) = aggregations[0].value() else {
        panic!("{:?}", aggregations[0]);
    };
    assert_eq!(count.name().unwrap().name(), "count");
    assert_eq!(count.arguments().count(), 0);
    assert!(aggregations[1].name().is_none());
    let Some(Expr::Call(max)) = aggregations[1].value() else {
        panic!("{:?}", aggregations[1]);
    };
    assert_eq!(max.name().unwrap().name(), "max");
    assert_eq!(max.arguments().count(), 1);

    let groups: Vec<_> = summarize.by().collect();
    assert_eq!(groups.len(), 2);
    assert_eq!(name(Some(groups[0].clone())), "State");
    let Expr::Call(bin) = &groups[1] else {
        panic!("{groups:?}");
    };
    let arguments: Vec<_> = bin.arguments().collect();
    assert!(matches!(&arguments[0], Argument::Positional(Expr::Identifier(id)) if id.name() == "ts"));
    let Argument::Positional(Expr::Literal(Literal::Timespan(span))) = &arguments[1] else {
        panic!("{arguments:?}");
    };
    assert_eq!(span.magnitude(), Some(1.0));
    assert_eq!(span.unit(), "h");
}

#[test]
fn join_conditions() {
    let tree = parse("T | join kind=leftouter (U) on $left.Id == $right.Key, Other");
    let file = source(&tree);

    let Some(Operator::Join(join)) = operators(&file).into_iter().next() else {
        panic!("expected join");
    };
    assert_eq!(join.kind().as_deref(), Some("leftouter"));
    assert_eq!(join.table().unwrap().name().unwrap().name(), "U");

    let conditions: Vec<_> = join
        .conditions()
        .map(|c| (c.left().unwrap().name(), c.right().unwrap().name()))
        .collect();
    assert_eq!(
        conditions,
        [
            ("Id".to_owned(), "Key".to_owned()),
            ("Other".to_owned(), "Other".to_owned()),
        ]
    );
}

#[test]
fn union_tables() {
    let tree = parse("T | union kind=outer isfuzzy=true A, B");
    let file = source(&tree);

    let Some(Operator::Union(union)) = operators(&file).into_iter().next() else {
        panic!("expected union");
    };
    assert_eq!(union.kind().as_deref(), Some("outer"));
    assert_eq!(union.is_fuzzy(), Some(true));
    let tables: Vec<_> = union
        .tables()
        .map(|t| t.name().unwrap().name())
        .collect();
    assert_eq!(tables, ["A", "B"]);
}

#[test]
fn parse_pattern_columns() {
    let tree = parse(r#"T | parse kind=regex flags="i" Msg with * "id=" Id:long ", name=" Name *"#);
    let file = source(&tree);

    let Some(Operator::Parse(clause)) = operators(&file).into_iter().next() else {
        panic!("expected parse");
    };
    assert_eq!(clause.kind(), Some(ParseKind::Regex));
    assert_eq!(clause.flags().unwrap().value(), "i");
    assert_eq!(name(clause.source()), "Msg");

    let pattern = clause.pattern().unwrap();
    assert!(pattern.leading_wildcard());
    assert!(pattern.trailing_wildcard());
    assert_eq!(pattern.prefix().unwrap().value(), "id=");

    let columns = pattern.columns();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name.name(), "Id");
    assert_eq!(columns[0].ty.as_ref().unwrap().name(), "long");
    assert_eq!(columns[0].separator.as_ref().unwrap().value(), ", name=");
    assert_eq!(columns[1].name.name(), "Name");
    assert!(columns[1].ty.is_none());
    assert!(columns[1].separator.is_none());
}

#[test]
fn plain_parse_clause() {
    let tree = parse("T | parse Msg with 'x' Rest");
    let file = source(&tree);

    let Some(Operator::Parse(clause)) = operators(&file).into_iter().next() else {
        panic!("expected parse");
    };
    assert!(clause.kind().is_none());
    assert!(clause.flags().is_none());
    let pattern = clause.pattern().unwrap();
    assert!(!pattern.leading_wildcard());
    assert!(!pattern.trailing_wildcard());
    assert_eq!(pattern.columns().len(), 1);
}

#[test]
fn sort_and_top_directions() {
    let tree = parse("T | sort by a desc, b | top 5 by c asc");
    let file = source(&tree);
    let operators = operators(&file);

    let Operator::Sort(sort) = &operators[0] else {
        panic!("{operators:?}");
    };
    let keys: Vec<_> = sort
        .keys()
        .map(|key| (key.column().unwrap().name(), key.direction()))
        .collect();
    assert_eq!(
        keys,
        [
            ("a".to_owned(), Some(SortDirection::Desc)),
            ("b".to_owned(), None),
        ]
    );

    let Operator::Top(top) = &operators[1] else {
        panic!("{operators:?}");
    };
    assert_eq!(top.count(), Some(5));
    assert_eq!(top.by().unwrap().name(), "c");
    assert_eq!(top.direction(), Some(SortDirection::Asc));
}

#[test]
fn mv_expand_options() {
    let tree = parse("T | mv-expand tags to typeof(string) limit 3");
    let file = source(&tree);

    let Some(Operator::MvExpand(expand)) = operators(&file).into_iter().next() else {
        panic!("expected mv-expand");
    };
    assert_eq!(name(expand.expression()), "tags");
    assert_eq!(expand.target_type().unwrap().name(), "string");
    assert_eq!(expand.limit(), Some(3));
}

#[test]
fn both_cast_forms() {
    let tree = parse("T | extend a = x::long, b = to long(y)");
    let file = source(&tree);

    for (column, value) in extended(&file) {
        let Expr::TypeCast(cast) = &value else {
            panic!("{column}: {value:?}");
        };
        assert_eq!(cast.target().unwrap().name(), "long", "{column}");
        let expected = if column == "a" { "x" } else { "y" };
        assert_eq!(name(cast.value()), expected);
    }
}

#[test]
fn in_and_between() {
    let tree = parse("T | where x in (1, 2) and y between (1 .. 5)");
    let file = source(&tree);

    let Some(Operator::Where(filter)) = operators(&file).into_iter().next() else {
        panic!("expected where");
    };
    let Some(Expr::Binary(both)) = filter.predicate() else {
        panic!("{filter:?}");
    };
    assert_eq!(both.operator().as_deref(), Some("and"));

    let Some(Expr::In(membership)) = both.lhs() else {
        panic!("{both:?}");
    };
    assert_eq!(name(membership.lhs()), "x");
    assert_eq!(membership.values().count(), 2);

    let Some(Expr::Between(range)) = both.rhs() else {
        panic!("{both:?}");
    };
    assert_eq!(name(range.lhs()), "y");
    assert_eq!(number(range.low()), 1.0);
    assert_eq!(number(range.high()), 5.0);
}

#[test]
fn string_operator() {
    let tree = parse("T | where Name has 'ab'");
    let file = source(&tree);

    let Some(Operator::Where(filter)) = operators(&file).into_iter().next() else {
        panic!("expected where");
    };
    let Some(Expr::String(matching)) = filter.predicate() else {
        panic!("{filter:?}");
    };
    assert_eq!(name(matching.lhs()), "Name");
    assert_eq!(matching.operator().as_deref(), Some("has"));
    assert_eq!(matching.pattern().unwrap().value(), "ab");
}

#[test]
fn unary_over_qualified_name() {
    let tree = parse("T | where -(a.b) > 1");
    let file = source(&tree);

    let Some(Operator::Where(filter)) = operators(&file).into_iter().next() else {
        panic!("expected where");
    };
    let Some(Expr::Comparison(comparison)) = filter.predicate() else {
        panic!("{filter:?}");
    };
    let Some(Expr::Unary(negation)) = comparison.lhs() else {
        panic!("{comparison:?}");
    };
    let Some(Expr::Parenthesized(group)) = negation.operand() else {
        panic!("{negation:?}");
    };
    let Some(Expr::Qualified(qualified)) = group.inner() else {
        panic!("{group:?}");
    };
    assert_eq!(qualified.table().unwrap().name(), "a");
    assert_eq!(qualified.column().unwrap().name(), "b");
}

#[test]
fn conditionals() {
    let tree = parse("T | extend r = iff(x > 1, 'hi', 'lo'), c = case(a, b)");
    let file = source(&tree);
    let columns = extended(&file);

    let Expr::Conditional(iff) = &columns[0].1 else {
        panic!("{columns:?}");
    };
    assert_eq!(iff.function().as_deref(), Some("iff"));
    let arguments: Vec<_> = iff.arguments().collect();
    assert_eq!(arguments.len(), 3);
    assert!(matches!(arguments[0], Expr::Comparison(_)));

    let Expr::Conditional(case) = &columns[1].1 else {
        panic!("{columns:?}");
    };
    assert_eq!(case.function().as_deref(), Some("case"));
    assert_eq!(case.arguments().count(), 2);
}

#[test]
fn named_arguments() {
    let tree = parse("T | extend s = f(x, scale = 2)");
    let file = source(&tree);
    let columns = extended(&file);

    let Expr::Call(call) = &columns[0].1 else {
        panic!("{columns:?}");
    };
    let arguments: Vec<_> = call.arguments().collect();
    assert!(matches!(&arguments[0], Argument::Positional(_)));
    let Argument::Named(scale) = &arguments[1] else {
        panic!("{arguments:?}");
    };
    assert_eq!(scale.name().unwrap().name(), "scale");
    assert_eq!(number(scale.value()), 2.0);
}

#[test]
fn literals() {
    let tree = parse("T | extend a = true, b = null, c = [1, 2], d = dynamic('x'), e = 1.5h");
    let file = source(&tree);
    let columns = extended(&file);
    assert_eq!(columns.len(), 5);

    assert!(matches!(&columns[0].1, Expr::Literal(Literal::Boolean(b)) if b.value()));
    assert!(matches!(&columns[1].1, Expr::Literal(Literal::Null(_))));
    assert!(matches!(&columns[2].1, Expr::Literal(Literal::Array(a)) if a.elements().count() == 2));
    let Expr::Literal(Literal::Dynamic(dynamic)) = &columns[3].1 else {
        panic!("{columns:?}");
    };
    assert!(matches!(dynamic.value(), Some(Literal::String(s)) if s.value() == "x"));
    let Expr::Literal(Literal::Timespan(span)) = &columns[4].1 else {
        panic!("{columns:?}");
    };
    assert_eq!(span.magnitude(), Some(1.5));
    assert_eq!(span.unit(), "h");
}

#[test]
fn escapes_stay_as_written() {
    let tree = parse(r#"T | where a == "x\"y""#);
    let file = source(&tree);

    let Some(Operator::Where(filter)) = operators(&file).into_iter().next() else {
        panic!("expected where");
    };
    let Some(Expr::Comparison(comparison)) = filter.predicate() else {
        panic!("{filter:?}");
    };
    let Some(Expr::Literal(Literal::String(text))) = comparison.rhs() else {
        panic!("{comparison:?}");
    };
    assert_eq!(text.value(), r#"x\"y"#);
}

#[test]
fn missing_predicate() {
    let tree = parse("T | where");
    let file = source(&tree);

    let Some(Operator::Where(filter)) = operators(&file).into_iter().next() else {
        panic!("expected where");
    };
    assert!(filter.predicate().is_none());
}

#[test]
fn cast_checks_kind() {
    let tree = parse("T | take 1");

    assert!(SourceFile::cast(tree.root()).is_some());
    assert!(QueryStatement::cast(tree.root()).is_none());
    assert!(Expr::cast(tree.root()).is_none());
}
