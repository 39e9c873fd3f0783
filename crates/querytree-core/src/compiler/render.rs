//! Standard renderers for expression nodes.

use super::precedence::{self, CLAUSE, TOP};
use super::{statement, Compiler, Context, State};
use crate::ast::{
    functions, types, Alias, Binary, Case, Cast, EscapeForLike, Excluded, Expr, ExprList, Field,
    Func, Like, Name, Nulls, Ordering, Over, Parentheses, Postfix, Prefix, Raw, TableNode,
    Ternary, Value,
};
use crate::builder::SqlValue;
use crate::error::{Error, Result};

/// Registers the standard renderers and precedence table on `compiler`.
pub fn install(compiler: &Compiler) {
    compiler
        .when(&types::VALUE, value)
        .when(&types::RAW, raw)
        .when(&types::NAME, name)
        .when(&types::FIELD, field)
        .when(&types::ALIAS, alias)
        .when(&types::TABLE, table)
        .when(&types::EXPR_LIST, expr_list)
        .when(&types::PARENTHESES, parentheses)
        .when(&types::BINARY, binary)
        .when(&types::LIKE, like)
        .when(&types::ESCAPE_FOR_LIKE, escape_for_like)
        .when(&types::TERNARY, ternary)
        .when(&types::PREFIX, prefix)
        .when(&types::POSTFIX, postfix)
        .when(&types::ORDERING, ordering)
        .when(&types::FUNC, func)
        .when(&types::OVER, over)
        .when(&types::CASE, case)
        .when(&types::CAST, cast)
        .when(&types::EXCLUDED, excluded);
    statement::install(compiler);
    precedence::install(compiler);
}

/// Renders `items` joined by `separator` in the current scope.
///
/// # Errors
///
/// Propagates the first renderer error.
pub fn render_items(c: &Compiler, items: &[Expr], separator: &str, state: &mut State) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            state.append(separator);
        }
        c.render(item, state)?;
    }
    Ok(())
}

fn value(c: &Compiler, node: &Value, state: &mut State) -> Result<()> {
    state.bind(node.get().clone(), c.settings().placeholder);
    Ok(())
}

fn raw(_: &Compiler, node: &Raw, state: &mut State) -> Result<()> {
    state.append(node.as_str());
    Ok(())
}

fn name(c: &Compiler, node: &Name, state: &mut State) -> Result<()> {
    state.append(c.settings().quote_identifier(node.as_str()));
    Ok(())
}

fn field(c: &Compiler, node: &Field, state: &mut State) -> Result<()> {
    let context = state.context;
    let qualified = context != Context::FieldName;
    if qualified {
        if let Some(prefix) = node.prefix() {
            state.note_auto_table(prefix);
        }
    }
    if let Some(sql) = node.cached(c.id(), context) {
        state.append(sql);
        return Ok(());
    }

    let start = state.mark();
    let params = state.params().len();
    if let Some(prefix) = node.prefix().filter(|_| qualified) {
        let mut scope = state.scope();
        scope.context = Context::FieldPrefix;
        scope.precedence = TOP;
        c.render(&**prefix, &mut scope)?;
        scope.append(".");
    }
    c.render(&Name::new(node.name()), state)?;
    if state.params().len() == params {
        node.remember(c.id(), context, state.text_since(start));
    }
    Ok(())
}

fn alias(c: &Compiler, node: &Alias, state: &mut State) -> Result<()> {
    if state
        .parent_type()
        .is_some_and(|parent| parent.is_a(&types::FIELD_LIST))
    {
        c.render(node.expr(), state)?;
        state.append(" AS ");
    }
    c.render(&Name::new(node.name()), state)
}

fn table(c: &Compiler, node: &TableNode, state: &mut State) -> Result<()> {
    if state.context != Context::Table {
        return c.render(&Name::new(node.name()), state);
    }
    if let Some(source) = node.source() {
        c.render(source, state)?;
        state.append(" AS ");
    }
    c.render(&Name::new(node.name()), state)?;
    state.note_join_table(node);
    Ok(())
}

fn expr_list(c: &Compiler, node: &ExprList, state: &mut State) -> Result<()> {
    render_items(c, node.items(), node.separator(), state)
}

fn parentheses(c: &Compiler, node: &Parentheses, state: &mut State) -> Result<()> {
    state.append("(");
    c.render_at(node.inner(), state, TOP)?;
    state.append(")");
    Ok(())
}

fn is_empty_list(expr: &Expr) -> bool {
    expr.downcast_ref::<Parentheses>()
        .and_then(|p| p.inner().downcast_ref::<ExprList>())
        .is_some_and(ExprList::is_empty)
}

/// Precedence for the right operand of a left-associative operator.
fn right_precedence(inner: u8, op: &str) -> u8 {
    if precedence::is_associative(op) {
        inner
    } else {
        inner.saturating_add(1)
    }
}

fn binary(c: &Compiler, node: &Binary, state: &mut State) -> Result<()> {
    let op = node.op();
    if matches!(op, "IN" | "NOT IN") && is_empty_list(node.right()) {
        return Err(Error::EmptyCollection);
    }
    let op_sql = c.operator_sql(op)?;
    let inner = state.precedence;
    c.render(node.left(), state)?;
    state.append(format!(" {op_sql} "));
    c.render_at(node.right(), state, right_precedence(inner, op))
}

fn like(c: &Compiler, node: &Like, state: &mut State) -> Result<()> {
    let op_sql = c.operator_sql(node.kind().as_str())?;
    let inner = state.precedence;
    c.render(node.left(), state)?;
    state.append(format!(" {op_sql} "));
    c.render_at(node.pattern(), state, inner.saturating_add(1))?;
    if node.has_escape() {
        let escape = c.settings().like_escape;
        let quoted = if escape == '\'' {
            String::from("''")
        } else {
            escape.to_string()
        };
        state.append(format!(" ESCAPE '{quoted}'"));
    }
    Ok(())
}

fn escape_for_like(c: &Compiler, node: &EscapeForLike, state: &mut State) -> Result<()> {
    let escape = c.settings().like_escape;
    if let Some(SqlValue::Text(text)) = node.inner().downcast_ref::<Value>().map(Value::get) {
        let mut escaped = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch == escape || ch == '_' || ch == '%' {
                escaped.push(escape);
            }
            escaped.push(ch);
        }
        return c.render(&Value::new(escaped), state);
    }
    let replaced = [escape.to_string(), String::from("_"), String::from("%")]
        .into_iter()
        .fold(node.inner().clone(), |expr, special| {
            Expr::new(functions::replace(expr, &special, &format!("{escape}{special}")))
        });
    c.render(&replaced, state)
}

fn ternary(c: &Compiler, node: &Ternary, state: &mut State) -> Result<()> {
    let (first, second, third) = node.operands();
    let inner = state.precedence;
    let op_sql = c.operator_sql(node.op())?;
    let separator = c.operator_sql(node.separator())?;
    c.render(first, state)?;
    state.append(format!(" {op_sql} "));
    c.render_at(second, state, inner.saturating_add(1))?;
    state.append(format!(" {separator} "));
    c.render_at(third, state, inner.saturating_add(1))
}

fn prefix(c: &Compiler, node: &Prefix, state: &mut State) -> Result<()> {
    let op_sql = c.operator_sql(node.op())?;
    let keyword = op_sql.chars().any(|ch| ch.is_ascii_alphabetic());
    state.append(op_sql);
    if keyword {
        state.append(" ");
    }
    let operand = state.precedence.max(CLAUSE);
    c.render_at(node.expr(), state, operand)
}

fn postfix(c: &Compiler, node: &Postfix, state: &mut State) -> Result<()> {
    c.render(node.expr(), state)?;
    state.append(" ");
    state.append(c.operator_sql(node.op())?);
    Ok(())
}

fn ordering(c: &Compiler, node: &Ordering, state: &mut State) -> Result<()> {
    c.render(node.expr(), state)?;
    state.append(if node.is_desc() { " DESC" } else { " ASC" });
    match node.nulls_placement() {
        Some(Nulls::First) => state.append(" NULLS FIRST"),
        Some(Nulls::Last) => state.append(" NULLS LAST"),
        None => {}
    }
    Ok(())
}

fn func(c: &Compiler, node: &Func, state: &mut State) -> Result<()> {
    state.append(format!("{}(", node.name()));
    if node.is_distinct() {
        state.append("DISTINCT ");
    }
    c.render_at(node.args(), state, CLAUSE)?;
    state.append(")");
    Ok(())
}

fn over(c: &Compiler, node: &Over, state: &mut State) -> Result<()> {
    c.render(node.expr(), state)?;
    state.append(" OVER (");
    let mut scope = state.scope();
    scope.precedence = CLAUSE;
    let partitions = node.partitions();
    if !partitions.is_empty() {
        scope.append("PARTITION BY ");
        c.render(partitions, &mut scope)?;
    }
    let orderings = node.orderings();
    if !orderings.is_empty() {
        if !partitions.is_empty() {
            scope.append(" ");
        }
        scope.append("ORDER BY ");
        c.render(orderings, &mut scope)?;
    }
    scope.append(")");
    Ok(())
}

fn case(c: &Compiler, node: &Case, state: &mut State) -> Result<()> {
    let mut scope = state.scope();
    scope.precedence = CLAUSE;
    scope.append("CASE");
    for (condition, result) in node.branches() {
        scope.append(" WHEN ");
        c.render(condition, &mut scope)?;
        scope.append(" THEN ");
        c.render(result, &mut scope)?;
    }
    if let Some(default) = node.default_result() {
        scope.append(" ELSE ");
        c.render(default, &mut scope)?;
    }
    scope.append(" END");
    Ok(())
}

fn cast(c: &Compiler, node: &Cast, state: &mut State) -> Result<()> {
    state.append("CAST(");
    c.render_at(node.expr(), state, CLAUSE)?;
    state.append(format!(" AS {})", node.target()));
    Ok(())
}

fn excluded(c: &Compiler, node: &Excluded, state: &mut State) -> Result<()> {
    state.append("EXCLUDED.");
    c.render_in(node.field(), state, Context::FieldName)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{exists, field, raw as raw_sql, value as bind, Node, Table};
    use crate::builder::Select;
    use crate::dialect::{generic, Settings};

    fn compile(node: &dyn Node) -> (String, Vec<SqlValue>) {
        generic().compile(node).unwrap()
    }

    #[test]
    fn test_value_binds_parameter() {
        let (sql, params) = compile(&bind(5));
        assert_eq!(sql, "%s");
        assert_eq!(params, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_field_quotes_prefix() {
        let author = Table::new("author");
        let (sql, _) = compile(&author.get_field("first_name"));
        assert_eq!(sql, "\"author\".\"first_name\"");
        let (sql, _) = compile(&author.all());
        assert_eq!(sql, "\"author\".*");
    }

    #[test]
    fn test_alias_outside_field_list_renders_name() {
        let expr = field("a").as_alias("b");
        assert_eq!(compile(&expr).0, "\"b\"");
    }

    #[test]
    fn test_associativity() {
        let a = field("a");
        let b = field("b");
        let c = field("c");
        let sql = compile(&(a.clone() - (b.clone() - c.clone()))).0;
        assert_eq!(sql, "\"a\" - (\"b\" - \"c\")");
        let sql = compile(&(a.clone() - b.clone() - c.clone())).0;
        assert_eq!(sql, "\"a\" - \"b\" - \"c\"");
        let sql = compile(&(a + (b + c))).0;
        assert_eq!(sql, "\"a\" + \"b\" + \"c\"");
    }

    #[test]
    fn test_not_and_unary() {
        let sql = compile(&field("a").eq(1).not()).0;
        assert_eq!(sql, "NOT \"a\" = %s");
        let sql = compile(&field("a").and(field("b")).not()).0;
        assert_eq!(sql, "NOT (\"a\" AND \"b\")");
        let sql = compile(&-(field("a") + field("b"))).0;
        assert_eq!(sql, "-(\"a\" + \"b\")");
    }

    #[test]
    fn test_between() {
        let (sql, params) = compile(&field("a").between(1, 10));
        assert_eq!(sql, "\"a\" BETWEEN %s AND %s");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_escape_for_like_on_expression_uses_replace() {
        let (sql, params) = compile(&field("a").startswith(field("b")));
        assert_eq!(
            sql,
            "\"a\" LIKE REPLACE(REPLACE(REPLACE(\"b\", %s, %s), %s, %s), %s, %s) || %s ESCAPE '!'"
        );
        assert_eq!(params.first(), Some(&SqlValue::Text(String::from("!"))));
        assert_eq!(params.last(), Some(&SqlValue::Text(String::from("%"))));
    }

    #[test]
    fn test_like_escape_follows_settings() {
        let compiler = generic().child("hash", Settings::new().with_like_escape('#'));
        let (sql, params) = compiler.compile(&field("a").contains("5%")).unwrap();
        assert_eq!(sql, "\"a\" LIKE %s || %s || %s ESCAPE '#'");
        assert_eq!(params[1], SqlValue::Text(String::from("5#%")));
    }

    #[test]
    fn test_func_case_cast_over() {
        let sql = compile(&Expr::new(functions::count(field("a")).distinct())).0;
        assert_eq!(sql, "COUNT(DISTINCT \"a\")");
        let case = Case::new().when(field("a").gt(1), "big").otherwise("small");
        assert_eq!(compile(&Expr::new(case)).0, "CASE WHEN \"a\" > %s THEN %s ELSE %s END");
        assert_eq!(compile(&field("a").cast("INTEGER")).0, "CAST(\"a\" AS INTEGER)");
        let window = Expr::new(functions::sum(field("x")))
            .over()
            .partition_by([field("g")])
            .order_by([field("d").desc()]);
        assert_eq!(
            compile(&Expr::new(window)).0,
            "SUM(\"x\") OVER (PARTITION BY \"g\" ORDER BY \"d\" DESC)"
        );
    }

    #[test]
    fn test_exists_parenthesizes_subquery() {
        let t = Table::new("t");
        let q = Select::new().from(&t).fields([raw_sql("1")]);
        assert_eq!(compile(&exists(q)).0, "EXISTS (SELECT 1 FROM \"t\")");
    }

    #[test]
    fn test_excluded() {
        let t = Table::new("t");
        assert_eq!(compile(&Expr::new(Excluded::new(t.get_field("a")))).0, "EXCLUDED.\"a\"");
    }

    #[test]
    fn test_unknown_operator_fails() {
        let expr = field("a").binary("; DROP", 1);
        assert!(matches!(generic().compile(&expr), Err(Error::UnknownOperator(_))));
    }
}
