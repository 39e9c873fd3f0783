//! Standard renderers for queries, joins and clauses.

use tracing::debug;

use super::precedence::{CLAUSE, SET_OPERATION, TOP};
use super::{Compiler, Context, Mark, State};
use crate::ast::{types, Expr, ExprList, Field, LimitOffset, TableJoin};
use crate::builder::{
    ConflictAction, Delete, Distinct, Insert, InsertSource, OnConflict, Select, SetOperation,
    Update,
};
use crate::error::Result;

pub(super) fn install(compiler: &Compiler) {
    compiler
        .when(&types::TABLE_JOIN, table_join)
        .when(&types::LIMIT_OFFSET, limit_offset)
        .when(&types::SELECT, select)
        .when(&types::SET_OPERATION, set_operation)
        .when(&types::INSERT, insert)
        .when(&types::UPDATE, update)
        .when(&types::DELETE, delete)
        .when(&types::ON_CONFLICT, on_conflict);
}

/// Renders `target = value` pairs joined by commas.
///
/// Targets render as bare column names; their tables still count as
/// referenced for FROM inference.
///
/// # Errors
///
/// Propagates the first renderer error.
pub fn render_assignments(c: &Compiler, pairs: &[(Expr, Expr)], state: &mut State) -> Result<()> {
    for (i, (target, value)) in pairs.iter().enumerate() {
        if i > 0 {
            state.append(", ");
        }
        note_field_table(target, state);
        c.render_in(target, state, Context::FieldName)?;
        state.append(" = ");
        let mut scope = state.scope();
        scope.context = Context::Expr;
        scope.precedence = CLAUSE;
        c.render(value, &mut scope)?;
    }
    Ok(())
}

/// Renders ` (target)` of a conflict clause, or nothing without a target.
///
/// # Errors
///
/// Propagates the first renderer error.
pub fn render_conflict_target(c: &Compiler, conflict: &OnConflict, state: &mut State) -> Result<()> {
    if conflict.target().is_empty() {
        return Ok(());
    }
    state.append(" (");
    c.render_in(conflict.target(), state, Context::FieldName)?;
    state.append(")");
    Ok(())
}

fn note_field_table(expr: &Expr, state: &mut State) {
    if let Some(prefix) = expr.downcast_ref::<Field>().and_then(Field::prefix) {
        state.note_auto_table(prefix);
    }
}

/// Renders the tables referenced by fields but never rendered as sources,
/// and moves them to `at`.
fn splice_auto_tables(c: &Compiler, state: &mut State, at: Mark, lead: &str) -> Result<()> {
    let pending = state.pending_auto_tables();
    if pending.is_empty() {
        return Ok(());
    }
    let tail = state.mark();
    state.append(lead);
    let mut scope = state.scope();
    scope.context = Context::Table;
    for (i, table) in pending.iter().enumerate() {
        if i > 0 {
            scope.append(", ");
        }
        c.render(&**table, &mut scope)?;
    }
    drop(scope);
    state.move_since(tail, at);
    Ok(())
}

fn render_list(c: &Compiler, keyword: &str, list: &ExprList, state: &mut State) -> Result<()> {
    if list.is_empty() {
        return Ok(());
    }
    state.append(keyword);
    c.render(list, state)
}

fn render_clause(c: &Compiler, keyword: &str, expr: Option<&Expr>, state: &mut State) -> Result<()> {
    match expr {
        Some(expr) => {
            state.append(keyword);
            c.render(expr, state)
        }
        None => Ok(()),
    }
}

fn render_bounds(c: &Compiler, bounds: LimitOffset, state: &mut State) -> Result<()> {
    if bounds.is_empty() {
        return Ok(());
    }
    state.append(" ");
    c.render(&bounds, state)
}

fn render_returning(c: &Compiler, list: &ExprList, state: &mut State) -> Result<()> {
    render_list(c, " RETURNING ", list, state)
}

fn join_operand(c: &Compiler, operand: &Expr, state: &mut State) -> Result<()> {
    let grouped = operand
        .downcast_ref::<TableJoin>()
        .is_some_and(|join| join.is_nested() && join.join_type().is_some());
    if grouped {
        state.append("(");
        c.render(operand, state)?;
        state.append(")");
        return Ok(());
    }
    c.render(operand, state)
}

fn table_join(c: &Compiler, join: &TableJoin, state: &mut State) -> Result<()> {
    let mut scope = state.scope();
    scope.context = Context::Table;
    scope.precedence = CLAUSE;
    if let (Some(left), Some(join_type)) = (join.left(), join.join_type()) {
        c.render(left, &mut scope)?;
        scope.append(format!(" {} ", join_type.as_sql()));
    }
    join_operand(c, join.right(), &mut scope)?;
    if let Some(hints) = join.hints() {
        scope.append(" ");
        c.render_in(hints, &mut scope, Context::Expr)?;
    }
    if let Some(on) = join.on_condition() {
        scope.append(" ON ");
        c.render_in(on, &mut scope, Context::Expr)?;
    }
    if let Some(using) = join.using_fields() {
        scope.append(" USING (");
        c.render_in(using, &mut scope, Context::FieldName)?;
        scope.append(")");
    }
    Ok(())
}

fn limit_offset(_: &Compiler, bounds: &LimitOffset, state: &mut State) -> Result<()> {
    match (bounds.limit(), bounds.offset()) {
        (Some(limit), Some(offset)) => state.append(format!("LIMIT {limit} OFFSET {offset}")),
        (Some(limit), None) => state.append(format!("LIMIT {limit}")),
        (None, Some(offset)) => state.append(format!("OFFSET {offset}")),
        (None, None) => {}
    }
    Ok(())
}

fn select(c: &Compiler, query: &Select, state: &mut State) -> Result<()> {
    let mut scope = state.scope();
    scope.isolate_tables();
    scope.context = Context::Expr;
    scope.precedence = CLAUSE;

    scope.append("SELECT ");
    match query.get_distinct() {
        Distinct::Off => {}
        Distinct::All => scope.append("DISTINCT "),
        Distinct::On(list) => {
            scope.append("DISTINCT ON (");
            c.render(list, &mut scope)?;
            scope.append(") ");
        }
    }
    if query.get_fields().is_empty() {
        scope.append("*");
    } else {
        c.render(query.get_fields(), &mut scope)?;
    }

    let from_at = scope.mark();
    if let Some(tables) = query.get_tables() {
        scope.append(" FROM ");
        c.render_in(tables, &mut scope, Context::Table)?;
    }
    render_clause(c, " WHERE ", query.get_where(), &mut scope)?;
    render_list(c, " GROUP BY ", query.get_group_by(), &mut scope)?;
    render_clause(c, " HAVING ", query.get_having(), &mut scope)?;
    render_list(c, " ORDER BY ", query.get_order_by(), &mut scope)?;
    render_bounds(c, query.bounds(), &mut scope)?;
    if query.is_for_update() {
        scope.append(" FOR UPDATE");
    }
    if query.get_tables().is_none() {
        splice_auto_tables(c, &mut scope, from_at, " FROM ")?;
    }
    Ok(())
}

fn set_operation(c: &Compiler, set: &SetOperation, state: &mut State) -> Result<()> {
    let mut scope = state.scope();
    scope.context = Context::Expr;
    let keyword = if set.is_all() {
        format!(" {} ALL ", set.kind().as_sql())
    } else {
        format!(" {} ", set.kind().as_sql())
    };
    for (i, operand) in set.operands().iter().enumerate() {
        if i > 0 {
            scope.append(keyword.as_str());
        }
        c.render_at(operand, &mut scope, SET_OPERATION + 1)?;
    }
    scope.precedence = CLAUSE;
    render_list(c, " ORDER BY ", set.get_order_by(), &mut scope)?;
    render_bounds(c, set.bounds(), &mut scope)
}

fn insert(c: &Compiler, query: &Insert, state: &mut State) -> Result<()> {
    let mut scope = state.scope();
    scope.isolate_tables();
    scope.context = Context::Expr;
    scope.precedence = CLAUSE;

    scope.append("INSERT ");
    if let Some(conflict) = query.get_conflict() {
        c.render_in(conflict, &mut scope, Context::InsertModifier)?;
    }
    scope.append("INTO ");
    let table_at = scope.mark();
    match query.get_table() {
        Some(table) => c.render_in(table, &mut scope, Context::Table)?,
        None => query
            .get_fields()
            .iter()
            .for_each(|field| note_field_table(field, &mut scope)),
    }
    if !query.get_fields().is_empty() {
        scope.append(" (");
        c.render_in(query.get_fields(), &mut scope, Context::FieldName)?;
        scope.append(")");
    }
    match query.get_source() {
        InsertSource::Values(rows) if rows.is_empty() => scope.append(" DEFAULT VALUES"),
        InsertSource::Values(rows) => {
            scope.append(" VALUES ");
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    scope.append(", ");
                }
                scope.append("(");
                c.render(row, &mut scope)?;
                scope.append(")");
            }
        }
        InsertSource::Select(source) => {
            scope.append(" ");
            c.render_at(source, &mut scope, TOP)?;
        }
    }
    if let Some(conflict) = query.get_conflict() {
        c.render_in(conflict, &mut scope, Context::InsertTail)?;
    }
    render_returning(c, query.get_returning(), &mut scope)?;
    if query.get_table().is_none() {
        splice_auto_tables(c, &mut scope, table_at, "")?;
    }
    Ok(())
}

fn update(c: &Compiler, query: &Update, state: &mut State) -> Result<()> {
    let mut scope = state.scope();
    scope.isolate_tables();
    scope.context = Context::Expr;
    scope.precedence = CLAUSE;

    scope.append("UPDATE ");
    let table_at = scope.mark();
    if let Some(table) = query.get_table() {
        c.render_in(table, &mut scope, Context::Table)?;
    }
    scope.append(" SET ");
    render_assignments(c, query.get_assignments(), &mut scope)?;
    render_clause(c, " WHERE ", query.get_where(), &mut scope)?;
    render_list(c, " ORDER BY ", query.get_order_by(), &mut scope)?;
    render_bounds(c, query.bounds(), &mut scope)?;
    render_returning(c, query.get_returning(), &mut scope)?;
    if query.get_table().is_none() {
        splice_auto_tables(c, &mut scope, table_at, "")?;
    }
    Ok(())
}

fn delete(c: &Compiler, query: &Delete, state: &mut State) -> Result<()> {
    let mut scope = state.scope();
    scope.isolate_tables();
    scope.context = Context::Expr;
    scope.precedence = CLAUSE;

    scope.append("DELETE FROM ");
    let table_at = scope.mark();
    if let Some(table) = query.get_table() {
        c.render_in(table, &mut scope, Context::Table)?;
    }
    render_clause(c, " WHERE ", query.get_where(), &mut scope)?;
    render_list(c, " ORDER BY ", query.get_order_by(), &mut scope)?;
    render_bounds(c, query.bounds(), &mut scope)?;
    render_returning(c, query.get_returning(), &mut scope)?;
    if query.get_table().is_none() {
        splice_auto_tables(c, &mut scope, table_at, "")?;
    }
    Ok(())
}

fn on_conflict(c: &Compiler, conflict: &OnConflict, state: &mut State) -> Result<()> {
    if state.context != Context::InsertTail {
        return Ok(());
    }
    if conflict.is_update_suppressed() {
        debug!(compiler = %c.name(), "conflict update suppressed by ignore");
    }
    state.append(" ON CONFLICT");
    render_conflict_target(c, conflict, state)?;
    match conflict.action() {
        ConflictAction::Ignore => state.append(" DO NOTHING"),
        ConflictAction::Update(pairs) => {
            state.append(" DO UPDATE SET ");
            render_assignments(c, pairs, state)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{field, Excluded, Table};
    use crate::builder::{ListOptions, SqlValue, Statement};
    use crate::dialect::postgres;
    use crate::error::Error;

    fn author() -> Table {
        Table::new("author")
    }

    #[test]
    fn test_select_infers_from() {
        let a = author();
        let (sql, params) = Select::new()
            .fields([a.get_field("id")])
            .where_clause(a.get_field("id").eq(3))
            .build()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT \"author\".\"id\" FROM \"author\" WHERE \"author\".\"id\" = %s"
        );
        assert_eq!(params, vec![SqlValue::Int(3)]);
    }

    #[test]
    fn test_select_without_fields_renders_star() {
        let (sql, _) = Select::new().from(author()).build().unwrap();
        assert_eq!(sql, "SELECT * FROM \"author\"");
    }

    #[test]
    fn test_select_clauses() {
        let a = author();
        let q = Select::new()
            .from(&a)
            .distinct(true)
            .fields([a.get_field("name"), a.get_field("id").as_alias("n")])
            .group_by([a.get_field("name")])
            .having(a.get_field("id").gt(1))
            .order_by_with([a.get_field("name")], ListOptions::descending())
            .limit(10)
            .offset(20)
            .for_update(true);
        let (sql, params) = q.build().unwrap();
        assert_eq!(
            sql,
            "SELECT DISTINCT \"author\".\"name\", \"author\".\"id\" AS \"n\" FROM \"author\" \
             GROUP BY \"author\".\"name\" HAVING \"author\".\"id\" > %s \
             ORDER BY \"author\".\"name\" DESC LIMIT 10 OFFSET 20 FOR UPDATE"
        );
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_count_plain_and_wrapped() {
        let a = author();
        let base = Select::new()
            .from(&a)
            .where_clause(a.get_field("id").gt(1))
            .order_by([a.get_field("id")]);
        let (sql, _) = base.count().build().unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*) AS \"count_value\" FROM \"author\" WHERE \"author\".\"id\" > %s"
        );
        let (sql, _) = base.limit(5).count().build().unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(1) AS \"count_value\" FROM (SELECT * FROM \"author\" \
             WHERE \"author\".\"id\" > %s LIMIT 5) AS \"count_list\""
        );
    }

    #[test]
    fn test_set_operation_parenthesizes_limited_operands() {
        let a = author();
        let q1 = Select::new().from(&a).fields([a.get_field("id")]);
        let q2 = q1.limit(1);
        let (sql, _) = q1.union(q2).build().unwrap();
        assert_eq!(
            sql,
            "SELECT \"author\".\"id\" FROM \"author\" UNION \
             (SELECT \"author\".\"id\" FROM \"author\" LIMIT 1)"
        );
        let (sql, _) = q1.union_all(q1.clone()).limit(3).build().unwrap();
        assert_eq!(
            sql,
            "SELECT \"author\".\"id\" FROM \"author\" UNION ALL \
             SELECT \"author\".\"id\" FROM \"author\" LIMIT 3"
        );
    }

    #[test]
    fn test_nested_set_operation_is_parenthesized() {
        let a = author();
        let q = Select::new().from(&a);
        let (sql, _) = q.except(q.intersect(q.clone())).build().unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"author\" EXCEPT \
             (SELECT * FROM \"author\" INTERSECT SELECT * FROM \"author\")"
        );
    }

    #[test]
    fn test_insert_values_and_returning() {
        let a = author();
        let (sql, params) = Select::new()
            .from(&a)
            .insert([(a.get_field("first_name"), "John"), (a.get_field("last_name"), "Smith")])
            .returning([a.get_field("id")])
            .build()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"author\" (\"first_name\", \"last_name\") VALUES (%s, %s) \
             RETURNING \"author\".\"id\""
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_insert_infers_table_from_fields() {
        let a = author();
        let (sql, _) = Select::new()
            .insert_rows([a.get_field("id")], [[1], [2]])
            .build()
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"author\" (\"id\") VALUES (%s), (%s)");
    }

    #[test]
    fn test_insert_default_values_and_select() {
        let a = author();
        let (sql, _) = Insert::new(&a).build().unwrap();
        assert_eq!(sql, "INSERT INTO \"author\" DEFAULT VALUES");
        let b = Table::new("archive");
        let (sql, _) = Select::new()
            .from(&b)
            .insert_select([b.get_field("id")], Select::new().from(&a).fields([a.get_field("id")]))
            .build()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"archive\" (\"id\") SELECT \"author\".\"id\" FROM \"author\""
        );
    }

    #[test]
    fn test_on_conflict_generic() {
        let a = author();
        let insert = Insert::new(&a)
            .fields([a.get_field("id"), a.get_field("name")])
            .values([SqlValue::Int(1), SqlValue::Text(String::from("x"))]);
        let (sql, _) = insert.ignore_conflicts().build().unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"author\" (\"id\", \"name\") VALUES (%s, %s) ON CONFLICT DO NOTHING"
        );
        let upsert = insert.on_conflict_update(
            [a.get_field("id")],
            [(a.get_field("name"), Excluded::new(a.get_field("name")))],
        );
        let (sql, _) = upsert.build_with(postgres()).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"author\" (\"id\", \"name\") VALUES ($1, $2) \
             ON CONFLICT (\"id\") DO UPDATE SET \"name\" = EXCLUDED.\"name\""
        );
        let (sql, _) = upsert.ignore_conflicts().build().unwrap();
        assert!(sql.ends_with("ON CONFLICT (\"id\") DO NOTHING"));
    }

    #[test]
    fn test_update_and_delete() {
        let a = author();
        let q = Select::new().where_clause(a.get_field("id").eq(1));
        let (sql, params) = q.update([(a.get_field("name"), "x")]).build().unwrap();
        assert_eq!(
            sql,
            "UPDATE \"author\" SET \"name\" = %s WHERE \"author\".\"id\" = %s"
        );
        assert_eq!(
            params,
            vec![SqlValue::Text(String::from("x")), SqlValue::Int(1)]
        );
        let (sql, _) = q.delete().build().unwrap();
        assert_eq!(sql, "DELETE FROM \"author\" WHERE \"author\".\"id\" = %s");
    }

    #[test]
    fn test_join_rendering() {
        let a = author();
        let b = Table::new("book");
        let join = a
            .left_join(&b)
            .on(b.get_field("author_id").eq(a.get_field("id")))
            .unwrap();
        let (sql, _) = Select::new().from(join).fields([b.get_field("title")]).build().unwrap();
        assert_eq!(
            sql,
            "SELECT \"book\".\"title\" FROM \"author\" LEFT OUTER JOIN \"book\" \
             ON \"book\".\"author_id\" = \"author\".\"id\""
        );
    }

    #[test]
    fn test_join_using() {
        let a = author();
        let b = Table::new("book");
        let join = a.inner_join(&b).using([b.get_field("author_id")]).unwrap();
        let (sql, _) = Select::new().from(join).build().unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"author\" INNER JOIN \"book\" USING (\"author_id\")"
        );
    }

    #[test]
    fn test_subquery_alias_in_from() {
        let a = author();
        let sub = Select::new().from(&a).fields([a.get_field("id")]).as_table("s");
        let (sql, _) = Select::new().from(&sub).fields([sub.get_field("id")]).build().unwrap();
        assert_eq!(
            sql,
            "SELECT \"s\".\"id\" FROM (SELECT \"author\".\"id\" FROM \"author\") AS \"s\""
        );
    }

    #[test]
    fn test_empty_in_aborts_select() {
        let a = author();
        let err = Select::new()
            .from(&a)
            .where_clause(a.get_field("id").eq(Vec::<i64>::new()))
            .build()
            .unwrap_err();
        assert_eq!(err, Error::EmptyCollection);
    }
}
