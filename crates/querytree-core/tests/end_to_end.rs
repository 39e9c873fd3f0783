mod common;

use common::{author, numbered_placeholders, sql, text};
use querytree_core::builder::Statement;
use querytree_core::{dialect, Select, SqlValue};

#[test]
fn test_author_scenario() {
    let author = author();
    let query = Select::new()
        .from(&author)
        .fields([author.get_field("id"), author.get_field("first_name")])
        .where_clause(author.get_field("first_name").eq("John"));
    let (sql, params) = query.build().unwrap();
    assert_eq!(
        sql,
        r#"SELECT "author"."id", "author"."first_name" FROM "author" WHERE "author"."first_name" = %s"#
    );
    assert_eq!(params, vec![text("John")]);
}

#[test]
fn test_author_scenario_infers_from_clause() {
    let author = author();
    let query = Select::new()
        .fields([author.get_field("id"), author.get_field("first_name")])
        .where_clause(author.get_field("first_name").eq("John"));
    let (sql, _) = query.build().unwrap();
    assert_eq!(
        sql,
        r#"SELECT "author"."id", "author"."first_name" FROM "author" WHERE "author"."first_name" = %s"#
    );
}

#[test]
fn test_placeholders_align_with_parameters() {
    let author = author();
    let query = Select::new()
        .from(&author)
        .fields([author.get_field("id")])
        .where_clause(author.get_field("age").gt(18))
        .where_clause(author.get_field("name").like("J%"))
        .where_clause(author.get_field("city").eq(vec!["Paris", "Oslo"]).not());
    let (sql, params) = query.build().unwrap();
    assert_eq!(sql.matches("%s").count(), params.len());
    assert_eq!(
        params,
        vec![SqlValue::Int(18), text("J%"), text("Paris"), text("Oslo")]
    );

    let (sql, params) = query.build_with(dialect::postgres()).unwrap();
    let expected: Vec<usize> = (1..=params.len()).collect();
    assert_eq!(numbered_placeholders(&sql), expected);
}

#[test]
fn test_numbered_placeholders_with_inferred_from() {
    let author = author();
    let adults = Select::new()
        .fields([author.get_field("id")])
        .where_clause(author.get_field("age").gt(30))
        .as_table("s");
    let query = Select::new()
        .fields([adults.get_field("id")])
        .where_clause(adults.get_field("id").lt(10));
    let (sql, params) = query.build_with(dialect::postgres()).unwrap();
    assert_eq!(
        sql,
        r#"SELECT "s"."id" FROM (SELECT "author"."id" FROM "author" WHERE "author"."age" > $1) AS "s" WHERE "s"."id" < $2"#
    );
    assert_eq!(params, vec![SqlValue::Int(30), SqlValue::Int(10)]);
    assert_eq!(numbered_placeholders(&sql), vec![1, 2]);
}

#[test]
fn test_numbered_placeholders_in_update_with_inferred_table() {
    let author = author();
    let update = Select::new()
        .where_clause(author.get_field("id").eq(7))
        .update([(author.get_field("name"), "x")]);
    let (sql, params) = update.build_with(dialect::postgres()).unwrap();
    assert_eq!(
        sql,
        r#"UPDATE "author" SET "name" = $1 WHERE "author"."id" = $2"#
    );
    assert_eq!(params, vec![text("x"), SqlValue::Int(7)]);
}

#[test]
fn test_subquery_parameters_keep_order() {
    let author = author();
    let inner = Select::new()
        .from(&author)
        .fields([author.get_field("id")])
        .where_clause(author.get_field("age").gt(30));
    let outer = Select::new()
        .from(&author)
        .where_clause(author.get_field("name").eq("a"))
        .where_clause(author.get_field("id").in_list([inner]).unwrap())
        .where_clause(author.get_field("name").ne("b"));
    let (rendered, params) = sql(&outer);
    assert_eq!(
        rendered,
        r#"SELECT * FROM "author" WHERE "author"."name" = %s AND "author"."id" IN (SELECT "author"."id" FROM "author" WHERE "author"."age" > %s) AND "author"."name" <> %s"#
    );
    assert_eq!(params, vec![text("a"), SqlValue::Int(30), text("b")]);
}
