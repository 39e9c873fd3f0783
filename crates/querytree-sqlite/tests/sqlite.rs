mod common;

use common::{author, sqlite, text};
use querytree_core::ast::{field, Excluded};
use querytree_core::{dialect, Insert, Select, SqlValue};

#[test]
fn test_qmark_placeholders() {
    let a = author();
    let query = Select::new()
        .fields([a.get_field("id")])
        .where_clause(a.get_field("first_name").eq("John"))
        .where_clause(a.get_field("age").gt(18));
    let (sql, params) = sqlite(&query);
    assert_eq!(
        sql,
        r#"SELECT "author"."id" FROM "author" WHERE "author"."first_name" = ? AND "author"."age" > ?"#
    );
    assert_eq!(params, vec![text("John"), SqlValue::Int(18)]);
}

#[test]
fn test_ilike_is_spelled_like() {
    assert_eq!(sqlite(&field("t").ilike("a%")).0, r#""t" LIKE ?"#);
    assert_eq!(sqlite(&field("t").not_ilike("a%")).0, r#""t" NOT LIKE ?"#);
    assert_eq!(
        sqlite(&field("t").istartswith("a_")).0,
        r#""t" LIKE ? || ? ESCAPE '!'"#
    );
}

#[test]
fn test_insert_or_ignore() {
    let a = author();
    let insert = Insert::new(&a)
        .fields([a.get_field("id")])
        .values([1])
        .ignore_conflicts();
    assert_eq!(
        sqlite(&insert).0,
        r#"INSERT OR IGNORE INTO "author" ("id") VALUES (?)"#
    );
}

#[test]
fn test_on_conflict_do_update() {
    let a = author();
    let upsert = Insert::new(&a)
        .fields([a.get_field("id"), a.get_field("name")])
        .values([SqlValue::Int(1), text("x")])
        .on_conflict_update(
            [a.get_field("id")],
            [(a.get_field("name"), Excluded::new(a.get_field("name")))],
        );
    assert_eq!(
        sqlite(&upsert).0,
        r#"INSERT INTO "author" ("id", "name") VALUES (?, ?) ON CONFLICT ("id") DO UPDATE SET "name" = EXCLUDED."name""#
    );
    let (sql, _) = sqlite(&upsert.ignore_conflicts());
    assert_eq!(sql, r#"INSERT OR IGNORE INTO "author" ("id", "name") VALUES (?, ?)"#);
}

#[test]
fn test_offset_without_limit() {
    let a = author();
    let (sql, _) = sqlite(&Select::new().from(&a).offset(20));
    assert_eq!(sql, r#"SELECT * FROM "author" LIMIT -1 OFFSET 20"#);
    let (sql, _) = dialect::generic()
        .compile(&Select::new().from(&a).offset(20))
        .unwrap();
    assert_eq!(sql, r#"SELECT * FROM "author" OFFSET 20"#);
}

#[test]
fn test_update_with_limit() {
    let a = author();
    let update = Select::new()
        .where_clause(a.get_field("id").eq(7))
        .limit(1)
        .update([(a.get_field("name"), "x")]);
    let (sql, params) = sqlite(&update);
    assert_eq!(
        sql,
        r#"UPDATE "author" SET "name" = ? WHERE "author"."id" = ? LIMIT 1"#
    );
    assert_eq!(params, vec![text("x"), SqlValue::Int(7)]);
}
