mod common;

use common::{author, sql, text};
use querytree_core::{field, Error, Expr, Select};

#[test]
fn test_builder_idempotence() {
    let author = author();
    let base = Select::new().from(&author).where_clause(author.get_field("id").gt(1));
    let first = sql(&base);
    let _ = base.where_clause(author.get_field("name").eq("x")).limit(5);
    let _ = base.fields([author.get_field("name")]);
    assert_eq!(sql(&base), first);
    assert_eq!(sql(&base), first);
}

#[test]
fn test_derived_queries_do_not_alias() {
    let author = author();
    let base = Select::new().from(&author);
    let q1 = base.fields([author.get_field("id")]);
    let q2 = base.fields([author.get_field("name")]);
    assert_eq!(sql(&q1).0, r#"SELECT "author"."id" FROM "author""#);
    assert_eq!(sql(&q2).0, r#"SELECT "author"."name" FROM "author""#);
    assert_eq!(sql(&base).0, r#"SELECT * FROM "author""#);
}

#[test]
fn test_field_interning() {
    let author = author();
    let a = author.get_field("id");
    let b = author.get_field("id");
    assert!(Expr::ptr_eq(&a, &b));
    assert!(!Expr::ptr_eq(&a, &author.get_field("name")));
    let clone = author.clone();
    assert!(Expr::ptr_eq(&a, &clone.get_field("id")));
    assert!(!Expr::ptr_eq(&a, &common::author().get_field("id")));
}

#[test]
fn test_empty_collection_guard() {
    assert_eq!(
        field("a").in_list(Vec::<i32>::new()).unwrap_err(),
        Error::EmptyCollection
    );
    let (rendered, params) = sql(&field("a").in_list([1, 2]).unwrap());
    assert_eq!(rendered, r#""a" IN (%s, %s)"#);
    assert_eq!(params.len(), 2);
}

#[test]
fn test_like_escaping() {
    let (rendered, params) = sql(&field("title").startswith("100%_off"));
    assert_eq!(rendered, r#""title" LIKE %s || %s ESCAPE '!'"#);
    assert_eq!(params, vec![text("100!%!_off"), text("%")]);
}

#[test]
fn test_like_escaping_variants() {
    let (rendered, params) = sql(&field("t").iendswith("a!b"));
    assert_eq!(rendered, r#""t" ILIKE %s || %s ESCAPE '!'"#);
    assert_eq!(params, vec![text("%"), text("a!!b")]);
    let (_, params) = sql(&field("t").contains("x"));
    assert_eq!(params, vec![text("%"), text("x"), text("%")]);
}

#[test]
fn test_slice_and_at() {
    let author = author();
    let q = Select::new().from(&author);
    assert_eq!(sql(&q.slice(10..15)).0, r#"SELECT * FROM "author" LIMIT 5 OFFSET 10"#);
    assert_eq!(sql(&q.at(3)).0, r#"SELECT * FROM "author" LIMIT 1 OFFSET 3"#);
    assert_eq!(sql(&q.offset(7)).0, r#"SELECT * FROM "author" OFFSET 7"#);
}
