//! Tests for the `#[derive(Entity)]` macro output.

mod common;

use common::sql;
use querytree_core::schema::Entity;
use querytree_core::{Expr, Select};
use querytree_derive::Entity;

#[allow(dead_code)]
#[derive(Debug, Entity)]
pub struct BookAuthor {
    pub id: i64,
    #[column(name = "given_name")]
    pub first_name: String,
    #[column(skip)]
    pub loaded: bool,
}

#[allow(dead_code)]
#[derive(Debug, Entity)]
#[entity(table = "writers")]
pub struct Writer {
    pub id: i64,
}

#[test]
fn test_default_table_name_is_snake_case() {
    assert_eq!(BookAuthor::TABLE, "book_author");
    assert_eq!(Writer::TABLE, "writers");
}

#[test]
fn test_columns_in_declaration_order() {
    assert_eq!(
        BookAuthor::COLUMNS,
        &[("id", "id"), ("first_name", "given_name")]
    );
    assert_eq!(BookAuthor::column("first_name"), Some("given_name"));
    assert_eq!(BookAuthor::column("loaded"), None);
}

#[test]
fn test_entity_table_interns_columns() {
    let table = BookAuthor::table();
    let first = table.get_attribute::<BookAuthor>("first_name").unwrap();
    assert!(Expr::ptr_eq(&first, &table.get_field("given_name")));
    let (rendered, params) = sql(&Select::new().fields([first]).where_clause(
        table.get_attribute::<BookAuthor>("id").unwrap().eq(7),
    ));
    assert_eq!(
        rendered,
        r#"SELECT "book_author"."given_name" FROM "book_author" WHERE "book_author"."id" = %s"#
    );
    assert_eq!(params.len(), 1);
}
