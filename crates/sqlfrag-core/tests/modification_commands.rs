//! Integration tests for INSERT, UPDATE and DELETE commands and their
//! read-back statements.

mod common;

use common::*;
use sqlfrag_core::tree::{
    Binding, CommandTree, DeleteCommand, Expr, InsertCommand, NamedExpr, SetClause, UpdateCommand,
};
use sqlfrag_core::value::SqlValue;

fn versioned_customers() -> sqlfrag_core::schema::EntitySetRef {
    sqlfrag_core::schema::EntitySetRef::new("Customers", &["Id", "Name", "Version"]).with_keys(&["Id"])
}

#[test]
fn test_insert_without_returning() {
    let tree = CommandTree::Insert(InsertCommand {
        target: Binding::new(customers().scan(), "t"),
        set_clauses: vec![
            SetClause::new(Expr::var("t").prop("Id"), Expr::constant(5)),
            SetClause::new(Expr::var("t").prop("Name"), Expr::param("name")),
        ],
        returning: None,
    });
    let generated = generate_tree(&tree);
    assert_eq!(
        generated.sql,
        "INSERT INTO \"Customers\"(\"Id\", \"Name\") VALUES (5, :name)"
    );
    assert!(generated.parameters.is_empty());
    assert!(generated.columns.is_empty());
}

#[test]
fn test_insert_reads_back_by_assigned_key() {
    let tree = CommandTree::Insert(InsertCommand {
        target: Binding::new(versioned_customers().scan(), "t"),
        set_clauses: vec![
            SetClause::new(Expr::var("t").prop("Id"), Expr::constant(5)),
            SetClause::new(Expr::var("t").prop("Name"), Expr::param("n")),
        ],
        returning: Some(vec![NamedExpr::new("Version", Expr::var("t").prop("Version"))]),
    });
    assert_eq!(
        generate_tree(&tree).sql,
        "INSERT INTO \"Customers\"(\"Id\", \"Name\") VALUES (5, :n);\r\n\
         SELECT \"Version\"\r\n FROM \"Customers\"\r\n WHERE row_count() > 0 AND \"Id\" = 5"
    );
}

#[test]
fn test_update_with_returning() {
    let tree = CommandTree::Update(UpdateCommand {
        target: Binding::new(versioned_customers().scan(), "t"),
        set_clauses: vec![SetClause::new(
            Expr::var("t").prop("Name"),
            Expr::constant("Bob"),
        )],
        predicate: Expr::var("t").prop("Id").eq(Expr::constant(7)),
        returning: Some(vec![NamedExpr::new("Version", Expr::var("t").prop("Version"))]),
    });
    let generated = generate_tree(&tree);
    assert_eq!(
        generated.sql,
        "UPDATE \"Customers\" SET \"Name\" = :gp0 WHERE \"Id\" = 7;\r\n\
         SELECT \"Version\"\r\n FROM \"Customers\"\r\n WHERE row_count() > 0 AND (\"Id\" = 7)"
    );
    assert_eq!(generated.parameters[0].value, SqlValue::Text(String::from("Bob")));
}

#[test]
fn test_delete() {
    let tree = CommandTree::Delete(DeleteCommand {
        target: Binding::new(customers().scan(), "t"),
        predicate: Expr::var("t").prop("Id").eq(Expr::constant(7)),
    });
    assert_eq!(
        generate_tree(&tree).sql,
        "DELETE FROM \"Customers\" WHERE \"Id\" = 7"
    );
}

#[test]
fn test_delete_with_bracket_dialect() {
    let tree = CommandTree::Delete(DeleteCommand {
        target: Binding::new(customers().with_schema("crm").scan(), "t"),
        predicate: Expr::var("t").prop("Name").is_null(),
    });
    let generated = generate_tree_with(
        &BracketDialect,
        sqlfrag_core::generator::GeneratorOptions::default(),
        &tree,
    );
    assert_eq!(generated.sql, "DELETE FROM [crm].[Customers] WHERE [Name] IS NULL");
}
