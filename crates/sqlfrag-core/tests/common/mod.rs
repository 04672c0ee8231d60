#![allow(dead_code)]

use sqlfrag_core::dialect::{Dialect, GenericDialect};
use sqlfrag_core::generator::{GeneratedSql, GeneratorOptions, SqlGenerator};
use sqlfrag_core::schema::EntitySetRef;
use sqlfrag_core::tree::{CommandTree, Expr};
use sqlfrag_core::GenerateError;

/// `[bracket]` quoting with `@` parameters.
pub struct BracketDialect;

impl Dialect for BracketDialect {
    fn name(&self) -> &'static str {
        "bracket"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn parameter_prefix(&self) -> char {
        '@'
    }
}

pub fn customers() -> EntitySetRef {
    EntitySetRef::new("Customers", &["Id", "Name"]).with_keys(&["Id"])
}

pub fn orders() -> EntitySetRef {
    EntitySetRef::new("Orders", &["Id", "CustomerId", "Total"]).with_keys(&["Id"])
}

pub fn suppliers() -> EntitySetRef {
    EntitySetRef::new("Suppliers", &["Id", "CompanyName"]).with_keys(&["Id"])
}

pub fn generate_tree_with(dialect: &dyn Dialect, options: GeneratorOptions, tree: &CommandTree) -> GeneratedSql {
    SqlGenerator::new(dialect)
        .with_options(options)
        .generate(tree)
        .unwrap_or_else(|e| panic!("Failed to generate: {tree:?}\nError: {e:?}"))
}

pub fn generate_tree(tree: &CommandTree) -> GeneratedSql {
    generate_tree_with(&GenericDialect, GeneratorOptions::default(), tree)
}

pub fn generate(query: Expr) -> GeneratedSql {
    generate_tree(&CommandTree::Query { query })
}

pub fn sql(query: Expr) -> String {
    generate(query).sql
}

pub fn sql_unfused(query: Expr) -> String {
    generate_tree_with(
        &GenericDialect,
        GeneratorOptions {
            fuse_selects: false,
        },
        &CommandTree::Query { query },
    )
    .sql
}

pub fn generate_err(query: Expr) -> GenerateError {
    let tree = CommandTree::Query { query };
    SqlGenerator::new(&GenericDialect)
        .generate(&tree)
        .expect_err(&format!("Expected generation error for: {tree:?}"))
}
