//! # sqlfrag-core
//!
//! A command-tree to SQL compiler for ORM data providers.
//!
//! This crate provides:
//! - A serde-friendly command tree ([`tree`]) describing queries and
//!   modifications over entity sets
//! - A fragment model ([`fragment`], [`select`]) that each piece of SQL is
//!   built into before being written
//! - A generator ([`generator`]) that tracks scopes, disambiguates column
//!   names, flattens joins and unions, and nests statements when an operator
//!   cannot be folded into the current one
//! - Dialect hooks ([`dialect`]) for quoting, parameter naming and literals
//!
//! ## Generating a Query
//!
//! ```rust
//! use sqlfrag_core::dialect::GenericDialect;
//! use sqlfrag_core::generator::SqlGenerator;
//! use sqlfrag_core::schema::EntitySetRef;
//! use sqlfrag_core::tree::{CommandTree, Expr, NamedExpr};
//!
//! let customers = EntitySetRef::new("Customers", &["Id", "Name", "Email"]);
//! let query = Expr::project(
//!     Expr::filter(customers.scan(), "c", Expr::var("c").prop("Name").eq(Expr::param("name"))),
//!     "f",
//!     vec![NamedExpr::new("Email", Expr::var("f").prop("Email"))],
//! );
//!
//! let generated = SqlGenerator::new(&GenericDialect)
//!     .generate(&CommandTree::Query { query })
//!     .unwrap();
//! assert_eq!(
//!     generated.sql,
//!     "SELECT \"c\".\"Email\"\r\n FROM \"Customers\" AS \"c\"\r\n WHERE \"c\".\"Name\" = :name"
//! );
//! ```
//!
//! ## Constants Become Parameters
//!
//! Numbers and booleans are written inline. Every other constant is bound as
//! a generated parameter so the driver does the quoting:
//!
//! ```rust
//! use sqlfrag_core::dialect::GenericDialect;
//! use sqlfrag_core::generator::SqlGenerator;
//! use sqlfrag_core::schema::EntitySetRef;
//! use sqlfrag_core::tree::{CommandTree, Expr};
//! use sqlfrag_core::value::SqlValue;
//!
//! let users = EntitySetRef::new("users", &["id", "name"]);
//! let query = Expr::filter(
//!     users.scan(),
//!     "u",
//!     Expr::var("u").prop("name").eq(Expr::constant("'; DROP TABLE users; --")),
//! );
//! let generated = SqlGenerator::new(&GenericDialect)
//!     .generate(&CommandTree::Query { query })
//!     .unwrap();
//!
//! assert!(generated.sql.ends_with("WHERE \"u\".\"name\" = :gp0"));
//! assert_eq!(
//!     generated.parameters[0].value,
//!     SqlValue::Text(String::from("'; DROP TABLE users; --"))
//! );
//! ```

pub mod dialect;
pub mod error;
pub mod fragment;
pub mod generator;
pub mod schema;
pub mod scope;
pub mod select;
pub mod tree;
pub mod value;

pub use dialect::{Dialect, GenericDialect};
pub use error::{GenerateError, Result};
pub use fragment::{ColumnFragment, InputFragment, SqlFragment};
pub use generator::{GeneratedSql, GeneratorOptions, ResultColumn, SqlGenerator};
pub use schema::{EntitySet, EntitySetRef};
pub use select::SelectStatement;
pub use tree::{CommandTree, Expr};
pub use value::{Parameter, SqlValue, ToSqlValue};
