//! # sqlfrag-mysql
//!
//! MySQL-family dialect for `sqlfrag-core`.
//!
//! # How MySQL differs from the generic dialect
//!
//! - **Identifier quoting**: MySQL quotes identifiers with backticks
//!   (`` ` ``) unless `ANSI_QUOTES` is enabled. See [identifiers].
//! - **Named parameters**: connectors for the MySQL family bind named
//!   parameters written `@name`.
//! - **[LIMIT]**: `LIMIT offset, count` has no "all rows" form, so an
//!   offset without a limit is written with the largest unsigned 64-bit
//!   row count.
//! - **Read-back after DML**: `LAST_INSERT_ID()` yields the identity of
//!   the last insert and `ROW_COUNT()` the number of rows touched by the
//!   last statement. See [information functions].
//!
//! [identifiers]: https://dev.mysql.com/doc/refman/8.0/en/identifiers.html
//! [LIMIT]: https://dev.mysql.com/doc/refman/8.0/en/select.html
//! [information functions]: https://dev.mysql.com/doc/refman/8.0/en/information-functions.html
//!
//! ## Example
//!
//! ```rust
//! use sqlfrag_core::generator::SqlGenerator;
//! use sqlfrag_core::schema::EntitySetRef;
//! use sqlfrag_core::tree::{CommandTree, Expr};
//! use sqlfrag_mysql::MySqlDialect;
//!
//! let users = EntitySetRef::new("users", &["id", "name"]);
//! let query = Expr::filter(
//!     users.scan(),
//!     "u",
//!     Expr::var("u").prop("name").eq(Expr::constant("Alice")),
//! );
//! let generated = SqlGenerator::new(&MySqlDialect)
//!     .generate(&CommandTree::Query { query })
//!     .unwrap();
//!
//! assert_eq!(
//!     generated.sql,
//!     "SELECT `u`.`id`, `u`.`name`\r\n FROM `users` AS `u`\r\n WHERE `u`.`name` = @gp0"
//! );
//! ```

mod dialect;

pub use dialect::MySqlDialect;
