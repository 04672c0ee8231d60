//! Command tree to SQL lowering.
//!
//! [`SqlGenerator`] walks a [`CommandTree`] bottom-up, builds the fragment
//! tree of the statement, and writes it with the generator's dialect.
//!
//! # Example
//!
//! ```rust
//! use sqlfrag_core::dialect::GenericDialect;
//! use sqlfrag_core::generator::SqlGenerator;
//! use sqlfrag_core::schema::EntitySetRef;
//! use sqlfrag_core::tree::{CommandTree, Expr};
//!
//! let customers = EntitySetRef::new("Customers", &["Id", "Name"]);
//! let query = Expr::filter(
//!     customers.scan(),
//!     "c",
//!     Expr::var("c").prop("Id").eq(Expr::constant(1)),
//! );
//!
//! let generated = SqlGenerator::new(&GenericDialect)
//!     .generate(&CommandTree::Query { query })
//!     .unwrap();
//! assert_eq!(
//!     generated.sql,
//!     "SELECT \"c\".\"Id\", \"c\".\"Name\"\r\n FROM \"Customers\" AS \"c\"\r\n WHERE \"c\".\"Id\" = 1"
//! );
//! ```

mod dml;
mod functions;
mod fusion;
mod query;
mod scalar;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::fragment::{InputFragment, SqlFragment};
use crate::scope::{GenContext, OpType};
use crate::select::SelectStatement;
use crate::tree::CommandTree;
use crate::value::Parameter;

/// Generation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Collapse `SELECT FROM (SELECT FROM table)` into one statement when
    /// the two are compatible.
    pub fuse_selects: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self { fuse_selects: true }
    }
}

/// Provenance of one column of the outermost SELECT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    /// Zero-based position in the select list.
    pub ordinal: usize,
    /// Name of the column in the result set.
    pub name: String,
    /// Alias of the input the column is read from.
    pub table: Option<String>,
    /// Column name at that input; absent for computed columns.
    pub source_column: Option<String>,
    /// Property chain the column was reached through.
    pub chain: Vec<String>,
}

/// Output of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSql {
    /// SQL text.
    pub sql: String,
    /// Parameters generated for non-inline constants, in placeholder order.
    pub parameters: Vec<Parameter>,
    /// Column provenance of a query; empty for DML.
    pub columns: Vec<ResultColumn>,
}

/// Lowers command trees to SQL for one dialect.
///
/// A generator compiles one command at a time; its scope, operator stack and
/// parameter list are reset at the start of every call.
pub struct SqlGenerator<'d> {
    dialect: &'d dyn Dialect,
    options: GeneratorOptions,
    cx: GenContext,
    parameters: Vec<Parameter>,
    alias_counter: usize,
}

impl<'d> SqlGenerator<'d> {
    /// Creates a generator with default options.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            options: GeneratorOptions::default(),
            cx: GenContext::new(),
            parameters: vec![],
            alias_counter: 0,
        }
    }

    /// Replaces the generation options.
    #[must_use]
    pub const fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Builds the fragment tree of `tree` without writing it.
    ///
    /// # Errors
    ///
    /// Returns the first [`GenerateError`](crate::error::GenerateError) hit
    /// while lowering the tree.
    pub fn build(&mut self, tree: &CommandTree) -> Result<SqlFragment> {
        self.reset();
        match tree {
            CommandTree::Query { query } => {
                let select = self.generate_query(query)?;
                Ok(SqlFragment::Input(InputFragment::Select(Box::new(select))))
            }
            CommandTree::Insert(command) => {
                Ok(SqlFragment::Insert(Box::new(self.generate_insert(command)?)))
            }
            CommandTree::Update(command) => {
                Ok(SqlFragment::Update(Box::new(self.generate_update(command)?)))
            }
            CommandTree::Delete(command) => {
                Ok(SqlFragment::Delete(Box::new(self.generate_delete(command)?)))
            }
        }
    }

    /// Generates the SQL text, parameters and column map of `tree`.
    ///
    /// # Errors
    ///
    /// Returns the first [`GenerateError`](crate::error::GenerateError) hit
    /// while lowering the tree; no partial SQL is produced.
    pub fn generate(&mut self, tree: &CommandTree) -> Result<GeneratedSql> {
        let fragment = self.build(tree)?;
        let columns = match &fragment {
            SqlFragment::Input(InputFragment::Select(select)) => result_columns(select),
            _ => vec![],
        };
        let sql = fragment.to_sql(self.dialect);
        debug!(
            dialect = self.dialect.name(),
            statement = fragment.kind_name(),
            parameters = self.parameters.len(),
            sql = %sql,
            "generated sql"
        );
        Ok(GeneratedSql {
            sql,
            parameters: std::mem::take(&mut self.parameters),
            columns,
        })
    }

    fn reset(&mut self) {
        self.cx = GenContext::new();
        self.parameters.clear();
        self.alias_counter = 0;
    }

    /// Returns `prefix` followed by a number unique within this call.
    fn fresh_alias(&mut self, prefix: &str) -> String {
        self.alias_counter += 1;
        format!("{prefix}{}", self.alias_counter)
    }

    /// Runs `f` with `op` pushed on the operator stack.
    fn with_op<T>(&mut self, op: OpType, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.cx.push_op(op);
        let result = f(self);
        self.cx.pop_op();
        result
    }
}

fn result_columns(select: &SelectStatement) -> Vec<ResultColumn> {
    select
        .columns
        .iter()
        .enumerate()
        .map(|(ordinal, column)| ResultColumn {
            ordinal,
            name: column.output_name().map(String::from).unwrap_or_default(),
            table: if column.literal.is_some() {
                None
            } else {
                column.table_name.clone()
            },
            source_column: if column.literal.is_some() {
                None
            } else {
                column.column_name.clone()
            },
            chain: column.properties.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::schema::EntitySetRef;
    use crate::tree::{Expr, NamedExpr};

    #[test]
    fn test_generator_is_reusable() {
        let customers = EntitySetRef::new("Customers", &["Id", "Name"]);
        let query = Expr::filter(
            customers.scan(),
            "c",
            Expr::var("c").prop("Name").eq(Expr::constant("Ann")),
        );
        let tree = CommandTree::Query { query };
        let mut generator = SqlGenerator::new(&GenericDialect);

        let first = generator.generate(&tree).unwrap();
        let second = generator.generate(&tree).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.parameters.len(), 1);
        assert_eq!(first.parameters[0].name, ":gp0");
    }

    #[test]
    fn test_result_columns_name_owning_input() {
        let customers = EntitySetRef::new("Customers", &["Id", "Name"]);
        let query = Expr::project(
            customers.scan(),
            "c",
            vec![
                NamedExpr::new("FullName", Expr::var("c").prop("Name")),
                NamedExpr::new("Answer", Expr::constant(42)),
            ],
        );
        let generated = SqlGenerator::new(&GenericDialect)
            .generate(&CommandTree::Query { query })
            .unwrap();

        assert_eq!(generated.columns.len(), 2);
        let full_name = &generated.columns[0];
        assert_eq!(full_name.name, "FullName");
        assert_eq!(full_name.table.as_deref(), Some("c"));
        assert_eq!(full_name.source_column.as_deref(), Some("Name"));

        let answer = &generated.columns[1];
        assert_eq!(answer.ordinal, 1);
        assert_eq!(answer.table, None);
        assert_eq!(answer.source_column, None);
    }
}
