//! Compile command trees to SQL from the command line.
//!
//! `sqlfrag` reads a [`CommandTree`] serialized as JSON (from a file or
//! standard input), lowers it with [`SqlGenerator`] for the selected dialect
//! and prints either the SQL text annotated with its parameters and column
//! map, or the whole [`GeneratedSql`] as JSON.
//!
//! # CLI Usage
//!
//! ```bash
//! # Generic dialect, SQL with comments
//! sqlfrag query.json
//!
//! # MySQL dialect, JSON output, no select fusion
//! sqlfrag --dialect mysql --format json --no-fuse query.json
//!
//! # Read the tree from standard input
//! cat query.json | sqlfrag -
//! ```

pub mod error;

use std::fmt::Write as _;
use std::io::Read as _;
use std::path::Path;

use clap::ValueEnum;
use sqlfrag_core::dialect::{Dialect, GenericDialect};
use sqlfrag_core::generator::{GeneratedSql, GeneratorOptions, SqlGenerator};
use sqlfrag_core::tree::CommandTree;
use sqlfrag_core::value::SqlValue;
use sqlfrag_mysql::MySqlDialect;
use tracing::debug;

pub use error::{CliError, Result};

/// Target dialect selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DialectName {
    /// ANSI double-quoted identifiers, `:name` parameters.
    #[default]
    Generic,
    /// Backtick identifiers, `@name` parameters.
    Mysql,
}

impl DialectName {
    /// Returns the dialect implementation.
    #[must_use]
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Generic => &GenericDialect,
            Self::Mysql => &MySqlDialect,
        }
    }
}

/// How generated SQL is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// SQL text followed by `--` comment lines for parameters and columns.
    #[default]
    Sql,
    /// The generated SQL, parameters and column map as pretty JSON.
    Json,
}

/// Reads a command tree from `path`, or from standard input when `path` is
/// `-`.
///
/// # Errors
///
/// Returns [`CliError::Read`] or [`CliError::Parse`].
pub fn load_tree(path: &Path) -> Result<CommandTree> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| CliError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        text
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?
    };
    debug!(path = %path.display(), bytes = text.len(), "read command tree");
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Lowers `tree` for `dialect`.
///
/// # Errors
///
/// Returns [`CliError::Generate`] when the tree cannot be lowered.
pub fn compile(tree: &CommandTree, dialect: DialectName, options: GeneratorOptions) -> Result<GeneratedSql> {
    let generated = SqlGenerator::new(dialect.dialect())
        .with_options(options)
        .generate(tree)?;
    Ok(generated)
}

/// Formats generation output for printing.
///
/// # Errors
///
/// Returns [`CliError::Output`] when JSON serialization fails.
pub fn render(generated: &GeneratedSql, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(generated).map_err(CliError::Output),
        OutputFormat::Sql => Ok(render_sql(generated)),
    }
}

fn render_sql(generated: &GeneratedSql) -> String {
    let mut out = generated.sql.replace("\r\n", "\n");
    out.push('\n');
    for parameter in &generated.parameters {
        let _ = writeln!(
            out,
            "-- {} = {} ({})",
            parameter.name,
            describe_value(&parameter.value),
            parameter.value.type_name()
        );
    }
    for column in &generated.columns {
        let source = match (&column.table, &column.source_column) {
            (Some(table), Some(source)) => format!("{table}.{source}"),
            (None, Some(source)) => source.clone(),
            _ => String::from("<computed>"),
        };
        let _ = writeln!(out, "-- column {}: {} <- {source}", column.ordinal, column.name);
    }
    out
}

fn describe_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::from("NULL"),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Text(s) => format!("{s:?}"),
        SqlValue::Blob(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2 + 3);
            hex.push_str("x'");
            for byte in bytes {
                let _ = write!(hex, "{byte:02x}");
            }
            hex.push('\'');
            hex
        }
        SqlValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfrag_core::schema::EntitySetRef;
    use sqlfrag_core::tree::{Expr, NamedExpr};

    fn tree() -> CommandTree {
        let customers = EntitySetRef::new("Customers", &["Id", "Name"]);
        CommandTree::Query {
            query: Expr::project(
                Expr::filter(
                    customers.scan(),
                    "c",
                    Expr::var("c").prop("Name").eq(Expr::constant("Ann")),
                ),
                "f",
                vec![
                    NamedExpr::new("Id", Expr::var("f").prop("Id")),
                    NamedExpr::new("Flag", Expr::constant(1)),
                ],
            ),
        }
    }

    #[test]
    fn test_render_sql_with_comments() {
        let generated = compile(&tree(), DialectName::Generic, GeneratorOptions::default()).unwrap();
        assert_eq!(
            render(&generated, OutputFormat::Sql).unwrap(),
            "SELECT \"c\".\"Id\", 1 AS \"Flag\"\n FROM \"Customers\" AS \"c\"\n WHERE \"c\".\"Name\" = :gp0\n\
             -- :gp0 = \"Ann\" (text)\n\
             -- column 0: Id <- c.Id\n\
             -- column 1: Flag <- <computed>\n"
        );
    }

    #[test]
    fn test_render_json() {
        let generated = compile(&tree(), DialectName::Mysql, GeneratorOptions::default()).unwrap();
        let json = render(&generated, OutputFormat::Json).unwrap();
        let parsed: GeneratedSql = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, generated);
        assert!(parsed.sql.contains("`c`.`Name` = @gp0"));
    }

    #[test]
    fn test_describe_value() {
        assert_eq!(describe_value(&SqlValue::Blob(vec![0xde, 0xad])), "x'dead'");
        assert_eq!(describe_value(&SqlValue::Null), "NULL");
    }
}
