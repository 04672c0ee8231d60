//! SQL fragments: the in-memory tree the generator builds and then writes.
//!
//! Every fragment kind knows how to write itself into a [`SqlWriter`] and how
//! to hand itself and its children to a [`FragmentVisitor`]. A fragment tree
//! is owned by the statement at its root.

mod column;
mod dml;
mod input;
mod visitor;

pub use column::ColumnFragment;
pub use dml::{DeleteStatement, InsertStatement, UpdateStatement};
pub use input::{InputFragment, JoinFragment, TableFragment, UnionFragment};
pub use visitor::FragmentVisitor;

use crate::dialect::Dialect;
use crate::error::{GenerateError, Result};

/// Buffer SQL text is written into, paired with the dialect spelling it.
pub struct SqlWriter<'d> {
    sql: String,
    dialect: &'d dyn Dialect,
}

impl<'d> SqlWriter<'d> {
    /// Creates an empty writer.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            dialect,
        }
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Appends raw text.
    pub fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Appends a raw character.
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Appends a quoted identifier.
    pub fn identifier(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Consumes the writer and returns the SQL text.
    #[must_use]
    pub fn finish(self) -> String {
        self.sql
    }
}

/// Writes `items` separated by `, `.
pub(crate) fn write_list<'a>(w: &mut SqlWriter<'_>, items: impl IntoIterator<Item = &'a SqlFragment>) {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            w.push_str(", ");
        }
        item.write_sql(w);
    }
}

/// Binary operator application.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryFragment {
    /// Left operand.
    pub left: Box<SqlFragment>,
    /// Operator text (`=`, `AND`, `+`, ...).
    pub operator: &'static str,
    /// Right operand.
    pub right: Box<SqlFragment>,
    /// Parenthesise the left operand.
    pub wrap_left: bool,
    /// Parenthesise the right operand.
    pub wrap_right: bool,
    /// Negated (`!=` for equality, `NOT (...)` otherwise).
    pub negated: bool,
}

impl BinaryFragment {
    /// Creates an unwrapped, non-negated binary fragment.
    #[must_use]
    pub fn new(left: SqlFragment, operator: &'static str, right: SqlFragment) -> Self {
        Self {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            wrap_left: false,
            wrap_right: false,
            negated: false,
        }
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        let negated_eq = self.negated && self.operator == "=";
        let negated_other = self.negated && !negated_eq;
        if negated_other {
            w.push_str("NOT (");
        }
        write_operand(w, &self.left, self.wrap_left);
        if negated_eq {
            w.push_str(" != ");
        } else {
            w.push(' ');
            w.push_str(self.operator);
            w.push(' ');
        }
        write_operand(w, &self.right, self.wrap_right);
        if negated_other {
            w.push(')');
        }
    }
}

fn write_operand(w: &mut SqlWriter<'_>, operand: &SqlFragment, wrap: bool) {
    if wrap {
        w.push('(');
    }
    operand.write_sql(w);
    if wrap {
        w.push(')');
    }
}

/// `argument [NOT] IN (list)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InFragment {
    /// Tested value.
    pub argument: Box<SqlFragment>,
    /// Candidate values.
    pub list: Vec<SqlFragment>,
    /// NOT IN.
    pub negated: bool,
}

/// `argument [NOT] LIKE pattern [ESCAPE escape]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LikeFragment {
    /// Matched value.
    pub argument: Box<SqlFragment>,
    /// Pattern.
    pub pattern: Box<SqlFragment>,
    /// Escape character expression.
    pub escape: Option<Box<SqlFragment>>,
    /// NOT LIKE.
    pub negated: bool,
}

/// `argument IS [NOT] NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct IsNullFragment {
    /// Tested value.
    pub argument: Box<SqlFragment>,
    /// IS NOT NULL.
    pub negated: bool,
}

/// `[NOT] EXISTS(subquery)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsFragment {
    /// Subquery.
    pub query: Box<SqlFragment>,
    /// NOT EXISTS.
    pub negated: bool,
}

/// Searched CASE.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFragment {
    /// WHEN conditions.
    pub when: Vec<SqlFragment>,
    /// THEN results, one per condition.
    pub then: Vec<SqlFragment>,
    /// ELSE result.
    pub otherwise: Option<Box<SqlFragment>>,
}

/// Function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionFragment {
    /// Store function name, written verbatim.
    pub name: String,
    /// Arguments.
    pub arguments: Vec<SqlFragment>,
    /// `DISTINCT` before the arguments.
    pub distinct: bool,
}

/// `expr ASC|DESC`.
#[derive(Debug, Clone, PartialEq)]
pub struct SortFragment {
    /// Sort key.
    pub expr: Box<SqlFragment>,
    /// Ascending.
    pub ascending: bool,
}

impl SortFragment {
    /// Creates a sort key.
    #[must_use]
    pub fn new(expr: SqlFragment, ascending: bool) -> Self {
        Self {
            expr: Box::new(expr),
            ascending,
        }
    }
}

/// A node of the fragment tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlFragment {
    /// Raw SQL text (literals, parameter placeholders, keywords).
    Literal(String),
    /// Column reference.
    Column(ColumnFragment),
    /// Binary operator.
    Binary(BinaryFragment),
    /// Concatenation of fragments, written back to back.
    List(Vec<SqlFragment>),
    /// IN list.
    In(InFragment),
    /// LIKE.
    Like(LikeFragment),
    /// IS NULL.
    IsNull(IsNullFragment),
    /// EXISTS.
    Exists(ExistsFragment),
    /// CASE.
    Case(CaseFragment),
    /// Function call.
    Function(FunctionFragment),
    /// ORDER BY key.
    Sort(SortFragment),
    /// A FROM source used in expression position (subquery).
    Input(InputFragment),
    /// INSERT statement.
    Insert(Box<InsertStatement>),
    /// UPDATE statement.
    Update(Box<UpdateStatement>),
    /// DELETE statement.
    Delete(Box<DeleteStatement>),
}

impl SqlFragment {
    /// Creates a literal fragment.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Returns a short name of the fragment kind.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Column(_) => "column",
            Self::Binary(_) => "binary",
            Self::List(_) => "list",
            Self::In(_) => "in",
            Self::Like(_) => "like",
            Self::IsNull(_) => "is-null",
            Self::Exists(_) => "exists",
            Self::Case(_) => "case",
            Self::Function(_) => "function",
            Self::Sort(_) => "sort",
            Self::Input(input) => input.kind_name(),
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }

    /// Flips the negation of a negatable fragment.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NotNegatable`] for fragments that have no
    /// negated form.
    pub fn negate(&mut self) -> Result<()> {
        match self {
            Self::Binary(f) => f.negated = !f.negated,
            Self::In(f) => f.negated = !f.negated,
            Self::Like(f) => f.negated = !f.negated,
            Self::IsNull(f) => f.negated = !f.negated,
            Self::Exists(f) => f.negated = !f.negated,
            other => return Err(GenerateError::NotNegatable(other.kind_name())),
        }
        Ok(())
    }

    /// Appends this fragment's SQL text.
    pub fn write_sql(&self, w: &mut SqlWriter<'_>) {
        match self {
            Self::Literal(text) => w.push_str(text),
            Self::Column(column) => column.write_sql(w),
            Self::Binary(f) => f.write_sql(w),
            Self::List(items) => {
                for item in items {
                    item.write_sql(w);
                }
            }
            Self::In(f) => {
                f.argument.write_sql(w);
                w.push_str(if f.negated { " NOT IN (" } else { " IN (" });
                write_list(w, &f.list);
                w.push(')');
            }
            Self::Like(f) => {
                f.argument.write_sql(w);
                w.push_str(if f.negated { " NOT LIKE " } else { " LIKE " });
                f.pattern.write_sql(w);
                if let Some(escape) = &f.escape {
                    w.push_str(" ESCAPE ");
                    escape.write_sql(w);
                }
            }
            Self::IsNull(f) => {
                f.argument.write_sql(w);
                w.push_str(if f.negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::Exists(f) => {
                w.push_str(if f.negated { "NOT EXISTS(" } else { "EXISTS(" });
                f.query.write_sql(w);
                w.push(')');
            }
            Self::Case(f) => {
                debug_assert_eq!(f.when.len(), f.then.len());
                w.push_str("CASE");
                for (when, then) in f.when.iter().zip(&f.then) {
                    w.push_str(" WHEN ");
                    when.write_sql(w);
                    w.push_str(" THEN ");
                    then.write_sql(w);
                }
                if let Some(otherwise) = &f.otherwise {
                    w.push_str(" ELSE ");
                    otherwise.write_sql(w);
                }
                w.push_str(" END");
            }
            Self::Function(f) => {
                w.push_str(&f.name);
                w.push('(');
                if f.distinct {
                    w.push_str("DISTINCT ");
                }
                write_list(w, &f.arguments);
                w.push(')');
            }
            Self::Sort(f) => {
                f.expr.write_sql(w);
                w.push_str(if f.ascending { " ASC" } else { " DESC" });
            }
            Self::Input(input) => input.write_sql(w),
            Self::Insert(statement) => statement.write_sql(w),
            Self::Update(statement) => statement.write_sql(w),
            Self::Delete(statement) => statement.write_sql(w),
        }
    }

    /// Renders this fragment into a fresh string.
    #[must_use]
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        let mut w = SqlWriter::new(dialect);
        self.write_sql(&mut w);
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    fn col(table: &str, name: &str) -> SqlFragment {
        SqlFragment::Column(ColumnFragment::new(Some(table), name))
    }

    #[test]
    fn test_binary_negated_equality() {
        let mut f = SqlFragment::Binary(BinaryFragment::new(
            col("t", "a"),
            "=",
            SqlFragment::literal("1"),
        ));
        f.negate().unwrap();
        assert_eq!(f.to_sql(&GenericDialect), "\"t\".\"a\" != 1");
    }

    #[test]
    fn test_binary_negated_other_operator() {
        let mut f = SqlFragment::Binary(BinaryFragment::new(
            col("t", "a"),
            ">",
            SqlFragment::literal("1"),
        ));
        f.negate().unwrap();
        assert_eq!(f.to_sql(&GenericDialect), "NOT (\"t\".\"a\" > 1)");
    }

    #[test]
    fn test_binary_wraps_operands() {
        let inner = SqlFragment::Binary(BinaryFragment::new(
            SqlFragment::literal("1"),
            "+",
            SqlFragment::literal("2"),
        ));
        let mut outer = BinaryFragment::new(inner, "*", SqlFragment::literal("3"));
        outer.wrap_left = true;
        assert_eq!(SqlFragment::Binary(outer).to_sql(&GenericDialect), "(1 + 2) * 3");
    }

    #[test]
    fn test_in_and_is_null() {
        let f = SqlFragment::In(InFragment {
            argument: Box::new(col("t", "a")),
            list: vec![SqlFragment::literal("1"), SqlFragment::literal("2")],
            negated: true,
        });
        assert_eq!(f.to_sql(&GenericDialect), "\"t\".\"a\" NOT IN (1, 2)");

        let f = SqlFragment::IsNull(IsNullFragment {
            argument: Box::new(col("t", "a")),
            negated: false,
        });
        assert_eq!(f.to_sql(&GenericDialect), "\"t\".\"a\" IS NULL");
    }

    #[test]
    fn test_case_and_function() {
        let f = SqlFragment::Case(CaseFragment {
            when: vec![SqlFragment::literal("1 = 1")],
            then: vec![SqlFragment::literal("'a'")],
            otherwise: Some(Box::new(SqlFragment::literal("'b'"))),
        });
        assert_eq!(f.to_sql(&GenericDialect), "CASE WHEN 1 = 1 THEN 'a' ELSE 'b' END");

        let f = SqlFragment::Function(FunctionFragment {
            name: String::from("COUNT"),
            arguments: vec![col("t", "a")],
            distinct: true,
        });
        assert_eq!(f.to_sql(&GenericDialect), "COUNT(DISTINCT \"t\".\"a\")");
    }

    #[test]
    fn test_negate_rejects_literal() {
        let mut f = SqlFragment::literal("1");
        assert_eq!(f.negate(), Err(GenerateError::NotNegatable("literal")));
    }
}
