//! FROM sources: tables, joins, unions and nested selects.

use tracing::debug;

use super::{SqlFragment, SqlWriter};
use crate::error::Result;
use crate::scope::GenContext;
use crate::select::SelectStatement;
use crate::tree::JoinKind;

/// A table (or a defining query standing in for one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFragment {
    /// Schema qualifier.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Alias.
    pub name: Option<String>,
    /// Declared properties, in declaration order.
    pub properties: Vec<String>,
    /// Store query written in place of the table.
    pub defining_query: Option<String>,
}

impl TableFragment {
    /// The name columns of this table are qualified with: its alias, or the
    /// table name when unaliased.
    #[must_use]
    pub fn scope_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.table)
    }

    /// Writes the table source without its alias.
    pub fn write_target(&self, w: &mut SqlWriter<'_>) {
        if let Some(query) = &self.defining_query {
            w.push('(');
            w.push_str(query);
            w.push(')');
            return;
        }
        if let Some(schema) = &self.schema {
            w.identifier(schema);
            w.push('.');
        }
        w.identifier(&self.table);
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        self.write_target(w);
        if let Some(name) = &self.name {
            w.push_str(" AS ");
            w.identifier(name);
        }
    }
}

/// `left <JOIN> right [ON condition]`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinFragment {
    /// Join type.
    pub kind: JoinKind,
    /// Left side.
    pub left: InputFragment,
    /// Right side.
    pub right: InputFragment,
    /// Join condition; absent for cross joins.
    pub condition: Option<SqlFragment>,
    /// Binding variable of the join.
    pub name: Option<String>,
}

impl JoinFragment {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        self.left.write_sql(w);
        w.push(' ');
        w.push_str(self.kind.as_str());
        w.push(' ');
        self.right.write_sql(w);
        if let Some(condition) = &self.condition {
            w.push_str(" ON ");
            condition.write_sql(w);
        }
    }
}

/// `left UNION ALL right`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionFragment {
    /// Left side.
    pub left: InputFragment,
    /// Right side.
    pub right: InputFragment,
    /// Alias.
    pub name: Option<String>,
    /// Written parenthesised and addressable by its alias.
    pub wrapped: bool,
}

impl UnionFragment {
    /// Marks the union as a derived table: its sides leave the scope and the
    /// union itself takes their place under its alias.
    pub fn wrap(&mut self, cx: &mut GenContext) {
        self.wrapped = true;
        cx.scope.remove_input(&self.left);
        cx.scope.remove_input(&self.right);
        if let Some(name) = self.name.clone() {
            cx.scope.add(&name, InputFragment::Union(Box::new(self.clone())));
        }
        debug!(name = ?self.name, "wrapped union");
    }

    /// Redirects a reference to a renamed column of the left side.
    pub fn has_different_name_for_column(&self, column: &mut super::ColumnFragment) -> bool {
        match &self.left {
            InputFragment::Select(select) => select.has_different_name_for_column(column),
            _ => false,
        }
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if self.wrapped {
            w.push('(');
        }
        self.left.write_sql(w);
        w.push_str(" UNION ALL ");
        self.right.write_sql(w);
        if self.wrapped {
            w.push(')');
            if let Some(name) = &self.name {
                w.push_str(" AS ");
                w.identifier(name);
            }
        }
    }
}

/// A fragment usable as a FROM source.
#[derive(Debug, Clone, PartialEq)]
pub enum InputFragment {
    /// Table.
    Table(TableFragment),
    /// Join of two inputs.
    Join(Box<JoinFragment>),
    /// UNION ALL of two selects.
    Union(Box<UnionFragment>),
    /// Nested select.
    Select(Box<SelectStatement>),
}

impl InputFragment {
    /// Returns the alias of the input.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Table(t) => t.name.as_deref(),
            Self::Join(j) => j.name.as_deref(),
            Self::Union(u) => u.name.as_deref(),
            Self::Select(s) => s.name.as_deref(),
        }
    }

    /// Sets the alias of the input.
    pub fn set_name(&mut self, name: &str) {
        let name = Some(String::from(name));
        match self {
            Self::Table(t) => t.name = name,
            Self::Join(j) => j.name = name,
            Self::Union(u) => u.name = name,
            Self::Select(s) => s.name = name,
        }
    }

    /// Whether column references may address this input by its alias.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        match self {
            Self::Table(_) => true,
            Self::Join(_) => false,
            Self::Union(u) => u.wrapped,
            Self::Select(s) => s.wrapped,
        }
    }

    /// Left child: a select's FROM, a join's or union's left side.
    #[must_use]
    pub fn left(&self) -> Option<&Self> {
        match self {
            Self::Table(_) => None,
            Self::Join(j) => Some(&j.left),
            Self::Union(u) => Some(&u.left),
            Self::Select(s) => s.from.as_ref(),
        }
    }

    /// Right child of a join or union.
    #[must_use]
    pub fn right(&self) -> Option<&Self> {
        match self {
            Self::Join(j) => Some(&j.right),
            Self::Union(u) => Some(&u.right),
            Self::Table(_) | Self::Select(_) => None,
        }
    }

    /// Returns a short name of the input kind.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Join(_) => "join",
            Self::Union(_) => "union",
            Self::Select(_) => "select",
        }
    }

    /// Wraps a select or union so it can be used as a derived table.
    ///
    /// # Errors
    ///
    /// Propagates default-column expansion failures.
    pub fn wrap(&mut self, cx: &mut GenContext) -> Result<()> {
        match self {
            Self::Select(s) => s.wrap(cx),
            Self::Union(u) => {
                u.wrap(cx);
                Ok(())
            }
            Self::Table(_) | Self::Join(_) => Ok(()),
        }
    }

    /// Appends this input's SQL text.
    pub fn write_sql(&self, w: &mut SqlWriter<'_>) {
        match self {
            Self::Table(t) => t.write_sql(w),
            Self::Join(j) => j.write_sql(w),
            Self::Union(u) => u.write_sql(w),
            Self::Select(s) => s.write_sql(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    fn table(table: &str, name: &str) -> InputFragment {
        InputFragment::Table(TableFragment {
            schema: None,
            table: String::from(table),
            name: Some(String::from(name)),
            properties: vec![String::from("Id")],
            defining_query: None,
        })
    }

    fn render(input: &InputFragment) -> String {
        let mut w = SqlWriter::new(&GenericDialect);
        input.write_sql(&mut w);
        w.finish()
    }

    #[test]
    fn test_table_with_schema_and_alias() {
        let input = InputFragment::Table(TableFragment {
            schema: Some(String::from("shop")),
            table: String::from("Customers"),
            name: Some(String::from("Extent1")),
            properties: vec![],
            defining_query: None,
        });
        assert_eq!(render(&input), "\"shop\".\"Customers\" AS \"Extent1\"");
    }

    #[test]
    fn test_defining_query() {
        let input = InputFragment::Table(TableFragment {
            schema: None,
            table: String::from("ActiveCustomers"),
            name: Some(String::from("Extent1")),
            properties: vec![],
            defining_query: Some(String::from("SELECT * FROM customers WHERE active = 1")),
        });
        assert_eq!(
            render(&input),
            "(SELECT * FROM customers WHERE active = 1) AS \"Extent1\""
        );
    }

    #[test]
    fn test_join() {
        let join = InputFragment::Join(Box::new(JoinFragment {
            kind: JoinKind::LeftOuter,
            left: table("Customers", "Extent1"),
            right: table("Orders", "Extent2"),
            condition: Some(SqlFragment::literal("1 = 1")),
            name: Some(String::from("Join1")),
        }));
        assert_eq!(
            render(&join),
            "\"Customers\" AS \"Extent1\" LEFT OUTER JOIN \"Orders\" AS \"Extent2\" ON 1 = 1"
        );
        assert!(!join.is_scoped());
        assert_eq!(join.left().and_then(InputFragment::name), Some("Extent1"));
        assert_eq!(join.right().and_then(InputFragment::name), Some("Extent2"));
    }
}
