//! Column references.

use super::{SqlFragment, SqlWriter};

/// One column of a select list, or a column reference inside an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFragment {
    /// Alias of the input owning the column.
    pub table_name: Option<String>,
    /// Column name at the source.
    pub column_name: Option<String>,
    /// Output name when it differs from the source name.
    pub column_alias: Option<String>,
    /// Expression projected in place of a source column.
    pub literal: Option<Box<SqlFragment>>,
    /// Property chain the column was reached through, outermost alias first
    /// and the column name last.
    pub properties: Vec<String>,
}

impl ColumnFragment {
    /// Creates a source column reference.
    #[must_use]
    pub fn new(table_name: Option<&str>, column_name: &str) -> Self {
        Self {
            table_name: table_name.map(String::from),
            column_name: Some(String::from(column_name)),
            ..Self::default()
        }
    }

    /// Creates a column projecting `literal` under `alias`.
    #[must_use]
    pub fn from_literal(literal: SqlFragment, alias: impl Into<String>) -> Self {
        Self {
            literal: Some(Box::new(literal)),
            column_alias: Some(alias.into()),
            ..Self::default()
        }
    }

    /// Prepends an input alias to the property chain.
    pub fn push_input(&mut self, name: &str) {
        self.properties.insert(0, String::from(name));
    }

    /// Name this column has in the result set.
    #[must_use]
    pub fn output_name(&self) -> Option<&str> {
        self.column_alias.as_deref().or(self.column_name.as_deref())
    }

    /// Name the column is read under at its source.
    #[must_use]
    pub fn actual_column_name(&self) -> Option<&str> {
        self.column_name.as_deref().or(self.column_alias.as_deref())
    }

    /// Whether the column is written with an `AS` alias in a select list.
    #[must_use]
    pub fn has_distinct_alias(&self) -> bool {
        match (&self.column_alias, &self.column_name) {
            (Some(alias), Some(name)) => alias != name,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Whether this select-list column is the one a reference through
    /// `reference` (the referencing chain below the select's alias) reads.
    ///
    /// Chains match when one is a suffix of the other. A literal column has
    /// no chain and matches on its output name.
    #[must_use]
    pub fn matches_reference(&self, reference: &[String]) -> bool {
        if reference.is_empty() {
            return false;
        }
        if self.properties.is_empty() {
            return reference.len() == 1 && self.output_name() == Some(reference[0].as_str());
        }
        self.properties.ends_with(reference) || reference.ends_with(&self.properties)
    }

    /// Writes the column as an expression: `table.column` or the literal.
    pub fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if let Some(literal) = &self.literal {
            literal.write_sql(w);
            return;
        }
        if let Some(table) = &self.table_name {
            w.identifier(table);
            w.push('.');
        }
        if let Some(name) = &self.column_name {
            w.identifier(name);
        }
    }

    /// Writes the column as a select-list item, with `AS alias` when the
    /// alias differs from the source name.
    pub fn write_select_item(&self, w: &mut SqlWriter<'_>) {
        self.write_sql(w);
        if self.has_distinct_alias() {
            if let Some(alias) = &self.column_alias {
                w.push_str(" AS ");
                w.identifier(alias);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    fn render(column: &ColumnFragment) -> String {
        let mut w = SqlWriter::new(&GenericDialect);
        column.write_select_item(&mut w);
        w.finish()
    }

    #[test]
    fn test_alias_written_only_when_different() {
        let mut column = ColumnFragment::new(Some("Extent1"), "Name");
        assert_eq!(render(&column), "\"Extent1\".\"Name\"");

        column.column_alias = Some(String::from("Name"));
        assert_eq!(render(&column), "\"Extent1\".\"Name\"");

        column.column_alias = Some(String::from("FullName"));
        assert_eq!(render(&column), "\"Extent1\".\"Name\" AS \"FullName\"");
    }

    #[test]
    fn test_literal_column() {
        let column = ColumnFragment::from_literal(SqlFragment::literal("COUNT(*)"), "Total");
        assert_eq!(render(&column), "COUNT(*) AS \"Total\"");
        assert_eq!(column.output_name(), Some("Total"));
        assert!(column.matches_reference(&[String::from("Total")]));
    }

    #[test]
    fn test_matches_reference_by_suffix() {
        let mut column = ColumnFragment::new(Some("Extent2"), "Id");
        column.properties = vec![String::from("Extent2"), String::from("Id")];

        let through_join = [String::from("Join1"), String::from("Extent2"), String::from("Id")];
        assert!(column.matches_reference(&through_join));
        assert!(column.matches_reference(&[String::from("Id")]));
        assert!(!column.matches_reference(&[String::from("Extent1"), String::from("Id")]));
    }
}
