//! Mutating pre-order traversal of fragment trees.

use super::{ColumnFragment, InputFragment, SqlFragment, TableFragment};
use crate::select::SelectStatement;

/// Hooks called while walking a fragment tree. Every hook defaults to a
/// no-op; a visitor overrides the ones it cares about.
pub trait FragmentVisitor {
    /// Called for every column, before its literal is visited.
    fn visit_column(&mut self, _column: &mut ColumnFragment) {}

    /// Called for every table.
    fn visit_table(&mut self, _table: &mut TableFragment) {}

    /// Called for every select, before its children are visited.
    fn visit_select(&mut self, _select: &mut SelectStatement) {}
}

impl ColumnFragment {
    /// Visits this column and its literal.
    pub fn accept(&mut self, visitor: &mut dyn FragmentVisitor) {
        visitor.visit_column(self);
        if let Some(literal) = &mut self.literal {
            literal.accept(visitor);
        }
    }
}

impl InputFragment {
    /// Visits this input and its children.
    pub fn accept(&mut self, visitor: &mut dyn FragmentVisitor) {
        match self {
            Self::Table(t) => visitor.visit_table(t),
            Self::Join(j) => {
                j.left.accept(visitor);
                j.right.accept(visitor);
                if let Some(condition) = &mut j.condition {
                    condition.accept(visitor);
                }
            }
            Self::Union(u) => {
                u.left.accept(visitor);
                u.right.accept(visitor);
            }
            Self::Select(s) => s.accept(visitor),
        }
    }
}

fn accept_all(fragments: &mut [SqlFragment], visitor: &mut dyn FragmentVisitor) {
    for fragment in fragments {
        fragment.accept(visitor);
    }
}

impl SqlFragment {
    /// Visits this fragment and its children.
    pub fn accept(&mut self, visitor: &mut dyn FragmentVisitor) {
        match self {
            Self::Literal(_) => {}
            Self::Column(c) => c.accept(visitor),
            Self::Binary(f) => {
                f.left.accept(visitor);
                f.right.accept(visitor);
            }
            Self::List(items) => accept_all(items, visitor),
            Self::In(f) => {
                f.argument.accept(visitor);
                accept_all(&mut f.list, visitor);
            }
            Self::Like(f) => {
                f.argument.accept(visitor);
                f.pattern.accept(visitor);
                if let Some(escape) = &mut f.escape {
                    escape.accept(visitor);
                }
            }
            Self::IsNull(f) => f.argument.accept(visitor),
            Self::Exists(f) => f.query.accept(visitor),
            Self::Case(f) => {
                accept_all(&mut f.when, visitor);
                accept_all(&mut f.then, visitor);
                if let Some(otherwise) = &mut f.otherwise {
                    otherwise.accept(visitor);
                }
            }
            Self::Function(f) => accept_all(&mut f.arguments, visitor),
            Self::Sort(f) => f.expr.accept(visitor),
            Self::Input(input) => input.accept(visitor),
            Self::Insert(s) => s.accept(visitor),
            Self::Update(s) => s.accept(visitor),
            Self::Delete(s) => s.accept(visitor),
        }
    }
}

impl SelectStatement {
    /// Visits this select and every fragment it owns.
    pub fn accept(&mut self, visitor: &mut dyn FragmentVisitor) {
        visitor.visit_select(self);
        for column in &mut self.columns {
            column.accept(visitor);
        }
        if let Some(from) = &mut self.from {
            from.accept(visitor);
        }
        if let Some(predicate) = &mut self.where_clause {
            predicate.accept(visitor);
        }
        accept_all(&mut self.group_by, visitor);
        accept_all(&mut self.order_by, visitor);
        if let Some(limit) = &mut self.limit {
            limit.accept(visitor);
        }
        if let Some(skip) = &mut self.skip {
            skip.accept(visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::BinaryFragment;

    #[derive(Default)]
    struct CollectTables(Vec<String>);

    impl FragmentVisitor for CollectTables {
        fn visit_column(&mut self, column: &mut ColumnFragment) {
            if let Some(table) = &column.table_name {
                self.0.push(table.clone());
            }
            column.table_name = Some(String::from("T"));
        }
    }

    #[test]
    fn test_visitor_reaches_nested_columns() {
        let mut fragment = SqlFragment::Binary(BinaryFragment::new(
            SqlFragment::Column(ColumnFragment::new(Some("a"), "x")),
            "=",
            SqlFragment::Column(ColumnFragment::new(Some("b"), "y")),
        ));
        let mut visitor = CollectTables::default();
        fragment.accept(&mut visitor);
        assert_eq!(visitor.0, vec!["a", "b"]);
        assert_eq!(
            fragment.to_sql(&crate::dialect::GenericDialect),
            "\"T\".\"x\" = \"T\".\"y\""
        );
    }
}
