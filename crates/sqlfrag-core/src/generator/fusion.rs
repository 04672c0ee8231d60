//! Select fusion: `SELECT FROM (SELECT FROM table)` collapsed into one
//! statement.

use std::collections::HashMap;

use tracing::debug;

use crate::fragment::{
    BinaryFragment, ColumnFragment, FragmentVisitor, InputFragment, SqlFragment, TableFragment,
};
use crate::select::SelectStatement;

/// Fuses `input` with the select it reads from when the two are compatible;
/// returns `input` unchanged otherwise.
pub(super) fn try_fusing_select(input: InputFragment) -> InputFragment {
    let InputFragment::Select(mut outer) = input else {
        return input;
    };
    if can_fuse_select(&outer) {
        if let Some(InputFragment::Select(mut inner)) = outer.from.take() {
            if let Some(InputFragment::Table(table)) = inner.from.take() {
                fuse_select_with_inner_select(&mut outer, *inner, table);
            }
        }
    }
    InputFragment::Select(outer)
}

fn can_fuse_select(select: &SelectStatement) -> bool {
    if !select.columns.is_empty() {
        return false;
    }
    let Some(InputFragment::Select(inner)) = &select.from else {
        return false;
    };
    if inner.name.is_none() || !matches!(inner.from, Some(InputFragment::Table(_))) {
        return false;
    }
    let outer_has_clauses = select.where_clause.is_some()
        || !select.group_by.is_empty()
        || !select.order_by.is_empty()
        || select.limit.is_some()
        || select.skip.is_some();
    // Rows of a limited or grouped inner select may not be filtered, sorted
    // or grouped again in the same statement.
    let inner_is_final =
        inner.limit.is_some() || inner.skip.is_some() || !inner.group_by.is_empty();
    if inner_is_final && outer_has_clauses {
        return false;
    }
    !(select.limit.is_some() && inner.limit.is_some())
        && !(!select.group_by.is_empty() && !inner.group_by.is_empty())
        && !(!select.order_by.is_empty() && !inner.order_by.is_empty())
        && !(select.skip.is_some() && inner.skip.is_some())
        && select.distinct == inner.distinct
        && inner.columns.iter().all(|c| c.literal.is_none())
}

fn fuse_select_with_inner_select(
    outer: &mut SelectStatement,
    inner: SelectStatement,
    mut table: TableFragment,
) {
    let old_name = String::from(table.scope_name());
    let new_name = inner.name.clone().unwrap_or_else(|| old_name.clone());
    table.name = Some(new_name.clone());

    let mut renamer = ReplaceTableName {
        old_name,
        new_name: new_name.clone(),
        aliases: inner
            .columns
            .iter()
            .filter_map(|c| Some((c.column_alias.clone()?, c.column_name.clone()?)))
            .collect(),
    };

    outer.where_clause = match (outer.where_clause.take(), inner.where_clause) {
        (Some(outer_where), Some(inner_where)) => {
            let mut both = BinaryFragment::new(outer_where, "AND", inner_where);
            both.wrap_left = true;
            both.wrap_right = true;
            Some(SqlFragment::Binary(both))
        }
        (outer_where, inner_where) => outer_where.or(inner_where),
    };
    if outer.limit.is_none() {
        outer.limit = inner.limit;
    }
    if outer.group_by.is_empty() {
        outer.group_by = inner.group_by;
    }
    outer.order_by.extend(inner.order_by);
    if outer.skip.is_none() {
        outer.skip = inner.skip;
    }

    for fragment in outer
        .where_clause
        .iter_mut()
        .chain(outer.limit.iter_mut())
        .chain(outer.group_by.iter_mut())
        .chain(outer.order_by.iter_mut())
        .chain(outer.skip.iter_mut())
    {
        fragment.accept(&mut renamer);
    }

    outer.inherited_columns = inner
        .columns
        .into_iter()
        .map(|mut column| {
            column.accept(&mut renamer);
            if let Some(output) = column.output_name().map(String::from) {
                column.properties = vec![new_name.clone(), output];
            }
            column
        })
        .collect();
    outer.from = Some(InputFragment::Table(table));
    debug!(
        table = %renamer.old_name,
        alias = %renamer.new_name,
        "fused select with inner select"
    );
}

/// Moves column references from the inner table alias to the fused alias,
/// and from inner column aliases back to the real column names.
struct ReplaceTableName {
    old_name: String,
    new_name: String,
    aliases: HashMap<String, String>,
}

impl FragmentVisitor for ReplaceTableName {
    fn visit_column(&mut self, column: &mut ColumnFragment) {
        let Some(table) = &column.table_name else {
            return;
        };
        if *table == self.old_name {
            column.table_name = Some(self.new_name.clone());
        } else if *table == self.new_name {
            if let Some(real) = column.column_name.as_ref().and_then(|n| self.aliases.get(n)) {
                column.column_name = Some(real.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableFragment {
        TableFragment {
            schema: None,
            table: String::from("Customers"),
            name: Some(String::from("Extent1")),
            properties: vec![String::from("Id"), String::from("Name")],
            defining_query: None,
        }
    }

    fn inner() -> SelectStatement {
        let mut inner = SelectStatement::from_input(InputFragment::Table(table()));
        inner.name = Some(String::from("Project1"));
        let mut column = ColumnFragment::new(Some("Extent1"), "Name");
        column.column_alias = Some(String::from("FullName"));
        inner.columns.push(column);
        inner
    }

    fn outer_over(inner: SelectStatement) -> SelectStatement {
        SelectStatement::from_input(InputFragment::Select(Box::new(inner)))
    }

    #[test]
    fn test_fusion_renames_table_and_aliases() {
        let mut outer = outer_over(inner());
        outer.where_clause = Some(SqlFragment::Column(ColumnFragment::new(
            Some("Project1"),
            "FullName",
        )));

        let InputFragment::Select(fused) = try_fusing_select(InputFragment::Select(Box::new(outer)))
        else {
            panic!("expected a select");
        };
        let Some(InputFragment::Table(table)) = &fused.from else {
            panic!("expected the inner table");
        };
        assert_eq!(table.name.as_deref(), Some("Project1"));
        let Some(SqlFragment::Column(column)) = &fused.where_clause else {
            panic!("expected a column predicate");
        };
        assert_eq!(column.column_name.as_deref(), Some("Name"));
        assert_eq!(fused.inherited_columns.len(), 1);
        assert_eq!(fused.inherited_columns[0].table_name.as_deref(), Some("Project1"));
    }

    #[test]
    fn test_limited_inner_select_is_not_fused_with_filter() {
        let mut limited = inner();
        limited.limit = Some(SqlFragment::literal("10"));
        let mut outer = outer_over(limited);
        outer.where_clause = Some(SqlFragment::literal("1 = 1"));
        assert!(!can_fuse_select(&outer));

        let mut limited = inner();
        limited.limit = Some(SqlFragment::literal("10"));
        assert!(can_fuse_select(&outer_over(limited)));
    }

    #[test]
    fn test_distinct_mismatch_is_not_fused() {
        let mut outer = outer_over(inner());
        outer.distinct = true;
        assert!(!can_fuse_select(&outer));
    }

    #[test]
    fn test_literal_inner_column_is_not_fused() {
        let mut with_literal = inner();
        with_literal
            .columns
            .push(ColumnFragment::from_literal(SqlFragment::literal("1"), "One"));
        assert!(!can_fuse_select(&outer_over(with_literal)));
    }
}
