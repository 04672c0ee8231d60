//! Relational operators: scans, filters, projections, joins, unions and
//! friends.

use tracing::{debug, trace};

use super::{fusion, SqlGenerator};
use crate::error::{GenerateError, Result};
use crate::fragment::{
    ColumnFragment, InputFragment, JoinFragment, SortFragment, SqlFragment, TableFragment,
    UnionFragment,
};
use crate::schema::EntitySetRef;
use crate::scope::OpType;
use crate::select::SelectStatement;
use crate::tree::{Aggregate, Binding, Expr, ExprKind, GroupBinding, JoinKind, NamedExpr, SortKey};

impl SqlGenerator<'_> {
    /// Lowers the root of a query to a finished select.
    pub(super) fn generate_query(&mut self, query: &Expr) -> Result<SelectStatement> {
        let mut input = self.visit_relational(query)?;
        if self.options.fuse_selects {
            input = fusion::try_fusing_select(input);
        }
        let mut select = self.select_over(input)?;
        if select.columns.is_empty() {
            select.add_default_columns(&mut self.cx)?;
        }
        Ok(select)
    }

    /// Lowers a collection-valued expression to an input fragment.
    pub(super) fn visit_relational(&mut self, expr: &Expr) -> Result<InputFragment> {
        trace!(kind = ?expr.kind(), "visit relational");
        let select = match expr {
            Expr::Scan { target } => return Ok(InputFragment::Table(table_fragment(target))),
            Expr::Filter { input, predicate } => self.visit_filter(input, predicate)?,
            Expr::Project { input, projection } => self.visit_project(input, projection)?,
            Expr::Sort { input, keys } => self.visit_sort(input, keys)?,
            Expr::Skip { input, keys, count } => self.visit_skip(input, keys, count)?,
            Expr::Limit { argument, limit } => self.visit_limit(argument, limit)?,
            Expr::Distinct { argument } => self.visit_distinct(argument)?,
            Expr::GroupBy {
                input,
                keys,
                aggregates,
            } => self.visit_group_by(input, keys, aggregates)?,
            Expr::Join {
                join_kind,
                left,
                right,
                condition,
            } => return self.visit_join(*join_kind, left, right, condition),
            Expr::CrossJoin { inputs } => return self.visit_cross_join(inputs),
            Expr::UnionAll { left, right } => return self.visit_union_all(left, right),
            Expr::Intersect { .. }
            | Expr::Except { .. }
            | Expr::Element { .. }
            | Expr::OfType { .. }
            | Expr::Navigation { .. } => {
                return Err(GenerateError::Unsupported(format!("{:?}", expr.kind())));
            }
            other => {
                return Err(GenerateError::MalformedTree(format!(
                    "{:?} is not a collection expression",
                    other.kind()
                )));
            }
        };
        Ok(InputFragment::Select(Box::new(select)))
    }

    /// Lowers `expr`, names it `name`, fuses it and makes it visible.
    pub(super) fn visit_input(&mut self, expr: &Expr, name: &str) -> Result<InputFragment> {
        let mut input = self.visit_relational(expr)?;
        input.set_name(name);
        if self.options.fuse_selects {
            input = fusion::try_fusing_select(input);
        }
        self.cx.scope.add(name, input.clone());
        Ok(input)
    }

    /// Lowers a bound input to a select that further clauses can be folded
    /// into.
    fn ensure_select(&mut self, binding: &Binding) -> Result<SelectStatement> {
        let input = self.visit_input(&binding.expr, &binding.variable)?;
        self.select_over(input)
    }

    /// Returns `input` itself when it is a select, otherwise a select reading
    /// from it. Unions are wrapped first.
    pub(super) fn select_over(&mut self, input: InputFragment) -> Result<SelectStatement> {
        match input {
            InputFragment::Select(select) => Ok(*select),
            InputFragment::Union(mut union) => {
                if union.name.is_none() {
                    union.name = Some(self.fresh_alias("UnionAll"));
                }
                if !union.wrapped {
                    union.wrap(&mut self.cx);
                }
                Ok(SelectStatement::from_input(InputFragment::Union(union)))
            }
            other => Ok(SelectStatement::from_input(other)),
        }
    }

    /// Returns `select` when `kind` folds into it, otherwise wraps it and
    /// returns a new select reading from it.
    fn wrap_if_not_compatible(
        &mut self,
        select: SelectStatement,
        kind: ExprKind,
    ) -> Result<SelectStatement> {
        if select.is_compatible(kind)? {
            return Ok(select);
        }
        self.wrap_select(select, kind)
    }

    fn wrap_select(&mut self, mut select: SelectStatement, kind: ExprKind) -> Result<SelectStatement> {
        if select.name.is_none() {
            select.name = Some(self.fresh_alias(&format!("{kind:?}")));
        }
        debug!(operator = ?kind, name = ?select.name, "wrapping incompatible select");
        select.wrap(&mut self.cx)?;
        Ok(SelectStatement::from_input(InputFragment::Select(Box::new(select))))
    }

    fn visit_filter(&mut self, input: &Binding, predicate: &Expr) -> Result<SelectStatement> {
        let select = self.ensure_select(input)?;
        let mut select = self.wrap_if_not_compatible(select, ExprKind::Filter)?;
        select.where_clause = Some(self.visit_scalar(predicate)?);
        Ok(select)
    }

    fn visit_project(&mut self, input: &Binding, projection: &[NamedExpr]) -> Result<SelectStatement> {
        let select = self.ensure_select(input)?;
        let mut select = self.wrap_if_not_compatible(select, ExprKind::Project)?;
        for named in projection {
            let fragment = self.visit_scalar(&named.expr)?;
            let column = projected_column(fragment, &named.name);
            select.add_column(column, &self.cx)?;
        }
        Ok(select)
    }

    fn visit_sort(&mut self, input: &Binding, keys: &[SortKey]) -> Result<SelectStatement> {
        let select = self.ensure_select(input)?;
        let mut select = self.wrap_if_not_compatible(select, ExprKind::Sort)?;
        self.add_sort_keys(&mut select, keys)?;
        Ok(select)
    }

    fn visit_skip(&mut self, input: &Binding, keys: &[SortKey], count: &Expr) -> Result<SelectStatement> {
        let select = self.ensure_select(input)?;
        let select = self.wrap_if_not_compatible(select, ExprKind::Sort)?;
        let mut select = self.wrap_if_not_compatible(select, ExprKind::Skip)?;
        self.add_sort_keys(&mut select, keys)?;
        select.skip = Some(self.visit_scalar(count)?);
        Ok(select)
    }

    fn add_sort_keys(&mut self, select: &mut SelectStatement, keys: &[SortKey]) -> Result<()> {
        for key in keys {
            let expr = self.visit_scalar(&key.expr)?;
            select.add_order_by(SqlFragment::Sort(SortFragment::new(expr, key.ascending)));
        }
        Ok(())
    }

    fn visit_limit(&mut self, argument: &Expr, limit: &Expr) -> Result<SelectStatement> {
        let input = self.visit_relational(argument)?;
        let select = self.select_over(input)?;
        let mut select = self.wrap_if_not_compatible(select, ExprKind::Limit)?;
        select.limit = Some(self.visit_scalar(limit)?);
        Ok(select)
    }

    fn visit_distinct(&mut self, argument: &Expr) -> Result<SelectStatement> {
        let input = self.visit_relational(argument)?;
        let mut select = self.select_over(input)?;
        // DISTINCT is applied before LIMIT in SQL; a limited input keeps its
        // own statement.
        if select.limit.is_some() || select.skip.is_some() {
            select = self.wrap_select(select, ExprKind::Distinct)?;
        }
        if select.columns.is_empty() {
            select.add_default_columns(&mut self.cx)?;
        }
        select.distinct = true;
        Ok(select)
    }

    fn visit_group_by(
        &mut self,
        input: &GroupBinding,
        keys: &[NamedExpr],
        aggregates: &[Aggregate],
    ) -> Result<SelectStatement> {
        let bound = self.visit_input(&input.expr, &input.variable)?;
        let select = self.select_over(bound)?;
        let mut select = self.wrap_if_not_compatible(select, ExprKind::GroupBy)?;
        // Aggregate arguments address the same rows through the group variable.
        if let Some(rows) = self.cx.scope.get_fragment(&input.variable).cloned() {
            self.cx.scope.add(&input.group_variable, rows);
        }

        for key in keys {
            let fragment = self.visit_scalar(&key.expr)?;
            select.add_group_by(fragment.clone());
            select.add_column(projected_column(fragment, &key.name), &self.cx)?;
        }
        for aggregate in aggregates {
            let fragment = self.visit_aggregate(aggregate)?;
            select.add_column(projected_column(fragment, &aggregate.name), &self.cx)?;
        }
        Ok(select)
    }

    fn visit_join(
        &mut self,
        kind: JoinKind,
        left: &Binding,
        right: &Binding,
        condition: &Expr,
    ) -> Result<InputFragment> {
        self.with_op(OpType::Join, |g| {
            let left = g.visit_join_input(left, false)?;
            let right = g.visit_join_input(right, true)?;
            let condition = match kind {
                JoinKind::Cross => None,
                _ => Some(g.visit_scalar(condition)?),
            };
            Ok(InputFragment::Join(Box::new(JoinFragment {
                kind,
                left,
                right,
                condition,
                name: None,
            })))
        })
    }

    fn visit_cross_join(&mut self, inputs: &[Binding]) -> Result<InputFragment> {
        let Some((first, rest)) = inputs.split_first() else {
            return Err(GenerateError::MalformedTree(String::from("cross join without inputs")));
        };
        if rest.is_empty() {
            return Err(GenerateError::MalformedTree(String::from(
                "cross join needs at least two inputs",
            )));
        }
        self.with_op(OpType::Join, |g| {
            let mut joined = g.visit_join_input(first, false)?;
            for binding in rest {
                let right = g.visit_join_input(binding, true)?;
                joined = InputFragment::Join(Box::new(JoinFragment {
                    kind: JoinKind::Cross,
                    left: joined,
                    right,
                    condition: None,
                    name: None,
                }));
            }
            Ok(joined)
        })
    }

    /// Lowers one side of a join. Selects and unions become derived tables;
    /// a join on the right is wrapped in a select named after its variable.
    fn visit_join_input(&mut self, binding: &Binding, is_right: bool) -> Result<InputFragment> {
        let input = self.visit_input(&binding.expr, &binding.variable)?;
        match input {
            InputFragment::Select(mut select) => {
                select.wrap(&mut self.cx)?;
                Ok(InputFragment::Select(select))
            }
            InputFragment::Union(mut union) => {
                union.wrap(&mut self.cx);
                Ok(InputFragment::Union(union))
            }
            InputFragment::Join(join) if is_right => {
                let mut select = SelectStatement::from_input(InputFragment::Join(join));
                select.name = Some(binding.variable.clone());
                select.wrap(&mut self.cx)?;
                Ok(InputFragment::Select(Box::new(select)))
            }
            other => Ok(other),
        }
    }

    fn visit_union_all(&mut self, left: &Expr, right: &Expr) -> Result<InputFragment> {
        self.with_op(OpType::Union, |g| {
            let left = g.visit_union_side(left)?;
            let right = g.visit_union_side(right)?;
            Ok(InputFragment::Union(Box::new(UnionFragment {
                left,
                right,
                name: None,
                wrapped: false,
            })))
        })
    }

    fn visit_union_side(&mut self, expr: &Expr) -> Result<InputFragment> {
        let input = self.visit_relational(expr)?;
        let mut select = self.select_over(input)?;
        select.wrap(&mut self.cx)?;
        Ok(InputFragment::Select(Box::new(select)))
    }
}

pub(super) fn table_fragment(target: &EntitySetRef) -> TableFragment {
    TableFragment {
        schema: target.schema.clone(),
        table: target.table.clone(),
        name: None,
        properties: target.properties.clone(),
        defining_query: target.defining_query.clone(),
    }
}

/// Turns a lowered expression into a select-list column named `name`.
///
/// The chain of a projected column ends with its output name, which is the
/// name enclosing statements reference it by.
pub(super) fn projected_column(fragment: SqlFragment, name: &str) -> ColumnFragment {
    let mut column = match fragment {
        SqlFragment::Column(column) if column.literal.is_none() => column,
        other => ColumnFragment::from_literal(other, name),
    };
    column.column_alias = Some(String::from(name));
    match column.properties.last_mut() {
        Some(last) => name.clone_into(last),
        None => column.properties.push(String::from(name)),
    }
    column
}
