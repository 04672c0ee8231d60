//! One SQL `SELECT`.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{GenerateError, Result};
use crate::fragment::{write_list, ColumnFragment, InputFragment, SqlFragment, SqlWriter};
use crate::scope::{GenContext, OpType};
use crate::tree::ExprKind;

/// A SELECT statement under construction, or a finished one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectStatement {
    /// Alias, when the statement is an input of an enclosing one.
    pub name: Option<String>,
    /// Written parenthesised and addressable by its alias.
    pub wrapped: bool,
    /// `SELECT DISTINCT`.
    pub distinct: bool,
    /// Select list.
    pub columns: Vec<ColumnFragment>,
    /// Source.
    pub from: Option<InputFragment>,
    /// WHERE predicate.
    pub where_clause: Option<SqlFragment>,
    /// GROUP BY keys.
    pub group_by: Vec<SqlFragment>,
    /// ORDER BY keys.
    pub order_by: Vec<SqlFragment>,
    /// LIMIT row count.
    pub limit: Option<SqlFragment>,
    /// LIMIT offset.
    pub skip: Option<SqlFragment>,
    /// Select list of a statement fused into this one; used instead of the
    /// source table's properties when defaults are expanded.
    pub(crate) inherited_columns: Vec<ColumnFragment>,
    has_renamed_columns: bool,
    column_names: HashSet<String>,
}

fn column_key(name: &str) -> String {
    name.to_uppercase()
}

impl SelectStatement {
    /// Creates an empty statement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `SELECT ... FROM input`.
    #[must_use]
    pub fn from_input(input: InputFragment) -> Self {
        Self {
            from: Some(input),
            ..Self::default()
        }
    }

    /// Whether some column was renamed to avoid a collision.
    #[must_use]
    pub const fn has_renamed_columns(&self) -> bool {
        self.has_renamed_columns
    }

    /// Whether `kind` can be folded into this statement without wrapping it.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NoCompatibilityRule`] for operators that are
    /// never folded.
    pub fn is_compatible(&self, kind: ExprKind) -> Result<bool> {
        let no_columns = self.columns.is_empty();
        let compatible = match kind {
            ExprKind::Filter => self.where_clause.is_none() && no_columns,
            ExprKind::Project => no_columns,
            ExprKind::Limit => self.limit.is_none(),
            ExprKind::Skip => self.skip.is_none(),
            ExprKind::Sort => no_columns && self.group_by.is_empty() && self.order_by.is_empty(),
            ExprKind::GroupBy => {
                no_columns
                    && self.group_by.is_empty()
                    && self.order_by.is_empty()
                    && self.limit.is_none()
            }
            other => return Err(GenerateError::NoCompatibilityRule(other)),
        };
        Ok(compatible)
    }

    /// Turns this statement into a derived table.
    ///
    /// Default columns are expanded if none were projected, the statement's
    /// sources leave the scope, and a named statement is registered in their
    /// place.
    ///
    /// # Errors
    ///
    /// Propagates default-column expansion failures.
    pub fn wrap(&mut self, cx: &mut GenContext) -> Result<()> {
        self.wrapped = true;
        if self.columns.is_empty() {
            self.add_default_columns(cx)?;
        }
        if let Some(from) = &self.from {
            cx.scope.remove_input(from);
        }
        if let Some(name) = self.name.clone() {
            cx.scope.add(&name, InputFragment::Select(Box::new(self.clone())));
        }
        debug!(name = ?self.name, columns = self.columns.len(), "wrapped select");
        Ok(())
    }

    /// Appends a GROUP BY key.
    pub fn add_group_by(&mut self, key: SqlFragment) {
        self.group_by.push(key);
    }

    /// Appends an ORDER BY key.
    pub fn add_order_by(&mut self, key: SqlFragment) {
        self.order_by.push(key);
    }

    /// Appends a column, resolving its owner and renaming it on a
    /// case-insensitive output name collision.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnresolvedProperty`] when the column's chain
    /// names no visible input.
    pub fn add_column(&mut self, mut column: ColumnFragment, cx: &GenContext) -> Result<()> {
        if column.literal.is_none() && column.properties.len() > 1 {
            let input = cx.scope.find_input_from_properties(&column.properties)?;
            column.table_name = input.name().map(String::from);
        }
        if let Some(output) = column.output_name().map(String::from) {
            if self.column_names.contains(&column_key(&output)) {
                let unique = self.make_column_name_unique(&output);
                debug!(column = %output, alias = %unique, "renamed colliding column");
                column.column_alias = Some(unique);
                self.has_renamed_columns = true;
            }
            if let Some(output) = column.output_name() {
                self.column_names.insert(column_key(output));
            }
        }
        self.columns.push(column);
        Ok(())
    }

    /// Returns `base` followed by the smallest integer suffix (from 1) whose
    /// upper-cased form is not taken.
    #[must_use]
    pub fn make_column_name_unique(&self, base: &str) -> String {
        let mut i = 1;
        loop {
            let candidate = format!("{base}{i}");
            if !self.column_names.contains(&column_key(&candidate)) {
                return candidate;
            }
            i += 1;
        }
    }

    /// Redirects a reference into this statement to the alias of the column
    /// it reads, when that column was renamed.
    ///
    /// Returns `true` when `column` was rewritten.
    pub fn has_different_name_for_column(&self, column: &mut ColumnFragment) -> bool {
        if !self.has_renamed_columns {
            return false;
        }
        let reference = self.reference_below_alias(&column.properties);
        let Some(source) = self.columns.iter().find(|c| c.matches_reference(reference)) else {
            return false;
        };
        match &source.column_alias {
            Some(alias) if source.has_distinct_alias() => {
                column.column_name = Some(alias.clone());
                true
            }
            _ => false,
        }
    }

    /// The part of a referencing chain below this statement's alias.
    fn reference_below_alias<'c>(&self, chain: &'c [String]) -> &'c [String] {
        let position = self
            .name
            .as_ref()
            .and_then(|name| chain.iter().rposition(|part| part == name));
        match position {
            Some(i) => &chain[i + 1..],
            None => chain.get(1..).unwrap_or_default(),
        }
    }

    /// Expands the select list to every column of the source.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::MalformedTree`] for a statement without a
    /// source, and propagates expansion and resolution failures.
    pub fn add_default_columns(&mut self, cx: &mut GenContext) -> Result<()> {
        let Some(from) = self.from.clone() else {
            return Err(GenerateError::MalformedTree(String::from(
                "select without a source has no default columns",
            )));
        };
        if !self.inherited_columns.is_empty() {
            let columns = self.inherited_columns.clone();
            return self.add_all(columns, cx);
        }
        // A bare table source may not be registered yet.
        let mut temporary = None;
        if let InputFragment::Table(table) = &from {
            let name = table.scope_name();
            if !cx.scope.contains(name) {
                cx.scope.add(name, from.clone());
                temporary = Some(String::from(name));
            }
        }
        let added = self
            .get_default_columns_for_fragment(&from, cx)
            .and_then(|columns| self.add_all(columns, cx));
        if let Some(name) = temporary {
            cx.scope.remove(&name);
        }
        added
    }

    fn add_all(&mut self, columns: Vec<ColumnFragment>, cx: &GenContext) -> Result<()> {
        for column in columns {
            self.add_column(column, cx)?;
        }
        Ok(())
    }

    /// Computes the implicit columns `input` contributes to a select list.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NotImplemented`] for inputs whose columns
    /// cannot be derived.
    pub fn get_default_columns_for_fragment(
        &self,
        input: &InputFragment,
        cx: &mut GenContext,
    ) -> Result<Vec<ColumnFragment>> {
        let mut columns = match input {
            InputFragment::Table(table) => {
                let owner = table.scope_name();
                table
                    .properties
                    .iter()
                    .map(|property| {
                        let mut column = ColumnFragment::new(Some(owner), property);
                        column.properties = vec![String::from(owner), property.clone()];
                        column
                    })
                    .collect()
            }
            InputFragment::Join(join) => cx.with_op(OpType::Join, |cx| {
                let mut columns = self.get_default_columns_for_fragment(&join.left, cx)?;
                columns.extend(self.get_default_columns_for_fragment(&join.right, cx)?);
                Ok::<_, GenerateError>(columns)
            })?,
            InputFragment::Union(union) => cx.with_op(OpType::Union, |cx| {
                self.get_default_columns_for_fragment(&union.left, cx)
            })?,
            InputFragment::Select(select) => Self::columns_of_select(select, cx.top_op())?,
        };
        if let Some(name) = input.name() {
            for column in &mut columns {
                if column.properties.first().map(String::as_str) != Some(name) {
                    column.push_input(name);
                }
            }
        }
        Ok(columns)
    }

    /// Re-derives the select list of a nested statement as seen from outside.
    fn columns_of_select(select: &Self, op: OpType) -> Result<Vec<ColumnFragment>> {
        if select.columns.is_empty() {
            return Err(GenerateError::NotImplemented(String::from(
                "default columns of a select without a select list",
            )));
        }
        let mut columns = Vec::with_capacity(select.columns.len());
        for source in &select.columns {
            let Some(output) = source.output_name() else {
                return Err(GenerateError::MalformedTree(String::from(
                    "projected expression without a name",
                )));
            };
            let mut column = ColumnFragment::new(None, output);
            match op {
                OpType::Join => {
                    column.table_name.clone_from(&source.table_name);
                    column.column_alias.clone_from(&source.column_alias);
                    column.push_input(source.column_name.as_deref().unwrap_or(output));
                    if let Some(table) = &source.table_name {
                        column.push_input(table);
                    }
                }
                OpType::Union => {
                    column.push_input(source.actual_column_name().unwrap_or(output));
                    if let (Some(table), None) = (&source.table_name, &source.column_alias) {
                        column.push_input(table);
                    }
                }
            }
            if let Some(name) = &select.name {
                column.push_input(name);
            }
            columns.push(column);
        }
        Ok(columns)
    }

    /// Appends the statement's SQL text.
    pub fn write_sql(&self, w: &mut SqlWriter<'_>) {
        debug_assert!(!self.columns.is_empty(), "select list expanded before emission");
        if self.wrapped {
            w.push('(');
        }
        w.push_str("SELECT ");
        if self.distinct {
            w.push_str("DISTINCT ");
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                w.push_str(", ");
            }
            column.write_select_item(w);
        }
        if let Some(from) = &self.from {
            w.push_str("\r\n FROM ");
            from.write_sql(w);
        }
        if let Some(predicate) = &self.where_clause {
            w.push_str("\r\n WHERE ");
            predicate.write_sql(w);
        }
        if !self.group_by.is_empty() {
            w.push_str("\r\n GROUP BY ");
            write_list(w, &self.group_by);
        }
        if !self.order_by.is_empty() {
            w.push_str("\r\n ORDER BY ");
            write_list(w, &self.order_by);
        }
        if self.limit.is_some() || self.skip.is_some() {
            w.push_str("\r\n LIMIT ");
            if let Some(skip) = &self.skip {
                skip.write_sql(w);
                w.push(',');
            }
            match &self.limit {
                Some(limit) => limit.write_sql(w),
                None => {
                    let unbounded = w.dialect().unbounded_limit();
                    w.push_str(unbounded);
                }
            }
        }
        if self.wrapped {
            w.push(')');
            if let Some(name) = &self.name {
                w.push_str(" AS ");
                w.identifier(name);
            }
        }
    }
}
