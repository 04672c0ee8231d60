//! INSERT, UPDATE and DELETE statements.

use super::{write_list, FragmentVisitor, SqlFragment, SqlWriter, TableFragment};
use crate::select::SelectStatement;

/// `INSERT INTO target(columns) VALUES (values)` with an optional
/// read-back select.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table, unaliased.
    pub target: TableFragment,
    /// Unqualified target columns.
    pub columns: Vec<SqlFragment>,
    /// Values, one per column.
    pub values: Vec<SqlFragment>,
    /// Select reading back server-generated values.
    pub returning: Option<SelectStatement>,
}

impl InsertStatement {
    /// Appends the statement's SQL text.
    pub fn write_sql(&self, w: &mut SqlWriter<'_>) {
        debug_assert_eq!(self.columns.len(), self.values.len());
        w.push_str("INSERT INTO ");
        self.target.write_target(w);
        w.push('(');
        write_list(w, &self.columns);
        w.push_str(") VALUES (");
        write_list(w, &self.values);
        w.push(')');
        write_returning(w, self.returning.as_ref());
    }

    /// Visits the statement's fragments.
    pub fn accept(&mut self, visitor: &mut dyn FragmentVisitor) {
        visitor.visit_table(&mut self.target);
        for fragment in self.columns.iter_mut().chain(&mut self.values) {
            fragment.accept(visitor);
        }
        if let Some(returning) = &mut self.returning {
            returning.accept(visitor);
        }
    }
}

/// `UPDATE target SET a = x, ... WHERE predicate` with an optional
/// read-back select.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table, unaliased.
    pub target: TableFragment,
    /// `column = value` assignments.
    pub assignments: Vec<SqlFragment>,
    /// Row selection.
    pub where_clause: Option<SqlFragment>,
    /// Select reading back server-generated values.
    pub returning: Option<SelectStatement>,
}

impl UpdateStatement {
    /// Appends the statement's SQL text.
    pub fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.push_str("UPDATE ");
        self.target.write_target(w);
        w.push_str(" SET ");
        write_list(w, &self.assignments);
        if let Some(predicate) = &self.where_clause {
            w.push_str(" WHERE ");
            predicate.write_sql(w);
        }
        write_returning(w, self.returning.as_ref());
    }

    /// Visits the statement's fragments.
    pub fn accept(&mut self, visitor: &mut dyn FragmentVisitor) {
        visitor.visit_table(&mut self.target);
        for assignment in &mut self.assignments {
            assignment.accept(visitor);
        }
        if let Some(predicate) = &mut self.where_clause {
            predicate.accept(visitor);
        }
        if let Some(returning) = &mut self.returning {
            returning.accept(visitor);
        }
    }
}

/// `DELETE FROM target WHERE predicate`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table, unaliased.
    pub target: TableFragment,
    /// Row selection.
    pub where_clause: Option<SqlFragment>,
}

impl DeleteStatement {
    /// Appends the statement's SQL text.
    pub fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.push_str("DELETE FROM ");
        self.target.write_target(w);
        if let Some(predicate) = &self.where_clause {
            w.push_str(" WHERE ");
            predicate.write_sql(w);
        }
    }

    /// Visits the statement's fragments.
    pub fn accept(&mut self, visitor: &mut dyn FragmentVisitor) {
        visitor.visit_table(&mut self.target);
        if let Some(predicate) = &mut self.where_clause {
            predicate.accept(visitor);
        }
    }
}

fn write_returning(w: &mut SqlWriter<'_>, returning: Option<&SelectStatement>) {
    if let Some(select) = returning {
        w.push_str(";\r\n");
        select.write_sql(w);
    }
}
