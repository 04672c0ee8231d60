//! INSERT, UPDATE and DELETE commands.

use tracing::debug;

use super::query::{projected_column, table_fragment};
use super::SqlGenerator;
use crate::error::{GenerateError, Result};
use crate::fragment::{
    BinaryFragment, ColumnFragment, DeleteStatement, InputFragment, InsertStatement, SqlFragment,
    TableFragment, UpdateStatement,
};
use crate::schema::EntitySetRef;
use crate::select::SelectStatement;
use crate::tree::{Binding, DeleteCommand, Expr, InsertCommand, NamedExpr, UpdateCommand};

impl SqlGenerator<'_> {
    pub(super) fn generate_insert(&mut self, command: &InsertCommand) -> Result<InsertStatement> {
        let (target, entity_set) = self.visit_dml_target(&command.target)?;
        let mut columns = Vec::with_capacity(command.set_clauses.len());
        let mut values = Vec::with_capacity(command.set_clauses.len());
        for clause in &command.set_clauses {
            columns.push(self.visit_target_column(&clause.property)?);
            values.push(self.visit_scalar(&clause.value)?);
        }

        let returning = match &command.returning {
            Some(projection) => {
                let mut select = self.returning_select(&target, projection)?;
                let mut predicate = self.row_count_check();
                let mut identity_used = false;
                for key in &entity_set.keys {
                    let assigned = columns.iter().position(|column| {
                        matches!(column, SqlFragment::Column(c) if c.column_name.as_deref() == Some(key.as_str()))
                    });
                    let value = match assigned {
                        Some(i) => values[i].clone(),
                        None if identity_used => {
                            return Err(GenerateError::Unsupported(format!(
                                "more than one server-generated key on {}",
                                entity_set.table
                            )));
                        }
                        None => {
                            identity_used = true;
                            SqlFragment::literal(self.dialect.identity_function())
                        }
                    };
                    let key_matches = BinaryFragment::new(
                        SqlFragment::Column(ColumnFragment::new(None, key)),
                        "=",
                        value,
                    );
                    predicate = SqlFragment::Binary(BinaryFragment::new(
                        predicate,
                        "AND",
                        SqlFragment::Binary(key_matches),
                    ));
                }
                select.where_clause = Some(predicate);
                Some(select)
            }
            None => None,
        };

        debug!(table = %target.table, columns = columns.len(), returning = returning.is_some(), "insert");
        Ok(InsertStatement {
            target,
            columns,
            values,
            returning,
        })
    }

    pub(super) fn generate_update(&mut self, command: &UpdateCommand) -> Result<UpdateStatement> {
        let (target, _) = self.visit_dml_target(&command.target)?;
        let mut assignments = Vec::with_capacity(command.set_clauses.len());
        for clause in &command.set_clauses {
            let column = self.visit_target_column(&clause.property)?;
            let value = self.visit_scalar(&clause.value)?;
            assignments.push(SqlFragment::Binary(BinaryFragment::new(column, "=", value)));
        }
        let predicate = self.visit_scalar(&command.predicate)?;

        let returning = match &command.returning {
            Some(projection) => {
                let mut select = self.returning_select(&target, projection)?;
                let mut check = BinaryFragment::new(self.row_count_check(), "AND", predicate.clone());
                check.wrap_right = true;
                select.where_clause = Some(SqlFragment::Binary(check));
                Some(select)
            }
            None => None,
        };

        debug!(table = %target.table, assignments = assignments.len(), returning = returning.is_some(), "update");
        Ok(UpdateStatement {
            target,
            assignments,
            where_clause: Some(predicate),
            returning,
        })
    }

    pub(super) fn generate_delete(&mut self, command: &DeleteCommand) -> Result<DeleteStatement> {
        let (target, _) = self.visit_dml_target(&command.target)?;
        let predicate = self.visit_scalar(&command.predicate)?;
        debug!(table = %target.table, "delete");
        Ok(DeleteStatement {
            target,
            where_clause: Some(predicate),
        })
    }

    /// Registers the target of a modification under its variable. The
    /// target stays unaliased, so its columns are written unqualified.
    fn visit_dml_target(&mut self, binding: &Binding) -> Result<(TableFragment, EntitySetRef)> {
        let Expr::Scan { target } = binding.expr.as_ref() else {
            return Err(GenerateError::MalformedTree(format!(
                "modification target must be a scan, found {:?}",
                binding.expr.kind()
            )));
        };
        let table = table_fragment(target);
        self.cx
            .scope
            .add(&binding.variable, InputFragment::Table(table.clone()));
        Ok((table, target.clone()))
    }

    fn visit_target_column(&mut self, property: &Expr) -> Result<SqlFragment> {
        match self.visit_scalar(property)? {
            column @ SqlFragment::Column(_) => Ok(column),
            other => Err(GenerateError::MalformedTree(format!(
                "set clause target must be a property, found {}",
                other.kind_name()
            ))),
        }
    }

    /// `SELECT <projection> FROM <target>`, the read-back half of a
    /// modification with server-generated values.
    fn returning_select(&mut self, target: &TableFragment, projection: &[NamedExpr]) -> Result<SelectStatement> {
        let mut select = SelectStatement::from_input(InputFragment::Table(target.clone()));
        for named in projection {
            let fragment = self.visit_scalar(&named.expr)?;
            select.add_column(projected_column(fragment, &named.name), &self.cx)?;
        }
        Ok(select)
    }

    fn row_count_check(&self) -> SqlFragment {
        SqlFragment::Binary(BinaryFragment::new(
            SqlFragment::literal(self.dialect.row_count_function()),
            ">",
            SqlFragment::literal("0"),
        ))
    }
}
