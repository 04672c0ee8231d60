//! Command trees: the unit of work handed to the generator.

use serde::{Deserialize, Serialize};

use super::expression::{Binding, Expr, NamedExpr};

/// One `column = value` assignment of an insert or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetClause {
    /// Target property, usually `Property(VariableRef(target), name)`.
    pub property: Expr,
    /// Assigned value.
    pub value: Expr,
}

impl SetClause {
    /// Creates a set clause.
    #[must_use]
    pub const fn new(property: Expr, value: Expr) -> Self {
        Self { property, value }
    }
}

/// An INSERT command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertCommand {
    /// Target entity set (a `Scan`) and its variable.
    pub target: Binding,
    /// Assignments, in column order.
    pub set_clauses: Vec<SetClause>,
    /// Server-generated values to read back after the insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returning: Option<Vec<NamedExpr>>,
}

/// An UPDATE command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCommand {
    /// Target entity set (a `Scan`) and its variable.
    pub target: Binding,
    /// Assignments.
    pub set_clauses: Vec<SetClause>,
    /// Row selection.
    pub predicate: Expr,
    /// Server-generated values to read back after the update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returning: Option<Vec<NamedExpr>>,
}

/// A DELETE command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteCommand {
    /// Target entity set (a `Scan`) and its variable.
    pub target: Binding,
    /// Row selection.
    pub predicate: Expr,
}

/// A command tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandTree {
    /// A query.
    Query { query: Expr },
    /// An insert.
    Insert(InsertCommand),
    /// An update.
    Update(UpdateCommand),
    /// A delete.
    Delete(DeleteCommand),
}
