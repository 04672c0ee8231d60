//! Command tree types: the logical input of the generator.
//!
//! The ORM pipeline builds these trees; the generator consumes them node by
//! node. Everything here is plain data and (de)serialises with serde so trees
//! can travel as JSON.

mod command;
mod expression;

pub use command::{CommandTree, DeleteCommand, InsertCommand, SetClause, UpdateCommand};
pub use expression::{
    Aggregate, ArithmeticOp, Binding, ComparisonOp, Expr, ExprKind, GroupBinding, JoinKind,
    NamedExpr, SortKey,
};
