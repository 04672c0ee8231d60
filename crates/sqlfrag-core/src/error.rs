//! Error types for SQL generation.
//!
//! Every failure here is a hard failure for the command being compiled:
//! generation is deterministic, so the same tree always fails the same way and
//! no partial SQL is ever returned.

use thiserror::Error;

use crate::tree::ExprKind;

/// Errors raised while lowering a command tree to SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// A construct the generator knows about but has no lowering for yet.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A command tree node that this provider never supports.
    #[error("unsupported expression: {0}")]
    Unsupported(String),

    /// A property chain that matches no input visible in the current scope.
    #[error("no visible input owns property `{0}`")]
    UnresolvedProperty(String),

    /// `is_compatible` was asked about an operator it has no rule for.
    #[error("no compatibility rule for operator {0:?}")]
    NoCompatibilityRule(ExprKind),

    /// NOT applied to a fragment that cannot be negated.
    #[error("cannot negate {0} fragment")]
    NotNegatable(&'static str),

    /// A command tree whose shape breaks the generator's assumptions.
    #[error("malformed command tree: {0}")]
    MalformedTree(String),
}

/// Result type alias for SQL generation.
pub type Result<T> = std::result::Result<T, GenerateError>;
