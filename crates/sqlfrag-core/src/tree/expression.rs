//! Command tree expression types.

use serde::{Deserialize, Serialize};

use crate::schema::EntitySetRef;
use crate::value::{SqlValue, ToSqlValue};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    /// Negation; takes exactly one argument.
    UnaryMinus,
}

impl ArithmeticOp {
    /// Returns the SQL representation of a binary operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus | Self::UnaryMinus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    LeftOuter,
    /// FULL OUTER JOIN.
    FullOuter,
    /// CROSS JOIN.
    Cross,
}

impl JoinKind {
    /// Returns the SQL keyword sequence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// An input expression bound to a variable name.
///
/// Property references inside the consuming operator address the input
/// through `variable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// The input expression.
    pub expr: Box<Expr>,
    /// The variable the input is bound to.
    pub variable: String,
}

impl Binding {
    /// Binds `expr` to `variable`.
    #[must_use]
    pub fn new(expr: Expr, variable: impl Into<String>) -> Self {
        Self {
            expr: Box::new(expr),
            variable: variable.into(),
        }
    }
}

/// The input of a group-by: the input variable plus the group variable
/// aggregates refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBinding {
    /// The input expression.
    pub expr: Box<Expr>,
    /// Variable used by the keys.
    pub variable: String,
    /// Variable used by the aggregate arguments.
    pub group_variable: String,
}

impl GroupBinding {
    /// Binds `expr` to `variable` and `group_variable`.
    #[must_use]
    pub fn new(expr: Expr, variable: impl Into<String>, group_variable: impl Into<String>) -> Self {
        Self {
            expr: Box::new(expr),
            variable: variable.into(),
            group_variable: group_variable.into(),
        }
    }
}

/// A named expression: one property of a projected row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedExpr {
    /// Row property name.
    pub name: String,
    /// Value expression.
    pub expr: Expr,
}

impl NamedExpr {
    /// Creates a named expression.
    #[must_use]
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    /// Expression to order by.
    pub expr: Expr,
    /// Ascending (default) or descending.
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

const fn default_ascending() -> bool {
    true
}

impl SortKey {
    /// Ascending key.
    #[must_use]
    pub const fn asc(expr: Expr) -> Self {
        Self {
            expr,
            ascending: true,
        }
    }

    /// Descending key.
    #[must_use]
    pub const fn desc(expr: Expr) -> Self {
        Self {
            expr,
            ascending: false,
        }
    }
}

/// An aggregate computed by a group-by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Row property name of the result.
    pub name: String,
    /// Aggregate function (`Edm.Count`, `Sum`, ...).
    pub function: String,
    /// Arguments; empty means `*`.
    #[serde(default)]
    pub arguments: Vec<Expr>,
    /// Whether DISTINCT applies to the arguments.
    #[serde(default)]
    pub distinct: bool,
}

/// A command tree expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// All rows of an entity set.
    Scan { target: EntitySetRef },
    /// Reference to a bound variable.
    VariableRef { name: String },
    /// Property of an instance (variable or nested property).
    Property { instance: Box<Expr>, property: String },
    /// A constant.
    Constant { value: SqlValue },
    /// The NULL literal.
    Null,
    /// Reference to a caller-supplied parameter.
    Parameter { name: String },
    /// Binary comparison.
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Logical AND.
    And { left: Box<Expr>, right: Box<Expr> },
    /// Logical OR.
    Or { left: Box<Expr>, right: Box<Expr> },
    /// Logical NOT.
    Not { argument: Box<Expr> },
    /// IS NULL test.
    IsNull { argument: Box<Expr> },
    /// Emptiness test over a collection (`NOT EXISTS`).
    IsEmpty { argument: Box<Expr> },
    /// LIKE pattern match.
    Like {
        argument: Box<Expr>,
        pattern: Box<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        escape: Option<Box<Expr>>,
    },
    /// IN list.
    In { item: Box<Expr>, list: Vec<Expr> },
    /// Arithmetic.
    Arithmetic { op: ArithmeticOp, arguments: Vec<Expr> },
    /// Searched CASE.
    Case {
        when: Vec<Expr>,
        then: Vec<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<Expr>>,
    },
    /// Type conversion.
    Cast { argument: Box<Expr>, type_name: String },
    /// Canonical (`Edm.*`) or store function call.
    Function { name: String, arguments: Vec<Expr> },
    /// Rows of the input satisfying the predicate.
    Filter { input: Binding, predicate: Box<Expr> },
    /// Row-constructor projection of the input.
    Project { input: Binding, projection: Vec<NamedExpr> },
    /// Sorted input.
    Sort { input: Binding, keys: Vec<SortKey> },
    /// Sorted input with the first `count` rows skipped.
    Skip {
        input: Binding,
        keys: Vec<SortKey>,
        count: Box<Expr>,
    },
    /// At most `limit` rows of the argument.
    Limit { argument: Box<Expr>, limit: Box<Expr> },
    /// Duplicate-free argument.
    Distinct { argument: Box<Expr> },
    /// Two-input join with a condition.
    Join {
        join_kind: JoinKind,
        left: Binding,
        right: Binding,
        condition: Box<Expr>,
    },
    /// Cartesian product of two or more inputs.
    CrossJoin { inputs: Vec<Binding> },
    /// Bag union of two inputs.
    UnionAll { left: Box<Expr>, right: Box<Expr> },
    /// Grouping with keys and aggregates.
    GroupBy {
        input: GroupBinding,
        keys: Vec<NamedExpr>,
        aggregates: Vec<Aggregate>,
    },
    /// Set intersection.
    Intersect { left: Box<Expr>, right: Box<Expr> },
    /// Set difference.
    Except { left: Box<Expr>, right: Box<Expr> },
    /// Single element of a collection.
    Element { argument: Box<Expr> },
    /// Instances of a given type.
    OfType { argument: Box<Expr>, type_name: String },
    /// Navigation through a relationship.
    Navigation { from: Box<Expr>, relationship: String },
}

/// Discriminant of [`Expr`], used for operator-compatibility checks and
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprKind {
    Scan,
    VariableRef,
    Property,
    Constant,
    Null,
    Parameter,
    Comparison,
    And,
    Or,
    Not,
    IsNull,
    IsEmpty,
    Like,
    In,
    Arithmetic,
    Case,
    Cast,
    Function,
    Filter,
    Project,
    Sort,
    Skip,
    Limit,
    Distinct,
    Join,
    CrossJoin,
    UnionAll,
    GroupBy,
    Intersect,
    Except,
    Element,
    OfType,
    Navigation,
}

impl Expr {
    /// Returns the kind of this expression.
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        match self {
            Self::Scan { .. } => ExprKind::Scan,
            Self::VariableRef { .. } => ExprKind::VariableRef,
            Self::Property { .. } => ExprKind::Property,
            Self::Constant { .. } => ExprKind::Constant,
            Self::Null => ExprKind::Null,
            Self::Parameter { .. } => ExprKind::Parameter,
            Self::Comparison { .. } => ExprKind::Comparison,
            Self::And { .. } => ExprKind::And,
            Self::Or { .. } => ExprKind::Or,
            Self::Not { .. } => ExprKind::Not,
            Self::IsNull { .. } => ExprKind::IsNull,
            Self::IsEmpty { .. } => ExprKind::IsEmpty,
            Self::Like { .. } => ExprKind::Like,
            Self::In { .. } => ExprKind::In,
            Self::Arithmetic { .. } => ExprKind::Arithmetic,
            Self::Case { .. } => ExprKind::Case,
            Self::Cast { .. } => ExprKind::Cast,
            Self::Function { .. } => ExprKind::Function,
            Self::Filter { .. } => ExprKind::Filter,
            Self::Project { .. } => ExprKind::Project,
            Self::Sort { .. } => ExprKind::Sort,
            Self::Skip { .. } => ExprKind::Skip,
            Self::Limit { .. } => ExprKind::Limit,
            Self::Distinct { .. } => ExprKind::Distinct,
            Self::Join { .. } => ExprKind::Join,
            Self::CrossJoin { .. } => ExprKind::CrossJoin,
            Self::UnionAll { .. } => ExprKind::UnionAll,
            Self::GroupBy { .. } => ExprKind::GroupBy,
            Self::Intersect { .. } => ExprKind::Intersect,
            Self::Except { .. } => ExprKind::Except,
            Self::Element { .. } => ExprKind::Element,
            Self::OfType { .. } => ExprKind::OfType,
            Self::Navigation { .. } => ExprKind::Navigation,
        }
    }

    /// Creates a variable reference.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::VariableRef { name: name.into() }
    }

    /// Creates a property reference on this instance.
    #[must_use]
    pub fn prop(self, property: impl Into<String>) -> Self {
        Self::Property {
            instance: Box::new(self),
            property: property.into(),
        }
    }

    /// Creates a constant.
    #[must_use]
    pub fn constant(value: impl ToSqlValue) -> Self {
        Self::Constant {
            value: value.to_sql_value(),
        }
    }

    /// Creates a parameter reference.
    #[must_use]
    pub fn param(name: impl Into<String>) -> Self {
        Self::Parameter { name: name.into() }
    }

    /// Creates a comparison expression.
    #[must_use]
    pub fn compare(self, op: ComparisonOp, right: Self) -> Self {
        Self::Comparison {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.compare(ComparisonOp::Eq, right)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.compare(ComparisonOp::Gt, right)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.compare(ComparisonOp::Lt, right)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        Self::And {
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        Self::Or {
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Creates a NOT expression.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Not {
            argument: Box::new(self),
        }
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            argument: Box::new(self),
        }
    }

    /// Creates a filter over `input` bound to `variable`.
    #[must_use]
    pub fn filter(input: Self, variable: impl Into<String>, predicate: Self) -> Self {
        Self::Filter {
            input: Binding::new(input, variable),
            predicate: Box::new(predicate),
        }
    }

    /// Creates a projection over `input` bound to `variable`.
    #[must_use]
    pub fn project(input: Self, variable: impl Into<String>, projection: Vec<NamedExpr>) -> Self {
        Self::Project {
            input: Binding::new(input, variable),
            projection,
        }
    }

    /// Creates a sort over `input` bound to `variable`.
    #[must_use]
    pub fn sort(input: Self, variable: impl Into<String>, keys: Vec<SortKey>) -> Self {
        Self::Sort {
            input: Binding::new(input, variable),
            keys,
        }
    }

    /// Creates a limit over this expression.
    #[must_use]
    pub fn limit(self, limit: Self) -> Self {
        Self::Limit {
            argument: Box::new(self),
            limit: Box::new(limit),
        }
    }

    /// Creates a distinct over this expression.
    #[must_use]
    pub fn distinct(self) -> Self {
        Self::Distinct {
            argument: Box::new(self),
        }
    }

    /// Whether the expression is written without surrounding parentheses
    /// when it is an operand.
    #[must_use]
    pub const fn is_atomic(&self) -> bool {
        matches!(
            self,
            Self::Property { .. } | Self::Parameter { .. } | Self::Constant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_op() {
        assert_eq!(ComparisonOp::Eq.as_str(), "=");
        assert_eq!(ComparisonOp::GtEq.as_str(), ">=");
    }

    #[test]
    fn test_join_kind() {
        assert_eq!(JoinKind::Inner.as_str(), "INNER JOIN");
        assert_eq!(JoinKind::LeftOuter.as_str(), "LEFT OUTER JOIN");
    }

    #[test]
    fn test_expr_chaining() {
        let expr = Expr::var("c")
            .prop("Age")
            .gt(Expr::constant(18))
            .and(Expr::var("c").prop("Name").eq(Expr::param("name")));

        assert_eq!(expr.kind(), ExprKind::And);
        assert!(Expr::var("c").prop("Age").is_atomic());
        assert!(!expr.is_atomic());
    }

    #[test]
    fn test_expr_json_shape() {
        let expr = Expr::var("c").prop("Id").eq(Expr::constant(1));
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["kind"], "comparison");
        assert_eq!(json["op"], "eq");
        assert_eq!(json["right"]["value"]["int"], 1);
        let back: Expr = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }
}
