//! Scalar expressions: predicates, arithmetic, constants and column
//! references.

use tracing::trace;

use super::SqlGenerator;
use crate::error::{GenerateError, Result};
use crate::fragment::{
    BinaryFragment, CaseFragment, ColumnFragment, ExistsFragment, InFragment, InputFragment,
    IsNullFragment, LikeFragment, SqlFragment,
};
use crate::tree::{ArithmeticOp, Expr};
use crate::value::{Parameter, SqlValue};

impl SqlGenerator<'_> {
    /// Lowers a scalar expression.
    pub(super) fn visit_scalar(&mut self, expr: &Expr) -> Result<SqlFragment> {
        match expr {
            Expr::Property { .. } => self.visit_property(expr).map(SqlFragment::Column),
            Expr::Constant { value } => Ok(self.visit_constant(value)),
            Expr::Null => Ok(SqlFragment::literal("NULL")),
            Expr::Parameter { name } => Ok(SqlFragment::Literal(format!(
                "{}{name}",
                self.dialect.parameter_prefix()
            ))),
            Expr::Comparison { op, left, right } => {
                if let Some(like) = self.try_promote_to_like(*op, left, right)? {
                    return Ok(like);
                }
                self.visit_binary(left, op.as_str(), right)
            }
            Expr::And { left, right } => self.visit_binary(left, "AND", right),
            Expr::Or { left, right } => self.visit_binary(left, "OR", right),
            Expr::Not { argument } => {
                let mut fragment = self.visit_scalar(argument)?;
                fragment.negate()?;
                Ok(fragment)
            }
            Expr::IsNull { argument } => Ok(SqlFragment::IsNull(IsNullFragment {
                argument: Box::new(self.visit_scalar(argument)?),
                negated: false,
            })),
            Expr::IsEmpty { argument } => {
                let query = self.visit_subquery(argument)?;
                Ok(SqlFragment::Exists(ExistsFragment {
                    query: Box::new(query),
                    negated: true,
                }))
            }
            Expr::Like {
                argument,
                pattern,
                escape,
            } => Ok(SqlFragment::Like(LikeFragment {
                argument: Box::new(self.visit_scalar(argument)?),
                pattern: Box::new(self.visit_scalar(pattern)?),
                escape: match escape {
                    Some(escape) => Some(Box::new(self.visit_scalar(escape)?)),
                    None => None,
                },
                negated: false,
            })),
            Expr::In { item, list } => {
                let argument = Box::new(self.visit_scalar(item)?);
                let list = list
                    .iter()
                    .map(|e| self.visit_scalar(e))
                    .collect::<Result<Vec<_>>>()?;
                Ok(SqlFragment::In(InFragment {
                    argument,
                    list,
                    negated: false,
                }))
            }
            Expr::Arithmetic { op, arguments } => self.visit_arithmetic(*op, arguments),
            Expr::Case {
                when,
                then,
                otherwise,
            } => self.visit_case(when, then, otherwise.as_deref()),
            // Casts are left to the server's implicit conversions.
            Expr::Cast { argument, .. } => self.visit_scalar(argument),
            Expr::Function { name, arguments } => self.visit_function(name, arguments),
            Expr::Intersect { .. }
            | Expr::Except { .. }
            | Expr::Element { .. }
            | Expr::OfType { .. }
            | Expr::Navigation { .. } => {
                Err(GenerateError::Unsupported(format!("{:?}", expr.kind())))
            }
            Expr::VariableRef { name } => Err(GenerateError::NotImplemented(format!(
                "variable `{name}` used as a value"
            ))),
            Expr::Scan { .. }
            | Expr::Filter { .. }
            | Expr::Project { .. }
            | Expr::Sort { .. }
            | Expr::Skip { .. }
            | Expr::Limit { .. }
            | Expr::Distinct { .. }
            | Expr::Join { .. }
            | Expr::CrossJoin { .. }
            | Expr::UnionAll { .. }
            | Expr::GroupBy { .. } => self.visit_subquery(expr),
        }
    }

    /// Lowers a collection used inside a scalar expression to a subquery.
    fn visit_subquery(&mut self, expr: &Expr) -> Result<SqlFragment> {
        let input = self.visit_relational(expr)?;
        let mut select = self.select_over(input)?;
        if select.columns.is_empty() {
            select.add_default_columns(&mut self.cx)?;
        }
        Ok(SqlFragment::Input(InputFragment::Select(Box::new(select))))
    }

    fn visit_binary(&mut self, left: &Expr, operator: &'static str, right: &Expr) -> Result<SqlFragment> {
        let mut fragment = BinaryFragment::new(
            self.visit_scalar(left)?,
            operator,
            self.visit_scalar(right)?,
        );
        fragment.wrap_left = !left.is_atomic();
        fragment.wrap_right = !right.is_atomic();
        Ok(SqlFragment::Binary(fragment))
    }

    fn visit_arithmetic(&mut self, op: ArithmeticOp, arguments: &[Expr]) -> Result<SqlFragment> {
        match (op, arguments) {
            (ArithmeticOp::UnaryMinus, [argument]) => Ok(SqlFragment::List(vec![
                SqlFragment::literal("-("),
                self.visit_scalar(argument)?,
                SqlFragment::literal(")"),
            ])),
            (ArithmeticOp::UnaryMinus, _) => Err(GenerateError::MalformedTree(String::from(
                "unary minus takes one argument",
            ))),
            (op, [left, right]) => self.visit_binary(left, op.as_str(), right),
            (op, _) => Err(GenerateError::MalformedTree(format!(
                "{op:?} takes two arguments"
            ))),
        }
    }

    fn visit_case(&mut self, when: &[Expr], then: &[Expr], otherwise: Option<&Expr>) -> Result<SqlFragment> {
        if when.len() != then.len() || when.is_empty() {
            return Err(GenerateError::MalformedTree(String::from(
                "CASE needs matching WHEN and THEN lists",
            )));
        }
        let mut fragment = CaseFragment {
            when: Vec::with_capacity(when.len()),
            then: Vec::with_capacity(then.len()),
            otherwise: None,
        };
        for (w, t) in when.iter().zip(then) {
            fragment.when.push(self.visit_scalar(w)?);
            fragment.then.push(self.visit_scalar(t)?);
        }
        // ELSE NULL is the default.
        if let Some(otherwise) = otherwise.filter(|e| !matches!(e, Expr::Null)) {
            fragment.otherwise = Some(Box::new(self.visit_scalar(otherwise)?));
        }
        Ok(SqlFragment::Case(fragment))
    }

    /// Numbers and booleans are written inline; everything else is bound as
    /// a generated parameter.
    pub(super) fn visit_constant(&mut self, value: &SqlValue) -> SqlFragment {
        let (true_literal, false_literal) = self.dialect.boolean_literals();
        if let Some(literal) = value.inline_literal(true_literal, false_literal) {
            return SqlFragment::Literal(literal);
        }
        let name = self.dialect.generated_parameter_name(self.parameters.len());
        trace!(parameter = %name, value_type = value.type_name(), "bound constant");
        self.parameters.push(Parameter {
            name: name.clone(),
            value: value.clone(),
        });
        SqlFragment::Literal(name)
    }

    /// Resolves a property reference to a column of a visible input.
    fn visit_property(&mut self, expr: &Expr) -> Result<ColumnFragment> {
        let chain = property_chain(expr)?;
        let mut column = ColumnFragment {
            column_name: chain.last().cloned(),
            properties: chain,
            ..ColumnFragment::default()
        };

        let input = self.cx.scope.find_input_from_properties(&column.properties)?;
        column.table_name = input.name().map(String::from);
        match input {
            InputFragment::Table(_) => {
                // A table renamed by fusion is addressed through the fused
                // select's aliases.
                let fused = input.name().and_then(|name| self.cx.scope.get_fragment(name));
                if let Some(InputFragment::Select(fused)) = fused {
                    let source = fused.columns.iter().find(|c| {
                        c.column_alias.is_some() && c.column_alias == column.column_name
                    });
                    if let Some(source) = source {
                        column.column_name.clone_from(&source.column_name);
                    }
                }
            }
            InputFragment::Select(select) => {
                select.has_different_name_for_column(&mut column);
            }
            InputFragment::Union(union) => {
                union.has_different_name_for_column(&mut column);
            }
            InputFragment::Join(_) => {}
        }
        Ok(column)
    }
}

/// Flattens `v.a.b` into `["v", "a", "b"]`.
fn property_chain(expr: &Expr) -> Result<Vec<String>> {
    match expr {
        Expr::VariableRef { name } => Ok(vec![name.clone()]),
        Expr::Property { instance, property } => {
            let mut chain = property_chain(instance)?;
            chain.push(property.clone());
            Ok(chain)
        }
        other => Err(GenerateError::NotImplemented(format!(
            "property of a {:?} expression",
            other.kind()
        ))),
    }
}
