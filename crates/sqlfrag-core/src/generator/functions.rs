//! Canonical function and aggregate mapping, and LIKE promotion of string
//! searches.

use super::SqlGenerator;
use crate::error::{GenerateError, Result};
use crate::fragment::{BinaryFragment, FunctionFragment, LikeFragment, SqlFragment};
use crate::tree::{Aggregate, ComparisonOp, Expr};
use crate::value::SqlValue;

const CANONICAL_PREFIX: &str = "Edm.";

/// Store spelling of a canonical function.
enum Mapped {
    /// `NAME(args)`.
    Call(&'static str),
    /// `NAME()` ignoring arguments.
    Niladic(&'static str),
    /// `a <op> b`.
    Operator(&'static str),
}

fn canonical_function(name: &str) -> Option<Mapped> {
    let mapped = match name {
        "ToUpper" => Mapped::Call("UPPER"),
        "ToLower" => Mapped::Call("LOWER"),
        "Length" => Mapped::Call("CHAR_LENGTH"),
        "Trim" => Mapped::Call("TRIM"),
        "LTrim" => Mapped::Call("LTRIM"),
        "RTrim" => Mapped::Call("RTRIM"),
        "Concat" => Mapped::Call("CONCAT"),
        "Substring" => Mapped::Call("SUBSTRING"),
        "Replace" => Mapped::Call("REPLACE"),
        "Reverse" => Mapped::Call("REVERSE"),
        "Left" => Mapped::Call("LEFT"),
        "Right" => Mapped::Call("RIGHT"),
        "IndexOf" => Mapped::Call("LOCATE"),
        "Abs" => Mapped::Call("ABS"),
        "Ceiling" => Mapped::Call("CEILING"),
        "Floor" => Mapped::Call("FLOOR"),
        "Round" => Mapped::Call("ROUND"),
        "Truncate" => Mapped::Call("TRUNCATE"),
        "Power" => Mapped::Call("POW"),
        "Year" => Mapped::Call("YEAR"),
        "Month" => Mapped::Call("MONTH"),
        "Day" => Mapped::Call("DAY"),
        "Hour" => Mapped::Call("HOUR"),
        "Minute" => Mapped::Call("MINUTE"),
        "Second" => Mapped::Call("SECOND"),
        "CurrentDateTime" => Mapped::Niladic("NOW"),
        "CurrentUtcDateTime" => Mapped::Niladic("UTC_TIMESTAMP"),
        "NewGuid" => Mapped::Niladic("UUID"),
        "BitwiseAnd" => Mapped::Operator("&"),
        "BitwiseOr" => Mapped::Operator("|"),
        "BitwiseXor" => Mapped::Operator("^"),
        _ => return None,
    };
    Some(mapped)
}

fn aggregate_function(name: &str) -> Option<&'static str> {
    let name = name.strip_prefix(CANONICAL_PREFIX).unwrap_or(name);
    match name {
        "Count" | "BigCount" => Some("COUNT"),
        "Sum" => Some("SUM"),
        "Avg" | "Average" => Some("AVG"),
        "Min" => Some("MIN"),
        "Max" => Some("MAX"),
        _ => None,
    }
}

/// Escapes LIKE wildcards and quoting characters of a pattern written as a
/// string literal.
fn escape_like_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\0' => escaped.push_str("\\0"),
            '%' => escaped.push_str("\\%"),
            '_' => escaped.push_str("\\_"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn text_constant(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Constant {
            value: SqlValue::Text(text),
        } => Some(text),
        _ => None,
    }
}

impl SqlGenerator<'_> {
    /// Lowers a function call. `Edm.`-prefixed names are canonical functions
    /// mapped to store functions; other names are store functions written
    /// verbatim.
    pub(super) fn visit_function(&mut self, name: &str, arguments: &[Expr]) -> Result<SqlFragment> {
        let Some(canonical) = name.strip_prefix(CANONICAL_PREFIX) else {
            return Ok(SqlFragment::Function(FunctionFragment {
                name: String::from(name),
                arguments: self.visit_arguments(arguments)?,
                distinct: false,
            }));
        };
        if let Some(like) = self.visit_string_search(canonical, arguments)? {
            return Ok(like);
        }
        let Some(mapped) = canonical_function(canonical) else {
            return Err(GenerateError::NotImplemented(format!(
                "canonical function {name}"
            )));
        };
        match mapped {
            Mapped::Call(store) => Ok(SqlFragment::Function(FunctionFragment {
                name: String::from(store),
                arguments: self.visit_arguments(arguments)?,
                distinct: false,
            })),
            Mapped::Niladic(store) => Ok(SqlFragment::Function(FunctionFragment {
                name: String::from(store),
                arguments: vec![],
                distinct: false,
            })),
            Mapped::Operator(operator) => match arguments {
                [left, right] => {
                    let mut fragment = BinaryFragment::new(
                        self.visit_scalar(left)?,
                        operator,
                        self.visit_scalar(right)?,
                    );
                    fragment.wrap_left = !left.is_atomic();
                    fragment.wrap_right = !right.is_atomic();
                    Ok(SqlFragment::Binary(fragment))
                }
                _ => Err(GenerateError::MalformedTree(format!(
                    "{name} takes two arguments"
                ))),
            },
        }
    }

    fn visit_arguments(&mut self, arguments: &[Expr]) -> Result<Vec<SqlFragment>> {
        arguments.iter().map(|a| self.visit_scalar(a)).collect()
    }

    /// Lowers an aggregate of a group-by.
    pub(super) fn visit_aggregate(&mut self, aggregate: &Aggregate) -> Result<SqlFragment> {
        let Some(function) = aggregate_function(&aggregate.function) else {
            return Err(GenerateError::NotImplemented(format!(
                "aggregate {}",
                aggregate.function
            )));
        };
        let arguments = if aggregate.arguments.is_empty() {
            vec![SqlFragment::literal("*")]
        } else {
            self.visit_arguments(&aggregate.arguments)?
        };
        Ok(SqlFragment::Function(FunctionFragment {
            name: String::from(function),
            arguments,
            distinct: aggregate.distinct,
        }))
    }

    /// `StartsWith`, `EndsWith` and `Contains` become LIKE. A constant
    /// search string is inlined as an escaped pattern literal; anything else
    /// is concatenated with the wildcards.
    fn visit_string_search(&mut self, name: &str, arguments: &[Expr]) -> Result<Option<SqlFragment>> {
        let (leading, trailing) = match name {
            "StartsWith" => (false, true),
            "EndsWith" => (true, false),
            "Contains" => (true, true),
            _ => return Ok(None),
        };
        let [argument, search] = arguments else {
            return Err(GenerateError::MalformedTree(format!(
                "{CANONICAL_PREFIX}{name} takes two arguments"
            )));
        };
        let argument = self.visit_scalar(argument)?;
        let pattern = if let Some(text) = text_constant(search) {
            let leading = if leading { "%" } else { "" };
            let trailing = if trailing { "%" } else { "" };
            SqlFragment::Literal(format!(
                "'{leading}{}{trailing}'",
                escape_like_literal(text)
            ))
        } else {
            let mut parts = vec![];
            if leading {
                parts.push(SqlFragment::literal("'%'"));
            }
            parts.push(self.visit_scalar(search)?);
            if trailing {
                parts.push(SqlFragment::literal("'%'"));
            }
            SqlFragment::Function(FunctionFragment {
                name: String::from("CONCAT"),
                arguments: parts,
                distinct: false,
            })
        };
        Ok(Some(like(argument, pattern)))
    }

    /// `Edm.IndexOf(<text>, x) = 1` is the prefix test `x LIKE '<text>%'` and
    /// `Edm.IndexOf(<text>, x) > 0` is the containment test `x LIKE '%<text>%'`.
    pub(super) fn try_promote_to_like(
        &mut self,
        op: ComparisonOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Option<SqlFragment>> {
        let Expr::Function { name, arguments } = left else {
            return Ok(None);
        };
        if name != "Edm.IndexOf" {
            return Ok(None);
        }
        let leading = match (op, right) {
            (ComparisonOp::Eq, Expr::Constant { value: SqlValue::Int(1) }) => "",
            (ComparisonOp::Gt, Expr::Constant { value: SqlValue::Int(0) }) => "%",
            _ => return Ok(None),
        };
        let [search, argument] = arguments.as_slice() else {
            return Ok(None);
        };
        let Some(text) = text_constant(search) else {
            return Ok(None);
        };
        let pattern = SqlFragment::Literal(format!("'{leading}{}%'", escape_like_literal(text)));
        Ok(Some(like(self.visit_scalar(argument)?, pattern)))
    }
}

fn like(argument: SqlFragment, pattern: SqlFragment) -> SqlFragment {
    SqlFragment::Like(LikeFragment {
        argument: Box::new(argument),
        pattern: Box::new(pattern),
        escape: None,
        negated: false,
    })
}
