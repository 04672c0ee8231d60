//! Constant values carried by command trees and generated parameters.
//!
//! Numeric and boolean constants are written inline; everything else becomes a
//! named parameter so the driver takes care of quoting.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A constant value appearing in a command tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Date and time without zone.
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// Returns the inline literal for values that never need a parameter.
    ///
    /// `None` means the value must be bound as a parameter.
    #[must_use]
    pub fn inline_literal(&self, true_literal: &str, false_literal: &str) -> Option<String> {
        match self {
            Self::Null => Some(String::from("NULL")),
            Self::Bool(b) => Some(String::from(if *b { true_literal } else { false_literal })),
            Self::Int(n) => Some(format!("{n}")),
            Self::Float(f) if f.is_finite() => {
                let text = format!("{f}");
                if text.contains(['.', 'e', 'E']) {
                    Some(text)
                } else {
                    Some(format!("{text}.0"))
                }
            }
            Self::Float(_) | Self::Text(_) | Self::Blob(_) | Self::DateTime(_) => None,
        }
    }

    /// Returns a short name of the value's type, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::DateTime(_) => "datetime",
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::DateTime(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// A generated parameter bound alongside the SQL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Placeholder name as it appears in the SQL text.
    pub name: String,
    /// Bound value.
    pub value: SqlValue,
}
