//! Entity-set metadata.
//!
//! The generator only needs a thin slice of the model: where an entity set
//! lives, which properties it declares (in declaration order, used for default
//! column lists) and which of them form the key (used by DML returning
//! clauses). `#[derive(EntitySet)]` implements [`EntitySet`] for a struct.

use serde::{Deserialize, Serialize};

use crate::tree::Expr;

/// Storage description of one entity set, as carried by a `Scan` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySetRef {
    /// Schema name, if the table is schema-qualified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Declared properties, in declaration order.
    pub properties: Vec<String>,
    /// Key properties.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Store query standing in for the table (a view body or custom SQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defining_query: Option<String>,
}

impl EntitySetRef {
    /// Creates a reference to `table` declaring `properties`.
    #[must_use]
    pub fn new(table: impl Into<String>, properties: &[&str]) -> Self {
        Self {
            schema: None,
            table: table.into(),
            properties: properties.iter().map(|p| String::from(*p)).collect(),
            keys: vec![],
            defining_query: None,
        }
    }

    /// Sets the schema name.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the key properties.
    #[must_use]
    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|k| String::from(*k)).collect();
        self
    }

    /// Replaces the table with a defining query.
    #[must_use]
    pub fn with_defining_query(mut self, query: impl Into<String>) -> Self {
        self.defining_query = Some(query.into());
        self
    }

    /// Returns a `Scan` expression over this entity set.
    #[must_use]
    pub fn scan(&self) -> Expr {
        Expr::Scan {
            target: self.clone(),
        }
    }
}

/// Trait for entity-set metadata.
///
/// Implemented by `#[derive(EntitySet)]`.
pub trait EntitySet {
    /// The SQL table name.
    const TABLE: &'static str;

    /// The schema name, if any.
    const SCHEMA: Option<&'static str>;

    /// Declared property (column) names, in declaration order.
    const PROPERTIES: &'static [&'static str];

    /// Key property names.
    const KEYS: &'static [&'static str];

    /// Returns the storage description of this entity set.
    #[must_use]
    fn entity_set() -> EntitySetRef {
        let set = EntitySetRef::new(Self::TABLE, Self::PROPERTIES).with_keys(Self::KEYS);
        match Self::SCHEMA {
            Some(schema) => set.with_schema(schema),
            None => set,
        }
    }

    /// Returns a `Scan` expression over this entity set.
    #[must_use]
    fn scan() -> Expr {
        Self::entity_set().scan()
    }
}
