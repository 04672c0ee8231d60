//! Name resolution state of one generation call.
//!
//! [`Scope`] maps the aliases visible while a statement is being built to
//! snapshots of the inputs they name. [`GenContext`] bundles the scope with
//! the operator stack that tells default-column expansion whether it runs
//! under a join or a union.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{GenerateError, Result};
use crate::fragment::InputFragment;

/// Set operator a default-column expansion runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    /// Join: columns keep their aliases.
    Join,
    /// Union: columns are read under their source names.
    Union,
}

/// Aliases visible for column resolution.
#[derive(Debug, Default)]
pub struct Scope {
    inputs: HashMap<String, InputFragment>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `input` under `name`, replacing any prior registration.
    pub fn add(&mut self, name: &str, input: InputFragment) {
        trace!(name, kind = input.kind_name(), scoped = input.is_scoped(), "scope add");
        self.inputs.insert(String::from(name), input);
    }

    /// Removes the registration of `name`.
    pub fn remove(&mut self, name: &str) -> Option<InputFragment> {
        trace!(name, "scope remove");
        self.inputs.remove(name)
    }

    /// Removes `input` and, recursively, its children.
    pub fn remove_input(&mut self, input: &InputFragment) {
        if let Some(name) = input.name() {
            self.remove(name);
        }
        if let Some(left) = input.left() {
            self.remove_input(left);
        }
        if let Some(right) = input.right() {
            self.remove_input(right);
        }
    }

    /// Returns the input registered under `name`.
    #[must_use]
    pub fn get_fragment(&self, name: &str) -> Option<&InputFragment> {
        self.inputs.get(name)
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Finds the input owning the column reached through `chain`.
    ///
    /// Qualifiers are walked from the outermost alias inward and the
    /// innermost visible owner wins: a scoped input owns the column itself,
    /// an unscoped select hands it to its FROM, unscoped joins and unions are
    /// passed through.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnresolvedProperty`] when no qualifier names a
    /// visible input.
    pub fn find_input_from_properties(&self, chain: &[String]) -> Result<&InputFragment> {
        let qualifiers = chain.split_last().map_or(&[][..], |(_, rest)| rest);
        let mut found = None;
        for qualifier in qualifiers {
            let Some(input) = self.inputs.get(qualifier) else {
                continue;
            };
            if input.is_scoped() {
                found = Some(input);
            } else if let InputFragment::Select(select) = input {
                if let Some(from) = &select.from {
                    found = Some(from);
                }
            }
        }
        found.ok_or_else(|| GenerateError::UnresolvedProperty(chain.join(".")))
    }
}

/// Mutable state threaded through one generation call.
#[derive(Debug, Default)]
pub struct GenContext {
    /// Visible aliases.
    pub scope: Scope,
    ops: Vec<OpType>,
}

impl GenContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost operator; `Join` when none is pending.
    #[must_use]
    pub fn top_op(&self) -> OpType {
        self.ops.last().copied().unwrap_or(OpType::Join)
    }

    /// Runs `f` with `op` pushed on the operator stack.
    pub fn with_op<T>(&mut self, op: OpType, f: impl FnOnce(&mut Self) -> T) -> T {
        self.push_op(op);
        let result = f(self);
        self.pop_op();
        result
    }

    pub(crate) fn push_op(&mut self, op: OpType) {
        self.ops.push(op);
    }

    pub(crate) fn pop_op(&mut self) {
        self.ops.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{JoinFragment, TableFragment};
    use crate::select::SelectStatement;
    use crate::tree::JoinKind;

    fn table(name: &str) -> InputFragment {
        InputFragment::Table(TableFragment {
            schema: None,
            table: String::from("Customers"),
            name: Some(String::from(name)),
            properties: vec![String::from("Id")],
            defining_query: None,
        })
    }

    fn chain(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| String::from(*p)).collect()
    }

    #[test]
    fn test_scoped_input_resolves_to_itself() {
        let mut scope = Scope::new();
        scope.add("Extent1", table("Extent1"));
        let input = scope.find_input_from_properties(&chain(&["Extent1", "Id"])).unwrap();
        assert_eq!(input.name(), Some("Extent1"));
    }

    #[test]
    fn test_unscoped_select_resolves_to_from() {
        let mut scope = Scope::new();
        let mut select = SelectStatement::from_input(table("Extent1"));
        select.name = Some(String::from("Filter1"));
        scope.add("Filter1", InputFragment::Select(Box::new(select)));
        let input = scope.find_input_from_properties(&chain(&["Filter1", "Id"])).unwrap();
        assert_eq!(input.name(), Some("Extent1"));
    }

    #[test]
    fn test_innermost_visible_owner_wins() {
        let mut scope = Scope::new();
        let join = InputFragment::Join(Box::new(JoinFragment {
            kind: JoinKind::Inner,
            left: table("Extent1"),
            right: table("Extent2"),
            condition: None,
            name: Some(String::from("Join1")),
        }));
        scope.add("Extent1", table("Extent1"));
        scope.add("Extent2", table("Extent2"));
        scope.add("Join1", join.clone());
        let input = scope
            .find_input_from_properties(&chain(&["Join1", "Extent2", "Id"]))
            .unwrap();
        assert_eq!(input.name(), Some("Extent2"));

        scope.remove_input(&join);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_unresolved_chain() {
        let scope = Scope::new();
        assert_eq!(
            scope.find_input_from_properties(&chain(&["Nope", "Id"])).unwrap_err(),
            GenerateError::UnresolvedProperty(String::from("Nope.Id"))
        );
    }

    #[test]
    fn test_operator_stack_is_balanced() {
        let mut cx = GenContext::new();
        assert_eq!(cx.top_op(), OpType::Join);
        let result: Result<()> = cx.with_op(OpType::Union, |cx| {
            assert_eq!(cx.top_op(), OpType::Union);
            Err(GenerateError::NotImplemented(String::from("x")))
        });
        assert!(result.is_err());
        assert!(cx.ops.is_empty());
    }
}
