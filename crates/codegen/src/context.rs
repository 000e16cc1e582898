//! Mutable state for one compilation run.
//!
//! Everything a single `generate_contract` call accumulates lives
//! here and is threaded `&mut` through the pipeline stages. One
//! context per run; contexts are never shared across compilations.

use std::collections::{BTreeMap, BTreeSet};

/// Built-in helper functions whose Solidity snippets are included only
/// when an expression actually uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Builtin {
    Sum,
    Min,
    Max,
    GetAmountOut,
}

impl Builtin {
    /// The operation name as it appears in model expressions.
    pub fn from_operation(op: &str) -> Option<Builtin> {
        match op {
            "sum" => Some(Builtin::Sum),
            "min" => Some(Builtin::Min),
            "max" => Some(Builtin::Max),
            "get_amount_out" => Some(Builtin::GetAmountOut),
            _ => None,
        }
    }
}

/// Per-run accumulator state.
#[derive(Debug, Default)]
pub struct GenContext {
    /// Builtin helpers referenced by lowered expressions.
    pub used_builtins: BTreeSet<Builtin>,
    /// Contract-level field declarations, in discovery order.
    pub contract_fields: Vec<String>,
    /// Variable name -> declared EDAM type, for the evaluator's
    /// address-cast rule.
    pub field_types: BTreeMap<String, String>,
    /// `_roles` array-constructor arities observed by the role handler.
    pub role_array_arities: BTreeSet<usize>,
}

impl GenContext {
    pub fn new() -> Self {
        GenContext::default()
    }

    /// Add a field declaration once.
    pub fn add_contract_field(&mut self, declaration: &str) {
        if !self.contract_fields.iter().any(|f| f == declaration) {
            self.contract_fields.push(declaration.to_string());
        }
    }

    /// Ensure the `_permissions` mapping is declared exactly once.
    pub fn ensure_permissions_field(&mut self) {
        if !self.contract_fields.iter().any(|f| f.contains("_permissions")) {
            self.contract_fields
                .push(crate::assemble::PERMISSIONS_DECLARATION.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_from_operation() {
        assert_eq!(Builtin::from_operation("sum"), Some(Builtin::Sum));
        assert_eq!(
            Builtin::from_operation("get_amount_out"),
            Some(Builtin::GetAmountOut)
        );
        assert_eq!(Builtin::from_operation("update_map"), None);
    }

    #[test]
    fn test_fields_added_once() {
        let mut ctx = GenContext::new();
        ctx.add_contract_field("uint public x");
        ctx.add_contract_field("uint public x");
        assert_eq!(ctx.contract_fields.len(), 1);
    }

    #[test]
    fn test_permissions_field_added_once() {
        let mut ctx = GenContext::new();
        ctx.ensure_permissions_field();
        ctx.ensure_permissions_field();
        assert_eq!(ctx.contract_fields.len(), 1);
        assert!(ctx.contract_fields[0].contains("_permissions"));
    }
}
