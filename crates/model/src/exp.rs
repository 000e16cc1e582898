//! Expression AST for EDAM guards, assignments, and external calls.
//!
//! Expressions are immutable finite trees. Every variant's children are
//! themselves valid `Exp` trees except the leaf variants (`Val`,
//! `SelfRef`, `Var`, `Participant`). Each `Transition` exclusively owns
//! the trees in its guard, assignments, and external-call list; there
//! is no sharing between transitions.

use serde::{Deserialize, Serialize};

/// A literal value appearing in an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// An EDAM expression.
///
/// The two call-marker variants, [`Exp::ContractRead`] and
/// [`Exp::ContractWrite`], represent interactions with another deployed
/// contract. A write call never appears bare in a guard: the model
/// builder wraps it as `Eq(ContractWrite { .. }, Val(Bool(expected)))`
/// so the expected outcome travels with the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Exp {
    // Binary arithmetic
    Add { left: Box<Exp>, right: Box<Exp> },
    Sub { left: Box<Exp>, right: Box<Exp> },
    Mul { left: Box<Exp>, right: Box<Exp> },
    Div { left: Box<Exp>, right: Box<Exp> },

    // Binary comparison
    Eq { left: Box<Exp>, right: Box<Exp> },
    Ne { left: Box<Exp>, right: Box<Exp> },
    Lt { left: Box<Exp>, right: Box<Exp> },
    Le { left: Box<Exp>, right: Box<Exp> },
    Gt { left: Box<Exp>, right: Box<Exp> },
    Ge { left: Box<Exp>, right: Box<Exp> },

    // Boolean connectives
    And { left: Box<Exp>, right: Box<Exp> },
    Or { left: Box<Exp>, right: Box<Exp> },
    Not { operand: Box<Exp> },

    /// Literal value leaf.
    Val(Literal),
    /// The generated contract's own address.
    SelfRef,
    /// Reference to a declared model variable.
    Var(String),
    /// Participant-identity reference; lowers to the caller sentinel,
    /// the contract self-reference, or the literal identifier.
    Participant(String),

    /// Indexed map access: `map[key]`.
    MapIndex { map: Box<Exp>, key: Box<Exp> },
    /// Indexed list access: `list[index]`.
    ListIndex { list: Box<Exp>, index: Box<Exp> },

    /// Generic function call: a builtin mutation/math operation or a
    /// model-level operation name with ordered arguments.
    Call { operation: String, arguments: Vec<Exp> },

    /// Read of another contract's state.
    ContractRead { contract: String, expression: Box<Exp> },
    /// Mutating call to another contract's operation.
    ContractWrite {
        contract: String,
        operation: String,
        participant_args: Vec<Exp>,
        data_args: Vec<Exp>,
    },
}

impl Exp {
    /// Convenience constructor for a boolean literal.
    pub fn bool(v: bool) -> Exp {
        Exp::Val(Literal::Bool(v))
    }

    /// Convenience constructor for an integer literal.
    pub fn int(v: i64) -> Exp {
        Exp::Val(Literal::Int(v))
    }

    /// Convenience constructor for a variable reference.
    pub fn var(name: &str) -> Exp {
        Exp::Var(name.to_string())
    }

    /// If this expression is the canonical external-call form
    /// (`Eq(ContractWrite, Val(Bool(expected)))`), return the write
    /// call and its expected outcome.
    pub fn as_external_call(&self) -> Option<(&Exp, bool)> {
        if let Exp::Eq { left, right } = self {
            if matches!(left.as_ref(), Exp::ContractWrite { .. }) {
                if let Exp::Val(Literal::Bool(expected)) = right.as_ref() {
                    return Some((left.as_ref(), *expected));
                }
            }
        }
        None
    }

    /// The `(contract, operation)` signature of this external call,
    /// if it is one.
    pub fn call_signature(&self) -> Option<(&str, &str)> {
        let (call, _) = self.as_external_call()?;
        if let Exp::ContractWrite {
            contract, operation, ..
        } = call
        {
            Some((contract.as_str(), operation.as_str()))
        } else {
            None
        }
    }
}
