//! Transitions and the tri-state role model.

use crate::exp::Exp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status of a (participant, role) pair on a transition.
///
/// `Granted` and `Revoked` constrain (in preconditions) or mutate (in
/// role updates) the pair; `Unconstrained` pairs are simply absent
/// from serialized models but may appear explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleMode {
    Granted,
    Revoked,
    Unconstrained,
}

/// participant id -> role name -> mode. Insertion order is irrelevant;
/// BTreeMap keeps iteration deterministic.
pub type RoleMap = BTreeMap<String, BTreeMap<String, RoleMode>>;

/// A typed parameter: EDAM type name plus variable name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
}

/// One assignment performed when a transition fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub target: String,
    pub value: Exp,
}

/// One guarded state-to-state step.
///
/// Created once when the model is constructed and immutable
/// thereafter. External calls are stored in execution order; each is
/// the canonical `Eq(ContractWrite, Val(Bool(expected)))` form (see
/// [`Exp::as_external_call`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub source_state: String,
    pub target_state: String,
    pub operation: String,
    pub guard: Exp,
    #[serde(default)]
    pub external_calls: Vec<Exp>,
    /// Role preconditions: participant -> role -> mode.
    #[serde(default)]
    pub roles: RoleMap,
    /// Role postconditions applied when the transition fires.
    #[serde(default)]
    pub role_updates: RoleMap,
    #[serde(default)]
    pub participants: Vec<String>,
    pub initiator: String,
    #[serde(default)]
    pub parameters: Vec<Param>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Transition {
    /// Deploy/start transitions compile into the contract constructor
    /// rather than a callable function.
    pub fn is_deploy(&self) -> bool {
        let op = self.operation.to_ascii_lowercase();
        op == "deploy" || op == "start"
    }

    /// Participants plus the initiator, in declaration order.
    pub fn participants_with_initiator(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.participants.iter().map(String::as_str).collect();
        all.push(self.initiator.as_str());
        all
    }
}
