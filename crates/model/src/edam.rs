//! The EDAM model value and its graph projection.

use crate::error::ModelError;
use crate::transition::{Param, Transition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A declarative finite-state access-control model.
///
/// Source of truth is the flat transition list; [`Edam::adjacency`]
/// derives a read-only directed-multigraph projection for path
/// enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edam {
    pub name: String,
    pub states: Vec<String>,
    pub transitions: Vec<Transition>,
    pub initial_state: String,
    #[serde(default)]
    pub final_states: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub variables: Vec<Param>,
    /// Constructor-time external contract dependencies.
    #[serde(default)]
    pub contract_data_types: Vec<Param>,
}

/// Adjacency projection: source state -> indices into
/// `Edam::transitions`, in declaration order.
#[derive(Debug, Clone)]
pub struct Adjacency {
    pub outgoing: BTreeMap<String, Vec<usize>>,
}

impl Adjacency {
    /// Transition indices leaving `state` (empty slice if none).
    pub fn from_state(&self, state: &str) -> &[usize] {
        self.outgoing.get(state).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Edam {
    /// Deserialize a model from a JSON value.
    pub fn from_json(value: &serde_json::Value) -> Result<Edam, ModelError> {
        serde_json::from_value(value.clone()).map_err(|e| ModelError::InvalidInput(e.to_string()))
    }

    /// Check the state-set invariant: every transition's source and
    /// target state, and the initial state, belong to the state set.
    pub fn validate(&self) -> Result<(), ModelError> {
        let states: BTreeSet<&str> = self.states.iter().map(String::as_str).collect();
        if !states.contains(self.initial_state.as_str()) {
            return Err(ModelError::UnknownInitialState(self.initial_state.clone()));
        }
        for t in &self.transitions {
            for state in [&t.source_state, &t.target_state] {
                if !states.contains(state.as_str()) {
                    return Err(ModelError::UnknownState {
                        transition: t.operation.clone(),
                        state: state.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the adjacency projection once; callers reuse it across
    /// path enumerations.
    pub fn adjacency(&self) -> Adjacency {
        let mut outgoing: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for state in &self.states {
            outgoing.entry(state.clone()).or_default();
        }
        for (i, t) in self.transitions.iter().enumerate() {
            outgoing.entry(t.source_state.clone()).or_default().push(i);
        }
        Adjacency { outgoing }
    }

    /// Non-deploy transitions, in declaration order.
    pub fn regular_transitions(&self) -> Vec<&Transition> {
        self.transitions.iter().filter(|t| !t.is_deploy()).collect()
    }

    /// Deploy/start transitions, in declaration order.
    pub fn deploy_transitions(&self) -> Vec<&Transition> {
        self.transitions.iter().filter(|t| t.is_deploy()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exp::Exp;
    use crate::transition::RoleMap;

    fn make_transition(source: &str, target: &str, operation: &str) -> Transition {
        Transition {
            source_state: source.to_string(),
            target_state: target.to_string(),
            operation: operation.to_string(),
            guard: Exp::bool(true),
            external_calls: vec![],
            roles: RoleMap::new(),
            role_updates: RoleMap::new(),
            participants: vec![],
            initiator: "a".to_string(),
            parameters: vec![],
            assignments: vec![],
        }
    }

    fn make_edam(transitions: Vec<Transition>) -> Edam {
        Edam {
            name: "Test".to_string(),
            states: vec!["q0".to_string(), "q1".to_string(), "q2".to_string()],
            transitions,
            initial_state: "q0".to_string(),
            final_states: vec!["q2".to_string()],
            roles: vec!["Owner".to_string()],
            participants: vec!["a".to_string()],
            variables: vec![],
            contract_data_types: vec![],
        }
    }

    #[test]
    fn test_validate_ok() {
        let edam = make_edam(vec![make_transition("q0", "q1", "step")]);
        assert!(edam.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_target_state() {
        let edam = make_edam(vec![make_transition("q0", "q9", "step")]);
        let err = edam.validate().unwrap_err();
        assert!(matches!(err, ModelError::UnknownState { .. }));
        assert!(err.to_string().contains("q9"));
    }

    #[test]
    fn test_validate_unknown_initial_state() {
        let mut edam = make_edam(vec![]);
        edam.initial_state = "missing".to_string();
        assert!(matches!(
            edam.validate(),
            Err(ModelError::UnknownInitialState(_))
        ));
    }

    #[test]
    fn test_adjacency_projection() {
        let edam = make_edam(vec![
            make_transition("q0", "q1", "step"),
            make_transition("q0", "q2", "skip"),
            make_transition("q1", "q2", "finish"),
        ]);
        let adj = edam.adjacency();
        assert_eq!(adj.from_state("q0"), &[0, 1]);
        assert_eq!(adj.from_state("q1"), &[2]);
        assert!(adj.from_state("q2").is_empty());
        assert!(adj.from_state("nowhere").is_empty());
    }

    #[test]
    fn test_deploy_split() {
        let edam = make_edam(vec![
            make_transition("q0", "q1", "deploy"),
            make_transition("q1", "q2", "step"),
        ]);
        assert_eq!(edam.deploy_transitions().len(), 1);
        assert_eq!(edam.regular_transitions().len(), 1);
    }

    #[test]
    fn test_from_json() {
        let value = serde_json::json!({
            "name": "Auction",
            "states": ["q0", "q1"],
            "initial_state": "q0",
            "transitions": [{
                "source_state": "q0",
                "target_state": "q1",
                "operation": "deploy",
                "guard": {"Val": true},
                "initiator": "owner"
            }]
        });
        let edam = Edam::from_json(&value).unwrap();
        assert_eq!(edam.name, "Auction");
        assert_eq!(edam.transitions.len(), 1);
        assert!(edam.validate().is_ok());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let value = serde_json::json!({"name": "x"});
        assert!(matches!(
            Edam::from_json(&value),
            Err(ModelError::InvalidInput(_))
        ));
    }
}
