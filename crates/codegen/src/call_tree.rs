//! Shared decision tree over a group's external-call sequences.
//!
//! When every transition in a group starts with the same external call
//! signature, the calls are merged into one nested try/catch tree
//! instead of one independent block per transition. Construction is
//! purely structural; emission lowers through the expression
//! evaluator.

use crate::body::transition_body;
use crate::context::GenContext;
use crate::error::CodegenError;
use crate::expr::lower;
use edam_model::{Exp, Transition};

/// One node per merged call signature. The success side either nests
/// deeper or terminates in a representative transition; the failure
/// side always terminates.
#[derive(Debug)]
pub struct CallTree<'a> {
    /// Representative external-call expression for this depth.
    pub call: &'a Exp,
    pub success: Option<Box<CallTree<'a>>>,
    pub success_leaf: Option<&'a Transition>,
    pub failure_leaf: Option<&'a Transition>,
}

/// Build a merged call tree for a group, or `None` when the group's
/// calls cannot be merged and each transition needs its own block.
pub fn build<'a>(transitions: &[&'a Transition]) -> Option<CallTree<'a>> {
    if transitions.is_empty() || transitions.iter().any(|t| t.external_calls.is_empty()) {
        return None;
    }
    build_at(transitions, 0)
}

fn build_at<'a>(transitions: &[&'a Transition], depth: usize) -> Option<CallTree<'a>> {
    let first_call = transitions[0].external_calls.get(depth)?;
    let signature = first_call.call_signature()?;

    let mut success = Vec::new();
    let mut failure = Vec::new();
    for transition in transitions {
        let call = transition.external_calls.get(depth)?;
        let (_, expected) = call.as_external_call()?;
        if call.call_signature()? != signature {
            return None;
        }
        if expected {
            success.push(*transition);
        } else {
            failure.push(*transition);
        }
    }

    // Success-expecting transitions with a deeper call continue the
    // tree; the rest terminate here. Failure-expecting transitions
    // always terminate: after an unexpected outcome no further chained
    // calls are attempted.
    let continuing: Vec<&Transition> = success
        .iter()
        .copied()
        .filter(|t| t.external_calls.len() > depth + 1)
        .collect();

    let (child, success_leaf) = if continuing.is_empty() {
        (None, success.first().copied())
    } else {
        match build_at(&continuing, depth + 1) {
            Some(subtree) => (Some(Box::new(subtree)), None),
            // Divergent deeper signatures stop the merge at this
            // depth; the branch falls back to a terminal leaf.
            None => (None, success.first().copied()),
        }
    };

    Some(CallTree {
        call: first_call,
        success: child,
        success_leaf,
        failure_leaf: failure.first().copied(),
    })
}

impl<'a> CallTree<'a> {
    /// Emit the nested try/catch source for this tree. The first line
    /// carries no leading indent; nested lines are indented one level
    /// per call depth. `caller` is the group's initiator.
    pub fn emit(
        &self,
        contract: &str,
        caller: &str,
        indent_level: usize,
        ctx: &mut GenContext,
    ) -> Result<String, CodegenError> {
        let indent = "\t".repeat(indent_level);
        let inner_indent = "\t".repeat(indent_level + 1);

        let (call_exp, _) = self
            .call
            .as_external_call()
            .ok_or_else(|| CodegenError::unsupported("external call lost its canonical form"))?;
        let lowered = lower(call_exp, caller, contract, ctx)?;
        let call_text = lowered
            .calls
            .first()
            .ok_or_else(|| CodegenError::unsupported("external call lowered to no call text"))?;

        let success_code = if let Some(subtree) = &self.success {
            subtree.emit(contract, caller, indent_level + 1, ctx)?
        } else if let Some(leaf) = self.success_leaf {
            transition_body(leaf, contract, indent_level + 1, ctx)?
        } else {
            "revert(\"Unexpected: no success branch\");".to_string()
        };

        let failure_code = match self.failure_leaf {
            Some(leaf) => transition_body(leaf, contract, indent_level + 1, ctx)?,
            None => "revert(\"Expected external call to succeed\");".to_string(),
        };

        Ok(format!(
            "{call}{{\n{ii}{success}\n{i}}} catch {{\n{ii}{failure}\n{i}}}",
            call = call_text,
            success = success_code,
            failure = failure_code,
            i = indent,
            ii = inner_indent,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edam_model::RoleMap;

    fn external_call(contract: &str, op: &str, expected: bool) -> Exp {
        Exp::Eq {
            left: Box::new(Exp::ContractWrite {
                contract: contract.to_string(),
                operation: op.to_string(),
                participant_args: vec![],
                data_args: vec![],
            }),
            right: Box::new(Exp::bool(expected)),
        }
    }

    fn make_transition(target: &str, calls: Vec<Exp>) -> Transition {
        Transition {
            source_state: "q0".to_string(),
            target_state: target.to_string(),
            operation: "settle".to_string(),
            guard: Exp::bool(true),
            external_calls: calls,
            roles: RoleMap::new(),
            role_updates: RoleMap::new(),
            participants: vec![],
            initiator: "a".to_string(),
            parameters: vec![],
            assignments: vec![],
        }
    }

    #[test]
    fn test_build_splits_by_expected_outcome() {
        let ok = make_transition("done", vec![external_call("Escrow", "lock", true)]);
        let failed = make_transition("aborted", vec![external_call("Escrow", "lock", false)]);
        let tree = build(&[&ok, &failed]).unwrap();
        assert_eq!(tree.success_leaf.unwrap().target_state, "done");
        assert_eq!(tree.failure_leaf.unwrap().target_state, "aborted");
        assert!(tree.success.is_none());
    }

    #[test]
    fn test_build_rejects_mismatched_first_signature() {
        let a = make_transition("done", vec![external_call("Escrow", "lock", true)]);
        let b = make_transition("done", vec![external_call("Escrow", "release", true)]);
        assert!(build(&[&a, &b]).is_none());
    }

    #[test]
    fn test_build_rejects_transition_without_calls() {
        let a = make_transition("done", vec![external_call("Escrow", "lock", true)]);
        let b = make_transition("done", vec![]);
        assert!(build(&[&a, &b]).is_none());
    }

    #[test]
    fn test_build_nests_shared_second_call() {
        let deep = make_transition(
            "done",
            vec![
                external_call("Escrow", "lock", true),
                external_call("Escrow", "release", true),
            ],
        );
        let shallow = make_transition("aborted", vec![external_call("Escrow", "lock", false)]);
        let tree = build(&[&deep, &shallow]).unwrap();
        let child = tree.success.as_ref().unwrap();
        assert_eq!(child.success_leaf.unwrap().target_state, "done");
        assert!(child.failure_leaf.is_none());
        assert_eq!(tree.failure_leaf.unwrap().target_state, "aborted");
    }

    #[test]
    fn test_divergent_deeper_signatures_stop_at_depth_one() {
        let a = make_transition(
            "a_done",
            vec![
                external_call("Escrow", "lock", true),
                external_call("Escrow", "release", true),
            ],
        );
        let b = make_transition(
            "b_done",
            vec![
                external_call("Escrow", "lock", true),
                external_call("Oracle", "poke", true),
            ],
        );
        let tree = build(&[&a, &b]).unwrap();
        assert!(tree.success.is_none());
        assert_eq!(tree.success_leaf.unwrap().target_state, "a_done");
    }

    #[test]
    fn test_emit_defensive_reverts() {
        let failed = make_transition("aborted", vec![external_call("Escrow", "lock", false)]);
        let tree = build(&[&failed]).unwrap();
        let mut ctx = GenContext::new();
        let code = tree.emit("Auction", "a", 3, &mut ctx).unwrap();
        assert!(code.starts_with("try _Escrow.lock() "));
        assert!(code.contains("revert(\"Unexpected: no success branch\")"));
        assert!(code.contains("_state = State.aborted;"));
    }

    #[test]
    fn test_emit_missing_failure_branch_reverts() {
        let ok = make_transition("done", vec![external_call("Escrow", "lock", true)]);
        let tree = build(&[&ok]).unwrap();
        let mut ctx = GenContext::new();
        let code = tree.emit("Auction", "a", 3, &mut ctx).unwrap();
        assert!(code.contains("revert(\"Expected external call to succeed\")"));
    }
}
