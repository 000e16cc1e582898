//! Regular-transition processing: operation grouping and function-body
//! branch synthesis.
//!
//! Non-deploy transitions are grouped by operation name, then by
//! [`GroupKey`] within each operation. Each group becomes one `if`
//! branch whose body comes from the call-tree builder when the group's
//! calls merge, or from per-transition try/catch blocks when they do
//! not.

use crate::call_tree;
use crate::context::GenContext;
use crate::error::CodegenError;
use crate::expr::lower;
use crate::grouping::GroupKey;
use crate::roles;
use crate::try_catch;
use crate::types::map_type;
use edam_model::{Edam, Param, Transition};

/// Generated material for one contract function.
#[derive(Debug)]
pub struct OperationCode {
    /// Comma-joined parameter declarations.
    pub params: String,
    /// One `if` branch per transition group, in first-seen order.
    pub bodies: Vec<String>,
}

/// Build the signature parameter list: declared participants as
/// addresses, then typed data parameters.
pub fn generate_params(parameters: &[Param], participants: &[String]) -> Vec<String> {
    let mut params: Vec<String> = participants
        .iter()
        .map(|p| format!("address {}", p))
        .collect();
    for param in parameters {
        params.push(map_type(&param.ty, &param.name, true).0);
    }
    params
}

/// Register a transition's parameter types so the evaluator can apply
/// its address-cast rule; external-contract parameters also become
/// contract fields.
pub fn register_parameters(parameters: &[Param], ctx: &mut GenContext) {
    for param in parameters {
        let (declaration, external) = map_type(&param.ty, &param.name, false);
        if external.is_some() {
            ctx.add_contract_field(&declaration);
        }
        ctx.field_types
            .insert(param.name.clone(), param.ty.clone());
    }
}

/// Process all non-deploy transitions into per-operation function
/// material, in first-seen operation order. Also reports whether any
/// processed transition performs external calls.
pub fn process_regular_transitions(
    edam: &Edam,
    ctx: &mut GenContext,
) -> Result<(Vec<(String, OperationCode)>, bool), CodegenError> {
    let contract = &edam.name;

    let mut operations: Vec<(String, Vec<&Transition>)> = Vec::new();
    for transition in edam.regular_transitions() {
        match operations
            .iter_mut()
            .find(|(op, _)| op == &transition.operation)
        {
            Some((_, group)) => group.push(transition),
            None => operations.push((transition.operation.clone(), vec![transition])),
        }
    }

    let mut operation_map = Vec::new();
    let mut has_external_calls = false;

    for (operation, op_transitions) in operations {
        for transition in &op_transitions {
            register_parameters(&transition.parameters, ctx);
        }

        // Signature comes from the first transition; grouped
        // transitions share parameter shape by construction.
        let first = op_transitions[0];
        let params = generate_params(&first.parameters, &first.participants).join(", ");

        let mut groups: Vec<(GroupKey, Vec<&Transition>)> = Vec::new();
        for transition in &op_transitions {
            let key = GroupKey::for_transition(transition, contract, ctx)?;
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, group)) => group.push(transition),
                None => groups.push((key, vec![transition])),
            }
        }

        let mut bodies = Vec::new();
        for (_, group) in &groups {
            bodies.push(build_grouped_branch(group, contract, ctx)?);
            has_external_calls =
                has_external_calls || group.iter().any(|t| !t.external_calls.is_empty());
        }

        operation_map.push((operation, OperationCode { params, bodies }));
    }

    Ok((operation_map, has_external_calls))
}

/// One `if` branch for a group of transitions sharing a [`GroupKey`].
///
/// The condition is the state check, then the guard (kept even when it
/// lowers to `true`), then the role checks (dropped when trivially
/// true). The body merges the group's calls into one tree when
/// possible and falls back to independent per-transition blocks.
pub fn build_grouped_branch(
    group: &[&Transition],
    contract: &str,
    ctx: &mut GenContext,
) -> Result<String, CodegenError> {
    let first = group[0];

    let mut conditions = vec![format!("_state == State.{}", first.source_state)];
    let guard = lower(&first.guard, &first.initiator, contract, ctx)?.code;
    if !guard.is_empty() {
        conditions.push(guard);
    }
    let role_checks = roles::role_guard(&first.roles, &first.initiator, contract, ctx);
    if !role_checks.is_empty() && role_checks != "true" && role_checks != "True" {
        conditions.push(role_checks);
    }

    let grouped_calls = group.iter().any(|t| !t.external_calls.is_empty());
    let body = if grouped_calls {
        match call_tree::build(group) {
            Some(tree) => tree.emit(contract, &first.initiator, 2, ctx)?,
            None => separate_blocks(group, contract, ctx)?,
        }
    } else {
        separate_blocks(group, contract, ctx)?
    };

    Ok(format!(
        "if ({condition}) {{\n\t\t\t{body}\n\t\t}}",
        condition = conditions.join(" && "),
        body = body,
    ))
}

fn separate_blocks(
    group: &[&Transition],
    contract: &str,
    ctx: &mut GenContext,
) -> Result<String, CodegenError> {
    let mut blocks = Vec::new();
    for transition in group {
        blocks.push(try_catch::build(transition, contract, 2, ctx)?);
    }
    Ok(blocks.join("\n\n\t\t"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edam_model::{Exp, RoleMap};

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

    fn make_transition(operation: &str, source: &str, target: &str) -> Transition {
        Transition {
            source_state: source.to_string(),
            target_state: target.to_string(),
            operation: operation.to_string(),
            guard: Exp::bool(true),
            external_calls: vec![],
            roles: RoleMap::new(),
            role_updates: RoleMap::new(),
            participants: vec!["b".to_string()],
            initiator: "a".to_string(),
            parameters: vec![],
            assignments: vec![],
        }
    }

    fn make_edam(transitions: Vec<Transition>) -> Edam {
        Edam {
            name: "Auction".to_string(),
            states: vec!["q0".to_string(), "q1".to_string(), "q2".to_string()],
            transitions,
            initial_state: "q0".to_string(),
            final_states: vec![],
            roles: vec![],
            participants: vec![],
            variables: vec![],
            contract_data_types: vec![],
        }
    }

    #[test]
    fn test_operations_keep_first_seen_order() {
        let edam = make_edam(vec![
            make_transition("bid", "q0", "q1"),
            make_transition("close", "q1", "q2"),
            make_transition("bid", "q1", "q1"),
        ]);
        let mut ctx = GenContext::new();
        let (operations, has_calls) = process_regular_transitions(&edam, &mut ctx).unwrap();
        let names: Vec<&str> = operations.iter().map(|(op, _)| op.as_str()).collect();
        assert_eq!(names, vec!["bid", "close"]);
        assert!(!has_calls);
    }

    #[test]
    fn test_deploy_transitions_are_excluded() {
        let edam = make_edam(vec![
            make_transition("Deploy", "q0", "q1"),
            make_transition("bid", "q1", "q1"),
        ]);
        let mut ctx = GenContext::new();
        let (operations, _) = process_regular_transitions(&edam, &mut ctx).unwrap();
        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0].0, "bid");
    }

    #[test]
    fn test_distinct_source_states_get_separate_branches() {
        let edam = make_edam(vec![
            make_transition("bid", "q0", "q1"),
            make_transition("bid", "q1", "q2"),
        ]);
        let mut ctx = GenContext::new();
        let (operations, _) = process_regular_transitions(&edam, &mut ctx).unwrap();
        let code = &operations[0].1;
        assert_eq!(code.bodies.len(), 2);
        assert!(code.bodies[0].contains("_state == State.q0"));
        assert!(code.bodies[1].contains("_state == State.q1"));
    }

    #[test]
    fn test_guard_is_kept_even_when_true() {
        let edam = make_edam(vec![make_transition("bid", "q0", "q1")]);
        let mut ctx = GenContext::new();
        let (operations, _) = process_regular_transitions(&edam, &mut ctx).unwrap();
        assert!(operations[0].1.bodies[0].starts_with("if (_state == State.q0 && true)"));
    }

    #[test]
    fn test_mergeable_group_becomes_one_tree() {
        let mut ok = make_transition("settle", "q0", "q1");
        ok.external_calls = vec![external_call("Escrow", "lock", true)];
        let mut failed = make_transition("settle", "q0", "q2");
        failed.external_calls = vec![external_call("Escrow", "lock", false)];
        let edam = make_edam(vec![ok, failed]);

        let mut ctx = GenContext::new();
        let (operations, has_calls) = process_regular_transitions(&edam, &mut ctx).unwrap();
        assert!(has_calls);
        let body = &operations[0].1.bodies[0];
        assert_eq!(body.matches("try _Escrow.lock()").count(), 1);
        assert!(body.contains("_state = State.q1;"));
        assert!(body.contains("_state = State.q2;"));
    }

    #[test]
    fn test_unmergeable_group_falls_back_to_separate_blocks() {
        let mut a = make_transition("settle", "q0", "q1");
        a.external_calls = vec![external_call("Escrow", "lock", true)];
        let mut b = make_transition("settle", "q0", "q2");
        b.external_calls = vec![external_call("Oracle", "poke", true)];
        let edam = make_edam(vec![a, b]);

        let mut ctx = GenContext::new();
        let (operations, _) = process_regular_transitions(&edam, &mut ctx).unwrap();
        // Different first signatures share a group key but cannot
        // merge, so each transition keeps its own block.
        let body = &operations[0].1.bodies[0];
        assert!(body.contains("try _Escrow.lock()"));
        assert!(body.contains("try _Oracle.poke()"));
    }

    #[test]
    fn test_params_from_participants_and_parameters() {
        let mut t = make_transition("bid", "q0", "q1");
        t.parameters = vec![Param {
            ty: "int".to_string(),
            name: "amount".to_string(),
        }];
        let edam = make_edam(vec![t]);

        let mut ctx = GenContext::new();
        let (operations, _) = process_regular_transitions(&edam, &mut ctx).unwrap();
        assert_eq!(operations[0].1.params, "address b, uint amount");
        assert_eq!(ctx.field_types.get("amount").map(String::as_str), Some("int"));
    }
}
