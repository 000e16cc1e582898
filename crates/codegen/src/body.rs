//! Shared transition-body emission.
//!
//! A transition body is its assignments, its role-update statements,
//! the state-variable assignment, and an optional post-update role
//! assertion. The try-catch builder, the call-tree emitter, and the
//! constructor builder all emit bodies through here.

use crate::context::GenContext;
use crate::dedup::dedup_update_map;
use crate::error::CodegenError;
use crate::expr::{is_update_operation, lower};
use crate::roles;
use edam_model::{Assignment, Exp, Transition};

/// Lower one assignment to Solidity statements.
///
/// Builtin mutation calls are statements in their own right and take
/// no left-hand side; `update_map` additionally goes through the
/// deduplication pass, with extracted nested updates emitted first.
pub fn lower_assignment(
    assignment: &Assignment,
    caller: &str,
    contract: &str,
    ctx: &mut GenContext,
) -> Result<Vec<String>, CodegenError> {
    match &assignment.value {
        Exp::Call { operation, .. } if operation == "update_map" => {
            let (parent, extracted) = dedup_update_map(&assignment.value)?;
            let mut statements = Vec::new();
            for exp in extracted.iter().chain(std::iter::once(&parent)) {
                let code = lower(exp, caller, contract, ctx)?.code;
                if !statements.contains(&code) {
                    statements.push(code);
                }
            }
            Ok(statements)
        }
        Exp::Call { operation, .. } if is_update_operation(operation) => {
            Ok(vec![lower(&assignment.value, caller, contract, ctx)?.code])
        }
        _ => {
            let rhs = lower(&assignment.value, caller, contract, ctx)?.code;
            Ok(vec![format!("{} = {}", assignment.target, rhs)])
        }
    }
}

/// All body statements for a transition, excluding the role assertion:
/// assignments, role updates, then the state transition. The final
/// state update carries its own terminator; earlier statements get
/// theirs from the join.
pub fn transition_statements(
    transition: &Transition,
    contract: &str,
    ctx: &mut GenContext,
) -> Result<Vec<String>, CodegenError> {
    let mut statements = Vec::new();
    for assignment in &transition.assignments {
        statements.extend(lower_assignment(
            assignment,
            &transition.initiator,
            contract,
            ctx,
        )?);
    }
    statements.extend(roles::role_updates(
        &transition.role_updates,
        &transition.initiator,
        contract,
    ));
    statements.push(format!("_state = State.{};", transition.target_state));
    Ok(statements)
}

/// Emit a transition body at the given indentation.
pub fn transition_body(
    transition: &Transition,
    contract: &str,
    indent_level: usize,
    ctx: &mut GenContext,
) -> Result<String, CodegenError> {
    let indent = "\t".repeat(indent_level);
    let statements = transition_statements(transition, contract, ctx)?;
    let mut code = statements.join(&format!(";\n{}", indent));

    let assertion = roles::role_assertion(
        &transition.role_updates,
        &transition.initiator,
        contract,
        ctx,
    );
    if !assertion.is_empty() {
        code.push('\n');
        code.push_str(&indent);
        code.push_str(&assertion);
    }
    Ok(code)
}
