//! Constructor synthesis from deploy transitions.
//!
//! Deploy transitions are detected by operation name and compiled into
//! the single contract constructor. External-contract dependencies
//! from `contract_data_types` become imports, constructor parameters,
//! and field assignments emitted before any external call. Multiple
//! deploy transitions group by guard text into an if/else-if chain;
//! unlike regular functions the guard wrapper is never omitted, so an
//! unmatched deploy always reverts.

use crate::body::transition_body;
use crate::context::GenContext;
use crate::error::CodegenError;
use crate::expr::lower;
use crate::try_catch;
use crate::types::map_type;
use edam_model::{Edam, Param, Transition};

/// Generated constructor material.
#[derive(Debug, Default)]
pub struct ConstructorCode {
    /// The full `constructor(...) { ... }` block, empty when the model
    /// has no deploy transition.
    pub code: String,
    /// `import "./X.sol";` lines for external-contract dependencies.
    pub imports: String,
    /// Whether any deploy transition performs external calls; the
    /// constructor then carries the reentrancy modifier.
    pub has_external_calls: bool,
}

/// Build the constructor for a model's deploy transitions.
pub fn build(edam: &Edam, ctx: &mut GenContext) -> Result<ConstructorCode, CodegenError> {
    let deploys = edam.deploy_transitions();
    build_from(&deploys, &edam.name, &edam.contract_data_types, ctx)
}

/// Build a constructor from an explicit deploy-transition set.
pub fn build_from(
    transitions: &[&Transition],
    contract: &str,
    contract_data_types: &[Param],
    ctx: &mut GenContext,
) -> Result<ConstructorCode, CodegenError> {
    for transition in transitions {
        if !transition.is_deploy() {
            return Err(CodegenError::NotADeployTransition(
                transition.operation.clone(),
            ));
        }
    }
    if transitions.is_empty() {
        return Ok(ConstructorCode::default());
    }

    // Every declared contract-level data type becomes a field;
    // external-contract types additionally need an import, a
    // constructor parameter, and a field assignment.
    let mut imports = Vec::new();
    let mut external_params = Vec::new();
    let mut field_assignments = Vec::new();
    for data in contract_data_types {
        let (declaration, external) = map_type(&data.ty, &data.name, false);
        ctx.add_contract_field(&declaration);
        ctx.field_types.insert(data.name.clone(), data.ty.clone());

        if let Some(ext) = external {
            let import = format!("import \"./{}.sol\";", ext.ty);
            if !imports.contains(&import) {
                imports.push(import);
            }
            let param = format!("{} __{}", ext.ty, ext.name);
            if !external_params.contains(&param) {
                external_params.push(param);
                field_assignments.push(format!("_{name} = __{name}", name = ext.name));
            }
        }
    }

    let first = transitions[0];
    let mut params = crate::process::generate_params(&first.parameters, &first.participants);
    params.extend(external_params);
    let constructor_params = params.join(", ");

    let has_external_calls = transitions.iter().any(|t| !t.external_calls.is_empty());

    // Group by guard text, first-seen order.
    let mut guard_groups: Vec<(String, Vec<&Transition>)> = Vec::new();
    for transition in transitions {
        let guard = lower(&transition.guard, &transition.initiator, contract, ctx)?.code;
        match guard_groups.iter_mut().find(|(g, _)| *g == guard) {
            Some((_, group)) => group.push(transition),
            None => guard_groups.push((guard, vec![transition])),
        }
    }

    let mut branches = Vec::new();
    for (guard, group) in &guard_groups {
        let mut group_bodies = Vec::new();
        for transition in group {
            let body = if transition.external_calls.is_empty() {
                transition_body(transition, contract, 2, ctx)?
            } else {
                try_catch::build(transition, contract, 2, ctx)?
            };
            group_bodies.push(body);
        }
        let combined = group_bodies.join("\n\n\t\t");

        // The wrapper is mandatory: an empty guard still becomes
        // `if (true)` so the terminal revert path always exists.
        let condition = if guard.is_empty() { "true" } else { guard };
        branches.push(format!(
            "if ({condition}) {{\n\t\t\t{body}\n\t\t}}",
            condition = condition,
            body = combined,
        ));
    }

    // Dependency-field assignments run before any guard or external
    // call.
    let chain = format!(
        "{} else {{\n\t\t\trevert(\"Condition not met\");\n\t\t}}",
        branches.join(" else ")
    );
    let bodies = if field_assignments.is_empty() {
        chain
    } else {
        format!("{};\n\t\t{}", field_assignments.join(";\n\t\t"), chain)
    };

    let reentrancy = if has_external_calls {
        "nonReentrant "
    } else {
        ""
    };
    let code = format!(
        "constructor({params}) {reentrancy}{{\n\t\t{bodies}\n\t}}",
        params = constructor_params,
        reentrancy = reentrancy,
        bodies = bodies,
    );

    Ok(ConstructorCode {
        code,
        imports: imports.join("\n"),
        has_external_calls,
    })
}
